#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let normalized = vatcheck::vat::normalize(s);
        assert_eq!(vatcheck::vat::normalize(&normalized), normalized);
        if let Ok(query) = vatcheck::vat::validate(s) {
            assert_eq!(query.normalized(), normalized);
            let _ = vatcheck::vat::route(query.country());
        }
    }
});
