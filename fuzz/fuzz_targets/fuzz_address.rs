#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (code, rest) = data.split_at(2);
    if let (Ok(code), Ok(address)) = (std::str::from_utf8(code), std::str::from_utf8(rest)) {
        let _ = vatcheck::backend::parse_address(code, address);
    }
});
