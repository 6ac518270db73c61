use vatcheck::vat::{Route, normalize, route, validate};
use vatcheck::{BackendKind, CountryRegistry, LookupError};

// ---------------------------------------------------------------------------
// Format validation: union members
// ---------------------------------------------------------------------------

#[test]
fn de_valid() {
    let q = validate("DE123456789").unwrap();
    assert_eq!(q.code(), "DE");
    assert_eq!(q.number(), "123456789");
}

#[test]
fn de_too_short() {
    assert!(matches!(validate("DE12345678"), Err(LookupError::FormatMismatch { .. })));
}

#[test]
fn de_too_long() {
    assert!(validate("DE1234567890").is_err());
}

#[test]
fn at_requires_u_prefix() {
    assert!(validate("ATU12345678").is_ok());
    assert!(validate("AT12345678").is_err());
}

#[test]
fn be_first_digit() {
    assert!(validate("BE0123456789").is_ok());
    assert!(validate("BE1123456789").is_ok());
    assert!(validate("BE2123456789").is_err());
}

#[test]
fn fr_alphanumeric_key() {
    assert!(validate("FR12345678901").is_ok());
    assert!(validate("FRXX123456789").is_ok());
    assert!(validate("FR1234567890").is_err());
}

#[test]
fn nl_b_suffix() {
    assert!(validate("NL123456789B01").is_ok());
    assert!(validate("NL123456789C01").is_err());
}

#[test]
fn lt_short_and_long() {
    assert!(validate("LT123456789").is_ok());
    assert!(validate("LT123456789012").is_ok());
    assert!(validate("LT1234567890").is_err());
}

#[test]
fn ro_variable_length() {
    assert!(validate("RO12").is_ok());
    assert!(validate("RO1234567890").is_ok());
    assert!(validate("RO1").is_err());
}

#[test]
fn cy_trailing_letter() {
    assert!(validate("CY12345678L").is_ok());
    assert!(validate("CY123456789").is_err());
}

#[test]
fn xi_northern_ireland() {
    let q = validate("XI123456789").unwrap();
    assert!(q.country().union_member);
    assert_eq!(route(q.country()), Route::Backend(BackendKind::Union));
}

// ---------------------------------------------------------------------------
// Format validation: non-members
// ---------------------------------------------------------------------------

#[test]
fn ch_uid() {
    let q = validate("CHE-116.281.710").unwrap();
    assert_eq!(q.normalized(), "CHE116281710");
    assert_eq!(route(q.country()), Route::Backend(BackendKind::Confederation));
}

#[test]
fn gb_and_no() {
    assert_eq!(
        route(validate("GB123456789").unwrap().country()),
        Route::Backend(BackendKind::IslandNation)
    );
    assert_eq!(
        route(validate("NO923609016").unwrap().country()),
        Route::Backend(BackendKind::Nordic)
    );
}

#[test]
fn rs_and_sm_are_unsupported() {
    assert_eq!(route(validate("RS123456789").unwrap().country()), Route::Unsupported);
    assert_eq!(route(validate("SM12345").unwrap().country()), Route::Unsupported);
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn separators_and_case() {
    assert_eq!(normalize(" de-123.456 789 "), "DE123456789");
    assert_eq!(validate("nl 1234.56.789.b.01").unwrap().normalized(), "NL123456789B01");
}

#[test]
fn registry_covers_every_routable_code() {
    for c in CountryRegistry::global().all() {
        let routed = route(c);
        if c.union_member {
            assert_eq!(routed, Route::Backend(BackendKind::Union), "{}", c.code);
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[test]
fn unsupported_country_message() {
    let err = validate("XX123456").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"the country code 'XX' of VAT number 'XX123456' is not in the supported list of VAT countries");
}

#[test]
fn format_mismatch_message() {
    let err = validate("DE 1234").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"the VAT number 'DE 1234' does NOT match the VAT number format for country DE");
}
