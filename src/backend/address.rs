//! Parsing of the free-text addresses returned by VIES.
//!
//! Every member state formats the address differently. Some states do not
//! disclose company details at all and have no pattern.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Structured address extracted from a VIES free-text address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

/// Why an address could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AddressError {
    /// The text does not have the shape expected for the member state.
    /// Not fatal: the lookup result stays a success without details.
    #[error("the address returned for {code} does not have the expected layout")]
    NoMatch { code: String },
    /// The pattern matched but produced no usable field. Blocks success.
    #[error("the address returned for {code} matched but yielded no street, postal code or city")]
    NoFields { code: String },
}

impl AddressError {
    /// Whether this error prevents the lookup from being reported as a success.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::NoFields { .. })
    }
}

const BREAK_LINE_CITY: &str = r"^(?P<street>.*)\n(?P<postal_code>\S+)\s+(?P<city>.*)\n?$";

/// (code, pattern). Member states without an entry disclose no address
/// layout the parser can rely on.
static PATTERN_SOURCES: &[(&str, &str)] = &[
    ("AT", BREAK_LINE_CITY),
    ("BE", BREAK_LINE_CITY),
    ("BG", r"^(?P<street>.*),\s(?P<city>.*)\s(?P<postal_code>\d+)\n?$"),
    ("CY", BREAK_LINE_CITY),
    ("DK", BREAK_LINE_CITY),
    ("EE", r"^(?P<street>.*)\s{3}(?P<postal_code>\d+)\s+(?P<city>.*)\n?$"),
    ("EL", r"^(?P<street>\S+\s\w+)\s{3,}(?P<postal_code>\S+\S+)\s-\s(?P<city>.*)\n?$"),
    ("FI", BREAK_LINE_CITY),
    ("FR", r"^(?P<street>.*)\n(?P<postal_code>\d+)\s+(?P<city>.*)\n?$"),
    ("HR", r"^(?P<street>.*),\s+(?P<city>.*),\s+(?P<postal_code>.*)\n?$"),
    ("HU", r"^(?P<street>.*)\s+(?P<postal_code>\d+)\s+(?P<city>.*)\n?$"),
    ("IT", r"^(?P<street>.*)\n(?P<postal_code>\d+)\s+(?P<city>.*)\s\S{2}\n?$"),
    ("LT", r"^(?P<street>.*),\s+(?P<city>.*),\s+((?P<postal_code>LT\d{5})|(?P<province>.*))\n?$"),
    ("LU", BREAK_LINE_CITY),
    ("LV", r"^(?P<street>.*),\s+(?P<city>.*),\s+(?P<postal_code>\S+)\n?$"),
    ("NL", r"^\n(?P<street>.*)\n(?P<postal_code>\S+)\s+(?P<city>.*)\n?$"),
    ("PT", r"^(?P<street>.*)\n(?P<municipality>\S+)\n(?P<postal_code>\S+)\s+(?P<city>.*)\n?$"),
    ("SE", r"^(?P<street>.*)\n(?P<postal_code>\S+\s\S+)\s+(?P<city>.*)\n?$"),
    ("SI", r"^(?P<street>.*),\s+(?P<postal_code>\d{4})\s+(?P<city>.*)\n?$"),
    ("SK", r"^(?P<street>.*)\n(?P<postal_code>\S+)\s(?P<city>.*)\n(?P<country>.*)\n?$"),
];

static PATTERNS: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    PATTERN_SOURCES
        .iter()
        .map(|&(code, src)| {
            (
                code,
                Regex::new(src).expect("address patterns are valid regular expressions"),
            )
        })
        .collect()
});

/// The address pattern for a member state, if it has one.
pub fn address_pattern(code: &str) -> Option<&'static Regex> {
    PATTERNS.get(code)
}

/// Parse `address` with the pattern of member state `code`.
///
/// Returns `Ok(None)` when the member state has no pattern.
pub fn parse_address(code: &str, address: &str) -> Result<Option<ParsedAddress>, AddressError> {
    let Some(pattern) = address_pattern(code) else {
        tracing::debug!(code, "member state has no address pattern");
        return Ok(None);
    };

    let caps = pattern.captures(address).ok_or_else(|| AddressError::NoMatch {
        code: code.to_string(),
    })?;

    let field = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let parsed = ParsedAddress {
        street: field("street"),
        postal_code: field("postal_code"),
        city: field("city"),
    };

    if parsed == ParsedAddress::default() {
        return Err(AddressError::NoFields {
            code: code.to_string(),
        });
    }
    Ok(Some(parsed))
}
