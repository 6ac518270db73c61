//! Jurisdiction registry.
//!
//! Maps a two-letter jurisdiction code to its display name, union
//! membership and VAT number grammar. VIES uses `EL` for Greece and `XI`
//! for Northern Ireland, so those codes are used here as well instead of
//! the ISO 3166-1 `GR` / `GB` split.

use regex::Regex;
use std::sync::LazyLock;

/// One registered jurisdiction.
#[derive(Debug, Clone)]
pub struct CountryInfo {
    /// Two-letter jurisdiction code (e.g. "AT", "EL", "XI").
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Whether VAT numbers are checked through the EU VIES service.
    pub union_member: bool,
    grammar: Regex,
}

impl CountryInfo {
    /// Whether `normalized` fully matches this jurisdiction's grammar.
    ///
    /// The grammar includes the two-letter prefix, so the whole
    /// normalized identifier is passed in. Non-ASCII input never matches,
    /// since `\d` alone would accept any Unicode digit.
    pub fn matches(&self, normalized: &str) -> bool {
        normalized.is_ascii() && self.grammar.is_match(normalized)
    }

    /// The anchored grammar source.
    pub fn grammar(&self) -> &str {
        self.grammar.as_str()
    }
}

/// Read-only directory of supported jurisdictions.
#[derive(Debug)]
pub struct CountryRegistry {
    entries: Vec<CountryInfo>,
}

static REGISTRY: LazyLock<CountryRegistry> = LazyLock::new(CountryRegistry::build);

impl CountryRegistry {
    /// The process-wide registry, compiled on first use.
    pub fn global() -> &'static CountryRegistry {
        &REGISTRY
    }

    /// Look up a jurisdiction by its two-letter code (upper case).
    pub fn lookup(&self, code: &str) -> Option<&CountryInfo> {
        self.entries
            .binary_search_by(|c| c.code.cmp(code))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// All registered jurisdictions, sorted by code.
    pub fn all(&self) -> &[CountryInfo] {
        &self.entries
    }

    fn build() -> Self {
        let entries = COUNTRIES
            .iter()
            .map(|&(code, name, union_member, grammar)| CountryInfo {
                code,
                name,
                union_member,
                grammar: Regex::new(&format!("^(?:{grammar})$"))
                    .expect("registry grammars are valid regular expressions"),
            })
            .collect();
        Self { entries }
    }
}

/// Shorthand for `CountryRegistry::global().lookup(code)`.
pub fn lookup_country(code: &str) -> Option<&'static CountryInfo> {
    CountryRegistry::global().lookup(code)
}

/// (code, name, union member, grammar). Sorted for binary search.
static COUNTRIES: &[(&str, &str, bool, &str)] = &[
    ("AT", "Austria", true, r"ATU\d{8}"),
    ("BE", "Belgium", true, r"BE[01]\d{9}"),
    ("BG", "Bulgaria", true, r"BG\d{9,10}"),
    ("CH", "Switzerland", false, r"CHE\d{9}"),
    ("CY", "Cyprus", true, r"CY\d{8}[A-Z]"),
    ("CZ", "Czech Republic", true, r"CZ\d{8,10}"),
    ("DE", "Germany", true, r"DE\d{9}"),
    ("DK", "Denmark", true, r"DK\d{8}"),
    ("EE", "Estonia", true, r"EE\d{9}"),
    ("EL", "Greece", true, r"EL\d{9}"),
    ("ES", "Spain", true, r"ES[A-Z0-9]{9}"),
    ("FI", "Finland", true, r"FI\d{8}"),
    ("FR", "France", true, r"FR[A-Z0-9]{11}"),
    ("GB", "United Kingdom", false, r"GB\d{9}"),
    ("HR", "Croatia", true, r"HR\d{11}"),
    ("HU", "Hungary", true, r"HU\d{8}"),
    ("IE", "Ireland", true, r"IE(?:\d{7}[A-Z]{1,2}|\d[A-Z]\d{5}[A-Z])"),
    ("IT", "Italy", true, r"IT\d{11}"),
    ("LI", "Liechtenstein", false, r"LI\d{5}"),
    ("LT", "Lithuania", true, r"LT\d{9}(?:\d{3})?"),
    ("LU", "Luxembourg", true, r"LU\d{8}"),
    ("LV", "Latvia", true, r"LV\d{11}"),
    ("MT", "Malta", true, r"MT\d{8}"),
    ("NL", "Netherlands", true, r"NL\d{9}B\d{2}"),
    ("NO", "Norway", false, r"NO\d{9}"),
    ("PL", "Poland", true, r"PL\d{10}"),
    ("PT", "Portugal", true, r"PT\d{9}"),
    ("RO", "Romania", true, r"RO\d{2,10}"),
    ("RS", "Serbia", false, r"RS\d{9}"),
    ("SE", "Sweden", true, r"SE\d{12}"),
    ("SI", "Slovenia", true, r"SI\d{8}"),
    ("SK", "Slovakia", true, r"SK\d{10}"),
    ("SM", "San Marino", false, r"SM\d{5}"),
    ("XI", "Northern Ireland - United Kingdom", true, r"XI\d{9}"),
];
