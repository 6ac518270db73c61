//! VAT number normalization and format validation.

use crate::core::{CountryInfo, CountryRegistry, LookupError};

/// A VAT number that passed format validation.
///
/// Only [`validate`] creates one, so holding a `Query` means the
/// jurisdiction is registered and the grammar matched.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    normalized: String,
    country: &'static CountryInfo,
}

impl Query {
    /// The identifier as the caller supplied it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Upper-case ASCII alphanumerics only (e.g. "ATU12345678").
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Two-letter jurisdiction code (e.g. "AT").
    pub fn code(&self) -> &str {
        self.country.code
    }

    /// The number without its jurisdiction prefix (e.g. "U12345678").
    pub fn number(&self) -> &str {
        &self.normalized[2..]
    }

    /// Registry entry of the jurisdiction.
    pub fn country(&self) -> &'static CountryInfo {
        self.country
    }
}

/// Strip everything but letters and digits and upper-case the rest.
///
/// Non-ASCII letters are kept, so "DE12345678ü9" stays invalid instead of
/// collapsing into a different number.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Validate a VAT number by format (no network call).
///
/// The input must start with the two-letter jurisdiction prefix; spaces,
/// dots, dashes and other separators are ignored.
///
/// # Errors
///
/// [`LookupError::UnsupportedCountry`] when the prefix is not registered,
/// [`LookupError::FormatMismatch`] when the grammar does not match.
pub fn validate(raw: &str) -> Result<Query, LookupError> {
    let normalized = normalize(raw);
    // Not a char boundary means a non-ASCII prefix, which no code matches.
    let code = normalized.get(..2).unwrap_or(normalized.as_str());

    let Some(country) = CountryRegistry::global().lookup(code) else {
        tracing::debug!(input = raw, code, "unsupported jurisdiction prefix");
        return Err(LookupError::UnsupportedCountry {
            code: code.to_string(),
            input: raw.to_string(),
        });
    };

    if !country.matches(&normalized) {
        tracing::debug!(input = raw, code, "VAT number does not match grammar");
        return Err(LookupError::FormatMismatch {
            code: country.code.to_string(),
            input: raw.to_string(),
        });
    }

    Ok(Query {
        raw: raw.to_string(),
        normalized,
        country,
    })
}
