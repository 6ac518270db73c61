//! Lookup configuration.
//!
//! Defaults point to the production endpoints of every service. Override
//! via `VATCHECK_*` environment variables or explicit construction for
//! staging and tests.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_VIES_URL: &str =
    "https://ec.europa.eu/taxation_customs/vies/rest-api/check-vat-number";
pub const DEFAULT_VIES_STATUS_URL: &str =
    "https://ec.europa.eu/taxation_customs/vies/rest-api/check-status";
pub const DEFAULT_UID_URL: &str = "https://www.uid-wse-a.admin.ch/V5.0/PublicServices.svc";
pub const DEFAULT_HMRC_URL: &str =
    "https://api.service.hmrc.gov.uk/organisations/vat/check-vat-number/lookup";
pub const DEFAULT_BRREG_URL: &str = "https://data.brreg.no/enhetsregisteret/api/enheter";

/// Configuration for the lookup backends and their HTTP transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// VIES `check-vat-number` endpoint.
    pub vies_url: Url,
    /// VIES `check-status` endpoint.
    pub vies_status_url: Url,
    /// Swiss UID public services endpoint (SOAP).
    pub uid_url: Url,
    /// HMRC VAT lookup base URL; the number is appended as a path segment.
    pub hmrc_url: Url,
    /// Brønnøysund entity base URL; the number is appended as a path segment.
    pub brreg_url: Url,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent to every service.
    pub user_agent: String,
    /// Fetch the VIES member state availability list once at startup.
    pub prefetch_vies_status: bool,
    /// Only run the UID existence check, skip the detail fetch.
    pub uid_validate_only: bool,
    /// Minimum delay before each HMRC call (published limit ~3 req/s).
    pub hmrc_min_interval_ms: u64,
    /// First retry delay.
    pub backoff_initial_ms: u64,
    /// Upper bound for a single retry delay.
    pub backoff_max_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            vies_url: default_url(DEFAULT_VIES_URL),
            vies_status_url: default_url(DEFAULT_VIES_STATUS_URL),
            uid_url: default_url(DEFAULT_UID_URL),
            hmrc_url: default_url(DEFAULT_HMRC_URL),
            brreg_url: default_url(DEFAULT_BRREG_URL),
            timeout_secs: 30,
            user_agent: concat!("vatcheck/", env!("CARGO_PKG_VERSION")).to_string(),
            prefetch_vies_status: true,
            uid_validate_only: false,
            hmrc_min_interval_ms: 334,
            backoff_initial_ms: 1_000,
            backoff_max_secs: 20,
        }
    }
}

impl LookupConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables (all optional):
    /// - `VATCHECK_VIES_URL`, `VATCHECK_VIES_STATUS_URL`, `VATCHECK_UID_URL`,
    ///   `VATCHECK_HMRC_URL`, `VATCHECK_BRREG_URL`
    /// - `VATCHECK_TIMEOUT_SECS` (default: 30)
    /// - `VATCHECK_USER_AGENT`
    /// - `VATCHECK_PREFETCH_STATUS` (default: true)
    /// - `VATCHECK_UID_VALIDATE_ONLY` (default: false)
    /// - `VATCHECK_HMRC_INTERVAL_MS` (default: 334)
    /// - `VATCHECK_BACKOFF_INITIAL_MS` (default: 1000)
    /// - `VATCHECK_BACKOFF_MAX_SECS` (default: 20)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Ok(Self {
            vies_url: url_var(&get, "VATCHECK_VIES_URL", d.vies_url)?,
            vies_status_url: url_var(&get, "VATCHECK_VIES_STATUS_URL", d.vies_status_url)?,
            uid_url: url_var(&get, "VATCHECK_UID_URL", d.uid_url)?,
            hmrc_url: url_var(&get, "VATCHECK_HMRC_URL", d.hmrc_url)?,
            brreg_url: url_var(&get, "VATCHECK_BRREG_URL", d.brreg_url)?,
            timeout_secs: parsed_var(&get, "VATCHECK_TIMEOUT_SECS", d.timeout_secs)?,
            user_agent: get("VATCHECK_USER_AGENT").unwrap_or(d.user_agent),
            prefetch_vies_status: parsed_var(
                &get,
                "VATCHECK_PREFETCH_STATUS",
                d.prefetch_vies_status,
            )?,
            uid_validate_only: parsed_var(&get, "VATCHECK_UID_VALIDATE_ONLY", d.uid_validate_only)?,
            hmrc_min_interval_ms: parsed_var(
                &get,
                "VATCHECK_HMRC_INTERVAL_MS",
                d.hmrc_min_interval_ms,
            )?,
            backoff_initial_ms: parsed_var(
                &get,
                "VATCHECK_BACKOFF_INITIAL_MS",
                d.backoff_initial_ms,
            )?,
            backoff_max_secs: parsed_var(&get, "VATCHECK_BACKOFF_MAX_SECS", d.backoff_max_secs)?,
        })
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Minimum delay before each HMRC call.
    pub fn hmrc_min_interval(&self) -> Duration {
        Duration::from_millis(self.hmrc_min_interval_ms)
    }
}

fn default_url(raw: &str) -> Url {
    // The defaults are compile-time constants covered by the tests below.
    Url::parse(raw).expect("default endpoint URLs are valid")
}

fn url_var<F>(get: &F, var: &str, default: Url) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => {
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
        }
        None => Ok(default),
    }
}

fn parsed_var<F, T>(get: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw)),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: '{1}'")]
    InvalidValue(String, String),
    #[error("HTTP client could not be built: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_parse() {
        let cfg = LookupConfig::default();
        assert_eq!(cfg.vies_url.as_str(), DEFAULT_VIES_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.hmrc_min_interval(), Duration::from_millis(334));
        assert!(cfg.prefetch_vies_status);
    }

    #[test]
    fn empty_source_yields_defaults() {
        let cfg = LookupConfig::from_source(source(&[])).unwrap();
        assert_eq!(cfg, LookupConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = LookupConfig::from_source(source(&[
            ("VATCHECK_VIES_URL", "http://127.0.0.1:9000/check"),
            ("VATCHECK_TIMEOUT_SECS", "5"),
            ("VATCHECK_PREFETCH_STATUS", "false"),
            ("VATCHECK_HMRC_INTERVAL_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(cfg.vies_url.as_str(), "http://127.0.0.1:9000/check");
        assert_eq!(cfg.timeout_secs, 5);
        assert!(!cfg.prefetch_vies_status);
        assert_eq!(cfg.hmrc_min_interval(), Duration::ZERO);
    }

    #[test]
    fn invalid_url_rejected() {
        let err = LookupConfig::from_source(source(&[("VATCHECK_UID_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(ref var, _) if var == "VATCHECK_UID_URL"));
    }

    #[test]
    fn invalid_number_rejected() {
        let err = LookupConfig::from_source(source(&[("VATCHECK_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue("VATCHECK_TIMEOUT_SECS".into(), "soon".into())
        );
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg: LookupConfig = serde_json::from_str(r#"{"timeout_secs": 7}"#).unwrap();
        assert_eq!(cfg.timeout_secs, 7);
        assert_eq!(cfg.brreg_url.as_str(), DEFAULT_BRREG_URL);
    }
}
