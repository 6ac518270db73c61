//! Blocking HTTP transports for every backend (feature `http`).
//!
//! Each transport is a thin `reqwest::blocking` client plus a pure decode
//! function that maps status code and body to the typed response or a
//! [`TransportError`]. The decode functions carry all the logic and are
//! unit tested without a network.

mod brreg;
mod hmrc;
mod soap;
mod uid;
mod vies;

pub use brreg::{HttpBrreg, decode_entity_response};
pub use hmrc::{HttpHmrc, decode_lookup_response};
pub use uid::{HttpUidConnector, HttpUidSession, decode_get_by_uid, decode_validate_uid};
pub use vies::{HttpVies, decode_check_response, decode_status_response};

use reqwest::blocking::{Client, RequestBuilder};
use url::Url;

use crate::core::{ConfigError, LookupConfig, TransportError};

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Shared client with the configured timeout and user agent.
pub fn client(config: &LookupConfig) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| ConfigError::Client(e.to_string()))
}

/// Send and read the whole body.
fn send(request: RequestBuilder) -> Result<(u16, String), TransportError> {
    let response = request.send()?;
    let status = response.status().as_u16();
    let body = response.text()?;
    tracing::debug!(status, bytes = body.len(), "HTTP response");
    Ok((status, body))
}

/// `base` with `segment` appended as one path segment.
fn endpoint(base: &Url, segment: &str) -> Result<Url, TransportError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| TransportError::Connection(format!("cannot append a path to {base}")))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segment() {
        let base = Url::parse("https://data.brreg.no/enhetsregisteret/api/enheter").unwrap();
        assert_eq!(
            endpoint(&base, "923609016").unwrap().as_str(),
            "https://data.brreg.no/enhetsregisteret/api/enheter/923609016"
        );
        let slash = Url::parse("http://localhost:8080/lookup/").unwrap();
        assert_eq!(
            endpoint(&slash, "123").unwrap().as_str(),
            "http://localhost:8080/lookup/123"
        );
    }

    #[test]
    fn client_builds_from_defaults() {
        assert!(client(&LookupConfig::default()).is_ok());
    }
}
