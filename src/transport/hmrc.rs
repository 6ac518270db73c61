use reqwest::blocking::Client;
use url::Url;

use super::{endpoint, is_success, send};
use crate::backend::{HmrcLookupResponse, HmrcTransport};
use crate::core::TransportError;

const HMRC_ACCEPT: &str = "application/vnd.hmrc.1.0+json";

/// HMRC VAT lookup transport.
pub struct HttpHmrc {
    client: Client,
    base_url: Url,
}

impl HttpHmrc {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

impl HmrcTransport for HttpHmrc {
    fn lookup(&self, number: &str) -> Result<Option<HmrcLookupResponse>, TransportError> {
        let url = endpoint(&self.base_url, number)?;
        let (status, body) = send(self.client.get(url).header("Accept", HMRC_ACCEPT))?;
        decode_lookup_response(status, &body)
    }
}

/// 200 is a registered number, 404 an unregistered one.
pub fn decode_lookup_response(
    status: u16,
    body: &str,
) -> Result<Option<HmrcLookupResponse>, TransportError> {
    match status {
        404 => Ok(None),
        s if is_success(s) => serde_json::from_str(body)
            .map(Some)
            .map_err(|e| TransportError::Decode(e.to_string())),
        _ => Err(TransportError::Status {
            status,
            body: body.to_string(),
        }),
    }
}
