use reqwest::blocking::Client;
use url::Url;

use super::{endpoint, is_success, send};
use crate::backend::{BrregEntity, BrregTransport};
use crate::core::TransportError;

/// Brønnøysund register transport.
pub struct HttpBrreg {
    client: Client,
    base_url: Url,
}

impl HttpBrreg {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

impl BrregTransport for HttpBrreg {
    fn entity(&self, number: &str) -> Result<Option<BrregEntity>, TransportError> {
        let url = endpoint(&self.base_url, number)?;
        let (status, body) = send(self.client.get(url).header("Accept", "application/json"))?;
        decode_entity_response(status, &body)
    }
}

/// 404 is an unknown entity, 410 a deleted one.
pub fn decode_entity_response(status: u16, body: &str) -> Result<Option<BrregEntity>, TransportError> {
    match status {
        404 | 410 => Ok(None),
        s if is_success(s) => serde_json::from_str(body)
            .map(Some)
            .map_err(|e| TransportError::Decode(e.to_string())),
        _ => Err(TransportError::Status {
            status,
            body: body.to_string(),
        }),
    }
}
