use reqwest::blocking::Client;
use url::Url;

use super::{is_success, send};
use crate::backend::{ViesRequest, ViesResponse, ViesStatusResponse, ViesTransport};
use crate::core::TransportError;

/// VIES REST transport.
pub struct HttpVies {
    client: Client,
    check_url: Url,
    status_url: Url,
}

impl HttpVies {
    pub fn new(client: Client, check_url: Url, status_url: Url) -> Self {
        Self {
            client,
            check_url,
            status_url,
        }
    }
}

impl ViesTransport for HttpVies {
    fn check_vat(&self, request: &ViesRequest) -> Result<ViesResponse, TransportError> {
        let (status, body) = send(
            self.client
                .post(self.check_url.clone())
                .header("Accept", "application/json")
                .json(request),
        )?;
        decode_check_response(status, &body)
    }

    fn check_status(&self) -> Result<ViesStatusResponse, TransportError> {
        let (status, body) = send(
            self.client
                .get(self.status_url.clone())
                .header("Accept", "application/json"),
        )?;
        decode_status_response(status, &body)
    }
}

/// Decode a `check-vat-number` answer.
///
/// VIES reports faults through `errorWrappers`, usually together with an
/// HTTP error status; the fault wins over the status.
pub fn decode_check_response(status: u16, body: &str) -> Result<ViesResponse, TransportError> {
    match serde_json::from_str::<ViesResponse>(body) {
        Ok(response) => {
            if let Some(wrapper) = response.error_wrappers.first() {
                return Err(TransportError::Fault {
                    code: wrapper
                        .error
                        .clone()
                        .unwrap_or_else(|| "UNKNOWN".to_string()),
                    message: wrapper.message.clone(),
                });
            }
            if !is_success(status) {
                return Err(TransportError::Status {
                    status,
                    body: body.to_string(),
                });
            }
            Ok(response)
        }
        Err(_) if !is_success(status) => Err(TransportError::Status {
            status,
            body: body.to_string(),
        }),
        Err(e) => Err(TransportError::Decode(e.to_string())),
    }
}

/// Decode a `check-status` answer.
pub fn decode_status_response(status: u16, body: &str) -> Result<ViesStatusResponse, TransportError> {
    if !is_success(status) {
        return Err(TransportError::Status {
            status,
            body: body.to_string(),
        });
    }
    serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_response() {
        let r = decode_check_response(
            200,
            r#"{"countryCode":"DE","vatNumber":"123456789","requestDate":"2024-01-15T10:00:00.000Z","valid":true,"name":"---","address":"---","userError":"VALID"}"#,
        )
        .unwrap();
        assert!(r.valid);
        assert_eq!(r.user_error.as_deref(), Some("VALID"));
    }

    #[test]
    fn error_wrapper_is_a_fault() {
        let err = decode_check_response(
            500,
            r#"{"actionSucceed":false,"errorWrappers":[{"error":"MS_UNAVAILABLE","message":"member state down"}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransportError::Fault {
                code: "MS_UNAVAILABLE".into(),
                message: Some("member state down".into()),
            }
        );
    }

    #[test]
    fn html_error_page_is_a_status() {
        let err = decode_check_response(503, "<html>down</html>").unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 503, .. }));
    }

    #[test]
    fn garbage_with_ok_status_is_decode_error() {
        let err = decode_check_response(200, "not json").unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn status_endpoint() {
        let r = decode_status_response(
            200,
            r#"{"vow":{"available":true},"countries":[{"countryCode":"DE","availability":"Unavailable"}]}"#,
        )
        .unwrap();
        assert_eq!(r.countries.len(), 1);
        assert!(decode_status_response(404, "").is_err());
    }
}
