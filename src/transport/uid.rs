use reqwest::blocking::Client;
use url::Url;

use super::soap::{EnvelopeWriter, collect_text, fault};
use super::{is_success, send};
use crate::backend::{UidConnector, UidOrganisation, UidSession};
use crate::core::{ConfigError, LookupConfig, TransportError};

const UID_NS: &str = "http://www.uid.admin.ch/xmlns/uid-wse";
const ECH_0097_NS: &str = "http://www.ech.ch/xmlns/eCH-0097/5";
const ACTION_BASE: &str = "http://www.uid.admin.ch/xmlns/uid-wse/IPublicServices/";

/// Opens UID sessions.
///
/// The service drops idle keep-alive connections aggressively, so the
/// client keeps no idle connections and every request asks for `close`.
pub struct HttpUidConnector {
    client: Client,
    url: Url,
}

impl HttpUidConnector {
    pub fn new(config: &LookupConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: config.uid_url.clone(),
        })
    }
}

impl UidConnector for HttpUidConnector {
    /// Fetch the WSDL to verify the service answers.
    fn connect(&self) -> Result<Box<dyn UidSession>, TransportError> {
        let mut wsdl = self.url.clone();
        wsdl.set_query(Some("wsdl"));
        let (status, body) = send(self.client.get(wsdl).header("Connection", "close"))?;
        if !is_success(status) {
            return Err(TransportError::Status { status, body });
        }
        Ok(Box::new(HttpUidSession {
            client: self.client.clone(),
            url: self.url.clone(),
        }))
    }
}

/// One connected UID session.
pub struct HttpUidSession {
    client: Client,
    url: Url,
}

impl HttpUidSession {
    fn call(&self, action: &str, envelope: String) -> Result<(u16, String), TransportError> {
        send(
            self.client
                .post(self.url.clone())
                .header("Content-Type", "text/xml; charset=utf-8")
                .header("SOAPAction", format!("\"{ACTION_BASE}{action}\""))
                .header("Connection", "close")
                .body(envelope),
        )
    }
}

impl UidSession for HttpUidSession {
    fn validate_uid(&self, uid: &str) -> Result<bool, TransportError> {
        let mut w = EnvelopeWriter::new(&[("uid", UID_NS)])?;
        w.start_element("uid:ValidateUID")?;
        w.text_element("uid:uid", uid)?;
        w.end_element("uid:ValidateUID")?;
        let (status, body) = self.call("ValidateUID", w.finish()?)?;
        decode_validate_uid(status, &body)
    }

    fn get_by_uid(
        &self,
        category: &str,
        id: &str,
    ) -> Result<Option<UidOrganisation>, TransportError> {
        let mut w = EnvelopeWriter::new(&[("uid", UID_NS), ("ech", ECH_0097_NS)])?;
        w.start_element("uid:GetByUID")?;
        w.start_element("uid:uid")?;
        w.text_element("ech:uidOrganisationIdCategorie", category)?;
        w.text_element("ech:uidOrganisationId", id)?;
        w.end_element("uid:uid")?;
        w.end_element("uid:GetByUID")?;
        let (status, body) = self.call("GetByUID", w.finish()?)?;
        decode_get_by_uid(status, &body)
    }
}

/// Faults come with HTTP 500; check the body before the status.
fn check_envelope(status: u16, body: &str) -> Result<(), TransportError> {
    if let Some(fault) = fault(body)? {
        return Err(fault);
    }
    if !is_success(status) {
        return Err(TransportError::Status {
            status,
            body: body.to_string(),
        });
    }
    Ok(())
}

/// Decode a `ValidateUIDResponse`.
pub fn decode_validate_uid(status: u16, body: &str) -> Result<bool, TransportError> {
    check_envelope(status, body)?;
    let fields = collect_text(body, &["ValidateUIDResult"])?;
    match fields.get("ValidateUIDResult").map(|s| s.trim()) {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(TransportError::Decode(format!(
            "unexpected ValidateUIDResult '{other}'"
        ))),
        None => Err(TransportError::Decode("missing ValidateUIDResult".to_string())),
    }
}

const ORGANISATION_FIELDS: &[&str] = &[
    "organisation",
    "organisationName",
    "organisationAdditionalName",
    "street",
    "houseNumber",
    "town",
    "swissZipCode",
    "foreignZipCode",
    "countryIdISO2",
];

/// Decode a `GetByUIDResponse`. `None` when no organisation came back.
pub fn decode_get_by_uid(status: u16, body: &str) -> Result<Option<UidOrganisation>, TransportError> {
    check_envelope(status, body)?;
    let mut fields = collect_text(body, ORGANISATION_FIELDS)?;
    if !fields.contains_key("organisation") {
        return Ok(None);
    }
    let mut take = |name: &str| fields.remove(name).filter(|v| !v.trim().is_empty());
    Ok(Some(UidOrganisation {
        organisation_name: take("organisationName"),
        additional_name: take("organisationAdditionalName"),
        street: take("street"),
        house_number: take("houseNumber"),
        town: take("town"),
        swiss_zip_code: take("swissZipCode"),
        foreign_zip_code: take("foreignZipCode"),
        country_code: take("countryIdISO2"),
    }))
}
