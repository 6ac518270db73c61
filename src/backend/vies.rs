//! EU VIES adapter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::address::parse_address;
use super::status::{ServiceStatus, ViesStatusResponse};
use super::VatBackend;
use crate::core::{BackendKind, FaultClass, LookupError, Outcome, TransportError};
use crate::vat::{Query, RetryPolicy};

/// VIES `check-vat-number` request body.
///
/// Built fresh for every attempt. The requester and trader fields are
/// only needed for qualified checks and are sent empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViesRequest {
    pub country_code: String,
    pub vat_number: String,
    pub requester_member_state_code: String,
    pub requester_number: String,
    pub trader_name: String,
    pub trader_street: String,
    pub trader_postal_code: String,
    pub trader_city: String,
    pub trader_company_type: String,
}

impl ViesRequest {
    pub fn new(country_code: &str, vat_number: &str) -> Self {
        Self {
            country_code: country_code.to_string(),
            vat_number: vat_number.to_string(),
            ..Self::default()
        }
    }
}

/// VIES `check-vat-number` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViesResponse {
    pub valid: bool,
    pub country_code: Option<String>,
    pub vat_number: Option<String>,
    pub request_date: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    /// `VALID`, `INVALID` or a fault code.
    pub user_error: Option<String>,
    pub error_wrappers: Vec<ViesErrorWrapper>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViesErrorWrapper {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Wire access to the VIES REST service.
pub trait ViesTransport: Send {
    /// POST `check-vat-number`. Fault bodies are reported as
    /// [`TransportError::Fault`].
    fn check_vat(&self, request: &ViesRequest) -> Result<ViesResponse, TransportError>;

    /// GET `check-status`.
    fn check_status(&self) -> Result<ViesStatusResponse, TransportError>;
}

/// Lookup adapter for union members.
pub struct ViesBackend {
    transport: Box<dyn ViesTransport>,
    policy: RetryPolicy,
    status: Option<ServiceStatus>,
}

impl ViesBackend {
    pub fn new(transport: Box<dyn ViesTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::vies(),
            status: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reject lookups for member states listed as unavailable in `status`.
    pub fn with_status(mut self, status: ServiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Fetch the availability snapshot through this adapter's transport.
    ///
    /// Runs once before the first lookup; lookups never refresh it.
    pub fn prefetch_status(&mut self) -> Result<(), LookupError> {
        self.status = Some(ServiceStatus::fetch(self.transport.as_ref())?);
        Ok(())
    }

    pub fn status(&self) -> Option<&ServiceStatus> {
        self.status.as_ref()
    }

    fn call(&self, query: &Query) -> Result<ViesResponse, LookupError> {
        let request = ViesRequest::new(query.code(), query.number());
        let response = self
            .transport
            .check_vat(&request)
            .map_err(|e| classify(query, e))?;
        match response.user_error.as_deref() {
            None | Some("") | Some("VALID") | Some("INVALID") => Ok(response),
            Some(code) => Err(fault(query, code)),
        }
    }
}

impl VatBackend for ViesBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Union
    }

    fn lookup(&mut self, query: &Query) -> Result<Outcome, LookupError> {
        if self
            .status
            .as_ref()
            .is_some_and(|s| s.is_unavailable(query.code()))
        {
            return Err(LookupError::MemberStateUnavailable {
                code: query.code().to_string(),
            });
        }

        let response = match self.policy.run("vies.check_vat", || self.call(query)) {
            Ok(response) => response,
            Err(LookupError::Protocol {
                class: FaultClass::Soft,
                message,
                ..
            }) => return Ok(Outcome::soft_fault(BackendKind::Union, message)),
            Err(err) => return Err(err),
        };

        Ok(interpret(query, response))
    }
}

/// Turn a decoded VIES answer into an outcome.
pub fn interpret(query: &Query, response: ViesResponse) -> Outcome {
    let request_date = response
        .request_date
        .as_deref()
        .and_then(|d| d.get(..10))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

    if !response.valid {
        tracing::info!(vat = query.normalized(), "VIES reports number invalid");
        return Outcome {
            request_date,
            ..Outcome::invalid(
                BackendKind::Union,
                format!(
                    "The VAT number, {}, does not exist in the VIES database, it is NOT valid.",
                    query.normalized()
                ),
            )
        };
    }

    let mut outcome = Outcome {
        valid: true,
        service_confirmed: true,
        country_code: response.country_code.clone().or_else(|| Some(query.code().to_string())),
        request_date,
        ..Outcome::new(BackendKind::Union)
    };

    let parse_code = query.code();
    outcome.company_name = disclosed(response.name);
    let Some(address) = disclosed(response.address) else {
        return outcome;
    };

    match parse_address(parse_code, &address) {
        Ok(Some(parsed)) => {
            outcome.street = parsed.street;
            outcome.postal_code = parsed.postal_code;
            outcome.city = parsed.city;
            outcome.has_details = true;
        }
        Ok(None) => {}
        Err(err) => {
            tracing::debug!(code = parse_code, error = %err, "address not parsed");
            outcome.parse_blocked = err.is_blocking();
            outcome.error_message = Some(err.to_string());
        }
    }
    tracing::info!(vat = query.normalized(), has_details = outcome.has_details, "VIES confirms number");
    outcome
}

/// `---` marks a field the member state does not disclose.
fn disclosed(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && v != "---"
    })
}

fn classify(query: &Query, err: TransportError) -> LookupError {
    match err {
        TransportError::Fault { code, .. } => fault(query, &code),
        other => LookupError::from_transport(BackendKind::Union, other),
    }
}

/// Map a VIES fault code to a classified protocol error.
pub fn fault(query: &Query, code: &str) -> LookupError {
    let state = query.code();
    let vat = query.normalized();
    let (class, message) = match code {
        "GLOBAL_MAX_CONCURRENT_REQ" => (
            FaultClass::Hard,
            "The VIES system is currently overloaded, please try again later.".to_string(),
        ),
        "GLOBAL_MAX_CONCURRENT_REQ_TIME" => (
            FaultClass::Hard,
            "The VIES system has too many requests and responses are delayed, please try again later."
                .to_string(),
        ),
        "MS_MAX_CONCURRENT_REQ" => (
            FaultClass::Hard,
            format!("The database of member state '{state}' is currently overloaded, try again later."),
        ),
        "MS_MAX_CONCURRENT_REQ_TIME" => (
            FaultClass::Hard,
            format!(
                "The database of member state '{state}' has too many requests and responses are delayed, try again later."
            ),
        ),
        "TIMEOUT" => (
            FaultClass::Hard,
            "The VIES system did not answer in time, try again later.".to_string(),
        ),
        "SERVICE_UNAVAILABLE" => (
            FaultClass::Hard,
            "The VIES system is currently unavailable and may be under maintenance, try again later."
                .to_string(),
        ),
        "SERVER_BUSY" => (
            FaultClass::Hard,
            "The VIES system is too busy to process the request, try again later.".to_string(),
        ),
        "MS_UNAVAILABLE" => (
            FaultClass::Hard,
            format!(
                "The VIES system cannot reach the database of member state '{state}', try again later."
            ),
        ),
        "IP_BLOCKED" => (
            FaultClass::Hard,
            "WARNING: the IP address of this server has been blocked by VIES, inform IT support immediately."
                .to_string(),
        ),
        "VAT_BLOCKED" => (
            FaultClass::Soft,
            format!(
                "The VAT number '{vat}' is BLOCKED. This may indicate financial problems. INFORM YOUR FINANCE DEPARTMENT IMMEDIATELY."
            ),
        ),
        "INVALID_INPUT" => (
            FaultClass::Soft,
            format!("The VAT number '{vat}' was rejected as invalid input, please check it and retry."),
        ),
        other => (
            FaultClass::Hard,
            format!("The VIES system reported '{other}' while looking up the VAT number {vat}."),
        ),
    };
    LookupError::Protocol {
        backend: BackendKind::Union,
        code: code.to_string(),
        class,
        message,
    }
}
