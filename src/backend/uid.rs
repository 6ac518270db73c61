//! Swiss UID register adapter.
//!
//! The register is queried in two stages over one short-lived session:
//! `ValidateUID` answers whether the number is an active VAT number and
//! `GetByUID` returns the registered organisation. A new session is
//! connected for every lookup and dropped afterwards.

use serde::{Deserialize, Serialize};

use super::VatBackend;
use crate::core::{BackendKind, FaultClass, LookupError, Outcome, TransportError};
use crate::vat::{Query, RetryPolicy};

/// Organisation details returned by `GetByUID`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UidOrganisation {
    pub organisation_name: Option<String>,
    pub additional_name: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub town: Option<String>,
    pub swiss_zip_code: Option<String>,
    pub foreign_zip_code: Option<String>,
    pub country_code: Option<String>,
}

/// Opens sessions against the UID service.
pub trait UidConnector: Send {
    fn connect(&self) -> Result<Box<dyn UidSession>, TransportError>;
}

/// One connected UID session.
pub trait UidSession: Send {
    /// Stage 1. SOAP faults are reported as [`TransportError::Fault`].
    fn validate_uid(&self, uid: &str) -> Result<bool, TransportError>;

    /// Stage 2. `None` when the service returned no organisation.
    fn get_by_uid(
        &self,
        category: &str,
        id: &str,
    ) -> Result<Option<UidOrganisation>, TransportError>;
}

/// Lookup adapter for Switzerland.
pub struct UidBackend {
    connector: Box<dyn UidConnector>,
    session: Option<Box<dyn UidSession>>,
    connect_policy: RetryPolicy,
    lookup_policy: RetryPolicy,
    validate_only: bool,
}

impl UidBackend {
    pub fn new(connector: Box<dyn UidConnector>) -> Self {
        Self {
            connector,
            session: None,
            connect_policy: RetryPolicy::uid_connect(),
            lookup_policy: RetryPolicy::uid_lookup(),
            validate_only: false,
        }
    }

    pub fn with_policies(mut self, connect: RetryPolicy, lookup: RetryPolicy) -> Self {
        self.connect_policy = connect;
        self.lookup_policy = lookup;
        self
    }

    /// Skip the `GetByUID` stage.
    pub fn validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    /// Open a fresh session, replacing any previous one.
    pub fn connect(&mut self) -> Result<(), LookupError> {
        let connector = &self.connector;
        let session = self.connect_policy.run("uid.connect", || {
            connector
                .connect()
                .map_err(|e| LookupError::from_transport(BackendKind::Confederation, e))
        })?;
        tracing::debug!("connected to the Swiss UID service");
        self.session = Some(session);
        Ok(())
    }

    /// Whether a session is currently open.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&dyn UidSession, LookupError> {
        self.session.as_deref().ok_or_else(|| {
            LookupError::Invariant("Swiss UID session used before connect()".to_string())
        })
    }

    /// Stage 1: is the number an active VAT number?
    pub fn validate_stage(&self, query: &Query) -> Result<bool, LookupError> {
        let session = self.session()?;
        let uid = query.normalized();
        self.lookup_policy.run("uid.validate", || {
            session.validate_uid(uid).map_err(stage_error)
        })
    }

    /// Stage 2: the registered organisation, if disclosed.
    pub fn details_stage(&self, query: &Query) -> Result<Option<UidOrganisation>, LookupError> {
        let session = self.session()?;
        let (category, id) = split_uid(query.normalized());
        self.lookup_policy.run("uid.details", || {
            session.get_by_uid(category, id).map_err(stage_error)
        })
    }

    fn run_stages(&self, query: &Query) -> Result<Outcome, LookupError> {
        let vat = query.normalized();
        match self.validate_stage(query) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(vat, "Swiss UID reports number invalid");
                return Ok(Outcome::invalid(
                    BackendKind::Confederation,
                    format!(
                        "The UID number, {vat}, is not a valid VAT number. The number may exist, but not be of type VAT."
                    ),
                ));
            }
            Err(LookupError::Protocol {
                class: FaultClass::Soft,
                message,
                ..
            }) => return Ok(Outcome::soft_fault(BackendKind::Confederation, message)),
            Err(err) => return Err(err),
        }

        let mut outcome = Outcome {
            valid: true,
            service_confirmed: true,
            ..Outcome::new(BackendKind::Confederation)
        };
        if self.validate_only {
            return Ok(outcome);
        }

        let withheld = match self.details_stage(query) {
            Ok(Some(org)) => {
                apply_organisation(&mut outcome, org);
                None
            }
            Ok(None) => Some(format!(
                "The VAT/UID number {vat} is valid, but the company details are withheld."
            )),
            Err(err @ LookupError::Invariant(_)) => return Err(err),
            Err(err) => {
                tracing::warn!(vat, error = %err, "Swiss UID detail lookup failed");
                Some(format!(
                    "The VAT/UID number {vat} is valid, but the company details could not be retrieved: {err}"
                ))
            }
        };

        if let Some(message) = withheld {
            outcome.has_details = false;
            outcome.error_message = Some(message);
            outcome.country_code = Some(query.code().to_string());
        }
        Ok(outcome)
    }
}

impl VatBackend for UidBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Confederation
    }

    fn lookup(&mut self, query: &Query) -> Result<Outcome, LookupError> {
        self.connect()?;
        let result = self.run_stages(query);
        self.session = None;
        result
    }
}

/// SOAP faults on the stage calls are explicit rejections, never retried.
fn stage_error(err: TransportError) -> LookupError {
    match err {
        TransportError::Fault { code, message } => LookupError::Protocol {
            backend: BackendKind::Confederation,
            message: format!(
                "the Swiss UID service rejected the request: {}",
                message.as_deref().unwrap_or(&code)
            ),
            code,
            class: FaultClass::Soft,
        },
        other => LookupError::from_transport(BackendKind::Confederation, other),
    }
}

/// `CHE123456789` -> (`CHE`, `123456789`).
fn split_uid(normalized: &str) -> (&str, &str) {
    normalized.split_at(normalized.len().min(3))
}

fn apply_organisation(outcome: &mut Outcome, org: UidOrganisation) {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    outcome.company_name = non_empty(org.additional_name).or(non_empty(org.organisation_name));
    let street = format!(
        "{} {}",
        org.street.as_deref().unwrap_or_default(),
        org.house_number.as_deref().unwrap_or_default()
    );
    outcome.street = non_empty(Some(street.trim().to_string()));
    outcome.city = non_empty(org.town);
    outcome.postal_code = non_empty(org.swiss_zip_code).or(non_empty(org.foreign_zip_code));
    outcome.country_code = non_empty(org.country_code);
    outcome.has_details = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_split() {
        assert_eq!(split_uid("CHE123456789"), ("CHE", "123456789"));
        assert_eq!(split_uid("CH"), ("CH", ""));
    }

    #[test]
    fn additional_name_wins() {
        let mut o = Outcome::new(BackendKind::Confederation);
        apply_organisation(
            &mut o,
            UidOrganisation {
                organisation_name: Some("Muster AG".into()),
                additional_name: Some("Muster Handel".into()),
                street: Some("Bahnhofstrasse".into()),
                house_number: Some("1".into()),
                town: Some("Zürich".into()),
                swiss_zip_code: Some("8001".into()),
                country_code: Some("CH".into()),
                ..UidOrganisation::default()
            },
        );
        assert_eq!(o.company_name.as_deref(), Some("Muster Handel"));
        assert_eq!(o.street.as_deref(), Some("Bahnhofstrasse 1"));
        assert_eq!(o.postal_code.as_deref(), Some("8001"));
        assert!(o.has_details);
    }

    #[test]
    fn foreign_zip_and_missing_house_number() {
        let mut o = Outcome::new(BackendKind::Confederation);
        apply_organisation(
            &mut o,
            UidOrganisation {
                organisation_name: Some("Alpen Treuhand".into()),
                street: Some("Städtle".into()),
                foreign_zip_code: Some("9490".into()),
                country_code: Some("LI".into()),
                ..UidOrganisation::default()
            },
        );
        assert_eq!(o.company_name.as_deref(), Some("Alpen Treuhand"));
        assert_eq!(o.street.as_deref(), Some("Städtle"));
        assert_eq!(o.postal_code.as_deref(), Some("9490"));
    }

    #[test]
    fn stage_faults_are_soft() {
        let e = stage_error(TransportError::Fault {
            code: "s:Client".into(),
            message: Some("Request_Invalid".into()),
        });
        assert_eq!(e.fault_class(), FaultClass::Soft);
        assert!(!e.is_transient());
    }
}
