//! Brønnøysund entity register adapter for Norway.

use serde::{Deserialize, Serialize};

use super::VatBackend;
use crate::core::{BackendKind, LookupError, Outcome, TransportError};
use crate::vat::{Query, RetryPolicy};

/// A registered entity (`/enhetsregisteret/api/enheter/{orgnr}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrregEntity {
    pub organisasjonsnummer: Option<String>,
    pub navn: Option<String>,
    #[serde(rename = "registrertIMvaregisteret")]
    pub registrert_i_mvaregisteret: Option<bool>,
    pub forretningsadresse: Option<BrregAddress>,
}

/// Business address of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrregAddress {
    pub adresse: Vec<String>,
    pub postnummer: Option<String>,
    pub poststed: Option<String>,
    pub landkode: Option<String>,
}

/// Wire access to the Brønnøysund register.
pub trait BrregTransport: Send {
    /// `Ok(None)` on HTTP 404 or 410 (deleted entity).
    fn entity(&self, number: &str) -> Result<Option<BrregEntity>, TransportError>;
}

/// Lookup adapter for Norway.
pub struct BrregBackend {
    transport: Box<dyn BrregTransport>,
    policy: RetryPolicy,
}

impl BrregBackend {
    pub fn new(transport: Box<dyn BrregTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::brreg(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl VatBackend for BrregBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Nordic
    }

    fn lookup(&mut self, query: &Query) -> Result<Outcome, LookupError> {
        let transport = &self.transport;
        let found = self.policy.run("brreg.entity", || {
            transport
                .entity(query.number())
                .map_err(|e| LookupError::from_transport(BackendKind::Nordic, e))
        })?;

        match found {
            Some(entity) => Ok(interpret(entity)),
            None => {
                tracing::info!(vat = query.normalized(), "company not in Brønnøysund register");
                Ok(Outcome::invalid(
                    BackendKind::Nordic,
                    "Company ID does not exist in register",
                ))
            }
        }
    }
}

fn interpret(entity: BrregEntity) -> Outcome {
    let mut outcome = Outcome {
        valid: true,
        service_confirmed: entity.registrert_i_mvaregisteret == Some(true),
        company_name: entity.navn.filter(|n| !n.trim().is_empty()),
        ..Outcome::new(BackendKind::Nordic)
    };
    if !outcome.service_confirmed {
        outcome.error_message = Some("The company exists but is not registered for VAT".to_string());
    }

    if let Some(address) = entity.forretningsadresse {
        let street = address
            .adresse
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        outcome.street = Some(street).filter(|s| !s.is_empty());
        outcome.postal_code = address.postnummer;
        outcome.city = address.poststed;
        outcome.country_code = address.landkode;
        outcome.has_details = true;
    }
    outcome
}
