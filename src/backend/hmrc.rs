//! HMRC VAT register adapter for the United Kingdom.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::VatBackend;
use crate::core::{BackendKind, LookupError, Outcome, TransportError};
use crate::vat::{Query, RetryPolicy};

/// Body of a successful HMRC lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HmrcLookupResponse {
    pub target: HmrcTarget,
    #[serde(default)]
    pub processing_date: Option<String>,
}

/// The registered trader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HmrcTarget {
    pub name: Option<String>,
    pub vat_number: Option<String>,
    /// `line1`..`lineN`, `postcode`, `countryCode`.
    pub address: BTreeMap<String, String>,
}

/// Wire access to the HMRC lookup endpoint.
pub trait HmrcTransport: Send {
    /// `Ok(None)` on HTTP 404, the defined "not registered" answer.
    fn lookup(&self, number: &str) -> Result<Option<HmrcLookupResponse>, TransportError>;
}

/// Published limit is three requests per second.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(334);

/// Lookup adapter for Great Britain.
pub struct HmrcBackend {
    transport: Box<dyn HmrcTransport>,
    policy: RetryPolicy,
    min_interval: Duration,
}

impl HmrcBackend {
    pub fn new(transport: Box<dyn HmrcTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::hmrc(),
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Minimum pause before every call.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }
}

impl VatBackend for HmrcBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::IslandNation
    }

    fn lookup(&mut self, query: &Query) -> Result<Outcome, LookupError> {
        let transport = &self.transport;
        let min_interval = self.min_interval;
        let found = self.policy.run("hmrc.lookup", || {
            if !min_interval.is_zero() {
                std::thread::sleep(min_interval);
            }
            transport
                .lookup(query.number())
                .map_err(|e| LookupError::from_transport(BackendKind::IslandNation, e))
        })?;

        let Some(response) = found else {
            tracing::info!(vat = query.normalized(), "HMRC reports number not registered");
            return Ok(Outcome::invalid(
                BackendKind::IslandNation,
                format!("The VAT number {} is not registered with HMRC.", query.normalized()),
            ));
        };
        Ok(interpret(response))
    }
}

fn interpret(response: HmrcLookupResponse) -> Outcome {
    let request_date = response
        .processing_date
        .as_deref()
        .and_then(|d| d.get(..10))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

    let mut outcome = Outcome {
        valid: true,
        service_confirmed: true,
        company_name: response.target.name.filter(|n| !n.trim().is_empty()),
        request_date,
        ..Outcome::new(BackendKind::IslandNation)
    };

    let address = response.target.address;
    if address.is_empty() {
        return outcome;
    }

    outcome.street = Some(join_lines(&address)).filter(|s| !s.is_empty());
    outcome.postal_code = address.get("postcode").cloned();
    outcome.country_code = address.get("countryCode").cloned();
    outcome.has_details = true;
    outcome
}

/// `line1`, `line2`, ... `line10` in numeric order, newline separated.
fn join_lines(address: &BTreeMap<String, String>) -> String {
    let mut lines: Vec<(u32, &str)> = address
        .iter()
        .filter_map(|(key, value)| {
            let n = key.strip_prefix("line")?.parse().ok()?;
            Some((n, value.as_str()))
        })
        .collect();
    lines.sort_by_key(|&(n, _)| n);
    lines
        .into_iter()
        .map(|(_, line)| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
