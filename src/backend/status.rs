//! VIES member state availability snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::vies::ViesTransport;
use crate::core::{BackendKind, LookupError};

/// Body of the VIES `check-status` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViesStatusResponse {
    #[serde(default)]
    pub vow: Option<VowStatus>,
    #[serde(default)]
    pub countries: Vec<MemberStateStatus>,
}

/// Availability of the status checker itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VowStatus {
    #[serde(default)]
    pub available: bool,
}

/// Availability of one member state database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStateStatus {
    pub country_code: String,
    /// `Available`, `Unavailable` or `Monitoring Disabled`.
    pub availability: String,
}

/// Member states reported unavailable at one point in time.
///
/// Fetched once and never refreshed. Long-running callers should compare
/// [`ServiceStatus::fetched_at`] with the current time and rebuild the
/// snapshot when it is too old for their purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    unavailable: BTreeSet<String>,
    fetched_at: DateTime<Utc>,
}

impl ServiceStatus {
    /// Query the VIES status endpoint.
    pub fn fetch(transport: &dyn ViesTransport) -> Result<Self, LookupError> {
        let response = transport
            .check_status()
            .map_err(|e| LookupError::from_transport(BackendKind::Union, e))?;
        let status = Self::from_response(&response);
        tracing::info!(
            unavailable = ?status.unavailable,
            "fetched VIES member state availability"
        );
        Ok(status)
    }

    /// Build a snapshot from a decoded status response.
    ///
    /// When the status checker reports itself unavailable the country list
    /// is not trusted and the snapshot is empty.
    pub fn from_response(response: &ViesStatusResponse) -> Self {
        let checker_up = response.vow.is_some_and(|v| v.available);
        if !checker_up {
            tracing::warn!("VIES status checker is not available, assuming all member states are");
        }
        let unavailable = response
            .countries
            .iter()
            .filter(|_| checker_up)
            .filter(|c| c.availability.eq_ignore_ascii_case("Unavailable"))
            .map(|c| c.country_code.to_ascii_uppercase())
            .collect();
        Self {
            unavailable,
            fetched_at: Utc::now(),
        }
    }

    /// A snapshot with an explicit set of unavailable member states.
    pub fn with_unavailable<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unavailable: codes.into_iter().map(Into::into).collect(),
            fetched_at: Utc::now(),
        }
    }

    /// Whether member state `code` was reported unavailable.
    pub fn is_unavailable(&self, code: &str) -> bool {
        self.unavailable.contains(code)
    }

    /// Codes reported unavailable, sorted.
    pub fn unavailable(&self) -> impl Iterator<Item = &str> {
        self.unavailable.iter().map(String::as_str)
    }

    /// When the snapshot was taken.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}
