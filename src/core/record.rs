//! The canonical result record and the per-backend outcome folded into it.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::{BackendKind, FaultClass, LookupError};

/// Lookup status of a [`ResultRecord`].
///
/// Serialized as a bare integer: `-1` not attempted, `0` success, any
/// other value a failure code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusCode {
    /// No successful lookup has completed (yet).
    #[default]
    NotAttempted,
    /// The backend affirmed the identifier.
    Success,
    /// The lookup ended in a classified failure.
    Failure(i32),
}

impl StatusCode {
    /// Failure code for hard / unrecoverable failures.
    pub const HARD_FAILURE: i32 = 1;
    /// Failure code for soft faults reported by the service.
    pub const SOFT_FAILURE: i32 = 2;

    /// Integer form.
    pub fn code(self) -> i32 {
        match self {
            Self::NotAttempted => -1,
            Self::Success => 0,
            Self::Failure(code) => code,
        }
    }

    /// Inverse of [`StatusCode::code`].
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::NotAttempted,
            0 => Self::Success,
            other => Self::Failure(other),
        }
    }

    /// Failure status for a fault class. `None` for [`FaultClass::None`].
    pub fn for_fault(class: FaultClass) -> Option<Self> {
        match class {
            FaultClass::None => None,
            FaultClass::Soft => Some(Self::Failure(Self::SOFT_FAILURE)),
            FaultClass::Hard => Some(Self::Failure(Self::HARD_FAILURE)),
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::from_code)
    }
}

/// Caller-visible result of one lookup cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Lookup status, see [`StatusCode`].
    pub status: StatusCode,
    /// Whether the identifier is considered valid.
    pub valid: bool,
    /// The remote service confirmed the number is registered for VAT.
    pub service_confirmed: bool,
    /// Explanation of the last failure or degraded result.
    pub error_message: Option<String>,
    /// Whether structured company details were retrieved.
    pub has_details: bool,
    /// Registered company name.
    pub company_name: Option<String>,
    /// Street, possibly multi-line.
    pub street: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Backend-confirmed jurisdiction code, else the declared prefix.
    pub jurisdiction_code: Option<String>,
    /// Display name of `jurisdiction_code`.
    pub jurisdiction_name: Option<String>,
    /// Backend that answered, if one was contacted.
    pub backend: Option<BackendKind>,
    /// Request date reported by the service.
    pub request_date: Option<NaiveDate>,
}

impl ResultRecord {
    /// A fresh record: `NotAttempted`, invalid, every optional field empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the lookup finished with [`StatusCode::Success`].
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::Success
    }

    /// Move to `Success`. No-op once the status left `NotAttempted`.
    pub fn mark_success(&mut self) {
        if self.status == StatusCode::NotAttempted {
            self.status = StatusCode::Success;
        }
    }

    /// Move to `Failure(code)`. No-op once the status left `NotAttempted`.
    pub fn mark_failure(&mut self, code: i32) {
        if self.status == StatusCode::NotAttempted {
            self.status = StatusCode::Failure(code);
        }
    }

    /// Record a terminal format / registry rejection.
    pub fn reject(&mut self, err: &LookupError) {
        self.error_message = Some(err.to_string());
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        let id = self.jurisdiction_code.as_deref().unwrap_or("??");
        if self.is_success() {
            return format!(
                "{id}: valid ({})",
                self.company_name.as_deref().unwrap_or("no details")
            );
        }
        let verdict = if self.valid { "valid, unconfirmed" } else { "invalid" };
        match &self.error_message {
            Some(msg) => format!("{id}: {verdict} ({msg})"),
            None => format!("{id}: {verdict}"),
        }
    }
}

/// What one backend call produced.
///
/// Created fresh by every adapter call and consumed by
/// [`crate::vat::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Backend that answered. `None` when no backend was contacted.
    pub backend: Option<BackendKind>,
    /// The backend affirmed the identifier.
    pub valid: bool,
    /// The backend confirmed VAT registration.
    pub service_confirmed: bool,
    pub company_name: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    /// Jurisdiction code reported by the backend.
    pub country_code: Option<String>,
    pub has_details: bool,
    pub error_message: Option<String>,
    pub fault: FaultClass,
    /// A parse failure that prevents the record from being reported as a
    /// success even though the backend affirmed validity.
    pub parse_blocked: bool,
    pub request_date: Option<NaiveDate>,
}

impl Outcome {
    /// An empty outcome attributed to `backend`.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend: Some(backend),
            ..Self::default()
        }
    }

    /// The backend answered that the identifier is not valid.
    pub fn invalid(backend: BackendKind, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::new(backend)
        }
    }

    /// The backend rejected the request with a soft fault.
    pub fn soft_fault(backend: BackendKind, message: impl Into<String>) -> Self {
        Self {
            fault: FaultClass::Soft,
            ..Self::invalid(backend, message)
        }
    }

    /// Format-valid identifier without a lookup service. No backend contacted.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Unrecoverable error raised by `backend`.
    pub fn from_error(backend: BackendKind, err: &LookupError) -> Self {
        Self {
            fault: match err.fault_class() {
                FaultClass::None => FaultClass::Hard,
                class => class,
            },
            ..Self::invalid(backend, err.to_string())
        }
    }
}
