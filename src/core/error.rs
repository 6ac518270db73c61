use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four remote lookup backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// EU VIES service, used for every union member.
    Union,
    /// Swiss UID register.
    Confederation,
    /// HMRC VAT register for the United Kingdom.
    IslandNation,
    /// Norwegian Brønnøysund entity register.
    Nordic,
}

impl BackendKind {
    /// Human-readable service name used in messages and logs.
    pub fn service_name(self) -> &'static str {
        match self {
            Self::Union => "VIES",
            Self::Confederation => "Swiss UID",
            Self::IslandNation => "HMRC",
            Self::Nordic => "Brønnøysund",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.service_name())
    }
}

/// How a failed or negative backend answer is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultClass {
    /// No fault.
    #[default]
    None,
    /// The service answered and rejected the identifier. Never retried.
    Soft,
    /// The service could not be reached or errored. Retryable per policy.
    Hard,
}

/// Errors from a VAT lookup.
///
/// Everything a caller can receive from [`crate::vat::VatChecker::lookup`].
/// Transport-level errors are converted into these variants by the
/// adapters; raw client errors never cross that boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The two-letter prefix is not a registered jurisdiction.
    #[error(
        "the country code '{code}' of VAT number '{input}' is not in the supported list of VAT countries"
    )]
    UnsupportedCountry { code: String, input: String },

    /// The normalized identifier does not match the jurisdiction grammar.
    #[error("the VAT number '{input}' does NOT match the VAT number format for country {code}")]
    FormatMismatch { code: String, input: String },

    /// Could not connect to the remote service.
    #[error("could not connect to the {backend} service: {message}")]
    Connection {
        backend: BackendKind,
        message: String,
    },

    /// The remote service did not answer in time.
    #[error("timed out waiting for the {backend} service: {message}")]
    Timeout {
        backend: BackendKind,
        message: String,
    },

    /// The remote service answered with an unexpected HTTP status.
    #[error("the {backend} service returned HTTP {status}")]
    HttpStatus { backend: BackendKind, status: u16 },

    /// The remote service reported a protocol-level fault.
    #[error("{message}")]
    Protocol {
        backend: BackendKind,
        code: String,
        class: FaultClass,
        message: String,
    },

    /// The response could not be decoded.
    #[error("the {backend} response could not be decoded: {message}")]
    Decode {
        backend: BackendKind,
        message: String,
    },

    /// The member state was reported unavailable when the session started.
    #[error("the VIES lookup service for member state {code} is not available")]
    MemberStateUnavailable { code: String },

    /// An adapter was used before its required setup. Never retried.
    #[error("program error: {0}")]
    Invariant(String),
}

impl LookupError {
    /// Classify this error for status reporting.
    pub fn fault_class(&self) -> FaultClass {
        match self {
            Self::UnsupportedCountry { .. } | Self::FormatMismatch { .. } => FaultClass::None,
            Self::Protocol { class, .. } => *class,
            _ => FaultClass::Hard,
        }
    }

    /// Connection-class failures worth another attempt on any backend.
    ///
    /// Covers connection failures, timeouts and HTTP 429 / 5xx answers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// Convert a transport failure that carries no protocol fault.
    ///
    /// Protocol faults are backend specific and must be classified by the
    /// adapter before falling back to this conversion; here they are
    /// treated as [`FaultClass::Hard`].
    pub fn from_transport(backend: BackendKind, err: TransportError) -> Self {
        match err {
            TransportError::Connection(message) => Self::Connection { backend, message },
            TransportError::Timeout(message) => Self::Timeout { backend, message },
            TransportError::Status { status, .. } => Self::HttpStatus { backend, status },
            TransportError::Decode(message) => Self::Decode { backend, message },
            TransportError::Fault { code, message } => Self::Protocol {
                backend,
                message: format!(
                    "the {backend} service reported '{}'",
                    message.as_deref().unwrap_or(&code)
                ),
                code,
                class: FaultClass::Hard,
            },
        }
    }
}

/// Boundary error of the transport traits.
///
/// Transport implementations report what happened on the wire; the
/// adapters decide what it means.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    Connection(String),
    /// Connect or read timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Non-success HTTP status without a recognizable fault body.
    #[error("HTTP {status}")]
    Status { status: u16, body: String },
    /// Protocol-level fault with a discrete code.
    #[error("service fault {code}")]
    Fault {
        code: String,
        message: Option<String>,
    },
    /// The body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}
