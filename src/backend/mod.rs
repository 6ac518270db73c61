//! Remote lookup backends.
//!
//! One adapter per service. Each adapter owns a transport (a trait object
//! so tests and callers can bring their own client), wraps every remote
//! call in its [`RetryPolicy`](crate::vat::RetryPolicy) and turns the
//! service's answer into an [`Outcome`].
//!
//! | Backend | Jurisdictions | Transport trait |
//! |---------|---------------|-----------------|
//! | [`ViesBackend`] | union members | [`ViesTransport`] |
//! | [`UidBackend`] | CH | [`UidConnector`] / [`UidSession`] |
//! | [`HmrcBackend`] | GB | [`HmrcTransport`] |
//! | [`BrregBackend`] | NO | [`BrregTransport`] |

mod address;
mod brreg;
mod hmrc;
mod status;
mod uid;
mod vies;

pub use address::{AddressError, ParsedAddress, address_pattern, parse_address};
pub use brreg::{BrregAddress, BrregBackend, BrregEntity, BrregTransport};
pub use hmrc::{HmrcBackend, HmrcLookupResponse, HmrcTarget, HmrcTransport};
pub use status::{MemberStateStatus, ServiceStatus, ViesStatusResponse, VowStatus};
pub use uid::{UidBackend, UidConnector, UidOrganisation, UidSession};
pub use vies::{ViesBackend, ViesErrorWrapper, ViesRequest, ViesResponse, ViesTransport};

use crate::core::{BackendKind, LookupError, Outcome};
use crate::vat::Query;

/// A remote VAT lookup service.
pub trait VatBackend {
    /// Which service this adapter talks to.
    fn kind(&self) -> BackendKind;

    /// Look up a validated query.
    ///
    /// Soft faults come back as `Ok` outcomes with
    /// [`FaultClass::Soft`](crate::core::FaultClass::Soft); hard faults as
    /// `Err` once the retry policy gave up.
    fn lookup(&mut self, query: &Query) -> Result<Outcome, LookupError>;
}
