//! VAT number validation, routing, retry and result merging.
//!
//! # Example
//!
//! ```
//! use vatcheck::vat::{self, Route};
//! use vatcheck::BackendKind;
//!
//! let query = vat::validate("CHE-123.456.789").unwrap();
//! assert_eq!(query.code(), "CH");
//! assert_eq!(vat::route(query.country()), Route::Backend(BackendKind::Confederation));
//! ```

mod checker;
mod format;
mod merge;
mod retry;
mod router;

pub use checker::{VatChecker, VatCheckerBuilder};
pub use format::{Query, normalize, validate};
pub use merge::merge;
pub use retry::{Backoff, RetryPolicy, RetryPredicate};
pub use router::{Route, route, select};
