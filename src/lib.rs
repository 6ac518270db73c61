//! # vatcheck
//!
//! VAT number validation and lookup across a fixed set of jurisdictions:
//! the EU VIES service, the Swiss UID register, HMRC for the United Kingdom
//! and the Norwegian Brønnøysund register.
//!
//! A lookup runs four stages on the calling thread:
//!
//! 1. the identifier is normalized and checked against the grammar of its
//!    jurisdiction ([`vat::validate`], no network),
//! 2. the jurisdiction is routed to one of four backends ([`vat::route`]),
//! 3. the backend is called under its own retry policy ([`vat::RetryPolicy`]),
//! 4. the backend outcome is folded into one [`ResultRecord`] ([`vat::merge`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use vatcheck::vat;
//!
//! // Format-only validation (no network)
//! let query = vat::validate("ATU 123-45678").unwrap();
//! assert_eq!(query.normalized(), "ATU12345678");
//! assert_eq!(query.country().name, "Austria");
//! assert!(vat::validate("XX123456").is_err());
//! ```
//!
//! ```no_run
//! # #[cfg(feature = "http")]
//! # {
//! use vatcheck::vat::VatChecker;
//!
//! let mut checker = VatChecker::from_env().unwrap();
//! let record = checker.check("DE123456789");
//! println!("{} valid={}", record.status, record.valid);
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `http` (default) | Blocking `reqwest` transports for all four backends |
//!
//! Without `http` the crate only defines the transport traits; callers bring
//! their own clients.

pub mod backend;
pub mod core;
pub mod vat;

#[cfg(feature = "http")]
pub mod transport;

// Re-export core types at crate root for convenience
pub use crate::core::*;
