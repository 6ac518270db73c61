//! Core types: jurisdiction registry, result records, errors and configuration.
//!
//! Everything here is free of I/O. The engine in [`crate::vat`] and the
//! adapters in [`crate::backend`] are built on these types.

mod config;
mod countries;
mod error;
mod record;

pub use config::*;
pub use countries::*;
pub use error::*;
pub use record::*;
