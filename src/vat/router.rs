//! Jurisdiction to backend routing.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::core::{BackendKind, CountryInfo};

/// Where a validated query is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// One of the four remote lookup services.
    Backend(BackendKind),
    /// The number is well-formed but no lookup service exists.
    Unsupported,
}

/// Non-members that have a dedicated national register.
static SPECIAL_CASES: LazyLock<HashMap<&'static str, BackendKind>> = LazyLock::new(|| {
    HashMap::from([
        ("CH", BackendKind::Confederation),
        ("GB", BackendKind::IslandNation),
        ("NO", BackendKind::Nordic),
    ])
});

/// Pick the backend for a jurisdiction.
///
/// Union members always go to VIES. Returns `None` for jurisdictions
/// without a lookup service.
pub fn select(code: &str, union_member: bool) -> Option<BackendKind> {
    if union_member {
        return Some(BackendKind::Union);
    }
    SPECIAL_CASES.get(code).copied()
}

/// Route a registry entry.
pub fn route(country: &CountryInfo) -> Route {
    let route = match select(country.code, country.union_member) {
        Some(kind) => Route::Backend(kind),
        None => Route::Unsupported,
    };
    tracing::debug!(code = country.code, ?route, "routed jurisdiction");
    route
}
