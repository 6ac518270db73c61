//! Folding a backend [`Outcome`] into the caller's [`ResultRecord`].

use crate::core::{CountryRegistry, FaultClass, Outcome, ResultRecord};

/// Merge `outcome` into `record`.
///
/// Non-empty fields overwrite, flags are only ever raised. The status moves
/// to `Success` when a backend affirmed validity without a fault and no
/// blocking parse error occurred. Failure codes are left to the caller.
pub fn merge(record: &mut ResultRecord, outcome: Outcome) {
    let success = is_success(&outcome);

    copy_text(&mut record.company_name, outcome.company_name);
    copy_text(&mut record.street, outcome.street);
    copy_text(&mut record.postal_code, outcome.postal_code);
    copy_text(&mut record.city, outcome.city);

    if outcome.valid {
        record.valid = true;
    }
    if outcome.service_confirmed {
        record.service_confirmed = true;
    }
    if outcome.has_details {
        record.has_details = true;
    }
    if outcome.error_message.is_some() {
        record.error_message = outcome.error_message;
    }
    if outcome.request_date.is_some() {
        record.request_date = outcome.request_date;
    }
    if outcome.backend.is_some() {
        record.backend = outcome.backend;
    }

    resolve_jurisdiction(record, outcome.country_code.as_deref());

    if success {
        record.mark_success();
    }
}

fn is_success(outcome: &Outcome) -> bool {
    outcome.backend.is_some()
        && outcome.valid
        && outcome.fault == FaultClass::None
        && !outcome.parse_blocked
}

fn copy_text(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        *target = Some(v);
    }
}

/// Prefer the backend-confirmed code when the registry knows it.
fn resolve_jurisdiction(record: &mut ResultRecord, confirmed: Option<&str>) {
    let registry = CountryRegistry::global();
    let known = confirmed
        .map(str::trim)
        .map(str::to_ascii_uppercase)
        .and_then(|code| registry.lookup(&code));

    match known {
        Some(country) => {
            record.jurisdiction_code = Some(country.code.to_string());
            record.jurisdiction_name = Some(country.name.to_string());
        }
        None => {
            if let Some(country) = record
                .jurisdiction_code
                .as_deref()
                .and_then(|code| registry.lookup(code))
            {
                record.jurisdiction_name = Some(country.name.to_string());
            }
        }
    }
}
