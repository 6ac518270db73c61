//! The lookup orchestrator.

use super::format::validate;
use super::merge::merge;
use super::router::{Route, route};
use crate::backend::{BrregBackend, HmrcBackend, UidBackend, VatBackend, ViesBackend};
use crate::core::{BackendKind, LookupError, Outcome, ResultRecord, StatusCode};

/// Validates, routes, looks up and merges.
///
/// Holds at most one adapter per backend. A jurisdiction whose backend is
/// not configured is answered like one without a lookup service.
///
/// Lookups take `&mut self`, so a checker is never shared between threads
/// as is: use one checker per thread or wrap it in a `Mutex`.
///
/// ```
/// use vatcheck::vat::VatChecker;
///
/// // No backends at all: format validation still runs.
/// let mut checker = VatChecker::builder().build();
/// let record = checker.check("DE 123 456 789");
/// assert!(record.valid);
/// assert_eq!(record.status.code(), -1);
///
/// let record = checker.check("DE12345");
/// assert!(!record.valid);
/// ```
#[derive(Default)]
pub struct VatChecker {
    vies: Option<ViesBackend>,
    uid: Option<UidBackend>,
    hmrc: Option<HmrcBackend>,
    brreg: Option<BrregBackend>,
}

/// Builder for [`VatChecker`].
#[derive(Default)]
pub struct VatCheckerBuilder {
    checker: VatChecker,
}

impl VatCheckerBuilder {
    pub fn vies(mut self, backend: ViesBackend) -> Self {
        self.checker.vies = Some(backend);
        self
    }

    pub fn uid(mut self, backend: UidBackend) -> Self {
        self.checker.uid = Some(backend);
        self
    }

    pub fn hmrc(mut self, backend: HmrcBackend) -> Self {
        self.checker.hmrc = Some(backend);
        self
    }

    pub fn brreg(mut self, backend: BrregBackend) -> Self {
        self.checker.brreg = Some(backend);
        self
    }

    pub fn build(self) -> VatChecker {
        self.checker
    }
}

impl VatChecker {
    pub fn builder() -> VatCheckerBuilder {
        VatCheckerBuilder::default()
    }

    /// Mutable access to the VIES adapter.
    pub fn vies_mut(&mut self) -> Option<&mut ViesBackend> {
        self.vies.as_mut()
    }

    fn backend_mut(&mut self, kind: BackendKind) -> Option<&mut dyn VatBackend> {
        match kind {
            BackendKind::Union => self.vies.as_mut().map(|b| b as &mut dyn VatBackend),
            BackendKind::Confederation => self.uid.as_mut().map(|b| b as &mut dyn VatBackend),
            BackendKind::IslandNation => self.hmrc.as_mut().map(|b| b as &mut dyn VatBackend),
            BackendKind::Nordic => self.brreg.as_mut().map(|b| b as &mut dyn VatBackend),
        }
    }

    /// Run one full lookup cycle for `raw` into `record`.
    ///
    /// The record is updated in every case. Format and registry rejections
    /// and unrecoverable backend failures are also returned as `Err`; soft
    /// faults and degraded results are reported through the record only.
    pub fn lookup(&mut self, raw: &str, record: &mut ResultRecord) -> Result<(), LookupError> {
        let query = match validate(raw) {
            Ok(query) => query,
            Err(err) => {
                record.reject(&err);
                return Err(err);
            }
        };

        let country = query.country();
        record.jurisdiction_code = Some(country.code.to_string());
        record.jurisdiction_name = Some(country.name.to_string());

        let backend = match route(country) {
            Route::Backend(kind) => self.backend_mut(kind),
            Route::Unsupported => None,
        };
        let Some(backend) = backend else {
            tracing::info!(vat = query.normalized(), "no lookup service for jurisdiction");
            merge(record, Outcome::unsupported(unsupported_message(country.code)));
            return Ok(());
        };

        let kind = backend.kind();
        match backend.lookup(&query) {
            Ok(outcome) => {
                let failure = StatusCode::for_fault(outcome.fault);
                merge(record, outcome);
                if let Some(StatusCode::Failure(code)) = failure {
                    record.mark_failure(code);
                }
                tracing::info!(
                    vat = query.normalized(),
                    backend = %kind,
                    status = %record.status,
                    valid = record.valid,
                    "lookup finished"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(vat = query.normalized(), backend = %kind, error = %err, "lookup failed");
                merge(record, Outcome::from_error(kind, &err));
                record.mark_failure(StatusCode::HARD_FAILURE);
                Err(err)
            }
        }
    }

    /// [`VatChecker::lookup`] into a fresh record.
    pub fn check(&mut self, raw: &str) -> ResultRecord {
        let mut record = ResultRecord::new();
        // The error is already reflected in the record.
        let _ = self.lookup(raw, &mut record);
        record
    }
}

fn unsupported_message(code: &str) -> String {
    format!(
        "The country code {code} is valid, and the VAT number matches the format for the country, but there is currently no validation service available for this country."
    )
}

#[cfg(feature = "http")]
mod http {
    use super::VatChecker;
    use crate::backend::{BrregBackend, HmrcBackend, UidBackend, ViesBackend};
    use crate::core::{ConfigError, LookupConfig};
    use crate::transport::{HttpBrreg, HttpHmrc, HttpUidConnector, HttpVies, client};
    use crate::vat::{Backoff, RetryPolicy};
    use std::time::Duration;

    impl VatChecker {
        /// A checker with HTTP transports for every backend.
        ///
        /// Fetches the VIES availability snapshot when
        /// `prefetch_vies_status` is set. A failed fetch is logged and
        /// the checker continues without a snapshot.
        pub fn from_config(config: &LookupConfig) -> Result<Self, ConfigError> {
            let http = client(config)?;
            let backoff = Backoff {
                initial: Duration::from_millis(config.backoff_initial_ms),
                max: Duration::from_secs(config.backoff_max_secs),
                ..Backoff::exponential()
            };
            let policy = |p: RetryPolicy| p.with_backoff(backoff);

            let mut vies = ViesBackend::new(Box::new(HttpVies::new(
                http.clone(),
                config.vies_url.clone(),
                config.vies_status_url.clone(),
            )))
            .with_policy(policy(RetryPolicy::vies()));
            if config.prefetch_vies_status {
                if let Err(err) = vies.prefetch_status() {
                    tracing::warn!(error = %err, "VIES status unavailable, continuing without it");
                }
            }

            let uid = UidBackend::new(Box::new(HttpUidConnector::new(config)?))
                .with_policies(
                    policy(RetryPolicy::uid_connect()),
                    policy(RetryPolicy::uid_lookup()),
                )
                .validate_only(config.uid_validate_only);

            let hmrc = HmrcBackend::new(Box::new(HttpHmrc::new(http.clone(), config.hmrc_url.clone())))
                .with_policy(policy(RetryPolicy::hmrc()))
                .with_min_interval(config.hmrc_min_interval());

            let brreg = BrregBackend::new(Box::new(HttpBrreg::new(http, config.brreg_url.clone())))
                .with_policy(policy(RetryPolicy::brreg()));

            Ok(Self::builder()
                .vies(vies)
                .uid(uid)
                .hmrc(hmrc)
                .brreg(brreg)
                .build())
        }

        /// [`VatChecker::from_config`] with [`LookupConfig::from_env`].
        pub fn from_env() -> Result<Self, ConfigError> {
            Self::from_config(&LookupConfig::from_env()?)
        }
    }
}
