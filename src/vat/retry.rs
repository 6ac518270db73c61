//! Retry executor with exponential backoff.
//!
//! Every remote call made by a backend adapter runs inside
//! [`RetryPolicy::run`]. The policy decides how often to try and which
//! errors are worth another attempt; the backoff decides how long to wait
//! between attempts.

use std::time::Duration;

use crate::core::{FaultClass, LookupError};

/// Exponential backoff: `initial * multiplier^(n-1)` capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub multiplier: u32,
    pub max: Duration,
}

impl Backoff {
    /// 1 s, doubling, capped at 20 s.
    pub const fn exponential() -> Self {
        Self {
            initial: Duration::from_secs(1),
            multiplier: 2,
            max: Duration::from_secs(20),
        }
    }

    /// No waiting at all. Used by tests.
    pub const fn none() -> Self {
        Self {
            initial: Duration::ZERO,
            multiplier: 1,
            max: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry.saturating_sub(1));
        self.initial.saturating_mul(factor).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::exponential()
    }
}

/// Decides whether an error is worth another attempt.
pub type RetryPredicate = fn(&LookupError) -> bool;

/// Attempt ceiling, backoff and retry predicate for one kind of call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Treated as at least 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub retryable: RetryPredicate,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, retryable: RetryPredicate) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::default(),
            retryable,
        }
    }

    /// VIES lookups: transient errors and hard service faults, 5 attempts.
    pub fn vies() -> Self {
        Self::new(5, |e| {
            e.is_transient()
                || matches!(
                    e,
                    LookupError::Protocol {
                        class: FaultClass::Hard,
                        ..
                    }
                )
        })
    }

    /// Swiss UID session setup: anything but client errors, 10 attempts.
    pub fn uid_connect() -> Self {
        Self::new(10, |e| match e {
            LookupError::HttpStatus { status, .. } => !(400..=499).contains(status),
            LookupError::Invariant(_) | LookupError::MemberStateUnavailable { .. } => false,
            _ => true,
        })
    }

    /// Swiss UID stage calls: transient errors only, 5 attempts.
    pub fn uid_lookup() -> Self {
        Self::new(5, LookupError::is_transient)
    }

    /// HMRC lookups: transient errors only, 10 attempts.
    pub fn hmrc() -> Self {
        Self::new(10, LookupError::is_transient)
    }

    /// Brønnøysund lookups: transient errors only, 10 attempts.
    pub fn brreg() -> Self {
        Self::new(10, LookupError::is_transient)
    }

    /// Replace the backoff schedule.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run `op` until it succeeds, the predicate rejects the error, or the
    /// attempt ceiling is reached. The last error is returned unchanged.
    pub fn run<T, F>(&self, op_name: &str, mut op: F) -> Result<T, LookupError>
    where
        F: FnMut() -> Result<T, LookupError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && self.should_retry(&err) => {
                    let delay = self.backoff.delay_for(attempt);
                    tracing::warn!(
                        op = op_name,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "lookup call failed, retrying"
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn should_retry(&self, err: &LookupError) -> bool {
        !matches!(
            err,
            LookupError::Invariant(_) | LookupError::MemberStateUnavailable { .. }
        ) && (self.retryable)(err)
    }
}
