use std::time::Duration;

use vatcheck::vat::{Backoff, RetryPolicy};
use vatcheck::{BackendKind, FaultClass, LookupError};

fn connection() -> LookupError {
    LookupError::Connection {
        backend: BackendKind::Union,
        message: "refused".into(),
    }
}

fn protocol(class: FaultClass) -> LookupError {
    LookupError::Protocol {
        backend: BackendKind::Union,
        code: "X".into(),
        class,
        message: "x".into(),
    }
}

/// Run `policy` against a script of errors; Ok once the script runs dry.
fn run_script(policy: RetryPolicy, errors: Vec<LookupError>) -> (Result<u32, LookupError>, u32) {
    let policy = policy.with_backoff(Backoff::none());
    let mut errors = errors.into_iter();
    let mut calls = 0;
    let result = policy.run("script", || {
        calls += 1;
        match errors.next() {
            Some(err) => Err(err),
            None => Ok(calls),
        }
    });
    (result, calls)
}

// ---------------------------------------------------------------------------
// Attempt ceilings
// ---------------------------------------------------------------------------

#[test]
fn success_on_first_attempt() {
    let (result, calls) = run_script(RetryPolicy::vies(), vec![]);
    assert_eq!(result, Ok(1));
    assert_eq!(calls, 1);
}

#[test]
fn recovers_before_ceiling() {
    let (result, calls) = run_script(RetryPolicy::vies(), vec![connection(); 4]);
    assert_eq!(result, Ok(5));
    assert_eq!(calls, 5);
}

#[test]
fn ceilings_per_policy() {
    let cases = [
        (RetryPolicy::vies(), 5),
        (RetryPolicy::uid_connect(), 10),
        (RetryPolicy::uid_lookup(), 5),
        (RetryPolicy::hmrc(), 10),
        (RetryPolicy::brreg(), 10),
    ];
    for (policy, ceiling) in cases {
        let (result, calls) = run_script(policy, vec![connection(); 20]);
        assert_eq!(result, Err(connection()));
        assert_eq!(calls, ceiling);
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

#[test]
fn vies_retries_hard_faults_only() {
    let (_, calls) = run_script(RetryPolicy::vies(), vec![protocol(FaultClass::Hard); 2]);
    assert_eq!(calls, 3);
    let (result, calls) = run_script(RetryPolicy::vies(), vec![protocol(FaultClass::Soft)]);
    assert_eq!(calls, 1);
    assert_eq!(result, Err(protocol(FaultClass::Soft)));
}

#[test]
fn uid_stages_never_retry_protocol_faults() {
    let (_, calls) = run_script(RetryPolicy::uid_lookup(), vec![protocol(FaultClass::Hard)]);
    assert_eq!(calls, 1);
}

#[test]
fn uid_connect_retries_decode_errors() {
    let decode = LookupError::Decode {
        backend: BackendKind::Confederation,
        message: "bad wsdl".into(),
    };
    let (result, calls) = run_script(RetryPolicy::uid_connect(), vec![decode; 2]);
    assert_eq!(result, Ok(3));
    assert_eq!(calls, 3);
}

#[test]
fn invariant_is_never_retried() {
    for policy in [RetryPolicy::vies(), RetryPolicy::uid_connect(), RetryPolicy::hmrc()] {
        let (result, calls) = run_script(policy, vec![LookupError::Invariant("no session".into())]);
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(LookupError::Invariant(_))));
    }
}

#[test]
fn custom_predicate_still_skips_invariant() {
    let policy = RetryPolicy::new(3, |_| true);
    let (_, calls) = run_script(policy, vec![LookupError::Invariant("x".into())]);
    assert_eq!(calls, 1);
}

#[test]
fn http_statuses() {
    let status = |status| LookupError::HttpStatus {
        backend: BackendKind::Nordic,
        status,
    };
    let (_, calls) = run_script(RetryPolicy::brreg(), vec![status(503), status(502)]);
    assert_eq!(calls, 3);
    let (_, calls) = run_script(RetryPolicy::brreg(), vec![status(404)]);
    assert_eq!(calls, 1);
}

// ---------------------------------------------------------------------------
// Backoff
// ---------------------------------------------------------------------------

#[test]
fn default_backoff_caps_at_twenty_seconds() {
    let b = Backoff::default();
    assert_eq!(b.delay_for(1), Duration::from_secs(1));
    assert_eq!(b.delay_for(3), Duration::from_secs(4));
    assert_eq!(b.delay_for(6), Duration::from_secs(20));
    assert_eq!(b.delay_for(10), Duration::from_secs(20));
}

#[test]
fn custom_backoff() {
    let b = Backoff {
        initial: Duration::from_millis(100),
        multiplier: 3,
        max: Duration::from_secs(1),
    };
    assert_eq!(b.delay_for(2), Duration::from_millis(300));
    assert_eq!(b.delay_for(3), Duration::from_millis(900));
    assert_eq!(b.delay_for(4), Duration::from_secs(1));
}
