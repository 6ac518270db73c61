//! Scripted in-memory transports shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use vatcheck::backend::{
    BrregEntity, BrregTransport, HmrcLookupResponse, HmrcTransport, UidConnector,
    UidOrganisation, UidSession, ViesRequest, ViesResponse, ViesStatusResponse, ViesTransport,
};
use vatcheck::vat::{Backoff, RetryPolicy};
use vatcheck::TransportError;

/// Queue of scripted answers plus a call counter. The last answer repeats
/// once the queue has one element left.
pub struct Script<T> {
    answers: Mutex<VecDeque<Result<T, TransportError>>>,
    calls: AtomicU32,
}

impl<T: Clone> Script<T> {
    pub fn new(answers: Vec<Result<T, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn next(&self) -> Result<T, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 {
            answers.pop_front().unwrap()
        } else {
            answers
                .front()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Connection("script exhausted".into())))
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// VIES
// ---------------------------------------------------------------------------

pub struct FakeVies {
    pub check: Arc<Script<ViesResponse>>,
    pub status: Arc<Script<ViesStatusResponse>>,
    pub requests: Arc<Mutex<Vec<ViesRequest>>>,
}

impl FakeVies {
    pub fn new(answers: Vec<Result<ViesResponse, TransportError>>) -> Self {
        Self {
            check: Script::new(answers),
            status: Script::new(vec![Ok(ViesStatusResponse::default())]),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ViesTransport for FakeVies {
    fn check_vat(&self, request: &ViesRequest) -> Result<ViesResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.check.next()
    }

    fn check_status(&self) -> Result<ViesStatusResponse, TransportError> {
        self.status.next()
    }
}

pub fn vies_valid(country: &str, name: &str, address: &str) -> ViesResponse {
    ViesResponse {
        valid: true,
        country_code: Some(country.into()),
        request_date: Some("2024-01-15T10:00:00.000Z".into()),
        name: Some(name.into()),
        address: Some(address.into()),
        user_error: Some("VALID".into()),
        ..ViesResponse::default()
    }
}

pub fn vies_fault(code: &str) -> TransportError {
    TransportError::Fault {
        code: code.into(),
        message: None,
    }
}

// ---------------------------------------------------------------------------
// Swiss UID
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeUidSession {
    pub validate: Arc<Script<bool>>,
    pub details: Arc<Script<Option<UidOrganisation>>>,
}

impl UidSession for FakeUidSession {
    fn validate_uid(&self, _uid: &str) -> Result<bool, TransportError> {
        self.validate.next()
    }

    fn get_by_uid(
        &self,
        _category: &str,
        _id: &str,
    ) -> Result<Option<UidOrganisation>, TransportError> {
        self.details.next()
    }
}

pub struct FakeUidConnector {
    pub connects: Arc<Script<()>>,
    pub session: FakeUidSession,
}

impl FakeUidConnector {
    pub fn new(
        validate: Vec<Result<bool, TransportError>>,
        details: Vec<Result<Option<UidOrganisation>, TransportError>>,
    ) -> Self {
        Self {
            connects: Script::new(vec![Ok(())]),
            session: FakeUidSession {
                validate: Script::new(validate),
                details: Script::new(details),
            },
        }
    }
}

impl UidConnector for FakeUidConnector {
    fn connect(&self) -> Result<Box<dyn UidSession>, TransportError> {
        self.connects.next()?;
        Ok(Box::new(self.session.clone()))
    }
}

// ---------------------------------------------------------------------------
// HMRC / Brønnøysund
// ---------------------------------------------------------------------------

pub struct FakeHmrc(pub Arc<Script<Option<HmrcLookupResponse>>>);

impl HmrcTransport for FakeHmrc {
    fn lookup(&self, _number: &str) -> Result<Option<HmrcLookupResponse>, TransportError> {
        self.0.next()
    }
}

pub struct FakeBrreg(pub Arc<Script<Option<BrregEntity>>>);

impl BrregTransport for FakeBrreg {
    fn entity(&self, _number: &str) -> Result<Option<BrregEntity>, TransportError> {
        self.0.next()
    }
}

/// `policy` without any waiting.
pub fn instant(policy: RetryPolicy) -> RetryPolicy {
    policy.with_backoff(Backoff::none())
}
