//! Mock meeting backend.
//!
//! Responses are scripted up front; every call is recorded with the tokio
//! instant it was made at so tests can assert ordering and the settle delay
//! under paused time.
//!
//! # Example
//!
//! ```rust,ignore
//! use join_test_utils::MockMeetingBackend;
//!
//! let backend = MockMeetingBackend::new()
//!     .with_created(test_meeting("m-1"))
//!     .with_lookups(vec![Ok(None)]);
//! ```

use async_trait::async_trait;
use common::types::{SessionId, UserRole};
use join_engine::errors::BackendError;
use join_engine::models::{Meeting, MeetingPatch, SessionMeetingPatch};
use join_engine::services::MeetingBackend;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::fixtures::test_meeting;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Create { session_id: String, role: UserRole },
    Lookup { session_id: String },
    Update { meeting_id: String, patch: MeetingPatch },
    Delete { meeting_id: String },
    Fallback { session_id: String, patch: SessionMeetingPatch },
}

/// Scriptable `MeetingBackend`.
pub struct MockMeetingBackend {
    create_response: Result<Meeting, BackendError>,
    create_delay: Option<Duration>,
    lookups: Mutex<VecDeque<Result<Option<Meeting>, BackendError>>>,
    default_lookup: Result<Option<Meeting>, BackendError>,
    update_response: Option<Result<Meeting, BackendError>>,
    delete_response: Result<(), BackendError>,
    fallback_response: Result<(), BackendError>,
    create_count: AtomicUsize,
    lookup_count: AtomicUsize,
    fallback_count: AtomicUsize,
    calls: Mutex<Vec<(BackendCall, Instant)>>,
}

impl Default for MockMeetingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMeetingBackend {
    /// Create succeeds with `test_meeting("meeting-1")`, lookups find
    /// nothing, every write succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            create_response: Ok(test_meeting("meeting-1")),
            create_delay: None,
            lookups: Mutex::new(VecDeque::new()),
            default_lookup: Ok(None),
            update_response: None,
            delete_response: Ok(()),
            fallback_response: Ok(()),
            create_count: AtomicUsize::new(0),
            lookup_count: AtomicUsize::new(0),
            fallback_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Meeting returned by `create_meeting`.
    #[must_use]
    pub fn with_created(mut self, meeting: Meeting) -> Self {
        self.create_response = Ok(meeting);
        self
    }

    /// Make `create_meeting` fail.
    #[must_use]
    pub fn failing_create(mut self, error: BackendError) -> Self {
        self.create_response = Err(error);
        self
    }

    /// Sleep this long inside `create_meeting` before answering.
    #[must_use]
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    /// Answers for successive lookups; once drained, `default_lookup` is used.
    #[must_use]
    pub fn with_lookups(self, responses: Vec<Result<Option<Meeting>, BackendError>>) -> Self {
        *self.lookups.lock().unwrap() = responses.into();
        self
    }

    /// Answer for every lookup after the scripted ones.
    #[must_use]
    pub fn with_default_lookup(mut self, response: Result<Option<Meeting>, BackendError>) -> Self {
        self.default_lookup = response;
        self
    }

    /// Answer for `update_meeting`. Without one the patch is echoed onto a
    /// test meeting with the requested id.
    #[must_use]
    pub fn with_update_response(mut self, response: Result<Meeting, BackendError>) -> Self {
        self.update_response = Some(response);
        self
    }

    /// Make `delete_meeting` fail.
    #[must_use]
    pub fn failing_delete(mut self, error: BackendError) -> Self {
        self.delete_response = Err(error);
        self
    }

    /// Make `patch_session_fallback` fail.
    #[must_use]
    pub fn failing_fallback(mut self, error: BackendError) -> Self {
        self.fallback_response = Err(error);
        self
    }

    /// Push another lookup answer while a test is running.
    pub fn push_lookup(&self, response: Result<Option<Meeting>, BackendError>) {
        self.lookups.lock().unwrap().push_back(response);
    }

    pub fn create_calls(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_count.load(Ordering::SeqCst)
    }

    pub fn fallback_calls(&self) -> usize {
        self.fallback_count.load(Ordering::SeqCst)
    }

    /// Every call in the order it was made.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    /// Every call with the instant it was made at.
    pub fn timed_calls(&self) -> Vec<(BackendCall, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    /// Session ids passed to create and lookup calls.
    pub fn session_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Create { session_id, .. }
                | BackendCall::Lookup { session_id }
                | BackendCall::Fallback { session_id, .. } => Some(session_id),
                _ => None,
            })
            .collect()
    }

    /// Patches written through the fallback path.
    pub fn fallback_patches(&self) -> Vec<SessionMeetingPatch> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Fallback { patch, .. } => Some(patch),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }
}

#[async_trait]
impl MeetingBackend for MockMeetingBackend {
    async fn create_meeting(
        &self,
        session_id: &SessionId,
        role: UserRole,
    ) -> Result<Meeting, BackendError> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        self.record(BackendCall::Create {
            session_id: session_id.to_string(),
            role,
        });
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        self.create_response.clone()
    }

    async fn get_meeting_by_session_id(
        &self,
        session_id: &SessionId,
        _role: UserRole,
    ) -> Result<Option<Meeting>, BackendError> {
        self.lookup_count.fetch_add(1, Ordering::SeqCst);
        self.record(BackendCall::Lookup {
            session_id: session_id.to_string(),
        });
        let scripted = self.lookups.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.default_lookup.clone())
    }

    async fn update_meeting(
        &self,
        meeting_id: &str,
        patch: &MeetingPatch,
    ) -> Result<Meeting, BackendError> {
        self.record(BackendCall::Update {
            meeting_id: meeting_id.to_string(),
            patch: patch.clone(),
        });
        match &self.update_response {
            Some(response) => response.clone(),
            None => {
                let mut meeting = test_meeting(meeting_id);
                if let Some(status) = patch.status {
                    meeting.status = status;
                }
                Ok(meeting)
            }
        }
    }

    async fn delete_meeting(&self, meeting_id: &str) -> Result<(), BackendError> {
        self.record(BackendCall::Delete {
            meeting_id: meeting_id.to_string(),
        });
        self.delete_response.clone()
    }

    async fn patch_session_fallback(
        &self,
        session_id: &SessionId,
        patch: &SessionMeetingPatch,
    ) -> Result<(), BackendError> {
        self.fallback_count.fetch_add(1, Ordering::SeqCst);
        self.record(BackendCall::Fallback {
            session_id: session_id.to_string(),
            patch: patch.clone(),
        });
        self.fallback_response.clone()
    }
}
