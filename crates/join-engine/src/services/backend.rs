//! Meeting backend collaborator contract.
//!
//! Implementations normalize whatever response shapes their API produces
//! into `Meeting` / `Option<Meeting>` / `BackendError`, so the orchestrator
//! never branches on envelopes. Session ids arrive already normalized.

use crate::errors::BackendError;
use crate::models::{Meeting, MeetingPatch, SessionMeetingPatch};
use common::types::{SessionId, UserRole};

/// Operations the join engine needs from the meeting API.
#[async_trait::async_trait]
pub trait MeetingBackend: Send + Sync {
    /// Create the meeting for a session. Not idempotent; never retried.
    async fn create_meeting(
        &self,
        session_id: &SessionId,
        role: UserRole,
    ) -> Result<Meeting, BackendError>;

    /// Look up the meeting for a session. Absence is `Ok(None)`, not an error.
    async fn get_meeting_by_session_id(
        &self,
        session_id: &SessionId,
        role: UserRole,
    ) -> Result<Option<Meeting>, BackendError>;

    /// Apply a partial update (host only).
    async fn update_meeting(
        &self,
        meeting_id: &str,
        patch: &MeetingPatch,
    ) -> Result<Meeting, BackendError>;

    /// Delete a meeting (host only).
    async fn delete_meeting(&self, meeting_id: &str) -> Result<(), BackendError>;

    /// Write the meeting link directly onto the session record.
    async fn patch_session_fallback(
        &self,
        session_id: &SessionId,
        patch: &SessionMeetingPatch,
    ) -> Result<(), BackendError>;
}
