//! Join engine error types.
//!
//! `BackendError` is what the meeting backend collaborator returns.
//! `MeetingError` is the taxonomy the presentation layer sees; every backend
//! failure is converted at the orchestration boundary so no raw HTTP error
//! reaches the UI. Messages shown to users come from `client_message()`.

use common::error::CommonError;
use thiserror::Error;

/// Error returned by a `MeetingBackend` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Network failure, timeout or 5xx.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Non-success status other than 404 and 5xx.
    #[error("Backend rejected request with status {status}")]
    Rejected { status: u16 },

    /// Body did not match any known response shape.
    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    /// `{success: false}` envelope.
    #[error("Backend reported failure: {0}")]
    Failed(String),

    #[error("Internal error")]
    Internal,
}

/// Errors surfaced by the join engine.
///
/// `VerificationMismatch` and `FallbackWriteFailed` are internal only: they
/// are logged by the orchestrator and never returned from `ensure_meeting`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeetingError {
    /// A participant tried to join before the host created the meeting.
    #[error("Meeting not ready for session {0}")]
    NotReady(String),

    /// Backend rejected or failed the create call.
    #[error("Meeting creation failed: {0}")]
    CreationFailed(String),

    /// Backend failed while looking up the meeting for a participant.
    #[error("Meeting lookup failed: {0}")]
    FetchFailed(String),

    /// Created meeting was not visible on the verification re-fetch.
    #[error("Meeting {meeting_id} not visible for session {session_id} after create")]
    VerificationMismatch {
        session_id: String,
        meeting_id: String,
    },

    /// Best-effort session patch failed.
    #[error("Fallback session write failed: {0}")]
    FallbackWriteFailed(String),

    /// Operation requires the host role.
    #[error("Only the host may {0}")]
    HostOnly(&'static str),

    /// Backend rejected an update or cancel.
    #[error("Meeting update failed: {0}")]
    UpdateFailed(String),
}

impl MeetingError {
    /// Bounded label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            MeetingError::NotReady(_) => "not_ready",
            MeetingError::CreationFailed(_) => "creation_failed",
            MeetingError::FetchFailed(_) => "fetch_failed",
            MeetingError::VerificationMismatch { .. } => "verification_mismatch",
            MeetingError::FallbackWriteFailed(_) => "fallback_write_failed",
            MeetingError::HostOnly(_) => "host_only",
            MeetingError::UpdateFailed(_) => "update_failed",
        }
    }

    /// Whether the user can expect a manual retry to succeed without anyone
    /// else acting first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MeetingError::CreationFailed(_)
                | MeetingError::FetchFailed(_)
                | MeetingError::UpdateFailed(_)
        )
    }

    /// Returns a user-facing message (no backend details).
    pub fn client_message(&self) -> String {
        match self {
            MeetingError::NotReady(_) => {
                "The meeting hasn't been started yet. Please ask your host to start the session first."
                    .to_string()
            }
            MeetingError::CreationFailed(_) => {
                "Failed to create the meeting. Please try again.".to_string()
            }
            MeetingError::FetchFailed(_) => {
                "Could not load the meeting. Please try again.".to_string()
            }
            MeetingError::HostOnly(_) => {
                "Only the session host can manage this meeting.".to_string()
            }
            MeetingError::UpdateFailed(_) => {
                "Failed to update the meeting. Please try again.".to_string()
            }
            MeetingError::VerificationMismatch { .. } | MeetingError::FallbackWriteFailed(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Engine could not be built for a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Invalid session: {0}")]
    InvalidSession(#[from] CommonError),

    #[error("Invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
}

/// A launcher channel could not open a link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("Failed to open link: {0}")]
    Failed(String),
}

/// Session schedule could not be turned into instants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Invalid session date: {0}")]
    InvalidDate(String),

    #[error("Invalid session time: {0}")]
    InvalidTime(String),

    /// Wall-clock time skipped by a DST transition.
    #[error("Local time does not exist: {0}")]
    NonexistentLocalTime(String),
}
