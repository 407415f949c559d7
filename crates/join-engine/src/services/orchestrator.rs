//! Meeting get-or-create orchestration.
//!
//! Flow for one activation:
//! 1. Participant: look the meeting up by session id and open it, or fail
//!    with `NotReady`. Participants never create meetings.
//! 2. Host with a known meeting (cached, or a link on the session record):
//!    open it without a backend round-trip.
//! 3. Host without one: create, hand the result to the caller's cache,
//!    wait `SETTLE_DELAY`, re-fetch to verify. If the re-fetch does not show
//!    a join link, patch the link onto the session record (best effort).
//!    The create response is opened and returned whatever the verification
//!    says; the re-fetch only decides whether the fallback write runs. A
//!    create response without any link fails before it is cached.
//!
//! Backend failures are converted to `MeetingError` here and nowhere else.
//! Nothing is retried automatically.

use crate::errors::{BackendError, MeetingError};
use crate::models::{Meeting, MeetingPatch, SessionMeetingPatch};
use crate::observability::metrics;
use crate::services::backend::MeetingBackend;
use crate::services::launcher::{open_meeting, LaunchReport, MeetingLauncher};
use common::types::{SessionId, UserRole};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Pause between create and verification re-fetch.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Drives the meeting backend and the launcher for one user.
#[derive(Clone)]
pub struct MeetingOrchestrator {
    backend: Arc<dyn MeetingBackend>,
    launcher: Arc<dyn MeetingLauncher>,
}

impl MeetingOrchestrator {
    pub fn new(backend: Arc<dyn MeetingBackend>, launcher: Arc<dyn MeetingLauncher>) -> Self {
        Self { backend, launcher }
    }

    /// Get or create the meeting for a session and open it.
    ///
    /// # Errors
    ///
    /// - `MeetingError::NotReady` - participant and no meeting exists yet
    /// - `MeetingError::FetchFailed` - participant lookup failed
    /// - `MeetingError::CreationFailed` - host create call failed
    pub async fn ensure_meeting(
        &self,
        session_id: &SessionId,
        role: UserRole,
        known: Option<&Meeting>,
    ) -> Result<Meeting, MeetingError> {
        self.ensure_meeting_with(session_id, role, known, |_| {})
            .await
    }

    /// `ensure_meeting`, calling `on_created` with the create response
    /// before the settle delay so the caller can cache it immediately.
    #[instrument(skip_all, fields(session_id = %session_id, role = %role))]
    pub async fn ensure_meeting_with<F>(
        &self,
        session_id: &SessionId,
        role: UserRole,
        known: Option<&Meeting>,
        on_created: F,
    ) -> Result<Meeting, MeetingError>
    where
        F: FnOnce(&Meeting) + Send,
    {
        let meeting_role = role.meeting_role();
        let result = if !role.is_host() {
            self.join_existing(session_id, role).await
        } else if let Some(meeting) = known.filter(|m| m.launch_url(true).is_some()) {
            debug!(target: "join.orchestrator", meeting_id = %meeting.id, "Opening known meeting");
            self.launch(meeting, true);
            Ok(meeting.clone())
        } else {
            self.create_verified(session_id, role, on_created).await
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_join_attempt(meeting_role, outcome);
        result
    }

    /// Look the meeting up without opening it.
    ///
    /// # Errors
    ///
    /// Returns `MeetingError::FetchFailed` if the backend call fails.
    pub async fn lookup(
        &self,
        session_id: &SessionId,
        role: UserRole,
    ) -> Result<Option<Meeting>, MeetingError> {
        self.backend
            .get_meeting_by_session_id(session_id, role)
            .await
            .map_err(|e| {
                warn!(target: "join.orchestrator", error = %e, "Meeting lookup failed");
                MeetingError::FetchFailed(e.to_string())
            })
    }

    async fn join_existing(
        &self,
        session_id: &SessionId,
        role: UserRole,
    ) -> Result<Meeting, MeetingError> {
        match self.lookup(session_id, role).await? {
            Some(meeting) if meeting.join_url().is_some() => {
                info!(target: "join.orchestrator", meeting_id = %meeting.id, "Joining meeting");
                self.launch(&meeting, false);
                Ok(meeting)
            }
            _ => {
                info!(target: "join.orchestrator", "Meeting not created yet");
                Err(MeetingError::NotReady(session_id.to_string()))
            }
        }
    }

    async fn create_verified<F>(
        &self,
        session_id: &SessionId,
        role: UserRole,
        on_created: F,
    ) -> Result<Meeting, MeetingError>
    where
        F: FnOnce(&Meeting) + Send,
    {
        let started = Instant::now();
        let created = match self.backend.create_meeting(session_id, role).await {
            Ok(meeting) => {
                metrics::record_meeting_create("success", started.elapsed());
                meeting
            }
            Err(e) => {
                metrics::record_meeting_create("error", started.elapsed());
                warn!(target: "join.orchestrator", error = %e, "Meeting creation failed");
                return Err(MeetingError::CreationFailed(e.to_string()));
            }
        };

        if created.launch_url(true).is_none() {
            warn!(target: "join.orchestrator", meeting_id = %created.id, "Created meeting has no link");
            return Err(MeetingError::CreationFailed(
                "created meeting has no join link".to_string(),
            ));
        }

        info!(target: "join.orchestrator", meeting_id = %created.id, "Meeting created");
        on_created(&created);

        tokio::time::sleep(SETTLE_DELAY).await;

        if !self.verify(session_id, role, &created).await {
            self.write_fallback(session_id, &created).await;
        }

        self.launch(&created, true);
        Ok(created)
    }

    /// Re-fetch after create. `false` means the meeting is not visible yet.
    async fn verify(&self, session_id: &SessionId, role: UserRole, created: &Meeting) -> bool {
        let fetched = self
            .backend
            .get_meeting_by_session_id(session_id, role)
            .await;

        match fetched {
            Ok(Some(meeting)) if meeting.join_url().is_some() => {
                metrics::record_verification("found");
                debug!(target: "join.orchestrator", meeting_id = %meeting.id, "Meeting verified");
                true
            }
            Ok(_) => {
                metrics::record_verification("missing");
                let mismatch = MeetingError::VerificationMismatch {
                    session_id: session_id.to_string(),
                    meeting_id: created.id.clone(),
                };
                warn!(target: "join.orchestrator", error = %mismatch, "Verification did not find meeting");
                false
            }
            Err(e) => {
                metrics::record_verification("error");
                warn!(target: "join.orchestrator", error = %e, "Verification fetch failed");
                false
            }
        }
    }

    /// Best-effort direct write of the link onto the session record.
    async fn write_fallback(&self, session_id: &SessionId, created: &Meeting) {
        let Some(link) = created.join_url() else {
            debug!(target: "join.orchestrator", "No join link to write back");
            return;
        };

        let patch = SessionMeetingPatch {
            meeting_link: link.to_string(),
            meeting_id: created.id.clone(),
        };

        match self.backend.patch_session_fallback(session_id, &patch).await {
            Ok(()) => {
                metrics::record_fallback_write("success");
                info!(target: "join.orchestrator", meeting_id = %created.id, "Wrote meeting link to session");
            }
            Err(e) => {
                metrics::record_fallback_write("error");
                let error = MeetingError::FallbackWriteFailed(e.to_string());
                warn!(target: "join.orchestrator", error = %error, "Fallback session write failed");
            }
        }
    }

    /// Update a meeting (host only).
    ///
    /// # Errors
    ///
    /// - `MeetingError::HostOnly` - caller is not a host
    /// - `MeetingError::UpdateFailed` - backend rejected the update
    #[instrument(skip_all, fields(meeting_id = %meeting_id, role = %role))]
    pub async fn update_meeting(
        &self,
        role: UserRole,
        meeting_id: &str,
        patch: &MeetingPatch,
    ) -> Result<Meeting, MeetingError> {
        if !role.is_host() {
            return Err(MeetingError::HostOnly("update the meeting"));
        }
        self.backend
            .update_meeting(meeting_id, patch)
            .await
            .map_err(update_failed)
    }

    /// Delete a meeting (host only).
    ///
    /// # Errors
    ///
    /// - `MeetingError::HostOnly` - caller is not a host
    /// - `MeetingError::UpdateFailed` - backend rejected the delete
    #[instrument(skip_all, fields(meeting_id = %meeting_id, role = %role))]
    pub async fn cancel_meeting(&self, role: UserRole, meeting_id: &str) -> Result<(), MeetingError> {
        if !role.is_host() {
            return Err(MeetingError::HostOnly("cancel the meeting"));
        }
        self.backend
            .delete_meeting(meeting_id)
            .await
            .map_err(update_failed)
    }

    fn launch(&self, meeting: &Meeting, is_host: bool) -> LaunchReport {
        match meeting.launch_url(is_host) {
            Some(url) => open_meeting(self.launcher.as_ref(), url),
            None => LaunchReport::default(),
        }
    }
}

fn update_failed(e: BackendError) -> MeetingError {
    warn!(target: "join.orchestrator", error = %e, "Meeting update failed");
    MeetingError::UpdateFailed(e.to_string())
}
