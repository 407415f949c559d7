//! Per-session join availability engine.
//!
//! One engine exists per displayed session. It owns the view fields the
//! dashboard keeps for a session button (cached meeting, busy flag, last
//! error, availability) and publishes a fresh `ButtonView` on a watch
//! channel whenever any of them change.
//!
//! Mutual exclusion between activations is a single busy flag: while an
//! activation is in flight, further activations return `Ok(None)` without
//! touching the backend. Overlapping activations are not coalesced.

use crate::authorization::is_action_allowed;
use crate::clock::Clock;
use crate::errors::{EngineError, MeetingError};
use crate::models::{
    AvailabilityState, Meeting, MeetingPatch, MeetingStatus, MeetingStatusChange, Session,
};
use crate::presentation::{ButtonView, ViewInputs};
use crate::services::orchestrator::MeetingOrchestrator;
use crate::window::SessionWindow;
use chrono::TimeZone;
use common::types::{SessionId, UserRole};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Mutable per-session view fields.
#[derive(Debug, Clone)]
struct ViewState {
    availability: AvailabilityState,
    meeting: Option<Meeting>,
    loading: bool,
    error: Option<MeetingError>,
}

/// Availability, authorization and orchestration for one session.
pub struct JoinAvailabilityEngine {
    session: Session,
    session_id: SessionId,
    window: SessionWindow,
    role: UserRole,
    clock: Arc<dyn Clock>,
    orchestrator: MeetingOrchestrator,
    state: Mutex<ViewState>,
    views: watch::Sender<ButtonView>,
}

impl JoinAvailabilityEngine {
    /// Build an engine and compute the initial availability.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSession` if the session id is empty once
    /// role prefixes are removed.
    pub fn new(
        session: Session,
        window: SessionWindow,
        role: UserRole,
        orchestrator: MeetingOrchestrator,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        let session_id = SessionId::parse(&session.id)?;
        let availability = effective_availability(&session, &window, clock.as_ref());
        let state = ViewState {
            availability,
            meeting: session.known_meeting(),
            loading: false,
            error: None,
        };
        let initial = derive_view(&state, &window, role, clock.as_ref());
        let (views, _) = watch::channel(initial);

        Ok(Self {
            session,
            session_id,
            window,
            role,
            clock,
            orchestrator,
            state: Mutex::new(state),
            views,
        })
    }

    /// Build an engine, resolving the session's wall-clock times in `tz`.
    ///
    /// # Errors
    ///
    /// - `EngineError::Schedule` if the date or times cannot be parsed
    /// - `EngineError::InvalidSession` if the session id is empty
    pub fn from_session<Tz: TimeZone>(
        session: Session,
        tz: &Tz,
        role: UserRole,
        orchestrator: MeetingOrchestrator,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        let window = SessionWindow::from_session(&session, tz)?;
        Self::new(session, window, role, orchestrator, clock)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Normalized session id, as sent to the backend.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn window(&self) -> SessionWindow {
        self.window
    }

    pub fn orchestrator(&self) -> &MeetingOrchestrator {
        &self.orchestrator
    }

    /// Receive every published view.
    pub fn subscribe(&self) -> watch::Receiver<ButtonView> {
        self.views.subscribe()
    }

    /// Most recently published view.
    pub fn current_view(&self) -> ButtonView {
        self.views.borrow().clone()
    }

    /// Cached meeting, if any.
    pub fn meeting(&self) -> Option<Meeting> {
        self.lock_state().meeting.clone()
    }

    /// Whether an activation is in flight.
    pub fn is_busy(&self) -> bool {
        self.lock_state().loading
    }

    /// Re-derive availability from the clock and publish the view.
    pub fn recompute(&self) -> AvailabilityState {
        let mut state = self.lock_state();
        let availability = effective_availability(&self.session, &self.window, self.clock.as_ref());
        if availability != state.availability {
            debug!(
                target: "join.engine",
                session_id = %self.session_id,
                from = state.availability.as_str(),
                to = availability.as_str(),
                "Availability changed"
            );
        }
        state.availability = availability;
        self.publish(&state);
        availability
    }

    /// Current view derived from the latest availability.
    pub fn view(&self) -> ButtonView {
        let state = self.lock_state();
        derive_view(&state, &self.window, self.role, self.clock.as_ref())
    }

    /// Handle a button press.
    ///
    /// Returns `Ok(None)` when the press is ignored because the button is
    /// disabled or another activation is in flight.
    ///
    /// # Errors
    ///
    /// Any `MeetingError` from the orchestrator; it is also kept in the view
    /// so the button shows "Try Again".
    #[instrument(skip_all, fields(session_id = %self.session_id, role = %self.role))]
    pub async fn on_activate(&self) -> Result<Option<Meeting>, MeetingError> {
        let known = {
            let mut state = self.lock_state();
            state.availability =
                effective_availability(&self.session, &self.window, self.clock.as_ref());

            if state.loading {
                debug!(target: "join.engine", "Activation already in flight");
                return Ok(None);
            }
            if !is_action_allowed(
                state.availability,
                self.role.meeting_role(),
                has_meeting(&state, self.role),
            ) {
                debug!(
                    target: "join.engine",
                    availability = state.availability.as_str(),
                    "Activation not allowed"
                );
                self.publish(&state);
                return Ok(None);
            }

            state.loading = true;
            state.error = None;
            self.publish(&state);
            state.meeting.clone()
        };

        let result = self
            .orchestrator
            .ensure_meeting_with(&self.session_id, self.role, known.as_ref(), |created| {
                let mut state = self.lock_state();
                state.meeting = Some(created.clone());
                self.publish(&state);
            })
            .await;

        let mut state = self.lock_state();
        state.loading = false;
        match &result {
            Ok(meeting) => {
                state.meeting = Some(meeting.clone());
                state.error = None;
            }
            Err(e) => {
                state.error = Some(e.clone());
            }
        }
        self.publish(&state);
        result.map(Some)
    }

    /// Look the meeting up and cache it without opening anything.
    ///
    /// # Errors
    ///
    /// Returns `MeetingError::FetchFailed` if the backend call fails.
    pub async fn refresh_meeting(&self) -> Result<Option<Meeting>, MeetingError> {
        let found = self
            .orchestrator
            .lookup(&self.session_id, self.role)
            .await?
            .filter(|m| m.join_url().is_some());

        if let Some(meeting) = &found {
            let mut state = self.lock_state();
            state.meeting = Some(meeting.clone());
            self.publish(&state);
        }
        Ok(found)
    }

    /// Update the cached meeting (host only).
    ///
    /// # Errors
    ///
    /// - `MeetingError::HostOnly` - caller is not a host
    /// - `MeetingError::NotReady` - no meeting is known for this session
    /// - `MeetingError::UpdateFailed` - backend rejected the update
    pub async fn update_meeting(&self, patch: &MeetingPatch) -> Result<Meeting, MeetingError> {
        let meeting_id = self.known_meeting_id("update the meeting")?;
        let updated = self
            .orchestrator
            .update_meeting(self.role, &meeting_id, patch)
            .await?;

        let mut state = self.lock_state();
        state.meeting = Some(updated.clone());
        self.publish(&state);
        Ok(updated)
    }

    /// Delete the cached meeting (host only) and forget it.
    ///
    /// # Errors
    ///
    /// - `MeetingError::HostOnly` - caller is not a host
    /// - `MeetingError::NotReady` - no meeting is known for this session
    /// - `MeetingError::UpdateFailed` - backend rejected the delete
    pub async fn cancel_meeting(&self) -> Result<(), MeetingError> {
        let meeting_id = self.known_meeting_id("cancel the meeting")?;
        self.orchestrator
            .cancel_meeting(self.role, &meeting_id)
            .await?;

        info!(target: "join.engine", meeting_id = %meeting_id, "Meeting cancelled");
        let mut state = self.lock_state();
        state.meeting = None;
        self.publish(&state);
        Ok(())
    }

    /// Apply a status change from a feed. Returns `false` for changes that
    /// belong to another session.
    pub fn apply_status_change(&self, change: &MeetingStatusChange) -> bool {
        if change.session_id != self.session_id.as_str() {
            return false;
        }

        let mut state = self.lock_state();
        match change.status {
            MeetingStatus::Cancelled | MeetingStatus::Ended => {
                state.meeting = None;
            }
            status => {
                let previous = state.meeting.take();
                let (start_url, prior_join) = previous
                    .map(|m| (m.start_url, m.join_url))
                    .unwrap_or_default();
                state.meeting = Some(Meeting {
                    id: change.meeting_id.clone(),
                    join_url: change.join_url.clone().or(prior_join),
                    start_url,
                    status,
                });
            }
        }
        debug!(
            target: "join.engine",
            session_id = %self.session_id,
            status = change.status.as_str(),
            "Applied meeting status change"
        );
        self.publish(&state);
        true
    }

    fn known_meeting_id(&self, action: &'static str) -> Result<String, MeetingError> {
        if !self.role.is_host() {
            return Err(MeetingError::HostOnly(action));
        }
        self.lock_state()
            .meeting
            .as_ref()
            .map(|m| m.id.clone())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MeetingError::NotReady(self.session_id.to_string()))
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ViewState) {
        self.views
            .send_replace(derive_view(state, &self.window, self.role, self.clock.as_ref()));
    }
}

/// Closed bookings count as expired whatever the clock says.
fn effective_availability(
    session: &Session,
    window: &SessionWindow,
    clock: &dyn Clock,
) -> AvailabilityState {
    if session.status.is_closed() {
        AvailabilityState::Expired
    } else {
        window.availability(clock.now())
    }
}

fn has_meeting(state: &ViewState, role: UserRole) -> bool {
    state
        .meeting
        .as_ref()
        .is_some_and(|m| m.status.is_live() && m.launch_url(role.is_host()).is_some())
}

fn derive_view(
    state: &ViewState,
    window: &SessionWindow,
    role: UserRole,
    clock: &dyn Clock,
) -> ButtonView {
    let inputs = ViewInputs {
        state: state.availability,
        role: role.meeting_role(),
        has_meeting: has_meeting(state, role),
        loading: state.loading,
        failed: state.error.is_some(),
        minutes_until_start: window.minutes_until_start(clock.now()),
    };
    ButtonView::derive(&inputs, state.error.as_ref().map(MeetingError::client_message))
}
