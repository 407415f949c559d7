//! Button label, icon and enabled state for the join action.
//!
//! This is the observable surface the rendering adapter binds to. Precedence
//! is loading, then a prior failure, then the availability state.

use crate::authorization::is_action_allowed;
use crate::models::AvailabilityState;
use common::types::MeetingRole;
use serde::Serialize;

pub const LABEL_LOADING: &str = "Loading...";
pub const LABEL_TRY_AGAIN: &str = "Try Again";
pub const LABEL_EXPIRED: &str = "Meeting Expired";
pub const LABEL_JOIN_NOW: &str = "Join Now";
pub const LABEL_JOIN_SESSION: &str = "Join Session";
pub const LABEL_CREATE_MEETING: &str = "Create Meeting";
pub const LABEL_NOT_READY: &str = "Meeting Not Ready";

/// Icon shown next to the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    Spinner,
    Retry,
    Warning,
    Clock,
    Video,
}

/// Everything the view derivation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewInputs {
    pub state: AvailabilityState,
    pub role: MeetingRole,
    pub has_meeting: bool,
    pub loading: bool,
    pub failed: bool,
    /// Rounded-up minutes until start; only read while starting soon.
    pub minutes_until_start: i64,
}

/// Rendered state of the join button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub state: AvailabilityState,
    pub label: String,
    pub icon: IconKind,
    pub disabled: bool,
    /// User-facing message of the last failed action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ButtonView {
    pub fn derive(inputs: &ViewInputs, error: Option<String>) -> Self {
        let (label, icon) = label_and_icon(inputs);
        let disabled =
            inputs.loading || !is_action_allowed(inputs.state, inputs.role, inputs.has_meeting);
        Self {
            state: inputs.state,
            label,
            icon,
            disabled,
            error,
        }
    }
}

/// Label and icon for the given inputs.
pub fn label_and_icon(inputs: &ViewInputs) -> (String, IconKind) {
    if inputs.loading {
        return (LABEL_LOADING.to_string(), IconKind::Spinner);
    }
    if inputs.failed {
        return (LABEL_TRY_AGAIN.to_string(), IconKind::Retry);
    }
    match inputs.state {
        AvailabilityState::Expired => (LABEL_EXPIRED.to_string(), IconKind::Warning),
        AvailabilityState::Active => (LABEL_JOIN_NOW.to_string(), IconKind::Video),
        AvailabilityState::StartingSoon => (
            format!("Available in {} min", inputs.minutes_until_start),
            IconKind::Clock,
        ),
        AvailabilityState::NotAvailable => {
            let label = if inputs.has_meeting {
                LABEL_JOIN_SESSION
            } else if inputs.role == MeetingRole::Host {
                LABEL_CREATE_MEETING
            } else {
                LABEL_NOT_READY
            };
            (label.to_string(), IconKind::Video)
        }
    }
}
