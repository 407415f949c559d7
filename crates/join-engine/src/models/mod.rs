//! Join engine models.
//!
//! `Session` and `Meeting` are owned by the dashboard backend; the engine
//! only reads them. `AvailabilityState` is derived and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking lifecycle status as reported by the dashboard API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Confirmed,
    Accepted,
    Completed,
    Cancelled,
    Rejected,
    Declined,
}

impl SessionStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::Accepted => "accepted",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Rejected => "rejected",
            SessionStatus::Declined => "declined",
        }
    }

    /// Whether the booking can no longer be joined regardless of the clock.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed
                | SessionStatus::Cancelled
                | SessionStatus::Rejected
                | SessionStatus::Declined
        )
    }
}

/// A scheduled booking between a host and a participant.
///
/// `start_time`/`end_time` are local wall-clock strings combined with `date`
/// by `SessionWindow::from_session`. `start_time < end_time` is assumed, not
/// checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Booking identifier, possibly carrying a role prefix.
    pub id: String,

    /// Calendar date (`YYYY-MM-DD`, optionally followed by a time part).
    pub date: String,

    pub start_time: String,

    pub end_time: String,

    pub status: SessionStatus,

    /// Join link written onto the booking by an earlier fallback patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
}

impl Session {
    /// Meeting already recorded on the booking itself, if any.
    pub fn known_meeting(&self) -> Option<Meeting> {
        let link = self.meeting_link.as_deref()?.trim();
        if link.is_empty() {
            return None;
        }
        Some(Meeting {
            id: self.meeting_id.clone().unwrap_or_default(),
            join_url: Some(link.to_string()),
            start_url: None,
            status: MeetingStatus::Scheduled,
        })
    }
}

/// Meeting lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// Created but nobody has started it.
    #[default]
    Scheduled,

    /// Host has started the meeting.
    #[serde(alias = "active")]
    Started,

    Ended,

    #[serde(alias = "canceled")]
    Cancelled,
}

impl MeetingStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::Started => "started",
            MeetingStatus::Ended => "ended",
            MeetingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the meeting can still be joined.
    pub fn is_live(&self) -> bool {
        matches!(self, MeetingStatus::Scheduled | MeetingStatus::Started)
    }
}

/// Joinable video-conference resource for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// Backend-assigned identifier.
    pub id: String,

    /// Participant join link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_url: Option<String>,

    /// Host-only start link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,

    #[serde(default)]
    pub status: MeetingStatus,
}

impl Meeting {
    /// Non-empty join link, if any.
    pub fn join_url(&self) -> Option<&str> {
        self.join_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Link the given side should open: hosts prefer the start link.
    pub fn launch_url(&self, is_host: bool) -> Option<&str> {
        let start = self
            .start_url
            .as_deref()
            .filter(|url| is_host && !url.trim().is_empty());
        start.or_else(|| self.join_url())
    }
}

/// Partial update of a meeting (host only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MeetingStatus>,
}

/// Body of the best-effort session patch written when the created meeting
/// is not visible on verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeetingPatch {
    pub meeting_link: String,
    pub meeting_id: String,
}

/// Time-window availability of a session's join action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvailabilityState {
    /// More than 60 minutes before start.
    NotAvailable,
    /// Between 60 and 15 minutes before start.
    StartingSoon,
    /// From 15 minutes before start through the scheduled end.
    Active,
    /// Past the scheduled end.
    Expired,
}

impl AvailabilityState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityState::NotAvailable => "not-available",
            AvailabilityState::StartingSoon => "starting-soon",
            AvailabilityState::Active => "active",
            AvailabilityState::Expired => "expired",
        }
    }
}

/// Meeting lifecycle event delivered by a status feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingStatusChange {
    /// Normalized session identifier.
    pub session_id: String,

    pub meeting_id: String,

    pub status: MeetingStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn meeting(join: Option<&str>, start: Option<&str>) -> Meeting {
        Meeting {
            id: "m-1".to_string(),
            join_url: join.map(str::to_string),
            start_url: start.map(str::to_string),
            status: MeetingStatus::Scheduled,
        }
    }

    #[test]
    fn test_session_deserialization() {
        let json = r#"{
            "id": "tutor-65f1",
            "date": "2026-10-19",
            "startTime": "14:00",
            "endTime": "15:00",
            "status": "confirmed"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, "tutor-65f1");
        assert_eq!(session.start_time, "14:00");
        assert_eq!(session.status, SessionStatus::Confirmed);
        assert!(session.meeting_link.is_none());
        assert!(session.known_meeting().is_none());
    }

    #[test]
    fn test_session_known_meeting() {
        let json = r#"{
            "id": "65f1",
            "date": "2026-10-19",
            "startTime": "14:00",
            "endTime": "15:00",
            "status": "accepted",
            "meetingLink": "https://zoom.us/j/123456789",
            "meetingId": "123456789"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        let known = session.known_meeting().unwrap();
        assert_eq!(known.id, "123456789");
        assert_eq!(known.join_url(), Some("https://zoom.us/j/123456789"));
    }

    #[test]
    fn test_blank_meeting_link_is_not_a_meeting() {
        let session = Session {
            id: "1".to_string(),
            date: "2026-10-19".to_string(),
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            status: SessionStatus::Pending,
            meeting_link: Some("  ".to_string()),
            meeting_id: None,
        };
        assert!(session.known_meeting().is_none());
    }

    #[test]
    fn test_closed_session_statuses() {
        assert!(!SessionStatus::Pending.is_closed());
        assert!(!SessionStatus::Confirmed.is_closed());
        assert!(!SessionStatus::Accepted.is_closed());
        assert!(SessionStatus::Completed.is_closed());
        assert!(SessionStatus::Cancelled.is_closed());
        assert!(SessionStatus::Rejected.is_closed());
        assert!(SessionStatus::Declined.is_closed());
    }

    #[test]
    fn test_meeting_status_aliases() {
        let status: MeetingStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, MeetingStatus::Started);
        let status: MeetingStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(status, MeetingStatus::Cancelled);
        assert!(MeetingStatus::Started.is_live());
        assert!(!MeetingStatus::Ended.is_live());
    }

    #[test]
    fn test_launch_url_prefers_start_url_for_host() {
        let m = meeting(Some("https://zoom.us/j/1"), Some("https://zoom.us/s/1"));
        assert_eq!(m.launch_url(true), Some("https://zoom.us/s/1"));
        assert_eq!(m.launch_url(false), Some("https://zoom.us/j/1"));

        let m = meeting(Some("https://zoom.us/j/1"), Some(""));
        assert_eq!(m.launch_url(true), Some("https://zoom.us/j/1"));

        let m = meeting(None, None);
        assert_eq!(m.launch_url(true), None);
        assert_eq!(m.join_url(), None);
    }

    #[test]
    fn test_meeting_patch_omits_unset_fields() {
        let patch = MeetingPatch {
            topic: Some("Algebra review".to_string()),
            ..MeetingPatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"topic":"Algebra review"}"#);
    }

    #[test]
    fn test_availability_state_serialization() {
        assert_eq!(
            serde_json::to_string(&AvailabilityState::NotAvailable).unwrap(),
            "\"not-available\""
        );
        assert_eq!(
            serde_json::to_string(&AvailabilityState::StartingSoon).unwrap(),
            "\"starting-soon\""
        );
        assert_eq!(AvailabilityState::Expired.as_str(), "expired");
    }

    #[test]
    fn test_session_meeting_patch_serialization() {
        let patch = SessionMeetingPatch {
            meeting_link: "https://zoom.us/j/9".to_string(),
            meeting_id: "9".to_string(),
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert!(json.contains("\"meetingLink\":\"https://zoom.us/j/9\""));
        assert!(json.contains("\"meetingId\":\"9\""));
    }
}
