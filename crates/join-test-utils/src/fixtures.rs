//! Session and meeting fixtures.

use chrono::{DateTime, Duration, TimeZone, Utc};
use join_engine::models::{Meeting, MeetingStatus, Session, SessionStatus};
use join_engine::window::SessionWindow;

/// Fixed reference instant: 2026-03-02 14:00:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// Window starting `starts_in` after `now` and lasting `length`.
pub fn window_from(now: DateTime<Utc>, starts_in: Duration, length: Duration) -> SessionWindow {
    let start = now + starts_in;
    SessionWindow::new(start, start + length)
}

/// Scheduled meeting with a numeric Zoom join link.
pub fn test_meeting(id: &str) -> Meeting {
    Meeting {
        id: id.to_string(),
        join_url: Some("https://zoom.us/j/83712345678?pwd=abc".to_string()),
        start_url: None,
        status: MeetingStatus::Scheduled,
    }
}

/// Meeting with a separate host start link.
pub fn test_meeting_with_start_url(id: &str) -> Meeting {
    Meeting {
        start_url: Some("https://zoom.us/s/83712345678?zak=host".to_string()),
        ..test_meeting(id)
    }
}

/// Builder for `Session` records.
#[derive(Debug, Clone)]
pub struct TestSession {
    session: Session,
}

impl TestSession {
    /// Confirmed session on 2026-03-02, 14:00 to 15:00, without a meeting.
    pub fn new(id: &str) -> Self {
        Self {
            session: Session {
                id: id.to_string(),
                date: "2026-03-02".to_string(),
                start_time: "14:00".to_string(),
                end_time: "15:00".to_string(),
                status: SessionStatus::Confirmed,
                meeting_link: None,
                meeting_id: None,
            },
        }
    }

    #[must_use]
    pub fn on(mut self, date: &str) -> Self {
        self.session.date = date.to_string();
        self
    }

    #[must_use]
    pub fn between(mut self, start: &str, end: &str) -> Self {
        self.session.start_time = start.to_string();
        self.session.end_time = end.to_string();
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.session.status = status;
        self
    }

    #[must_use]
    pub fn with_meeting_link(mut self, link: &str, meeting_id: Option<&str>) -> Self {
        self.session.meeting_link = Some(link.to_string());
        self.session.meeting_id = meeting_id.map(str::to_string);
        self
    }

    pub fn build(self) -> Session {
        self.session
    }
}
