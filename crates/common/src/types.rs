//! Roles and identifiers shared by the join engine and its test utilities.

use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefixes the dashboard prepends to booking ids when it merges tutor,
/// student and counselor session lists. They never reach the backend.
pub const ROLE_PREFIXES: [&str; 3] = ["tutor-", "student-", "counselor-"];

/// Strip every leading role prefix from a session identifier.
///
/// Prefixes are removed repeatedly so that
/// `normalize_session_id(normalize_session_id(x)) == normalize_session_id(x)`
/// holds even for ids that were composed twice (`tutor-student-abc`).
#[must_use]
pub fn normalize_session_id(raw: &str) -> &str {
    let mut id = raw.trim();
    while let Some(rest) = ROLE_PREFIXES
        .iter()
        .find_map(|prefix| id.strip_prefix(prefix))
    {
        id = rest;
    }
    id
}

/// Booking identifier with role prefixes removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Normalize and wrap a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns `CommonError::InvalidSessionId` if nothing is left once the
    /// prefixes are stripped.
    pub fn parse(raw: &str) -> Result<Self> {
        let id = normalize_session_id(raw);
        if id.is_empty() {
            return Err(CommonError::InvalidSessionId(raw.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// The normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Dashboard role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Books sessions and joins meetings.
    Student,
    /// Hosts tutoring sessions.
    Tutor,
    /// Hosts counseling sessions.
    Counselor,
    /// Platform administrator; views sessions but never hosts them.
    Admin,
}

impl UserRole {
    /// Role this user plays in a session's meeting.
    #[must_use]
    pub fn meeting_role(self) -> MeetingRole {
        match self {
            UserRole::Tutor | UserRole::Counselor => MeetingRole::Host,
            UserRole::Student | UserRole::Admin => MeetingRole::Participant,
        }
    }

    /// Whether this user may create and start meetings.
    #[must_use]
    pub fn is_host(self) -> bool {
        self.meeting_role() == MeetingRole::Host
    }

    /// Path segment used by the dashboard API for this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Tutor => "tutor",
            UserRole::Counselor => "counselor",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "tutor" => Ok(UserRole::Tutor),
            "counselor" => Ok(UserRole::Counselor),
            "admin" => Ok(UserRole::Admin),
            other => Err(CommonError::UnknownRole(other.to_string())),
        }
    }
}

/// Role within a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingRole {
    /// May create, start, update and cancel the meeting.
    Host,
    /// May only join a meeting the host already created.
    Participant,
}
