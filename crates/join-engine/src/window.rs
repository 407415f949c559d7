//! Time-window availability derivation.
//!
//! A session's join action opens 15 minutes before its start and stays open
//! through its scheduled end. Between 60 and 15 minutes before start the
//! session is "starting soon". The state is a pure function of
//! `(now, start, end)` and is recomputed once on mount and then every
//! `RECOMPUTE_INTERVAL`; boundary crossings are not scheduled individually,
//! so a view may be up to 59 seconds stale.
//!
//! The bounds and the interval are fixed for compatibility with the
//! dashboard's existing behavior.

use crate::errors::ScheduleError;
use crate::models::{AvailabilityState, Session};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Minutes before start at which the join window opens.
pub const JOIN_WINDOW_OPEN_MINUTES: i64 = 15;

/// Minutes before start at which a session counts as starting soon.
pub const STARTING_SOON_MINUTES: i64 = 60;

/// Interval between availability recomputations.
pub const RECOMPUTE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Accepted wall-clock formats for `startTime`/`endTime`.
const TIME_FORMATS: [&str; 5] = ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"];

/// Derive the availability state. First matching rule wins:
///
/// 1. `end - now < 0` → `Expired`
/// 2. `start - now <= 15min` → `Active` (covers an already started session)
/// 3. `start - now <= 60min` → `StartingSoon`
/// 4. otherwise → `NotAvailable`
///
/// Degenerate windows (`end <= start`) are not rejected; see the tests for
/// how they behave.
pub fn derive_availability(
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AvailabilityState {
    let until_start = start - now;
    let until_end = end - now;

    if until_end < Duration::zero() {
        AvailabilityState::Expired
    } else if until_start <= Duration::minutes(JOIN_WINDOW_OPEN_MINUTES) {
        AvailabilityState::Active
    } else if until_start <= Duration::minutes(STARTING_SOON_MINUTES) {
        AvailabilityState::StartingSoon
    } else {
        AvailabilityState::NotAvailable
    }
}

/// Whole minutes until `start`, rounded up. Zero once start has passed.
pub fn minutes_until_start(now: DateTime<Utc>, start: DateTime<Utc>) -> i64 {
    let millis = (start - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + 59_999) / 60_000
    }
}

/// Start and end instants of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SessionWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Combine the session's date and wall-clock times in `tz`.
    ///
    /// # Errors
    ///
    /// - `ScheduleError::InvalidDate` / `InvalidTime` for unparseable input
    /// - `ScheduleError::NonexistentLocalTime` for a time skipped by DST
    pub fn from_session<Tz: TimeZone>(session: &Session, tz: &Tz) -> Result<Self, ScheduleError> {
        let date = parse_date(&session.date)?;
        let start = localize(date.and_time(parse_time(&session.start_time)?), tz)?;
        let end = localize(date.and_time(parse_time(&session.end_time)?), tz)?;
        Ok(Self { start, end })
    }

    pub fn availability(&self, now: DateTime<Utc>) -> AvailabilityState {
        derive_availability(now, self.start, self.end)
    }

    pub fn minutes_until_start(&self, now: DateTime<Utc>) -> i64 {
        minutes_until_start(now, self.start)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ScheduleError> {
    let day = raw
        .trim()
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ScheduleError::InvalidDate(format!("{raw:?}: {e}")))
}

fn parse_time(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let trimmed = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ScheduleError::InvalidTime(format!("{raw:?}")))
}

fn localize<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Result<DateTime<Utc>, ScheduleError> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ScheduleError::NonexistentLocalTime(naive.to_string()))
}
