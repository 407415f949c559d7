//! Metrics definitions for the join engine.
//!
//! All metrics follow Prometheus naming conventions:
//! - `join_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `role`: 2 values (host, participant)
//! - `outcome`: `success` or a `MeetingError::kind()` value
//! - `status`: 2 values (success, error)
//! - `result`: 3 values (found, missing, error)

use common::types::MeetingRole;
use metrics::{counter, histogram};
use std::time::Duration;

fn role_label(role: MeetingRole) -> &'static str {
    match role {
        MeetingRole::Host => "host",
        MeetingRole::Participant => "participant",
    }
}

/// Record a join/create activation.
///
/// Metric: `join_attempts_total`
/// Labels: `role`, `outcome`
pub fn record_join_attempt(role: MeetingRole, outcome: &'static str) {
    counter!("join_attempts_total",
        "role" => role_label(role),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a backend create-meeting call.
///
/// Metric: `join_meeting_create_total`, `join_meeting_create_duration_seconds`
/// Labels: `status`
pub fn record_meeting_create(status: &'static str, duration: Duration) {
    histogram!("join_meeting_create_duration_seconds",
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("join_meeting_create_total",
        "status" => status
    )
    .increment(1);
}

/// Record the outcome of the post-create verification fetch.
///
/// Metric: `join_meeting_verification_total`
/// Labels: `result`
pub fn record_verification(result: &'static str) {
    counter!("join_meeting_verification_total",
        "result" => result
    )
    .increment(1);
}

/// Record a fallback session write.
///
/// Metric: `join_fallback_writes_total`
/// Labels: `status`
pub fn record_fallback_write(status: &'static str) {
    counter!("join_fallback_writes_total",
        "status" => status
    )
    .increment(1);
}
