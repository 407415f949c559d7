//! Meeting status change feed.
//!
//! Changes arrive as `MeetingStatusChange` values on an mpsc channel. Any
//! producer may push onto it (a notification service, a test); the polling
//! feed in this module is one such producer. The listener applies each
//! change to the engine whose session it names.

use crate::engine::JoinAvailabilityEngine;
use crate::models::{Meeting, MeetingStatus, MeetingStatusChange};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Apply changes from `changes` until the channel closes or `cancel_token`
/// is cancelled.
#[instrument(skip_all, name = "join.task.status_listener", fields(session_id = %engine.session_id()))]
pub async fn run_status_listener(
    engine: Arc<JoinAvailabilityEngine>,
    mut changes: mpsc::Receiver<MeetingStatusChange>,
    cancel_token: CancellationToken,
) {
    info!(target: "join.task.status_watcher", "Starting status listener");

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!(target: "join.task.status_watcher", "Status listener received shutdown signal, exiting");
                break;
            }
            change = changes.recv() => {
                let Some(change) = change else {
                    debug!(target: "join.task.status_watcher", "Status feed closed");
                    break;
                };
                if !engine.apply_status_change(&change) {
                    debug!(
                        target: "join.task.status_watcher",
                        other_session = %change.session_id,
                        "Ignoring change for another session"
                    );
                }
            }
        }
    }
}

/// What the poller saw last. A change is emitted only when this differs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Observation {
    meeting_id: String,
    status: MeetingStatus,
    join_url: Option<String>,
}

impl From<&Meeting> for Observation {
    fn from(meeting: &Meeting) -> Self {
        Self {
            meeting_id: meeting.id.clone(),
            status: meeting.status,
            join_url: meeting.join_url().map(str::to_string),
        }
    }
}

/// Re-fetch the session's meeting every `poll_interval` and push a change
/// onto `changes` when its status or join link moved.
///
/// A meeting that was seen and then disappears from the lookup is reported
/// as `Cancelled`, so consumers drop it.
///
/// Lookup failures are logged and the next tick tries again. The loop exits
/// when cancelled or when the receiving side is gone.
#[instrument(skip_all, name = "join.task.status_poller", fields(session_id = %engine.session_id()))]
pub async fn run_status_poller(
    engine: Arc<JoinAvailabilityEngine>,
    poll_interval: Duration,
    changes: mpsc::Sender<MeetingStatusChange>,
    cancel_token: CancellationToken,
) {
    info!(
        target: "join.task.status_watcher",
        poll_interval_seconds = poll_interval.as_secs(),
        "Starting status poller"
    );

    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_seen: Option<Observation> = None;

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!(target: "join.task.status_watcher", "Status poller received shutdown signal, exiting");
                break;
            }
            _ = interval.tick() => {
                let fetched = engine
                    .orchestrator()
                    .lookup(engine.session_id(), engine.role())
                    .await;

                let change = match fetched {
                    Ok(Some(meeting)) => {
                        let observed = Observation::from(&meeting);
                        if last_seen.as_ref() == Some(&observed) {
                            continue;
                        }
                        let change = MeetingStatusChange {
                            session_id: engine.session_id().to_string(),
                            meeting_id: observed.meeting_id.clone(),
                            status: observed.status,
                            join_url: observed.join_url.clone(),
                        };
                        last_seen = Some(observed);
                        change
                    }
                    Ok(None) => {
                        let Some(gone) = last_seen.take() else {
                            continue;
                        };
                        info!(
                            target: "join.task.status_watcher",
                            meeting_id = %gone.meeting_id,
                            "Meeting no longer listed for session"
                        );
                        MeetingStatusChange {
                            session_id: engine.session_id().to_string(),
                            meeting_id: gone.meeting_id,
                            status: MeetingStatus::Cancelled,
                            join_url: None,
                        }
                    }
                    Err(e) => {
                        warn!(target: "join.task.status_watcher", error = %e, "Status poll failed");
                        continue;
                    }
                };

                debug!(
                    target: "join.task.status_watcher",
                    meeting_id = %change.meeting_id,
                    status = change.status.as_str(),
                    "Meeting status changed"
                );
                if changes.send(change).await.is_err() {
                    debug!(target: "join.task.status_watcher", "Status listener gone, stopping poller");
                    break;
                }
            }
        }
    }
}
