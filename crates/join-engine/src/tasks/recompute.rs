//! Availability recompute task.
//!
//! Recomputes the engine's availability immediately (on mount) and then
//! every `RECOMPUTE_INTERVAL`. The loop exits when the cancellation token is
//! triggered; after that the engine is never touched again by this task.

use crate::engine::JoinAvailabilityEngine;
use crate::window::RECOMPUTE_INTERVAL;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Run the recompute loop until `cancel_token` is cancelled.
#[instrument(skip_all, name = "join.task.recompute", fields(session_id = %engine.session_id()))]
pub async fn run_recompute_loop(engine: Arc<JoinAvailabilityEngine>, cancel_token: CancellationToken) {
    info!(
        target: "join.task.recompute",
        interval_seconds = RECOMPUTE_INTERVAL.as_secs(),
        "Starting recompute task"
    );

    let mut interval = tokio::time::interval(RECOMPUTE_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!(target: "join.task.recompute", "Recompute task received shutdown signal, exiting");
                break;
            }
            _ = interval.tick() => {
                let state = engine.recompute();
                debug!(target: "join.task.recompute", state = state.as_str(), "Recomputed availability");
            }
        }
    }
}
