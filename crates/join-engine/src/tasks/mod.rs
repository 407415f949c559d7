//! Background tasks bound to one engine.
//!
//! # Tasks
//!
//! - `recompute` - re-derives availability every 60 seconds
//! - `status_watcher` - applies meeting status changes, optionally polling
//!   for them
//! - activation - one button press, spawned by `spawn_activation`
//!
//! `EngineTasks` owns the cancellation token shared by every task it spawns.
//! Dropping it cancels them all; `shutdown` also waits for them to finish.

pub mod recompute;
pub mod status_watcher;

pub use recompute::run_recompute_loop;
pub use status_watcher::{run_status_listener, run_status_poller};

use crate::engine::JoinAvailabilityEngine;
use crate::models::MeetingStatusChange;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Capacity of the status change channel created by `attach_status_poller`.
const STATUS_CHANNEL_CAPACITY: usize = 16;

/// Running tasks for one engine.
pub struct EngineTasks {
    engine: Arc<JoinAvailabilityEngine>,
    cancel_token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl EngineTasks {
    /// Spawn the recompute task for `engine`.
    pub fn start(engine: Arc<JoinAvailabilityEngine>) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(run_recompute_loop(
            Arc::clone(&engine),
            cancel_token.child_token(),
        ));

        Self {
            engine,
            cancel_token,
            handles: vec![handle],
        }
    }

    pub fn engine(&self) -> &Arc<JoinAvailabilityEngine> {
        &self.engine
    }

    /// Apply status changes pushed onto `changes` by an external producer.
    pub fn attach_status_listener(&mut self, changes: mpsc::Receiver<MeetingStatusChange>) {
        self.handles.push(tokio::spawn(run_status_listener(
            Arc::clone(&self.engine),
            changes,
            self.cancel_token.child_token(),
        )));
    }

    /// Poll the backend for status changes every `poll_interval`.
    pub fn attach_status_poller(&mut self, poll_interval: Duration) {
        let (tx, rx) = mpsc::channel(STATUS_CHANNEL_CAPACITY);
        self.handles.push(tokio::spawn(run_status_poller(
            Arc::clone(&self.engine),
            poll_interval,
            tx,
            self.cancel_token.child_token(),
        )));
        self.attach_status_listener(rx);
    }

    /// Press the button in the background.
    ///
    /// The activation races the shared cancellation token, so `shutdown`
    /// does not wait out the create, settle delay and verification. An
    /// activation cut short this way leaves the engine busy; the engine is
    /// expected to be discarded with its tasks.
    pub fn spawn_activation(&mut self) {
        let engine = Arc::clone(&self.engine);
        let cancel_token = self.cancel_token.child_token();
        self.handles.push(tokio::spawn(async move {
            tokio::select! {
                () = cancel_token.cancelled() => {
                    info!(target: "join.engine", "Activation abandoned on shutdown");
                }
                result = engine.on_activate() => match result {
                    Ok(Some(meeting)) => {
                        info!(target: "join.engine", meeting_id = %meeting.id, "Meeting opened");
                    }
                    Ok(None) => debug!(target: "join.engine", "Activation ignored"),
                    Err(e) => warn!(target: "join.engine", error = %e, "Activation failed"),
                },
            }
        }));
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Cancel every task and wait for them to exit.
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        for handle in std::mem::take(&mut self.handles) {
            if let Err(e) = handle.await {
                warn!(target: "join.engine", error = %e, "Engine task ended abnormally");
            }
        }
        debug!(target: "join.engine", session_id = %self.engine.session_id(), "Engine tasks stopped");
    }
}

impl Drop for EngineTasks {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
