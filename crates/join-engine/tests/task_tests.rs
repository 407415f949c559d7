//! Tests for the recompute and status watcher tasks.
//!
//! Uses tokio's test-util time control: sleeping in the test auto-advances
//! paused time and lets the spawned tasks run their ticks.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use common::types::UserRole;
use join_engine::engine::JoinAvailabilityEngine;
use join_engine::models::{AvailabilityState, Meeting, MeetingStatus, MeetingStatusChange};
use join_engine::services::MeetingOrchestrator;
use join_engine::tasks::{run_status_poller, EngineTasks};
use join_engine::window::RECOMPUTE_INTERVAL;
use join_test_utils::{
    base_time, test_meeting, window_from, ManualClock, MockMeetingBackend, RecordingLauncher,
    TestSession,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn engine_with(
    role: UserRole,
    backend: MockMeetingBackend,
) -> (Arc<JoinAvailabilityEngine>, Arc<MockMeetingBackend>, Arc<ManualClock>) {
    let backend = Arc::new(backend);
    let clock = Arc::new(ManualClock::new(base_time()));
    let orchestrator = MeetingOrchestrator::new(backend.clone(), Arc::new(RecordingLauncher::new()));
    let engine = JoinAvailabilityEngine::new(
        TestSession::new("student-abc123").build(),
        window_from(
            base_time(),
            ChronoDuration::minutes(90),
            ChronoDuration::minutes(60),
        ),
        role,
        orchestrator,
        clock.clone(),
    )
    .expect("engine should build");
    (Arc::new(engine), backend, clock)
}

// ============================================================================
// Recompute task
// ============================================================================

#[test]
fn test_recompute_interval_is_one_minute() {
    assert_eq!(RECOMPUTE_INTERVAL, Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_recompute_task_picks_up_window_crossing() {
    let (engine, _backend, clock) = engine_with(UserRole::Tutor, MockMeetingBackend::new());
    let tasks = EngineTasks::start(Arc::clone(&engine));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(engine.current_view().state, AvailabilityState::NotAvailable);

    // Cross into the starting-soon band between two ticks.
    clock.advance(ChronoDuration::minutes(40));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(engine.current_view().state, AvailabilityState::NotAvailable);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(engine.current_view().state, AvailabilityState::StartingSoon);

    tasks.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dropping_tasks_stops_recompute() {
    let (engine, _backend, clock) = engine_with(UserRole::Tutor, MockMeetingBackend::new());
    let tasks = EngineTasks::start(Arc::clone(&engine));
    tokio::time::sleep(Duration::from_millis(10)).await;

    drop(tasks);
    tokio::time::sleep(Duration::from_millis(10)).await;

    clock.advance(ChronoDuration::minutes(80));
    tokio::time::sleep(Duration::from_secs(180)).await;

    assert_eq!(engine.current_view().state, AvailabilityState::NotAvailable);
    assert_eq!(Arc::strong_count(&engine), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_every_task() {
    let (engine, _backend, _clock) = engine_with(UserRole::Student, MockMeetingBackend::new());
    let mut tasks = EngineTasks::start(Arc::clone(&engine));
    tasks.attach_status_poller(Duration::from_secs(30));
    assert!(!tasks.is_cancelled());

    tasks.shutdown().await;

    assert_eq!(Arc::strong_count(&engine), 1);
}

// ============================================================================
// Activation task
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_spawned_activation_creates_meeting() {
    let (engine, backend, _clock) = engine_with(
        UserRole::Tutor,
        MockMeetingBackend::new().with_lookups(vec![Ok(None)]),
    );
    let mut tasks = EngineTasks::start(Arc::clone(&engine));

    tasks.spawn_activation();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(backend.create_calls(), 1);
    assert!(engine.meeting().is_some());
    assert!(!engine.is_busy());
    tasks.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_activation_in_flight() {
    let (engine, backend, _clock) = engine_with(
        UserRole::Tutor,
        MockMeetingBackend::new().with_create_delay(Duration::from_secs(30)),
    );
    let mut tasks = EngineTasks::start(Arc::clone(&engine));

    tasks.spawn_activation();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(engine.is_busy());

    let started = tokio::time::Instant::now();
    tasks.shutdown().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(backend.create_calls(), 1);
    assert_eq!(backend.lookup_calls(), 0);
    assert!(engine.meeting().is_none());
    assert_eq!(Arc::strong_count(&engine), 1);
}

// ============================================================================
// Status watcher
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_poller_emits_only_on_change() {
    let started = Meeting {
        status: MeetingStatus::Started,
        ..test_meeting("m-1")
    };
    let (engine, backend, _clock) = engine_with(
        UserRole::Student,
        MockMeetingBackend::new()
            .with_lookups(vec![Ok(None), Ok(Some(test_meeting("m-1")))])
            .with_default_lookup(Ok(Some(test_meeting("m-1")))),
    );
    let (tx, mut rx) = mpsc::channel(8);
    let cancel_token = CancellationToken::new();
    let poller = tokio::spawn(run_status_poller(
        Arc::clone(&engine),
        Duration::from_secs(30),
        tx,
        cancel_token.clone(),
    ));

    // Ticks at 0s, 30s, 60s, 90s: nothing, then the same meeting three times.
    tokio::time::sleep(Duration::from_secs(95)).await;
    assert_eq!(backend.lookup_calls(), 4);
    let first = rx.try_recv().expect("one change");
    assert_eq!(first.session_id, "abc123");
    assert_eq!(first.status, MeetingStatus::Scheduled);
    assert!(rx.try_recv().is_err());

    backend.push_lookup(Ok(Some(started)));
    tokio::time::sleep(Duration::from_secs(30)).await;
    let second = rx.try_recv().expect("status moved");
    assert_eq!(second.status, MeetingStatus::Started);

    cancel_token.cancel();
    poller.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_poller_feeds_engine() {
    let (engine, _backend, _clock) = engine_with(
        UserRole::Student,
        MockMeetingBackend::new().with_default_lookup(Ok(Some(test_meeting("m-1")))),
    );
    let mut tasks = EngineTasks::start(Arc::clone(&engine));
    assert!(engine.meeting().is_none());

    tasks.attach_status_poller(Duration::from_secs(30));
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(engine.meeting().map(|m| m.id), Some("m-1".to_string()));
    tasks.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_poller_clears_deleted_meeting() {
    let (engine, backend, _clock) = engine_with(
        UserRole::Student,
        MockMeetingBackend::new()
            .with_lookups(vec![Ok(Some(test_meeting("m-1")))])
            .with_default_lookup(Ok(None)),
    );
    let mut tasks = EngineTasks::start(Arc::clone(&engine));
    tasks.attach_status_poller(Duration::from_secs(30));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(engine.meeting().map(|m| m.id), Some("m-1".to_string()));

    // Deleted elsewhere: the 30s lookup comes back empty.
    tokio::time::sleep(Duration::from_secs(95)).await;
    assert_eq!(backend.lookup_calls(), 4);
    assert!(engine.meeting().is_none());

    // The same meeting showing up again is reported again.
    backend.push_lookup(Ok(Some(test_meeting("m-1"))));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(engine.meeting().map(|m| m.id), Some("m-1".to_string()));

    tasks.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_poller_reports_vanished_meeting_as_cancelled() {
    let (engine, _backend, _clock) = engine_with(
        UserRole::Student,
        MockMeetingBackend::new()
            .with_lookups(vec![Ok(None), Ok(Some(test_meeting("m-1")))])
            .with_default_lookup(Ok(None)),
    );
    let (tx, mut rx) = mpsc::channel(8);
    let cancel_token = CancellationToken::new();
    let poller = tokio::spawn(run_status_poller(
        Arc::clone(&engine),
        Duration::from_secs(30),
        tx,
        cancel_token.clone(),
    ));

    // 0s: nothing yet. 30s: m-1. 60s and 90s: gone, reported once.
    tokio::time::sleep(Duration::from_secs(95)).await;
    let seen = rx.try_recv().expect("meeting appeared");
    assert_eq!(seen.status, MeetingStatus::Scheduled);
    let gone = rx.try_recv().expect("meeting vanished");
    assert_eq!(gone.meeting_id, "m-1");
    assert_eq!(gone.status, MeetingStatus::Cancelled);
    assert_eq!(gone.join_url, None);
    assert!(rx.try_recv().is_err());

    cancel_token.cancel();
    poller.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_listener_applies_pushed_changes() {
    let (engine, _backend, _clock) = engine_with(UserRole::Student, MockMeetingBackend::new());
    let mut tasks = EngineTasks::start(Arc::clone(&engine));
    let (tx, rx) = mpsc::channel(8);
    tasks.attach_status_listener(rx);

    tx.send(MeetingStatusChange {
        session_id: "abc123".to_string(),
        meeting_id: "m-2".to_string(),
        status: MeetingStatus::Started,
        join_url: Some("https://zoom.us/j/123456789".to_string()),
    })
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(engine.meeting().map(|m| m.id), Some("m-2".to_string()));

    tx.send(MeetingStatusChange {
        session_id: "abc123".to_string(),
        meeting_id: "m-2".to_string(),
        status: MeetingStatus::Cancelled,
        join_url: None,
    })
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(engine.meeting().is_none());

    tasks.shutdown().await;
}
