// ABOUTME: Integration tests for the session coordinator lifecycle state machine
// ABOUTME: Covers auto-completion, cap enforcement, ticker behavior, cancellation, and persistence failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

// Test files: allow missing_docs (rustc lint) and unwrap (valid in tests)
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use repcoach::models::SessionPhase;
use repcoach::sim::{pushup_excursion, ScriptedCaptureDevice, ScriptedPoseProvider};
use repcoach::store::SessionStore;
use tokio::time::{advance, sleep, timeout};

use common::{create_test_store, start_session, FailingStore};

#[tokio::test]
async fn manual_session_auto_completes_at_target() {
    let store = create_test_store();
    let (user_id, session) = start_session(store.clone(), "push-ups", 3, false)
        .await
        .unwrap();

    for _ in 0..3 {
        session.increment().await;
    }

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Completed);
    let results = snapshot.results.unwrap();
    assert_eq!(results.completed_reps, 3);
    assert_eq!(results.stars_awarded, 3);
    assert!((results.calories_burned - 1.5).abs() < 1e-9); // 3 reps x 0.5 kcal
    assert!(results.synced);
    assert!(results.form_accuracy.is_none(), "manual sessions report no form accuracy");

    let record = &store.get_history(user_id).await.unwrap()[0];
    assert_eq!(record.completed_reps, 3);
    assert!(record.completed_at.is_some());
}

#[tokio::test]
async fn rep_events_after_completion_are_ignored() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 3, false).await.unwrap();

    // A fourth excursion arriving before teardown completes must not raise the tally
    for _ in 0..6 {
        session.increment().await;
    }

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.completed_reps, 3);
    assert_eq!(snapshot.results.unwrap().completed_reps, 3);
}

#[tokio::test]
async fn decrement_is_a_no_op_at_zero_and_after_completion() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 2, false).await.unwrap();

    session.decrement().await;
    assert_eq!(session.snapshot().await.completed_reps, 0);

    session.increment().await;
    session.decrement().await;
    assert_eq!(session.snapshot().await.completed_reps, 0);

    session.increment().await;
    session.increment().await; // completes
    session.decrement().await;
    assert_eq!(session.snapshot().await.completed_reps, 2);
}

#[tokio::test(start_paused = true)]
async fn ticker_advances_elapsed_seconds_at_one_hertz() {
    let store = create_test_store();
    let (_, session) = start_session(store, "squats", 10, false).await.unwrap();

    // Let the ticker task start its interval before advancing the clock
    sleep(Duration::from_millis(1)).await;
    advance(Duration::from_secs(3)).await;
    sleep(Duration::from_millis(50)).await;

    assert_eq!(session.snapshot().await.elapsed_seconds, 3);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_ticker_exactly_once() {
    let store = create_test_store();
    let (user_id, session) = start_session(store.clone(), "squats", 10, false)
        .await
        .unwrap();

    sleep(Duration::from_millis(1)).await;
    advance(Duration::from_secs(2)).await;
    sleep(Duration::from_millis(50)).await;
    session.cancel().await;
    // Idempotent: a second cancel (e.g. teardown racing navigation-away) is fine
    session.cancel().await;

    let frozen = session.snapshot().await.elapsed_seconds;
    advance(Duration::from_secs(5)).await;
    sleep(Duration::from_millis(50)).await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Cancelled);
    assert_eq!(snapshot.elapsed_seconds, frozen, "no ticks after cancellation");

    // Nothing was persisted as completed
    let record = &store.get_history(user_id).await.unwrap()[0];
    assert!(record.completed_at.is_none());

    // And a cancelled session cannot be completed afterwards
    assert!(session.complete().await.is_err());
}

#[tokio::test]
async fn start_failure_aborts_session_creation() {
    let store = Arc::new(FailingStore::new());
    store.fail_next_start();

    let result = start_session(store.clone(), "push-ups", 5, false).await;
    assert!(result.is_err(), "no local session state on start failure");
}

#[tokio::test]
async fn complete_failure_leaves_session_locally_completed_but_unsynced() {
    let store = Arc::new(FailingStore::new());
    let (_, session) = start_session(store.clone(), "push-ups", 2, false)
        .await
        .unwrap();

    store.fail_complete();
    session.increment().await;
    session.increment().await; // triggers auto-completion against the failing store

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Completed);
    assert!(snapshot.unsynced);
    let results = snapshot.results.unwrap();
    assert!(!results.synced);
    assert_eq!(results.completed_reps, 2);
    assert!((results.calories_burned - 1.0).abs() < 1e-9); // local tally, 2 x 0.5 kcal
}

#[tokio::test]
async fn explicit_completion_before_target_keeps_partial_tally() {
    let store = create_test_store();
    let (_, session) = start_session(store, "squats", 10, false).await.unwrap();

    session.increment().await;
    session.increment().await;
    let results = session.complete().await.unwrap();

    assert_eq!(results.completed_reps, 2);
    assert!((results.calories_burned - 1.4).abs() < 1e-9); // 2 reps x 0.7 kcal
}

#[tokio::test]
async fn pose_driven_session_completes_end_to_end() {
    let store = create_test_store();
    let (user_id, session) = start_session(store.clone(), "push-ups", 2, true)
        .await
        .unwrap();

    let mut script = pushup_excursion();
    script.extend(pushup_excursion());

    let device = ScriptedCaptureDevice::new(Duration::from_millis(2));
    let released = device.release_flag();
    session
        .attach_capture(Box::new(device), Box::new(ScriptedPoseProvider::new(script)))
        .await
        .unwrap();

    let completed = timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = session.snapshot().await;
            // Wait for the results payload, not just the phase flip, so the
            // persistence round trip has finished
            if snapshot.results.is_some() {
                return snapshot;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session must auto-complete");

    assert_eq!(completed.phase, SessionPhase::Completed);
    let results = completed.results.unwrap();
    assert_eq!(results.completed_reps, 2);
    assert!(results.synced);
    assert_eq!(results.form_accuracy, Some(85.0));

    // Teardown released the camera
    sleep(Duration::from_millis(100)).await;
    assert!(released.load(std::sync::atomic::Ordering::SeqCst));

    let progress = store.get_progress(user_id).await.unwrap();
    assert_eq!(progress.total_sessions, 1);
    assert_eq!(progress.total_reps, 2);
}

#[tokio::test]
async fn completed_reps_are_monotonic_under_observation_stream() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 5, false).await.unwrap();

    let mut last = 0;
    for _ in 0..12 {
        session.increment().await;
        let reps = session.snapshot().await.completed_reps;
        assert!(reps >= last, "completed reps must be non-decreasing");
        assert!(reps <= 5, "completed reps must never exceed the target");
        last = reps;
    }
}
