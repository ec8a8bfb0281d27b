// ABOUTME: Integration tests for the frame throttle and inference driver
// ABOUTME: Covers modulo-K submission, error classification, fallback to manual, and device release
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

// Test files: allow missing_docs (rustc lint) and unwrap (valid in tests)
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use repcoach::sim::{PoseBuilder, ScriptStep, ScriptedCaptureDevice, ScriptedPoseProvider};
use tokio::time::sleep;

use common::{create_test_store, start_session};

#[tokio::test]
async fn throttle_submits_exactly_one_in_k_frames() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 100, true).await.unwrap();

    // 20 frames at K=5 must produce exactly 4 inference calls (seq 5, 10, 15, 20)
    let device = ScriptedCaptureDevice::new(Duration::from_millis(2)).with_frame_limit(20);
    let released = device.release_flag();
    let provider = ScriptedPoseProvider::repeating(PoseBuilder::standing().build());
    let calls = provider.call_counter();

    session
        .attach_capture(Box::new(device), Box::new(provider))
        .await
        .unwrap();

    sleep(Duration::from_millis(300)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    session.cancel().await;
    sleep(Duration::from_millis(100)).await;
    assert!(released.load(Ordering::SeqCst), "device track must be released");
}

#[tokio::test]
async fn only_one_capture_loop_per_session() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 10, true).await.unwrap();

    let first = session
        .attach_capture(
            Box::new(ScriptedCaptureDevice::new(Duration::from_millis(5))),
            Box::new(ScriptedPoseProvider::repeating(
                PoseBuilder::standing().build(),
            )),
        )
        .await;
    assert!(first.is_ok());

    let second = session
        .attach_capture(
            Box::new(ScriptedCaptureDevice::new(Duration::from_millis(5))),
            Box::new(ScriptedPoseProvider::repeating(
                PoseBuilder::standing().build(),
            )),
        )
        .await;
    assert!(second.is_err());

    session.cancel().await;
}

#[tokio::test]
async fn transient_inference_failure_skips_frame_and_continues() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 2, true).await.unwrap();

    // One transient failure mid-excursion must not stop pose coaching
    let mut script = vec![ScriptStep::Pose(
        PoseBuilder::standing().elbow_angle(170.0).build(),
    )];
    script.push(ScriptStep::Transient("model hiccup".to_owned()));
    script.push(ScriptStep::Pose(
        PoseBuilder::standing().elbow_angle(95.0).build(),
    ));
    script.push(ScriptStep::Pose(
        PoseBuilder::standing().elbow_angle(170.0).build(),
    ));

    let device = ScriptedCaptureDevice::new(Duration::from_millis(2));
    let provider = ScriptedPoseProvider::new(script);
    session
        .attach_capture(Box::new(device), Box::new(provider))
        .await
        .unwrap();

    sleep(Duration::from_millis(200)).await;
    let snapshot = session.snapshot().await;
    assert!(snapshot.using_pose_coach, "transient failure must not disable coaching");
    assert_eq!(snapshot.completed_reps, 1);

    session.cancel().await;
}

#[tokio::test]
async fn critical_inference_failure_forces_manual_mode_and_releases_device() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 10, true).await.unwrap();

    let device = ScriptedCaptureDevice::new(Duration::from_millis(2));
    let released = device.release_flag();
    let provider = ScriptedPoseProvider::new(vec![ScriptStep::Critical(
        "model ran out of memory".to_owned(),
    )]);

    session
        .attach_capture(Box::new(device), Box::new(provider))
        .await
        .unwrap();

    sleep(Duration::from_millis(200)).await;
    let snapshot = session.snapshot().await;
    assert!(!snapshot.using_pose_coach);
    assert!(snapshot
        .latest_feedback
        .as_deref()
        .is_some_and(|f| f.contains("manual")));
    assert!(released.load(Ordering::SeqCst));

    // Manual counting still works after the fallback
    session.increment().await;
    assert_eq!(session.snapshot().await.completed_reps, 1);

    session.cancel().await;
}

#[tokio::test]
async fn repeated_transient_failures_escalate_to_fallback() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 10, true).await.unwrap();

    // Default limit is three consecutive transient failures
    let script = vec![
        ScriptStep::Transient("hiccup 1".to_owned()),
        ScriptStep::Transient("hiccup 2".to_owned()),
        ScriptStep::Transient("hiccup 3".to_owned()),
    ];
    let device = ScriptedCaptureDevice::new(Duration::from_millis(2));
    let released = device.release_flag();
    session
        .attach_capture(Box::new(device), Box::new(ScriptedPoseProvider::new(script)))
        .await
        .unwrap();

    sleep(Duration::from_millis(200)).await;
    let snapshot = session.snapshot().await;
    assert!(!snapshot.using_pose_coach, "must never retry forever");
    assert!(released.load(Ordering::SeqCst));

    session.cancel().await;
}

#[tokio::test]
async fn permission_denied_disables_pose_coaching_with_notice() {
    let store = create_test_store();
    let (_, session) = start_session(store, "push-ups", 10, true).await.unwrap();

    let device = ScriptedCaptureDevice::new(Duration::from_millis(2)).denied();
    let provider = ScriptedPoseProvider::repeating(PoseBuilder::standing().build());
    session
        .attach_capture(Box::new(device), Box::new(provider))
        .await
        .unwrap();

    sleep(Duration::from_millis(100)).await;
    let snapshot = session.snapshot().await;
    assert!(!snapshot.using_pose_coach);
    assert!(snapshot.latest_feedback.is_some());

    session.cancel().await;
}
