// ABOUTME: Synthetic pose construction and scripted capture/inference collaborators
// ABOUTME: Used by the demo binary and the integration tests; no real camera or model involved
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Simulation Utilities
//!
//! [`PoseBuilder`] constructs anatomically plausible pose estimates with
//! controlled joint angles, and the scripted [`ScriptedCaptureDevice`] /
//! [`ScriptedPoseProvider`] pair stands in for a camera and an estimation
//! model. The demo binary and the integration tests both run full sessions
//! through these without any hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::time::sleep;

use crate::capture::{CaptureDevice, PoseProvider, VideoFrame};
use crate::errors::{AppError, AppResult};
use crate::models::landmark::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_FOOT, LEFT_HEEL, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST,
    NOSE, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_FOOT, RIGHT_HEEL, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER,
    RIGHT_WRIST,
};
use crate::models::{Landmark, PoseEstimate, POSE_LANDMARK_COUNT};

/// Default visibility assigned to every synthetic landmark
const DEFAULT_VISIBILITY: f64 = 0.9;

/// Builder for synthetic pose estimates with controlled joint angles.
///
/// Starts from an upright standing pose with straight arms and legs; each
/// method repositions the involved landmarks while keeping the rest intact.
#[derive(Debug, Clone)]
pub struct PoseBuilder {
    landmarks: Vec<Landmark>,
}

impl PoseBuilder {
    /// Upright standing pose, all landmarks visible
    #[must_use]
    pub fn standing() -> Self {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, DEFAULT_VISIBILITY); POSE_LANDMARK_COUNT];
        let mut set = |i: usize, x: f64, y: f64| landmarks[i] = Landmark::new(x, y, DEFAULT_VISIBILITY);

        set(NOSE, 0.5, 0.10);
        set(LEFT_SHOULDER, 0.42, 0.25);
        set(RIGHT_SHOULDER, 0.58, 0.25);
        set(LEFT_ELBOW, 0.40, 0.40);
        set(RIGHT_ELBOW, 0.60, 0.40);
        set(LEFT_WRIST, 0.39, 0.55);
        set(RIGHT_WRIST, 0.61, 0.55);
        set(LEFT_HIP, 0.44, 0.52);
        set(RIGHT_HIP, 0.56, 0.52);
        set(LEFT_KNEE, 0.44, 0.72);
        set(RIGHT_KNEE, 0.56, 0.72);
        set(LEFT_ANKLE, 0.44, 0.92);
        set(RIGHT_ANKLE, 0.56, 0.92);
        set(LEFT_HEEL, 0.43, 0.95);
        set(RIGHT_HEEL, 0.57, 0.95);
        set(LEFT_FOOT, 0.46, 0.96);
        set(RIGHT_FOOT, 0.54, 0.96);

        Self { landmarks }
    }

    /// Bend both elbows to the given joint angle (degrees)
    #[must_use]
    pub fn elbow_angle(mut self, degrees: f64) -> Self {
        let left = place_joint(
            self.landmarks[LEFT_ELBOW].pos(),
            self.landmarks[LEFT_SHOULDER].pos(),
            degrees,
            0.15,
        );
        let right = place_joint(
            self.landmarks[RIGHT_ELBOW].pos(),
            self.landmarks[RIGHT_SHOULDER].pos(),
            -degrees,
            0.15,
        );
        self.landmarks[LEFT_WRIST] = Landmark::new(left.0, left.1, DEFAULT_VISIBILITY);
        self.landmarks[RIGHT_WRIST] = Landmark::new(right.0, right.1, DEFAULT_VISIBILITY);
        self
    }

    /// Bend both knees to the given joint angle (degrees)
    #[must_use]
    pub fn knee_angle(mut self, degrees: f64) -> Self {
        let left = place_joint(
            self.landmarks[LEFT_KNEE].pos(),
            self.landmarks[LEFT_HIP].pos(),
            degrees,
            0.2,
        );
        let right = place_joint(
            self.landmarks[RIGHT_KNEE].pos(),
            self.landmarks[RIGHT_HIP].pos(),
            -degrees,
            0.2,
        );
        self.landmarks[LEFT_ANKLE] = Landmark::new(left.0, left.1, DEFAULT_VISIBILITY);
        self.landmarks[RIGHT_ANKLE] = Landmark::new(right.0, right.1, DEFAULT_VISIBILITY);
        self
    }

    /// Bend the torso (shoulder-hip-knee angle on the left side, degrees)
    #[must_use]
    pub fn torso_angle(mut self, degrees: f64) -> Self {
        let knee = place_joint(
            self.landmarks[LEFT_HIP].pos(),
            self.landmarks[LEFT_SHOULDER].pos(),
            degrees,
            0.2,
        );
        self.landmarks[LEFT_KNEE] = Landmark::new(knee.0, knee.1, DEFAULT_VISIBILITY);
        self
    }

    /// Raise both wrists above the head
    #[must_use]
    pub fn arms_overhead(mut self) -> Self {
        let nose_y = self.landmarks[NOSE].y;
        self.landmarks[LEFT_WRIST] = Landmark::new(0.38, nose_y - 0.06, DEFAULT_VISIBILITY);
        self.landmarks[RIGHT_WRIST] = Landmark::new(0.62, nose_y - 0.06, DEFAULT_VISIBILITY);
        self
    }

    /// Spread the ankles to the given horizontal separation
    #[must_use]
    pub fn ankle_separation(mut self, separation: f64) -> Self {
        let y = self.landmarks[LEFT_ANKLE].y;
        self.landmarks[LEFT_ANKLE] = Landmark::new(0.5 - separation / 2.0, y, DEFAULT_VISIBILITY);
        self.landmarks[RIGHT_ANKLE] = Landmark::new(0.5 + separation / 2.0, y, DEFAULT_VISIBILITY);
        self
    }

    /// Lift the left knee above hip height
    #[must_use]
    pub fn left_knee_raised(mut self) -> Self {
        let hip = self.landmarks[LEFT_HIP];
        self.landmarks[LEFT_KNEE] = Landmark::new(hip.x + 0.02, hip.y - 0.05, DEFAULT_VISIBILITY);
        self
    }

    /// Push the left knee forward of the left ankle by the given margin
    #[must_use]
    pub fn knee_past_toes(mut self, margin: f64) -> Self {
        let ankle = self.landmarks[LEFT_ANKLE];
        let knee = self.landmarks[LEFT_KNEE];
        self.landmarks[LEFT_KNEE] =
            Landmark::new(ankle.x + margin, knee.y, DEFAULT_VISIBILITY);
        self
    }

    /// Shift every landmark vertically (drives the generic centroid detector)
    #[must_use]
    pub fn shifted_vertically(mut self, dy: f64) -> Self {
        for landmark in &mut self.landmarks {
            landmark.y += dy;
        }
        self
    }

    /// Set every landmark's visibility
    #[must_use]
    pub fn visibility(mut self, visibility: f64) -> Self {
        for landmark in &mut self.landmarks {
            landmark.visibility = visibility;
        }
        self
    }

    /// Finish the pose estimate.
    ///
    /// # Panics
    ///
    /// Never panics: the builder always holds exactly the required number of
    /// landmarks.
    #[must_use]
    #[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
    pub fn build(self) -> PoseEstimate {
        PoseEstimate::new(self.landmarks).unwrap() // Safe: length fixed at construction
    }
}

/// Place a point at `length` from `vertex`, rotated `degrees` away from the
/// ray `vertex → reference`, so the joint angle at `vertex` equals `degrees`.
fn place_joint(vertex: (f64, f64), reference: (f64, f64), degrees: f64, length: f64) -> (f64, f64) {
    let base = (reference.1 - vertex.1).atan2(reference.0 - vertex.0);
    let theta = base + degrees.to_radians();
    (
        length.mul_add(theta.cos(), vertex.0),
        length.mul_add(theta.sin(), vertex.1),
    )
}

/// The standard pose script for one full push-up excursion
#[must_use]
pub fn pushup_excursion() -> Vec<ScriptStep> {
    [170.0, 95.0, 80.0, 170.0]
        .into_iter()
        .map(|deg| ScriptStep::Pose(PoseBuilder::standing().elbow_angle(deg).build()))
        .collect()
}

/// One step in a scripted inference sequence
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this pose estimate
    Pose(PoseEstimate),
    /// Fail with a transient inference error
    Transient(String),
    /// Fail with a critical inference error
    Critical(String),
}

/// Scripted camera stand-in producing frames on a fixed cadence
pub struct ScriptedCaptureDevice {
    interval: Duration,
    frames_remaining: Option<u64>,
    seq: u64,
    deny_permission: bool,
    released: Arc<AtomicBool>,
}

impl ScriptedCaptureDevice {
    /// Device yielding frames every `interval`
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frames_remaining: None,
            seq: 0,
            deny_permission: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop yielding after `frames` frames (the device then idles forever)
    #[must_use]
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frames_remaining = Some(frames);
        self
    }

    /// Make `start` fail with a permission error
    #[must_use]
    pub fn denied(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    /// Handle observing whether the device track has been released
    #[must_use]
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

#[async_trait]
impl CaptureDevice for ScriptedCaptureDevice {
    async fn start(&mut self) -> AppResult<()> {
        if self.deny_permission {
            return Err(AppError::permission_denied("camera access refused"));
        }
        self.released.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn next_frame(&mut self) -> AppResult<VideoFrame> {
        if self.frames_remaining == Some(0) {
            // Exhausted: idle until the loop is stopped from outside
            return std::future::pending().await;
        }
        if let Some(remaining) = &mut self.frames_remaining {
            *remaining -= 1;
        }
        sleep(self.interval).await;
        self.seq += 1;
        Ok(VideoFrame {
            seq: self.seq,
            captured_at: Utc::now(),
            data: Bytes::new(),
        })
    }

    async fn stop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Scripted pose provider replaying a fixed inference sequence.
///
/// When the script runs out the provider keeps returning the last pose it
/// produced, so sessions can idle without erroring.
pub struct ScriptedPoseProvider {
    script: VecDeque<ScriptStep>,
    hold: PoseEstimate,
    calls: Arc<AtomicU64>,
}

impl ScriptedPoseProvider {
    /// Provider replaying `steps`, then holding the last produced pose
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            hold: PoseBuilder::standing().build(),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Provider that always returns the same pose
    #[must_use]
    pub fn repeating(pose: PoseEstimate) -> Self {
        Self {
            script: VecDeque::new(),
            hold: pose,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle counting how many inference calls were made
    #[must_use]
    pub fn call_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl PoseProvider for ScriptedPoseProvider {
    async fn infer(&mut self, _frame: &VideoFrame) -> AppResult<PoseEstimate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(ScriptStep::Pose(pose)) => {
                self.hold = pose.clone();
                Ok(pose)
            }
            Some(ScriptStep::Transient(msg)) => Err(AppError::inference_transient(msg)),
            Some(ScriptStep::Critical(msg)) => Err(AppError::inference_critical(msg)),
            None => Ok(self.hold.clone()),
        }
    }
}
