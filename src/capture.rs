// ABOUTME: Capture device and pose provider traits plus the throttled inference frame loop
// ABOUTME: Enforces modulo-K frame submission, single-in-flight inference, and transient/critical error handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Frame Throttle & Inference Driver
//!
//! The [`FrameLoop`] owns the capture-to-inference cadence for one session.
//! Frames are pulled from the [`CaptureDevice`] and only every K-th frame is
//! submitted to the [`PoseProvider`]: throttling is a hard backpressure
//! mechanism bounding inference cost, not an optimization. Because the loop
//! awaits each inference call before pulling the next frame, at most one
//! inference is ever outstanding; frames produced in the meantime are simply
//! dropped, never queued.
//!
//! Inference failures are classified. Transient failures skip the frame and
//! keep the loop alive; critical failures (or too many consecutive transient
//! ones) stop the loop, release the device, and flip the session into manual
//! counting with a single user-visible notice.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::classifiers::Classifier;
use crate::config::EngineConfig;
use crate::errors::AppResult;
use crate::models::PoseEstimate;
use crate::session::SessionCoordinator;

/// One raw video frame handed to the pose provider
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Monotonically increasing frame number from the device
    pub seq: u64,
    /// Capture timestamp
    pub captured_at: DateTime<Utc>,
    /// Opaque pixel payload; the engine never inspects it
    pub data: Bytes,
}

/// A video capture source.
///
/// Implementations must guarantee that `stop` releases the underlying
/// track/device and is safe to call more than once.
#[async_trait]
pub trait CaptureDevice: Send {
    /// Acquire the device and begin producing frames.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PermissionDenied` when access is refused.
    async fn start(&mut self) -> AppResult<()>;

    /// Pull the next frame. Frames not pulled are dropped by the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device has failed; the loop stops on it.
    async fn next_frame(&mut self) -> AppResult<VideoFrame>;

    /// Release the device. Idempotent.
    async fn stop(&mut self);
}

/// Asynchronous pose estimation over single frames.
///
/// Constructed once per session and disposed when the frame loop exits.
#[async_trait]
pub trait PoseProvider: Send {
    /// Run inference on one frame.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InferenceTransient` for one-off failures and
    /// `AppError::InferenceCritical` for resource-pattern failures that must
    /// terminate the capture loop.
    async fn infer(&mut self, frame: &VideoFrame) -> AppResult<PoseEstimate>;
}

/// The per-session capture/inference loop
pub struct FrameLoop {
    device: Box<dyn CaptureDevice>,
    provider: Box<dyn PoseProvider>,
    coordinator: SessionCoordinator,
    classifier: Classifier,
    config: EngineConfig,
    stop: watch::Receiver<bool>,
    frame_counter: u64,
    consecutive_failures: u32,
}

impl FrameLoop {
    pub(crate) fn new(
        device: Box<dyn CaptureDevice>,
        provider: Box<dyn PoseProvider>,
        coordinator: SessionCoordinator,
        classifier: Classifier,
        config: EngineConfig,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            device,
            provider,
            coordinator,
            classifier,
            config,
            stop,
            frame_counter: 0,
            consecutive_failures: 0,
        }
    }

    /// Drive the loop until the session stops or a critical failure occurs.
    ///
    /// The device is released on every exit path; the provider is disposed
    /// when the loop (and with it the provider handle) is dropped.
    pub async fn run(mut self) {
        if let Err(err) = self.device.start().await {
            warn!("capture device failed to start: {err}");
            self.coordinator
                .fall_back_to_manual(
                    "Camera unavailable - switching to manual rep counting",
                )
                .await;
            return;
        }
        info!("capture loop started (throttle factor {})", self.config.throttle_factor);

        loop {
            let frame = tokio::select! {
                _ = self.stop.changed() => break,
                frame = self.device.next_frame() => frame,
            };
            if *self.stop.borrow() {
                break;
            }

            let frame = match frame {
                Ok(frame) => frame,
                Err(err) => {
                    warn!("capture device stopped producing frames: {err}");
                    break;
                }
            };

            self.frame_counter += 1;
            if self.frame_counter % self.config.throttle_factor != 0 {
                // Yield after every throttling decision so the host loop
                // never starves, submitted frame or not.
                tokio::task::yield_now().await;
                continue;
            }

            // Single-in-flight invariant: this await completes before the
            // next frame is pulled, so a second inference can never start
            // while one is outstanding.
            match self.provider.infer(&frame).await {
                Ok(pose) => {
                    self.consecutive_failures = 0;
                    let observation = self.classifier.observe(&pose, Instant::now());
                    self.coordinator.publish_pose(pose);
                    self.coordinator.apply_observation(observation).await;
                }
                Err(err) => {
                    self.consecutive_failures += 1;
                    if err.is_critical_inference()
                        || self.consecutive_failures >= self.config.max_consecutive_failures
                    {
                        error!(
                            failures = self.consecutive_failures,
                            "stopping capture loop after inference failure: {err}"
                        );
                        self.coordinator
                            .fall_back_to_manual(
                                "Pose coaching stopped - switching to manual rep counting",
                            )
                            .await;
                        break;
                    }
                    debug!("transient inference failure, skipping frame: {err}");
                }
            }
        }

        self.device.stop().await;
        info!(
            frames_seen = self.frame_counter,
            "capture loop stopped, device released"
        );
    }
}
