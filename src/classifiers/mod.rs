// ABOUTME: Exercise phase classifiers: one hysteresis state machine per exercise kind
// ABOUTME: Dispatch is a tagged enum over kinds; a rep requires a full phase excursion, never a single crossing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Exercise Classifiers
//!
//! Each exercise kind gets a small state machine that consumes one
//! [`PoseEstimate`] per accepted frame and emits at most one rep-completion
//! event plus feedback strings. Counting is hysteresis-based: a rep requires
//! a validated phase transition (e.g. contracted → extended), so a noisy
//! signal hovering around a threshold can never double-count.
//!
//! Frames whose required landmarks fall below the visibility threshold are
//! no-ops: no state change, no events.

mod generic;
mod high_knee;
mod jumping_jack;
mod lunge;
mod pushup;
mod squat;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::PoseEstimate;

/// Exercise kinds with a dedicated phase detector.
///
/// Unknown catalog ids fall back to [`ExerciseKind::Generic`], which tracks
/// whole-body movement instead of specific joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    /// Elbow-angle push-up detector with torso form check
    PushUp,
    /// Knee-angle squat detector with knee-over-toes form check
    Squat,
    /// Arms-up-and-legs-apart jumping jack detector
    JumpingJack,
    /// Minimum-knee-angle lunge detector
    Lunge,
    /// Knee-above-hip high-knee detector with cool-down
    HighKnee,
    /// Centroid-displacement fallback for uninstrumented exercises
    Generic,
}

impl ExerciseKind {
    /// Resolve a catalog exercise id to its classifier kind
    #[must_use]
    pub fn from_exercise_id(id: &str) -> Self {
        match id {
            "push-ups" => Self::PushUp,
            "squats" => Self::Squat,
            "jumping-jacks" => Self::JumpingJack,
            "lunges" => Self::Lunge,
            "high-knees" => Self::HighKnee,
            _ => Self::Generic,
        }
    }
}

/// Movement phase within one repetition cycle.
///
/// Each exercise uses a subset: push-ups, squats and lunges move between
/// `Contracted` and `Extended`; jumping jacks treat the open position as
/// `Extended` and the closed rest as `Neutral`; high knees use `Raised` and
/// re-arm to `Lowered` after the cool-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No phase observed yet, or back at rest
    Neutral,
    /// Bottom of the movement (down / closed)
    Contracted,
    /// Top of the movement (up / open)
    Extended,
    /// Knee raised above hip (high knees)
    Raised,
    /// Knee back down after the cool-down re-arm (high knees)
    Lowered,
}

/// Per-session classifier state, reset whenever a new session starts
#[derive(Debug, Clone)]
pub struct ClassifierState {
    /// Current phase
    pub phase: Phase,
    /// Last phase that was held stably (drives rep validation)
    pub last_stable_phase: Phase,
    /// Whether an excursion is underway
    pub in_progress: bool,
    /// Previous frame's body centroid (generic detector)
    pub last_centroid: Option<(f64, f64)>,
    /// High-knee: instant until which a raised knee cannot re-count
    pub raised_until: Option<Instant>,
    /// Generic: instant at which the armed debounced count fires
    pub pending_count_at: Option<Instant>,
}

impl Default for ClassifierState {
    fn default() -> Self {
        Self {
            phase: Phase::Neutral,
            last_stable_phase: Phase::Neutral,
            in_progress: false,
            last_centroid: None,
            raised_until: None,
            pending_count_at: None,
        }
    }
}

/// Events produced by one classifier observation
#[derive(Debug, Clone, Default)]
pub struct Observation {
    /// Exactly one repetition completed on this frame
    pub rep_completed: bool,
    /// Form feedback to surface, oldest first
    pub feedback: Vec<String>,
}

impl Observation {
    /// Observation carrying no events (low-visibility frames)
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Phase detector for one exercise, holding its per-session state
#[derive(Debug)]
pub struct Classifier {
    kind: ExerciseKind,
    state: ClassifierState,
    config: EngineConfig,
}

impl Classifier {
    /// Create a classifier for the given exercise kind with fresh state
    #[must_use]
    pub fn new(kind: ExerciseKind, config: EngineConfig) -> Self {
        Self {
            kind,
            state: ClassifierState::default(),
            config,
        }
    }

    /// Exercise kind this classifier detects
    #[must_use]
    pub const fn kind(&self) -> ExerciseKind {
        self.kind
    }

    /// Last stably held phase
    #[must_use]
    pub const fn last_stable_phase(&self) -> Phase {
        self.state.last_stable_phase
    }

    /// Consume one pose estimate and advance the phase machine.
    ///
    /// `now` is the observation timestamp; the high-knee cool-down and the
    /// generic debounce window are evaluated against it, which keeps the
    /// timing logic deterministic under test.
    pub fn observe(&mut self, pose: &PoseEstimate, now: Instant) -> Observation {
        let thresholds = &self.config.thresholds;
        let visibility = self.config.visibility_threshold;
        match self.kind {
            ExerciseKind::PushUp => {
                pushup::observe(pose, &mut self.state, thresholds, visibility)
            }
            ExerciseKind::Squat => squat::observe(pose, &mut self.state, thresholds, visibility),
            ExerciseKind::JumpingJack => {
                jumping_jack::observe(pose, &mut self.state, thresholds, visibility)
            }
            ExerciseKind::Lunge => lunge::observe(pose, &mut self.state, thresholds, visibility),
            ExerciseKind::HighKnee => high_knee::observe(
                pose,
                &mut self.state,
                visibility,
                self.config.high_knee_cooldown,
                now,
            ),
            ExerciseKind::Generic => generic::observe(
                pose,
                &mut self.state,
                thresholds,
                visibility,
                self.config.generic_debounce,
                now,
            ),
        }
    }
}
