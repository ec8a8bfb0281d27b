// ABOUTME: Common data models: pose estimates, exercise definitions, session state and results
// ABOUTME: Landmark indexing follows the 33-point pose topology used by the estimation provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Data Models
//!
//! The model layer is deliberately thin: a [`PoseEstimate`] is an immutable
//! snapshot consumed by exactly one classifier call, an
//! [`ExerciseDefinition`] is read-only catalog data, and [`SessionState`] is
//! owned exclusively by the session coordinator and only ever observed from
//! outside through [`SessionSnapshot`].

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Number of landmarks in one pose estimate
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Landmark indices for the joints the engine reads.
///
/// Indices match the 33-point full-body topology emitted by the pose
/// estimation provider.
pub mod landmark {
    /// Nose tip
    pub const NOSE: usize = 0;
    /// Left shoulder
    pub const LEFT_SHOULDER: usize = 11;
    /// Right shoulder
    pub const RIGHT_SHOULDER: usize = 12;
    /// Left elbow
    pub const LEFT_ELBOW: usize = 13;
    /// Right elbow
    pub const RIGHT_ELBOW: usize = 14;
    /// Left wrist
    pub const LEFT_WRIST: usize = 15;
    /// Right wrist
    pub const RIGHT_WRIST: usize = 16;
    /// Left hip
    pub const LEFT_HIP: usize = 23;
    /// Right hip
    pub const RIGHT_HIP: usize = 24;
    /// Left knee
    pub const LEFT_KNEE: usize = 25;
    /// Right knee
    pub const RIGHT_KNEE: usize = 26;
    /// Left ankle
    pub const LEFT_ANKLE: usize = 27;
    /// Right ankle
    pub const RIGHT_ANKLE: usize = 28;
    /// Left heel
    pub const LEFT_HEEL: usize = 29;
    /// Right heel
    pub const RIGHT_HEEL: usize = 30;
    /// Left foot index
    pub const LEFT_FOOT: usize = 31;
    /// Right foot index
    pub const RIGHT_FOOT: usize = 32;
}

/// A single body landmark: normalized planar position plus visibility confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized x coordinate (0..1, left to right)
    pub x: f64,
    /// Normalized y coordinate (0..1, top to bottom)
    pub y: f64,
    /// Visibility confidence (0..1)
    pub visibility: f64,
}

impl Landmark {
    /// Create a landmark
    #[must_use]
    pub const fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    /// Planar position as a point tuple
    #[must_use]
    pub const fn pos(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// One frame's worth of body landmarks.
///
/// Produced once per accepted frame; immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseEstimate {
    landmarks: Vec<Landmark>,
}

impl PoseEstimate {
    /// Build a pose estimate from an ordered landmark list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` if the list is not exactly
    /// [`POSE_LANDMARK_COUNT`] entries long.
    pub fn new(landmarks: Vec<Landmark>) -> AppResult<Self> {
        if landmarks.len() != POSE_LANDMARK_COUNT {
            return Err(AppError::invalid_input(format!(
                "pose estimate requires {POSE_LANDMARK_COUNT} landmarks, got {}",
                landmarks.len()
            )));
        }
        Ok(Self { landmarks })
    }

    /// Landmark at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// All landmarks in order
    #[must_use]
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// True when every listed landmark meets the visibility threshold
    #[must_use]
    pub fn all_visible(&self, indices: &[usize], threshold: f64) -> bool {
        indices
            .iter()
            .all(|&i| self.landmarks.get(i).is_some_and(|l| l.visibility > threshold))
    }

    /// Centroid of all landmarks meeting the visibility threshold
    #[must_use]
    pub fn visible_centroid(&self, threshold: f64) -> Option<(f64, f64)> {
        let visible: Vec<&Landmark> = self
            .landmarks
            .iter()
            .filter(|l| l.visibility > threshold)
            .collect();
        if visible.is_empty() {
            return None;
        }
        let n = visible.len() as f64;
        let x = visible.iter().map(|l| l.x).sum::<f64>() / n;
        let y = visible.iter().map(|l| l.y).sum::<f64>() / n;
        Some((x, y))
    }
}

/// Exercise category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    /// Resistance movements (push-ups, squats, ...)
    Strength,
    /// Conditioning movements (jumping jacks, high knees, ...)
    Cardio,
    /// Held poses and mobility work
    Yoga,
}

/// Exercise difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Suitable for newcomers
    Beginner,
    /// Some conditioning assumed
    Intermediate,
    /// Demanding movements
    Advanced,
}

/// One entry in the exercise catalog.
///
/// Read-only for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    /// Stable identifier (e.g. `push-ups`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description shown in the library view
    pub description: String,
    /// Category tag
    pub category: ExerciseCategory,
    /// Difficulty tag
    pub difficulty: Difficulty,
    /// Muscle groups the exercise targets
    pub target_muscles: Vec<String>,
    /// Technique tips surfaced alongside the session
    pub form_tips: Vec<String>,
    /// Calories burned per completed repetition
    pub calories_per_rep: f64,
    /// Landmark-index triples whose joint angles drive classification,
    /// surfaced to UI layers as advisory metadata
    pub angle_joints: Vec<[usize; 3]>,
}

/// Lifecycle phase of a coaching session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Allocated but not yet running
    Created,
    /// Ticker running, accepting rep events
    Active,
    /// Finished and (attempted to be) persisted
    Completed,
    /// Aborted without persistence
    Cancelled,
}

impl SessionPhase {
    /// Whether the session has reached a terminal phase
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Mutable state of one coaching session.
///
/// Owned exclusively by the session coordinator behind its mutation gateway;
/// everything else sees [`SessionSnapshot`] copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Persistent session id assigned by the store
    pub session_id: Uuid,
    /// User running the session
    pub user_id: Uuid,
    /// Exercise being performed
    pub exercise_id: String,
    /// Repetition goal; reaching it is terminal and irrevocable
    pub target_reps: u32,
    /// Completed repetitions, always in `0..=target_reps`
    pub completed_reps: u32,
    /// Elapsed wall-clock seconds, advanced by the 1 Hz ticker
    pub elapsed_seconds: u64,
    /// Recent feedback, most recent last; bounded, older entries discarded
    pub feedback_log: VecDeque<String>,
    /// Whether pose coaching is (still) driving rep counting
    pub using_pose_coach: bool,
    /// Current lifecycle phase
    pub phase: SessionPhase,
    /// Final results once completed
    pub results: Option<SessionResults>,
    /// Set when completion succeeded locally but persistence failed
    pub unsynced: bool,
}

/// Read-only view of a session, exposed to UI layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Persistent session id
    pub session_id: Uuid,
    /// Exercise being performed
    pub exercise_id: String,
    /// Repetition goal
    pub target_reps: u32,
    /// Completed repetitions
    pub completed_reps: u32,
    /// Elapsed seconds
    pub elapsed_seconds: u64,
    /// Most recent feedback entry, if any
    pub latest_feedback: Option<String>,
    /// Whether pose coaching is active
    pub using_pose_coach: bool,
    /// Lifecycle phase
    pub phase: SessionPhase,
    /// Final results once completed
    pub results: Option<SessionResults>,
    /// True when the final tally could not be persisted
    pub unsynced: bool,
}

impl SessionState {
    /// Build the read-only snapshot handed to UI layers
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            exercise_id: self.exercise_id.clone(),
            target_reps: self.target_reps,
            completed_reps: self.completed_reps,
            elapsed_seconds: self.elapsed_seconds,
            latest_feedback: self.feedback_log.back().cloned(),
            using_pose_coach: self.using_pose_coach,
            phase: self.phase,
            results: self.results.clone(),
            unsynced: self.unsynced,
        }
    }
}

/// Outcome of a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    /// Final rep tally, capped at the target
    pub completed_reps: u32,
    /// Session duration in seconds
    pub duration_seconds: u64,
    /// Calories burned (reps x per-rep rate)
    pub calories_burned: f64,
    /// Wellness stars awarded for finishing the session
    pub stars_awarded: u32,
    /// Form accuracy estimate for pose-coached sessions
    pub form_accuracy: Option<f64>,
    /// False when the tally was computed locally after a persistence failure
    pub synced: bool,
}

/// Persisted record of one session, as stored and returned in history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session id
    pub session_id: Uuid,
    /// User id
    pub user_id: Uuid,
    /// Exercise id
    pub exercise_id: String,
    /// Display name captured at start time
    pub exercise_name: String,
    /// Repetition goal
    pub target_reps: u32,
    /// Final rep tally (zero until completed)
    pub completed_reps: u32,
    /// Whether pose coaching was requested at start
    pub used_pose_coach: bool,
    /// When the session started
    pub session_start: DateTime<Utc>,
    /// When the session completed, if it did
    pub completed_at: Option<DateTime<Utc>>,
    /// Duration in seconds (zero until completed)
    pub duration_seconds: u64,
    /// Calories burned (zero until completed)
    pub calories_burned: f64,
    /// Stars awarded (zero until completed)
    pub stars_awarded: u32,
    /// Form accuracy, if coached
    pub form_accuracy: Option<f64>,
}

/// Aggregate exercise statistics for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSummary {
    /// Completed sessions
    pub total_sessions: u32,
    /// Total repetitions across completed sessions
    pub total_reps: u32,
    /// Total calories burned
    pub total_calories: f64,
    /// Total exercise minutes
    pub total_minutes: u64,
    /// Distinct exercises with at least one completed session
    pub exercises_tried: u32,
    /// Exercise with the most completed sessions
    pub favorite_exercise: Option<String>,
    /// Consecutive calendar days (ending today) with a completed session
    pub current_streak: u32,
    /// Mean form accuracy over coached sessions
    pub average_form_accuracy: Option<f64>,
}
