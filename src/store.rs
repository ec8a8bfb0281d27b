// ABOUTME: Session persistence trait plus the in-memory reference store
// ABOUTME: Computes calories, stars, progress aggregates, streaks, and most-recent-first history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Session Store
//!
//! [`SessionStore`] is the persistence seam the coordinator talks to.
//! [`MemoryStore`] is the in-process reference implementation; deployments
//! back the trait with whatever durable storage they have.
//!
//! Completion awards a flat [`STARS_PER_SESSION`] stars and burns
//! `completed_reps × calories_per_rep` calories. Progress aggregates cover
//! totals, the favorite exercise, the consecutive-day streak ending today,
//! and mean form accuracy over coached sessions.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::errors::{AppError, AppResult};
use crate::models::{ProgressSummary, SessionRecord, SessionResults};
use crate::session::STARS_PER_SESSION;

/// Persistence collaborator for session lifecycle and statistics
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new session record and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error when the exercise is unknown or persistence fails;
    /// the caller must not create any local session state in that case.
    async fn start_session(
        &self,
        user_id: Uuid,
        exercise_id: &str,
        target_reps: u32,
        used_pose_coach: bool,
    ) -> AppResult<Uuid>;

    /// Close a session record with its final tally and compute rewards.
    ///
    /// # Errors
    ///
    /// Returns an error when the session is unknown, already completed, or
    /// persistence fails.
    async fn complete_session(
        &self,
        session_id: Uuid,
        completed_reps: u32,
        elapsed_seconds: u64,
        form_accuracy: Option<f64>,
    ) -> AppResult<SessionResults>;

    /// Aggregate statistics for one user, over completed sessions.
    ///
    /// # Errors
    ///
    /// Returns an error when persistence fails.
    async fn get_progress(&self, user_id: Uuid) -> AppResult<ProgressSummary>;

    /// Completed and in-flight sessions for one user, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error when persistence fails.
    async fn get_history(&self, user_id: Uuid) -> AppResult<Vec<SessionRecord>>;
}

/// In-memory session store backed by a concurrent map
pub struct MemoryStore {
    catalog: Catalog,
    sessions: DashMap<Uuid, SessionRecord>,
}

impl MemoryStore {
    /// Create an empty store over the given catalog
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            sessions: DashMap::new(),
        }
    }

    fn completed_for(&self, user_id: Uuid) -> Vec<SessionRecord> {
        self.sessions
            .iter()
            .filter(|r| r.user_id == user_id && r.completed_at.is_some())
            .map(|r| r.value().clone())
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn start_session(
        &self,
        user_id: Uuid,
        exercise_id: &str,
        target_reps: u32,
        used_pose_coach: bool,
    ) -> AppResult<Uuid> {
        if target_reps == 0 {
            return Err(AppError::invalid_input("target_reps must be positive"));
        }
        let definition = self.catalog.get(exercise_id)?;

        let session_id = Uuid::new_v4();
        let record = SessionRecord {
            session_id,
            user_id,
            exercise_id: definition.id.clone(),
            exercise_name: definition.name.clone(),
            target_reps,
            completed_reps: 0,
            used_pose_coach,
            session_start: Utc::now(),
            completed_at: None,
            duration_seconds: 0,
            calories_burned: 0.0,
            stars_awarded: 0,
            form_accuracy: None,
        };
        self.sessions.insert(session_id, record);
        debug!(session_id = %session_id, exercise = exercise_id, "session record opened");
        Ok(session_id)
    }

    async fn complete_session(
        &self,
        session_id: Uuid,
        completed_reps: u32,
        elapsed_seconds: u64,
        form_accuracy: Option<f64>,
    ) -> AppResult<SessionResults> {
        let calories_per_rep = {
            let record = self
                .sessions
                .get(&session_id)
                .ok_or_else(|| AppError::not_found(format!("session {session_id}")))?;
            if record.completed_at.is_some() {
                return Err(AppError::invalid_state("session already completed"));
            }
            self.catalog.get(&record.exercise_id)?.calories_per_rep
        };

        let results = SessionResults {
            completed_reps,
            duration_seconds: elapsed_seconds,
            calories_burned: f64::from(completed_reps) * calories_per_rep,
            stars_awarded: STARS_PER_SESSION,
            form_accuracy,
            synced: true,
        };

        if let Some(mut record) = self.sessions.get_mut(&session_id) {
            record.completed_reps = completed_reps;
            record.completed_at = Some(Utc::now());
            record.duration_seconds = elapsed_seconds;
            record.calories_burned = results.calories_burned;
            record.stars_awarded = results.stars_awarded;
            record.form_accuracy = form_accuracy;
        }
        debug!(session_id = %session_id, reps = completed_reps, "session record closed");
        Ok(results)
    }

    async fn get_progress(&self, user_id: Uuid) -> AppResult<ProgressSummary> {
        let completed = self.completed_for(user_id);

        let total_sessions = completed.len() as u32;
        let total_reps = completed.iter().map(|r| r.completed_reps).sum();
        let total_calories = completed.iter().map(|r| r.calories_burned).sum();
        let total_seconds: u64 = completed.iter().map(|r| r.duration_seconds).sum();

        let mut per_exercise: HashMap<&str, u32> = HashMap::new();
        for record in &completed {
            *per_exercise.entry(record.exercise_name.as_str()).or_default() += 1;
        }
        let favorite_exercise = per_exercise
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&name, _)| name.to_owned());

        let accuracies: Vec<f64> = completed.iter().filter_map(|r| r.form_accuracy).collect();
        let average_form_accuracy = if accuracies.is_empty() {
            None
        } else {
            Some(accuracies.iter().sum::<f64>() / accuracies.len() as f64)
        };

        let days: HashSet<NaiveDate> = completed
            .iter()
            .filter_map(|r| r.completed_at)
            .map(|t| t.date_naive())
            .collect();

        Ok(ProgressSummary {
            total_sessions,
            total_reps,
            total_calories,
            total_minutes: total_seconds / 60,
            exercises_tried: per_exercise.len() as u32,
            favorite_exercise,
            current_streak: streak_ending_today(&days),
            average_form_accuracy,
        })
    }

    async fn get_history(&self, user_id: Uuid) -> AppResult<Vec<SessionRecord>> {
        let mut history: Vec<SessionRecord> = self
            .sessions
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        history.sort_by(|a, b| b.session_start.cmp(&a.session_start));
        Ok(history)
    }
}

/// Consecutive calendar days with activity, counting back from today
fn streak_ending_today(days: &HashSet<NaiveDate>) -> u32 {
    let mut streak = 0;
    let mut cursor = Utc::now().date_naive();
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}
