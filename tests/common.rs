// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides store, session, and failure-injection helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(dead_code, clippy::missing_errors_doc, clippy::must_use_candidate)]

//! Shared test utilities for `repcoach`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use repcoach::catalog::Catalog;
use repcoach::config::EngineConfig;
use repcoach::errors::{AppError, AppResult};
use repcoach::models::{ExerciseDefinition, ProgressSummary, SessionRecord, SessionResults};
use repcoach::session::{SessionCoordinator, SessionRequest};
use repcoach::store::{MemoryStore, SessionStore};

/// Initialize quiet logging for tests (safe to call from every test)
pub fn init_test_logging() {
    repcoach::logging::init();
}

/// Fresh in-memory store over the built-in catalog
pub fn create_test_store() -> Arc<MemoryStore> {
    init_test_logging();
    Arc::new(MemoryStore::new(Catalog::builtin()))
}

/// Resolve one built-in exercise definition
pub fn exercise(id: &str) -> ExerciseDefinition {
    Catalog::builtin()
        .get(id)
        .expect("built-in exercise")
        .clone()
}

/// Start a session against the given store with default engine config
pub async fn start_session(
    store: Arc<dyn SessionStore>,
    exercise_id: &str,
    target_reps: u32,
    use_pose_coach: bool,
) -> Result<(Uuid, SessionCoordinator)> {
    let user_id = Uuid::new_v4();
    let session = SessionCoordinator::start(
        store,
        EngineConfig::default(),
        SessionRequest {
            user_id,
            exercise: exercise(exercise_id),
            target_reps,
            use_pose_coach,
        },
    )
    .await?;
    Ok((user_id, session))
}

/// Store decorator injecting persistence failures on demand
pub struct FailingStore {
    inner: MemoryStore,
    fail_start: AtomicBool,
    fail_complete: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(Catalog::builtin()),
            fail_start: AtomicBool::new(false),
            fail_complete: AtomicBool::new(false),
        }
    }

    pub fn fail_next_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub fn fail_complete(&self) {
        self.fail_complete.store(true, Ordering::SeqCst);
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn start_session(
        &self,
        user_id: Uuid,
        exercise_id: &str,
        target_reps: u32,
        used_pose_coach: bool,
    ) -> AppResult<Uuid> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(AppError::persistence("injected start failure"));
        }
        self.inner
            .start_session(user_id, exercise_id, target_reps, used_pose_coach)
            .await
    }

    async fn complete_session(
        &self,
        session_id: Uuid,
        completed_reps: u32,
        elapsed_seconds: u64,
        form_accuracy: Option<f64>,
    ) -> AppResult<SessionResults> {
        if self.fail_complete.load(Ordering::SeqCst) {
            return Err(AppError::persistence("injected complete failure"));
        }
        self.inner
            .complete_session(session_id, completed_reps, elapsed_seconds, form_accuracy)
            .await
    }

    async fn get_progress(&self, user_id: Uuid) -> AppResult<ProgressSummary> {
        self.inner.get_progress(user_id).await
    }

    async fn get_history(&self, user_id: Uuid) -> AppResult<Vec<SessionRecord>> {
        self.inner.get_history(user_id).await
    }
}
