// ABOUTME: Session coordinator: lifecycle state machine, rep/feedback intake, 1 Hz ticker, idempotent teardown
// ABOUTME: SessionState lives behind a single RwLock gateway; ticker and capture loop never alias it directly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Session Coordinator
//!
//! A session moves `Created → Active → (Completed | Cancelled)`. Starting a
//! session persists it first (a persistence failure aborts creation, leaving
//! no local state), then spawns the elapsed-time ticker and, when pose
//! coaching is enabled, accepts one capture loop.
//!
//! All mutation funnels through one `Arc<RwLock<SessionState>>`: the ticker
//! advances elapsed seconds, the classifier path increments reps and pushes
//! feedback, and manual counting uses the same rep path. Once a terminal
//! phase is set every further mutation, including a late inference result,
//! is a no-op. Teardown (stop signal to ticker and capture loop) is
//! idempotent and runs on every exit path, including drop of the last
//! coordinator handle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::capture::{CaptureDevice, FrameLoop, PoseProvider};
use crate::classifiers::{Classifier, ExerciseKind, Observation};
use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ExerciseDefinition, PoseEstimate, SessionPhase, SessionResults, SessionSnapshot, SessionState,
};
use crate::store::SessionStore;

/// Stars awarded for finishing a session
pub const STARS_PER_SESSION: u32 = 3;

/// Parameters for starting a new session
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// User running the session
    pub user_id: Uuid,
    /// Exercise to perform
    pub exercise: ExerciseDefinition,
    /// Repetition goal; must be positive
    pub target_reps: u32,
    /// Whether to drive rep counting from the pose pipeline
    pub use_pose_coach: bool,
}

struct Inner {
    state: RwLock<SessionState>,
    definition: ExerciseDefinition,
    store: Arc<dyn SessionStore>,
    config: EngineConfig,
    stop: watch::Sender<bool>,
    pose_tx: watch::Sender<Option<PoseEstimate>>,
    capture_attached: AtomicBool,
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Last handle gone: make sure ticker and capture loop wind down
        let _ = self.stop.send(true);
    }
}

/// Handle to one running session. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<Inner>,
}

impl SessionCoordinator {
    /// Start a new session: persist it, then go `Active` and start the ticker.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for a zero rep target and propagates
    /// persistence failures, in which case no local session state is created.
    pub async fn start(
        store: Arc<dyn SessionStore>,
        config: EngineConfig,
        request: SessionRequest,
    ) -> AppResult<Self> {
        if request.target_reps == 0 {
            return Err(AppError::invalid_input("target_reps must be positive"));
        }

        let session_id = store
            .start_session(
                request.user_id,
                &request.exercise.id,
                request.target_reps,
                request.use_pose_coach,
            )
            .await?;

        let state = SessionState {
            session_id,
            user_id: request.user_id,
            exercise_id: request.exercise.id.clone(),
            target_reps: request.target_reps,
            completed_reps: 0,
            elapsed_seconds: 0,
            feedback_log: VecDeque::with_capacity(config.feedback_capacity),
            using_pose_coach: request.use_pose_coach,
            phase: SessionPhase::Created,
            results: None,
            unsynced: false,
        };

        let (stop_tx, _) = watch::channel(false);
        let (pose_tx, _) = watch::channel(None);
        let coordinator = Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                definition: request.exercise,
                store,
                config,
                stop: stop_tx,
                pose_tx,
                capture_attached: AtomicBool::new(false),
            }),
        };

        coordinator.inner.state.write().await.phase = SessionPhase::Active;
        coordinator.spawn_ticker();
        info!(
            session_id = %session_id,
            exercise = %coordinator.inner.definition.id,
            target = request.target_reps,
            "session active"
        );
        Ok(coordinator)
    }

    /// Attach the capture pipeline: spawns the frame loop for this session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidState` if pose coaching is disabled or a
    /// capture loop is already running; a session never owns more than one.
    pub async fn attach_capture(
        &self,
        device: Box<dyn CaptureDevice>,
        provider: Box<dyn PoseProvider>,
    ) -> AppResult<()> {
        {
            let state = self.inner.state.read().await;
            if state.phase.is_terminal() {
                return Err(AppError::invalid_state("session already terminal"));
            }
            if !state.using_pose_coach {
                return Err(AppError::invalid_state(
                    "pose coaching disabled for this session",
                ));
            }
        }
        if self.inner.capture_attached.swap(true, Ordering::SeqCst) {
            return Err(AppError::invalid_state("capture loop already running"));
        }

        let kind = ExerciseKind::from_exercise_id(&self.inner.definition.id);
        let classifier = Classifier::new(kind, self.inner.config.clone());
        let frame_loop = FrameLoop::new(
            device,
            provider,
            self.clone(),
            classifier,
            self.inner.config.clone(),
            self.inner.stop.subscribe(),
        );
        tokio::spawn(frame_loop.run());
        debug!(kind = ?kind, "capture pipeline attached");
        Ok(())
    }

    /// Latest pose estimate published by the capture loop, for overlay rendering
    #[must_use]
    pub fn subscribe_pose(&self) -> watch::Receiver<Option<PoseEstimate>> {
        self.inner.pose_tx.subscribe()
    }

    /// Read-only snapshot for UI layers
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.read().await.snapshot()
    }

    /// Manually count one rep (manual mode `+` button).
    ///
    /// No-op once the target is reached or the session is terminal; reaching
    /// the target through this path auto-completes exactly like pose mode.
    pub async fn increment(&self) {
        self.apply_observation(Observation {
            rep_completed: true,
            feedback: Vec::new(),
        })
        .await;
    }

    /// Manually uncount one rep (manual mode `-` button). No-op at zero or
    /// once terminal.
    pub async fn decrement(&self) {
        let mut state = self.inner.state.write().await;
        if state.phase.is_terminal() || state.completed_reps == 0 {
            return;
        }
        state.completed_reps -= 1;
    }

    /// Push a feedback entry (bounded; oldest entries are discarded)
    pub async fn push_feedback(&self, message: impl Into<String>) {
        let mut state = self.inner.state.write().await;
        if state.phase.is_terminal() {
            return;
        }
        push_bounded(
            &mut state.feedback_log,
            message.into(),
            self.inner.config.feedback_capacity,
        );
    }

    /// Apply one classifier observation: feedback, rep count, auto-completion.
    ///
    /// Late observations arriving after a terminal phase are discarded.
    pub(crate) async fn apply_observation(&self, observation: Observation) {
        let target_reached = {
            let mut state = self.inner.state.write().await;
            if state.phase.is_terminal() {
                return;
            }
            for entry in observation.feedback {
                push_bounded(
                    &mut state.feedback_log,
                    entry,
                    self.inner.config.feedback_capacity,
                );
            }
            if observation.rep_completed && state.completed_reps < state.target_reps {
                state.completed_reps += 1;
                debug!(
                    completed = state.completed_reps,
                    target = state.target_reps,
                    "rep counted"
                );
            }
            state.completed_reps >= state.target_reps
        };

        if target_reached {
            // complete() re-checks terminal under the write lock, so racing
            // callers collapse to exactly one completion.
            let _ = self.complete().await;
        }
    }

    /// Disable pose coaching and continue in manual mode, surfacing one notice.
    pub(crate) async fn fall_back_to_manual(&self, notice: &str) {
        let mut state = self.inner.state.write().await;
        if state.phase.is_terminal() || !state.using_pose_coach {
            return;
        }
        state.using_pose_coach = false;
        push_bounded(
            &mut state.feedback_log,
            notice.to_owned(),
            self.inner.config.feedback_capacity,
        );
        drop(state);
        warn!("pose coaching disabled: {notice}");
    }

    /// Complete the session (explicit user action or automatic on target).
    ///
    /// Stops the ticker and capture loop, submits the final tally, and
    /// returns the results. A persistence failure does not fail the session:
    /// the tally is computed locally and flagged unsynced.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidState` when called on a cancelled session.
    pub async fn complete(&self) -> AppResult<SessionResults> {
        let (session_id, completed_reps, elapsed_seconds, form_accuracy) = {
            let mut state = self.inner.state.write().await;
            match state.phase {
                SessionPhase::Completed => {
                    // Second completion attempt: hand back the existing tally
                    return state
                        .results
                        .clone()
                        .ok_or_else(|| AppError::invalid_state("completion already in flight"));
                }
                SessionPhase::Cancelled => {
                    return Err(AppError::invalid_state("session was cancelled"));
                }
                SessionPhase::Created | SessionPhase::Active => {}
            }
            state.phase = SessionPhase::Completed;
            state.completed_reps = state.completed_reps.min(state.target_reps);
            let form_accuracy = state
                .using_pose_coach
                .then_some(self.inner.config.coached_form_accuracy);
            (
                state.session_id,
                state.completed_reps,
                state.elapsed_seconds,
                form_accuracy,
            )
        };

        self.teardown();

        let results = match self
            .inner
            .store
            .complete_session(session_id, completed_reps, elapsed_seconds, form_accuracy)
            .await
        {
            Ok(results) => results,
            Err(err) => {
                warn!(session_id = %session_id, "failed to persist session result: {err}");
                let mut state = self.inner.state.write().await;
                state.unsynced = true;
                // Local tally so the user still sees their outcome
                SessionResults {
                    completed_reps,
                    duration_seconds: elapsed_seconds,
                    calories_burned: f64::from(completed_reps)
                        * self.inner.definition.calories_per_rep,
                    stars_awarded: 0,
                    form_accuracy,
                    synced: false,
                }
            }
        };

        self.inner.state.write().await.results = Some(results.clone());
        info!(
            session_id = %session_id,
            reps = completed_reps,
            seconds = elapsed_seconds,
            synced = results.synced,
            "session completed"
        );
        Ok(results)
    }

    /// Abort the session: same teardown as completion, but nothing persists.
    /// Idempotent; calling it on a terminal session is a no-op.
    pub async fn cancel(&self) {
        {
            let mut state = self.inner.state.write().await;
            if state.phase.is_terminal() {
                return;
            }
            state.phase = SessionPhase::Cancelled;
        }
        self.teardown();
        info!("session cancelled");
    }

    /// Publish the latest pose estimate for overlay consumers
    pub(crate) fn publish_pose(&self, pose: PoseEstimate) {
        let _ = self.inner.pose_tx.send(Some(pose));
    }

    /// Signal ticker and capture loop to stop. Safe to call repeatedly.
    fn teardown(&self) {
        let _ = self.inner.stop.send(true);
        debug!("session teardown signalled");
    }

    /// 1 Hz elapsed-time ticker; runs until teardown or a terminal phase
    fn spawn_ticker(&self) {
        let inner = Arc::clone(&self.inner);
        let mut stop_rx = self.inner.stop.subscribe();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
            // The first tick of a tokio interval fires immediately
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let mut state = inner.state.write().await;
                        if state.phase.is_terminal() {
                            break;
                        }
                        state.elapsed_seconds += 1;
                    }
                    _ = stop_rx.changed() => break,
                }
            }
            debug!("ticker stopped");
        });
    }
}

/// Append to a bounded log, discarding the oldest entry when full
fn push_bounded(log: &mut VecDeque<String>, entry: String, capacity: usize) {
    if log.len() == capacity {
        log.pop_front();
    }
    log.push_back(entry);
}
