// ABOUTME: Unified error handling for the coaching engine with a fixed failure taxonomy
// ABOUTME: Splits inference failures into transient (skip frame) and critical (stop loop) classes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Error Handling
//!
//! Every fallible operation in the engine returns [`AppResult`]. The variants
//! mirror how callers must react: permission and availability failures force
//! a fallback to manual counting, transient inference failures skip a frame,
//! critical inference failures terminate the capture loop, and persistence
//! failures either abort session creation (on start) or leave the session
//! locally completed but unsynced (on complete).

use thiserror::Error;

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Application error with a fixed taxonomy
#[derive(Debug, Error)]
pub enum AppError {
    /// The capture device refused access (e.g. camera permission denied)
    #[error("capture permission denied: {0}")]
    PermissionDenied(String),

    /// The pose-estimation provider is missing or failed to initialize
    #[error("pose provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A single inference call failed; the frame is skipped and the loop continues
    #[error("transient inference failure: {0}")]
    InferenceTransient(String),

    /// A resource-pattern inference failure; the capture loop must stop
    #[error("critical inference failure: {0}")]
    InferenceCritical(String),

    /// The session persistence collaborator failed
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// The caller supplied an invalid argument
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is not valid in the session's current state
    #[error("invalid session state: {0}")]
    InvalidState(String),
}

impl AppError {
    /// Create a permission-denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a provider-unavailable error
    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a transient inference error
    pub fn inference_transient(msg: impl Into<String>) -> Self {
        Self::InferenceTransient(msg.into())
    }

    /// Create a critical inference error
    pub fn inference_critical(msg: impl Into<String>) -> Self {
        Self::InferenceCritical(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceFailure(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid-state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Whether this error must terminate the capture loop rather than skip a frame
    #[must_use]
    pub const fn is_critical_inference(&self) -> bool {
        matches!(
            self,
            Self::InferenceCritical(_) | Self::ProviderUnavailable(_) | Self::PermissionDenied(_)
        )
    }
}
