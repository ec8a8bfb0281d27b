// ABOUTME: Main library entry point for the repcoach exercise coaching engine
// ABOUTME: Real-time pose classification, rep counting, form feedback, and session tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

#![deny(unsafe_code)]

//! # RepCoach
//!
//! A real-time exercise coaching engine. It ingests a stream of body-pose
//! estimates derived from a camera feed, classifies movement phases per
//! exercise kind using joint-angle geometry with hysteresis, counts
//! completed repetitions, emits form feedback, and drives the session
//! lifecycle from start through automatic or manual completion to a
//! persisted result.
//!
//! ## Architecture
//!
//! - **Geometry**: pure joint-angle and distance math over normalized
//!   landmark coordinates
//! - **Classifiers**: one small hysteresis state machine per exercise kind
//! - **Capture**: the frame throttle and inference driver, holding the
//!   single-in-flight invariant and the transient/critical error split
//! - **Session**: the coordinator owning rep count, elapsed time, feedback,
//!   and lifecycle transitions behind one mutation gateway
//! - **Overlay**: pure snapshot-to-drawing-commands rendering
//! - **Store**: the persistence seam, with an in-memory reference
//!   implementation computing calories, stars, progress, and streaks
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use repcoach::catalog::Catalog;
//! use repcoach::config::EngineConfig;
//! use repcoach::errors::AppResult;
//! use repcoach::session::{SessionCoordinator, SessionRequest};
//! use repcoach::store::MemoryStore;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let catalog = Catalog::builtin();
//!     let exercise = catalog.get("push-ups")?.clone();
//!     let store = Arc::new(MemoryStore::new(catalog));
//!
//!     let session = SessionCoordinator::start(
//!         store,
//!         EngineConfig::from_env(),
//!         SessionRequest {
//!             user_id: Uuid::new_v4(),
//!             exercise,
//!             target_reps: 10,
//!             use_pose_coach: false,
//!         },
//!     )
//!     .await?;
//!
//!     session.increment().await;
//!     let results = session.complete().await?;
//!     println!("burned {} calories", results.calories_burned);
//!     Ok(())
//! }
//! ```

/// Built-in exercise catalog and lookup
pub mod catalog;

/// Capture device and pose provider traits plus the throttled frame loop
pub mod capture;

/// Per-exercise phase classifiers with hysteresis rep counting
pub mod classifiers;

/// Engine configuration with environment overrides
pub mod config;

/// Unified error handling with the engine's failure taxonomy
pub mod errors;

/// Joint angle and distance geometry
pub mod geometry;

/// Structured logging initialization
pub mod logging;

/// Common data models: poses, exercises, session state and results
pub mod models;

/// Overlay rendering to presentation-agnostic drawing commands
pub mod overlay;

/// Session coordinator and lifecycle state machine
pub mod session;

/// Synthetic poses and scripted collaborators for demos and tests
pub mod sim;

/// Session persistence trait and in-memory reference store
pub mod store;
