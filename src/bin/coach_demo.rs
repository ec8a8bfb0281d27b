// ABOUTME: End-to-end demo: runs a scripted coaching session against the full engine
// ABOUTME: Drives capture, throttled inference, classification, overlay, and persistence without hardware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! Scripted demo session.
//!
//! ```text
//! coach-demo --exercise push-ups --target 5
//! coach-demo --exercise squats --target 10 --manual
//! ```

#![allow(clippy::print_stdout)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use tokio::time::sleep;

use repcoach::catalog::Catalog;
use repcoach::config::EngineConfig;
use repcoach::logging;
use repcoach::overlay::render_overlay;
use repcoach::session::{SessionCoordinator, SessionRequest};
use repcoach::sim::{PoseBuilder, ScriptStep, ScriptedCaptureDevice, ScriptedPoseProvider};
use repcoach::store::{MemoryStore, SessionStore};
use uuid::Uuid;

/// Run a simulated coaching session against the engine
#[derive(Parser, Debug)]
#[command(name = "coach-demo", about = "Scripted exercise coaching session")]
struct Args {
    /// Exercise id from the built-in catalog
    #[arg(long, default_value = "push-ups")]
    exercise: String,

    /// Repetition target
    #[arg(long, default_value_t = 5)]
    target: u32,

    /// Count reps manually instead of via the pose pipeline
    #[arg(long)]
    manual: bool,

    /// Milliseconds between synthetic camera frames
    #[arg(long, default_value_t = 20)]
    frame_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let config = EngineConfig::from_env();

    let catalog = Catalog::builtin();
    let exercise = catalog
        .get(&args.exercise)
        .with_context(|| format!("unknown exercise '{}'", args.exercise))?
        .clone();
    let store = Arc::new(MemoryStore::new(catalog));
    let user_id = Uuid::new_v4();

    println!(
        "Starting {} x{} ({} mode)",
        exercise.name,
        args.target,
        if args.manual { "manual" } else { "pose coach" }
    );

    let session = SessionCoordinator::start(
        Arc::clone(&store) as Arc<dyn SessionStore>,
        config.clone(),
        SessionRequest {
            user_id,
            exercise: exercise.clone(),
            target_reps: args.target,
            use_pose_coach: !args.manual,
        },
    )
    .await?;

    // Ctrl-C aborts the session with full teardown instead of killing the process
    {
        let session = session.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                session.cancel().await;
            }
        });
    }

    if args.manual {
        for _ in 0..args.target {
            sleep(Duration::from_millis(300)).await;
            session.increment().await;
            let snapshot = session.snapshot().await;
            println!(
                "  [{}] reps {}/{}",
                repcoach::overlay::format_elapsed(snapshot.elapsed_seconds),
                snapshot.completed_reps,
                snapshot.target_reps
            );
        }
    } else {
        let device = ScriptedCaptureDevice::new(Duration::from_millis(args.frame_ms));
        let provider = ScriptedPoseProvider::new(rep_script(&exercise.id, args.target));
        session
            .attach_capture(Box::new(device), Box::new(provider))
            .await?;

        let mut pose_rx = session.subscribe_pose();
        loop {
            sleep(Duration::from_millis(250)).await;
            let snapshot = session.snapshot().await;
            let pose = pose_rx.borrow_and_update().clone();
            let commands = render_overlay(pose.as_ref(), &snapshot, config.visibility_threshold);
            println!(
                "  [{}] reps {}/{}  feedback: {}  ({} overlay commands)",
                repcoach::overlay::format_elapsed(snapshot.elapsed_seconds),
                snapshot.completed_reps,
                snapshot.target_reps,
                snapshot.latest_feedback.as_deref().unwrap_or("-"),
                commands.len()
            );
            if snapshot.phase.is_terminal() {
                break;
            }
        }
    }

    let snapshot = session.snapshot().await;
    let results = match snapshot.results {
        Some(results) => results,
        None => session.complete().await?,
    };
    println!(
        "\nDone: {} reps in {}s, {:.1} kcal, {} stars{}",
        results.completed_reps,
        results.duration_seconds,
        results.calories_burned,
        results.stars_awarded,
        results
            .form_accuracy
            .map_or_else(String::new, |a| format!(", form {a:.0}%"))
    );

    let progress = store.get_progress(user_id).await?;
    println!(
        "Progress: {} sessions, {} reps, {:.1} kcal, streak {} day(s)",
        progress.total_sessions, progress.total_reps, progress.total_calories, progress.current_streak
    );
    println!("\nResults payload:\n{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}

/// Pose script performing `reps` excursions appropriate to the exercise,
/// with a little angle jitter so no two frames are identical
fn rep_script(exercise_id: &str, reps: u32) -> Vec<ScriptStep> {
    let mut rng = rand::thread_rng();
    let mut jittered = |base: f64| base + rng.gen_range(-3.0..3.0);
    let mut steps = Vec::new();

    for _ in 0..reps {
        match exercise_id {
            "push-ups" => {
                for base in [170.0, 95.0, 80.0, 170.0] {
                    steps.push(ScriptStep::Pose(
                        PoseBuilder::standing().elbow_angle(jittered(base)).build(),
                    ));
                }
            }
            "squats" | "lunges" => {
                for base in [175.0, 100.0, 85.0, 175.0] {
                    steps.push(ScriptStep::Pose(
                        PoseBuilder::standing().knee_angle(jittered(base)).build(),
                    ));
                }
            }
            "jumping-jacks" => {
                steps.push(ScriptStep::Pose(
                    PoseBuilder::standing()
                        .arms_overhead()
                        .ankle_separation(0.3)
                        .build(),
                ));
                steps.push(ScriptStep::Pose(PoseBuilder::standing().build()));
            }
            "high-knees" => {
                steps.push(ScriptStep::Pose(
                    PoseBuilder::standing().left_knee_raised().build(),
                ));
                // Idle frames so the cool-down elapses before the next raise
                for _ in 0..8 {
                    steps.push(ScriptStep::Pose(PoseBuilder::standing().build()));
                }
            }
            _ => {
                // Generic centroid detector: alternate between two heights
                steps.push(ScriptStep::Pose(PoseBuilder::standing().build()));
                for _ in 0..12 {
                    steps.push(ScriptStep::Pose(
                        PoseBuilder::standing().shifted_vertically(0.08).build(),
                    ));
                }
            }
        }
    }
    steps
}
