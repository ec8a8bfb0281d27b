// ABOUTME: Overlay renderer: pure function from pose + session snapshot to drawing commands
// ABOUTME: Skeleton segments are emitted only where both endpoints meet the visibility threshold
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Overlay Renderer
//!
//! Rendering is presentation-agnostic: the engine emits an ordered list of
//! [`DrawCommand`]s and the host paints them however it likes (canvas, GPU,
//! terminal). Nothing here mutates session state, and in manual mode the
//! overlay can be skipped entirely.

use serde::{Deserialize, Serialize};

use crate::models::landmark::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_FOOT, LEFT_HEEL, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST,
    RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_FOOT, RIGHT_HEEL, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER,
    RIGHT_WRIST,
};
use crate::models::{PoseEstimate, SessionSnapshot};

/// Skeleton connections drawn between landmark pairs
pub const SKELETON_CONNECTIONS: [(usize, usize); 16] = [
    // Arms
    (LEFT_SHOULDER, RIGHT_SHOULDER),
    (LEFT_SHOULDER, LEFT_ELBOW),
    (LEFT_ELBOW, LEFT_WRIST),
    (RIGHT_SHOULDER, RIGHT_ELBOW),
    (RIGHT_ELBOW, RIGHT_WRIST),
    // Torso
    (LEFT_SHOULDER, LEFT_HIP),
    (RIGHT_SHOULDER, RIGHT_HIP),
    (LEFT_HIP, RIGHT_HIP),
    // Legs
    (LEFT_HIP, LEFT_KNEE),
    (RIGHT_HIP, RIGHT_KNEE),
    (LEFT_KNEE, LEFT_ANKLE),
    (RIGHT_KNEE, RIGHT_ANKLE),
    // Feet
    (LEFT_ANKLE, LEFT_HEEL),
    (LEFT_ANKLE, LEFT_FOOT),
    (RIGHT_ANKLE, RIGHT_HEEL),
    (RIGHT_ANKLE, RIGHT_FOOT),
];

/// Landmarks drawn as joint markers
pub const KEY_LANDMARKS: [usize; 12] = [
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_ELBOW,
    RIGHT_ELBOW,
    LEFT_WRIST,
    RIGHT_WRIST,
    LEFT_HIP,
    RIGHT_HIP,
    LEFT_KNEE,
    RIGHT_KNEE,
    LEFT_ANKLE,
    RIGHT_ANKLE,
];

/// One drawing instruction, in normalized coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Skeleton bone between two visible landmarks
    Segment {
        /// Start point
        from: (f64, f64),
        /// End point
        to: (f64, f64),
    },
    /// Dot at one visible landmark
    Marker {
        /// Landmark position
        at: (f64, f64),
    },
    /// Rep-progress indicator
    RepProgress {
        /// Completed reps
        completed: u32,
        /// Target reps
        target: u32,
    },
    /// Elapsed-time readout, preformatted as `m:ss`
    ElapsedTime {
        /// Display text
        text: String,
    },
    /// Most recent form feedback
    Feedback {
        /// Display text
        text: String,
    },
}

/// Build the overlay drawing list for one frame.
///
/// With no pose estimate (manual mode, or before the first inference) only
/// the HUD commands are emitted.
#[must_use]
pub fn render_overlay(
    pose: Option<&PoseEstimate>,
    snapshot: &SessionSnapshot,
    visibility_threshold: f64,
) -> Vec<DrawCommand> {
    let mut commands = Vec::new();

    if let Some(pose) = pose {
        for &(a, b) in &SKELETON_CONNECTIONS {
            let (Some(start), Some(end)) = (pose.get(a), pose.get(b)) else {
                continue;
            };
            if start.visibility > visibility_threshold && end.visibility > visibility_threshold {
                commands.push(DrawCommand::Segment {
                    from: start.pos(),
                    to: end.pos(),
                });
            }
        }
        for &joint in &KEY_LANDMARKS {
            if let Some(point) = pose.get(joint) {
                if point.visibility > visibility_threshold {
                    commands.push(DrawCommand::Marker { at: point.pos() });
                }
            }
        }
    }

    commands.push(DrawCommand::RepProgress {
        completed: snapshot.completed_reps,
        target: snapshot.target_reps,
    });
    commands.push(DrawCommand::ElapsedTime {
        text: format_elapsed(snapshot.elapsed_seconds),
    });
    if let Some(feedback) = &snapshot.latest_feedback {
        commands.push(DrawCommand::Feedback {
            text: feedback.clone(),
        });
    }

    commands
}

/// Format seconds as `m:ss`
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formatting_pads_seconds() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(9), "0:09");
        assert_eq!(format_elapsed(65), "1:05");
        assert_eq!(format_elapsed(600), "10:00");
    }
}
