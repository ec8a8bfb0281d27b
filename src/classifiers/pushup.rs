// ABOUTME: Push-up phase detector over averaged elbow angles with torso alignment check
// ABOUTME: Down under 100 degrees, rep counted on return above 160, bonus feedback under 90
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

use super::{ClassifierState, Observation, Phase};
use crate::config::ClassifierThresholds;
use crate::geometry::angle_deg;
use crate::models::landmark::{
    LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ELBOW, RIGHT_SHOULDER,
    RIGHT_WRIST,
};
use crate::models::PoseEstimate;

const REQUIRED: [usize; 8] = [
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_ELBOW,
    RIGHT_ELBOW,
    LEFT_WRIST,
    RIGHT_WRIST,
    LEFT_HIP,
    LEFT_KNEE,
];

pub(super) fn observe(
    pose: &PoseEstimate,
    state: &mut ClassifierState,
    thresholds: &ClassifierThresholds,
    visibility: f64,
) -> Observation {
    if !pose.all_visible(&REQUIRED, visibility) {
        return Observation::none();
    }

    let point = |i: usize| pose.landmarks()[i].pos();
    let left_elbow = angle_deg(point(LEFT_SHOULDER), point(LEFT_ELBOW), point(LEFT_WRIST));
    let right_elbow = angle_deg(point(RIGHT_SHOULDER), point(RIGHT_ELBOW), point(RIGHT_WRIST));
    let avg_elbow = (left_elbow + right_elbow) / 2.0;

    // Torso line from the side view: shoulder-hip-knee near 180 means a flat back
    let torso = angle_deg(point(LEFT_SHOULDER), point(LEFT_HIP), point(LEFT_KNEE));

    let mut obs = Observation::default();

    if avg_elbow < thresholds.pushup_down_deg && !state.in_progress {
        state.in_progress = true;
        state.phase = Phase::Contracted;
        state.last_stable_phase = Phase::Contracted;

        if avg_elbow < thresholds.pushup_perfect_deg {
            obs.feedback.push("Perfect depth!".to_owned());
        } else {
            obs.feedback.push("Good! Go a bit lower".to_owned());
        }
        if torso < thresholds.torso_straight_deg {
            obs.feedback.push("Keep your back straight!".to_owned());
        }
    } else if avg_elbow > thresholds.pushup_up_deg && state.last_stable_phase == Phase::Contracted {
        state.in_progress = false;
        state.phase = Phase::Extended;
        state.last_stable_phase = Phase::Extended;
        obs.rep_completed = true;
        obs.feedback.push("Excellent rep!".to_owned());
    } else if avg_elbow > 120.0 && avg_elbow < thresholds.pushup_up_deg && !state.in_progress {
        // Between reps: keep coaching posture while the athlete resets
        if torso < thresholds.torso_straight_deg {
            obs.feedback.push("Keep your back straight!".to_owned());
        } else {
            obs.feedback.push("Ready for next rep".to_owned());
        }
    }

    obs
}
