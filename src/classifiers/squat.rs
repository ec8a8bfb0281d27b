// ABOUTME: Squat phase detector over averaged knee angles with knee-over-toes form check
// ABOUTME: Down under 110 degrees, rep counted on return above 160, bonus feedback under 90
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

use super::{ClassifierState, Observation, Phase};
use crate::config::ClassifierThresholds;
use crate::geometry::angle_deg;
use crate::models::landmark::{
    LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE,
};
use crate::models::PoseEstimate;

const REQUIRED: [usize; 6] = [
    LEFT_HIP, RIGHT_HIP, LEFT_KNEE, RIGHT_KNEE, LEFT_ANKLE, RIGHT_ANKLE,
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
    let left_knee = angle_deg(point(LEFT_HIP), point(LEFT_KNEE), point(LEFT_ANKLE));
    let right_knee = angle_deg(point(RIGHT_HIP), point(RIGHT_KNEE), point(RIGHT_ANKLE));
    let avg_knee = (left_knee + right_knee) / 2.0;

    // Side-view check: knee drifting forward of the ankle loads the joint
    let knee_past_toes =
        point(LEFT_KNEE).0 > point(LEFT_ANKLE).0 + thresholds.knee_over_toes_margin;

    let mut obs = Observation::default();

    if avg_knee < thresholds.squat_down_deg && !state.in_progress {
        state.in_progress = true;
        state.phase = Phase::Contracted;
        state.last_stable_phase = Phase::Contracted;

        if avg_knee < thresholds.squat_perfect_deg {
            obs.feedback.push("Perfect squat depth!".to_owned());
        } else {
            obs.feedback.push("Good depth! Keep going".to_owned());
        }
        if knee_past_toes {
            obs.feedback.push("Keep knees behind toes".to_owned());
        }
    } else if avg_knee > thresholds.squat_up_deg && state.last_stable_phase == Phase::Contracted {
        state.in_progress = false;
        state.phase = Phase::Extended;
        state.last_stable_phase = Phase::Extended;
        obs.rep_completed = true;
        obs.feedback.push("Excellent!".to_owned());
    } else if avg_knee > 120.0 && avg_knee < thresholds.squat_up_deg && !state.in_progress {
        if knee_past_toes {
            obs.feedback.push("Sit back more".to_owned());
        } else {
            obs.feedback.push("Ready for next squat".to_owned());
        }
    }

    obs
}
