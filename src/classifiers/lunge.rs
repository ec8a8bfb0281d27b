// ABOUTME: Lunge phase detector over the minimum of the two knee angles
// ABOUTME: Shares the squat down/up thresholds; no form-angle check
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
    // Only the front leg bends deeply, so track the smaller angle
    let min_knee = left_knee.min(right_knee);

    let mut obs = Observation::default();

    if min_knee < thresholds.squat_down_deg && !state.in_progress {
        state.in_progress = true;
        state.phase = Phase::Contracted;
        state.last_stable_phase = Phase::Contracted;
    } else if min_knee > thresholds.squat_up_deg && state.last_stable_phase == Phase::Contracted {
        state.in_progress = false;
        state.phase = Phase::Extended;
        state.last_stable_phase = Phase::Extended;
        obs.rep_completed = true;
        obs.feedback.push("Strong lunge!".to_owned());
    }

    obs
}
