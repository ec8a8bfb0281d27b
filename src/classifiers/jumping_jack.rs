// ABOUTME: Jumping-jack detector: open is wrists above the head AND ankles apart
// ABOUTME: The rep counts on the open-to-closed transition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

use super::{ClassifierState, Observation, Phase};
use crate::config::ClassifierThresholds;
use crate::geometry::planar_distance;
use crate::models::landmark::{LEFT_ANKLE, LEFT_WRIST, NOSE, RIGHT_ANKLE, RIGHT_WRIST};
use crate::models::PoseEstimate;

const REQUIRED: [usize; 5] = [NOSE, LEFT_WRIST, RIGHT_WRIST, LEFT_ANKLE, RIGHT_ANKLE];

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
    // y grows downward, so "above" means a smaller y
    let arms_up = point(LEFT_WRIST).1 < point(NOSE).1 && point(RIGHT_WRIST).1 < point(NOSE).1;
    let leg_spread = planar_distance(
        (point(LEFT_ANKLE).0, 0.0),
        (point(RIGHT_ANKLE).0, 0.0),
    );
    let legs_apart = leg_spread > thresholds.jack_leg_separation;

    let mut obs = Observation::default();

    if arms_up && legs_apart && !state.in_progress {
        state.in_progress = true;
        state.phase = Phase::Extended;
        state.last_stable_phase = Phase::Extended;
    } else if !arms_up && !legs_apart && state.last_stable_phase == Phase::Extended {
        state.in_progress = false;
        state.phase = Phase::Neutral;
        state.last_stable_phase = Phase::Neutral;
        obs.rep_completed = true;
        obs.feedback.push("Nice jack!".to_owned());
    }

    obs
}
