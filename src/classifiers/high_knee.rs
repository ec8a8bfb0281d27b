// ABOUTME: High-knee edge detector: counts when either knee rises above its hip
// ABOUTME: A cool-down window re-arms the detector so a held knee cannot count repeatedly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

use std::time::{Duration, Instant};

use super::{ClassifierState, Observation, Phase};
use crate::models::landmark::{LEFT_HIP, LEFT_KNEE, RIGHT_HIP, RIGHT_KNEE};
use crate::models::PoseEstimate;

const REQUIRED: [usize; 4] = [LEFT_HIP, RIGHT_HIP, LEFT_KNEE, RIGHT_KNEE];

pub(super) fn observe(
    pose: &PoseEstimate,
    state: &mut ClassifierState,
    visibility: f64,
    cooldown: Duration,
    now: Instant,
) -> Observation {
    if !pose.all_visible(&REQUIRED, visibility) {
        return Observation::none();
    }

    // Cool-down elapsed: re-arm so the next raise counts again
    if state.raised_until.is_some_and(|t| now >= t) {
        state.raised_until = None;
        state.phase = Phase::Lowered;
        state.last_stable_phase = Phase::Lowered;
    }

    let point = |i: usize| pose.landmarks()[i].pos();
    let left_raised = point(LEFT_KNEE).1 < point(LEFT_HIP).1;
    let right_raised = point(RIGHT_KNEE).1 < point(RIGHT_HIP).1;

    let mut obs = Observation::default();

    if (left_raised || right_raised) && state.last_stable_phase != Phase::Raised {
        state.phase = Phase::Raised;
        state.last_stable_phase = Phase::Raised;
        state.raised_until = Some(now + cooldown);
        obs.rep_completed = true;
        obs.feedback.push("Knees up!".to_owned());
    }

    obs
}
