// ABOUTME: Fallback detector for uninstrumented exercises: vertical centroid displacement
// ABOUTME: Arms a debounced count that fires after the debounce window, filtering transient jitter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

use std::time::{Duration, Instant};

use super::{ClassifierState, Observation, Phase};
use crate::config::ClassifierThresholds;
use crate::models::PoseEstimate;

pub(super) fn observe(
    pose: &PoseEstimate,
    state: &mut ClassifierState,
    thresholds: &ClassifierThresholds,
    visibility: f64,
    debounce: Duration,
    now: Instant,
) -> Observation {
    let Some(centroid) = pose.visible_centroid(visibility) else {
        return Observation::none();
    };

    let mut obs = Observation::default();

    // A previously armed count fires once its debounce window has elapsed
    if state.pending_count_at.is_some_and(|t| now >= t) {
        state.pending_count_at = None;
        state.in_progress = false;
        state.phase = Phase::Neutral;
        state.last_stable_phase = Phase::Neutral;
        obs.rep_completed = true;
        obs.feedback.push("Keep moving!".to_owned());
    }

    if let Some(last) = state.last_centroid {
        let displacement = (centroid.1 - last.1).abs();
        if displacement > thresholds.generic_displacement && !state.in_progress {
            state.in_progress = true;
            state.phase = Phase::Contracted;
            state.pending_count_at = Some(now + debounce);
        }
    }

    state.last_centroid = Some(centroid);
    obs
}
