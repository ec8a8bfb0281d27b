// ABOUTME: Engine configuration with environment-variable overrides and tuned defaults
// ABOUTME: Carries the throttle factor, visibility threshold, classifier angle thresholds, and debounce windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! # Engine Configuration
//!
//! Configuration is environment-driven with sensible defaults; there is no
//! config file. Every numeric knob of the engine lives here so deployments
//! can retune angle thresholds and debounce windows without code changes.
//!
//! Environment variables use the `REPCOACH_` prefix, e.g.
//! `REPCOACH_THROTTLE_FACTOR=3`.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Throttle factor K: only every K-th captured frame is submitted to inference.
    /// This is a hard backpressure mechanism, not an optimization.
    pub throttle_factor: u64,
    /// Minimum landmark visibility confidence for a classifier to act on a frame
    pub visibility_threshold: f64,
    /// Consecutive transient inference failures tolerated before the capture
    /// loop is stopped and the session falls back to manual counting
    pub max_consecutive_failures: u32,
    /// Maximum retained feedback entries; older entries are discarded
    pub feedback_capacity: usize,
    /// High-knee cool-down: a raised knee cannot count again inside this window
    pub high_knee_cooldown: Duration,
    /// Generic-movement debounce: a displacement-armed count fires only after
    /// this window, so transient jitter never counts
    pub generic_debounce: Duration,
    /// Form accuracy reported for sessions completed with pose coaching active
    pub coached_form_accuracy: f64,
    /// Per-exercise angle and distance thresholds
    pub thresholds: ClassifierThresholds,
}

/// Angle and distance thresholds used by the exercise classifiers.
///
/// Angles are in degrees; distances are in normalized frame coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    /// Push-up: entering the down phase requires avg elbow angle below this
    pub pushup_down_deg: f64,
    /// Push-up: returning above this counts the rep
    pub pushup_up_deg: f64,
    /// Push-up: depth below this earns bonus feedback
    pub pushup_perfect_deg: f64,
    /// Push-up: shoulder-hip-knee angle below this flags a sagging back
    pub torso_straight_deg: f64,
    /// Squat and lunge: entering the down phase requires knee angle below this
    pub squat_down_deg: f64,
    /// Squat and lunge: returning above this counts the rep
    pub squat_up_deg: f64,
    /// Squat: depth below this earns bonus feedback
    pub squat_perfect_deg: f64,
    /// Squat: knee x-position beyond ankle by more than this flags form
    pub knee_over_toes_margin: f64,
    /// Jumping-jack: ankle separation above this counts as legs apart
    pub jack_leg_separation: f64,
    /// Generic fallback: vertical centroid displacement above this arms a count
    pub generic_displacement: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            pushup_down_deg: 100.0,
            pushup_up_deg: 160.0,
            pushup_perfect_deg: 90.0,
            torso_straight_deg: 160.0,
            squat_down_deg: 110.0,
            squat_up_deg: 160.0,
            squat_perfect_deg: 90.0,
            knee_over_toes_margin: 0.05,
            jack_leg_separation: 0.2,
            generic_displacement: 0.05,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            throttle_factor: 5,
            visibility_threshold: 0.5,
            max_consecutive_failures: 3,
            feedback_capacity: 8,
            high_knee_cooldown: Duration::from_millis(500),
            generic_debounce: Duration::from_millis(1000),
            coached_form_accuracy: 85.0,
            thresholds: ClassifierThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Malformed values are logged and ignored rather than failing startup.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = parse_env::<u64>("REPCOACH_THROTTLE_FACTOR") {
            // A zero factor would divide by zero in the modulo check
            config.throttle_factor = v.max(1);
        }
        if let Some(v) = parse_env::<f64>("REPCOACH_VISIBILITY_THRESHOLD") {
            config.visibility_threshold = v.clamp(0.0, 1.0);
        }
        if let Some(v) = parse_env::<u32>("REPCOACH_MAX_CONSECUTIVE_FAILURES") {
            config.max_consecutive_failures = v.max(1);
        }
        if let Some(v) = parse_env::<usize>("REPCOACH_FEEDBACK_CAPACITY") {
            config.feedback_capacity = v.max(1);
        }
        if let Some(v) = parse_env::<u64>("REPCOACH_HIGH_KNEE_COOLDOWN_MS") {
            config.high_knee_cooldown = Duration::from_millis(v);
        }
        if let Some(v) = parse_env::<u64>("REPCOACH_GENERIC_DEBOUNCE_MS") {
            config.generic_debounce = Duration::from_millis(v);
        }
        if let Some(v) = parse_env::<f64>("REPCOACH_COACHED_FORM_ACCURACY") {
            config.coached_form_accuracy = v.clamp(0.0, 100.0);
        }
        config
    }
}

/// Parse one environment variable, warning on malformed values
fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring malformed {key}={raw}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let config = EngineConfig::default();
        assert_eq!(config.throttle_factor, 5);
        assert!((config.visibility_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.high_knee_cooldown, Duration::from_millis(500));
        assert_eq!(config.generic_debounce, Duration::from_millis(1000));
    }

    #[test]
    fn env_override_clamps_zero_throttle() {
        std::env::set_var("REPCOACH_THROTTLE_FACTOR", "0");
        let config = EngineConfig::from_env();
        assert_eq!(config.throttle_factor, 1);
        std::env::remove_var("REPCOACH_THROTTLE_FACTOR");
    }
}
