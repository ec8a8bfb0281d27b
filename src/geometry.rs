// ABOUTME: Joint angle and distance math over normalized pose coordinates
// ABOUTME: Pure functions, NaN-safe on degenerate input, no side effects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

//! Joint geometry over normalized landmark coordinates.
//!
//! Angles use the dot-product formula `cos(θ) = (v1 · v2) / (|v1| × |v2|)`
//! with the cosine clamped into `[-1, 1]` so accumulated floating point error
//! can never produce NaN out of `acos`.

/// Minimum vector magnitude before a joint is considered degenerate
const DEGENERATE_EPSILON: f64 = 1e-6;

/// Unsigned angle at vertex `b` formed by rays `b→a` and `b→c`, in degrees.
///
/// Result is in `[0, 180]` and symmetric under swapping `a` and `c`.
/// Coincident points yield 0 rather than NaN.
#[must_use]
pub fn angle_deg(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let v1 = (a.0 - b.0, a.1 - b.1);
    let v2 = (c.0 - b.0, c.1 - b.1);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);
    if mag1 < DEGENERATE_EPSILON || mag2 < DEGENERATE_EPSILON {
        return 0.0;
    }

    let dot = v1.0.mul_add(v2.0, v1.1 * v2.1);
    let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Euclidean distance between two points in normalized coordinate space
#[must_use]
pub fn planar_distance(p: (f64, f64), q: (f64, f64)) -> f64 {
    (p.0 - q.0).hypot(p.1 - q.1)
}
