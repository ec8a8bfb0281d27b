// ABOUTME: Criterion benchmarks for the classifier and geometry hot path
// ABOUTME: One classifier observation runs per accepted frame, so this path bounds frame throughput
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 RepCoach Contributors

#![allow(missing_docs)]

use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use repcoach::classifiers::{Classifier, ExerciseKind};
use repcoach::config::EngineConfig;
use repcoach::geometry::angle_deg;
use repcoach::sim::PoseBuilder;

fn bench_angle(c: &mut Criterion) {
    c.bench_function("geometry/angle_deg", |b| {
        b.iter(|| {
            angle_deg(
                black_box((0.42, 0.25)),
                black_box((0.40, 0.40)),
                black_box((0.39, 0.55)),
            )
        });
    });
}

fn bench_pushup_observation(c: &mut Criterion) {
    let poses: Vec<_> = [170.0, 95.0, 80.0, 170.0]
        .into_iter()
        .map(|deg| PoseBuilder::standing().elbow_angle(deg).build())
        .collect();

    c.bench_function("classifier/pushup_excursion", |b| {
        b.iter(|| {
            let mut classifier = Classifier::new(ExerciseKind::PushUp, EngineConfig::default());
            let now = Instant::now();
            let mut reps = 0;
            for pose in &poses {
                if classifier.observe(black_box(pose), now).rep_completed {
                    reps += 1;
                }
            }
            reps
        });
    });
}

fn bench_generic_observation(c: &mut Criterion) {
    let pose = PoseBuilder::standing().build();

    c.bench_function("classifier/generic_centroid", |b| {
        let mut classifier = Classifier::new(ExerciseKind::Generic, EngineConfig::default());
        let now = Instant::now();
        b.iter(|| classifier.observe(black_box(&pose), now));
    });
}

criterion_group!(
    benches,
    bench_angle,
    bench_pushup_observation,
    bench_generic_observation
);
criterion_main!(benches);
