// ABOUTME: Criterion benchmarks for the per-frame form analysis pipeline
// ABOUTME: Measures angle extraction, camera view checks, and full frame processing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the frame pipeline.
//!
//! A frame must be analysed well inside one camera frame interval, so these
//! track the cost of each stage over synthetic squat streams.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

mod common;

use common::fixtures::{squat_frame, squat_stream, RepBatchSize};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pierre_core::constants::confidence::DEFAULT_MIN_VISIBILITY;
use pierre_core::models::ExerciseType;
use pierre_form_coach::config::ThresholdStore;
use pierre_form_coach::pipeline::FramePipeline;
use pierre_intelligence::{AngleCalculator, CameraViewAnalyzer};

/// Benchmark angle extraction on single frames at different depths
fn bench_angle_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("angles");

    for knee in [175.0, 120.0, 85.0] {
        let frame = squat_frame(0, knee);
        group.bench_with_input(
            BenchmarkId::new("squat_knee_deg", knee),
            &frame,
            |b, frame| {
                b.iter(|| {
                    AngleCalculator::calculate(
                        black_box(frame),
                        black_box(ExerciseType::Squat),
                        black_box(DEFAULT_MIN_VISIBILITY),
                    )
                });
            },
        );
    }

    group.finish();
}

/// Benchmark camera view classification
fn bench_camera_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("camera_view");
    let frame = squat_frame(0, 175.0);

    group.bench_function("standing_frame", |b| {
        b.iter(|| CameraViewAnalyzer::analyze(black_box(&frame), DEFAULT_MIN_VISIBILITY));
    });

    group.finish();
}

/// Benchmark the full pipeline over rep streams
#[allow(clippy::cast_possible_truncation)]
fn bench_frame_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_pipeline");
    let Ok(store) = ThresholdStore::with_builtin_profiles() else {
        return;
    };
    let handle = store.active();

    for size in [RepBatchSize::Single, RepBatchSize::Set] {
        let frames = squat_stream(size);
        group.throughput(Throughput::Elements(frames.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("squat_reps", size.reps()),
            &frames,
            |b, frames| {
                b.iter(|| {
                    let mut pipeline = FramePipeline::new(ExerciseType::Squat);
                    for frame in frames {
                        black_box(pipeline.process(black_box(frame), &handle));
                    }
                    pipeline.completed_reps()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_angle_calculation,
    bench_camera_view,
    bench_frame_pipeline,
);
criterion_main!(benches);
