// ABOUTME: Benchmark fixtures generating synthetic squat landmark frames
// ABOUTME: Deterministic frame streams for reproducible pipeline measurements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Benchmark fixtures for generating squat landmark streams.

use pierre_core::constants::landmarks::{
    LANDMARK_COUNT, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, RIGHT_ANKLE, RIGHT_HIP,
    RIGHT_KNEE, RIGHT_SHOULDER,
};
use pierre_core::models::{Landmark, LandmarkFrame};

const VISIBLE: f64 = 0.99;
const LEG_SEGMENT: f64 = 0.2;
const TORSO: f64 = 0.3;
const ANKLE_Y: f64 = 0.9;

/// Knee angles of one clean rep sampled every 250 ms
pub const SQUAT_REP_KNEE: [f64; 13] = [
    175.0, 175.0, 175.0, 150.0, 130.0, 110.0, 90.0, 85.0, 90.0, 110.0, 130.0, 150.0, 175.0,
];

/// Frame interval of generated streams
pub const FRAME_STEP_MS: u64 = 250;

/// Predefined stream lengths for benchmark scenarios
#[derive(Debug, Clone, Copy)]
pub enum RepBatchSize {
    /// One rep
    Single,
    /// A typical working set
    Set,
}

impl RepBatchSize {
    #[must_use]
    pub const fn reps(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Set => 12,
        }
    }
}

/// Squat frame with both legs bent to `knee_deg` and an upright torso
#[must_use]
pub fn squat_frame(timestamp_ms: u64, knee_deg: f64) -> LandmarkFrame {
    let half = (knee_deg / 2.0).to_radians();
    let span = 2.0 * LEG_SEGMENT * half.sin();
    let hip_y = ANKLE_Y - span;
    let knee_y = ANKLE_Y - span / 2.0;
    let knee_z = -LEG_SEGMENT * half.cos();

    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0, VISIBLE); LANDMARK_COUNT];
    for (x, ankle, knee, hip, shoulder) in [
        (0.48, LEFT_ANKLE, LEFT_KNEE, LEFT_HIP, LEFT_SHOULDER),
        (0.52, RIGHT_ANKLE, RIGHT_KNEE, RIGHT_HIP, RIGHT_SHOULDER),
    ] {
        landmarks[ankle] = Landmark::new(x, ANKLE_Y, 0.0, VISIBLE);
        landmarks[knee] = Landmark::new(x, knee_y, knee_z, VISIBLE);
        landmarks[hip] = Landmark::new(x, hip_y, 0.0, VISIBLE);
        landmarks[shoulder] = Landmark::new(x, hip_y - TORSO, 0.0, VISIBLE);
    }
    LandmarkFrame::new(timestamp_ms, landmarks).unwrap_or_else(|_| LandmarkFrame::empty(timestamp_ms))
}

/// Consecutive clean squat reps with monotonic timestamps
#[must_use]
pub fn squat_stream(size: RepBatchSize) -> Vec<LandmarkFrame> {
    SQUAT_REP_KNEE
        .iter()
        .cycle()
        .take(SQUAT_REP_KNEE.len() * size.reps())
        .zip(0_u64..)
        .map(|(&knee, index)| squat_frame(index * FRAME_STEP_MS, knee))
        .collect()
}
