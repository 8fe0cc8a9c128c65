// ABOUTME: Shared test utilities for form coach integration tests
// ABOUTME: Synthetic pose builders with exact joint angles and a recording speech sink
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `pierre_form_coach`
//!
//! Poses are built from joint angles so tests can state "knee at 85°" instead
//! of hand-placing landmarks. Squats come in two camera placements: side-on,
//! where knee valgus cannot be measured, and facing the camera, where it can.

use std::env;
use std::sync::{Arc, Mutex, Once, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use pierre_core::constants::landmarks::{
    LANDMARK_COUNT, LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST,
    RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use pierre_core::models::{Landmark, LandmarkFrame};
use pierre_form_coach::audio::{AudioConfig, AudioDispatcher, SpeechSink};
use pierre_form_coach::errors::AppResult;
use tokio::time::sleep;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

const VISIBLE: f64 = 0.99;
const LEG_SEGMENT: f64 = 0.2;
const TORSO: f64 = 0.3;
const ANKLE_Y: f64 = 0.9;
const SIDE_LEFT_X: f64 = 0.50;
const SIDE_RIGHT_X: f64 = 0.51;
const FRONT_LEFT_X: f64 = 0.40;
const FRONT_RIGHT_X: f64 = 0.60;

fn blank_landmarks() -> Vec<Landmark> {
    vec![Landmark::new(0.5, 0.5, 0.0, VISIBLE); LANDMARK_COUNT]
}

/// Hip-to-ankle height and the knee's forward offset for a knee angle
fn leg_geometry(knee_deg: f64) -> (f64, f64) {
    let (sin, cos) = (knee_deg / 2.0).to_radians().sin_cos();
    (2.0 * LEG_SEGMENT * sin, LEG_SEGMENT * cos)
}

/// Side-on squat frame with the given knee angle and an upright torso
pub fn squat_frame(timestamp_ms: u64, knee_deg: f64) -> LandmarkFrame {
    leaning_squat_frame(timestamp_ms, knee_deg, 0.0)
}

/// Side-on squat frame with forward torso lean
///
/// Both legs bend in the image plane: the knees travel forward along x while
/// hips stay over the ankles, which is what a camera at the subject's side sees.
pub fn leaning_squat_frame(
    timestamp_ms: u64,
    knee_deg: f64,
    torso_lean_deg: f64,
) -> LandmarkFrame {
    let (span, knee_forward) = leg_geometry(knee_deg);
    let hip_y = ANKLE_Y - span;
    let knee_y = ANKLE_Y - span / 2.0;
    let (lean_sin, lean_cos) = torso_lean_deg.to_radians().sin_cos();
    let shoulder_y = hip_y - TORSO * lean_cos;

    let mut landmarks = blank_landmarks();
    for (hip, knee, ankle, shoulder, x) in [
        (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, LEFT_SHOULDER, SIDE_LEFT_X),
        (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE, RIGHT_SHOULDER, SIDE_RIGHT_X),
    ] {
        landmarks[ankle] = Landmark::new(x, ANKLE_Y, 0.0, VISIBLE);
        landmarks[knee] = Landmark::new(x + knee_forward, knee_y, 0.0, VISIBLE);
        landmarks[hip] = Landmark::new(x, hip_y, 0.0, VISIBLE);
        landmarks[shoulder] = Landmark::new(x + TORSO * lean_sin, shoulder_y, 0.0, VISIBLE);
    }
    LandmarkFrame::new(timestamp_ms, landmarks).unwrap()
}

/// Squat frame facing the camera, with inward collapse of the right knee
///
/// Flexion happens in depth (z), so each leg stays on its hip-ankle line in the
/// image plane unless `valgus_deg` pushes the right knee toward the midline.
/// The left leg is untouched and is the side the knee angle is read from.
pub fn front_squat_frame(timestamp_ms: u64, knee_deg: f64, valgus_deg: f64) -> LandmarkFrame {
    let (span, knee_forward) = leg_geometry(knee_deg);
    let hip_y = ANKLE_Y - span;
    let knee_y = ANKLE_Y - span / 2.0;
    let valgus_shift = (span / 2.0) * valgus_deg.to_radians().tan();

    let mut landmarks = blank_landmarks();
    for (hip, knee, ankle, shoulder, x, shift) in [
        (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, LEFT_SHOULDER, FRONT_LEFT_X, 0.0),
        (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE, RIGHT_SHOULDER, FRONT_RIGHT_X, -valgus_shift),
    ] {
        landmarks[ankle] = Landmark::new(x, ANKLE_Y, 0.0, VISIBLE);
        landmarks[knee] = Landmark::new(x + shift, knee_y, -knee_forward, VISIBLE);
        landmarks[hip] = Landmark::new(x, hip_y, 0.0, VISIBLE);
        landmarks[shoulder] = Landmark::new(x, hip_y - TORSO, 0.0, VISIBLE);
    }
    LandmarkFrame::new(timestamp_ms, landmarks).unwrap()
}

/// Point at `length` from `vertex`, turned `degrees` away from the direction of `toward`
fn bend(vertex: (f64, f64), toward: (f64, f64), degrees: f64, length: f64) -> (f64, f64) {
    let (dx, dy) = (toward.0 - vertex.0, toward.1 - vertex.1);
    let norm = dx.hypot(dy);
    let (ux, uy) = (dx / norm, dy / norm);
    let (sin, cos) = degrees.to_radians().sin_cos();
    (
        vertex.0 + length * (ux * cos - uy * sin),
        vertex.1 + length * (ux * sin + uy * cos),
    )
}

fn arm_frame(
    timestamp_ms: u64,
    shoulder: (f64, f64),
    elbow: (f64, f64),
    hip: (f64, f64),
    ankle: (f64, f64),
    elbow_deg: f64,
) -> LandmarkFrame {
    let wrist = bend(elbow, shoulder, elbow_deg, 0.15);
    let at = |p: (f64, f64)| Landmark::new(p.0, p.1, 0.0, VISIBLE);

    let mut landmarks = blank_landmarks();
    for (left, right, point) in [
        (LEFT_SHOULDER, RIGHT_SHOULDER, shoulder),
        (LEFT_ELBOW, RIGHT_ELBOW, elbow),
        (LEFT_WRIST, RIGHT_WRIST, wrist),
        (LEFT_HIP, RIGHT_HIP, hip),
        (LEFT_ANKLE, RIGHT_ANKLE, ankle),
    ] {
        landmarks[left] = at(point);
        landmarks[right] = at(point);
    }
    landmarks[LEFT_KNEE] = at(((hip.0 + ankle.0) / 2.0, (hip.1 + ankle.1) / 2.0));
    landmarks[RIGHT_KNEE] = landmarks[LEFT_KNEE];
    LandmarkFrame::new(timestamp_ms, landmarks).unwrap()
}

/// Standing bicep curl with the upper arm vertical
pub fn curl_frame(timestamp_ms: u64, elbow_deg: f64) -> LandmarkFrame {
    arm_frame(
        timestamp_ms,
        (0.5, 0.3),
        (0.5, 0.5),
        (0.5, 0.6),
        (0.5, 0.95),
        elbow_deg,
    )
}

/// Push-up with a straight body line
pub fn push_up_frame(timestamp_ms: u64, elbow_deg: f64) -> LandmarkFrame {
    arm_frame(
        timestamp_ms,
        (0.3, 0.5),
        (0.32, 0.65),
        (0.55, 0.5),
        (0.8, 0.5),
        elbow_deg,
    )
}

/// Frame where every landmark is below any confidence floor
pub fn blind_frame(timestamp_ms: u64) -> LandmarkFrame {
    LandmarkFrame::empty(timestamp_ms)
}

/// Knee angles for one clean squat: s1, down through s2 to s3, back up to s1
pub const CLEAN_SQUAT_KNEE: [f64; 13] = [
    175.0, 175.0, 175.0, 150.0, 130.0, 110.0, 90.0, 85.0, 90.0, 110.0, 130.0, 150.0, 175.0,
];

/// Frame spacing that puts one clean squat rep inside every tight timing band
pub const REP_FRAME_STEP_MS: u64 = 250;

/// One side-on squat frame per knee angle, `step_ms` apart starting at `start_ms`
pub fn squat_sequence(start_ms: u64, step_ms: u64, knee_angles: &[f64]) -> Vec<LandmarkFrame> {
    (0_u64..)
        .zip(knee_angles)
        .map(|(i, &knee)| squat_frame(start_ms + i * step_ms, knee))
        .collect()
}

/// Speech sink that records what it was asked to say
#[derive(Debug, Default)]
pub struct RecordingSpeechSink {
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
    duration: Duration,
}

impl RecordingSpeechSink {
    /// Sink whose utterances finish immediately
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sink whose utterances each take `duration`
    pub fn with_duration(duration: Duration) -> Arc<Self> {
        Arc::new(Self {
            duration,
            ..Self::default()
        })
    }

    /// Utterances that began playing, in order
    pub fn started(&self) -> Vec<String> {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Utterances that played to completion, in order
    pub fn finished(&self) -> Vec<String> {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SpeechSink for RecordingSpeechSink {
    async fn speak(&self, text: &str) -> AppResult<()> {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_owned());
        if !self.duration.is_zero() {
            sleep(self.duration).await;
        }
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_owned());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Dispatcher over a recording sink with default settings
pub fn recording_dispatcher(sink: &Arc<RecordingSpeechSink>) -> AudioDispatcher {
    AudioDispatcher::spawn(
        Arc::clone(sink) as Arc<dyn SpeechSink>,
        AudioConfig::default(),
    )
}
