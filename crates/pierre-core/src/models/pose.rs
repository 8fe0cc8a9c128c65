// ABOUTME: Pose landmark models emitted by the external pose-estimation component
// ABOUTME: Defines Landmark and fixed-cardinality LandmarkFrame with visibility helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::landmarks::LANDMARK_COUNT;
use crate::errors::{AppError, AppResult};

/// A single tracked body point in normalised camera space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Landmark {
    /// Horizontal position, 0.0 = left frame edge, 1.0 = right frame edge
    pub x: f64,
    /// Vertical position, 0.0 = top frame edge, 1.0 = bottom frame edge
    pub y: f64,
    /// Depth relative to the hips, smaller is closer to the camera
    pub z: f64,
    /// Detection confidence in [0, 1]
    pub visibility: f64,
}

impl Landmark {
    /// Create a landmark
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Whether this landmark meets the given confidence floor
    #[must_use]
    pub fn is_visible(&self, min_visibility: f64) -> bool {
        self.visibility >= min_visibility
    }

    /// Midpoint of two landmarks; visibility is the weaker of the two
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
            z: (self.z + other.z) / 2.0,
            visibility: self.visibility.min(other.visibility),
        }
    }
}

/// One processed video frame worth of landmarks
///
/// Frames are produced by the pose estimator and never mutated by the pipeline.
/// `timestamp_ms` is on the session clock and drives every timing decision
/// downstream (rep duration, speech throttling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLandmarkFrame")]
pub struct LandmarkFrame {
    /// Frame capture time in milliseconds on the session clock
    pub timestamp_ms: u64,
    landmarks: Vec<Landmark>,
}

/// Unchecked wire form; deserialisation goes through [`LandmarkFrame::new`]
#[derive(Deserialize)]
struct RawLandmarkFrame {
    timestamp_ms: u64,
    landmarks: Vec<Landmark>,
}

impl TryFrom<RawLandmarkFrame> for LandmarkFrame {
    type Error = AppError;

    fn try_from(raw: RawLandmarkFrame) -> AppResult<Self> {
        Self::new(raw.timestamp_ms, raw.landmarks)
    }
}

impl LandmarkFrame {
    /// Build a frame, checking the landmark cardinality
    ///
    /// # Errors
    ///
    /// Returns `AppError::invalid_input` if the landmark count is not the fixed
    /// topology size or any coordinate is not finite.
    pub fn new(timestamp_ms: u64, landmarks: Vec<Landmark>) -> AppResult<Self> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(AppError::invalid_input(format!(
                "Expected {LANDMARK_COUNT} landmarks, got {}",
                landmarks.len()
            )));
        }
        if landmarks
            .iter()
            .any(|l| !(l.x.is_finite() && l.y.is_finite() && l.z.is_finite()))
        {
            return Err(AppError::invalid_input(
                "Landmark coordinates must be finite",
            ));
        }
        Ok(Self {
            timestamp_ms,
            landmarks,
        })
    }

    /// A frame in which nothing was detected (every landmark at zero visibility)
    #[must_use]
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            landmarks: vec![Landmark::default(); LANDMARK_COUNT],
        }
    }

    /// Landmark at a topology index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// All landmarks in topology order
    #[must_use]
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Mean visibility of the given landmark indices (0.0 for an empty or unknown set)
    #[must_use]
    pub fn mean_visibility(&self, indices: &[usize]) -> f64 {
        let visibilities: Vec<f64> = indices
            .iter()
            .filter_map(|&i| self.get(i).map(|l| l.visibility))
            .collect();
        if visibilities.is_empty() {
            return 0.0;
        }
        visibilities.iter().sum::<f64>() / visibilities.len() as f64
    }

    /// Indices from `indices` whose visibility is below the floor
    #[must_use]
    pub fn below_floor(&self, indices: &[usize], min_visibility: f64) -> Vec<usize> {
        indices
            .iter()
            .copied()
            .filter(|&i| !self.get(i).is_some_and(|l| l.is_visible(min_visibility)))
            .collect()
    }
}
