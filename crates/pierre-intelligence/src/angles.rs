// ABOUTME: Joint angle calculation from pose landmarks for each supported exercise
// ABOUTME: Dot-product geometry with visibility gating and per-exercise angle sets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Angle Calculator
//!
//! Turns one `LandmarkFrame` into the named joint angles an exercise needs.
//! Each joint angle is measured at the middle landmark between the vectors to
//! the two outer landmarks:
//!
//! ```text
//! cos(θ) = (v1 · v2) / (|v1| × |v2|),  θ ∈ [0°, 180°]
//! ```
//!
//! The calculator is deterministic and never fails into the pipeline. When a
//! landmark required by the exercise is below the confidence floor it returns
//! [`AngleOutcome::InsufficientLandmarks`] and the caller skips angle-dependent
//! steps for that frame.

use std::collections::BTreeMap;

use pierre_core::constants::geometry::MIN_VECTOR_MAGNITUDE;
use pierre_core::constants::landmarks::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ANKLE,
    RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use pierre_core::models::{ExerciseType, Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};

use crate::camera_view::{CameraViewAnalyzer, ViewType};

/// Anatomical angles tracked by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleName {
    /// Hip-knee-ankle flexion
    Knee,
    /// Shoulder-hip-knee flexion
    Hip,
    /// Shoulder-elbow-wrist flexion
    Elbow,
    /// Hip-shoulder-elbow opening (upper arm relative to torso)
    Shoulder,
    /// Torso deviation from vertical, 0° = upright
    TorsoLean,
    /// Shoulder-hip-ankle straightness, 180° = straight plank
    BodyLine,
    /// Inward collapse of the knee in the frontal plane, 0° = aligned
    KneeValgus,
}

impl AngleName {
    /// Stable identifier for logs and configuration
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Knee => "knee",
            Self::Hip => "hip",
            Self::Elbow => "elbow",
            Self::Shoulder => "shoulder",
            Self::TorsoLean => "torso_lean",
            Self::BodyLine => "body_line",
            Self::KneeValgus => "knee_valgus",
        }
    }
}

/// Body side the angles were measured on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    /// Subject's left side
    Left,
    /// Subject's right side
    Right,
}

/// Named joint angles for one frame, in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseAngles {
    exercise: ExerciseType,
    side: BodySide,
    values: BTreeMap<AngleName, f64>,
}

impl ExerciseAngles {
    /// Empty angle set for an exercise
    #[must_use]
    pub const fn new(exercise: ExerciseType, side: BodySide) -> Self {
        Self {
            exercise,
            side,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert; values are clamped to [0°, 180°]
    #[must_use]
    pub fn with(mut self, name: AngleName, degrees: f64) -> Self {
        self.insert(name, degrees);
        self
    }

    /// Insert an angle, clamped to [0°, 180°]
    pub fn insert(&mut self, name: AngleName, degrees: f64) {
        self.values.insert(name, clamp_degrees(degrees));
    }

    /// Angle value if it was measured this frame
    #[must_use]
    pub fn get(&self, name: AngleName) -> Option<f64> {
        self.values.get(&name).copied()
    }

    /// Exercise these angles were computed for
    #[must_use]
    pub const fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    /// Side of the body that was measured
    #[must_use]
    pub const fn side(&self) -> BodySide {
        self.side
    }

    /// Iterate over all measured angles in name order
    pub fn iter(&self) -> impl Iterator<Item = (AngleName, f64)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}

/// Result of the angle calculation for a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AngleOutcome {
    /// All required landmarks were visible
    Angles(ExerciseAngles),
    /// At least one required landmark was below the confidence floor
    InsufficientLandmarks {
        /// Topology indices of the landmarks that failed the floor
        missing: Vec<usize>,
    },
}

impl AngleOutcome {
    /// Angles if the frame had enough confidence
    #[must_use]
    pub const fn angles(&self) -> Option<&ExerciseAngles> {
        match self {
            Self::Angles(angles) => Some(angles),
            Self::InsufficientLandmarks { .. } => None,
        }
    }

    /// Whether the frame was rejected for low confidence
    #[must_use]
    pub const fn is_low_confidence(&self) -> bool {
        matches!(self, Self::InsufficientLandmarks { .. })
    }
}

/// Landmark indices for one side of the body
#[derive(Debug, Clone, Copy)]
struct SideJoints {
    side: BodySide,
    shoulder: usize,
    elbow: usize,
    wrist: usize,
    hip: usize,
    knee: usize,
    ankle: usize,
}

const LEFT_JOINTS: SideJoints = SideJoints {
    side: BodySide::Left,
    shoulder: LEFT_SHOULDER,
    elbow: LEFT_ELBOW,
    wrist: LEFT_WRIST,
    hip: LEFT_HIP,
    knee: LEFT_KNEE,
    ankle: LEFT_ANKLE,
};

const RIGHT_JOINTS: SideJoints = SideJoints {
    side: BodySide::Right,
    shoulder: RIGHT_SHOULDER,
    elbow: RIGHT_ELBOW,
    wrist: RIGHT_WRIST,
    hip: RIGHT_HIP,
    knee: RIGHT_KNEE,
    ankle: RIGHT_ANKLE,
};

impl SideJoints {
    /// Landmarks that must pass the confidence floor for an exercise
    fn required(&self, exercise: ExerciseType) -> Vec<usize> {
        match exercise {
            ExerciseType::Squat => vec![self.shoulder, self.hip, self.knee, self.ankle],
            ExerciseType::PushUp => vec![self.shoulder, self.elbow, self.wrist, self.hip, self.ankle],
            ExerciseType::BicepCurl => vec![self.shoulder, self.elbow, self.wrist, self.hip],
        }
    }
}

/// Stateless angle calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleCalculator;

impl AngleCalculator {
    /// Compute the angle set for `exercise` from one frame
    ///
    /// The side (left/right) with the higher mean visibility over the exercise's
    /// required landmarks is measured. Optional angles that need extra landmarks
    /// (knee valgus needs both legs) are omitted rather than failing the frame.
    #[must_use]
    pub fn calculate(
        frame: &LandmarkFrame,
        exercise: ExerciseType,
        min_visibility: f64,
    ) -> AngleOutcome {
        let left_required = LEFT_JOINTS.required(exercise);
        let right_required = RIGHT_JOINTS.required(exercise);

        let (joints, required) = if frame.mean_visibility(&right_required)
            > frame.mean_visibility(&left_required)
        {
            (RIGHT_JOINTS, right_required)
        } else {
            (LEFT_JOINTS, left_required)
        };

        let missing = frame.below_floor(&required, min_visibility);
        if !missing.is_empty() {
            return AngleOutcome::InsufficientLandmarks { missing };
        }

        // Every index in `required` passed the floor, so lookups succeed
        let point = |index: usize| frame.get(index).copied().unwrap_or_default();
        let shoulder = point(joints.shoulder);
        let hip = point(joints.hip);

        let mut angles = ExerciseAngles::new(exercise, joints.side);
        match exercise {
            ExerciseType::Squat => {
                let knee = point(joints.knee);
                let ankle = point(joints.ankle);
                angles.insert(AngleName::Knee, joint_angle(&hip, &knee, &ankle));
                angles.insert(AngleName::Hip, joint_angle(&shoulder, &hip, &knee));
                angles.insert(AngleName::TorsoLean, lean_from_vertical(&hip, &shoulder));
                if let Some(valgus) = knee_valgus(frame, min_visibility) {
                    angles.insert(AngleName::KneeValgus, valgus);
                }
            }
            ExerciseType::PushUp => {
                let elbow = point(joints.elbow);
                let wrist = point(joints.wrist);
                let ankle = point(joints.ankle);
                angles.insert(AngleName::Elbow, joint_angle(&shoulder, &elbow, &wrist));
                angles.insert(AngleName::BodyLine, joint_angle(&shoulder, &hip, &ankle));
                angles.insert(AngleName::Shoulder, joint_angle(&hip, &shoulder, &elbow));
            }
            ExerciseType::BicepCurl => {
                let elbow = point(joints.elbow);
                let wrist = point(joints.wrist);
                angles.insert(AngleName::Elbow, joint_angle(&shoulder, &elbow, &wrist));
                angles.insert(AngleName::Shoulder, joint_angle(&hip, &shoulder, &elbow));
                angles.insert(AngleName::TorsoLean, lean_from_vertical(&hip, &shoulder));
            }
        }

        AngleOutcome::Angles(angles)
    }
}

/// Angle at `vertex` between the vectors to `a` and `c`, in degrees
///
/// Degenerate vectors (coincident landmarks) yield 180°, the neutral extended pose.
#[must_use]
pub fn joint_angle(a: &Landmark, vertex: &Landmark, c: &Landmark) -> f64 {
    let v1 = (a.x - vertex.x, a.y - vertex.y, a.z - vertex.z);
    let v2 = (c.x - vertex.x, c.y - vertex.y, c.z - vertex.z);

    let dot = v1.2.mul_add(v2.2, v1.0.mul_add(v2.0, v1.1 * v2.1));
    let mag1 = v1.2.mul_add(v1.2, v1.0.mul_add(v1.0, v1.1 * v1.1)).sqrt();
    let mag2 = v2.2.mul_add(v2.2, v2.0.mul_add(v2.0, v2.1 * v2.1)).sqrt();

    if mag1 < MIN_VECTOR_MAGNITUDE || mag2 < MIN_VECTOR_MAGNITUDE {
        return 180.0;
    }

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    clamp_degrees(cos_angle.acos().to_degrees())
}

/// Deviation of the `lower` → `upper` segment from image vertical, in degrees
///
/// Image y grows downward, so "up" is negative y. 0° means the segment points
/// straight up; 90° means it is horizontal.
#[must_use]
pub fn lean_from_vertical(lower: &Landmark, upper: &Landmark) -> f64 {
    let dx = upper.x - lower.x;
    let dy = lower.y - upper.y;
    if dx.hypot(dy) < MIN_VECTOR_MAGNITUDE {
        return 0.0;
    }
    clamp_degrees(dx.abs().atan2(dy).to_degrees())
}

/// Worst inward knee collapse over both legs, in degrees
///
/// For each leg the knee's horizontal offset from the hip-ankle line is measured
/// at the knee's height and signed positive toward the body midline. Outward
/// offsets count as 0°. Returns `None` unless both legs are fully visible.
///
/// Inward collapse only shows as horizontal offset when the camera faces the
/// body. Side-on, the knees travel forward along x and the hips overlap, so
/// any view other than frontal yields `None`.
#[must_use]
pub fn knee_valgus(frame: &LandmarkFrame, min_visibility: f64) -> Option<f64> {
    if CameraViewAnalyzer::view_type(frame) != ViewType::Frontal {
        return None;
    }
    let legs = [
        LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE,
    ];
    if !frame.below_floor(&legs, min_visibility).is_empty() {
        return None;
    }

    let left_hip = frame.get(LEFT_HIP)?;
    let right_hip = frame.get(RIGHT_HIP)?;
    let midline_x = (left_hip.x + right_hip.x) / 2.0;

    let leg_valgus = |hip: &Landmark, knee: &Landmark, ankle: &Landmark| -> f64 {
        let span_y = ankle.y - hip.y;
        let t = if span_y.abs() < MIN_VECTOR_MAGNITUDE {
            0.0
        } else {
            (knee.y - hip.y) / span_y
        };
        let line_x = t.mul_add(ankle.x - hip.x, hip.x);
        let inward_sign = if hip.x < midline_x { 1.0 } else { -1.0 };
        let inward_offset = (knee.x - line_x) * inward_sign;
        let thigh_height = (knee.y - hip.y).abs();
        if inward_offset <= 0.0 {
            0.0
        } else {
            inward_offset.atan2(thigh_height).to_degrees()
        }
    };

    let left = leg_valgus(left_hip, frame.get(LEFT_KNEE)?, frame.get(LEFT_ANKLE)?);
    let right = leg_valgus(right_hip, frame.get(RIGHT_KNEE)?, frame.get(RIGHT_ANKLE)?);
    Some(clamp_degrees(left.max(right)))
}

fn clamp_degrees(degrees: f64) -> f64 {
    if degrees.is_nan() {
        return 0.0;
    }
    degrees.clamp(0.0, 180.0)
}
