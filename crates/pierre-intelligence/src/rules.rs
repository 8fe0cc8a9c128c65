// ABOUTME: Static form-rule catalogue per exercise with severities and coaching text
// ABOUTME: Each rule watches one angle; tolerance bands live in the threshold profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Form Rule Catalogue
//!
//! Rules are closed, statically known per exercise. Only the numeric tolerance
//! bands are configuration data; the identity, watched angle, base severity and
//! coaching text of each rule are fixed here.

use std::fmt;

use pierre_core::models::ExerciseType;
use serde::{Deserialize, Serialize};

use crate::angles::AngleName;

/// Violation severity, ordered low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Cosmetic deviation
    Low,
    /// Deviation that degrades the rep
    Medium,
    /// Deviation with injury risk
    High,
}

impl Severity {
    /// One level more severe, saturating at `High`
    #[must_use]
    pub const fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }

    /// Stable identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form rules across all supported exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormRule {
    /// Squat: knees collapsing inward
    KneeValgus,
    /// Squat: knee flexion beyond the safe range
    ExcessiveDepth,
    /// Squat: chest dropping too far forward
    TorsoOverLean,
    /// Push-up: hips sagging or piking
    BodyLineBreak,
    /// Push-up: upper arm flaring away from the torso
    ShoulderOverreach,
    /// Bicep curl: upper arm drifting forward
    UpperArmSwing,
    /// Bicep curl: torso rocking to move the weight
    TorsoSwing,
}

const SQUAT_RULES: &[FormRule] = &[
    FormRule::KneeValgus,
    FormRule::ExcessiveDepth,
    FormRule::TorsoOverLean,
];
const PUSH_UP_RULES: &[FormRule] = &[FormRule::BodyLineBreak, FormRule::ShoulderOverreach];
const BICEP_CURL_RULES: &[FormRule] = &[FormRule::UpperArmSwing, FormRule::TorsoSwing];

/// Rules that apply to an exercise, in catalogue order
#[must_use]
pub const fn catalogue(exercise: ExerciseType) -> &'static [FormRule] {
    match exercise {
        ExerciseType::Squat => SQUAT_RULES,
        ExerciseType::PushUp => PUSH_UP_RULES,
        ExerciseType::BicepCurl => BICEP_CURL_RULES,
    }
}

impl FormRule {
    /// Every rule, grouped by exercise
    pub const ALL: [Self; 7] = [
        Self::KneeValgus,
        Self::ExcessiveDepth,
        Self::TorsoOverLean,
        Self::BodyLineBreak,
        Self::ShoulderOverreach,
        Self::UpperArmSwing,
        Self::TorsoSwing,
    ];

    /// Exercise this rule belongs to
    #[must_use]
    pub const fn exercise(&self) -> ExerciseType {
        match self {
            Self::KneeValgus | Self::ExcessiveDepth | Self::TorsoOverLean => ExerciseType::Squat,
            Self::BodyLineBreak | Self::ShoulderOverreach => ExerciseType::PushUp,
            Self::UpperArmSwing | Self::TorsoSwing => ExerciseType::BicepCurl,
        }
    }

    /// Angle the rule watches
    #[must_use]
    pub const fn angle(&self) -> AngleName {
        match self {
            Self::KneeValgus => AngleName::KneeValgus,
            Self::ExcessiveDepth => AngleName::Knee,
            Self::TorsoOverLean | Self::TorsoSwing => AngleName::TorsoLean,
            Self::BodyLineBreak => AngleName::BodyLine,
            Self::ShoulderOverreach | Self::UpperArmSwing => AngleName::Shoulder,
        }
    }

    /// Severity before escalation
    #[must_use]
    pub const fn base_severity(&self) -> Severity {
        match self {
            Self::KneeValgus | Self::TorsoOverLean | Self::BodyLineBreak => Severity::Medium,
            Self::ExcessiveDepth | Self::ShoulderOverreach | Self::UpperArmSwing | Self::TorsoSwing => {
                Severity::Low
            }
        }
    }

    /// What went wrong
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::KneeValgus => "Knees are caving inward",
            Self::ExcessiveDepth => "Squatting deeper than your safe range",
            Self::TorsoOverLean => "Leaning too far forward",
            Self::BodyLineBreak => "Hips are sagging or piking",
            Self::ShoulderOverreach => "Elbows are flaring away from your body",
            Self::UpperArmSwing => "Upper arm is swinging forward",
            Self::TorsoSwing => "Using your body to swing the weight",
        }
    }

    /// Short instruction suitable for speech
    #[must_use]
    pub const fn correction_hint(&self) -> &'static str {
        match self {
            Self::KneeValgus => "Push your knees out over your toes",
            Self::ExcessiveDepth => "Stop when your thighs are parallel to the floor",
            Self::TorsoOverLean => "Keep your chest up",
            Self::BodyLineBreak => "Brace your core and keep a straight line",
            Self::ShoulderOverreach => "Tuck your elbows closer to your sides",
            Self::UpperArmSwing => "Pin your elbows to your sides",
            Self::TorsoSwing => "Keep your torso still",
        }
    }

    /// Stable identifier used in configuration keys
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KneeValgus => "knee_valgus",
            Self::ExcessiveDepth => "excessive_depth",
            Self::TorsoOverLean => "torso_over_lean",
            Self::BodyLineBreak => "body_line_break",
            Self::ShoulderOverreach => "shoulder_overreach",
            Self::UpperArmSwing => "upper_arm_swing",
            Self::TorsoSwing => "torso_swing",
        }
    }

    /// Parse a configuration identifier
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.as_str() == key)
    }

    /// Position within the exercise catalogue, used as the stable sort key
    #[must_use]
    pub fn catalogue_index(&self) -> usize {
        catalogue(self.exercise())
            .iter()
            .position(|rule| rule == self)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for FormRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
