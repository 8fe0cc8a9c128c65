// ABOUTME: Built-in threshold profiles for every exercise type and skill mode
// ABOUTME: Beginner profiles are permissive and chatty, pro profiles strict and quiet
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use pierre_core::constants::confidence::DEFAULT_MIN_VISIBILITY;
use pierre_core::models::{ExerciseType, SkillMode};

use super::profile::{PhaseBounds, RepTiming, RuleTolerance, ThresholdProfile, ToleranceBand};
use crate::rules::{FormRule, Severity};

const PRO_MIN_VISIBILITY: f64 = 0.6;

/// Same band in every state
const fn everywhere(min_deg: f64, max_deg: f64) -> RuleTolerance {
    let band = Some(ToleranceBand::new(min_deg, max_deg));
    RuleTolerance {
        start: band,
        transition: band,
        target: band,
    }
}

/// Band only while moving and at the bottom
const fn in_motion(min_deg: f64, max_deg: f64) -> RuleTolerance {
    let band = Some(ToleranceBand::new(min_deg, max_deg));
    RuleTolerance {
        start: None,
        transition: band,
        target: band,
    }
}

/// Band only at the target position
const fn at_target(min_deg: f64, max_deg: f64) -> RuleTolerance {
    RuleTolerance {
        start: None,
        transition: None,
        target: Some(ToleranceBand::new(min_deg, max_deg)),
    }
}

/// Distinct band per state
const fn per_state(start: (f64, f64), transition: (f64, f64), target: (f64, f64)) -> RuleTolerance {
    RuleTolerance {
        start: Some(ToleranceBand::new(start.0, start.1)),
        transition: Some(ToleranceBand::new(transition.0, transition.1)),
        target: Some(ToleranceBand::new(target.0, target.1)),
    }
}

const fn timing(expected: (u64, u64), tight: (u64, u64)) -> RepTiming {
    RepTiming {
        expected_min_ms: expected.0,
        expected_max_ms: expected.1,
        tight_min_ms: tight.0,
        tight_max_ms: tight.1,
    }
}

/// Built-in profile for a combination
#[must_use]
pub fn builtin_profile(exercise: ExerciseType, mode: SkillMode) -> ThresholdProfile {
    match (exercise, mode) {
        (ExerciseType::Squat, SkillMode::Beginner) => ThresholdProfile {
            exercise,
            mode,
            phases: PhaseBounds {
                start_min_deg: 160.0,
                target_max_deg: 100.0,
            },
            rules: BTreeMap::from([
                (FormRule::KneeValgus, in_motion(0.0, 15.0)),
                (FormRule::ExcessiveDepth, at_target(45.0, 180.0)),
                (
                    FormRule::TorsoOverLean,
                    per_state((0.0, 20.0), (0.0, 50.0), (0.0, 55.0)),
                ),
            ]),
            timing: timing((1000, 6000), (1500, 4000)),
            feedback_frequency_ms: 2500,
            priority_floor: Severity::Low,
            min_visibility: DEFAULT_MIN_VISIBILITY,
            escalation_margin_deg: 15.0,
        },
        (ExerciseType::Squat, SkillMode::Pro) => ThresholdProfile {
            exercise,
            mode,
            phases: PhaseBounds {
                start_min_deg: 165.0,
                target_max_deg: 90.0,
            },
            rules: BTreeMap::from([
                (FormRule::KneeValgus, in_motion(0.0, 10.0)),
                (FormRule::ExcessiveDepth, at_target(55.0, 180.0)),
                (
                    FormRule::TorsoOverLean,
                    per_state((0.0, 15.0), (0.0, 40.0), (0.0, 45.0)),
                ),
            ]),
            timing: timing((1200, 5000), (2000, 3500)),
            feedback_frequency_ms: 5000,
            priority_floor: Severity::Medium,
            min_visibility: PRO_MIN_VISIBILITY,
            escalation_margin_deg: 8.0,
        },
        (ExerciseType::PushUp, SkillMode::Beginner) => ThresholdProfile {
            exercise,
            mode,
            phases: PhaseBounds {
                start_min_deg: 150.0,
                target_max_deg: 100.0,
            },
            rules: BTreeMap::from([
                (FormRule::BodyLineBreak, everywhere(155.0, 180.0)),
                (FormRule::ShoulderOverreach, in_motion(20.0, 100.0)),
            ]),
            timing: timing((800, 5000), (1200, 3000)),
            feedback_frequency_ms: 2500,
            priority_floor: Severity::Low,
            min_visibility: DEFAULT_MIN_VISIBILITY,
            escalation_margin_deg: 15.0,
        },
        (ExerciseType::PushUp, SkillMode::Pro) => ThresholdProfile {
            exercise,
            mode,
            phases: PhaseBounds {
                start_min_deg: 160.0,
                target_max_deg: 90.0,
            },
            rules: BTreeMap::from([
                (FormRule::BodyLineBreak, everywhere(165.0, 180.0)),
                (FormRule::ShoulderOverreach, in_motion(30.0, 90.0)),
            ]),
            timing: timing((1000, 4000), (1500, 2500)),
            feedback_frequency_ms: 5000,
            priority_floor: Severity::Medium,
            min_visibility: PRO_MIN_VISIBILITY,
            escalation_margin_deg: 8.0,
        },
        (ExerciseType::BicepCurl, SkillMode::Beginner) => ThresholdProfile {
            exercise,
            mode,
            phases: PhaseBounds {
                start_min_deg: 150.0,
                target_max_deg: 60.0,
            },
            rules: BTreeMap::from([
                (FormRule::UpperArmSwing, everywhere(0.0, 35.0)),
                (FormRule::TorsoSwing, everywhere(0.0, 15.0)),
            ]),
            timing: timing((1000, 6000), (1500, 4000)),
            feedback_frequency_ms: 2500,
            priority_floor: Severity::Low,
            min_visibility: DEFAULT_MIN_VISIBILITY,
            escalation_margin_deg: 15.0,
        },
        (ExerciseType::BicepCurl, SkillMode::Pro) => ThresholdProfile {
            exercise,
            mode,
            phases: PhaseBounds {
                start_min_deg: 155.0,
                target_max_deg: 50.0,
            },
            rules: BTreeMap::from([
                (FormRule::UpperArmSwing, everywhere(0.0, 20.0)),
                (FormRule::TorsoSwing, everywhere(0.0, 8.0)),
            ]),
            timing: timing((1500, 5000), (2000, 3500)),
            feedback_frequency_ms: 5000,
            priority_floor: Severity::Medium,
            min_visibility: PRO_MIN_VISIBILITY,
            escalation_margin_deg: 8.0,
        },
    }
}

/// Every built-in profile
#[must_use]
pub fn builtin_profiles() -> Vec<ThresholdProfile> {
    ExerciseType::ALL
        .into_iter()
        .flat_map(|exercise| {
            SkillMode::ALL
                .into_iter()
                .map(move |mode| builtin_profile(exercise, mode))
        })
        .collect()
}
