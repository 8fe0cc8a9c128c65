// ABOUTME: Form analysis service checking joint angles against per-state tolerance bands
// ABOUTME: Emits severity-ordered violations with escalation beyond the profile margin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Form Analysis Service
//!
//! Walks the exercise's rule catalogue and checks each watched angle against
//! the band the profile defines for the current state. A rule without a band
//! for the state, or whose angle was not measured this frame, does not fire.

use std::collections::BTreeSet;

use pierre_core::models::ExerciseType;
use serde::{Deserialize, Serialize};

use crate::angles::{AngleName, ExerciseAngles};
use crate::config::{ThresholdProfile, ToleranceBand};
use crate::rules::{catalogue, FormRule, Severity};
use crate::state_machine::ExerciseState;

/// One detected deviation from expected form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormViolation {
    /// Rule that fired
    pub rule: FormRule,
    /// Severity after escalation
    pub severity: Severity,
    /// What went wrong
    pub description: String,
    /// How to fix it
    pub correction_hint: String,
    /// Angles implicated
    pub angles: BTreeSet<AngleName>,
    /// Measured angle in degrees
    pub observed_deg: f64,
    /// Band the angle left
    pub band: ToleranceBand,
}

/// Stateless form checker
#[derive(Debug, Clone, Copy, Default)]
pub struct FormAnalyzer;

impl FormAnalyzer {
    /// Violations for one frame, most severe first, ties in catalogue order
    #[must_use]
    pub fn analyze(
        angles: &ExerciseAngles,
        state: ExerciseState,
        exercise: ExerciseType,
        profile: &ThresholdProfile,
    ) -> Vec<FormViolation> {
        let mut violations: Vec<FormViolation> = catalogue(exercise)
            .iter()
            .filter_map(|&rule| Self::check_rule(rule, angles, state, profile))
            .collect();
        // sort_by is stable, so catalogue order survives within a severity
        violations.sort_by(|a, b| b.severity.cmp(&a.severity));
        violations
    }

    fn check_rule(
        rule: FormRule,
        angles: &ExerciseAngles,
        state: ExerciseState,
        profile: &ThresholdProfile,
    ) -> Option<FormViolation> {
        let band = *profile.band(rule, state)?;
        let observed = angles.get(rule.angle())?;
        let deviation = band.deviation(observed);
        if deviation <= 0.0 {
            return None;
        }

        let severity = if deviation > profile.escalation_margin_deg {
            rule.base_severity().escalate()
        } else {
            rule.base_severity()
        };

        Some(FormViolation {
            rule,
            severity,
            description: rule.description().to_owned(),
            correction_hint: rule.correction_hint().to_owned(),
            angles: BTreeSet::from([rule.angle()]),
            observed_deg: observed,
            band,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::BodySide;
    use crate::config::defaults::builtin_profile;
    use pierre_core::models::SkillMode;

    fn squat(knee: f64, lean: f64, valgus: f64) -> ExerciseAngles {
        ExerciseAngles::new(ExerciseType::Squat, BodySide::Left)
            .with(AngleName::Knee, knee)
            .with(AngleName::TorsoLean, lean)
            .with(AngleName::KneeValgus, valgus)
    }

    #[test]
    fn test_clean_frame_has_no_violations() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        let violations = FormAnalyzer::analyze(
            &squat(90.0, 30.0, 2.0),
            ExerciseState::Target,
            ExerciseType::Squat,
            &profile,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_valgus_inactive_in_start_state() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        let angles = squat(170.0, 5.0, 25.0);
        assert!(
            FormAnalyzer::analyze(&angles, ExerciseState::Start, ExerciseType::Squat, &profile)
                .is_empty()
        );
        let violations =
            FormAnalyzer::analyze(&angles, ExerciseState::Target, ExerciseType::Squat, &profile);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, FormRule::KneeValgus);
        assert_eq!(violations[0].severity, Severity::Medium);
    }

    #[test]
    fn test_large_deviation_escalates() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        // band max 15, margin 15: 40 deviates by 25
        let violations = FormAnalyzer::analyze(
            &squat(90.0, 10.0, 40.0),
            ExerciseState::Target,
            ExerciseType::Squat,
            &profile,
        );
        assert_eq!(violations[0].severity, Severity::High);
    }

    #[test]
    fn test_sorted_by_severity_then_catalogue() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        // depth (low) and lean (medium) both fire at target
        let violations = FormAnalyzer::analyze(
            &squat(30.0, 60.0, 0.0),
            ExerciseState::Target,
            ExerciseType::Squat,
            &profile,
        );
        let rules: Vec<_> = violations.iter().map(|v| v.rule).collect();
        assert_eq!(rules, vec![FormRule::TorsoOverLean, FormRule::ExcessiveDepth]);
    }

    #[test]
    fn test_absent_angle_never_fires() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        let angles = ExerciseAngles::new(ExerciseType::Squat, BodySide::Left)
            .with(AngleName::Knee, 90.0);
        assert!(
            FormAnalyzer::analyze(&angles, ExerciseState::Target, ExerciseType::Squat, &profile)
                .is_empty()
        );
    }
}
