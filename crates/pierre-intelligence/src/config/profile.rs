// ABOUTME: Threshold profile types for one exercise type and skill mode combination
// ABOUTME: Phase bounds, per-state rule bands, rep timing, feedback gating, and overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Threshold profiles.
//!
//! A [`ThresholdProfile`] is an immutable value. Overrides never mutate a
//! profile in place: [`ThresholdProfile::with_override`] returns a validated
//! copy, and the shared defaults stay untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pierre_core::models::{ExerciseType, SkillMode};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::rules::{FormRule, Severity};
use crate::state_machine::ExerciseState;

/// Inclusive angle band in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBand {
    /// Lowest acceptable angle
    pub min_deg: f64,
    /// Highest acceptable angle
    pub max_deg: f64,
}

impl ToleranceBand {
    /// Create a band
    #[must_use]
    pub const fn new(min_deg: f64, max_deg: f64) -> Self {
        Self { min_deg, max_deg }
    }

    /// Whether the angle sits inside the band
    #[must_use]
    pub fn contains(&self, degrees: f64) -> bool {
        (self.min_deg..=self.max_deg).contains(&degrees)
    }

    /// Distance outside the band, 0 when inside
    #[must_use]
    pub fn deviation(&self, degrees: f64) -> f64 {
        if degrees < self.min_deg {
            self.min_deg - degrees
        } else if degrees > self.max_deg {
            degrees - self.max_deg
        } else {
            0.0
        }
    }

    fn validate(&self, label: &str) -> Result<(), ConfigError> {
        if !self.min_deg.is_finite() || !self.max_deg.is_finite() {
            return Err(ConfigError::ValueOutOfRange(format!(
                "{label}: band bounds must be finite"
            )));
        }
        if self.min_deg < 0.0 || self.max_deg > 180.0 {
            return Err(ConfigError::ValueOutOfRange(format!(
                "{label}: band must lie within 0..=180 degrees"
            )));
        }
        if self.min_deg > self.max_deg {
            return Err(ConfigError::InvalidRange(format!(
                "{label}: min_deg {} exceeds max_deg {}",
                self.min_deg, self.max_deg
            )));
        }
        Ok(())
    }
}

/// Per-state bands for one rule; an absent band disables the rule in that state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleTolerance {
    /// Band while in s1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<ToleranceBand>,
    /// Band while in s2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<ToleranceBand>,
    /// Band while in s3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ToleranceBand>,
}

impl RuleTolerance {
    /// Band active in `state`
    #[must_use]
    pub const fn for_state(&self, state: ExerciseState) -> Option<&ToleranceBand> {
        match state {
            ExerciseState::Start => self.start.as_ref(),
            ExerciseState::Transition => self.transition.as_ref(),
            ExerciseState::Target => self.target.as_ref(),
        }
    }

    fn for_state_mut(&mut self, state: ExerciseState) -> Option<&mut ToleranceBand> {
        match state {
            ExerciseState::Start => self.start.as_mut(),
            ExerciseState::Transition => self.transition.as_mut(),
            ExerciseState::Target => self.target.as_mut(),
        }
    }
}

/// Primary-angle bounds that classify a frame into a state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseBounds {
    /// At or above this angle the user is in s1
    pub start_min_deg: f64,
    /// At or below this angle the user is in s3
    pub target_max_deg: f64,
}

/// Rep duration bands in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepTiming {
    /// Shortest acceptable rep
    pub expected_min_ms: u64,
    /// Longest acceptable rep
    pub expected_max_ms: u64,
    /// Shortest ideal rep
    pub tight_min_ms: u64,
    /// Longest ideal rep
    pub tight_max_ms: u64,
}

impl RepTiming {
    /// Duration inside the acceptable band
    #[must_use]
    pub const fn within_expected(&self, duration_ms: u64) -> bool {
        duration_ms >= self.expected_min_ms && duration_ms <= self.expected_max_ms
    }

    /// Duration inside the ideal band
    #[must_use]
    pub const fn within_tight(&self, duration_ms: u64) -> bool {
        duration_ms >= self.tight_min_ms && duration_ms <= self.tight_max_ms
    }
}

/// Numeric thresholds for one (exercise type, skill mode) combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProfile {
    /// Exercise this profile applies to
    pub exercise: ExerciseType,
    /// Skill mode this profile applies to
    pub mode: SkillMode,
    /// State classification bounds for the primary angle
    pub phases: PhaseBounds,
    /// Per-rule tolerance bands
    pub rules: BTreeMap<FormRule, RuleTolerance>,
    /// Rep timing bands
    pub timing: RepTiming,
    /// Minimum milliseconds between spoken corrections
    pub feedback_frequency_ms: u64,
    /// Minimum severity that may be spoken
    pub priority_floor: Severity,
    /// Minimum landmark visibility for angle computation
    pub min_visibility: f64,
    /// Degrees beyond a band that escalate severity one level
    pub escalation_margin_deg: f64,
}

impl ThresholdProfile {
    /// Band for `rule` in `state`, if the rule is active there
    #[must_use]
    pub fn band(&self, rule: FormRule, state: ExerciseState) -> Option<&ToleranceBand> {
        self.rules.get(&rule).and_then(|tolerance| tolerance.for_state(state))
    }

    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// Returns an error if phase bounds, bands, timing or gating values are inconsistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        let label = format!("{}/{}", self.exercise, self.mode);
        let PhaseBounds {
            start_min_deg,
            target_max_deg,
        } = self.phases;
        if !(0.0..=180.0).contains(&start_min_deg) || !(0.0..=180.0).contains(&target_max_deg) {
            return Err(ConfigError::ValueOutOfRange(format!(
                "{label}: phase bounds must lie within 0..=180 degrees"
            )));
        }
        if start_min_deg <= target_max_deg {
            return Err(ConfigError::InvalidRange(format!(
                "{label}: start_min_deg {start_min_deg} must exceed target_max_deg {target_max_deg}"
            )));
        }

        for (rule, tolerance) in &self.rules {
            if rule.exercise() != self.exercise {
                return Err(ConfigError::InvalidRange(format!(
                    "{label}: rule {rule} belongs to {}",
                    rule.exercise()
                )));
            }
            for state in ExerciseState::ALL {
                if let Some(band) = tolerance.for_state(state) {
                    band.validate(&format!("{label} {rule}.{}", state.key()))?;
                }
            }
        }

        let timing = self.timing;
        if timing.expected_min_ms > timing.expected_max_ms {
            return Err(ConfigError::InvalidRange(format!(
                "{label}: expected timing band is inverted"
            )));
        }
        if timing.tight_min_ms > timing.tight_max_ms
            || timing.tight_min_ms < timing.expected_min_ms
            || timing.tight_max_ms > timing.expected_max_ms
        {
            return Err(ConfigError::InvalidRange(format!(
                "{label}: tight timing band must sit inside the expected band"
            )));
        }

        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(ConfigError::ValueOutOfRange(format!(
                "{label}: min_visibility must be within 0..=1"
            )));
        }
        if !self.escalation_margin_deg.is_finite() || self.escalation_margin_deg < 0.0 {
            return Err(ConfigError::ValueOutOfRange(format!(
                "{label}: escalation_margin_deg must be non-negative"
            )));
        }
        Ok(())
    }

    /// Read a numeric threshold
    #[must_use]
    pub fn value(&self, key: &ThresholdKey) -> Option<f64> {
        match *key {
            ThresholdKey::StartMinDeg => Some(self.phases.start_min_deg),
            ThresholdKey::TargetMaxDeg => Some(self.phases.target_max_deg),
            ThresholdKey::ExpectedMinMs => Some(self.timing.expected_min_ms as f64),
            ThresholdKey::ExpectedMaxMs => Some(self.timing.expected_max_ms as f64),
            ThresholdKey::TightMinMs => Some(self.timing.tight_min_ms as f64),
            ThresholdKey::TightMaxMs => Some(self.timing.tight_max_ms as f64),
            ThresholdKey::FeedbackFrequencyMs => Some(self.feedback_frequency_ms as f64),
            ThresholdKey::MinVisibility => Some(self.min_visibility),
            ThresholdKey::EscalationMarginDeg => Some(self.escalation_margin_deg),
            ThresholdKey::RuleBand { rule, state, bound } => {
                self.band(rule, state).map(|band| match bound {
                    BandBound::Min => band.min_deg,
                    BandBound::Max => band.max_deg,
                })
            }
        }
    }

    /// Copy of this profile with one threshold replaced, validated
    ///
    /// # Errors
    ///
    /// Returns an error if the key is inactive for this profile or the result fails validation
    pub fn with_override(&self, key: &ThresholdKey, value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::ValueOutOfRange(format!(
                "{key}: value must be finite"
            )));
        }
        let millis = || -> Result<u64, ConfigError> {
            if value < 0.0 {
                return Err(ConfigError::ValueOutOfRange(format!(
                    "{key}: value must be non-negative"
                )));
            }
            Ok(value.round() as u64)
        };

        let mut profile = self.clone();
        match *key {
            ThresholdKey::StartMinDeg => profile.phases.start_min_deg = value,
            ThresholdKey::TargetMaxDeg => profile.phases.target_max_deg = value,
            ThresholdKey::ExpectedMinMs => profile.timing.expected_min_ms = millis()?,
            ThresholdKey::ExpectedMaxMs => profile.timing.expected_max_ms = millis()?,
            ThresholdKey::TightMinMs => profile.timing.tight_min_ms = millis()?,
            ThresholdKey::TightMaxMs => profile.timing.tight_max_ms = millis()?,
            ThresholdKey::FeedbackFrequencyMs => profile.feedback_frequency_ms = millis()?,
            ThresholdKey::MinVisibility => profile.min_visibility = value,
            ThresholdKey::EscalationMarginDeg => profile.escalation_margin_deg = value,
            ThresholdKey::RuleBand { rule, state, bound } => {
                let band = profile
                    .rules
                    .get_mut(&rule)
                    .and_then(|tolerance| tolerance.for_state_mut(state))
                    .ok_or_else(|| {
                        ConfigError::UnknownKey(format!(
                            "{key} is not active for {}/{}",
                            self.exercise, self.mode
                        ))
                    })?;
                match bound {
                    BandBound::Min => band.min_deg = value,
                    BandBound::Max => band.max_deg = value,
                }
            }
        }
        profile.validate()?;
        Ok(profile)
    }
}

/// Which end of a band a key addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BandBound {
    /// `min_deg`
    Min,
    /// `max_deg`
    Max,
}

/// Address of one numeric threshold inside a profile
///
/// Textual form is dotted, e.g. `phases.start_min_deg`, `timing.tight_max_ms`,
/// `feedback_frequency_ms` or `rules.knee_valgus.target.max_deg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThresholdKey {
    /// `phases.start_min_deg`
    StartMinDeg,
    /// `phases.target_max_deg`
    TargetMaxDeg,
    /// `timing.expected_min_ms`
    ExpectedMinMs,
    /// `timing.expected_max_ms`
    ExpectedMaxMs,
    /// `timing.tight_min_ms`
    TightMinMs,
    /// `timing.tight_max_ms`
    TightMaxMs,
    /// `feedback_frequency_ms`
    FeedbackFrequencyMs,
    /// `min_visibility`
    MinVisibility,
    /// `escalation_margin_deg`
    EscalationMarginDeg,
    /// `rules.<rule>.<state>.<min_deg|max_deg>`
    RuleBand {
        /// Rule whose band is addressed
        rule: FormRule,
        /// State whose band is addressed
        state: ExerciseState,
        /// Band end
        bound: BandBound,
    },
}

impl FromStr for ThresholdKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "phases.start_min_deg" => Self::StartMinDeg,
            "phases.target_max_deg" => Self::TargetMaxDeg,
            "timing.expected_min_ms" => Self::ExpectedMinMs,
            "timing.expected_max_ms" => Self::ExpectedMaxMs,
            "timing.tight_min_ms" => Self::TightMinMs,
            "timing.tight_max_ms" => Self::TightMaxMs,
            "feedback_frequency_ms" => Self::FeedbackFrequencyMs,
            "min_visibility" => Self::MinVisibility,
            "escalation_margin_deg" => Self::EscalationMarginDeg,
            other => parse_rule_band(other).ok_or_else(|| ConfigError::UnknownKey(s.to_owned()))?,
        };
        Ok(key)
    }
}

fn parse_rule_band(key: &str) -> Option<ThresholdKey> {
    let mut parts = key.split('.');
    if parts.next()? != "rules" {
        return None;
    }
    let rule = FormRule::from_key(parts.next()?)?;
    let state = ExerciseState::from_key(parts.next()?)?;
    let bound = match parts.next()? {
        "min_deg" => BandBound::Min,
        "max_deg" => BandBound::Max,
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(ThresholdKey::RuleBand { rule, state, bound })
}

impl fmt::Display for ThresholdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartMinDeg => f.write_str("phases.start_min_deg"),
            Self::TargetMaxDeg => f.write_str("phases.target_max_deg"),
            Self::ExpectedMinMs => f.write_str("timing.expected_min_ms"),
            Self::ExpectedMaxMs => f.write_str("timing.expected_max_ms"),
            Self::TightMinMs => f.write_str("timing.tight_min_ms"),
            Self::TightMaxMs => f.write_str("timing.tight_max_ms"),
            Self::FeedbackFrequencyMs => f.write_str("feedback_frequency_ms"),
            Self::MinVisibility => f.write_str("min_visibility"),
            Self::EscalationMarginDeg => f.write_str("escalation_margin_deg"),
            Self::RuleBand { rule, state, bound } => {
                let bound = match bound {
                    BandBound::Min => "min_deg",
                    BandBound::Max => "max_deg",
                };
                write!(f, "rules.{rule}.{}.{bound}", state.key())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::builtin_profile;

    fn squat_beginner() -> ThresholdProfile {
        builtin_profile(ExerciseType::Squat, SkillMode::Beginner)
    }

    #[test]
    fn test_band_deviation() {
        let band = ToleranceBand::new(10.0, 20.0);
        assert!(band.contains(15.0));
        assert!(band.deviation(15.0).abs() < f64::EPSILON);
        assert!((band.deviation(25.0) - 5.0).abs() < f64::EPSILON);
        assert!((band.deviation(4.0) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_key_parsing_round_trips() {
        for text in [
            "phases.start_min_deg",
            "timing.tight_max_ms",
            "feedback_frequency_ms",
            "rules.knee_valgus.target.max_deg",
        ] {
            let key: ThresholdKey = text.parse().unwrap();
            assert_eq!(key.to_string(), text);
        }
        assert!("rules.knee_valgus.s3.max_deg".parse::<ThresholdKey>().is_ok());
        assert!("rules.knee_valgus.target".parse::<ThresholdKey>().is_err());
        assert!("phases.bogus".parse::<ThresholdKey>().is_err());
    }

    #[test]
    fn test_override_returns_copy() {
        let original = squat_beginner();
        let key: ThresholdKey = "rules.knee_valgus.target.max_deg".parse().unwrap();
        let updated = original.with_override(&key, 10.0).unwrap();
        assert!((updated.value(&key).unwrap() - 10.0).abs() < f64::EPSILON);
        assert!((original.value(&key).unwrap() - 10.0).abs() > f64::EPSILON);
    }

    #[test]
    fn test_override_rejects_inconsistent_result() {
        let original = squat_beginner();
        let result = original.with_override(&ThresholdKey::TargetMaxDeg, 170.0);
        assert!(matches!(result, Err(ConfigError::InvalidRange(_))));
    }

    #[test]
    fn test_override_of_inactive_band_is_unknown_key() {
        let original = squat_beginner();
        let key: ThresholdKey = "rules.knee_valgus.start.max_deg".parse().unwrap();
        assert!(matches!(
            original.with_override(&key, 5.0),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
