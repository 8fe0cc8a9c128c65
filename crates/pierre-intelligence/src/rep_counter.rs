// ABOUTME: Repetition counter accumulating violations across a full s1-s2-s3-s2-s1 cycle
// ABOUTME: Grades completed reps and computes a 0-100 form score from violations and timing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Rep Counter
//!
//! A cycle follows the exercise's [`StateGraph::cycle`]: it opens on the first
//! edge (`s1 -> s2`), must visit s3, and closes on the last edge (`s2 -> s1`).
//! Dips that return to s1 without reaching s3 are discarded, as is any open
//! cycle interrupted by a low-confidence recovery. Each completed cycle yields
//! exactly one [`RepCountResult`].

use std::collections::BTreeMap;

use pierre_core::constants::form_score::{
    HIGH_PENALTY, LOW_PENALTY, MEDIUM_PENALTY, PERFECT, TIMING_PENALTY,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{RepTiming, ThresholdProfile};
use crate::form_analysis::FormViolation;
use crate::rules::{FormRule, Severity};
use crate::state_machine::{StateGraph, StateStep, TransitionKind};

/// Quality grade of one repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepQuality {
    /// High-severity fault
    Poor,
    /// Several medium faults or timing outside the expected band
    NeedsImprovement,
    /// Minor faults only
    Good,
    /// Clean and well paced
    Excellent,
}

impl RepQuality {
    /// Whether the rep counts toward correct reps and streaks
    #[must_use]
    pub const fn is_correct(&self) -> bool {
        matches!(self, Self::Excellent | Self::Good)
    }

    /// Stable identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::NeedsImprovement => "needs_improvement",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

/// One completed repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepCountResult {
    /// 1-based rep number within the exercise
    pub sequence: u32,
    /// Timestamp of the `s1 -> s2` frame
    pub started_at_ms: u64,
    /// Timestamp of the `s2 -> s1` frame
    pub ended_at_ms: u64,
    /// `ended_at_ms - started_at_ms`
    pub duration_ms: u64,
    /// Deduplicated violations, most severe first
    pub violations: Vec<FormViolation>,
    /// Quality grade
    pub quality: RepQuality,
    /// 0-100 form score
    pub form_score: u8,
}

impl RepCountResult {
    /// Most severe violation of the rep
    #[must_use]
    pub fn top_violation(&self) -> Option<&FormViolation> {
        self.violations.first()
    }
}

/// Grade a rep from its violations and duration
#[must_use]
pub fn grade_rep(violations: &[FormViolation], duration_ms: u64, timing: &RepTiming) -> RepQuality {
    let medium = violations
        .iter()
        .filter(|v| v.severity == Severity::Medium)
        .count();

    if violations.iter().any(|v| v.severity == Severity::High) {
        RepQuality::Poor
    } else if medium >= 2 || !timing.within_expected(duration_ms) {
        RepQuality::NeedsImprovement
    } else if violations.is_empty() && timing.within_tight(duration_ms) {
        RepQuality::Excellent
    } else {
        RepQuality::Good
    }
}

/// 0-100 score: penalties per violation plus a pacing penalty outside the tight band
#[must_use]
pub fn form_score(violations: &[FormViolation], duration_ms: u64, timing: &RepTiming) -> u8 {
    let mut penalty: u32 = violations
        .iter()
        .map(|v| match v.severity {
            Severity::Low => u32::from(LOW_PENALTY),
            Severity::Medium => u32::from(MEDIUM_PENALTY),
            Severity::High => u32::from(HIGH_PENALTY),
        })
        .sum();
    if !timing.within_tight(duration_ms) {
        penalty += u32::from(TIMING_PENALTY);
    }
    let score = u32::from(PERFECT).saturating_sub(penalty);
    u8::try_from(score).unwrap_or(PERFECT)
}

#[derive(Debug, Clone)]
struct OpenCycle {
    started_at_ms: u64,
    /// Leading states of the exercise's rep cycle matched so far
    visited: usize,
    violations: BTreeMap<FormRule, FormViolation>,
}

impl OpenCycle {
    /// Keep the most severe occurrence of each rule
    fn absorb(&mut self, violations: &[FormViolation]) {
        for violation in violations {
            self.violations
                .entry(violation.rule)
                .and_modify(|kept| {
                    if violation.severity > kept.severity {
                        *kept = violation.clone();
                    }
                })
                .or_insert_with(|| violation.clone());
        }
    }
}

/// Folds state steps and violations into completed reps
#[derive(Debug, Clone, Default)]
pub struct RepCounter {
    open: Option<OpenCycle>,
    completed: u32,
}

impl RepCounter {
    /// Counter with no reps
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed reps so far
    #[must_use]
    pub const fn completed(&self) -> u32 {
        self.completed
    }

    /// Whether a cycle is in progress
    #[must_use]
    pub const fn in_cycle(&self) -> bool {
        self.open.is_some()
    }

    /// Drop any open cycle and zero the count
    pub fn reset(&mut self) {
        self.open = None;
        self.completed = 0;
    }

    /// Feed one frame's state step and violations
    pub fn update(
        &mut self,
        step: &StateStep,
        violations: &[FormViolation],
        profile: &ThresholdProfile,
    ) -> Option<RepCountResult> {
        match step.kind {
            TransitionKind::Recovered => {
                if self.open.take().is_some() {
                    debug!(timestamp_ms = step.timestamp_ms, "Recovery discarded open rep cycle");
                }
                None
            }
            TransitionKind::OutOfOrder => None,
            TransitionKind::Advanced => self.advance(step, violations, profile),
            TransitionKind::Held | TransitionKind::Ignored | TransitionKind::LowConfidence => {
                if let Some(cycle) = self.open.as_mut() {
                    cycle.absorb(violations);
                }
                None
            }
        }
    }

    fn advance(
        &mut self,
        step: &StateStep,
        violations: &[FormViolation],
        profile: &ThresholdProfile,
    ) -> Option<RepCountResult> {
        let cycle = StateGraph::for_exercise(profile.exercise).cycle;

        let Some(open) = self.open.as_mut() else {
            if cycle.starts_with(&[step.previous, step.current]) {
                let mut opened = OpenCycle {
                    started_at_ms: step.timestamp_ms,
                    visited: 2,
                    violations: BTreeMap::new(),
                };
                opened.absorb(violations);
                self.open = Some(opened);
            }
            return None;
        };

        if cycle.get(open.visited) == Some(&step.current) {
            open.visited += 1;
        } else if cycle.first() == Some(&step.current) {
            self.open = None;
            debug!(timestamp_ms = step.timestamp_ms, "Partial rep discarded");
            return None;
        } else if let Some(position) = cycle
            .iter()
            .take(open.visited)
            .rposition(|state| *state == step.current)
        {
            // bouncing between inner phases rewinds to the revisited state
            open.visited = position + 1;
        }

        if open.visited == cycle.len() {
            let finished = self.open.take()?;
            return Some(self.complete(finished, step.timestamp_ms, profile));
        }
        open.absorb(violations);
        None
    }

    fn complete(&mut self, cycle: OpenCycle, ended_at_ms: u64, profile: &ThresholdProfile) -> RepCountResult {
        self.completed += 1;
        let duration_ms = ended_at_ms.saturating_sub(cycle.started_at_ms);

        let mut violations: Vec<FormViolation> = cycle.violations.into_values().collect();
        violations.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.rule.catalogue_index().cmp(&b.rule.catalogue_index()))
        });

        let quality = grade_rep(&violations, duration_ms, &profile.timing);
        let form_score = form_score(&violations, duration_ms, &profile.timing);
        info!(
            exercise = %profile.exercise,
            sequence = self.completed,
            duration_ms,
            quality = quality.as_str(),
            form_score,
            violations = violations.len(),
            "Rep completed"
        );

        RepCountResult {
            sequence: self.completed,
            started_at_ms: cycle.started_at_ms,
            ended_at_ms,
            duration_ms,
            violations,
            quality,
            form_score,
        }
    }
}
