// ABOUTME: Synchronous per-frame analysis pipeline chaining the form-analysis stages
// ABOUTME: Angles, camera view, state, violations, reps and feedback against one profile handle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Frame Pipeline
//!
//! [`FramePipeline::process`] runs every stage for one frame against a single
//! [`ProfileHandle`] and returns before the next frame is accepted. It never
//! suspends; speech approved by the feedback engine is handed to the audio
//! dispatcher by the caller.

use pierre_core::models::{ExerciseType, LandmarkFrame, SkillMode};
use pierre_intelligence::{
    AngleCalculator, AngleOutcome, CameraViewAnalyzer, ExerciseStateMachine, FeedbackEngine,
    FeedbackInput, FeedbackResponse, FormAnalyzer, FormViolation, RepCountResult, RepCounter,
    StateStep, TransitionKind, ViewAnalysis,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProfileHandle;

/// Everything the pipeline produced for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Frame timestamp on the session clock
    pub timestamp_ms: u64,
    /// Exercise analysed
    pub exercise: ExerciseType,
    /// Skill mode of the profile used
    pub mode: SkillMode,
    /// Store version of the profile used
    pub profile_version: u64,
    /// Joint angles, or the landmarks that failed the confidence floor
    pub angles: AngleOutcome,
    /// Camera placement assessment
    pub view: ViewAnalysis,
    /// State machine outcome
    pub step: StateStep,
    /// Violations for the current state, most severe first
    pub violations: Vec<FormViolation>,
    /// Text and speech feedback
    pub feedback: FeedbackResponse,
    /// Rep completed on this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep: Option<RepCountResult>,
}

/// Stateful stages for one session
#[derive(Debug, Clone)]
pub struct FramePipeline {
    state_machine: ExerciseStateMachine,
    rep_counter: RepCounter,
    feedback: FeedbackEngine,
    last_mode: Option<SkillMode>,
}

impl FramePipeline {
    /// Pipeline in its initial state for `exercise`
    #[must_use]
    pub fn new(exercise: ExerciseType) -> Self {
        Self {
            state_machine: ExerciseStateMachine::new(exercise),
            rep_counter: RepCounter::new(),
            feedback: FeedbackEngine::new(),
            last_mode: None,
        }
    }

    /// Exercise the state machine is tracking
    #[must_use]
    pub const fn exercise(&self) -> ExerciseType {
        self.state_machine.exercise()
    }

    /// Reps completed since the last reset or exercise change
    #[must_use]
    pub const fn completed_reps(&self) -> u32 {
        self.rep_counter.completed()
    }

    /// Return every stage to its initial state
    pub fn reset(&mut self) {
        self.state_machine.reset();
        self.rep_counter.reset();
        self.feedback.reset();
        self.last_mode = None;
    }

    /// Analyse one frame against `handle`
    ///
    /// An exercise change in the handle restarts the stateful stages for the new
    /// exercise; a mode change only restarts the speech frequency window.
    pub fn process(&mut self, frame: &LandmarkFrame, handle: &ProfileHandle) -> FrameAnalysis {
        let profile = handle.profile.as_ref();
        let timestamp_ms = frame.timestamp_ms;
        self.follow_profile(handle, timestamp_ms);
        let exercise = profile.exercise;

        let angles = AngleCalculator::calculate(frame, exercise, profile.min_visibility);
        let view = CameraViewAnalyzer::analyze(frame, profile.min_visibility);
        let step = self
            .state_machine
            .step(angles.angles(), profile, timestamp_ms);

        let violations = match angles.angles() {
            Some(measured) if step.kind != TransitionKind::OutOfOrder => {
                FormAnalyzer::analyze(measured, step.current, exercise, profile)
            }
            _ => Vec::new(),
        };

        let rep = self.rep_counter.update(&step, &violations, profile);

        let feedback = self.feedback.respond(&FeedbackInput {
            violations: &violations,
            state: step.current,
            angles: angles.angles(),
            view: Some(&view),
            rep: rep.as_ref(),
            profile,
            timestamp_ms,
        });

        FrameAnalysis {
            timestamp_ms,
            exercise,
            mode: profile.mode,
            profile_version: handle.version,
            angles,
            view,
            step,
            violations,
            feedback,
            rep,
        }
    }

    fn follow_profile(&mut self, handle: &ProfileHandle, timestamp_ms: u64) {
        let exercise = handle.exercise();
        let mode = handle.mode();
        if exercise != self.state_machine.exercise() {
            debug!(from = %self.state_machine.exercise(), to = %exercise, "Exercise changed, restarting pipeline");
            self.state_machine = ExerciseStateMachine::new(exercise);
            self.rep_counter.reset();
            self.feedback.reset();
        } else if self.last_mode.is_some_and(|last| last != mode) {
            debug!(%mode, timestamp_ms, "Skill mode changed, restarting speech window");
            self.feedback.note_profile_change(timestamp_ms);
        }
        self.last_mode = Some(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pierre_intelligence::ExerciseState;

    use crate::config::ThresholdStore;

    #[test]
    fn test_empty_frame_is_low_confidence() {
        let store = ThresholdStore::with_builtin_profiles().unwrap();
        let mut pipeline = FramePipeline::new(ExerciseType::Squat);
        let analysis = pipeline.process(&LandmarkFrame::empty(0), &store.active());
        assert!(analysis.angles.is_low_confidence());
        assert!(analysis.violations.is_empty());
        assert_eq!(analysis.step.current, ExerciseState::Start);
        assert!(analysis.rep.is_none());
    }

    #[test]
    fn test_exercise_change_restarts_state_machine() {
        let store = ThresholdStore::with_builtin_profiles().unwrap();
        let mut pipeline = FramePipeline::new(ExerciseType::Squat);
        pipeline.process(&LandmarkFrame::empty(0), &store.active());

        let handle = store
            .switch_active(ExerciseType::PushUp, SkillMode::Beginner)
            .unwrap();
        let analysis = pipeline.process(&LandmarkFrame::empty(33), &handle);
        assert_eq!(pipeline.exercise(), ExerciseType::PushUp);
        assert_eq!(analysis.exercise, ExerciseType::PushUp);
        assert_eq!(analysis.profile_version, handle.version);
    }
}
