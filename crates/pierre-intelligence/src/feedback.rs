// ABOUTME: Adaptive feedback engine turning violations and rep events into coaching messages
// ABOUTME: Prioritises text, gates speech by severity floor and frequency, phrases rep milestones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Adaptive Feedback Engine
//!
//! Text feedback is produced every frame; speech is rationed. A correction is
//! spoken only when its severity meets the profile's priority floor and at least
//! `feedback_frequency_ms` have passed on the session clock since the last
//! spoken message. Rep summaries skip the frequency gate, once per rep.
//! A clean frame at the bottom of the movement gets a text-only depth cue
//! naming the exercise's primary angle.

use pierre_core::constants::feedback::{MAX_SECONDARY_MESSAGES, MILESTONE_INTERVAL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::angles::ExerciseAngles;
use crate::camera_view::ViewAnalysis;
use crate::config::ThresholdProfile;
use crate::form_analysis::FormViolation;
use crate::rep_counter::{RepCountResult, RepQuality};
use crate::rules::{FormRule, Severity};
use crate::state_machine::{ExerciseState, StateGraph};

/// Category of a feedback message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Form correction derived from a violation
    Correction,
    /// Completed-rep summary
    RepSummary,
    /// Camera positioning advice
    Positioning,
    /// Session lifecycle announcement
    Announcement,
    /// Text-only phase cue on a clean frame
    Cue,
}

/// One message for display or speech
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    /// Category
    pub kind: MessageKind,
    /// Text to show or speak
    pub text: String,
    /// Severity of the underlying violation, for corrections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Rule behind a correction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<FormRule>,
}

impl FeedbackMessage {
    /// Correction message for a violation
    #[must_use]
    pub fn correction(violation: &FormViolation) -> Self {
        Self {
            kind: MessageKind::Correction,
            text: violation.correction_hint.clone(),
            severity: Some(violation.severity),
            rule: Some(violation.rule),
        }
    }

    /// Message without an associated violation
    #[must_use]
    pub fn plain(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            severity: None,
            rule: None,
        }
    }
}

/// Feedback for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    /// All text messages, highest priority first
    pub messages: Vec<FeedbackMessage>,
    /// Messages approved for speech, in playback order
    pub speech: Vec<FeedbackMessage>,
    /// Whether anything should be spoken now
    pub should_speak: bool,
    /// Rep summary text when a rep completed this frame
    pub rep_summary: Option<String>,
}

impl FeedbackResponse {
    /// Highest-priority text, if any
    #[must_use]
    pub fn primary(&self) -> Option<&FeedbackMessage> {
        self.messages.first()
    }
}

/// Everything the engine looks at for one frame
#[derive(Debug, Clone, Copy)]
pub struct FeedbackInput<'a> {
    /// Violations, most severe first
    pub violations: &'a [FormViolation],
    /// Current exercise state
    pub state: ExerciseState,
    /// Joint angles, absent on low-confidence frames
    pub angles: Option<&'a ExerciseAngles>,
    /// Camera view verdict
    pub view: Option<&'a ViewAnalysis>,
    /// Rep completed this frame
    pub rep: Option<&'a RepCountResult>,
    /// Profile captured for this frame
    pub profile: &'a ThresholdProfile,
    /// Frame timestamp on the session clock
    pub timestamp_ms: u64,
}

/// Stateful speech gate and message builder
#[derive(Debug, Clone, Default)]
pub struct FeedbackEngine {
    last_spoken_at_ms: Option<u64>,
    last_summarised_rep: Option<u32>,
}

impl FeedbackEngine {
    /// Engine with an open gate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget speech history
    pub fn reset(&mut self) {
        self.last_spoken_at_ms = None;
        self.last_summarised_rep = None;
    }

    /// Restart the frequency window at a profile switch
    pub fn note_profile_change(&mut self, timestamp_ms: u64) {
        self.last_spoken_at_ms = Some(timestamp_ms);
    }

    /// Whether the frequency window has elapsed at `timestamp_ms`
    #[must_use]
    pub fn gate_open(&self, timestamp_ms: u64, frequency_ms: u64) -> bool {
        match self.last_spoken_at_ms {
            Some(last) => timestamp_ms.saturating_sub(last) >= frequency_ms,
            None => true,
        }
    }

    /// Build the feedback for one frame
    pub fn respond(&mut self, input: &FeedbackInput<'_>) -> FeedbackResponse {
        let profile = input.profile;
        let mut response = FeedbackResponse::default();

        let corrections: Vec<FeedbackMessage> = input
            .violations
            .iter()
            .take(1 + MAX_SECONDARY_MESSAGES)
            .map(FeedbackMessage::correction)
            .collect();
        response.messages.extend(corrections.iter().cloned());

        if let Some(rep) = input.rep {
            if self.last_summarised_rep != Some(rep.sequence) {
                let summary = rep_summary(rep);
                let message = FeedbackMessage::plain(MessageKind::RepSummary, summary.clone());
                response.messages.push(message.clone());
                response.speech.push(message);
                response.rep_summary = Some(summary);
                self.last_summarised_rep = Some(rep.sequence);
            }
        }

        if let Some(primary) = input.violations.first() {
            if primary.severity >= profile.priority_floor
                && self.gate_open(input.timestamp_ms, profile.feedback_frequency_ms)
            {
                response.speech.push(FeedbackMessage::correction(primary));
            }
        }

        if let Some(view) = input.view.filter(|view| view.view.is_poor()) {
            if let Some(advice) = view.top_recommendation() {
                response
                    .messages
                    .push(FeedbackMessage::plain(MessageKind::Positioning, advice));
            }
        }

        if let Some(cue) = depth_cue(input) {
            response.messages.push(cue);
        }

        if !response.speech.is_empty() {
            self.last_spoken_at_ms = Some(input.timestamp_ms);
            debug!(
                timestamp_ms = input.timestamp_ms,
                state = %input.state,
                spoken = response.speech.len(),
                "Feedback approved for speech"
            );
        }
        response.should_speak = !response.speech.is_empty();
        response
    }
}

fn depth_cue(input: &FeedbackInput<'_>) -> Option<FeedbackMessage> {
    if !input.violations.is_empty() || input.state != ExerciseState::Target {
        return None;
    }
    let primary = StateGraph::for_exercise(input.profile.exercise).primary_angle;
    let degrees = input.angles?.get(primary)?;
    Some(FeedbackMessage::plain(
        MessageKind::Cue,
        format!("Good depth, {} at {degrees:.0}°", primary.as_str()),
    ))
}

/// Spoken summary for a completed rep, with milestone phrasing
#[must_use]
pub fn rep_summary(rep: &RepCountResult) -> String {
    let n = rep.sequence;
    if !rep.quality.is_correct() {
        let hint = rep
            .top_violation()
            .map_or("Control the tempo", |v| v.correction_hint.as_str());
        return format!("Rep {n} needs work. {hint}.");
    }
    match n {
        1 => "First rep done! Great start!".to_owned(),
        10 => "Ten reps! You're crushing it!".to_owned(),
        _ if n % MILESTONE_INTERVAL == 0 => format!("{n} reps! Keep it up!"),
        _ if rep.quality == RepQuality::Excellent => format!("Rep {n}. Perfect form!"),
        _ => format!("Rep {n}. Good rep!"),
    }
}

/// Announcement spoken when an exercise starts
#[must_use]
pub fn start_announcement(exercise_name: &str) -> FeedbackMessage {
    FeedbackMessage::plain(
        MessageKind::Announcement,
        format!("Starting {exercise_name}. Get into position!"),
    )
}
