// ABOUTME: Workout session lifecycle owning the frame pipeline, counters and audio handle
// ABOUTME: Start announces the exercise, frames fold reps into counters, stop flushes speech
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pierre_core::models::{ExerciseType, LandmarkFrame, SkillMode};
use pierre_intelligence::feedback::start_announcement;
use pierre_intelligence::RepCountResult;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::audio::AudioDispatcher;
use crate::config::{ProfileHandle, ThresholdStore};
use crate::errors::AppResult;
use crate::pipeline::{FrameAnalysis, FramePipeline};

/// Rep totals for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    /// Completed reps across every exercise
    pub total_reps: u32,
    /// Reps graded good or excellent
    pub correct_reps: u32,
    /// Consecutive correct reps ending at the latest rep
    pub current_streak: u32,
    /// Longest run of correct reps
    pub best_streak: u32,
    /// Session start
    pub started_at: DateTime<Utc>,
}

impl SessionCounters {
    /// Zeroed counters starting at `started_at`
    #[must_use]
    pub const fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            total_reps: 0,
            correct_reps: 0,
            current_streak: 0,
            best_streak: 0,
            started_at,
        }
    }

    /// Count one completed rep
    pub fn fold(&mut self, rep: &RepCountResult) {
        self.total_reps = self.total_reps.saturating_add(1);
        if rep.quality.is_correct() {
            self.correct_reps = self.correct_reps.saturating_add(1);
            self.current_streak = self.current_streak.saturating_add(1);
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.current_streak = 0;
        }
    }

    /// Share of reps graded correct, in percent
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_reps == 0 {
            return 0;
        }
        self.correct_reps.saturating_mul(100) / self.total_reps
    }
}

/// Result of stopping a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: Uuid,
    /// Session start
    pub started_at: DateTime<Utc>,
    /// Session end
    pub ended_at: DateTime<Utc>,
    /// Final counters
    pub counters: SessionCounters,
    /// One-line summary for display
    pub summary: String,
}

/// One workout, from start to stop
pub struct WorkoutSession {
    id: Uuid,
    store: Arc<ThresholdStore>,
    audio: AudioDispatcher,
    pipeline: FramePipeline,
    counters: SessionCounters,
}

impl WorkoutSession {
    /// Start a session on the store's active exercise
    ///
    /// Stages and counters start from their initial values and the exercise is
    /// announced.
    #[must_use]
    pub fn start(store: Arc<ThresholdStore>, audio: AudioDispatcher) -> Self {
        let active = store.active();
        let started_at = Utc::now();
        let id = Uuid::new_v4();
        info!(
            session_id = %id,
            exercise = %active.exercise(),
            mode = %active.mode(),
            "Workout session started"
        );
        audio.enqueue(start_announcement(active.exercise().display_name()).text);
        Self {
            id,
            store,
            audio,
            pipeline: FramePipeline::new(active.exercise()),
            counters: SessionCounters::new(started_at),
        }
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Threshold store shared with configuration callers
    #[must_use]
    pub fn store(&self) -> &Arc<ThresholdStore> {
        &self.store
    }

    /// Counters so far
    #[must_use]
    pub const fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Analyse one frame and queue any approved speech
    ///
    /// The active profile is captured once and used for the whole frame.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameAnalysis {
        let handle = self.store.active();
        let analysis = self.pipeline.process(frame, &handle);
        if let Some(rep) = &analysis.rep {
            self.counters.fold(rep);
        }
        for message in &analysis.feedback.speech {
            self.audio.enqueue(message.text.clone());
        }
        analysis
    }

    /// Switch exercise or mode; takes effect on the next frame
    ///
    /// Speech already queued keeps playing. A new exercise is announced.
    ///
    /// # Errors
    ///
    /// Returns a configuration-missing error if the combination has no profile
    pub fn switch(&self, exercise: ExerciseType, mode: SkillMode) -> AppResult<ProfileHandle> {
        let previous = self.store.active().exercise();
        let handle = self.store.switch_active(exercise, mode)?;
        if previous != exercise {
            self.audio
                .enqueue(start_announcement(exercise.display_name()).text);
        }
        Ok(handle)
    }

    /// Whether speech is playing right now
    #[must_use]
    pub fn is_audio_playing(&self) -> bool {
        self.audio.is_playing()
    }

    /// Mute or unmute speech; muting drops queued speech
    pub fn set_muted(&self, muted: bool) {
        self.audio.set_muted(muted);
    }

    /// Stop the session, cancelling all speech, and return its counters
    pub async fn stop(self) -> SessionSummary {
        self.audio.flush();
        self.audio.shutdown().await;

        let counters = self.counters;
        let summary = format!(
            "Workout complete: {} reps, {} with good form ({}%). Best streak {}.",
            counters.total_reps,
            counters.correct_reps,
            counters.accuracy_percent(),
            counters.best_streak
        );
        info!(session_id = %self.id, total_reps = counters.total_reps, "Workout session stopped");
        SessionSummary {
            session_id: self.id,
            started_at: counters.started_at,
            ended_at: Utc::now(),
            counters,
            summary,
        }
    }
}
