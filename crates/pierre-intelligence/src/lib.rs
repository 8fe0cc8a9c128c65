// ABOUTME: Exercise-form analysis algorithms for the Pierre form coach
// ABOUTME: Angles, camera view, thresholds, phase state machine, form rules, reps, and feedback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Intelligence
//!
//! Pure, frame-at-a-time analysis of pose landmarks. Nothing in this crate does
//! I/O beyond loading a YAML profile table, and nothing spawns tasks. The root
//! crate wires these pieces into a per-frame pipeline.
//!
//! ## Modules
//!
//! - **angles**: joint angles from a `LandmarkFrame`
//! - **`camera_view`**: side/frontal/angled/occluded classification
//! - **config**: threshold profiles and the profile table
//! - **`state_machine`**: s1/s2/s3 phase tracking
//! - **rules**: the static form-rule catalogue
//! - **`form_analysis`**: per-frame violations
//! - **`rep_counter`**: rep cycles, quality grades and form scores
//! - **feedback**: prioritised text and gated speech

/// Joint angle calculation
pub mod angles;
/// Camera view analysis
pub mod camera_view;
/// Threshold profiles and profile tables
pub mod config;
/// Adaptive feedback engine
pub mod feedback;
/// Form analysis service
pub mod form_analysis;
/// Repetition counting and grading
pub mod rep_counter;
/// Form rule catalogue
pub mod rules;
/// Exercise phase state machine
pub mod state_machine;

pub use angles::{AngleCalculator, AngleName, AngleOutcome, BodySide, ExerciseAngles};
pub use camera_view::{CameraViewAnalyzer, ViewAnalysis, ViewType};
pub use config::{ConfigError, ProfileTable, ThresholdKey, ThresholdProfile};
pub use feedback::{FeedbackEngine, FeedbackInput, FeedbackMessage, FeedbackResponse, MessageKind};
pub use form_analysis::{FormAnalyzer, FormViolation};
pub use rep_counter::{RepCountResult, RepCounter, RepQuality};
pub use rules::{FormRule, Severity};
pub use state_machine::{ExerciseState, ExerciseStateMachine, StateStep, TransitionKind};
