// ABOUTME: Main library entry point for the Pierre form coach runtime
// ABOUTME: Wires pose analysis into a per-frame pipeline with sessions, profiles, and audio
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Pierre Form Coach
//!
//! Real-time exercise form analysis. A host feeds pose landmark frames from an
//! external pose estimator into a [`session::WorkoutSession`]; each frame yields
//! a [`pipeline::FrameAnalysis`] with joint angles, the exercise phase, form
//! violations, completed reps and throttled coaching feedback. Spoken feedback is
//! delivered by a separate cancelable audio task.
//!
//! ## Architecture
//!
//! - **config**: environment configuration and the hot-swappable threshold store
//! - **audio**: FIFO speech delivery with flush, mute and stale-message dropping
//! - **pipeline**: the synchronous per-frame analysis chain
//! - **session**: session lifecycle and counters
//! - **logging**: `tracing` subscriber setup
//!
//! The analysis algorithms live in the `pierre-intelligence` crate and the shared
//! models and errors in `pierre-core`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pierre_form_coach::audio::{AudioDispatcher, TracingSpeechSink};
//! use pierre_form_coach::config::{FormCoachConfig, ThresholdStore};
//! use pierre_form_coach::errors::AppResult;
//! use pierre_form_coach::session::WorkoutSession;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = FormCoachConfig::from_env()?;
//!     let store = Arc::new(ThresholdStore::new(
//!         config.load_profile_table()?,
//!         config.default_exercise,
//!         config.default_mode,
//!     )?);
//!     let audio = AudioDispatcher::spawn(Arc::new(TracingSpeechSink::new()), config.audio);
//!     let session = WorkoutSession::start(store, audio);
//!     let summary = session.stop().await;
//!     println!("{}", summary.summary);
//!     Ok(())
//! }
//! ```

/// Speech delivery task and sinks
pub mod audio;

/// Configuration from the environment and the threshold store
pub mod config;

/// Error types
pub mod errors;

/// Logging configuration
pub mod logging;

/// Per-frame analysis pipeline
pub mod pipeline;

/// Workout session lifecycle
pub mod session;
