// ABOUTME: Spoken feedback delivery for the form coach
// ABOUTME: Speech sink abstraction and the FIFO, cancelable audio dispatcher task
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Audio delivery
//!
//! The frame pipeline never waits on speech. Approved messages are handed to an
//! [`AudioDispatcher`], which feeds a background task that plays them one at a
//! time through a [`SpeechSink`].

/// FIFO dispatcher task
pub mod dispatcher;
/// Speech output implementations
pub mod sink;

pub use dispatcher::{AudioConfig, AudioDispatcher};
pub use sink::{SpeechSink, TracingSpeechSink};
