// ABOUTME: Threshold configuration for the form analysis pipeline
// ABOUTME: Re-exports profile types, the profile table, and configuration errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Threshold Configuration Module
//!
//! - `profile` - one immutable `ThresholdProfile` per (exercise, mode)
//! - `defaults` - the built-in numbers
//! - `table` - the keyed `ProfileTable`, loadable from YAML
//! - `error` - `ConfigError`, convertible into `AppError`

/// Built-in threshold profiles
pub mod defaults;
/// Configuration errors
pub mod error;
/// Threshold profile types and override keys
pub mod profile;
/// Profile table
pub mod table;

pub use error::ConfigError;
pub use profile::{
    BandBound, PhaseBounds, RepTiming, RuleTolerance, ThresholdKey, ThresholdProfile,
    ToleranceBand,
};
pub use table::ProfileTable;
