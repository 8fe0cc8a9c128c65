// ABOUTME: Configuration module for the form coach runtime
// ABOUTME: Environment configuration and the hot-swappable threshold store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the Pierre form coach
//!
//! - **Environment**: runtime settings from environment variables
//! - **Profile store**: versioned, atomically swapped threshold profiles

/// Environment configuration
pub mod environment;
/// Threshold profile store
pub mod profile_store;

pub use environment::FormCoachConfig;
pub use profile_store::{ProfileChanged, ProfileHandle, ThresholdStore};
