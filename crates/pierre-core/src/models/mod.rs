// ABOUTME: Core data models shared by the form analysis crates
// ABOUTME: Re-exports landmark frames, exercise types, and skill modes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `Landmark` / `LandmarkFrame`: per-frame pose estimator output
//! - `ExerciseType`: closed set of analysed movements
//! - `SkillMode`: threshold strictness selected by the user

mod exercise;
mod pose;

pub use exercise::{ExerciseType, SkillMode};
pub use pose::{Landmark, LandmarkFrame};
