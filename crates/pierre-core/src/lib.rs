// ABOUTME: Core types and constants for the Pierre form coach
// ABOUTME: Foundation crate with error handling, landmark models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Core
//!
//! Foundation crate providing shared types and constants for the Pierre form coach.
//! This crate is designed to change infrequently, enabling incremental compilation
//! benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Landmark topology, confidence floors, and heuristics
//! - **models**: Landmark frames, exercise types, and skill modes

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (`LandmarkFrame`, `ExerciseType`, `SkillMode`)
pub mod models;
