// ABOUTME: Error types for the form coach runtime, re-exported from the core crate
// ABOUTME: Keeps `crate::errors::AppError` paths stable for the root crate and its tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The error taxonomy lives in `pierre-core` so the analysis crate and the
//! runtime share one `AppError`. Threshold configuration failures arrive as
//! `ConfigError` and convert with `?`.

pub use pierre_core::errors::{AppError, AppResult, ErrorCode};
pub use pierre_intelligence::config::ConfigError;
