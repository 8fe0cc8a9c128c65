// ABOUTME: Configuration error types for threshold profile validation and loading
// ABOUTME: Defines error variants for invalid bands, missing profiles, and bad keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration error types for threshold profiles.

use std::{env, io};

use pierre_core::errors::AppError;
use pierre_core::models::{ExerciseType, SkillMode};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Band or bound pair in the wrong order (e.g. min above max)
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// No profile exists for the requested combination
    #[error("No threshold profile for {exercise}/{mode}")]
    MissingProfile {
        /// Requested exercise
        exercise: ExerciseType,
        /// Requested mode
        mode: SkillMode,
    },

    /// Threshold key did not name a known value
    #[error("Unknown threshold key: {0}")]
    UnknownKey(String),

    /// Environment variable access or parse error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] env::VarError),

    /// Failed to parse configuration value
    #[error("Parse error: {0}")]
    Parse(String),

    /// Numeric value outside valid range for parameter
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// Profile table file could not be read
    #[error("Failed to read profile table: {0}")]
    Io(#[from] io::Error),

    /// Profile table file is not valid YAML for the table schema
    #[error("Invalid profile table YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let message = error.to_string();
        match error {
            ConfigError::MissingProfile { .. } => Self::config_missing(message),
            ConfigError::UnknownKey(_) => Self::invalid_input(message),
            ConfigError::Io(source) => Self::storage(message).with_source(source),
            ConfigError::Yaml(source) => Self::serialization(message).with_source(source),
            ConfigError::EnvVar(source) => Self::config_invalid(message).with_source(source),
            ConfigError::InvalidRange(_)
            | ConfigError::Parse(_)
            | ConfigError::ValueOutOfRange(_) => Self::config_invalid(message),
        }
    }
}
