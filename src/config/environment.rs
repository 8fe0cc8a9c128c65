// ABOUTME: Environment-based configuration for the form coach runtime
// ABOUTME: Default exercise and mode, profile table location, and audio queue settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pierre_core::constants::feedback::{DEFAULT_AUDIO_QUEUE_CAPACITY, DEFAULT_SPEECH_MAX_AGE_MS};
use pierre_core::models::{ExerciseType, SkillMode};
use pierre_intelligence::config::{ConfigError, ProfileTable};
use tracing::{info, warn};

use crate::audio::AudioConfig;
use crate::errors::AppResult;

/// Default exercise at startup
pub const ENV_DEFAULT_EXERCISE: &str = "PIERRE_FORM_DEFAULT_EXERCISE";
/// Default skill mode at startup
pub const ENV_DEFAULT_MODE: &str = "PIERRE_FORM_DEFAULT_MODE";
/// Path to a YAML profile table replacing the built-in one
pub const ENV_PROFILES_PATH: &str = "PIERRE_FORM_PROFILES_PATH";
/// Bounded speech queue capacity
pub const ENV_AUDIO_QUEUE_CAPACITY: &str = "PIERRE_FORM_AUDIO_QUEUE_CAPACITY";
/// Age after which queued speech is dropped
pub const ENV_SPEECH_MAX_AGE_MS: &str = "PIERRE_FORM_SPEECH_MAX_AGE_MS";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct FormCoachConfig {
    /// Exercise active when a session starts
    pub default_exercise: ExerciseType,
    /// Skill mode active when a session starts
    pub default_mode: SkillMode,
    /// YAML profile table; `None` uses the built-in table
    pub profiles_path: Option<PathBuf>,
    /// Speech delivery settings
    pub audio: AudioConfig,
}

impl Default for FormCoachConfig {
    fn default() -> Self {
        Self {
            default_exercise: ExerciseType::Squat,
            default_mode: SkillMode::Beginner,
            profiles_path: None,
            audio: AudioConfig::default(),
        }
    }
}

impl FormCoachConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to defaults; set but invalid values are errors.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            default_exercise: parse_env(ENV_DEFAULT_EXERCISE)?.unwrap_or(ExerciseType::Squat),
            default_mode: parse_env(ENV_DEFAULT_MODE)?.unwrap_or_default(),
            profiles_path: read_env(ENV_PROFILES_PATH)?
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            audio: AudioConfig {
                queue_capacity: parse_env(ENV_AUDIO_QUEUE_CAPACITY)?
                    .unwrap_or(DEFAULT_AUDIO_QUEUE_CAPACITY),
                speech_max_age: Duration::from_millis(
                    parse_env(ENV_SPEECH_MAX_AGE_MS)?.unwrap_or(DEFAULT_SPEECH_MAX_AGE_MS),
                ),
            },
        };
        config.validate()?;
        info!(
            exercise = %config.default_exercise,
            mode = %config.default_mode,
            profiles = ?config.profiles_path,
            "Form coach configuration loaded"
        );
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns an error if the audio queue has no capacity or speech never ages out
    pub fn validate(&self) -> AppResult<()> {
        if self.audio.queue_capacity == 0 {
            return Err(ConfigError::ValueOutOfRange(format!(
                "{ENV_AUDIO_QUEUE_CAPACITY} must be at least 1"
            ))
            .into());
        }
        if self.audio.speech_max_age.is_zero() {
            return Err(ConfigError::ValueOutOfRange(format!(
                "{ENV_SPEECH_MAX_AGE_MS} must be positive"
            ))
            .into());
        }
        Ok(())
    }

    /// Profile table from `profiles_path`, or the built-in table
    ///
    /// # Errors
    ///
    /// Returns an error if the configured file cannot be read or is invalid
    pub fn load_profile_table(&self) -> AppResult<ProfileTable> {
        match &self.profiles_path {
            Some(path) => Ok(ProfileTable::from_yaml_file(path)?),
            None => {
                info!("Using built-in threshold profiles");
                Ok(ProfileTable::builtin())
            }
        }
    }
}

/// Raw variable; unset is `None`, non-unicode is an error
fn read_env(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => {
            warn!(key, "Environment variable is not valid unicode");
            Err(e.into())
        }
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    read_env(key)?
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::Parse(format!("{key}={value}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = FormCoachConfig::default();
        config.validate().unwrap();
        assert_eq!(config.audio.queue_capacity, DEFAULT_AUDIO_QUEUE_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = FormCoachConfig::default();
        config.audio.queue_capacity = 0;
        assert!(config.validate().is_err());
    }
}
