// ABOUTME: Profile table keyed by exercise type and skill mode, loadable from YAML
// ABOUTME: Validates every profile and enforces complete coverage for file-based tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use pierre_core::models::{ExerciseType, SkillMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::defaults::builtin_profiles;
use super::error::ConfigError;
use super::profile::ThresholdProfile;

/// On-disk layout of a profile table
#[derive(Debug, Serialize, Deserialize)]
struct ProfileTableFile {
    profiles: Vec<ThresholdProfile>,
}

/// Immutable set of threshold profiles with O(1) lookup
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: HashMap<(ExerciseType, SkillMode), Arc<ThresholdProfile>>,
}

impl ProfileTable {
    /// Table of built-in profiles
    #[must_use]
    pub fn builtin() -> Self {
        let profiles = builtin_profiles()
            .into_iter()
            .map(|profile| ((profile.exercise, profile.mode), Arc::new(profile)))
            .collect();
        Self { profiles }
    }

    /// Build a table from explicit profiles
    ///
    /// Coverage is not enforced here; lookups of absent combinations fail with
    /// [`ConfigError::MissingProfile`].
    ///
    /// # Errors
    ///
    /// Returns an error if a profile fails validation or a combination appears twice
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = ThresholdProfile>,
    ) -> Result<Self, ConfigError> {
        let mut table = HashMap::new();
        for profile in profiles {
            profile.validate()?;
            let key = (profile.exercise, profile.mode);
            if table.insert(key, Arc::new(profile)).is_some() {
                return Err(ConfigError::InvalidRange(format!(
                    "duplicate profile for {}/{}",
                    key.0, key.1
                )));
            }
        }
        Ok(Self { profiles: table })
    }

    /// Parse and validate a complete table from YAML
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a profile is invalid, or a
    /// combination is missing
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ProfileTableFile = serde_yaml::from_str(yaml)?;
        let table = Self::from_profiles(file.profiles)?;
        table.require_complete()?;
        Ok(table)
    }

    /// Load a complete table from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails [`Self::from_yaml_str`]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)?;
        let table = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), profiles = table.len(), "Loaded threshold profile table");
        Ok(table)
    }

    /// Serialise the table to YAML, ordered by exercise then mode
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        let mut profiles: Vec<ThresholdProfile> =
            self.profiles.values().map(|profile| (**profile).clone()).collect();
        profiles.sort_by_key(|profile| (profile.exercise, profile.mode));
        Ok(serde_yaml::to_string(&ProfileTableFile { profiles })?)
    }

    /// Profile for a combination
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingProfile`] if the combination is not in the table
    pub fn get(
        &self,
        exercise: ExerciseType,
        mode: SkillMode,
    ) -> Result<Arc<ThresholdProfile>, ConfigError> {
        self.profiles
            .get(&(exercise, mode))
            .cloned()
            .ok_or(ConfigError::MissingProfile { exercise, mode })
    }

    /// Exercise types with at least one profile, in declaration order
    #[must_use]
    pub fn exercises(&self) -> Vec<ExerciseType> {
        ExerciseType::ALL
            .into_iter()
            .filter(|exercise| self.profiles.keys().any(|(e, _)| e == exercise))
            .collect()
    }

    /// Skill modes with at least one profile, in declaration order
    #[must_use]
    pub fn modes(&self) -> Vec<SkillMode> {
        SkillMode::ALL
            .into_iter()
            .filter(|mode| self.profiles.keys().any(|(_, m)| m == mode))
            .collect()
    }

    /// Number of profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the table holds no profiles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Fail unless every (exercise, mode) combination is present
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingProfile`] for the first absent combination
    pub fn require_complete(&self) -> Result<(), ConfigError> {
        for exercise in ExerciseType::ALL {
            for mode in SkillMode::ALL {
                if !self.profiles.contains_key(&(exercise, mode)) {
                    debug!(%exercise, %mode, "Profile table is incomplete");
                    return Err(ConfigError::MissingProfile { exercise, mode });
                }
            }
        }
        Ok(())
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
