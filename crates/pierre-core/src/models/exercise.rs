// ABOUTME: Exercise type and skill mode enumerations for form analysis
// ABOUTME: Closed sets with parsing and display used to select threshold profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Movements supported by the form analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    /// Bodyweight or barbell squat, analysed from the side
    Squat,
    /// Standard push-up, analysed from the side
    PushUp,
    /// Standing dumbbell bicep curl
    BicepCurl,
}

impl ExerciseType {
    /// Every supported exercise, in presentation order
    pub const ALL: [Self; 3] = [Self::Squat, Self::PushUp, Self::BicepCurl];

    /// Stable identifier used in configuration files and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::PushUp => "push_up",
            Self::BicepCurl => "bicep_curl",
        }
    }

    /// Human-readable name for spoken and displayed messages
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Squat => "Squat",
            Self::PushUp => "Push-up",
            Self::BicepCurl => "Bicep curl",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "squat" => Ok(Self::Squat),
            "push_up" | "pushup" => Ok(Self::PushUp),
            "bicep_curl" | "biceps_curl" | "curl" => Ok(Self::BicepCurl),
            other => Err(AppError::invalid_input(format!(
                "Unknown exercise type: {other}"
            ))),
        }
    }
}

/// Threshold strictness selected by the user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SkillMode {
    /// Wide tolerances, frequent encouragement
    #[default]
    Beginner,
    /// Narrow tolerances, only serious corrections are spoken
    Pro,
}

impl SkillMode {
    /// Every supported mode
    pub const ALL: [Self; 2] = [Self::Beginner, Self::Pro];

    /// Stable identifier used in configuration files and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for SkillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "pro" | "advanced" => Ok(Self::Pro),
            other => Err(AppError::invalid_input(format!("Unknown skill mode: {other}"))),
        }
    }
}
