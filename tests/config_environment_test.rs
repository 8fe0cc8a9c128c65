// ABOUTME: Integration tests for environment configuration and YAML profile tables
// ABOUTME: Validates defaults, parsing errors, range checks, and profile file loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::fs;
use std::time::Duration;

use pierre_core::models::{ExerciseType, SkillMode};
use pierre_form_coach::config::environment::{
    ENV_AUDIO_QUEUE_CAPACITY, ENV_DEFAULT_EXERCISE, ENV_DEFAULT_MODE, ENV_PROFILES_PATH,
    ENV_SPEECH_MAX_AGE_MS,
};
use pierre_form_coach::config::FormCoachConfig;
use pierre_form_coach::errors::ErrorCode;
use pierre_intelligence::config::{ProfileTable, ThresholdKey};
use serial_test::serial;
use tempfile::TempDir;

const ALL_VARS: [&str; 5] = [
    ENV_DEFAULT_EXERCISE,
    ENV_DEFAULT_MODE,
    ENV_PROFILES_PATH,
    ENV_AUDIO_QUEUE_CAPACITY,
    ENV_SPEECH_MAX_AGE_MS,
];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_when_unset() {
    clear_env();
    let config = FormCoachConfig::from_env().unwrap();
    assert_eq!(config.default_exercise, ExerciseType::Squat);
    assert_eq!(config.default_mode, SkillMode::Beginner);
    assert!(config.profiles_path.is_none());
    assert_eq!(config.audio.speech_max_age, Duration::from_secs(2));
    assert_eq!(config.load_profile_table().unwrap().len(), 6);
}

#[test]
#[serial]
fn test_reads_values() {
    clear_env();
    env::set_var(ENV_DEFAULT_EXERCISE, "push-up");
    env::set_var(ENV_DEFAULT_MODE, "pro");
    env::set_var(ENV_AUDIO_QUEUE_CAPACITY, "4");
    env::set_var(ENV_SPEECH_MAX_AGE_MS, "1500");

    let config = FormCoachConfig::from_env().unwrap();
    assert_eq!(config.default_exercise, ExerciseType::PushUp);
    assert_eq!(config.default_mode, SkillMode::Pro);
    assert_eq!(config.audio.queue_capacity, 4);
    assert_eq!(config.audio.speech_max_age, Duration::from_millis(1500));
    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_are_errors() {
    clear_env();
    env::set_var(ENV_DEFAULT_MODE, "expert");
    let err = FormCoachConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    clear_env();
    env::set_var(ENV_AUDIO_QUEUE_CAPACITY, "0");
    assert!(FormCoachConfig::from_env().is_err());

    clear_env();
    env::set_var(ENV_SPEECH_MAX_AGE_MS, "soon");
    assert!(FormCoachConfig::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_blank_profiles_path_uses_builtin() {
    clear_env();
    env::set_var(ENV_PROFILES_PATH, "  ");
    let config = FormCoachConfig::from_env().unwrap();
    assert!(config.profiles_path.is_none());
    clear_env();
}

#[test]
#[serial]
fn test_loads_profile_table_from_yaml_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profiles.yaml");

    let key = ThresholdKey::FeedbackFrequencyMs;
    let tuned = ProfileTable::builtin()
        .get(ExerciseType::Squat, SkillMode::Beginner)
        .unwrap()
        .with_override(&key, 1800.0)
        .unwrap();
    let profiles = ProfileTable::builtin();
    let table = ProfileTable::from_profiles(
        ExerciseType::ALL
            .into_iter()
            .flat_map(|e| SkillMode::ALL.into_iter().map(move |m| (e, m)))
            .map(|(e, m)| {
                if (e, m) == (ExerciseType::Squat, SkillMode::Beginner) {
                    tuned.clone()
                } else {
                    profiles.get(e, m).unwrap().as_ref().clone()
                }
            }),
    )
    .unwrap();
    fs::write(&path, table.to_yaml_string().unwrap()).unwrap();

    env::set_var(ENV_PROFILES_PATH, &path);
    let config = FormCoachConfig::from_env().unwrap();
    let loaded = config.load_profile_table().unwrap();
    let squat = loaded.get(ExerciseType::Squat, SkillMode::Beginner).unwrap();
    assert_eq!(squat.feedback_frequency_ms, 1800);
    assert!((squat.escalation_margin_deg - tuned.escalation_margin_deg).abs() < f64::EPSILON);
    clear_env();
}

#[test]
#[serial]
fn test_incomplete_yaml_table_is_rejected() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.yaml");
    let partial = ProfileTable::from_profiles([ProfileTable::builtin()
        .get(ExerciseType::BicepCurl, SkillMode::Pro)
        .unwrap()
        .as_ref()
        .clone()])
    .unwrap();
    fs::write(&path, partial.to_yaml_string().unwrap()).unwrap();

    env::set_var(ENV_PROFILES_PATH, &path);
    let config = FormCoachConfig::from_env().unwrap();
    let err = config.load_profile_table().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
    clear_env();
}

#[test]
#[serial]
fn test_missing_yaml_file_is_storage_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    env::set_var(ENV_PROFILES_PATH, dir.path().join("absent.yaml"));
    let config = FormCoachConfig::from_env().unwrap();
    let err = config.load_profile_table().unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageError);
    clear_env();
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let err = ProfileTable::from_yaml_str("profiles: [not, a, profile]").unwrap_err();
    assert!(!err.to_string().is_empty());
}
