// ABOUTME: Threshold configuration store with atomic active-profile swaps and overrides
// ABOUTME: Versioned handles, per-combination overrides, and profile-change notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Threshold Store
//!
//! The only shared state read by the frame pipeline. Readers call
//! [`ThresholdStore::active`] once per frame and keep the returned
//! [`ProfileHandle`] for the whole frame, so a concurrent switch never mixes
//! two profiles inside one analysis. Switching replaces the `Arc` under a short
//! write lock; a frame holding the old handle completes against it. Overrides
//! and reverts derive the next profile from the current one while holding that
//! same lock, so a concurrent switch is never silently undone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use pierre_core::models::{ExerciseType, SkillMode};
use pierre_intelligence::config::{ProfileTable, ThresholdKey, ThresholdProfile};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::errors::AppResult;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Active profile plus the store version it was published under
#[derive(Debug, Clone)]
pub struct ProfileHandle {
    /// Monotonic version, bumped on every switch, override or revert
    pub version: u64,
    /// Immutable profile
    pub profile: Arc<ThresholdProfile>,
}

impl ProfileHandle {
    /// Exercise of the active profile
    #[must_use]
    pub fn exercise(&self) -> ExerciseType {
        self.profile.exercise
    }

    /// Mode of the active profile
    #[must_use]
    pub fn mode(&self) -> SkillMode {
        self.profile.mode
    }
}

/// Notification published whenever the active profile changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChanged {
    /// New exercise
    pub exercise: ExerciseType,
    /// New mode
    pub mode: SkillMode,
    /// New version
    pub version: u64,
}

/// Holds per-(exercise, mode) thresholds and the active profile
#[derive(Debug)]
pub struct ThresholdStore {
    table: ProfileTable,
    overrides: DashMap<(ExerciseType, SkillMode), Arc<ThresholdProfile>>,
    active: RwLock<ProfileHandle>,
    version: AtomicU64,
    notifier: broadcast::Sender<ProfileChanged>,
}

impl ThresholdStore {
    /// Create a store with `exercise`/`mode` active
    ///
    /// # Errors
    ///
    /// Returns a configuration-missing error if the table lacks that combination
    pub fn new(table: ProfileTable, exercise: ExerciseType, mode: SkillMode) -> AppResult<Self> {
        let profile = table.get(exercise, mode)?;
        let (notifier, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            table,
            overrides: DashMap::new(),
            active: RwLock::new(ProfileHandle {
                version: 0,
                profile,
            }),
            version: AtomicU64::new(0),
            notifier,
        })
    }

    /// Store over the built-in table with the default exercise and mode
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in table is incomplete
    pub fn with_builtin_profiles() -> AppResult<Self> {
        Self::new(ProfileTable::builtin(), ExerciseType::Squat, SkillMode::default())
    }

    /// Profile for a combination, including any override
    ///
    /// # Errors
    ///
    /// Returns a configuration-missing error if the combination is not configured
    pub fn profile(
        &self,
        exercise: ExerciseType,
        mode: SkillMode,
    ) -> AppResult<Arc<ThresholdProfile>> {
        if let Some(overridden) = self.overrides.get(&(exercise, mode)) {
            return Ok(Arc::clone(overridden.value()));
        }
        Ok(self.table.get(exercise, mode)?)
    }

    /// Current handle; capture once per frame
    #[must_use]
    pub fn active(&self) -> ProfileHandle {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make `exercise`/`mode` the active profile
    ///
    /// # Errors
    ///
    /// Returns a configuration-missing error, leaving the active profile unchanged
    pub fn switch_active(&self, exercise: ExerciseType, mode: SkillMode) -> AppResult<ProfileHandle> {
        let handle = self.publish_with(|_| self.profile(exercise, mode))?;
        info!(%exercise, %mode, version = handle.version, "Switched active threshold profile");
        Ok(handle)
    }

    /// Override one threshold of the active combination
    ///
    /// The override applies to a copy; the table default is never modified and
    /// the override persists for the combination until [`Self::revert_overrides`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is inactive for the profile or the result is invalid
    pub fn override_threshold(&self, key: &ThresholdKey, value: f64) -> AppResult<ProfileHandle> {
        let handle = self.publish_with(|current| {
            let updated = Arc::new(current.profile.with_override(key, value)?);
            self.overrides
                .insert((updated.exercise, updated.mode), Arc::clone(&updated));
            Ok(updated)
        })?;
        info!(%key, value, version = handle.version, "Applied threshold override");
        Ok(handle)
    }

    /// Read a threshold of the active profile
    #[must_use]
    pub fn threshold_value(&self, key: &ThresholdKey) -> Option<f64> {
        self.active().profile.value(key)
    }

    /// Drop every override and restore the active combination's default
    ///
    /// # Errors
    ///
    /// Returns an error if the active combination is missing from the table
    pub fn revert_overrides(&self) -> AppResult<ProfileHandle> {
        let handle = self.publish_with(|current| {
            let default = self.table.get(current.exercise(), current.mode())?;
            self.overrides.clear();
            Ok(default)
        })?;
        info!(version = handle.version, "Reverted threshold overrides");
        Ok(handle)
    }

    /// Receive profile-change notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProfileChanged> {
        self.notifier.subscribe()
    }

    /// Exercises with configured profiles
    #[must_use]
    pub fn available_exercises(&self) -> Vec<ExerciseType> {
        self.table.exercises()
    }

    /// Modes with configured profiles
    #[must_use]
    pub fn available_modes(&self) -> Vec<SkillMode> {
        self.table.modes()
    }

    /// Derive the next profile from the current handle and swap it in
    ///
    /// The write lock is held from the read of the current handle until the
    /// swap; subscribers are notified after it is released. An error from
    /// `next` leaves the active handle and version untouched.
    fn publish_with<F>(&self, next: F) -> AppResult<ProfileHandle>
    where
        F: FnOnce(&ProfileHandle) -> AppResult<Arc<ThresholdProfile>>,
    {
        let handle = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            let profile = next(&active)?;
            let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
            *active = ProfileHandle { version, profile };
            active.clone()
        };
        let change = ProfileChanged {
            exercise: handle.exercise(),
            mode: handle.mode(),
            version: handle.version,
        };
        if self.notifier.send(change).is_err() {
            debug!(version = change.version, "No profile change subscribers");
        }
        Ok(handle)
    }
}
