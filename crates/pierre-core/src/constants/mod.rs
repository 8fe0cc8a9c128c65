// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Landmark topology, confidence floors, camera heuristics, and feedback constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.
//! Threshold values that a product owner would tune per exercise live in the threshold
//! profiles, not here; this module only carries structural and heuristic constants.

/// `BlazePose` landmark indices (33-point topology emitted by the pose estimator)
pub mod landmarks {
    /// Number of landmarks in every frame
    pub const LANDMARK_COUNT: usize = 33;

    /// Nose tip
    pub const NOSE: usize = 0;
    /// Left shoulder
    pub const LEFT_SHOULDER: usize = 11;
    /// Right shoulder
    pub const RIGHT_SHOULDER: usize = 12;
    /// Left elbow
    pub const LEFT_ELBOW: usize = 13;
    /// Right elbow
    pub const RIGHT_ELBOW: usize = 14;
    /// Left wrist
    pub const LEFT_WRIST: usize = 15;
    /// Right wrist
    pub const RIGHT_WRIST: usize = 16;
    /// Left hip
    pub const LEFT_HIP: usize = 23;
    /// Right hip
    pub const RIGHT_HIP: usize = 24;
    /// Left knee
    pub const LEFT_KNEE: usize = 25;
    /// Right knee
    pub const RIGHT_KNEE: usize = 26;
    /// Left ankle
    pub const LEFT_ANKLE: usize = 27;
    /// Right ankle
    pub const RIGHT_ANKLE: usize = 28;
}

/// Landmark confidence floors
pub mod confidence {
    /// Default minimum visibility for a landmark to be trusted
    pub const DEFAULT_MIN_VISIBILITY: f64 = 0.5;

    /// Consecutive low-confidence frames before the state machine recovers to s1
    pub const RECOVERY_FRAME_COUNT: u32 = 2;
}

/// Geometry helpers
pub mod geometry {
    /// Vector magnitudes below this are treated as degenerate
    pub const MIN_VECTOR_MAGNITUDE: f64 = 1e-6;
}

/// Camera view classification heuristics
pub mod camera_view {
    /// Shoulder spread / torso height below which the camera sees the body side-on
    pub const SIDE_VIEW_MAX_SPREAD_RATIO: f64 = 0.25;

    /// Shoulder spread / torso height above which the camera faces the body
    pub const FRONTAL_MIN_SPREAD_RATIO: f64 = 0.55;

    /// Left/right shoulder depth difference that indicates a rotated (side) stance
    pub const SIDE_VIEW_MIN_DEPTH_DELTA: f64 = 0.3;

    /// Left/right shoulder depth difference below which the stance is square to camera
    pub const FRONTAL_MAX_DEPTH_DELTA: f64 = 0.1;

    /// Mean shoulder/hip visibility below which the view is considered occluded
    pub const OCCLUDED_MAX_MEAN_VISIBILITY: f64 = 0.5;

    /// Margin (normalised units) inside the frame edge the ankles must stay within
    pub const FRAME_EDGE_MARGIN: f64 = 0.02;

    /// Torso heights below this are treated as degenerate
    pub const MIN_TORSO_HEIGHT: f64 = 1e-3;
}

/// Feedback delivery constants
pub mod feedback {
    /// Maximum secondary text messages shown under the primary correction
    pub const MAX_SECONDARY_MESSAGES: usize = 2;

    /// Reps between milestone announcements
    pub const MILESTONE_INTERVAL: u32 = 5;

    /// Default maximum age before a queued speech message is dropped
    pub const DEFAULT_SPEECH_MAX_AGE_MS: u64 = 2_000;

    /// Default capacity of the audio delivery channel
    pub const DEFAULT_AUDIO_QUEUE_CAPACITY: usize = 32;
}

/// Rep form score penalties
pub mod form_score {
    /// Starting score for a rep
    pub const PERFECT: u8 = 100;
    /// Penalty per low-severity violation
    pub const LOW_PENALTY: u8 = 5;
    /// Penalty per medium-severity violation
    pub const MEDIUM_PENALTY: u8 = 15;
    /// Penalty per high-severity violation
    pub const HIGH_PENALTY: u8 = 35;
    /// Penalty when the rep leaves the tight timing band
    pub const TIMING_PENALTY: u8 = 5;
}

/// Service identity used in structured logs
pub mod service_names {
    /// Service name of the form coach
    pub const PIERRE_FORM_COACH: &str = "pierre-form-coach";
}
