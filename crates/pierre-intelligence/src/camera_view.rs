// ABOUTME: Camera view classification from shoulder/hip geometry and visibility
// ABOUTME: Produces side/frontal/angled/occluded verdicts with positioning advice
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Camera View Analyzer
//!
//! All supported exercises are best judged side-on. The analyzer compares the
//! horizontal shoulder spread against torso length and the left/right shoulder
//! depth difference to decide how the user is standing relative to the camera.
//! The verdict is advisory: the rest of the pipeline always runs.

use pierre_core::constants::camera_view::{
    FRAME_EDGE_MARGIN, FRONTAL_MAX_DEPTH_DELTA, FRONTAL_MIN_SPREAD_RATIO, MIN_TORSO_HEIGHT,
    OCCLUDED_MAX_MEAN_VISIBILITY, SIDE_VIEW_MAX_SPREAD_RATIO, SIDE_VIEW_MIN_DEPTH_DELTA,
};
use pierre_core::constants::landmarks::{
    LEFT_ANKLE, LEFT_HIP, LEFT_SHOULDER, RIGHT_ANKLE, RIGHT_HIP, RIGHT_SHOULDER,
};
use pierre_core::models::{Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};

/// How the camera sees the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    /// Side-on, the ideal angle for every supported exercise
    OptimalSide,
    /// Facing the camera
    Frontal,
    /// Somewhere between side-on and frontal
    Angled,
    /// Torso landmarks not reliably visible
    Occluded,
}

impl ViewType {
    /// Whether the view is bad enough to surface advice to the user
    #[must_use]
    pub const fn is_poor(&self) -> bool {
        matches!(self, Self::Frontal | Self::Occluded)
    }
}

/// View verdict plus positioning advice, most important first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewAnalysis {
    /// Classified view
    pub view: ViewType,
    /// Ordered positioning recommendations
    pub recommendations: Vec<String>,
    /// Horizontal shoulder spread divided by torso length
    pub spread_ratio: Option<f64>,
    /// Absolute left/right shoulder depth difference
    pub depth_delta: Option<f64>,
}

impl ViewAnalysis {
    /// First recommendation, if any
    #[must_use]
    pub fn top_recommendation(&self) -> Option<&str> {
        self.recommendations.first().map(String::as_str)
    }
}

/// Stateless camera view classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraViewAnalyzer;

impl CameraViewAnalyzer {
    /// Classify the view for a frame
    #[must_use]
    pub fn analyze(frame: &LandmarkFrame, min_visibility: f64) -> ViewAnalysis {
        let mut recommendations = Vec::new();

        let geometry = match measure_torso(frame) {
            Ok(geometry) => geometry,
            Err(obstruction) => {
                match obstruction {
                    Obstruction::Missing => {}
                    Obstruction::LowVisibility => {
                        recommendations.push(
                            "Make sure your upper body is clearly visible to the camera".to_owned(),
                        );
                        if feet_out_of_frame(frame, min_visibility) {
                            recommendations
                                .push("Step back so your feet are in the frame".to_owned());
                        }
                    }
                    Obstruction::ShortTorso => {
                        recommendations.push("Move so your whole torso is in view".to_owned());
                    }
                }
                return occluded(recommendations);
            }
        };

        let view = geometry.classify();
        match view {
            ViewType::Frontal => recommendations
                .push("Turn sideways so the camera sees your profile".to_owned()),
            ViewType::Angled => recommendations
                .push("Rotate a little further so you are side-on to the camera".to_owned()),
            ViewType::OptimalSide | ViewType::Occluded => {}
        }
        if feet_out_of_frame(frame, min_visibility) {
            recommendations.push("Step back so your feet are in the frame".to_owned());
        }

        ViewAnalysis {
            view,
            recommendations,
            spread_ratio: Some(geometry.spread_ratio),
            depth_delta: Some(geometry.depth_delta),
        }
    }

    /// View type alone, without positioning advice
    #[must_use]
    pub fn view_type(frame: &LandmarkFrame) -> ViewType {
        measure_torso(frame).map_or(ViewType::Occluded, TorsoGeometry::classify)
    }
}

/// Why the torso could not be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Obstruction {
    Missing,
    LowVisibility,
    ShortTorso,
}

#[derive(Debug, Clone, Copy)]
struct TorsoGeometry {
    spread_ratio: f64,
    depth_delta: f64,
}

impl TorsoGeometry {
    fn classify(self) -> ViewType {
        if self.spread_ratio <= SIDE_VIEW_MAX_SPREAD_RATIO
            || self.depth_delta >= SIDE_VIEW_MIN_DEPTH_DELTA
        {
            ViewType::OptimalSide
        } else if self.spread_ratio >= FRONTAL_MIN_SPREAD_RATIO
            && self.depth_delta <= FRONTAL_MAX_DEPTH_DELTA
        {
            ViewType::Frontal
        } else {
            ViewType::Angled
        }
    }
}

fn measure_torso(frame: &LandmarkFrame) -> Result<TorsoGeometry, Obstruction> {
    let landmarks = (
        frame.get(LEFT_SHOULDER),
        frame.get(RIGHT_SHOULDER),
        frame.get(LEFT_HIP),
        frame.get(RIGHT_HIP),
    );
    let (Some(ls), Some(rs), Some(lh), Some(rh)) = landmarks else {
        return Err(Obstruction::Missing);
    };

    let torso = [LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP];
    if frame.mean_visibility(&torso) < OCCLUDED_MAX_MEAN_VISIBILITY {
        return Err(Obstruction::LowVisibility);
    }

    let torso_length = planar_distance(&ls.midpoint(rs), &lh.midpoint(rh));
    if torso_length < MIN_TORSO_HEIGHT {
        return Err(Obstruction::ShortTorso);
    }

    Ok(TorsoGeometry {
        spread_ratio: (ls.x - rs.x).abs() / torso_length,
        depth_delta: (ls.z - rs.z).abs(),
    })
}

fn planar_distance(a: &Landmark, b: &Landmark) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Both ankles must be visible and inside the frame margins
fn feet_out_of_frame(frame: &LandmarkFrame, min_visibility: f64) -> bool {
    [LEFT_ANKLE, RIGHT_ANKLE].iter().all(|&index| {
        !frame.get(index).is_some_and(|ankle| {
            ankle.is_visible(min_visibility)
                && ankle.y <= 1.0 - FRAME_EDGE_MARGIN
                && ankle.x >= FRAME_EDGE_MARGIN
                && ankle.x <= 1.0 - FRAME_EDGE_MARGIN
        })
    })
}
