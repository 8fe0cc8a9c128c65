// ABOUTME: Adjacency-constrained exercise phase state machine with low-confidence recovery
// ABOUTME: Classifies the primary joint angle into start/transition/target states per frame
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Exercise State Machine
//!
//! Each exercise has a static three-state graph:
//!
//! ```text
//! s1 (start) <-> s2 (transition) <-> s3 (target)
//! ```
//!
//! The primary angle is classified against the active profile's phase bounds
//! every frame. A classification adjacent to the current state is taken; one
//! that skips a state is ignored. The only non-adjacent move is the recovery
//! back to s1 after consecutive low-confidence frames.

use std::fmt;

use pierre_core::constants::confidence::RECOVERY_FRAME_COUNT;
use pierre_core::models::ExerciseType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::angles::{AngleName, ExerciseAngles};
use crate::config::ThresholdProfile;

/// Phase of a repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExerciseState {
    /// s1: starting position
    #[serde(rename = "s1", alias = "start")]
    Start,
    /// s2: moving between start and target
    #[serde(rename = "s2", alias = "transition")]
    Transition,
    /// s3: bottom / top of the movement
    #[serde(rename = "s3", alias = "target")]
    Target,
}

impl ExerciseState {
    /// Every state in graph order
    pub const ALL: [Self; 3] = [Self::Start, Self::Transition, Self::Target];

    /// Short state code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Start => "s1",
            Self::Transition => "s2",
            Self::Target => "s3",
        }
    }

    /// Name used in configuration keys
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Transition => "transition",
            Self::Target => "target",
        }
    }

    /// Parse either the configuration name or the short code
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.key() == key || state.code() == key)
    }
}

impl fmt::Display for ExerciseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Static phase graph for one exercise
#[derive(Debug)]
pub struct StateGraph {
    /// Exercise the graph belongs to
    pub exercise: ExerciseType,
    /// Angle classified into states
    pub primary_angle: AngleName,
    /// Directed edges between adjacent states
    pub edges: &'static [(ExerciseState, ExerciseState)],
    /// Order of states visited by one repetition
    pub cycle: &'static [ExerciseState],
}

const LINEAR_EDGES: &[(ExerciseState, ExerciseState)] = &[
    (ExerciseState::Start, ExerciseState::Transition),
    (ExerciseState::Transition, ExerciseState::Start),
    (ExerciseState::Transition, ExerciseState::Target),
    (ExerciseState::Target, ExerciseState::Transition),
];

const REP_CYCLE: &[ExerciseState] = &[
    ExerciseState::Start,
    ExerciseState::Transition,
    ExerciseState::Target,
    ExerciseState::Transition,
    ExerciseState::Start,
];

static SQUAT_GRAPH: StateGraph = StateGraph {
    exercise: ExerciseType::Squat,
    primary_angle: AngleName::Knee,
    edges: LINEAR_EDGES,
    cycle: REP_CYCLE,
};

static PUSH_UP_GRAPH: StateGraph = StateGraph {
    exercise: ExerciseType::PushUp,
    primary_angle: AngleName::Elbow,
    edges: LINEAR_EDGES,
    cycle: REP_CYCLE,
};

static BICEP_CURL_GRAPH: StateGraph = StateGraph {
    exercise: ExerciseType::BicepCurl,
    primary_angle: AngleName::Elbow,
    edges: LINEAR_EDGES,
    cycle: REP_CYCLE,
};

impl StateGraph {
    /// Graph for an exercise
    #[must_use]
    pub fn for_exercise(exercise: ExerciseType) -> &'static Self {
        match exercise {
            ExerciseType::Squat => &SQUAT_GRAPH,
            ExerciseType::PushUp => &PUSH_UP_GRAPH,
            ExerciseType::BicepCurl => &BICEP_CURL_GRAPH,
        }
    }

    /// Whether `from -> to` is an edge of the graph
    #[must_use]
    pub fn has_edge(&self, from: ExerciseState, to: ExerciseState) -> bool {
        self.edges.contains(&(from, to))
    }

    /// State the primary angle falls into under `profile`
    #[must_use]
    pub fn classify(&self, primary_deg: f64, profile: &ThresholdProfile) -> ExerciseState {
        if primary_deg >= profile.phases.start_min_deg {
            ExerciseState::Start
        } else if primary_deg <= profile.phases.target_max_deg {
            ExerciseState::Target
        } else {
            ExerciseState::Transition
        }
    }
}

/// Why the state did or did not change on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Classification matched the current state
    Held,
    /// Moved along a graph edge
    Advanced,
    /// Classification skipped a state; current state kept
    Ignored,
    /// Forced back to s1 after consecutive low-confidence frames
    Recovered,
    /// Low-confidence frame that did not (yet) force recovery
    LowConfidence,
    /// Frame older than the last accepted frame; state held
    OutOfOrder,
}

/// Result of feeding one frame to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStep {
    /// State before the frame
    pub previous: ExerciseState,
    /// State after the frame
    pub current: ExerciseState,
    /// What happened
    pub kind: TransitionKind,
    /// Frame timestamp
    pub timestamp_ms: u64,
}

impl StateStep {
    /// Whether this step is a scored move along a graph edge
    #[must_use]
    pub fn is_transition(&self, from: ExerciseState, to: ExerciseState) -> bool {
        self.kind == TransitionKind::Advanced && self.previous == from && self.current == to
    }
}

/// Per-session phase tracker for one exercise
#[derive(Debug, Clone)]
pub struct ExerciseStateMachine {
    graph: &'static StateGraph,
    state: ExerciseState,
    low_confidence_streak: u32,
    last_timestamp_ms: Option<u64>,
}

impl ExerciseStateMachine {
    /// New machine in s1
    #[must_use]
    pub fn new(exercise: ExerciseType) -> Self {
        Self {
            graph: StateGraph::for_exercise(exercise),
            state: ExerciseState::Start,
            low_confidence_streak: 0,
            last_timestamp_ms: None,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> ExerciseState {
        self.state
    }

    /// Exercise being tracked
    #[must_use]
    pub const fn exercise(&self) -> ExerciseType {
        self.graph.exercise
    }

    /// Return to s1 and forget frame history
    pub fn reset(&mut self) {
        self.state = ExerciseState::Start;
        self.low_confidence_streak = 0;
        self.last_timestamp_ms = None;
    }

    /// Advance on one frame; `angles` is `None` for a low-confidence frame
    pub fn step(
        &mut self,
        angles: Option<&ExerciseAngles>,
        profile: &ThresholdProfile,
        timestamp_ms: u64,
    ) -> StateStep {
        let previous = self.state;
        if self.last_timestamp_ms.is_some_and(|last| timestamp_ms < last) {
            debug!(timestamp_ms, state = %previous, "Out-of-order frame, holding state");
            return self.hold(TransitionKind::OutOfOrder, timestamp_ms);
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        let Some(primary) = angles.and_then(|a| a.get(self.graph.primary_angle)) else {
            self.low_confidence_streak = self.low_confidence_streak.saturating_add(1);
            if self.low_confidence_streak >= RECOVERY_FRAME_COUNT && previous != ExerciseState::Start
            {
                self.state = ExerciseState::Start;
                debug!(timestamp_ms, from = %previous, "Low-confidence recovery to s1");
                return StateStep {
                    previous,
                    current: self.state,
                    kind: TransitionKind::Recovered,
                    timestamp_ms,
                };
            }
            return self.hold(TransitionKind::LowConfidence, timestamp_ms);
        };
        self.low_confidence_streak = 0;

        let matched = self.graph.classify(primary, profile);
        if matched == previous {
            return self.hold(TransitionKind::Held, timestamp_ms);
        }
        if !self.graph.has_edge(previous, matched) {
            debug!(
                timestamp_ms,
                from = %previous,
                to = %matched,
                primary,
                "Ignoring non-adjacent state match"
            );
            return self.hold(TransitionKind::Ignored, timestamp_ms);
        }

        self.state = matched;
        debug!(timestamp_ms, from = %previous, to = %matched, primary, "State transition");
        StateStep {
            previous,
            current: matched,
            kind: TransitionKind::Advanced,
            timestamp_ms,
        }
    }

    const fn hold(&self, kind: TransitionKind, timestamp_ms: u64) -> StateStep {
        StateStep {
            previous: self.state,
            current: self.state,
            kind,
            timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::BodySide;
    use crate::config::defaults::builtin_profile;
    use pierre_core::models::SkillMode;

    fn knee(degrees: f64) -> ExerciseAngles {
        ExerciseAngles::new(ExerciseType::Squat, BodySide::Left).with(AngleName::Knee, degrees)
    }

    #[test]
    fn test_full_cycle_advances_along_edges() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        let mut machine = ExerciseStateMachine::new(ExerciseType::Squat);
        let kinds: Vec<_> = [170.0, 130.0, 90.0, 130.0, 170.0]
            .iter()
            .enumerate()
            .map(|(i, deg)| machine.step(Some(&knee(*deg)), &profile, i as u64 * 100))
            .map(|step| (step.current, step.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ExerciseState::Start, TransitionKind::Held),
                (ExerciseState::Transition, TransitionKind::Advanced),
                (ExerciseState::Target, TransitionKind::Advanced),
                (ExerciseState::Transition, TransitionKind::Advanced),
                (ExerciseState::Start, TransitionKind::Advanced),
            ]
        );
    }

    #[test]
    fn test_skipping_a_state_is_ignored() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        let mut machine = ExerciseStateMachine::new(ExerciseType::Squat);
        let step = machine.step(Some(&knee(80.0)), &profile, 0);
        assert_eq!(step.kind, TransitionKind::Ignored);
        assert_eq!(machine.state(), ExerciseState::Start);
    }

    #[test]
    fn test_two_low_confidence_frames_recover_to_start() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        let mut machine = ExerciseStateMachine::new(ExerciseType::Squat);
        machine.step(Some(&knee(130.0)), &profile, 0);
        assert_eq!(machine.state(), ExerciseState::Transition);

        let first = machine.step(None, &profile, 100);
        assert_eq!(first.kind, TransitionKind::LowConfidence);
        assert_eq!(first.current, ExerciseState::Transition);

        let second = machine.step(None, &profile, 200);
        assert_eq!(second.kind, TransitionKind::Recovered);
        assert_eq!(second.current, ExerciseState::Start);
    }

    #[test]
    fn test_out_of_order_frame_holds_state() {
        let profile = builtin_profile(ExerciseType::Squat, SkillMode::Beginner);
        let mut machine = ExerciseStateMachine::new(ExerciseType::Squat);
        machine.step(Some(&knee(130.0)), &profile, 500);
        let step = machine.step(Some(&knee(170.0)), &profile, 400);
        assert_eq!(step.kind, TransitionKind::OutOfOrder);
        assert_eq!(machine.state(), ExerciseState::Transition);
    }

    #[test]
    fn test_state_keys_parse() {
        assert_eq!(ExerciseState::from_key("target"), Some(ExerciseState::Target));
        assert_eq!(ExerciseState::from_key("s2"), Some(ExerciseState::Transition));
        assert_eq!(ExerciseState::from_key("bottom"), None);
    }
}
