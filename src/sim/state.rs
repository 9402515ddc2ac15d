//! Spin state and core simulation types
//!
//! Everything the renderer reads each frame lives in `SpinState`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::layout::{PocketColor, PocketLabel};
use crate::{normalize_angle, polar_to_cartesian};

/// Current stage of a spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpinPhase {
    /// No spin in progress, ready to accept `start_spin`
    #[default]
    Idle,
    /// Ball rides the rim, both bodies decaying
    Spinning,
    /// Ball spirals in toward the pocket ring
    Dropping,
    /// Ball eases into the center of its pocket, wheel held still
    Settling,
}

impl SpinPhase {
    /// Whether the ball is still in free (decaying) motion
    pub fn is_free_motion(&self) -> bool {
        matches!(self, SpinPhase::Spinning | SpinPhase::Dropping)
    }
}

/// Snap-to-center animation in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettleSnap {
    /// Ball angle when free motion ended
    pub from: f32,
    /// Ball radius when free motion ended
    pub from_radius: f32,
    /// Signed rotation to the pocket center
    pub delta: f32,
    /// Pocket the ball is landing in
    pub pocket_index: usize,
    /// Time spent snapping so far
    pub elapsed_ms: f32,
}

/// Angular state of wheel and ball
///
/// Angles are radians in world space; velocities are radians per
/// reference frame (see `SpinConfig::reference_frame_ms`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpinState {
    pub wheel_angle: f32,
    pub wheel_velocity: f32,
    pub ball_angle: f32,
    pub ball_velocity: f32,
    /// Ball distance from the hub as a fraction of wheel radius
    pub ball_radius: f32,
    pub phase: SpinPhase,
    /// Time since `start_spin`
    pub elapsed_ms: f32,
    /// Present only while `phase == Settling`
    pub snap: Option<SettleSnap>,
}

impl SpinState {
    /// Ball angle in the wheel's frame, in [0, 2π)
    pub fn relative_ball_angle(&self) -> f32 {
        normalize_angle(self.ball_angle - self.wheel_angle)
    }

    /// Ball position for drawing, given the on-screen wheel radius
    pub fn ball_position(&self, wheel_radius: f32) -> Vec2 {
        polar_to_cartesian(self.ball_radius * wheel_radius, self.ball_angle)
    }
}

/// Outcome of a completed spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    pub pocket_index: usize,
    pub label: PocketLabel,
    pub color: PocketColor,
}

/// Launch parameters for one spin
///
/// `start_spin` draws these from the engine's RNG; `start_spin_with`
/// takes them directly for replays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinLaunch {
    pub wheel_velocity: f32,
    pub ball_velocity: f32,
    pub ball_angle: f32,
}

/// Cues for the presentation layer (audio, UI enable/disable)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpinEvent {
    SpinStarted,
    DropStarted,
    SettleStarted { pocket_index: usize },
    Settled(SpinResult),
}
