//! Roulette Wheel - spin/settle engine for a browser roulette table
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pocket layout, spin engine, outcome resolution)
//! - `ledger`: Straight-up betting bookkeeping
//! - `table`: Session glue tying one engine to one ledger
//! - `config`: Data-driven tuning, persisted as JSON
//! - `web`: wasm-bindgen handle driven by the page's animation loop

pub mod config;
pub mod ledger;
pub mod sim;
pub mod table;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ClearPolicy, ConfigError, DropTrigger, SpinConfig, WheelVariant};
pub use ledger::{Bet, BettingLedger, LedgerError, SettleReport};
pub use table::Table;

use glam::Vec2;

/// Engine tuning constants (defaults for `SpinConfig`)
pub mod consts {
    /// Frame length that velocities and per-frame factors are expressed against
    pub const REFERENCE_FRAME_MS: f32 = 16.0;
    /// Largest delta integrated in one tick (tab switch, debugger pause)
    pub const MAX_TICK_MS: f32 = 100.0;

    /// Wheel launch speed range (radians per reference frame)
    pub const WHEEL_VELOCITY_MIN: f32 = 0.08;
    pub const WHEEL_VELOCITY_MAX: f32 = 0.14;
    /// Ball launch speed as a multiple of the wheel's, counter-rotating
    pub const BALL_VELOCITY_RATIO_MIN: f32 = 1.6;
    pub const BALL_VELOCITY_RATIO_MAX: f32 = 2.4;

    /// Per-reference-frame velocity decay
    pub const WHEEL_DECAY: f32 = 0.99;
    pub const BALL_DECAY: f32 = 0.988;

    /// Time on the rim before the ball starts dropping
    pub const SPIN_DURATION_MS: f32 = 5000.0;

    /// Ball travel radii (fraction of wheel radius)
    pub const BALL_OUTER_RADIUS: f32 = 1.0;
    pub const BALL_SETTLE_RADIUS: f32 = 0.72;
    /// Radius smoothing per reference frame while dropping
    pub const DROP_SMOOTHING: f32 = 0.08;

    /// Ball speed below which free motion ends (radians per reference frame)
    pub const SETTLE_EPSILON: f32 = 0.002;
    /// Snap-to-pocket-center animation length
    pub const SETTLE_DURATION_MS: f32 = 400.0;

    /// Ledger defaults
    pub const STARTING_BALANCE: u64 = 1000;
    /// Straight-up payout (35:1)
    pub const STRAIGHT_PAYOUT: u64 = 35;
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`, in [-π, π)
#[inline]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let delta = normalize_angle(to - from);
    if delta >= PI { delta - TAU } else { delta }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
