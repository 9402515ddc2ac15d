//! Deterministic simulation module
//!
//! All spin logic lives here. This module must be pure and deterministic:
//! - Time only advances through `SpinEngine::tick`
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod ease;
pub mod engine;
pub mod layout;
pub mod resolver;
pub mod state;

pub use engine::SpinEngine;
pub use layout::{AMERICAN_SEQUENCE, EUROPEAN_SEQUENCE, PocketColor, PocketLabel, PocketLayout};
pub use resolver::{pocket_center_angle, pocket_index_at, resolve};
pub use state::{SettleSnap, SpinEvent, SpinLaunch, SpinPhase, SpinResult, SpinState};
