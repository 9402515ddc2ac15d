//! Spin tuning and table rules
//!
//! Persisted as JSON: a file on native, LocalStorage in the browser.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Wheel variant (selects the pocket layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WheelVariant {
    /// Single zero, 37 pockets
    #[default]
    European,
    /// Double zero, 38 pockets
    American,
}

impl WheelVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            WheelVariant::European => "European",
            WheelVariant::American => "American",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "european" | "eu" | "single" => Some(WheelVariant::European),
            "american" | "us" | "double" => Some(WheelVariant::American),
            _ => None,
        }
    }
}

/// What ends the rim phase and starts the drop
///
/// An engine applies exactly one of these for every spin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropTrigger {
    /// Drop after a fixed time on the rim
    AfterDuration { ms: f32 },
    /// Drop once the ball's speed decays below a threshold (rad per reference frame)
    BelowVelocity { threshold: f32 },
}

impl Default for DropTrigger {
    fn default() -> Self {
        DropTrigger::AfterDuration {
            ms: SPIN_DURATION_MS,
        }
    }
}

/// What happens to held stakes when pending bets are cleared before a spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClearPolicy {
    /// Stakes stay with the house (the classic table script's behavior)
    #[default]
    Forfeit,
    /// Stakes go back to the balance
    Refund,
}

/// Spin physics and table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    pub variant: WheelVariant,
    /// Wheel-frame angle of pocket 0's leading edge (radians)
    pub pocket_offset: f32,

    // === Integration ===
    pub reference_frame_ms: f32,
    pub max_tick_ms: f32,

    // === Launch ===
    pub wheel_velocity_min: f32,
    pub wheel_velocity_max: f32,
    pub ball_velocity_ratio_min: f32,
    pub ball_velocity_ratio_max: f32,

    // === Decay ===
    pub wheel_decay: f32,
    pub ball_decay: f32,

    // === Drop / settle ===
    pub drop_trigger: DropTrigger,
    pub outer_radius: f32,
    pub settle_radius: f32,
    pub drop_smoothing: f32,
    pub settle_epsilon: f32,
    pub settle_duration_ms: f32,

    // === Table ===
    pub clear_policy: ClearPolicy,
    pub starting_balance: u64,
    pub straight_payout: u64,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            variant: WheelVariant::European,
            pocket_offset: 0.0,

            reference_frame_ms: REFERENCE_FRAME_MS,
            max_tick_ms: MAX_TICK_MS,

            wheel_velocity_min: WHEEL_VELOCITY_MIN,
            wheel_velocity_max: WHEEL_VELOCITY_MAX,
            ball_velocity_ratio_min: BALL_VELOCITY_RATIO_MIN,
            ball_velocity_ratio_max: BALL_VELOCITY_RATIO_MAX,

            wheel_decay: WHEEL_DECAY,
            ball_decay: BALL_DECAY,

            drop_trigger: DropTrigger::default(),
            outer_radius: BALL_OUTER_RADIUS,
            settle_radius: BALL_SETTLE_RADIUS,
            drop_smoothing: DROP_SMOOTHING,
            settle_epsilon: SETTLE_EPSILON,
            settle_duration_ms: SETTLE_DURATION_MS,

            clear_policy: ClearPolicy::Forfeit,
            starting_balance: STARTING_BALANCE,
            straight_payout: STRAIGHT_PAYOUT,
        }
    }
}

/// Configuration load/validation failure
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config: {}", e),
            Self::Parse(e) => write!(f, "malformed config JSON: {}", e),
            Self::Invalid { field, reason } => write!(f, "invalid `{}`: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

impl SpinConfig {
    /// Default tuning for a wheel variant
    pub fn for_variant(variant: WheelVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Check every tunable is inside the range the engine can integrate
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("pocket_offset", self.pocket_offset),
            ("reference_frame_ms", self.reference_frame_ms),
            ("max_tick_ms", self.max_tick_ms),
            ("wheel_velocity_min", self.wheel_velocity_min),
            ("wheel_velocity_max", self.wheel_velocity_max),
            ("ball_velocity_ratio_min", self.ball_velocity_ratio_min),
            ("ball_velocity_ratio_max", self.ball_velocity_ratio_max),
            ("settle_duration_ms", self.settle_duration_ms),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }
        if self.reference_frame_ms <= 0.0 {
            return Err(invalid("reference_frame_ms", "must be positive"));
        }
        if self.max_tick_ms <= 0.0 {
            return Err(invalid("max_tick_ms", "must be positive"));
        }
        if self.wheel_velocity_min < 0.0 || self.wheel_velocity_min > self.wheel_velocity_max {
            return Err(invalid("wheel_velocity_min", "must be in [0, wheel_velocity_max]"));
        }
        if self.ball_velocity_ratio_min < 0.0
            || self.ball_velocity_ratio_min > self.ball_velocity_ratio_max
        {
            return Err(invalid(
                "ball_velocity_ratio_min",
                "must be in [0, ball_velocity_ratio_max]",
            ));
        }
        if !(self.wheel_decay > 0.0 && self.wheel_decay <= 1.0) {
            return Err(invalid("wheel_decay", "must be in (0, 1]"));
        }
        // The ball must slow down or it never reaches settle_epsilon
        if !(self.ball_decay > 0.0 && self.ball_decay < 1.0) {
            return Err(invalid("ball_decay", "must be in (0, 1)"));
        }
        if !(self.settle_epsilon > 0.0 && self.settle_epsilon.is_finite()) {
            return Err(invalid("settle_epsilon", "must be positive"));
        }
        match self.drop_trigger {
            DropTrigger::AfterDuration { ms } if !(ms >= 0.0 && ms.is_finite()) => {
                return Err(invalid("drop_trigger.ms", "must be a non-negative duration"));
            }
            DropTrigger::BelowVelocity { threshold } if !threshold.is_finite() => {
                return Err(invalid("drop_trigger.threshold", "must be finite"));
            }
            // At or below settle_epsilon the drop would be skipped entirely
            DropTrigger::BelowVelocity { threshold } if threshold <= self.settle_epsilon => {
                return Err(invalid(
                    "drop_trigger.threshold",
                    "must be greater than settle_epsilon",
                ));
            }
            _ => {}
        }
        if !(self.settle_radius > 0.0 && self.settle_radius <= self.outer_radius) {
            return Err(invalid("settle_radius", "must be in (0, outer_radius]"));
        }
        if !(self.drop_smoothing > 0.0 && self.drop_smoothing <= 1.0) {
            return Err(invalid("drop_smoothing", "must be in (0, 1]"));
        }
        if self.settle_duration_ms < 0.0 {
            return Err(invalid("settle_duration_ms", "must be non-negative"));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON config file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "roulette_wheel_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }
}
