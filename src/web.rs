//! Browser binding
//!
//! The page owns the canvas, audio and DOM. It calls `frame(now)` from its
//! `requestAnimationFrame` callback while `is_spinning()` holds, redraws
//! from the angle getters, and plays whatever `take_cues()` returns.

use wasm_bindgen::prelude::*;

use crate::config::SpinConfig;
use crate::sim::{PocketLabel, SpinEvent, SpinPhase};
use crate::table::Table;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) is harmless
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Roulette wheel starting...");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WheelHandle {
    table: Table,
    last_time: f64,
}

#[wasm_bindgen]
impl WheelHandle {
    /// New table using the config stored in LocalStorage (or defaults)
    #[wasm_bindgen(constructor)]
    pub fn new() -> WheelHandle {
        Self {
            table: Table::from_entropy(SpinConfig::load()),
            last_time: 0.0,
        }
    }

    /// Reproducible table for replays
    pub fn with_seed(seed: u64) -> WheelHandle {
        Self {
            table: Table::new(SpinConfig::load(), seed),
            last_time: 0.0,
        }
    }

    pub fn select_chip(&mut self, value: u32) {
        self.table.select_chip(value as u64);
    }

    /// Place the selected chip on a pocket ("0".."36" or "00")
    pub fn place_chip(&mut self, pocket: &str) -> Result<(), JsValue> {
        let label = PocketLabel::parse(pocket)
            .ok_or_else(|| js_err(format!("not a pocket: {}", pocket)))?;
        self.table.place_chip(label).map_err(js_err)
    }

    pub fn clear_bets(&mut self) -> Result<f64, JsValue> {
        self.table.clear_bets().map(|r| r as f64).map_err(js_err)
    }

    /// Returns false when a spin is already running
    pub fn spin(&mut self) -> Result<bool, JsValue> {
        let started = self.table.spin().map_err(js_err)?;
        if started {
            self.last_time = 0.0;
        }
        Ok(started)
    }

    /// Advance by the time since the previous frame; returns `is_spinning()`
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let dt = if self.last_time > 0.0 {
            (now_ms - self.last_time) as f32
        } else {
            self.table.engine().config().reference_frame_ms
        };
        self.last_time = now_ms;
        self.table.tick(dt);
        self.table.is_spinning()
    }

    /// Advance by an explicit delta
    pub fn tick(&mut self, delta_ms: f32) {
        self.table.tick(delta_ms);
    }

    /// Audio/UI cues since the last call: "spin", "drop", "settle", "win", "lose"
    pub fn take_cues(&mut self) -> js_sys::Array {
        let cues = js_sys::Array::new();
        for event in self.table.drain_events() {
            let cue = match event {
                SpinEvent::SpinStarted => "spin",
                SpinEvent::DropStarted => "drop",
                SpinEvent::SettleStarted { .. } => "settle",
                SpinEvent::Settled(_) => match self.table.last_report() {
                    Some(report) if report.is_win() => "win",
                    _ => "lose",
                },
            };
            cues.push(&JsValue::from_str(cue));
        }
        cues
    }

    pub fn is_spinning(&self) -> bool {
        self.table.is_spinning()
    }

    pub fn phase(&self) -> String {
        match self.table.engine().phase() {
            SpinPhase::Idle => "idle",
            SpinPhase::Spinning => "spinning",
            SpinPhase::Dropping => "dropping",
            SpinPhase::Settling => "settling",
        }
        .to_string()
    }

    pub fn wheel_angle(&self) -> f32 {
        self.table.engine().state().wheel_angle
    }

    pub fn ball_angle(&self) -> f32 {
        self.table.engine().state().ball_angle
    }

    /// Fraction of wheel radius
    pub fn ball_radius(&self) -> f32 {
        self.table.engine().state().ball_radius
    }

    pub fn balance(&self) -> f64 {
        self.table.balance() as f64
    }

    pub fn last_payout(&self) -> f64 {
        self.table.last_report().map_or(0.0, |r| r.payout as f64)
    }

    pub fn result_label(&self) -> Option<String> {
        self.table.engine().last_result().map(|r| r.label.to_string())
    }

    pub fn result_color(&self) -> Option<String> {
        self.table
            .engine()
            .last_result()
            .map(|r| r.color.as_str().to_string())
    }

    /// Past result labels, newest first
    pub fn history(&self) -> js_sys::Array {
        self.table
            .history()
            .iter()
            .map(|r| JsValue::from_str(&r.label.to_string()))
            .collect()
    }

    // === Layout, for drawing the wheel ===

    pub fn pocket_count(&self) -> usize {
        self.table.engine().layout().size()
    }

    pub fn pocket_label(&self, index: usize) -> String {
        self.table.engine().layout().label_at(index).to_string()
    }

    pub fn pocket_color(&self, index: usize) -> String {
        let layout = self.table.engine().layout();
        layout.color_of(layout.label_at(index)).as_str().to_string()
    }

    pub fn slice_width(&self) -> f32 {
        self.table.engine().layout().slice_width()
    }

    /// Wheel-frame angle of pocket 0's leading edge
    pub fn pocket_offset(&self) -> f32 {
        self.table.engine().config().pocket_offset
    }
}

impl Default for WheelHandle {
    fn default() -> Self {
        Self::new()
    }
}
