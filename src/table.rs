//! Table session: one wheel, one ledger
//!
//! The presentation layer talks to this. Bets open while the wheel is idle,
//! a spin needs at least one bet, and the ledger is settled automatically on
//! the tick that publishes the result.

use crate::config::SpinConfig;
use crate::ledger::{BettingLedger, LedgerError, SettleReport};
use crate::sim::{PocketLabel, SpinEngine, SpinEvent, SpinResult, SpinState};

/// Number of past results kept for the history strip
pub const HISTORY_LENGTH: usize = 20;

#[derive(Debug, Clone)]
pub struct Table {
    engine: SpinEngine,
    ledger: BettingLedger,
    /// Newest first
    history: Vec<SpinResult>,
    last_report: Option<SettleReport>,
    events: Vec<SpinEvent>,
}

impl Table {
    pub fn new(config: SpinConfig, seed: u64) -> Self {
        let ledger = BettingLedger::new(
            config.starting_balance,
            config.straight_payout,
            config.clear_policy,
        );
        Self::with_parts(SpinEngine::new(config, seed), ledger)
    }

    pub fn from_entropy(config: SpinConfig) -> Self {
        let ledger = BettingLedger::new(
            config.starting_balance,
            config.straight_payout,
            config.clear_policy,
        );
        Self::with_parts(SpinEngine::from_entropy(config), ledger)
    }

    pub fn with_parts(engine: SpinEngine, ledger: BettingLedger) -> Self {
        Self {
            engine,
            ledger,
            history: Vec::with_capacity(HISTORY_LENGTH),
            last_report: None,
            events: Vec::new(),
        }
    }

    fn ensure_open(&self, label: PocketLabel) -> Result<(), LedgerError> {
        if self.engine.is_spinning() {
            return Err(LedgerError::BetsClosed);
        }
        if !self.engine.layout().contains(label) {
            return Err(LedgerError::UnknownPocket(label));
        }
        Ok(())
    }

    pub fn select_chip(&mut self, value: u64) {
        self.ledger.select_chip(value);
    }

    /// Place the selected chip on a pocket
    pub fn place_chip(&mut self, label: PocketLabel) -> Result<(), LedgerError> {
        self.ensure_open(label)?;
        self.ledger.place_chip(label).inspect_err(|e| {
            log::warn!("Bet on {} rejected: {}", label, e);
        })
    }

    pub fn place_bet(&mut self, label: PocketLabel, amount: u64) -> Result<(), LedgerError> {
        self.ensure_open(label)?;
        self.ledger.place_bet(label, amount).inspect_err(|e| {
            log::warn!("Bet on {} rejected: {}", label, e);
        })
    }

    /// Discard pending bets; returns the refunded amount
    pub fn clear_bets(&mut self) -> Result<u64, LedgerError> {
        if self.engine.is_spinning() {
            return Err(LedgerError::BetsClosed);
        }
        Ok(self.ledger.clear_bets())
    }

    /// Start a spin.
    ///
    /// `Ok(false)` if a spin is already running (silently ignored),
    /// `Err(NoBets)` if nothing is riding on it.
    pub fn spin(&mut self) -> Result<bool, LedgerError> {
        if self.engine.is_spinning() {
            return Ok(false);
        }
        if !self.ledger.has_bets() {
            return Err(LedgerError::NoBets);
        }
        self.last_report = None;
        Ok(self.engine.start_spin())
    }

    /// Advance the wheel; settles the ledger when the spin completes
    pub fn tick(&mut self, delta_ms: f32) -> SpinState {
        let state = self.engine.tick(delta_ms);
        for event in self.engine.drain_events() {
            if let SpinEvent::Settled(result) = event {
                self.last_report = Some(self.ledger.settle(result));
                self.history.insert(0, result);
                self.history.truncate(HISTORY_LENGTH);
            }
            self.events.push(event);
        }
        state
    }

    /// Take queued presentation cues, oldest first
    pub fn drain_events(&mut self) -> Vec<SpinEvent> {
        self.events.append(&mut self.engine.drain_events());
        std::mem::take(&mut self.events)
    }

    pub fn engine(&self) -> &SpinEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &BettingLedger {
        &self.ledger
    }

    pub fn balance(&self) -> u64 {
        self.ledger.balance()
    }

    pub fn is_spinning(&self) -> bool {
        self.engine.is_spinning()
    }

    /// Past results, newest first
    pub fn history(&self) -> &[SpinResult] {
        &self.history
    }

    /// Settlement of the most recent completed round
    pub fn last_report(&self) -> Option<&SettleReport> {
        self.last_report.as_ref()
    }
}
