//! Straight-up betting ledger
//!
//! Stakes leave the balance when a bet is placed. Settling credits
//! `amount * payout` for every bet on the winning pocket and drops the rest;
//! losing stakes are never charged again because they were already taken.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ClearPolicy;
use crate::sim::{PocketLabel, SpinResult};

/// A single straight-up bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub label: PocketLabel,
    pub amount: u64,
}

/// Why a ledger operation was rejected. Rejections leave the ledger untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    NoChipSelected,
    InvalidAmount,
    InsufficientBalance { balance: u64, amount: u64 },
    UnknownPocket(PocketLabel),
    BetsClosed,
    NoBets,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChipSelected => write!(f, "select a chip first"),
            Self::InvalidAmount => write!(f, "bet amount must be positive"),
            Self::InsufficientBalance { balance, amount } => {
                write!(f, "insufficient balance: {} available, {} requested", balance, amount)
            }
            Self::UnknownPocket(label) => write!(f, "no pocket {} on this wheel", label),
            Self::BetsClosed => write!(f, "bets are closed while the wheel is spinning"),
            Self::NoBets => write!(f, "place at least one bet"),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Outcome of settling one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleReport {
    pub result: SpinResult,
    /// Total stake that was riding on the round
    pub staked: u64,
    /// Total credited back to the balance
    pub payout: u64,
    pub winning_bets: usize,
}

impl SettleReport {
    /// Balance change over the whole round, stakes included
    pub fn net(&self) -> i128 {
        self.payout as i128 - self.staked as i128
    }

    pub fn is_win(&self) -> bool {
        self.payout > 0
    }
}

/// Player balance and the bets held for the next spin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BettingLedger {
    balance: u64,
    bets: Vec<Bet>,
    chip: Option<u64>,
    payout_multiplier: u64,
    clear_policy: ClearPolicy,
}

impl BettingLedger {
    pub fn new(balance: u64, payout_multiplier: u64, clear_policy: ClearPolicy) -> Self {
        Self {
            balance,
            bets: Vec::new(),
            chip: None,
            payout_multiplier,
            clear_policy,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn has_bets(&self) -> bool {
        !self.bets.is_empty()
    }

    /// Sum of all held stakes
    pub fn total_staked(&self) -> u64 {
        self.bets.iter().map(|b| b.amount).sum()
    }

    /// Choose the chip value used by `place_chip` (0 deselects)
    pub fn select_chip(&mut self, value: u64) {
        self.chip = (value > 0).then_some(value);
    }

    pub fn selected_chip(&self) -> Option<u64> {
        self.chip
    }

    /// Place the selected chip on a pocket
    pub fn place_chip(&mut self, label: PocketLabel) -> Result<(), LedgerError> {
        let amount = self.chip.ok_or(LedgerError::NoChipSelected)?;
        self.place_bet(label, amount)
    }

    /// Place a bet, taking the stake from the balance immediately
    pub fn place_bet(&mut self, label: PocketLabel, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientBalance {
                balance: self.balance,
                amount,
            });
        }
        self.balance -= amount;
        self.bets.push(Bet { label, amount });
        log::debug!("Bet {} on {} (balance {})", amount, label, self.balance);
        Ok(())
    }

    /// Pay out bets on the winning pocket and clear every held bet
    pub fn settle(&mut self, result: SpinResult) -> SettleReport {
        let staked = self.total_staked();
        let mut payout = 0u64;
        let mut winning_bets = 0;
        for bet in self.bets.drain(..) {
            if bet.label == result.label {
                payout = payout.saturating_add(bet.amount.saturating_mul(self.payout_multiplier));
                winning_bets += 1;
            }
        }
        self.balance = self.balance.saturating_add(payout);

        if payout > 0 {
            log::info!("Paid {} on {} (balance {})", payout, result.label, self.balance);
        } else {
            log::info!("No wins on {} (balance {})", result.label, self.balance);
        }

        SettleReport {
            result,
            staked,
            payout,
            winning_bets,
        }
    }

    /// Discard pending bets. Returns the amount refunded under the clear policy.
    pub fn clear_bets(&mut self) -> u64 {
        let staked = self.total_staked();
        self.bets.clear();
        match self.clear_policy {
            ClearPolicy::Forfeit => {
                if staked > 0 {
                    log::debug!("Cleared bets, {} forfeited", staked);
                }
                0
            }
            ClearPolicy::Refund => {
                self.balance = self.balance.saturating_add(staked);
                log::debug!("Cleared bets, {} refunded", staked);
                staked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PocketColor;

    fn result(label: PocketLabel) -> SpinResult {
        SpinResult {
            pocket_index: 0,
            label,
            color: PocketColor::Black,
        }
    }

    fn ledger() -> BettingLedger {
        BettingLedger::new(1000, 35, ClearPolicy::Forfeit)
    }

    #[test]
    fn test_straight_win_pays_35() {
        let mut ledger = ledger();
        ledger.place_bet(PocketLabel::Number(17), 50).unwrap();
        assert_eq!(ledger.balance(), 950);

        let report = ledger.settle(result(PocketLabel::Number(17)));
        assert_eq!(ledger.balance(), 1000 - 50 + 50 * 35);
        assert_eq!(ledger.balance(), 2700);
        assert_eq!(report.payout, 1750);
        assert_eq!(report.staked, 50);
        assert_eq!(report.winning_bets, 1);
        assert_eq!(report.net(), 1700);
        assert!(report.is_win());
        assert!(!ledger.has_bets());
    }

    #[test]
    fn test_loss_keeps_stake_deducted() {
        let mut ledger = ledger();
        ledger.place_bet(PocketLabel::Number(17), 50).unwrap();
        let report = ledger.settle(result(PocketLabel::Number(18)));
        assert_eq!(ledger.balance(), 950);
        assert_eq!(report.payout, 0);
        assert_eq!(report.net(), -50);
        assert!(!report.is_win());
        assert!(ledger.bets().is_empty());
    }

    #[test]
    fn test_multiple_bets_same_pocket() {
        let mut ledger = ledger();
        ledger.place_bet(PocketLabel::DoubleZero, 10).unwrap();
        ledger.place_bet(PocketLabel::DoubleZero, 20).unwrap();
        ledger.place_bet(PocketLabel::Number(0), 5).unwrap();
        assert_eq!(ledger.total_staked(), 35);
        let report = ledger.settle(result(PocketLabel::DoubleZero));
        assert_eq!(report.winning_bets, 2);
        assert_eq!(report.payout, 30 * 35);
        assert_eq!(ledger.balance(), 965 + 1050);
    }

    #[test]
    fn test_net_does_not_wrap_on_huge_amounts() {
        let report = SettleReport {
            result: result(PocketLabel::Number(1)),
            staked: 1,
            payout: u64::MAX,
            winning_bets: 1,
        };
        assert_eq!(report.net(), u64::MAX as i128 - 1);
        assert!(report.net() > 0);

        let report = SettleReport {
            payout: 0,
            staked: u64::MAX,
            ..report
        };
        assert_eq!(report.net(), -(u64::MAX as i128));
    }

    #[test]
    fn test_saturating_payout_reports_positive_net() {
        let mut ledger = BettingLedger::new(u64::MAX, 35, ClearPolicy::Forfeit);
        ledger.place_bet(PocketLabel::Number(9), u64::MAX / 2).unwrap();
        let report = ledger.settle(result(PocketLabel::Number(9)));
        assert_eq!(report.payout, u64::MAX);
        assert!(report.net() > 0);
        assert_eq!(ledger.balance(), u64::MAX);
    }

    #[test]
    fn test_insufficient_balance_rejected() {
        let mut ledger = BettingLedger::new(40, 35, ClearPolicy::Forfeit);
        let err = ledger.place_bet(PocketLabel::Number(3), 50).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                balance: 40,
                amount: 50
            }
        );
        assert_eq!(ledger.balance(), 40);
        assert!(!ledger.has_bets());
        // Exactly the balance is fine
        ledger.place_bet(PocketLabel::Number(3), 40).unwrap();
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_chip_selection() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.place_chip(PocketLabel::Number(1)),
            Err(LedgerError::NoChipSelected)
        );
        assert_eq!(ledger.balance(), 1000);

        ledger.select_chip(25);
        assert_eq!(ledger.selected_chip(), Some(25));
        ledger.place_chip(PocketLabel::Number(1)).unwrap();
        ledger.place_chip(PocketLabel::Number(2)).unwrap();
        assert_eq!(ledger.balance(), 950);
        assert_eq!(ledger.bets().len(), 2);

        ledger.select_chip(0);
        assert_eq!(ledger.selected_chip(), None);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.place_bet(PocketLabel::Number(1), 0),
            Err(LedgerError::InvalidAmount)
        );
    }

    #[test]
    fn test_clear_forfeits_by_default() {
        let mut ledger = ledger();
        ledger.place_bet(PocketLabel::Number(5), 100).unwrap();
        assert_eq!(ledger.clear_bets(), 0);
        assert_eq!(ledger.balance(), 900);
        assert!(!ledger.has_bets());
    }

    #[test]
    fn test_clear_refund_policy() {
        let mut ledger = BettingLedger::new(1000, 35, ClearPolicy::Refund);
        ledger.place_bet(PocketLabel::Number(5), 100).unwrap();
        ledger.place_bet(PocketLabel::Number(6), 30).unwrap();
        assert_eq!(ledger.clear_bets(), 130);
        assert_eq!(ledger.balance(), 1000);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LedgerError::NoChipSelected.to_string(), "select a chip first");
        assert_eq!(
            LedgerError::UnknownPocket(PocketLabel::DoubleZero).to_string(),
            "no pocket 00 on this wheel"
        );
    }
}
