//! Pocket layout: wheel order and color classification
//!
//! A layout is the ordered sequence of pockets as they appear around the
//! wheel. Pocket `i` spans the slice `[i * w, (i + 1) * w)` in the wheel
//! frame, where `w = 2π / N`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::WheelVariant;

/// Numbers printed red on a standard wheel (same for both variants)
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Label printed on a pocket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PocketLabel {
    /// 0 through 36
    Number(u8),
    /// The American "00" pocket
    DoubleZero,
}

impl PocketLabel {
    /// Parse "0".."36" or "00"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "00" {
            return Some(PocketLabel::DoubleZero);
        }
        match s.parse::<u8>() {
            Ok(n) if n <= 36 => Some(PocketLabel::Number(n)),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, PocketLabel::Number(0) | PocketLabel::DoubleZero)
    }
}

impl fmt::Display for PocketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PocketLabel::Number(n) => write!(f, "{}", n),
            PocketLabel::DoubleZero => write!(f, "00"),
        }
    }
}

/// Pocket color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PocketColor {
    Red,
    Black,
    Green,
}

impl PocketColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PocketColor::Red => "red",
            PocketColor::Black => "black",
            PocketColor::Green => "green",
        }
    }
}

const fn n(v: u8) -> PocketLabel {
    PocketLabel::Number(v)
}

/// Single-zero wheel order, clockwise from zero
pub const EUROPEAN_SEQUENCE: [PocketLabel; 37] = [
    n(0), n(32), n(15), n(19), n(4), n(21), n(2), n(25), n(17), n(34), n(6), n(27), n(13),
    n(36), n(11), n(30), n(8), n(23), n(10), n(5), n(24), n(16), n(33), n(1), n(20), n(14),
    n(31), n(9), n(22), n(18), n(29), n(7), n(28), n(12), n(35), n(3), n(26),
];

/// Double-zero wheel order, clockwise from zero
pub const AMERICAN_SEQUENCE: [PocketLabel; 38] = [
    n(0), n(28), n(9), n(26), n(30), n(11), n(7), n(20), n(32), n(17), n(5), n(22), n(34),
    n(15), n(3), n(24), n(36), n(13), n(1), PocketLabel::DoubleZero, n(27), n(10), n(25),
    n(29), n(12), n(8), n(19), n(31), n(18), n(6), n(21), n(33), n(16), n(4), n(23), n(35),
    n(14), n(2),
];

/// Ordered pockets around the wheel, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PocketLayout {
    labels: Vec<PocketLabel>,
}

impl PocketLayout {
    /// Build a layout from an explicit wheel order.
    ///
    /// Panics on an empty sequence or duplicate labels; both are
    /// configuration bugs, not runtime conditions.
    pub fn new(labels: Vec<PocketLabel>) -> Self {
        assert!(!labels.is_empty(), "pocket layout must not be empty");
        for (i, label) in labels.iter().enumerate() {
            assert!(
                !labels[..i].contains(label),
                "duplicate pocket label {} in layout",
                label
            );
        }
        Self { labels }
    }

    pub fn european() -> Self {
        Self::new(EUROPEAN_SEQUENCE.to_vec())
    }

    pub fn american() -> Self {
        Self::new(AMERICAN_SEQUENCE.to_vec())
    }

    pub fn for_variant(variant: WheelVariant) -> Self {
        match variant {
            WheelVariant::European => Self::european(),
            WheelVariant::American => Self::american(),
        }
    }

    /// Number of pockets (N)
    #[inline]
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Angular width of one pocket (2π / N)
    #[inline]
    pub fn slice_width(&self) -> f32 {
        std::f32::consts::TAU / self.labels.len() as f32
    }

    /// Label at a wheel position (wraps modulo N)
    pub fn label_at(&self, index: usize) -> PocketLabel {
        self.labels[index % self.labels.len()]
    }

    /// Wheel position of a label, if the layout has it
    pub fn index_of(&self, label: PocketLabel) -> Option<usize> {
        self.labels.iter().position(|&l| l == label)
    }

    pub fn contains(&self, label: PocketLabel) -> bool {
        self.index_of(label).is_some()
    }

    /// Zero and double-zero are green, the fixed red set is red, the rest black
    pub fn color_of(&self, label: PocketLabel) -> PocketColor {
        match label {
            PocketLabel::Number(0) | PocketLabel::DoubleZero => PocketColor::Green,
            PocketLabel::Number(v) if RED_NUMBERS.contains(&v) => PocketColor::Red,
            PocketLabel::Number(_) => PocketColor::Black,
        }
    }

    pub fn labels(&self) -> &[PocketLabel] {
        &self.labels
    }
}
