//! Outcome resolution: map the ball's final angle to a pocket
//!
//! Offset convention (shared with the renderer): pocket `i` spans
//! `[offset + i * w, offset + (i + 1) * w)` in the wheel's frame.

use super::layout::PocketLayout;
use super::state::SpinResult;
use crate::normalize_angle;

/// Pocket index under a wheel-frame angle, always in [0, N)
pub fn pocket_index_at(layout: &PocketLayout, wheel_frame_angle: f32, pocket_offset: f32) -> usize {
    let rel = normalize_angle(wheel_frame_angle - pocket_offset);
    (rel / layout.slice_width()).floor() as usize % layout.size()
}

/// Wheel-frame angle of a pocket's center, in [0, 2π)
pub fn pocket_center_angle(layout: &PocketLayout, index: usize, pocket_offset: f32) -> f32 {
    let w = layout.slice_width();
    normalize_angle(pocket_offset + (index % layout.size()) as f32 * w + w / 2.0)
}

/// Resolve the winning pocket from world-space wheel and ball angles
pub fn resolve(
    layout: &PocketLayout,
    wheel_angle: f32,
    ball_angle: f32,
    pocket_offset: f32,
) -> SpinResult {
    let pocket_index = pocket_index_at(layout, ball_angle - wheel_angle, pocket_offset);
    let label = layout.label_at(pocket_index);
    SpinResult {
        pocket_index,
        label,
        color: layout.color_of(label),
    }
}
