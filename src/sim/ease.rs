//! Easing curves for scripted animation segments.

/// Cubic ease-out mapping.
/// Input: linear progress in [0.0, 1.0].
/// Output: eased progress in [0.0, 1.0], fast start, gentle stop.
pub fn ease_out_cubic(progress: f32) -> f32 {
    let t = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
