//! Easing curves for the attack rig

/// Snappy start, long settle (arm extension)
#[inline]
pub fn ease_out_quint(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(5)
}

/// Blade extension and retraction
#[inline]
pub fn ease_out_quart(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(4)
}

/// Quadratic ease in/out (swing angular interpolation)
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Fraction of the remaining distance covered after a per-frame approach
/// factor `k` has been applied `frames` times (fractional frames allowed).
#[inline]
pub fn approach_fraction(k: f32, frames: f32) -> f32 {
    1.0 - (1.0 - k).powf(frames)
}

/// Geometric decay of `factor` per frame over `frames` frames
#[inline]
pub fn decay(factor: f32, frames: f32) -> f32 {
    factor.powf(frames)
}
