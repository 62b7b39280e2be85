//! Frame clock
//!
//! Tuning constants are expressed per nominal 60 Hz frame. A tick of `dt`
//! real seconds under time factor `f` covers `dt * 60 * f` nominal frames and
//! `dt * f` scaled seconds.

use crate::config::TimeConfig;
use crate::consts::NOMINAL_HZ;

/// Deltas for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    /// Unscaled wall-clock seconds
    pub real_secs: f32,
    pub time_factor: f32,
    /// Nominal frames elapsed (scaled)
    pub frames: f32,
    /// Seconds elapsed (scaled)
    pub secs: f32,
}

impl FrameClock {
    pub fn new(dt: f32, time_factor: f32) -> Self {
        let dt = dt.max(0.0);
        let frames = dt * NOMINAL_HZ * time_factor;
        Self {
            real_secs: dt,
            time_factor,
            frames,
            secs: frames / NOMINAL_HZ,
        }
    }

    /// Clock for a tick with or without the speed modifier held
    pub fn for_input(dt: f32, fast: bool, time: &TimeConfig) -> Self {
        let factor = if fast { time.fast_factor } else { time.slow_factor };
        Self::new(dt, factor)
    }
}
