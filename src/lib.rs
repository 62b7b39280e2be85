//! Shape Slash - blade-swinging family elimination arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (attack rig, targets, vulnerability, clock)
//! - `config`: Data-driven variation points and variant presets
//! - `game`: Input surface, fixed timestep driver and render snapshots

pub mod config;
pub mod game;
pub mod sim;

pub use config::{ConfigError, GameConfig, Variant};
pub use game::Game;

use glam::Vec2;

/// Game-wide timing constants
pub mod consts {
    /// Fixed simulation timestep used by the `Game` driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Rate that all per-frame tuning constants are expressed against
    pub const NOMINAL_HZ: f32 = 60.0;

    /// Minimum arm and blade extension before the blade can cut
    pub const BLADE_ACTIVE_EXTENSION: f32 = 0.3;
    /// Extension below which the rig counts as fully retracted
    pub const RETRACTED_EPSILON: f32 = 0.01;
}

/// Wrap an angle to (-π, π]; non-finite input maps to 0
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    angle = angle.rem_euclid(TAU);
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Signed shortest rotation taking `from` onto `to`, in (-π, π]
#[inline]
pub fn shortest_angle_diff(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
