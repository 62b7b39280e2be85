//! Attack rig: jab and swing animation
//!
//! The rig turns directional presses into arm/blade poses over time. The pose
//! is the single source of truth for both hit detection and rendering, so all
//! timing constants here are gameplay constants, not just visuals.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::easing::{approach_fraction, decay, ease_in_out, ease_out_quart, ease_out_quint};
use super::gesture::{Gesture, GestureRecognizer};
use crate::config::{AttackTiming, GestureMode};
use crate::consts::{BLADE_ACTIVE_EXTENSION, RETRACTED_EPSILON};
use crate::{polar_to_cartesian, wrap_angle};

/// Attack input direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Screen-space angle (y grows downward)
    pub fn angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            Direction::Up => -FRAC_PI_2,
            Direction::Down => FRAC_PI_2,
            Direction::Left => PI,
            Direction::Right => 0.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Named swing shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwingKind {
    LeftRight,
    RightLeft,
    UpDown,
    DownUp,
    Diagonal,
    /// Free arc from the continuous recognizer
    Arc,
}

/// A scripted swing from `start` through `sweep` radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingArc {
    pub kind: SwingKind,
    pub start: f32,
    /// Signed travel, positive is clockwise on screen
    pub sweep: f32,
}

impl SwingArc {
    pub fn new(kind: SwingKind, start: f32, sweep: f32) -> Self {
        Self { kind, start, sweep }
    }

    pub fn end(&self) -> f32 {
        self.start + self.sweep
    }

    /// +1 clockwise, -1 counter-clockwise
    pub fn direction(&self) -> i8 {
        if self.sweep >= 0.0 { 1 } else { -1 }
    }

    /// Arm angle at swing progress `p`
    pub fn angle_at(&self, p: f32) -> f32 {
        self.start + ease_in_out(p) * self.sweep
    }
}

/// Current attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackState {
    Idle,
    Jab(Direction),
    Swing(SwingArc),
}

/// Trail point for blade rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub alpha: f32,
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 32;

/// The actor's arm and blade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackRig {
    pub state: AttackState,
    /// Phase of the current attack, reset on entry
    pub progress: f32,
    pub arm_angle: f32,
    /// Blade angle relative to the arm
    pub blade_angle: f32,
    pub arm_extension: f32,
    pub blade_extension: f32,
    /// Direction still held from the jab that started the current attack
    pub held: Option<Direction>,
    /// Recent blade tip positions (oldest first)
    pub trail: Vec<TrailPoint>,
    pub gestures: GestureRecognizer,
}

impl AttackRig {
    pub fn new(neutral_angle: f32) -> Self {
        Self {
            state: AttackState::Idle,
            progress: 0.0,
            arm_angle: neutral_angle,
            blade_angle: 0.0,
            arm_extension: 0.0,
            blade_extension: 0.0,
            held: None,
            trail: Vec::with_capacity(TRAIL_LENGTH),
            gestures: GestureRecognizer::new(),
        }
    }

    /// Handle an attack press. Any attack in flight is replaced.
    pub fn press(
        &mut self,
        direction: Direction,
        at: f64,
        mode: &GestureMode,
        facing: f32,
    ) -> Gesture {
        let gesture = self
            .gestures
            .resolve(self.held, direction, at, mode, facing);

        match gesture {
            Gesture::Swing(arc) => {
                self.state = AttackState::Swing(arc);
                self.held = None;
            }
            Gesture::Jab(direction) => {
                self.state = AttackState::Jab(direction);
                self.held = Some(direction);
            }
        }
        self.progress = 0.0;
        self.trail.clear();

        gesture
    }

    /// Handle an attack release
    pub fn release(&mut self, direction: Direction) {
        if self.held == Some(direction) {
            self.held = None;
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, AttackState::Idle)
    }

    /// Whether the blade is out far enough to cut
    pub fn is_active(&self) -> bool {
        self.arm_extension > BLADE_ACTIVE_EXTENSION && self.blade_extension > BLADE_ACTIVE_EXTENSION
    }

    /// Arm end and blade tip for a rig pivoting at `pivot`
    pub fn blade_points(&self, pivot: Vec2, timing: &AttackTiming) -> (Vec2, Vec2) {
        let arm_end = pivot + polar_to_cartesian(timing.arm_length * self.arm_extension, self.arm_angle);
        let tip = arm_end
            + polar_to_cartesian(
                timing.blade_length * self.blade_extension,
                self.arm_angle + self.blade_angle,
            );
        (arm_end, tip)
    }

    /// Cutting segment, or `None` while the blade is below the activation threshold
    pub fn blade_segment(&self, pivot: Vec2, timing: &AttackTiming) -> Option<(Vec2, Vec2)> {
        self.is_active().then(|| self.blade_points(pivot, timing))
    }

    /// Advance the animation by `frames` nominal frames
    pub fn advance(&mut self, pivot: Vec2, timing: &AttackTiming, frames: f32) {
        match self.state {
            AttackState::Jab(direction) => self.advance_jab(direction, pivot, timing, frames),
            AttackState::Swing(arc) => self.advance_swing(arc, pivot, timing, frames),
            AttackState::Idle => self.advance_idle(timing, frames),
        }
    }

    fn advance_jab(&mut self, direction: Direction, pivot: Vec2, timing: &AttackTiming, frames: f32) {
        let held = self.held == Some(direction);
        let overshoot = timing.jab_overshoot;

        self.progress = (self.progress + timing.jab_rate * frames).min(1.0);
        let p = self.progress;
        self.arm_angle = direction.angle();
        self.blade_angle = 0.0;

        if held {
            // Extend and plateau until release
            self.arm_extension = ease_out_quint((p / 0.2).min(1.0));
            let blade_p = ((p - 0.1) / 0.4).clamp(0.0, 1.0);
            self.blade_extension = ease_out_quart(blade_p) * overshoot;
        } else if p < 0.2 {
            self.arm_extension = ease_out_quint(p / 0.2);
            self.blade_extension = 0.0;
        } else if p < 0.5 {
            self.arm_extension = 1.0;
            self.blade_extension = ease_out_quart((p - 0.2) / 0.3) * overshoot;
        } else {
            let retract = (p - 0.5) / 0.5;
            self.blade_extension = overshoot * (1.0 - ease_out_quart((retract * 1.5).min(1.0)));
            self.arm_extension = 1.0 - ease_out_quart(((retract - 0.3) / 0.7).max(0.0));
            if self.arm_extension < RETRACTED_EPSILON && self.blade_extension < RETRACTED_EPSILON {
                self.state = AttackState::Idle;
                self.arm_extension = 0.0;
                self.blade_extension = 0.0;
            }
        }

        if self.progress < 0.5 {
            self.record_trail(pivot, timing);
        }
    }

    fn advance_swing(&mut self, arc: SwingArc, pivot: Vec2, timing: &AttackTiming, frames: f32) {
        self.progress += timing.swing_rate * frames;

        if self.progress >= 1.0 {
            self.state = AttackState::Idle;
            self.progress = 0.0;
            self.arm_angle = wrap_angle(arc.end());
            self.blade_angle = 0.0;
            self.arm_extension = 0.0;
            self.blade_extension = 0.0;
            return;
        }

        let p = self.progress;
        self.arm_extension = 1.0;
        self.blade_extension = timing.swing_blade_extension;
        self.arm_angle = arc.angle_at(p);
        self.blade_angle = (p * std::f32::consts::PI).sin() * timing.swing_blade_wobble;

        self.record_trail(pivot, timing);
    }

    fn advance_idle(&mut self, timing: &AttackTiming, frames: f32) {
        let approach = approach_fraction(timing.idle_arm_approach, frames);
        self.arm_angle += (timing.neutral_angle - self.arm_angle) * approach;
        self.blade_angle *= decay(timing.idle_blade_angle_decay, frames);

        let ext_decay = decay(timing.idle_extension_decay, frames);
        self.blade_extension *= ext_decay;
        self.arm_extension *= ext_decay;
        if self.blade_extension < RETRACTED_EPSILON {
            self.blade_extension = 0.0;
        }
        if self.arm_extension < RETRACTED_EPSILON {
            self.arm_extension = 0.0;
        }
    }

    fn record_trail(&mut self, pivot: Vec2, timing: &AttackTiming) {
        if !self.is_active() {
            return;
        }
        let (_, tip) = self.blade_points(pivot, timing);
        self.trail.push(TrailPoint { pos: tip, alpha: 1.0 });
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }

    /// Fade trail points (ambient clock)
    pub fn fade_trail(&mut self, timing: &AttackTiming, frames: f32) {
        let fade = timing.trail_fade * frames;
        self.trail.retain_mut(|point| {
            point.alpha -= fade;
            point.alpha > 0.0
        });
    }
}
