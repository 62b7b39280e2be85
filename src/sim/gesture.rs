//! Swing gesture recognition
//!
//! A swing happens when a new attack direction is pressed while another is
//! still held. The press history decides how far the blade travels: a single
//! change of direction takes the short way round, a burst of rapid presses is
//! read as a full spin and takes the long way.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::attack::{Direction, SwingArc, SwingKind};
use crate::config::GestureMode;
use crate::shortest_angle_diff;

/// What a press turns into
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Jab(Direction),
    Swing(SwingArc),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PressRecord {
    direction: Direction,
    at: f64,
}

/// Rolling record of recent attack presses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureRecognizer {
    recent: Vec<PressRecord>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presses still inside the timing window (including the latest)
    pub fn recent_presses(&self) -> usize {
        self.recent.len()
    }

    /// Clear the press history
    pub fn reset(&mut self) {
        self.recent.clear();
    }

    /// Record a press at `at` seconds and decide what it starts.
    ///
    /// `held` is the direction currently held from an earlier jab, if any.
    /// `facing` is +1 when the actor faces right and -1 when it faces left;
    /// only four-way swings through the front use it.
    pub fn resolve(
        &mut self,
        held: Option<Direction>,
        pressed: Direction,
        at: f64,
        mode: &GestureMode,
        facing: f32,
    ) -> Gesture {
        self.recent.push(PressRecord {
            direction: pressed,
            at,
        });

        match *mode {
            GestureMode::FourWay => {
                self.recent.clear();
                match held {
                    Some(held) if held != pressed => {
                        Gesture::Swing(four_way_arc(held, pressed, facing))
                    }
                    _ => Gesture::Jab(pressed),
                }
            }
            GestureMode::Continuous {
                window_secs,
                long_way_presses,
            } => {
                let window = window_secs as f64;
                self.recent.retain(|p| at - p.at < window);

                match held {
                    Some(held) if held != pressed => {
                        let long_way = self.recent.len() >= long_way_presses;
                        Gesture::Swing(continuous_arc(held, pressed, long_way))
                    }
                    _ => Gesture::Jab(pressed),
                }
            }
        }
    }
}

/// Named swing for a (held, pressed) pair
pub fn four_way_arc(held: Direction, pressed: Direction, facing: f32) -> SwingArc {
    let front = if facing < 0.0 { -1.0 } else { 1.0 };
    match (held, pressed) {
        // Horizontal swings pass over the top
        (Direction::Left, Direction::Right) => SwingArc::new(SwingKind::LeftRight, PI, PI),
        (Direction::Right, Direction::Left) => SwingArc::new(SwingKind::RightLeft, 0.0, -PI),
        // Vertical swings pass through the side the actor faces
        (Direction::Up, Direction::Down) => {
            SwingArc::new(SwingKind::UpDown, -PI / 2.0, PI * front)
        }
        (Direction::Down, Direction::Up) => {
            SwingArc::new(SwingKind::DownUp, PI / 2.0, -PI * front)
        }
        _ => {
            let start = held.angle();
            let sweep = shortest_angle_diff(start, pressed.angle());
            SwingArc::new(SwingKind::Diagonal, start, sweep)
        }
    }
}

/// Arc from `held` to `pressed`, the short way or the long way round
pub fn continuous_arc(held: Direction, pressed: Direction, long_way: bool) -> SwingArc {
    let start = held.angle();
    let diff = shortest_angle_diff(start, pressed.angle());

    let clockwise = if long_way { diff <= 0.0 } else { diff > 0.0 };
    let sweep = if clockwise {
        if diff > 0.0 { diff } else { TAU + diff }
    } else if diff < 0.0 {
        diff
    } else {
        diff - TAU
    };

    SwingArc::new(SwingKind::Arc, start, sweep)
}
