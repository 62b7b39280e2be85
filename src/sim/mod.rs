//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by family id)
//! - No rendering or platform dependencies

pub mod attack;
pub mod clock;
pub mod combat;
pub mod easing;
pub mod geometry;
pub mod gesture;
pub mod population;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use attack::{AttackRig, AttackState, Direction, SwingArc, SwingKind};
pub use clock::FrameClock;
pub use geometry::sweep_hits_circle;
pub use gesture::{Gesture, GestureRecognizer};
pub use population::{Population, TargetRef};
pub use snapshot::RenderSnapshot;
pub use state::{Actor, Family, GameEvent, GamePhase, GameState, Shape, Target, Vulnerability};
pub use tick::{AttackInput, TickInput, tick};
