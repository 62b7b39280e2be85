//! Shape Slash - native headless runner
//!
//! Usage: shape-slash [variant] [seed] [frames]
//!
//! Plays a run with a scripted bot and logs what happens. Set RUST_LOG=debug
//! for vulnerability and spawn detail.

use glam::Vec2;

use shape_slash::consts::SIM_DT;
use shape_slash::sim::{Direction, GameEvent, GameState};
use shape_slash::{Game, Variant};

/// Preferred distance between the actor and its target
const STRIKE_RANGE: f32 = 70.0;
/// Frames between bot attacks
const ATTACK_COOLDOWN: u32 = 12;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let variant = match args.next() {
        Some(name) => Variant::from_str(&name).unwrap_or_else(|| {
            log::warn!("Unknown variant {:?}, using Arena", name);
            Variant::Arena
        }),
        None => Variant::Arena,
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let frames: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3600);

    log::info!("Shape Slash (native) starting: {} seed {} for {} frames", variant.as_str(), seed, frames);

    let mut game = Game::with_variant(variant, seed);
    let mut bot = Bot::default();

    for _ in 0..frames {
        bot.drive(&mut game);
        game.update(SIM_DT);
        for event in game.drain_events() {
            log_event(&event);
        }
        if game.state().is_game_over() {
            break;
        }
    }

    let state = game.state();
    println!(
        "{}: score {} level {} lives {} after {} frames",
        variant.as_str(),
        state.score,
        state.level,
        state.lives,
        state.frame_count
    );
}

/// Walks toward the nearest target and strikes at it
#[derive(Default)]
struct Bot {
    cooldown: u32,
    held: Option<Direction>,
}

impl Bot {
    fn drive(&mut self, game: &mut Game) {
        game.set_modifier(true);
        self.cooldown = self.cooldown.saturating_sub(1);

        let Some(target) = nearest_target(game.state()) else {
            game.on_movement_axis(0.0, 0.0);
            self.release(game);
            return;
        };

        let offset = target - game.state().actor.pos;
        let distance = offset.length();
        let axis = if distance > STRIKE_RANGE {
            offset / distance
        } else if distance < STRIKE_RANGE * 0.6 {
            -offset / distance.max(1.0)
        } else {
            Vec2::ZERO
        };
        game.on_movement_axis(axis.x, axis.y);

        if distance > STRIKE_RANGE * 1.3 || self.cooldown > 0 {
            return;
        }

        let direction = direction_toward(offset);
        match self.held {
            // Holding a neighbouring direction turns the strike into a swing
            Some(held) if held != direction => {
                game.on_direction_press(direction);
                game.on_direction_release(held);
                game.on_direction_release(direction);
                self.held = None;
            }
            // Otherwise wind up from a quarter turn away
            _ => {
                self.release(game);
                let wind_up = quarter_turn(direction.opposite());
                game.on_direction_press(wind_up);
                self.held = Some(wind_up);
            }
        }
        self.cooldown = ATTACK_COOLDOWN;
    }

    fn release(&mut self, game: &mut Game) {
        if let Some(held) = self.held.take() {
            game.on_direction_release(held);
        }
    }
}

/// Quarter turn clockwise
fn quarter_turn(direction: Direction) -> Direction {
    match direction {
        Direction::Up => Direction::Right,
        Direction::Right => Direction::Down,
        Direction::Down => Direction::Left,
        Direction::Left => Direction::Up,
    }
}

fn nearest_target(state: &GameState) -> Option<Vec2> {
    let actor = state.actor.pos;
    state
        .population
        .targets()
        .filter(|(_, t)| t.is_hittable())
        .map(|(_, t)| t.pos)
        .min_by(|a, b| a.distance_squared(actor).total_cmp(&b.distance_squared(actor)))
}

fn direction_toward(offset: Vec2) -> Direction {
    if offset.x.abs() >= offset.y.abs() {
        if offset.x >= 0.0 { Direction::Right } else { Direction::Left }
    } else if offset.y >= 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PlayerHit { lives_left } => log::info!("Hit! {} lives left", lives_left),
        GameEvent::FamilyEliminated { family_id, size } if *size > 1 => {
            log::info!("Combo: family {} ({} members)", family_id, size)
        }
        GameEvent::VulnerabilityOverridden { previous, family_id } => {
            log::debug!("Switched combo from family {} to {}", previous, family_id)
        }
        GameEvent::JabStarted { .. } | GameEvent::SwingStarted { .. } => {
            log::trace!("{:?}", event)
        }
        _ => log::debug!("{:?}", event),
    }
}
