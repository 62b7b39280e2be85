//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::attack::{Direction, SwingArc};
use super::clock::FrameClock;
use super::combat;
use super::gesture::Gesture;
use super::state::{GameEvent, GamePhase, GameState};
use crate::config::SpawnMode;

/// Attack key transitions, applied in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackInput {
    /// Direction pressed at `at` seconds on the host clock
    Press { direction: Direction, at: f64 },
    Release { direction: Direction },
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Attack presses and releases since the last tick
    pub attack: Vec<AttackInput>,
    /// Movement axis, each component in [-1, 1] (negative y is up/jump)
    pub movement: Vec2,
    /// Speed modifier held (full speed instead of slow motion)
    pub fast: bool,
}

/// Advance the game state by `dt` real seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();
    let clock = FrameClock::for_input(dt, input.fast, &state.config.time);

    // Attacks start even during a freeze, nothing starts after game over
    if !state.is_game_over() {
        apply_attack_input(state, &input.attack);
    }

    update_ambient(state, &clock);

    if state.is_game_over() {
        return;
    }
    state.frame_count += 1;

    // Freeze-frames stretch with slow motion like every other timer
    if state.freeze_timer > 0.0 {
        state.freeze_timer = (state.freeze_timer - clock.secs).max(0.0);
        return;
    }

    if state.phase == GamePhase::Transition {
        combat::update_transition(state, clock.secs);
        return;
    }

    update_gameplay(state, input.movement, &clock);
}

fn apply_attack_input(state: &mut GameState, inputs: &[AttackInput]) {
    for input in inputs {
        match *input {
            AttackInput::Press { direction, at } => {
                let facing = state.actor.facing;
                let gesture = state
                    .actor
                    .rig
                    .press(direction, at, &state.config.gesture, facing);
                state.events.push(match gesture {
                    Gesture::Jab(direction) => GameEvent::JabStarted { direction },
                    Gesture::Swing(SwingArc { kind, sweep, .. }) => {
                        GameEvent::SwingStarted { kind, sweep }
                    }
                });
            }
            AttackInput::Release { direction } => state.actor.rig.release(direction),
        }
    }
}

/// Cosmetic decay that keeps running through freezes and transitions
fn update_ambient(state: &mut GameState, clock: &FrameClock) {
    let frames = clock.frames;

    state.actor.rig.fade_trail(&state.config.attack, frames);
    state.actor.decay_shake(frames);

    let drag = 0.95f32.powf(frames);
    state.particles.retain_mut(|p| {
        p.pos += p.vel * frames;
        p.vel *= drag;
        p.alpha -= 0.03 * frames;
        p.alpha > 0.0
    });

    state.population.advance_dying(clock.secs);
}

fn update_gameplay(state: &mut GameState, movement: Vec2, clock: &FrameClock) {
    let frames = clock.frames;
    let secs = clock.secs;

    // Movement
    state
        .actor
        .apply_movement(movement, &state.config.actor, &state.config.world, frames);
    state
        .population
        .drift(&mut state.rng, &state.config.targets, &state.config.world, frames);
    state
        .population
        .advance_spawning(state.config.targets.spawn_secs, secs);

    // Spawn cadence
    if state.config.spawn.mode == SpawnMode::Continuous {
        state.spawn_timer += secs;
        let interval = state.config.spawn.interval_for_level(state.level);
        if state.spawn_timer >= interval {
            state.spawn_timer -= interval;
            state.spawn_family();
        }
    }

    // Attack rig, then everything it touches
    let pivot = state.actor.pos;
    state.actor.rig.advance(pivot, &state.config.attack, frames);
    combat::run_blade_sweep(state);
    combat::check_player_collisions(state);
    if state.is_game_over() {
        return;
    }

    combat::update_invulnerability(state, secs);
    combat::update_vulnerability(state, secs);
    combat::update_level(state);

    for id in state.population.prune() {
        log::trace!("Pruned family {}", id);
    }
}
