//! Host-facing driver
//!
//! Collects input between frames and runs the simulation on a fixed
//! timestep, the way a browser or native frame loop would.

use glam::Vec2;

use crate::config::{GameConfig, Variant};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{AttackInput, Direction, GameEvent, GameState, RenderSnapshot, TickInput, tick};

pub struct Game {
    state: GameState,
    input: TickInput,
    accumulator: f32,
    /// Wall-clock seconds since the game started
    clock_secs: f64,
    /// Events raised since the last drain
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            state: GameState::new(config, seed),
            input: TickInput::default(),
            accumulator: 0.0,
            clock_secs: 0.0,
            events: Vec::new(),
        }
    }

    pub fn with_variant(variant: Variant, seed: u64) -> Self {
        Self::new(GameConfig::from_variant(variant), seed)
    }

    /// Start over with the same rules
    pub fn restart(&mut self, seed: u64) {
        let config = self.state.config.clone();
        *self = Self::new(config, seed);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for hosts and tests that stage scenarios
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.state.config
    }

    /// Seconds of wall time fed through `update`
    pub fn clock_secs(&self) -> f64 {
        self.clock_secs
    }

    /// Attack press timestamped with the game clock
    pub fn on_direction_press(&mut self, direction: Direction) {
        self.on_direction_press_at(direction, self.clock_secs);
    }

    /// Attack press with a host-supplied timestamp in seconds
    pub fn on_direction_press_at(&mut self, direction: Direction, secs: f64) {
        self.input.attack.push(AttackInput::Press { direction, at: secs });
    }

    pub fn on_direction_release(&mut self, direction: Direction) {
        self.input.attack.push(AttackInput::Release { direction });
    }

    /// Movement axis, held until changed
    pub fn on_movement_axis(&mut self, dx: f32, dy: f32) {
        self.input.movement = Vec2::new(dx, dy).clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Speed modifier (full speed instead of slow motion)
    pub fn set_modifier(&mut self, held: bool) {
        self.input.fast = held;
    }

    pub fn is_modifier_held(&self) -> bool {
        self.input.fast
    }

    /// Advance by `dt` seconds of wall time
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.events.extend_from_slice(&self.state.events);
            self.accumulator -= SIM_DT;
            self.clock_secs += SIM_DT as f64;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.attack.clear();
        }

        // Drop the backlog rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
    }

    /// Render view including events not yet drained
    pub fn snapshot(&self) -> RenderSnapshot {
        let mut snapshot = RenderSnapshot::capture(&self.state);
        snapshot.events = self.events.clone();
        snapshot
    }

    /// Hand pending events to the audio/particle layer
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    #[test]
    fn test_update_runs_fixed_substeps() {
        let mut game = Game::with_variant(Variant::Arena, 1);
        game.update(SIM_DT * 2.5);
        assert_eq!(game.state().frame_count, 2);
        game.update(SIM_DT * 0.6);
        assert_eq!(game.state().frame_count, 3);
    }

    #[test]
    fn test_large_dt_is_capped() {
        let mut game = Game::with_variant(Variant::Arena, 1);
        game.update(5.0);
        assert_eq!(game.state().frame_count, MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_press_is_consumed_once() {
        let mut game = Game::with_variant(Variant::Arena, 2);
        game.on_direction_press(Direction::Left);
        game.update(SIM_DT * 3.0);
        let jabs = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::JabStarted { .. }))
            .count();
        assert_eq!(jabs, 1);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_modifier_and_axis() {
        let mut game = Game::with_variant(Variant::Arena, 3);
        assert!(!game.is_modifier_held());
        game.set_modifier(true);
        assert!(game.is_modifier_held());
        game.on_movement_axis(4.0, -2.0);
        assert_eq!(game.input.movement, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_restart_keeps_rules() {
        let mut game = Game::with_variant(Variant::Gauntlet, 4);
        game.update(SIM_DT * 3.0);
        game.restart(5);
        assert_eq!(game.config().variant, Variant::Gauntlet);
        assert_eq!(game.state().frame_count, 0);
        assert_eq!(game.state().phase, GamePhase::Playing);
    }
}
