//! Game state and core simulation types
//!
//! All simulation-relevant state lives here and is mutated only by `tick`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::attack::{AttackRig, Direction, SwingKind};
use super::population::Population;
use crate::config::{ActorConfig, GameConfig, MovementModel, WorldConfig};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Level cleared, next population arrives when the countdown ends
    Transition,
    /// Run ended
    GameOver,
}

/// One-shot events for the audio/particle layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    JabStarted { direction: Direction },
    SwingStarted { kind: SwingKind, sweep: f32 },
    FamilySpawned { family_id: u32, size: usize },
    /// Member marked hit, `remaining` members still need a hit
    MemberHit { family_id: u32, pos: Vec2, remaining: usize },
    TargetKilled { family_id: u32, pos: Vec2 },
    VulnerabilityStarted { family_id: u32 },
    /// A pending combo was abandoned for a newly struck family
    VulnerabilityOverridden { previous: u32, family_id: u32 },
    VulnerabilityExpired { family_id: u32 },
    FamilyEliminated { family_id: u32, size: usize },
    PlayerHit { lives_left: u8 },
    GameOver { score: u64 },
    LevelUp { level: u32 },
    LevelComplete { level: u32 },
}

/// Family silhouette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Triangle,
    Square,
    Diamond,
    Pentagon,
    Hexagon,
    Star,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::Triangle,
        Shape::Square,
        Shape::Diamond,
        Shape::Pentagon,
        Shape::Hexagon,
        Shape::Star,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Triangle => "triangle",
            Shape::Square => "square",
            Shape::Diamond => "diamond",
            Shape::Pentagon => "pentagon",
            Shape::Hexagon => "hexagon",
            Shape::Star => "star",
        }
    }
}

/// Family colours (0xRRGGBB), indexed by `Family::color`
pub const PALETTE: [u32; 6] = [0x66ffcc, 0xffcc66, 0xcc66ff, 0x66ccff, 0xff66cc, 0xccff66];

/// Colour of a vulnerable family while blinking
pub const VULNERABLE_COLOR: u32 = 0xff6666;

/// A drifting target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub pos: Vec2,
    /// px per nominal frame
    pub vel: Vec2,
    pub radius: f32,
    /// Owning family (back-reference)
    pub family_id: u32,
    pub alive: bool,
    /// Struck during the family's vulnerability window, awaiting the rest
    pub hit: bool,
    pub opacity: f32,
    /// Shrinking after death
    pub dying: bool,
    pub death_timer: f32,
    /// Fading in, harmless to the actor until done
    pub spawning: bool,
    pub spawn_progress: f32,
}

impl Target {
    pub fn new(family_id: u32, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            family_id,
            alive: true,
            hit: false,
            opacity: 1.0,
            dying: false,
            death_timer: 0.0,
            spawning: false,
            spawn_progress: 1.0,
        }
    }

    /// Alive and not already struck
    pub fn is_hittable(&self) -> bool {
        self.alive && !self.hit
    }

    /// Can hurt the actor on contact
    pub fn is_dangerous(&self) -> bool {
        self.alive && !self.hit && !self.spawning
    }

    pub fn mark_hit(&mut self, opacity: f32) {
        self.hit = true;
        self.opacity = opacity;
    }

    /// Undo a hit, returning to full opacity or to the fade-in level
    pub fn clear_hit(&mut self) {
        self.hit = false;
        self.opacity = if self.spawning { self.spawn_progress } else { 1.0 };
    }

    /// Kill the target, starting the shrink animation if enabled
    pub fn kill(&mut self, death_secs: f32) {
        self.alive = false;
        self.hit = false;
        self.dying = death_secs > 0.0;
        self.death_timer = death_secs;
    }
}

/// A group of targets sharing one elimination condition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub id: u32,
    pub shape: Shape,
    /// Index into `PALETTE`
    pub color: u8,
    pub members: Vec<Target>,
}

impl Family {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// Every member hit or already dead
    pub fn is_complete(&self) -> bool {
        self.members.iter().all(|m| m.hit || !m.alive)
    }

    /// No member alive or still animating its death
    pub fn is_gone(&self) -> bool {
        self.members.iter().all(|m| !m.alive && !m.dying)
    }

    pub fn has_hit_member(&self) -> bool {
        self.members.iter().any(|m| m.alive && m.hit)
    }

    /// Members still needing a hit
    pub fn remaining(&self) -> usize {
        self.members.iter().filter(|m| m.alive && !m.hit).count()
    }

    pub fn alive_count(&self) -> usize {
        self.members.iter().filter(|m| m.alive).count()
    }

    /// Undo a failed combo
    pub fn reset_hits(&mut self) {
        for member in self.members.iter_mut().filter(|m| m.alive && m.hit) {
            member.clear_hit();
        }
    }
}

/// The single family currently open to a combo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub family_id: Option<u32>,
    /// Seconds left
    pub timer: f32,
    pub duration: f32,
}

impl Vulnerability {
    pub fn new(duration: f32) -> Self {
        Self {
            family_id: None,
            timer: 0.0,
            duration,
        }
    }

    pub fn is_vulnerable(&self, family_id: u32) -> bool {
        self.family_id == Some(family_id)
    }

    pub fn assign(&mut self, family_id: u32) {
        self.family_id = Some(family_id);
        self.timer = self.duration;
    }

    pub fn clear(&mut self) {
        self.family_id = None;
        self.timer = 0.0;
    }

    /// Remaining share of the window, 0 when nothing is vulnerable
    pub fn remaining_fraction(&self) -> f32 {
        if self.family_id.is_some() && self.duration > 0.0 {
            (self.timer / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    /// px per nominal frame
    pub vel: Vec2,
    pub radius: f32,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub grounded: bool,
    /// Seconds of damage immunity left
    pub invulnerable: f32,
    /// Cosmetic camera offset
    pub shake: Vec2,
    pub rig: AttackRig,
}

impl Actor {
    pub fn new(pos: Vec2, config: &ActorConfig, neutral_angle: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: config.radius,
            facing: 1.0,
            grounded: false,
            invulnerable: 0.0,
            shake: Vec2::ZERO,
            rig: AttackRig::new(neutral_angle),
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    /// Apply the movement axis and integrate position
    pub fn apply_movement(&mut self, axis: Vec2, config: &ActorConfig, world: &WorldConfig, frames: f32) {
        let axis = axis.clamp_length_max(1.0);
        if axis.x != 0.0 {
            self.facing = axis.x.signum();
        }

        match config.movement {
            MovementModel::TopDown => {
                self.vel = axis * config.speed;
                self.pos += self.vel * frames;
            }
            MovementModel::Platformer {
                gravity,
                friction,
                accel,
                jump_speed,
            } => {
                self.vel.x += axis.x * accel * frames;
                self.vel.x *= friction.powf(frames);
                self.vel.x = self.vel.x.clamp(-config.speed, config.speed);
                if axis.y < 0.0 && self.grounded {
                    self.vel.y = -jump_speed;
                    self.grounded = false;
                }
                self.vel.y += gravity * frames;
                self.pos += self.vel * frames;
            }
        }

        let min = Vec2::splat(self.radius);
        let max = Vec2::new(world.width - self.radius, world.height - self.radius);
        if self.pos.x < min.x || self.pos.x > max.x {
            self.pos.x = self.pos.x.clamp(min.x, max.x);
            self.vel.x = 0.0;
        }
        self.grounded = false;
        if self.pos.y < min.y || self.pos.y >= max.y {
            if self.pos.y >= max.y {
                self.grounded = true;
            }
            self.pos.y = self.pos.y.clamp(min.y, max.y);
            self.vel.y = 0.0;
        }
    }

    /// Random shake offset of the given magnitude
    pub fn add_shake(&mut self, rng: &mut Pcg32, magnitude: f32) {
        self.shake = Vec2::new(
            (rng.random::<f32>() - 0.5) * magnitude,
            (rng.random::<f32>() - 0.5) * magnitude,
        );
    }

    pub fn decay_shake(&mut self, frames: f32) {
        self.shake *= 0.8f32.powf(frames);
        if self.shake.length_squared() < 1e-4 {
            self.shake = Vec2::ZERO;
        }
    }
}

/// A cosmetic spark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alpha: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Complete game state (deterministic per seed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub lives: u8,
    pub score: u64,
    pub level: u32,
    /// Simulation tick counter
    pub frame_count: u64,
    /// Seconds since the last interval spawn
    pub spawn_timer: f32,
    /// Seconds left before the next level populates
    pub transition_timer: f32,
    /// Seconds of gameplay freeze left
    pub freeze_timer: f32,
    pub actor: Actor,
    pub population: Population,
    pub vulnerability: Vulnerability,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Events raised during the latest tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game with the level 1 population
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut state = Self::new_empty(config, seed);
        state.populate_level();
        state.events.clear();
        log::info!(
            "{} game started (seed {}, {} families)",
            state.config.variant.as_str(),
            seed,
            state.population.len()
        );
        state
    }

    /// Create a new game with no targets
    pub fn new_empty(config: GameConfig, seed: u64) -> Self {
        let center = Vec2::new(config.world.width / 2.0, config.world.height / 2.0);
        let actor = Actor::new(center, &config.actor, config.attack.neutral_angle);
        let vulnerability = Vulnerability::new(config.combo.vulnerability_secs);
        Self {
            lives: config.actor.lives,
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            score: 0,
            level: 1,
            frame_count: 0,
            spawn_timer: 0.0,
            transition_timer: 0.0,
            freeze_timer: 0.0,
            actor,
            population: Population::new(),
            vulnerability,
            particles: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_timer > 0.0
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Spawn one family at a random position away from the actor
    pub fn spawn_family(&mut self) -> u32 {
        let id = self.population.spawn_family(
            &mut self.rng,
            &self.config,
            self.actor.pos,
        );
        let size = self.population.family(id).map_or(0, Family::size);
        log::debug!("Spawned family {} of {}", id, size);
        self.events.push(GameEvent::FamilySpawned { family_id: id, size });
        id
    }

    /// Spawn a family of `size` members around `center`
    pub fn spawn_family_at(&mut self, center: Vec2, size: usize) -> u32 {
        let shape = Shape::ALL[self.rng.random_range(0..Shape::ALL.len())];
        let color = self.rng.random_range(0..PALETTE.len()) as u8;
        let id = self.population.spawn_family_at(
            &mut self.rng,
            &self.config,
            center,
            size,
            shape,
            color,
        );
        self.events.push(GameEvent::FamilySpawned { family_id: id, size });
        id
    }

    /// Spawn the burst of families for the current level
    pub fn populate_level(&mut self) {
        let count = self.config.spawn.families_for_level(self.level);
        for _ in 0..count {
            self.spawn_family();
        }
    }

    /// Burst of cosmetic sparks at `pos`
    pub fn emit_particles(&mut self, pos: Vec2) {
        for i in 0..6 {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let angle = i as f32 / 6.0 * std::f32::consts::TAU + self.rng.random::<f32>() * 0.5;
            let speed = 2.0 + self.rng.random::<f32>() * 3.0;
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                alpha: 1.0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(sizes_hit: &[(bool, bool)]) -> Family {
        Family {
            id: 7,
            shape: Shape::Star,
            color: 0,
            members: sizes_hit
                .iter()
                .map(|&(alive, hit)| {
                    let mut t = Target::new(7, Vec2::ZERO, Vec2::ZERO, 15.0);
                    t.alive = alive;
                    t.hit = hit;
                    t
                })
                .collect(),
        }
    }

    #[test]
    fn test_family_completion() {
        assert!(!family(&[(true, true), (true, false)]).is_complete());
        assert!(family(&[(true, true), (false, false)]).is_complete());
        assert!(family(&[(true, true), (true, true)]).is_complete());
    }

    #[test]
    fn test_family_reset_hits() {
        let mut f = family(&[(true, true), (true, false), (true, true)]);
        f.members[0].opacity = 0.3;
        f.reset_hits();
        assert!(f.members.iter().all(|m| !m.hit && m.opacity == 1.0));
        assert_eq!(f.remaining(), 3);
    }

    #[test]
    fn test_clear_hit_keeps_fade_in_opacity() {
        let mut t = Target::new(1, Vec2::ZERO, Vec2::ZERO, 15.0);
        t.spawning = true;
        t.spawn_progress = 0.4;
        t.opacity = 0.4;
        t.mark_hit(0.3);
        t.clear_hit();
        assert!(!t.hit);
        assert!((t.opacity - 0.4).abs() < 1e-6);

        let mut f = family(&[(true, true)]);
        f.members[0].spawning = true;
        f.members[0].spawn_progress = 0.6;
        f.reset_hits();
        assert!((f.members[0].opacity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_kill_starts_death_animation() {
        let mut t = Target::new(1, Vec2::ZERO, Vec2::ZERO, 15.0);
        t.kill(0.3);
        assert!(!t.alive && t.dying);
        let mut t = Target::new(1, Vec2::ZERO, Vec2::ZERO, 15.0);
        t.kill(0.0);
        assert!(!t.alive && !t.dying);
    }

    #[test]
    fn test_vulnerability_fraction() {
        let mut v = Vulnerability::new(3.0);
        assert_eq!(v.remaining_fraction(), 0.0);
        v.assign(4);
        assert!(v.is_vulnerable(4));
        v.timer = 1.5;
        assert!((v.remaining_fraction() - 0.5).abs() < 1e-6);
        v.clear();
        assert!(!v.is_vulnerable(4));
    }

    #[test]
    fn test_top_down_movement_stops_and_clamps() {
        let config = GameConfig::default();
        let mut actor = Actor::new(Vec2::new(20.0, 300.0), &config.actor, 0.0);
        actor.apply_movement(Vec2::new(-1.0, 0.0), &config.actor, &config.world, 1.0);
        assert!((actor.pos.x - 15.0).abs() < 1e-5);
        actor.apply_movement(Vec2::new(-1.0, 0.0), &config.actor, &config.world, 1.0);
        assert!((actor.pos.x - config.actor.radius).abs() < 1e-5);
        actor.apply_movement(Vec2::ZERO, &config.actor, &config.world, 1.0);
        assert_eq!(actor.vel, Vec2::ZERO);
        assert_eq!(actor.facing, -1.0);
    }

    #[test]
    fn test_platformer_falls_and_jumps() {
        let config = GameConfig::from_variant(crate::config::Variant::Robot);
        let mut actor = Actor::new(Vec2::new(600.0, 300.0), &config.actor, 0.0);
        for _ in 0..200 {
            actor.apply_movement(Vec2::ZERO, &config.actor, &config.world, 1.0);
        }
        assert!(actor.grounded);
        let floor = config.world.height - config.actor.radius;
        assert!((actor.pos.y - floor).abs() < 1e-3);

        actor.apply_movement(Vec2::new(0.0, -1.0), &config.actor, &config.world, 1.0);
        assert!(actor.pos.y < floor);
        assert!(!actor.grounded);
    }

    #[test]
    fn test_new_game_spawns_level_population() {
        let state = GameState::new(GameConfig::default(), 42);
        assert_eq!(state.population.len(), 3);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level, 1);
        assert!(state.events.is_empty());
    }
}
