//! Game configuration and variant presets
//!
//! Every rule variation the builds of the game disagree on lives here, so a
//! single simulation core can run any of them. Per-frame rates are expressed
//! against a nominal 60 Hz frame and durations in seconds; the clock scales
//! both by the time factor.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Named rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Top-down, endless spawning, level from score
    #[default]
    Arena,
    /// Top-down, population bursts, level on clearance
    Gauntlet,
    /// Side-scrolling robot with gravity and four-way swings
    Robot,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Arena => "Arena",
            Variant::Gauntlet => "Gauntlet",
            Variant::Robot => "Robot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arena" => Some(Variant::Arena),
            "gauntlet" => Some(Variant::Gauntlet),
            "robot" | "platformer" => Some(Variant::Robot),
            _ => None,
        }
    }
}

/// Playfield bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    /// Cluster centres stay this far inside the edges
    pub spawn_margin: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            spawn_margin: 50.0,
        }
    }
}

/// How the actor responds to the movement axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementModel {
    /// Velocity follows the axis directly, immediate stop on release
    TopDown,
    /// Horizontal acceleration with friction, gravity, jump on up
    Platformer {
        /// Downward acceleration (px/frame²)
        gravity: f32,
        /// Horizontal velocity kept per frame
        friction: f32,
        /// Horizontal acceleration (px/frame²)
        accel: f32,
        /// Initial upward speed of a jump (px/frame)
        jump_speed: f32,
    },
}

/// Player character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub radius: f32,
    /// Top speed (px/frame)
    pub speed: f32,
    pub lives: u8,
    /// Damage immunity after losing a life (seconds)
    pub invulnerable_secs: f32,
    pub movement: MovementModel,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            radius: 12.0,
            speed: 5.0,
            lives: 3,
            invulnerable_secs: 2.0,
            movement: MovementModel::TopDown,
        }
    }
}

/// Drifting targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub radius: f32,
    /// Spread of the initial velocity (px/frame)
    pub initial_speed: f32,
    /// Speed clamp (px/frame)
    pub max_speed: f32,
    /// Chance per frame of a random velocity nudge
    pub nudge_chance: f32,
    /// Spread of a nudge (px/frame)
    pub nudge_strength: f32,
    /// Fade-in length for new targets, 0 disables (seconds)
    pub spawn_secs: f32,
    /// Shrink animation after death, 0 disables (seconds)
    pub death_secs: f32,
    /// Opacity of a target that has been hit but not yet killed
    pub hit_opacity: f32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            radius: 15.0,
            initial_speed: 0.5,
            max_speed: 1.0,
            nudge_chance: 0.02,
            nudge_strength: 0.3,
            spawn_secs: 0.0,
            death_secs: 0.0,
            hit_opacity: 0.3,
        }
    }
}

/// Whether families keep arriving during a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Interval timer runs whatever the remaining population
    Continuous,
    /// Families only arrive in a burst at level start
    LevelBurst,
}

/// Family spawning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub mode: SpawnMode,
    /// Relative weight of family size `i + 1`
    pub size_weights: Vec<f32>,
    pub base_interval_secs: f32,
    /// Interval reduction per level
    pub interval_step_secs: f32,
    pub min_interval_secs: f32,
    /// Families spawned at the start of level 1
    pub base_families: u32,
    /// Extra families per level
    pub families_per_level: u32,
    /// Minimum distance between a cluster centre and the actor
    pub min_distance: f32,
    /// Members sit this far from the cluster centre, plus jitter
    pub ring_radius: f32,
    pub ring_jitter: f32,
    /// Rejection sampling budget for a cluster centre
    pub placement_attempts: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            mode: SpawnMode::Continuous,
            size_weights: vec![1.0, 1.0, 1.0, 1.0],
            base_interval_secs: 5.0,
            interval_step_secs: 0.5,
            min_interval_secs: 1.0,
            base_families: 3,
            families_per_level: 1,
            min_distance: 150.0,
            ring_radius: 40.0,
            ring_jitter: 20.0,
            placement_attempts: 64,
        }
    }
}

impl SpawnConfig {
    /// Seconds between spawns on the given level
    pub fn interval_for_level(&self, level: u32) -> f32 {
        let reduction = level.saturating_sub(1) as f32 * self.interval_step_secs;
        (self.base_interval_secs - reduction).max(self.min_interval_secs)
    }

    /// Families spawned when the given level starts
    pub fn families_for_level(&self, level: u32) -> u32 {
        self.base_families + level.saturating_sub(1) * self.families_per_level
    }
}

/// How the level counter advances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelPolicy {
    /// Level = score / points_per_level + 1, repopulated on every increase
    ScoreThreshold { points_per_level: u32 },
    /// Next level once no alive or dying target remains
    Clearance { transition_secs: f32 },
}

/// Vulnerability windows, freeze-frames and scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub vulnerability_secs: f32,
    /// Gameplay pause after a family elimination (seconds)
    pub freeze_secs: f32,
    pub points_per_kill: u32,
    /// Shake after marking a member hit
    pub hit_shake: f32,
    /// Shake after killing a singleton
    pub kill_shake: f32,
    /// Shake per member of an eliminated family
    pub elimination_shake_per_member: f32,
    /// Shake when the actor takes damage
    pub damage_shake: f32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            vulnerability_secs: 3.0,
            freeze_secs: 0.1,
            points_per_kill: 1,
            hit_shake: 4.0,
            kill_shake: 6.0,
            elimination_shake_per_member: 3.0,
            damage_shake: 15.0,
        }
    }
}

/// Attack animation constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackTiming {
    /// Jab progress per frame
    pub jab_rate: f32,
    /// Swing progress per frame
    pub swing_rate: f32,
    /// Peak blade extension of a jab
    pub jab_overshoot: f32,
    /// Blade extension held through a swing
    pub swing_blade_extension: f32,
    /// Blade lag amplitude during a swing (radians)
    pub swing_blade_wobble: f32,
    pub arm_length: f32,
    pub blade_length: f32,
    /// Arm angle the idle rig settles to (radians)
    pub neutral_angle: f32,
    /// Fraction of the way to neutral covered per idle frame
    pub idle_arm_approach: f32,
    pub idle_blade_angle_decay: f32,
    pub idle_extension_decay: f32,
    /// Trail opacity lost per frame
    pub trail_fade: f32,
}

impl Default for AttackTiming {
    fn default() -> Self {
        Self {
            jab_rate: 0.24,
            swing_rate: 0.16,
            jab_overshoot: 1.5,
            swing_blade_extension: 1.2,
            swing_blade_wobble: 0.15,
            arm_length: 15.0,
            blade_length: 70.0,
            neutral_angle: -std::f32::consts::FRAC_PI_2,
            idle_arm_approach: 0.15,
            idle_blade_angle_decay: 0.8,
            idle_extension_decay: 0.85,
            trail_fade: 0.15,
        }
    }
}

/// Swing recognition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureMode {
    /// Fixed named swings per direction pair
    FourWay,
    /// Shortest-path arcs, long way round after rapid presses
    Continuous {
        window_secs: f32,
        long_way_presses: usize,
    },
}

impl Default for GestureMode {
    fn default() -> Self {
        GestureMode::Continuous {
            window_secs: 0.150,
            long_way_presses: 3,
        }
    }
}

/// Time factors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Default slow motion
    pub slow_factor: f32,
    /// While the modifier is held
    pub fast_factor: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            slow_factor: 0.35,
            fast_factor: 1.0,
        }
    }
}

/// Complete rule set for one build of the game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,
    pub world: WorldConfig,
    pub actor: ActorConfig,
    pub targets: TargetConfig,
    pub spawn: SpawnConfig,
    pub level: LevelPolicy,
    pub combo: ComboConfig,
    pub attack: AttackTiming,
    pub gesture: GestureMode,
    pub time: TimeConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_variant(Variant::Arena)
    }
}

impl GameConfig {
    /// Build the preset rule set for a variant
    pub fn from_variant(variant: Variant) -> Self {
        let base = Self {
            variant,
            world: WorldConfig::default(),
            actor: ActorConfig::default(),
            targets: TargetConfig::default(),
            spawn: SpawnConfig::default(),
            level: LevelPolicy::ScoreThreshold {
                points_per_level: 10,
            },
            combo: ComboConfig::default(),
            attack: AttackTiming::default(),
            gesture: GestureMode::default(),
            time: TimeConfig::default(),
        };

        match variant {
            Variant::Arena => base,
            Variant::Gauntlet => Self {
                targets: TargetConfig {
                    spawn_secs: 0.5,
                    death_secs: 0.3,
                    ..base.targets
                },
                spawn: SpawnConfig {
                    mode: SpawnMode::LevelBurst,
                    ..base.spawn
                },
                level: LevelPolicy::Clearance {
                    transition_secs: 2.0,
                },
                ..base
            },
            Variant::Robot => Self {
                actor: ActorConfig {
                    movement: MovementModel::Platformer {
                        gravity: 0.5,
                        friction: 0.85,
                        accel: 0.8,
                        jump_speed: 10.0,
                    },
                    ..base.actor
                },
                targets: TargetConfig {
                    spawn_secs: 0.5,
                    death_secs: 0.3,
                    ..base.targets
                },
                spawn: SpawnConfig {
                    mode: SpawnMode::LevelBurst,
                    ..base.spawn
                },
                level: LevelPolicy::Clearance {
                    transition_secs: 2.0,
                },
                attack: AttackTiming {
                    jab_overshoot: 1.8,
                    ..base.attack
                },
                gesture: GestureMode::FourWay,
                ..base
            },
        }
    }

    /// Parse a (possibly partial) JSON config.
    ///
    /// Missing fields come from the preset of the named `variant` (Arena when
    /// none is given), so `{"variant": "Robot"}` alone yields the Robot rules.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        let variant = match overrides.get("variant") {
            Some(name) => Variant::deserialize(name)?,
            None => Variant::default(),
        };

        let mut merged = serde_json::to_value(Self::from_variant(variant))?;
        merge_json(&mut merged, overrides);
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} config from {}",
            config.variant.as_str(),
            path.display()
        );
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                })
            }
        }

        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;
        positive("actor.radius", self.actor.radius)?;
        positive("targets.radius", self.targets.radius)?;
        positive("combo.vulnerability_secs", self.combo.vulnerability_secs)?;
        positive("spawn.min_interval_secs", self.spawn.min_interval_secs)?;
        positive("time.slow_factor", self.time.slow_factor)?;
        positive("time.fast_factor", self.time.fast_factor)?;
        positive("attack.jab_rate", self.attack.jab_rate)?;
        positive("attack.swing_rate", self.attack.swing_rate)?;

        if self.actor.lives == 0 {
            return Err(ConfigError::Invalid {
                field: "actor.lives",
                reason: "must be at least 1".to_string(),
            });
        }

        let weights = &self.spawn.size_weights;
        if weights.is_empty() || weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Invalid {
                field: "spawn.size_weights",
                reason: "needs at least one non-negative weight".to_string(),
            });
        }
        if weights.iter().sum::<f32>() <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "spawn.size_weights",
                reason: "weights sum to zero".to_string(),
            });
        }

        if let LevelPolicy::ScoreThreshold { points_per_level } = self.level {
            if points_per_level == 0 {
                return Err(ConfigError::Invalid {
                    field: "level.points_per_level",
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if let GestureMode::Continuous {
            window_secs,
            long_way_presses,
        } = self.gesture
        {
            positive("gesture.window_secs", window_secs)?;
            if long_way_presses < 2 {
                return Err(ConfigError::Invalid {
                    field: "gesture.long_way_presses",
                    reason: "a swing already takes two presses".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Overlay `patch` onto `base`, object by object.
///
/// A patch naming a different enum variant than `base` (a single-key object
/// such as `{"ScoreThreshold": ..}` over `{"Clearance": ..}`) replaces it.
fn merge_json(base: &mut serde_json::Value, patch: serde_json::Value) {
    use serde_json::Value;

    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            let other_variant = base.len() == 1 && patch.keys().any(|k| !base.contains_key(k));
            if other_variant {
                *base = patch;
                return;
            }
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}
