//! Target families: spawning, drift and cleanup
//!
//! Families are owned by an arena keyed by family id. Targets carry only the
//! id of their family, never a pointer, and dead families are removed in a
//! single mark-then-compact pass per frame.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Family, PALETTE, Shape, Target};
use crate::config::{GameConfig, TargetConfig, WorldConfig};

/// Stable handle to one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub family_id: u32,
    pub index: usize,
}

/// All live families, iterated in id order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Population {
    families: BTreeMap<u32, Family>,
    next_family_id: u32,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of families
    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.values()
    }

    pub fn family(&self, id: u32) -> Option<&Family> {
        self.families.get(&id)
    }

    pub fn family_mut(&mut self, id: u32) -> Option<&mut Family> {
        self.families.get_mut(&id)
    }

    pub fn target(&self, r: TargetRef) -> Option<&Target> {
        self.families.get(&r.family_id)?.members.get(r.index)
    }

    pub fn target_mut(&mut self, r: TargetRef) -> Option<&mut Target> {
        self.families.get_mut(&r.family_id)?.members.get_mut(r.index)
    }

    /// Every target with its handle, in family id order
    pub fn targets(&self) -> impl Iterator<Item = (TargetRef, &Target)> {
        self.families.values().flat_map(|family| {
            family.members.iter().enumerate().map(move |(index, t)| {
                (
                    TargetRef {
                        family_id: family.id,
                        index,
                    },
                    t,
                )
            })
        })
    }

    pub fn alive_count(&self) -> usize {
        self.families.values().map(Family::alive_count).sum()
    }

    /// No target alive or still dying
    pub fn is_cleared(&self) -> bool {
        self.families.values().all(Family::is_gone)
    }

    /// Remove every family (ids keep counting up)
    pub fn clear(&mut self) {
        self.families.clear();
    }

    /// Spawn a random family at least `min_distance` from `avoid`
    pub fn spawn_family(&mut self, rng: &mut Pcg32, config: &GameConfig, avoid: Vec2) -> u32 {
        let size = sample_size(rng, &config.spawn.size_weights);
        let shape = Shape::ALL[rng.random_range(0..Shape::ALL.len())];
        let color = rng.random_range(0..PALETTE.len()) as u8;

        let world = &config.world;
        let min_distance = config.spawn.min_distance;
        let mut center = random_point(rng, world);
        let mut attempts = 1;
        while center.distance(avoid) < min_distance {
            if attempts >= config.spawn.placement_attempts {
                log::warn!(
                    "No spawn point {} away from the actor after {} attempts",
                    min_distance,
                    attempts
                );
                break;
            }
            center = random_point(rng, world);
            attempts += 1;
        }

        self.spawn_family_at(rng, config, center, size, shape, color)
    }

    /// Spawn a family of `size` members on a ring around `center`
    pub fn spawn_family_at(
        &mut self,
        rng: &mut Pcg32,
        config: &GameConfig,
        center: Vec2,
        size: usize,
        shape: Shape,
        color: u8,
    ) -> u32 {
        let id = self.next_family_id;
        self.next_family_id += 1;

        let targets = &config.targets;
        let spawn = &config.spawn;
        let members = (0..size)
            .map(|i| {
                let angle = i as f32 / size as f32 * std::f32::consts::TAU;
                let dist = if size > 1 {
                    spawn.ring_radius + rng.random::<f32>() * spawn.ring_jitter
                } else {
                    0.0
                };
                let vel = Vec2::new(
                    (rng.random::<f32>() - 0.5) * targets.initial_speed,
                    (rng.random::<f32>() - 0.5) * targets.initial_speed,
                );
                let pos = clamp_to_world(
                    center + Vec2::new(angle.cos(), angle.sin()) * dist,
                    targets.radius,
                    &config.world,
                );

                let mut target = Target::new(id, pos, vel, targets.radius);
                if targets.spawn_secs > 0.0 {
                    target.spawning = true;
                    target.spawn_progress = 0.0;
                    target.opacity = 0.0;
                }
                target
            })
            .collect();

        self.families.insert(
            id,
            Family {
                id,
                shape,
                color,
                members,
            },
        );
        id
    }

    /// Random walk, speed clamp, integration and edge bounce for alive targets
    pub fn drift(&mut self, rng: &mut Pcg32, config: &TargetConfig, world: &WorldConfig, frames: f32) {
        let nudge_chance = (config.nudge_chance * frames).clamp(0.0, 1.0);

        for target in self.families.values_mut().flat_map(|f| f.members.iter_mut()) {
            if !target.alive {
                continue;
            }

            if rng.random::<f32>() < nudge_chance {
                target.vel.x += (rng.random::<f32>() - 0.5) * config.nudge_strength;
                target.vel.y += (rng.random::<f32>() - 0.5) * config.nudge_strength;
            }

            if target.vel.length() > config.max_speed {
                target.vel = target.vel.normalize_or_zero() * config.max_speed.max(0.0);
            }

            target.pos += target.vel * frames;

            let r = target.radius;
            if target.pos.x < r {
                target.pos.x = r;
                target.vel.x = -target.vel.x;
            }
            if target.pos.x > world.width - r {
                target.pos.x = world.width - r;
                target.vel.x = -target.vel.x;
            }
            if target.pos.y < r {
                target.pos.y = r;
                target.vel.y = -target.vel.y;
            }
            if target.pos.y > world.height - r {
                target.pos.y = world.height - r;
                target.vel.y = -target.vel.y;
            }
        }
    }

    /// Advance fade-ins by `secs`
    pub fn advance_spawning(&mut self, spawn_secs: f32, secs: f32) {
        for target in self.families.values_mut().flat_map(|f| f.members.iter_mut()) {
            if !target.spawning {
                continue;
            }
            target.spawn_progress = if spawn_secs > 0.0 {
                (target.spawn_progress + secs / spawn_secs).min(1.0)
            } else {
                1.0
            };
            if target.spawn_progress >= 1.0 {
                target.spawning = false;
            }
            if !target.hit {
                target.opacity = target.spawn_progress;
            }
        }
    }

    /// Advance death animations by `secs`
    pub fn advance_dying(&mut self, secs: f32) {
        for target in self.families.values_mut().flat_map(|f| f.members.iter_mut()) {
            if target.dying {
                target.death_timer -= secs;
                if target.death_timer <= 0.0 {
                    target.death_timer = 0.0;
                    target.dying = false;
                }
            }
        }
    }

    /// Remove families with nothing alive or dying, returning their ids
    pub fn prune(&mut self) -> Vec<u32> {
        let gone: Vec<u32> = self
            .families
            .values()
            .filter(|f| f.is_gone())
            .map(|f| f.id)
            .collect();
        for id in &gone {
            self.families.remove(id);
        }
        gone
    }
}

/// Pick a family size from relative weights (index `i` is size `i + 1`)
pub fn sample_size(rng: &mut Pcg32, weights: &[f32]) -> usize {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return 1;
    }
    let mut roll = rng.random::<f32>() * total;
    for (i, weight) in weights.iter().enumerate() {
        if roll < *weight {
            return i + 1;
        }
        roll -= weight;
    }
    // Rounding left the roll past the end
    weights.iter().rposition(|w| *w > 0.0).map_or(1, |i| i + 1)
}

fn random_point(rng: &mut Pcg32, world: &WorldConfig) -> Vec2 {
    Vec2::new(
        random_axis(rng, world.width, world.spawn_margin),
        random_axis(rng, world.height, world.spawn_margin),
    )
}

fn random_axis(rng: &mut Pcg32, extent: f32, margin: f32) -> f32 {
    let lo = margin.min(extent / 2.0);
    let hi = (extent - margin).max(extent / 2.0);
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

fn clamp_to_world(pos: Vec2, radius: f32, world: &WorldConfig) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, (world.width - radius).max(radius)),
        pos.y.clamp(radius, (world.height - radius).max(radius)),
    )
}
