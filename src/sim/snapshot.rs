//! Read-only view of a frame for the renderer

use glam::Vec2;
use serde::Serialize;

use super::attack::{AttackState, TrailPoint};
use super::state::{GameEvent, GamePhase, GameState, PALETTE, Shape, VULNERABLE_COLOR};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActorPose {
    /// Position including camera shake
    pub pos: Vec2,
    pub radius: f32,
    pub facing: f32,
    pub invulnerable: bool,
    pub arm_end: Vec2,
    pub blade_tip: Vec2,
    pub blade_active: bool,
    pub swinging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetView {
    pub family_id: u32,
    pub pos: Vec2,
    /// Radius scaled by the death shrink
    pub radius: f32,
    pub shape: Shape,
    /// 0xRRGGBB
    pub color: u32,
    pub opacity: f32,
    pub alive: bool,
    pub hit: bool,
    pub vulnerable: bool,
    pub spawning: bool,
    pub dying: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VulnerabilityView {
    pub family_id: u32,
    pub remaining_fraction: f32,
    pub members_left: usize,
    pub members_total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub frame_count: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    pub frozen: bool,
    pub shake: Vec2,
    pub actor: ActorPose,
    pub targets: Vec<TargetView>,
    pub vulnerability: Option<VulnerabilityView>,
    pub trail: Vec<TrailPoint>,
    pub particles: Vec<ParticleView>,
    pub events: Vec<GameEvent>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let actor = &state.actor;
        let (arm_end, blade_tip) = actor.rig.blade_points(actor.pos, &state.config.attack);
        let death_secs = state.config.targets.death_secs;

        let targets = state
            .population
            .families()
            .flat_map(|family| {
                let vulnerable = state.vulnerability.is_vulnerable(family.id);
                let color = if vulnerable {
                    VULNERABLE_COLOR
                } else {
                    PALETTE[family.color as usize % PALETTE.len()]
                };
                family
                    .members
                    .iter()
                    .filter(|t| t.alive || t.dying)
                    .map(move |t| {
                        let shrink = if t.dying && death_secs > 0.0 {
                            (t.death_timer / death_secs).clamp(0.0, 1.0)
                        } else {
                            1.0
                        };
                        TargetView {
                            family_id: family.id,
                            pos: t.pos,
                            radius: t.radius * shrink,
                            shape: family.shape,
                            color,
                            opacity: if t.dying { shrink } else { t.opacity },
                            alive: t.alive,
                            hit: t.hit,
                            vulnerable,
                            spawning: t.spawning,
                            dying: t.dying,
                        }
                    })
            })
            .collect();

        let vulnerability = state.vulnerability.family_id.and_then(|id| {
            let family = state.population.family(id)?;
            Some(VulnerabilityView {
                family_id: id,
                remaining_fraction: state.vulnerability.remaining_fraction(),
                members_left: family.remaining(),
                members_total: family.size(),
            })
        });

        Self {
            frame_count: state.frame_count,
            phase: state.phase,
            score: state.score,
            lives: state.lives,
            level: state.level,
            frozen: state.is_frozen(),
            shake: actor.shake,
            actor: ActorPose {
                pos: actor.pos + actor.shake,
                radius: actor.radius,
                facing: actor.facing,
                invulnerable: actor.is_invulnerable(),
                arm_end: arm_end + actor.shake,
                blade_tip: blade_tip + actor.shake,
                blade_active: actor.rig.is_active(),
                swinging: matches!(actor.rig.state, AttackState::Swing(_)),
            },
            targets,
            vulnerability,
            trail: actor.rig.trail.clone(),
            particles: state
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.pos,
                    alpha: p.alpha,
                })
                .collect(),
            events: state.events.clone(),
        }
    }
}
