//! Blade hits, family vulnerability and player damage
//!
//! Every frame the blade sweep collects all targets it touches, then the hit
//! set is resolved in a fixed priority order:
//!
//! 1. singleton families die at once
//! 2. members of the vulnerable family are marked hit
//! 3. the first hit on any other multi-member family makes that family the
//!    vulnerable one, abandoning whatever combo was pending
//!
//! A family dies only when every member has been hit inside one window; an
//! expired window puts every hit member back.

use super::geometry::{circles_overlap, sweep_hits_circle};
use super::population::TargetRef;
use super::state::{GameEvent, GamePhase, GameState};
use crate::config::LevelPolicy;

/// Targets touched by the blade this frame, deduplicated, in id order
pub fn collect_blade_hits(state: &GameState) -> Vec<TargetRef> {
    let Some((arm_end, tip)) = state
        .actor
        .rig
        .blade_segment(state.actor.pos, &state.config.attack)
    else {
        return Vec::new();
    };

    state
        .population
        .targets()
        .filter(|(_, t)| t.is_hittable() && sweep_hits_circle(arm_end, tip, t.pos, t.radius))
        .map(|(r, _)| r)
        .collect()
}

/// Run the blade sweep and resolve whatever it hit
pub fn run_blade_sweep(state: &mut GameState) {
    let hits = collect_blade_hits(state);
    if !hits.is_empty() {
        resolve_blade_hits(state, &hits);
    }
}

/// Classify and apply one frame's hit set
pub fn resolve_blade_hits(state: &mut GameState, hits: &[TargetRef]) {
    drop_stale_vulnerability(state);

    let mut hits = hits.to_vec();
    hits.sort();
    hits.dedup();
    hits.retain(|r| state.population.target(*r).is_some_and(|t| t.is_hittable()));

    let mut singletons = Vec::new();
    let mut vulnerable = Vec::new();
    let mut others = Vec::new();
    for r in hits {
        let Some(family) = state.population.family(r.family_id) else {
            continue;
        };
        if family.is_singleton() {
            singletons.push(r);
        } else if state.vulnerability.is_vulnerable(r.family_id) {
            vulnerable.push(r);
        } else {
            others.push(r);
        }
    }

    for r in singletons {
        if is_hittable(state, r) {
            kill_target(state, r);
            state.actor.add_shake(&mut state.rng, state.config.combo.kill_shake);
            state.events.push(GameEvent::FamilyEliminated {
                family_id: r.family_id,
                size: 1,
            });
        }
    }

    for r in vulnerable {
        if is_hittable(state, r) {
            hit_family_member(state, r);
        }
    }

    if let Some(&r) = others.first() {
        if is_hittable(state, r) {
            promote_family(state, r.family_id);
            hit_family_member(state, r);
        }
    }
}

/// Make `family_id` the vulnerable family, resetting any other pending combo
fn promote_family(state: &mut GameState, family_id: u32) {
    match state.vulnerability.family_id {
        Some(previous) if previous != family_id => {
            if let Some(old) = state.population.family_mut(previous) {
                old.reset_hits();
            }
            log::debug!("Family {} vulnerable, abandoning {}", family_id, previous);
            state.events.push(GameEvent::VulnerabilityOverridden {
                previous,
                family_id,
            });
        }
        _ => {
            log::debug!("Family {} vulnerable", family_id);
            state.events.push(GameEvent::VulnerabilityStarted { family_id });
        }
    }
    state.vulnerability.assign(family_id);
}

/// Mark one member hit; eliminate the family once every member is hit
fn hit_family_member(state: &mut GameState, r: TargetRef) {
    let hit_opacity = state.config.targets.hit_opacity;
    let Some(target) = state.population.target_mut(r) else {
        return;
    };
    target.mark_hit(hit_opacity);
    let pos = target.pos;
    state.emit_particles(pos);

    let Some(family) = state.population.family(r.family_id) else {
        return;
    };

    if family.is_complete() {
        let size = family.size();
        let doomed: Vec<TargetRef> = family
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.alive)
            .map(|(index, _)| TargetRef {
                family_id: r.family_id,
                index,
            })
            .collect();
        for member in doomed {
            kill_target(state, member);
        }

        state.vulnerability.clear();
        state.freeze_timer = state.config.combo.freeze_secs;
        let shake = state.config.combo.elimination_shake_per_member * size as f32;
        state.actor.add_shake(&mut state.rng, shake);
        state.events.push(GameEvent::FamilyEliminated {
            family_id: r.family_id,
            size,
        });
        log::info!("Family {} of {} eliminated (score {})", r.family_id, size, state.score);
    } else {
        let remaining = family.remaining();
        state.actor.add_shake(&mut state.rng, state.config.combo.hit_shake);
        state.events.push(GameEvent::MemberHit {
            family_id: r.family_id,
            pos,
            remaining,
        });
    }
}

fn kill_target(state: &mut GameState, r: TargetRef) {
    let death_secs = state.config.targets.death_secs;
    let Some(target) = state.population.target_mut(r) else {
        return;
    };
    target.kill(death_secs);
    let pos = target.pos;
    state.score += state.config.combo.points_per_kill as u64;
    state.emit_particles(pos);
    state.events.push(GameEvent::TargetKilled {
        family_id: r.family_id,
        pos,
    });
}

fn is_hittable(state: &GameState, r: TargetRef) -> bool {
    state.population.target(r).is_some_and(|t| t.is_hittable())
}

/// Clear a vulnerability whose family vanished or has nothing hit
fn drop_stale_vulnerability(state: &mut GameState) {
    let Some(id) = state.vulnerability.family_id else {
        return;
    };
    let valid = state
        .population
        .family(id)
        .is_some_and(|f| f.size() > 1 && f.has_hit_member());
    if !valid {
        log::warn!("Vulnerable family {} no longer valid, clearing", id);
        state.vulnerability.clear();
    }
}

/// Count down the vulnerability window by `secs`, undoing the combo on expiry
pub fn update_vulnerability(state: &mut GameState, secs: f32) {
    drop_stale_vulnerability(state);
    let Some(id) = state.vulnerability.family_id else {
        return;
    };

    state.vulnerability.timer -= secs;
    if state.vulnerability.timer <= 0.0 {
        if let Some(family) = state.population.family_mut(id) {
            family.reset_hits();
        }
        state.vulnerability.clear();
        log::debug!("Vulnerability on family {} expired", id);
        state.events.push(GameEvent::VulnerabilityExpired { family_id: id });
    }
}

/// Count down invulnerability by `secs`
pub fn update_invulnerability(state: &mut GameState, secs: f32) {
    if state.actor.invulnerable > 0.0 {
        state.actor.invulnerable = (state.actor.invulnerable - secs).max(0.0);
    }
}

/// Lose a life on contact with a dangerous target (one per frame at most)
pub fn check_player_collisions(state: &mut GameState) {
    if state.actor.is_invulnerable() || state.is_game_over() {
        return;
    }

    let actor = &state.actor;
    let touching = state
        .population
        .targets()
        .any(|(_, t)| t.is_dangerous() && circles_overlap(actor.pos, actor.radius, t.pos, t.radius));
    if !touching {
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    state.actor.invulnerable = state.config.actor.invulnerable_secs;
    state.actor.add_shake(&mut state.rng, state.config.combo.damage_shake);
    state.events.push(GameEvent::PlayerHit {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!("Game over: score {}, level {}", state.score, state.level);
    }
}

/// Apply the configured level policy after this frame's scoring
pub fn update_level(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }

    match state.config.level {
        LevelPolicy::ScoreThreshold { points_per_level } => {
            let new_level = (state.score / points_per_level.max(1) as u64) as u32 + 1;
            if new_level > state.level {
                state.level = new_level;
                start_level(state);
            }
        }
        LevelPolicy::Clearance { transition_secs } => {
            if state.population.is_cleared() {
                state.phase = GamePhase::Transition;
                state.transition_timer = transition_secs;
                state.events.push(GameEvent::LevelComplete { level: state.level });
                log::info!("Level {} cleared", state.level);
            }
        }
    }
}

/// Count down a level transition by `secs`, starting the next level at zero
pub fn update_transition(state: &mut GameState, secs: f32) {
    if state.phase != GamePhase::Transition {
        return;
    }
    state.transition_timer -= secs;
    if state.transition_timer <= 0.0 {
        state.transition_timer = 0.0;
        state.level += 1;
        state.phase = GamePhase::Playing;
        start_level(state);
    }
}

/// Replace the population with the burst for the current level
fn start_level(state: &mut GameState) {
    state.population.clear();
    state.vulnerability.clear();
    state.spawn_timer = 0.0;
    state.populate_level();
    state.events.push(GameEvent::LevelUp { level: state.level });
    log::info!(
        "Level {} ({} families)",
        state.level,
        state.population.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, SpawnMode};
    use glam::Vec2;

    fn still_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.targets.initial_speed = 0.0;
        config.targets.max_speed = 0.0;
        config.spawn.mode = SpawnMode::LevelBurst;
        config
    }

    fn state() -> GameState {
        GameState::new_empty(still_config(), 1)
    }

    fn member(family_id: u32, index: usize) -> TargetRef {
        TargetRef { family_id, index }
    }

    #[test]
    fn test_singleton_dies_without_vulnerability() {
        let mut s = state();
        let id = s.spawn_family_at(Vec2::new(100.0, 100.0), 1);
        resolve_blade_hits(&mut s, &[member(id, 0)]);

        let target = &s.population.family(id).unwrap().members[0];
        assert!(!target.alive);
        assert_eq!(s.score, 1);
        assert_eq!(s.vulnerability.family_id, None);
        assert!(!s.events.iter().any(|e| matches!(e, GameEvent::VulnerabilityStarted { .. })));
    }

    #[test]
    fn test_family_dies_after_every_member_hit_in_any_order() {
        for order in [[0, 1, 2], [2, 0, 1], [1, 2, 0]] {
            let mut s = state();
            let id = s.spawn_family_at(Vec2::new(300.0, 300.0), 3);

            for (n, index) in order.iter().enumerate() {
                resolve_blade_hits(&mut s, &[member(id, *index)]);
                let family = s.population.family(id).unwrap();
                if n < 2 {
                    assert!(family.members.iter().all(|m| m.alive));
                    assert_eq!(s.vulnerability.family_id, Some(id));
                }
            }

            let family = s.population.family(id).unwrap();
            assert!(family.members.iter().all(|m| !m.alive));
            assert_eq!(s.vulnerability.family_id, None);
            assert_eq!(s.score, 3);
            assert!(s.is_frozen());
        }
    }

    #[test]
    fn test_simultaneous_hits_on_whole_family() {
        let mut s = state();
        let id = s.spawn_family_at(Vec2::new(300.0, 300.0), 2);
        // The first hit opens the window, the second is ignored this frame
        resolve_blade_hits(&mut s, &[member(id, 0), member(id, 1)]);
        let family = s.population.family(id).unwrap();
        assert_eq!(family.members.iter().filter(|m| m.hit).count(), 1);

        // Once vulnerable, a single sweep through both finishes the family
        let mut s = state();
        let id = s.spawn_family_at(Vec2::new(300.0, 300.0), 3);
        resolve_blade_hits(&mut s, &[member(id, 0)]);
        resolve_blade_hits(&mut s, &[member(id, 1), member(id, 2)]);
        assert!(s.population.family(id).unwrap().members.iter().all(|m| !m.alive));
    }

    #[test]
    fn test_expiry_restores_hit_members() {
        let mut s = state();
        let id = s.spawn_family_at(Vec2::new(300.0, 300.0), 3);
        resolve_blade_hits(&mut s, &[member(id, 0)]);
        resolve_blade_hits(&mut s, &[member(id, 1)]);
        assert!((s.population.family(id).unwrap().members[0].opacity - 0.3).abs() < 1e-6);

        update_vulnerability(&mut s, 1.0);
        assert_eq!(s.vulnerability.family_id, Some(id));
        update_vulnerability(&mut s, 2.5);

        let family = s.population.family(id).unwrap();
        assert!(family.members.iter().all(|m| m.alive && !m.hit && m.opacity == 1.0));
        assert_eq!(s.vulnerability.family_id, None);
        assert_eq!(s.score, 0);
        assert!(s.events.contains(&GameEvent::VulnerabilityExpired { family_id: id }));
    }

    #[test]
    fn test_hit_on_other_family_overrides() {
        let mut s = state();
        let a = s.spawn_family_at(Vec2::new(200.0, 200.0), 3);
        let b = s.spawn_family_at(Vec2::new(800.0, 200.0), 2);
        resolve_blade_hits(&mut s, &[member(a, 0)]);
        resolve_blade_hits(&mut s, &[member(a, 1)]);

        resolve_blade_hits(&mut s, &[member(b, 1)]);
        assert_eq!(s.vulnerability.family_id, Some(b));
        assert!(s.population.family(a).unwrap().members.iter().all(|m| !m.hit));
        let fb = s.population.family(b).unwrap();
        assert_eq!(fb.members.iter().filter(|m| m.hit).count(), 1);
        assert!(fb.members[1].hit);
        assert!(s.events.contains(&GameEvent::VulnerabilityOverridden {
            previous: a,
            family_id: b
        }));
    }

    #[test]
    fn test_priority_order_in_one_frame() {
        let mut s = state();
        let single = s.spawn_family_at(Vec2::new(100.0, 100.0), 1);
        let pending = s.spawn_family_at(Vec2::new(300.0, 300.0), 2);
        let fresh = s.spawn_family_at(Vec2::new(600.0, 300.0), 2);
        resolve_blade_hits(&mut s, &[member(pending, 0)]);

        // One sweep: singleton, finishing blow on the pending family, a new family
        resolve_blade_hits(&mut s, &[member(fresh, 0), member(pending, 1), member(single, 0)]);

        assert!(!s.population.family(single).unwrap().members[0].alive);
        assert!(s.population.family(pending).unwrap().members.iter().all(|m| !m.alive));
        assert_eq!(s.vulnerability.family_id, Some(fresh));
        assert_eq!(s.score, 3);
    }

    #[test]
    fn test_duplicate_and_dead_hits_are_filtered() {
        let mut s = state();
        let id = s.spawn_family_at(Vec2::new(100.0, 100.0), 1);
        resolve_blade_hits(&mut s, &[member(id, 0), member(id, 0)]);
        assert_eq!(s.score, 1);
        resolve_blade_hits(&mut s, &[member(id, 0), member(99, 0)]);
        assert_eq!(s.score, 1);
    }

    #[test]
    fn test_missing_vulnerable_family_clears() {
        let mut s = state();
        s.vulnerability.assign(42);
        update_vulnerability(&mut s, 0.1);
        assert_eq!(s.vulnerability.family_id, None);
    }

    #[test]
    fn test_invulnerability_blocks_repeat_damage() {
        let mut s = state();
        s.actor.pos = Vec2::new(300.0, 300.0);
        s.spawn_family_at(Vec2::new(310.0, 300.0), 1);

        check_player_collisions(&mut s);
        assert_eq!(s.lives, 2);
        for _ in 0..119 {
            update_invulnerability(&mut s, 1.0 / 60.0);
            check_player_collisions(&mut s);
        }
        assert_eq!(s.lives, 2);

        update_invulnerability(&mut s, 2.0 / 60.0);
        check_player_collisions(&mut s);
        assert_eq!(s.lives, 1);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut s = state();
        s.lives = 1;
        s.actor.pos = Vec2::new(300.0, 300.0);
        s.spawn_family_at(Vec2::new(300.0, 300.0), 1);
        check_player_collisions(&mut s);
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(s.events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_hit_and_spawning_targets_are_harmless() {
        let mut s = state();
        s.actor.pos = Vec2::new(300.0, 300.0);
        let id = s.spawn_family_at(Vec2::new(300.0, 300.0), 2);
        for m in &mut s.population.family_mut(id).unwrap().members {
            m.pos = Vec2::new(305.0, 300.0);
        }
        s.population.family_mut(id).unwrap().members[0].hit = true;
        s.population.family_mut(id).unwrap().members[1].spawning = true;
        check_player_collisions(&mut s);
        assert_eq!(s.lives, 3);
    }

    #[test]
    fn test_score_threshold_levels_repopulate() {
        let mut s = state();
        s.score = 10;
        update_level(&mut s);
        assert_eq!(s.level, 2);
        assert_eq!(s.population.len(), 4);
        assert!(s.events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_clearance_levels_wait_for_transition() {
        let mut config = still_config();
        config.level = LevelPolicy::Clearance {
            transition_secs: 2.0,
        };
        let mut s = GameState::new_empty(config, 3);
        let id = s.spawn_family_at(Vec2::new(100.0, 100.0), 1);

        update_level(&mut s);
        assert_eq!(s.phase, GamePhase::Playing);

        resolve_blade_hits(&mut s, &[member(id, 0)]);
        update_level(&mut s);
        assert_eq!(s.phase, GamePhase::Transition);

        update_transition(&mut s, 1.0);
        assert_eq!(s.phase, GamePhase::Transition);
        update_transition(&mut s, 1.5);
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.level, 2);
        assert_eq!(s.population.len(), 4);
    }
}
