//! End-to-end runs through the public `Game` surface

use glam::Vec2;

use shape_slash::config::{LevelPolicy, SpawnMode};
use shape_slash::consts::SIM_DT;
use shape_slash::sim::{Direction, GameEvent, GamePhase};
use shape_slash::{Game, GameConfig, Variant};

/// Targets stand still and nothing spawns on its own
fn still_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.spawn.mode = SpawnMode::LevelBurst;
    config.spawn.ring_jitter = 0.0;
    config.targets.initial_speed = 0.0;
    config.targets.max_speed = 0.0;
    config.targets.nudge_chance = 0.0;
    config
}

/// Game with the actor centred at (600, 300) and no targets
fn empty_game(config: GameConfig) -> Game {
    let mut game = Game::new(config, 2024);
    game.state_mut().population.clear();
    game.set_modifier(true);
    game
}

fn run(game: &mut Game, frames: usize, events: &mut Vec<GameEvent>) {
    for _ in 0..frames {
        game.update(SIM_DT);
        events.extend(game.drain_events());
    }
}

#[test]
fn test_singleton_dies_to_one_jab() {
    let mut game = empty_game(still_config());
    assert_eq!(game.state().actor.pos, Vec2::new(600.0, 300.0));
    let id = game.state_mut().spawn_family_at(Vec2::new(660.0, 300.0), 1);

    let mut events = Vec::new();
    game.on_direction_press(Direction::Right);
    run(&mut game, 10, &mut events);

    let state = game.state();
    assert_eq!(state.lives, 3);
    assert_eq!(state.score, 1);
    assert!(state.population.family(id).is_none_or(|f| !f.members[0].alive));
    assert!(events.contains(&GameEvent::FamilyEliminated { family_id: id, size: 1 }));
    assert!(!events.iter().any(|e| matches!(e, GameEvent::VulnerabilityStarted { .. })));
}

#[test]
fn test_partial_combo_expires_and_restores_family() {
    let mut game = empty_game(still_config());
    let id = game.state_mut().spawn_family_at(Vec2::new(600.0, 300.0), 3);
    {
        let members = &mut game.state_mut().population.family_mut(id).unwrap().members;
        members[0].pos = Vec2::new(670.0, 300.0);
        members[1].pos = Vec2::new(530.0, 300.0);
        members[2].pos = Vec2::new(600.0, 460.0);
    }

    let mut events = Vec::new();
    game.on_direction_press(Direction::Right);
    run(&mut game, 8, &mut events);
    game.on_direction_release(Direction::Right);
    run(&mut game, 8, &mut events);

    game.on_direction_press(Direction::Left);
    run(&mut game, 8, &mut events);
    game.on_direction_release(Direction::Left);
    run(&mut game, 8, &mut events);

    let family = game.state().population.family(id).unwrap();
    assert!(family.members[0].hit && family.members[1].hit);
    assert!(!family.members[2].hit);
    assert_eq!(game.state().vulnerability.family_id, Some(id));

    run(&mut game, 200, &mut events);

    let state = game.state();
    let family = state.population.family(id).unwrap();
    assert!(family.members.iter().all(|m| m.alive && !m.hit && m.opacity == 1.0));
    assert_eq!(state.score, 0);
    assert_eq!(state.vulnerability.family_id, None);
    assert!(events.contains(&GameEvent::VulnerabilityStarted { family_id: id }));
    assert!(events.contains(&GameEvent::VulnerabilityExpired { family_id: id }));
}

#[test]
fn test_full_combo_eliminates_family() {
    let mut game = empty_game(still_config());
    let id = game.state_mut().spawn_family_at(Vec2::new(600.0, 300.0), 2);
    {
        let members = &mut game.state_mut().population.family_mut(id).unwrap().members;
        members[0].pos = Vec2::new(670.0, 300.0);
        members[1].pos = Vec2::new(530.0, 300.0);
    }

    let mut events = Vec::new();
    game.on_direction_press(Direction::Right);
    run(&mut game, 8, &mut events);
    game.on_direction_release(Direction::Right);
    game.on_direction_press(Direction::Left);
    run(&mut game, 8, &mut events);

    assert_eq!(game.state().score, 2);
    assert!(events.contains(&GameEvent::FamilyEliminated { family_id: id, size: 2 }));
}

#[test]
fn test_up_then_down_while_held_swings() {
    let mut game = empty_game(still_config());
    let mut events = Vec::new();

    game.on_direction_press(Direction::Up);
    run(&mut game, 3, &mut events);
    game.on_direction_press(Direction::Down);
    run(&mut game, 1, &mut events);

    let sweep = events.iter().find_map(|e| match e {
        GameEvent::SwingStarted { sweep, .. } => Some(*sweep),
        _ => None,
    });
    assert!(sweep.is_some_and(|s| s.abs() > 1.0));
    assert_eq!(game.state().actor.rig.held, None);
}

#[test]
fn test_touching_target_costs_one_life() {
    let mut game = empty_game(still_config());
    game.state_mut().spawn_family_at(Vec2::new(610.0, 300.0), 1);

    let mut events = Vec::new();
    run(&mut game, 60, &mut events);

    assert_eq!(game.state().lives, 2);
    assert_eq!(
        events.iter().filter(|e| matches!(e, GameEvent::PlayerHit { .. })).count(),
        1
    );
}

#[test]
fn test_slow_motion_by_default() {
    let mut config = still_config();
    config.targets.max_speed = 1.0;
    let mut game = empty_game(config);
    game.set_modifier(false);
    let id = game.state_mut().spawn_family_at(Vec2::new(200.0, 100.0), 1);
    game.state_mut().population.family_mut(id).unwrap().members[0].vel = Vec2::new(1.0, 0.0);

    let mut events = Vec::new();
    run(&mut game, 20, &mut events);

    let x = game.state().population.family(id).unwrap().members[0].pos.x;
    assert!((x - 207.0).abs() < 0.05, "moved to {x}");
}

#[test]
fn test_gauntlet_clears_into_next_level() {
    let mut config = GameConfig::from_variant(Variant::Gauntlet);
    config.targets.initial_speed = 0.0;
    config.targets.max_speed = 0.0;
    config.targets.nudge_chance = 0.0;
    config.level = LevelPolicy::Clearance {
        transition_secs: 0.5,
    };
    let mut game = empty_game(config);
    game.state_mut().spawn_family_at(Vec2::new(660.0, 300.0), 1);

    let mut events = Vec::new();
    // Fade in, strike, then wait out the death shrink
    run(&mut game, 40, &mut events);
    game.on_direction_press(Direction::Right);
    run(&mut game, 40, &mut events);
    assert!(events.contains(&GameEvent::LevelComplete { level: 1 }));
    assert_eq!(game.state().phase, GamePhase::Transition);

    run(&mut game, 40, &mut events);
    assert_eq!(game.state().phase, GamePhase::Playing);
    assert_eq!(game.state().level, 2);
    assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
}

#[test]
fn test_robot_lands_on_floor() {
    let mut config = GameConfig::from_variant(Variant::Robot);
    config.targets.initial_speed = 0.0;
    config.targets.max_speed = 0.0;
    config.targets.nudge_chance = 0.0;
    let mut game = empty_game(config);
    // A distant target keeps the clearance policy from ending the level
    game.state_mut().spawn_family_at(Vec2::new(100.0, 100.0), 1);

    let mut events = Vec::new();
    run(&mut game, 120, &mut events);

    let state = game.state();
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.lives, 3);
    let floor = state.config.world.height - state.config.actor.radius;
    assert!(state.actor.grounded);
    assert!((state.actor.pos.y - floor).abs() < 1e-3);
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("shape-slash-{}.json", std::process::id()));
    let config = GameConfig::from_variant(Variant::Robot);
    std::fs::write(&path, config.to_json().unwrap()).unwrap();

    let loaded = GameConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.variant, Variant::Robot);
    assert_eq!(loaded.level, config.level);
}
