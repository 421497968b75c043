//! Integration tests for scene bookkeeping, deferred tasks and death handling

use std::sync::Arc;

use brawl_combat::{
    Character, CharacterStats, CombatError, CombatEvent, DeathHit, FlatArena, LimbKind, MeleeDamageType, MeleeSize, Rect,
    Scene, Terrain, Weapon, WeaponData, presets,
};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

const DT: f32 = 1.0 / 60.0;

fn scene_on(terrain: impl Terrain + 'static) -> Scene {
    Scene::new(
        Arc::new(presets::animation_library().unwrap()),
        Arc::new(presets::sequence_library()),
        Box::new(terrain),
    )
}

fn scene() -> Scene {
    scene_on(FlatArena::new(0.0))
}

fn fighter(name: &str, x: f32) -> Character {
    let stats = CharacterStats {
        melee_skill: 1.0,
        dodge_ability: 1.0,
        ..Default::default()
    };
    Character::new(name, stats, Vec2::new(x, 0.0))
}

/// A fighter whose body took far more than its health
fn mortally_wounded(name: &str, x: f32) -> Character {
    let mut character = fighter(name, x);
    character.positioning.limbs[LimbKind::Body].health = -0.5;
    character
}

/// A body hit from the front that always calls for a death animation
fn killing_blow() -> DeathHit {
    DeathHit::new(Vec2::new(-1.0, 0.0), Vec2::ZERO).with_chance(1.0)
}

fn stamped(scene: &Scene) -> bool {
    scene.events().iter().any(|e| matches!(e, CombatEvent::Stamped { .. }))
}

fn sword() -> Weapon {
    Weapon::new(Arc::new(WeaponData::melee(
        "sword",
        MeleeDamageType::Blade,
        MeleeSize::Medium,
        0.5,
    )))
}

fn run(scene: &mut Scene, seconds: f32) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut arena = FlatArena::new(0.0);
    let frames = (seconds / DT).ceil() as usize;
    for _ in 0..frames {
        arena.sync(scene.colliders());
        scene.update(&arena, &mut rng, DT).unwrap();
    }
}

struct Slope;

impl Terrain for Slope {
    fn floor_level_at(&self, x: f32) -> f32 {
        x * 0.5
    }

    fn is_flat_at(&self, _x: f32) -> bool {
        false
    }
}

#[test]
fn test_despawned_id_goes_stale() {
    let mut scene = scene();
    let id = scene.spawn(fighter("grunt", 0.0));
    let removed = scene.despawn(id).unwrap();
    assert_eq!(removed.name, "grunt");

    assert!(matches!(scene.get(id), Err(CombatError::StaleCharacter(_))));
    let reused = scene.spawn(fighter("other", 0.0));
    assert_eq!(reused.index, id.index);
    assert_ne!(reused.generation, id.generation);
    assert!(!scene.contains(id));
    assert!(scene.contains(reused));
}

#[test]
fn test_pair_rejects_same_character() {
    let mut scene = scene();
    let id = scene.spawn(fighter("grunt", 0.0));
    assert!(matches!(scene.pair_mut(id, id), Err(CombatError::SameCharacter(_))));
}

#[test]
fn test_death_animation_ends_in_stamp() {
    let mut scene = scene();
    let id = scene.spawn(mortally_wounded("grunt", 0.0).with_weapon(sword()));

    let started = scene
        .try_start_death_sequence(id, &killing_blow(), &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert!(started);
    let grunt = scene.get(id).unwrap();
    assert!(!grunt.alive);
    assert!(!grunt.has_weapon());
    assert!(grunt.animations.is_playing_group("deaths"));
    assert!(grunt.animations.is_playing_animation("f_bodyshot_stumble_back"));
    assert_eq!(scene.loose_weapons.len(), 1);

    run(&mut scene, 2.0);
    assert!(!scene.contains(id));
    let events = scene.drain_events();
    assert!(events.iter().any(|e| matches!(e, CombatEvent::DeathAnimation { .. })));
    assert!(events.iter().any(|e| matches!(e, CombatEvent::Stamped { character } if *character == id)));
}

#[test]
fn test_stopped_death_animation_never_stamps() {
    let mut scene = scene();
    let id = scene.spawn(mortally_wounded("grunt", 0.0));
    assert!(
        scene
            .try_start_death_sequence(id, &killing_blow(), &mut StdRng::seed_from_u64(3))
            .unwrap()
    );

    scene.get_mut(id).unwrap().animations.stop_all();
    run(&mut scene, 2.0);
    assert!(scene.contains(id));
    assert!(!stamped(&scene));
}

#[test]
fn test_replaced_death_animation_never_stamps() {
    let mut scene = scene();
    let id = scene.spawn(mortally_wounded("grunt", 0.0));
    assert!(
        scene
            .try_start_death_sequence(id, &killing_blow(), &mut StdRng::seed_from_u64(3))
            .unwrap()
    );

    let stun = scene.registry().animation("stun_heavy_forwards").unwrap();
    scene.get_mut(id).unwrap().play_animation(stun, 1.0);
    run(&mut scene, 2.0);
    assert!(scene.contains(id));
    assert!(!stamped(&scene));
}

#[test]
fn test_light_wound_dies_as_ragdoll() {
    let mut scene = scene();
    let mut grunt = fighter("grunt", 0.0);
    grunt.positioning.limbs[LimbKind::Body].health = -0.05;
    let id = scene.spawn(grunt);

    let limp = scene
        .try_start_death_sequence(id, &killing_blow(), &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert!(limp);
    assert!(scene.get(id).unwrap().ragdolled);
    assert!(!scene.events().iter().any(|e| matches!(e, CombatEvent::DeathAnimation { .. })));
}

#[test]
fn test_flying_character_dies_as_ragdoll() {
    let mut scene = scene();
    let mut grunt = mortally_wounded("grunt", 0.0);
    grunt.positioning.flying_offset = 150.0;
    let id = scene.spawn(grunt);

    assert!(
        scene
            .try_start_death_sequence(id, &killing_blow(), &mut StdRng::seed_from_u64(3))
            .unwrap()
    );
    assert!(scene.get(id).unwrap().ragdolled);
    assert!(!scene.events().iter().any(|e| matches!(e, CombatEvent::DeathAnimation { .. })));
}

#[test]
fn test_new_epoch_drops_death_tasks() {
    let mut scene = scene();
    let id = scene.spawn(mortally_wounded("grunt", 0.0));
    scene
        .try_start_death_sequence(id, &killing_blow(), &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert!(!scene.scheduler().is_empty());

    let epoch = scene.advance_epoch();
    assert_eq!(scene.session.epoch, epoch);
    run(&mut scene, DT);

    assert!(scene.scheduler().is_empty());
    assert!(scene.get(id).unwrap().animations.is_playing_group("deaths"));
}

#[test]
fn test_paused_scene_holds_tasks() {
    let mut scene = scene();
    scene.start_player_death_sequence().unwrap();

    scene.set_paused(true);
    run(&mut scene, 3.0);
    assert!(!scene.events().iter().any(|e| matches!(e, CombatEvent::DeathMusicCue)));

    scene.set_paused(false);
    run(&mut scene, 1.5);
    assert!(scene.events().iter().any(|e| matches!(e, CombatEvent::DeathMusicCue)));
}

#[test]
fn test_uneven_ground_skips_death_animation() {
    let mut scene = scene_on(Slope);
    let id = scene.spawn(mortally_wounded("grunt", 0.0));

    let ragdolled = scene
        .try_start_death_sequence(id, &killing_blow(), &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert!(ragdolled);
    assert!(scene.get(id).unwrap().ragdolled);
}

#[test]
fn test_player_dies_as_ragdoll() {
    let mut scene = scene();
    let id = scene.spawn(mortally_wounded("hero", 0.0).into_player());
    let limp = scene
        .try_start_death_sequence(id, &killing_blow(), &mut StdRng::seed_from_u64(3))
        .unwrap();

    assert!(limp);
    let player = scene.get(id).unwrap();
    assert!(!player.alive);
    assert!(player.ragdolled);
}

#[test]
fn test_broken_ragdoll_does_not_stall_the_frame() {
    let mut scene = scene();
    let broken = scene.spawn(fighter("broken", 0.0));
    let healthy = scene.spawn(fighter("healthy", 400.0));
    for id in [broken, healthy] {
        scene.get_mut(id).unwrap().kill();
        assert!(scene.turn_into_ragdoll(id, Vec2::new(2.0, 0.0), 1.0).unwrap());
    }
    {
        let ragdoll = scene.get_mut(broken).unwrap().ragdoll.as_mut().unwrap();
        ragdoll.graph.links.clear();
        ragdoll.graph.nodes.clear();
    }
    let before = scene.get(healthy).unwrap().ragdoll.as_ref().unwrap().graph.center_of_mass();
    scene.start_player_death_sequence().unwrap();

    run(&mut scene, 1.5);
    let after = scene.get(healthy).unwrap().ragdoll.as_ref().unwrap().graph.center_of_mass();
    assert!((after - before).length() > 1.0);
    assert!(scene.events().iter().any(|e| matches!(e, CombatEvent::DeathMusicCue)));
}

#[test]
fn test_ragdoll_settles_on_floor() {
    let mut scene = scene();
    let id = scene.spawn(fighter("grunt", 0.0));
    scene.get_mut(id).unwrap().kill();
    assert!(scene.turn_into_ragdoll(id, Vec2::new(2.0, 0.0), 1.0).unwrap());
    assert!(!scene.turn_into_ragdoll(id, Vec2::ZERO, 0.0).unwrap());

    run(&mut scene, 2.0);
    let character = scene.get(id).unwrap();
    assert!(character.ragdolled);
    let ragdoll = character.ragdoll.as_ref().unwrap();
    for node in &ragdoll.graph.nodes {
        assert!(node.position.is_finite());
        assert!(node.position.y > -2.0 * node.radius - 1.0, "node sank to {}", node.position.y);
    }
    assert!(character.center().is_finite());
}

#[test]
fn test_second_player_death_sequence_fails() {
    let mut scene = scene();
    scene.start_player_death_sequence().unwrap();
    assert_eq!(
        scene.start_player_death_sequence(),
        Err(CombatError::PlayerDeathSequenceActive)
    );

    run(&mut scene, 1.5);
    assert!(scene.player_death_sequence().unwrap().time > 1.4);
    assert!(scene.events().iter().any(|e| matches!(e, CombatEvent::DeathMusicCue)));

    assert!(scene.end_player_death_sequence());
    assert!(scene.start_player_death_sequence().is_ok());
}

#[test]
fn test_ended_death_sequence_skips_music() {
    let mut scene = scene();
    scene.start_player_death_sequence().unwrap();
    scene.end_player_death_sequence();
    run(&mut scene, 1.5);
    assert!(!scene.events().iter().any(|e| matches!(e, CombatEvent::DeathMusicCue)));
}

#[test]
fn test_melee_sequence_lands_one_hit() {
    let mut scene = scene();
    let actor = scene.spawn(fighter("hero", 0.0).into_player());
    let victim = scene.spawn(fighter("grunt", 150.0));
    let mut rng = StdRng::seed_from_u64(9);
    let mut arena = FlatArena::new(0.0);

    assert!(scene.try_perform_melee_attack(actor, &mut rng).unwrap());
    assert!(scene.get(actor).unwrap().melee_sequence.is_some());

    for _ in 0..60 {
        let target = scene.get(victim).unwrap().center();
        scene.get_mut(actor).unwrap().aim_target = target;
        arena.sync(scene.colliders());
        scene.update(&arena, &mut rng, DT).unwrap();
    }

    assert!(scene.get(actor).unwrap().melee_sequence.is_none());
    let hits = scene
        .events()
        .iter()
        .filter(|e| matches!(e, CombatEvent::Hit { .. }))
        .count();
    assert_eq!(hits, 1);
    let health = scene.get(victim).unwrap().positioning.limbs.body().health;
    let head = scene.get(victim).unwrap().positioning.limbs.head().health;
    assert!((health + head - 0.38).abs() < 0.001);
}

#[test]
fn test_prop_registers_collider() {
    let mut scene = scene();
    let prop = scene.add_prop(Rect::new(Vec2::new(100.0, 0.0), Vec2::new(140.0, 300.0)));
    assert!(scene.prop(prop).is_some());
    assert_eq!(scene.colliders().len(), 1);
}
