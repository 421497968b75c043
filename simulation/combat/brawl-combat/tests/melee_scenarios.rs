//! Integration tests for melee resolution between two characters

use std::sync::Arc;

use brawl_combat::melee::all_profiles;
use brawl_combat::{
    Character, CharacterId, CharacterStats, CollisionLayers, CombatEvent, FlatArena, HandPositionMode, MeleeDamageType,
    MeleeHit, MeleeInteractionResponse, MeleeOutcome, MeleeProfile, MeleeSize, Scene, Weapon, WeaponData,
    interaction_response, presets,
};
use glam::Vec2;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn scene() -> Scene {
    Scene::new(
        Arc::new(presets::animation_library().unwrap()),
        Arc::new(presets::sequence_library()),
        Box::new(FlatArena::new(0.0)),
    )
}

fn weapon(damage_type: MeleeDamageType, size: MeleeSize, damage: f32) -> Weapon {
    Weapon::new(Arc::new(WeaponData::melee("weapon", damage_type, size, damage)))
}

fn fighter(name: &str, x: f32, weapon: Option<Weapon>) -> Character {
    let stats = CharacterStats {
        melee_skill: 1.0,
        dodge_ability: 1.0,
        ..Default::default()
    };
    let mut character = Character::new(name, stats, Vec2::new(x, 0.0));
    character.aim_target = character.aim_origin() + Vec2::X * 1000.0;
    character.equipped = weapon;
    character
}

fn blocking(mut character: Character, progress: f32) -> Character {
    character.is_melee_blocking = true;
    character.positioning.block_progress = progress;
    character
}

fn strike(scene: &mut Scene, actor: CharacterId, damage: f32) -> MeleeOutcome {
    let mut arena = FlatArena::new(0.0);
    arena.sync(scene.colliders());
    let character = scene.get(actor).unwrap();
    let hit = MeleeHit {
        actor,
        origin: character.aim_origin(),
        direction: character.aim_direction(),
        distance: 256.0,
        damage,
        mask: CollisionLayers::CHARACTERS,
        weapon: character.equipped.as_ref().map(|w| Arc::clone(&w.data)),
        final_attack: false,
    };
    scene
        .do_melee_hit(&arena, &mut StdRng::seed_from_u64(42), &hit)
        .unwrap()
}

#[test]
fn test_blocked_blade_drains_dodge_only() {
    let mut scene = scene();
    let actor = scene.spawn(
        fighter(
            "attacker",
            0.0,
            Some(weapon(MeleeDamageType::Blade, MeleeSize::Medium, 0.5)),
        )
        .into_player(),
    );
    let victim = scene.spawn(blocking(
        fighter(
            "defender",
            300.0,
            Some(weapon(MeleeDamageType::Blade, MeleeSize::Medium, 0.5)),
        ),
        0.3,
    ));

    let outcome = strike(&mut scene, actor, 0.5);
    assert_eq!(outcome, MeleeOutcome::Blocked { victim });

    let defender = scene.get(victim).unwrap();
    assert!((defender.dodge - (1.0 - 0.5 * 0.02)).abs() < 0.001);
    assert!((defender.positioning.limbs.head().health - 0.2).abs() < 0.001);
    assert!((defender.positioning.limbs.body().health - 0.3).abs() < 0.001);
    assert!(defender.has_weapon());
}

#[test]
fn test_medium_blade_breaks_small_blade_block() {
    let mut scene = scene();
    let actor = scene.spawn(
        fighter(
            "attacker",
            0.0,
            Some(weapon(MeleeDamageType::Blade, MeleeSize::Medium, 0.5)),
        )
        .into_player(),
    );
    let victim = scene.spawn(blocking(
        fighter(
            "defender",
            300.0,
            Some(weapon(MeleeDamageType::Blade, MeleeSize::Small, 0.3)),
        ),
        0.3,
    ));

    let outcome = strike(&mut scene, actor, 0.5);
    assert_eq!(outcome, MeleeOutcome::StunnedThroughBlock { victim });

    let defender = scene.get(victim).unwrap();
    assert!((defender.dodge - (1.0 - 0.5 * 0.1)).abs() < 0.001);
    assert!((defender.positioning.limbs.body().health - 0.3).abs() < 0.001);
    assert!(defender.animations.is_playing_group("stun"));
}

#[test]
fn test_armed_hit_kills_unarmed_victim() {
    let mut scene = scene();
    let actor = scene.spawn(fighter(
        "attacker",
        0.0,
        Some(weapon(MeleeDamageType::Blunt, MeleeSize::Large, 0.4)),
    ));
    let victim = scene.spawn(fighter("victim", 300.0, None));

    let outcome = strike(&mut scene, actor, 0.4);
    let MeleeOutcome::Hit { limb, killed, .. } = outcome else {
        panic!("expected a hit, got {outcome:?}");
    };
    assert!(killed);

    let dead = scene.get(victim).unwrap();
    assert!(dead.positioning.limbs[limb].health <= 0.0);
    assert!(!dead.alive);
    assert!(dead.ragdolled);
    let ragdoll = dead.ragdoll.as_ref().unwrap();
    assert!(!ragdoll.graph.nodes.is_empty());
    // Only the player's kills count
    assert_eq!(scene.session.kills, 0);

    let events = scene.drain_events();
    assert!(events.iter().any(|e| matches!(e, CombatEvent::Impact { .. })));
    assert!(!events.iter().any(|e| matches!(e, CombatEvent::Slash { .. })));
    assert!(events.iter().any(|e| matches!(e, CombatEvent::Ragdolled { character } if *character == victim)));
}

#[test]
fn test_survivable_hit_plays_reaction() {
    let mut scene = scene();
    let actor = scene.spawn(
        fighter(
            "attacker",
            0.0,
            Some(weapon(MeleeDamageType::Blade, MeleeSize::Small, 0.1)),
        )
        .into_player(),
    );
    let victim = scene.spawn(fighter("victim", 300.0, None));

    let outcome = strike(&mut scene, actor, 0.1);
    assert!(matches!(outcome, MeleeOutcome::Hit { killed: false, .. }));
    let victim = scene.get(victim).unwrap();
    assert!(victim.alive);
    assert!(victim.animations.is_playing_group("hit"));
}

#[test]
fn test_firearm_swing_goes_through_block() {
    let mut scene = scene();
    let pistol = Weapon::new(Arc::new(WeaponData::firearm("pistol", HandPositionMode::OneHand)));
    let actor = scene.spawn(fighter("attacker", 0.0, Some(pistol)).into_player());
    let victim = scene.spawn(blocking(
        fighter(
            "defender",
            300.0,
            Some(weapon(MeleeDamageType::Blade, MeleeSize::Medium, 0.5)),
        ),
        0.3,
    ));

    let outcome = strike(&mut scene, actor, 0.05);
    assert!(matches!(outcome, MeleeOutcome::Hit { killed: false, .. }));
    let defender = scene.get(victim).unwrap();
    assert!(defender.positioning.limbs.body().health < 0.3);
}

#[test]
fn test_matchup_examples() {
    let data = |damage_type, size| WeaponData::melee("w", damage_type, size, 0.5);
    let small_blade = data(MeleeDamageType::Blade, MeleeSize::Small);
    let medium_blade = data(MeleeDamageType::Blade, MeleeSize::Medium);
    let large_blunt = data(MeleeDamageType::Blunt, MeleeSize::Large);

    assert_eq!(
        interaction_response(&small_blade, &large_blunt),
        MeleeInteractionResponse::StunVictim
    );
    assert_eq!(
        interaction_response(&medium_blade, &small_blade),
        MeleeInteractionResponse::StunVictim
    );
    assert_eq!(
        interaction_response(&medium_blade, &medium_blade),
        MeleeInteractionResponse::BlockVictim
    );
}

fn profile_weapon(profile: MeleeProfile) -> Weapon {
    let mut data = WeaponData::melee("weapon", profile.damage_type, profile.size, 0.5);
    data.special_melee = profile.special;
    Weapon::new(Arc::new(data))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_perfect_block_wins_over_matchup(
        actor_index in 0usize..9,
        victim_index in 0usize..9,
        progress in 0.0f32..0.99,
        damage in 0.01f32..2.0,
    ) {
        let profiles = all_profiles();
        let mut scene = scene();
        let actor = scene.spawn(fighter("attacker", 0.0, Some(profile_weapon(profiles[actor_index]))));
        let victim = scene.spawn(
            blocking(fighter("defender", 300.0, Some(profile_weapon(profiles[victim_index]))), progress)
                .into_player(),
        );

        let outcome = strike(&mut scene, actor, damage);
        prop_assert_eq!(outcome, MeleeOutcome::Parried { victim, disarmed: false });
        let defender = scene.get(victim).unwrap();
        prop_assert!((defender.positioning.limbs.body().health - 0.3).abs() < 0.001);
        prop_assert!((defender.dodge - 1.0).abs() < 0.001);
        prop_assert!(scene.get(actor).unwrap().dodge.abs() < 0.001);
    }
}
