//! Stock animations and melee sequences
//!
//! Authored assets are loaded by the game. These procedural stand-ins cover every
//! animation the combat core asks for by name, so scenes can be driven from tests,
//! benchmarks and the command line without any asset files.

use brawl_anim::math::easing;
use brawl_anim::{
    Angle, AnimationConstraint, AnimationLibrary, CharacterAnimation, Curve, HandLimbAnimation, HandLook,
    LimbAnimation, Result,
};
use glam::Vec2;

use crate::melee::{MeleeSequence, MeleeSequenceLibrary, SequenceKey};
use crate::scene::DEATH_GROUP;

/// Keys on every stock attack curve; hit and transition frames index into these
///
/// The last key of a sequence ends it at its transition frame, so that frame
/// always comes after the last hit frame.
pub const ATTACK_KEYS: usize = 6;

const ATTACK_GROUP: &str = "melee";
const STUN_GROUP: &str = "stun";

fn swing(duration: f32, from: Vec2, to: Vec2, keys: usize) -> LimbAnimation {
    let last = keys.saturating_sub(1).max(1) as f32;
    let translation = Curve::from_pairs((0..keys).map(|i| {
        let t = i as f32 / last;
        (t, from.lerp(to, easing::quad_in_out(t)))
    }));
    LimbAnimation::new(duration)
        .with_translation(translation)
        .with_rotation(Curve::from_pairs([(0.0, Angle(-35.0)), (0.5, Angle(20.0)), (1.0, Angle(0.0))]))
}

fn sway(duration: f32, offset: Vec2) -> LimbAnimation {
    LimbAnimation::new(duration).with_translation(Curve::from_pairs([
        (0.0, Vec2::ZERO),
        (0.4, offset),
        (1.0, Vec2::ZERO),
    ]))
}

fn tilt(duration: f32, degrees: f32) -> LimbAnimation {
    LimbAnimation::new(duration).with_rotation(Curve::from_pairs([
        (0.0, Angle(0.0)),
        (0.4, Angle(degrees)),
        (1.0, Angle(0.0)),
    ]))
}

fn attack(name: &str, duration: f32, reach: f32, look: HandLook) -> Result<CharacterAnimation> {
    let lead = swing(duration, Vec2::new(-40.0, 20.0), Vec2::new(reach, 0.0), ATTACK_KEYS);
    let trail = swing(duration, Vec2::new(-20.0, 10.0), Vec2::new(reach * 0.6, -10.0), ATTACK_KEYS);
    CharacterAnimation::new(name, ATTACK_GROUP)
        .with_body(sway(duration, Vec2::new(25.0, -5.0)))
        .with_head(sway(duration, Vec2::new(30.0, -10.0)))
        .with_hands(
            HandLimbAnimation::new(lead).with_look(0.0, Some(look)),
            HandLimbAnimation::new(trail).with_look(0.0, Some(look)),
        )
        .with_relative_hands(true)
        .with_constraint(
            0.0,
            AnimationConstraint::PREVENT_DODGE | AnimationConstraint::PREVENT_FLIP | AnimationConstraint::PREVENT_BLOCK,
        )
        .build()
}

fn reaction(
    name: &str,
    group: &str,
    duration: f32,
    lean: f32,
    constraints: AnimationConstraint,
) -> Result<CharacterAnimation> {
    CharacterAnimation::new(name, group)
        .with_body(tilt(duration, lean).with_translation(Curve::from_pairs([
            (0.0, Vec2::ZERO),
            (0.4, Vec2::new(-lean, -10.0)),
            (1.0, Vec2::ZERO),
        ])))
        .with_head(tilt(duration, lean * 1.5))
        .with_constraint(0.0, constraints)
        .with_constraint(duration * 0.9, AnimationConstraint::ALLOW_ALL)
        .build()
}

fn death(name: &str, duration: f32, fall: f32) -> Result<CharacterAnimation> {
    let collapse = |depth: f32| {
        LimbAnimation::new(duration)
            .with_translation(Curve::from_pairs([
                (0.0, Vec2::ZERO),
                (0.6, Vec2::new(fall * 0.5, -depth * 0.5)),
                (1.0, Vec2::new(fall, -depth)),
            ]))
            .with_rotation(Curve::from_pairs([(0.0, Angle(0.0)), (1.0, Angle(fall.signum() * -80.0))]))
    };
    let limp = HandLimbAnimation::new(collapse(160.0)).with_look(0.0, Some(HandLook::Open));
    CharacterAnimation::new(name, DEATH_GROUP)
        .with_body(collapse(140.0))
        .with_head(collapse(200.0))
        .with_hands(limp.clone(), limp)
        .with_relative_hands(true)
        .with_constraint(
            0.0,
            AnimationConstraint::PREVENT_ALL_ATTACKING
                | AnimationConstraint::PREVENT_ALL_MOVEMENT
                | AnimationConstraint::PREVENT_DODGE
                | AnimationConstraint::PREVENT_BLOCK
                | AnimationConstraint::PREVENT_BEING_MELEED,
        )
        .build()
}

/// Death animations by name, length and how far forwards they fall
///
/// Hits from the front knock the character backwards.
const DEATHS: [(&str, f32, f32); 8] = [
    ("f_headshot_stumble_back", 1.6, -80.0),
    ("b_headshot_stumble_for", 1.4, 70.0),
    ("f_throatshot_stumble_back", 1.5, -70.0),
    ("b_throatshot_stumble_for", 1.4, 60.0),
    ("f_bodyshot_stumble_back", 1.5, -60.0),
    ("b_bodyshot_stumble_for", 1.3, 60.0),
    ("f_legshot_pain_back", 1.7, -40.0),
    ("b_legshot_suffer_back", 1.6, 40.0),
];

/// Attack animations of every stock sequence, by name and reach
const ATTACKS: [(&str, f32, f32, HandLook); 13] = [
    ("melee_unarmed_adept_1", 0.35, 90.0, HandLook::Fist),
    ("melee_unarmed_adept_2", 0.35, 100.0, HandLook::Fist),
    ("melee_unarmed_adept_3", 0.5, 130.0, HandLook::Fist),
    ("melee_sword_adept_1", 0.45, 160.0, HandLook::HoldPistol),
    ("melee_sword_adept_2", 0.45, 160.0, HandLook::HoldPistol),
    ("melee_sword_adept_2_R", 0.4, 180.0, HandLook::HoldPistol),
    ("melee_sword_adept_2_L", 0.4, 180.0, HandLook::HoldPistol),
    ("melee_twohanded_blunt_1", 0.7, 170.0, HandLook::HoldRifle),
    ("melee_twohanded_blunt_2", 0.7, 170.0, HandLook::HoldRifle),
    ("melee_blunt_1", 0.5, 140.0, HandLook::HoldPistol),
    ("melee_blunt_2", 0.5, 140.0, HandLook::HoldPistol),
    ("melee_twohanded_gun", 0.5, 120.0, HandLook::HoldRifle),
    ("melee_onehanded_gun", 0.4, 100.0, HandLook::HoldPistol),
];

/// Every animation the combat core plays by name
pub fn animation_library() -> Result<AnimationLibrary> {
    use AnimationConstraint as C;

    let mut library = AnimationLibrary::new();
    for (name, duration, reach, look) in ATTACKS {
        library.insert(attack(name, duration, reach, look)?);
    }

    let dodging = C::PREVENT_DODGE | C::PREVENT_MELEE | C::PREVENT_BEING_MELEED;
    library.insert(reaction("dodge_1", "dodge", 0.4, -20.0, dodging)?);
    library.insert(reaction("dodge_2", "dodge", 0.4, 20.0, dodging)?);

    library.insert(reaction("hit_enemy_1", "hit", 0.3, -8.0, C::PREVENT_MELEE)?);
    library.insert(reaction("hit_enemy_2", "hit", 0.3, 8.0, C::PREVENT_MELEE)?);

    let light = C::PREVENT_MELEE | C::PREVENT_DODGE | C::PREVENT_BLOCK;
    library.insert(reaction("melee_stun_sword_L", STUN_GROUP, 0.6, -15.0, light)?);
    library.insert(reaction("melee_stun_sword_R", STUN_GROUP, 0.6, 15.0, light)?);
    library.insert(reaction("stun_light_forwards", STUN_GROUP, 0.5, 12.0, light)?);
    library.insert(reaction("stun_light_backwards", STUN_GROUP, 0.5, -12.0, light)?);
    library.insert(reaction("stun_light_backwards2", STUN_GROUP, 0.5, -18.0, light)?);

    let heavy = light | C::PREVENT_ALL_MOVEMENT;
    library.insert(reaction("stun_heavy_forwards", STUN_GROUP, 1.2, 35.0, heavy)?);
    library.insert(reaction("stun_heavy_backwards", STUN_GROUP, 1.2, -35.0, heavy)?);
    library.insert(reaction("stun_heavy_backwards2", STUN_GROUP, 1.3, -45.0, heavy)?);
    library.insert(reaction("stun_wall_heavy_forwards", STUN_GROUP, 1.0, 20.0, heavy)?);
    library.insert(reaction("stun_wall_heavy_backwards", STUN_GROUP, 1.0, -20.0, heavy)?);

    for (name, duration, fall) in DEATHS {
        library.insert(death(name, duration, fall)?);
    }

    log::debug!("Built {} stock animations", library.len());
    Ok(library)
}

/// The stock melee sequences, matching [`crate::melee::MeleeSequenceNames::default`]
pub fn sequence_library() -> MeleeSequenceLibrary {
    let mut library = MeleeSequenceLibrary::new();
    library.insert(MeleeSequence::new(
        "unarmed_adept",
        [
            SequenceKey::new("melee_unarmed_adept_1", 4, [3]),
            SequenceKey::new("melee_unarmed_adept_2", 4, [3]),
            SequenceKey::new("melee_unarmed_adept_3", 5, [4]),
        ],
    ));
    library.insert(MeleeSequence::new(
        "sword_adept",
        [
            SequenceKey::new("melee_sword_adept_1", 4, [3]),
            SequenceKey::new("melee_sword_adept_2", 5, [3]),
        ],
    ));
    library.insert(MeleeSequence::new(
        "sword_adept_2",
        [SequenceKey::double_sided(
            "melee_sword_adept_2_R",
            "melee_sword_adept_2_L",
            5,
            [2, 4],
        )],
    ));
    library.insert(MeleeSequence::new(
        "twohanded_blunt",
        [
            SequenceKey::new("melee_twohanded_blunt_1", 5, [4]),
            SequenceKey::new("melee_twohanded_blunt_2", 5, [4]),
        ],
    ));
    library.insert(MeleeSequence::new(
        "blunt",
        [
            SequenceKey::new("melee_blunt_1", 4, [3]),
            SequenceKey::new("melee_blunt_2", 5, [3]),
        ],
    ));
    library.insert(MeleeSequence::new(
        "twohanded_gun",
        [SequenceKey::new("melee_twohanded_gun", 5, [3])],
    ));
    library.insert(MeleeSequence::new(
        "onehanded_gun",
        [SequenceKey::new("melee_onehanded_gun", 5, [3])],
    ));
    library
}
