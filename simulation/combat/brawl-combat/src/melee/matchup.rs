//! Which side wins when a swing meets a block

use std::fmt;

use crate::weapon::{MeleeDamageType, MeleeProfile, MeleeSize, WeaponData};

/// Outcome of a swing landing on a blocking victim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum MeleeInteractionResponse {
    /// The pairing has no melee meaning; the hit goes through to damage
    Invalid,
    /// Nothing stands in the way of the attack
    Unobstructed,
    /// The victim absorbs the attack
    BlockVictim,
    /// The attack breaks through the block and stuns the victim
    StunVictim,
}

impl fmt::Display for MeleeInteractionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "Invalid",
            Self::Unobstructed => "Unobstructed",
            Self::BlockVictim => "BlockVictim",
            Self::StunVictim => "StunVictim",
        };
        f.write_str(name)
    }
}

/// Response between two melee weapons
pub fn profile_response(actor: MeleeProfile, victim: MeleeProfile) -> MeleeInteractionResponse {
    use MeleeDamageType::{Axe, Blade, Blunt, Firearm};
    use MeleeInteractionResponse::{BlockVictim, StunVictim};
    use MeleeSize::{Large, Medium, Small};

    if victim.special {
        return BlockVictim;
    }
    if actor.special {
        return StunVictim;
    }

    let small = victim.size == Small;
    let stuns = match (actor.damage_type, actor.size) {
        (Blade | Axe, Small) => victim.size == Large && victim.damage_type == Blunt,
        (Blade | Axe, _) => small && matches!(victim.damage_type, Blade | Axe),
        // Blunt weapons only break through small blades, not small axes
        (Blunt, Large) => (small && victim.damage_type == Blade) || victim.size == Medium,
        (Blunt, _) => (small && victim.damage_type == Blade) || (victim.size == Medium && victim.damage_type == Blunt),
        (Firearm, _) => false,
    };
    if stuns { StunVictim } else { BlockVictim }
}

/// Response between two weapons; anything other than melee on both sides is invalid
pub fn interaction_response(actor: &WeaponData, victim: &WeaponData) -> MeleeInteractionResponse {
    match (actor.melee_profile(), victim.melee_profile()) {
        (Some(actor), Some(victim)) => profile_response(actor, victim),
        _ => MeleeInteractionResponse::Invalid,
    }
}

/// Response to an attack on a blocking victim, with either side possibly unarmed
pub fn block_response(actor: Option<&WeaponData>, victim: Option<&WeaponData>) -> MeleeInteractionResponse {
    match (actor, victim) {
        (Some(actor), Some(victim)) => interaction_response(actor, victim),
        (None, Some(_)) => MeleeInteractionResponse::Unobstructed,
        (Some(_), None) => MeleeInteractionResponse::StunVictim,
        (None, None) => MeleeInteractionResponse::BlockVictim,
    }
}

/// Every non-special melee profile, in table order
pub fn all_profiles() -> Vec<MeleeProfile> {
    let mut profiles = Vec::with_capacity(9);
    for damage_type in [MeleeDamageType::Blade, MeleeDamageType::Axe, MeleeDamageType::Blunt] {
        for size in [MeleeSize::Small, MeleeSize::Medium, MeleeSize::Large] {
            profiles.push(MeleeProfile::new(damage_type, size));
        }
    }
    profiles
}
