//! Things that happened in a scene, for audio, decals and logs to react to

use glam::Vec2;

use crate::character::{CharacterId, LimbKind};
use crate::world::EntityId;

/// A fire-and-forget notification emitted by the scene
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(tag = "event", rename_all = "snake_case"))]
pub enum CombatEvent {
    /// A melee hit struck something that is not a character
    PropStruck { actor: CharacterId, entity: EntityId, position: Vec2 },
    /// The victim parried and stunned the attacker
    Parried {
        actor: CharacterId,
        victim: CharacterId,
        disarmed: bool,
    },
    /// Weapons met; `stunned` when the attack broke through the block
    Clash {
        actor: CharacterId,
        victim: CharacterId,
        position: Vec2,
        stunned: bool,
    },
    Dodged { actor: CharacterId, victim: CharacterId },
    Hit {
        actor: CharacterId,
        victim: CharacterId,
        limb: LimbKind,
        damage: f32,
        position: Vec2,
    },
    /// A blade or axe cut
    Slash { victim: CharacterId, position: Vec2, direction: Vec2 },
    BloodSpurt { position: Vec2, direction: Vec2 },
    /// A blunt or unarmed impact
    Impact { victim: CharacterId, position: Vec2 },
    Stunned {
        character: CharacterId,
        animation: String,
    },
    WeaponDropped {
        character: CharacterId,
        weapon: String,
        position: Vec2,
    },
    Killed { actor: CharacterId, victim: CharacterId },
    Ragdolled { character: CharacterId },
    DeathAnimation {
        character: CharacterId,
        animation: String,
    },
    /// The body was baked into the background and removed
    Stamped { character: CharacterId },
    PlayerDeathSequenceStarted,
    DeathMusicCue,
}
