//! Melee combat and procedural posing for 2D limb-animated characters
//!
//! This crate sits on top of `brawl-anim` and `brawl-ragdoll`:
//! - [`Character`] aggregates the animation stack, limb positioning and stats
//! - [`pose`] places the hands around whatever weapon is held
//! - [`melee`] runs attack sequences and resolves hits through the matchup table
//! - [`Scene`] owns the characters and drives death sequences and ragdolls
//! - [`death`] picks the death animation a killing hit calls for
//!
//! Physics and terrain are collaborators behind the [`PhysicsWorld`] and
//! [`Terrain`] traits. Audio and decals are left to whoever consumes the
//! [`CombatEvent`]s a scene emits.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use brawl_combat::{
//!     Character, CharacterStats, FlatArena, MeleeDamageType, MeleeInteractionResponse, MeleeSize, Scene,
//!     WeaponData, interaction_response, presets,
//! };
//! use glam::Vec2;
//!
//! let sword = WeaponData::melee("sword", MeleeDamageType::Blade, MeleeSize::Medium, 0.5);
//! let knife = WeaponData::melee("knife", MeleeDamageType::Blade, MeleeSize::Small, 0.3);
//! assert_eq!(interaction_response(&sword, &knife), MeleeInteractionResponse::StunVictim);
//!
//! let mut scene = Scene::new(
//!     Arc::new(presets::animation_library()?),
//!     Arc::new(presets::sequence_library()),
//!     Box::new(FlatArena::new(0.0)),
//! );
//! let id = scene.spawn(Character::new("grunt", CharacterStats::default(), Vec2::ZERO));
//! assert!(scene.get(id)?.alive);
//! # Ok::<(), brawl_combat::CombatError>(())
//! ```

pub mod character;
pub mod death;
pub mod error;
pub mod event;
pub mod melee;
pub mod pose;
pub mod presets;
pub mod scene;
pub mod schedule;
pub mod session;
pub mod tuning;
pub mod weapon;
pub mod world;

pub use character::{Character, CharacterFlags, CharacterId, CharacterStats, FrameInput, Limb, LimbKind, Positioning};
pub use death::{DeathHit, DeathKind};
pub use error::{CombatError, Result};
pub use event::CombatEvent;
pub use melee::{
    MeleeHit, MeleeInteractionResponse, MeleeOutcome, MeleeSequenceLibrary, MeleeSequenceNames, block_response,
    interaction_response, profile_response,
};
pub use pose::{HandPoseOverride, PoseOverrides, WeaponCategory};
pub use scene::{BodyPart, DEATH_GROUP, PlayerDeathSequence, Prop, Scene};
pub use schedule::{Scheduler, TaskId};
pub use session::{GameMode, Session};
pub use tuning::CombatTuning;
pub use weapon::{HandPositionMode, LooseWeapon, MeleeDamageType, MeleeProfile, MeleeSize, Weapon, WeaponData, WeaponType};
pub use world::{Collider, CollisionLayers, EntityId, FlatArena, PhysicsWorld, Rect, RaycastHit, Terrain};
