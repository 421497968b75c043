use brawl_anim::AnimationError;
use brawl_ragdoll::RagdollError;
use thiserror::Error;

use crate::character::CharacterId;

/// Error types for combat resolution and scene bookkeeping
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CombatError {
    /// No character slot exists for this id
    #[error("Unknown character: {0}")]
    UnknownCharacter(CharacterId),

    /// The slot was reused or emptied since the id was handed out
    #[error("Stale character id: {0}")]
    StaleCharacter(CharacterId),

    /// An operation that needs two characters was given the same one twice
    #[error("Character {0} cannot interact with itself")]
    SameCharacter(CharacterId),

    /// Only one player death sequence may run at a time
    #[error("There is already a player death sequence in progress")]
    PlayerDeathSequenceActive,

    /// A required animation key or group is not registered
    #[error("Missing animation: {0}")]
    MissingAnimation(String),

    #[error("Animation error: {0}")]
    Animation(#[from] AnimationError),

    #[error("Ragdoll error: {0}")]
    Ragdoll(#[from] RagdollError),
}

/// Result type using CombatError
pub type Result<T> = std::result::Result<T, CombatError>;
