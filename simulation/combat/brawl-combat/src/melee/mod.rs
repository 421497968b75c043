//! Melee combat: attack sequences, the weapon matchup table and hit resolution

pub mod matchup;
pub mod resolver;
pub mod sequence;

pub use matchup::{MeleeInteractionResponse, all_profiles, block_response, interaction_response, profile_response};
pub use resolver::{MeleeHit, MeleeOutcome};
pub use sequence::{
    MeleeSequence, MeleeSequenceLibrary, MeleeSequenceNames, MeleeSequenceState, SequenceKey, SequenceStep,
    melee_speed,
};
