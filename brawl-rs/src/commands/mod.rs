//! Command implementations for each subcommand group

pub mod duel;
pub mod matchup;
pub mod ragdoll;
