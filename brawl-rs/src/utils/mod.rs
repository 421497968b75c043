//! Shared utilities for the brawl-rs CLI

pub mod table;
pub mod weapon_spec;

pub use table::*;
pub use weapon_spec::*;
