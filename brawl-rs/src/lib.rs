//! Brawl-RS library
//!
//! Command implementations behind the `brawl-rs` binary.

pub mod cli;
pub mod commands;
pub mod utils;
