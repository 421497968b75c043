//! Root CLI structure for brawl-rs

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "brawl-rs")]
#[command(about = "Command-line tools for melee matchups, ragdolls and scripted duels", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Melee block matchup operations
    Matchup {
        #[command(subcommand)]
        command: crate::commands::matchup::MatchupCommands,
    },

    /// Ragdoll construction and simulation
    Ragdoll {
        #[command(subcommand)]
        command: crate::commands::ragdoll::RagdollCommands,
    },

    /// Scripted duels between two characters
    Duel {
        #[command(subcommand)]
        command: crate::commands::duel::DuelCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
