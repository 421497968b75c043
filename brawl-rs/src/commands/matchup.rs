//! Melee matchup command implementations

use anyhow::Result;
use brawl_combat::melee::all_profiles;
use brawl_combat::{MeleeInteractionResponse, MeleeProfile, block_response, profile_response};
use clap::{Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::utils::{DEFAULT_MELEE_DAMAGE, add_table_row, create_table, describe_weapon, parse_weapon};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum MatchupCommands {
    /// Print the full grid of block responses
    Table {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Include special weapons, which win every exchange
        #[arg(long)]
        special: bool,
    },

    /// Resolve one attacker against one blocking defender
    Check {
        /// Attacking weapon (e.g. "blade:small", "blunt:large:special", "firearm", "none")
        actor: String,

        /// Blocking weapon, same format as the attacker
        victim: String,
    },
}

#[derive(Serialize)]
struct MatchupEntry {
    actor: MeleeProfile,
    victim: MeleeProfile,
    response: MeleeInteractionResponse,
}

pub fn execute(command: MatchupCommands) -> Result<()> {
    match command {
        MatchupCommands::Table { format, special } => execute_table(format, special),
        MatchupCommands::Check { actor, victim } => execute_check(&actor, &victim),
    }
}

fn styled(response: MeleeInteractionResponse) -> ColoredString {
    let text = response.to_string();
    match response {
        MeleeInteractionResponse::StunVictim => text.red().bold(),
        MeleeInteractionResponse::BlockVictim => text.green(),
        MeleeInteractionResponse::Unobstructed => text.yellow(),
        MeleeInteractionResponse::Invalid => text.dimmed(),
    }
}

fn profiles(special: bool) -> Vec<MeleeProfile> {
    let mut profiles = all_profiles();
    if special {
        let specials: Vec<_> = profiles.iter().map(|p| p.special()).collect();
        profiles.extend(specials);
    }
    profiles
}

fn execute_table(format: OutputFormat, special: bool) -> Result<()> {
    let profiles = profiles(special);
    log::info!("Resolving {} matchups", profiles.len() * profiles.len());

    match format {
        OutputFormat::Json => {
            let entries: Vec<MatchupEntry> = profiles
                .iter()
                .flat_map(|&actor| {
                    profiles.iter().map(move |&victim| MatchupEntry {
                        actor,
                        victim,
                        response: profile_response(actor, victim),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let names: Vec<String> = profiles.iter().map(ToString::to_string).collect();
            let mut headers = vec!["Attacker \\ Blocker"];
            headers.extend(names.iter().map(String::as_str));
            let mut table = create_table(&headers);

            for (actor, name) in profiles.iter().zip(&names) {
                let mut cells = vec![name.clone()];
                cells.extend(
                    profiles
                        .iter()
                        .map(|victim| profile_response(*actor, *victim).to_string()),
                );
                add_table_row(&mut table, cells);
            }
            table.printstd();
        }
    }
    Ok(())
}

fn execute_check(actor: &str, victim: &str) -> Result<()> {
    let actor = parse_weapon(actor, DEFAULT_MELEE_DAMAGE)?;
    let victim = parse_weapon(victim, DEFAULT_MELEE_DAMAGE)?;
    let response = block_response(actor.as_ref(), victim.as_ref());

    println!(
        "{} vs blocking {}: {}",
        describe_weapon(actor.as_ref()).bold(),
        describe_weapon(victim.as_ref()).bold(),
        styled(response)
    );
    Ok(())
}
