//! Scripted duel command implementations

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use brawl_combat::{
    Character, CharacterId, CharacterStats, CollisionLayers, CombatEvent, CombatTuning, FlatArena, GameMode, Scene,
    Session, Weapon, presets,
};
use clap::Subcommand;
use colored::Colorize;
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use crate::utils::{add_table_row, create_table, describe_weapon, fmt_f32, fmt_vec2, parse_weapon};

const FRAME: f32 = 1.0 / 60.0;

#[derive(Subcommand)]
pub enum DuelCommands {
    /// Run a scripted duel and print what happened
    Run {
        /// Path to the scenario JSON file
        scenario: PathBuf,

        /// Seed for every random draw
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Path to a JSON file overriding combat tuning values
        #[arg(long, value_name = "FILE")]
        tuning: Option<PathBuf>,
    },
}

fn default_duration() -> f32 {
    3.0
}

fn default_weapon() -> String {
    "none".to_string()
}

fn default_damage() -> f32 {
    crate::utils::DEFAULT_MELEE_DAMAGE
}

/// A duel between two fighters on flat ground
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Seconds to simulate
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default)]
    pub floor: f32,
    /// X positions of walls on either side of the arena
    #[serde(default)]
    pub walls: Option<(f32, f32)>,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub player_invulnerable: bool,
    pub fighters: Vec<FighterScript>,
}

/// One fighter and what it does over the duel
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FighterScript {
    pub name: String,
    pub x: f32,
    #[serde(default)]
    pub player: bool,
    /// Weapon spec such as `blade:medium`
    #[serde(default = "default_weapon")]
    pub weapon: String,
    #[serde(default = "default_damage")]
    pub damage: f32,
    /// Hold a block for the whole duel
    #[serde(default)]
    pub block: bool,
    #[serde(default)]
    pub block_progress: f32,
    /// Times in seconds at which an attack is pressed
    #[serde(default)]
    pub attacks: Vec<f32>,
    #[serde(default)]
    pub stats: CharacterStats,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let scenario: Self =
            serde_json::from_str(&text).with_context(|| format!("Failed to parse scenario {}", path.display()))?;
        if scenario.fighters.len() != 2 {
            bail!("A duel needs exactly two fighters, found {}", scenario.fighters.len());
        }
        if !scenario.duration.is_finite() || scenario.duration < 0.0 {
            bail!("Invalid duel duration: {}", scenario.duration);
        }
        Ok(scenario)
    }
}

fn load_tuning(path: Option<&Path>) -> Result<CombatTuning> {
    let Some(path) = path else {
        return Ok(CombatTuning::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read tuning {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse tuning {}", path.display()))
}

pub fn execute(command: DuelCommands) -> Result<()> {
    match command {
        DuelCommands::Run { scenario, seed, tuning } => execute_run(&scenario, seed, tuning.as_deref()),
    }
}

struct Fighter {
    id: CharacterId,
    script: FighterScript,
    next_attack: usize,
}

fn spawn_fighter(scene: &mut Scene, mut script: FighterScript) -> Result<Fighter> {
    let weapon = parse_weapon(&script.weapon, script.damage)
        .with_context(|| format!("Invalid weapon for {}", script.name))?;
    let stats = std::mem::take(&mut script.stats);
    let mut character = Character::new(script.name.clone(), stats, Vec2::new(script.x, 0.0));
    if script.player {
        character = character.into_player();
    } else {
        character.enemy_layers = CollisionLayers::CHARACTERS;
    }
    character.equipped = weapon.map(|data| Weapon::new(Arc::new(data)));
    character.is_melee_blocking = script.block;
    character.positioning.block_progress = script.block_progress;

    script.attacks.sort_by(f32::total_cmp);
    let id = scene.spawn(character);
    log::info!("Spawned {} at x={} as {}", script.name, script.x, id);
    Ok(Fighter {
        id,
        script,
        next_attack: 0,
    })
}

fn name(names: &HashMap<CharacterId, String>, id: CharacterId) -> &str {
    names.get(&id).map_or("?", String::as_str)
}

fn describe(event: &CombatEvent, names: &HashMap<CharacterId, String>) -> String {
    let n = |id: &CharacterId| name(names, *id).to_string();
    match event {
        CombatEvent::PropStruck { actor, entity, .. } => format!("{} struck prop {}", n(actor), entity),
        CombatEvent::Parried {
            actor,
            victim,
            disarmed,
        } => {
            let tail = if *disarmed { ", knocking the weapon away" } else { "" };
            format!("{} parried {}{}", n(victim), n(actor), tail).yellow().to_string()
        }
        CombatEvent::Clash { actor, victim, stunned, .. } => {
            if *stunned {
                format!("{} broke through the block of {}", n(actor), n(victim)).yellow().to_string()
            } else {
                format!("{} blocked {}", n(victim), n(actor))
            }
        }
        CombatEvent::Dodged { actor, victim } => format!("{} dodged {}", n(victim), n(actor)),
        CombatEvent::Hit {
            actor,
            victim,
            limb,
            damage,
            ..
        } => format!("{} hit {} in the {:?} for {}", n(actor), n(victim), limb, fmt_f32(*damage)),
        CombatEvent::Slash { victim, .. } => format!("{} was cut", n(victim)),
        CombatEvent::BloodSpurt { position, .. } => format!("blood at {}", fmt_vec2(*position)).dimmed().to_string(),
        CombatEvent::Impact { victim, .. } => format!("{} took a blunt impact", n(victim)),
        CombatEvent::Stunned { character, animation } => format!("{} is stunned ({})", n(character), animation),
        CombatEvent::WeaponDropped { character, weapon, .. } => format!("{} dropped {}", n(character), weapon),
        CombatEvent::Killed { actor, victim } => format!("{} killed {}", n(actor), n(victim)).red().bold().to_string(),
        CombatEvent::Ragdolled { character } => format!("{} went limp", n(character)),
        CombatEvent::DeathAnimation { character, animation } => {
            format!("{} collapses ({})", n(character), animation)
        }
        CombatEvent::Stamped { character } => format!("{} was stamped into the background", n(character)),
        CombatEvent::PlayerDeathSequenceStarted => "player death sequence started".red().to_string(),
        CombatEvent::DeathMusicCue => "death music".dimmed().to_string(),
    }
}

fn execute_run(path: &Path, seed: u64, tuning: Option<&Path>) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let tuning = load_tuning(tuning)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let library = presets::animation_library().context("Failed to build stock animations")?;
    let session = Session {
        player_invulnerable: scenario.player_invulnerable,
        ..Session::new(scenario.mode)
    };
    let mut scene = Scene::new(
        Arc::new(library),
        Arc::new(presets::sequence_library()),
        Box::new(FlatArena::new(scenario.floor)),
    )
    .with_session(session)
    .with_tuning(tuning);

    let mut arena = FlatArena::new(scenario.floor);
    if let Some((left, right)) = scenario.walls {
        arena = arena.with_walls(left, right, 1);
    }

    let mut fighters = Vec::with_capacity(2);
    for script in scenario.fighters {
        fighters.push(spawn_fighter(&mut scene, script)?);
    }
    let names: HashMap<CharacterId, String> = fighters.iter().map(|f| (f.id, f.script.name.clone())).collect();

    let frames = (scenario.duration / FRAME).ceil() as usize;
    let mut log_lines = Vec::new();
    for frame in 0..frames {
        let time = frame as f32 * FRAME;
        for i in 0..fighters.len() {
            let opponent = fighters[1 - i].id;
            let target = scene.get(opponent).ok().map(Character::center);
            let fighter = &mut fighters[i];
            let Ok(character) = scene.get_mut(fighter.id) else {
                continue;
            };
            if let Some(target) = target {
                character.aim_target = target;
            }
            character.is_melee_blocking = fighter.script.block;

            while fighter.script.attacks.get(fighter.next_attack).is_some_and(|&at| at <= time) {
                fighter.next_attack += 1;
                let started = scene.try_perform_melee_attack(fighter.id, &mut rng)?;
                log::debug!("{} attack at {:.2}s accepted: {}", fighter.script.name, time, started);
            }
        }

        arena.sync(scene.colliders());
        scene.update(&arena, &mut rng, FRAME)?;
        for event in scene.drain_events() {
            log_lines.push((time, describe(&event, &names)));
        }
    }

    println!("{}", "Event log".bold());
    if log_lines.is_empty() {
        println!("  (nothing happened)");
    }
    for (time, line) in &log_lines {
        println!("  {:>6.2}s  {}", time, line);
    }

    println!();
    println!("{}", "Final state".bold());
    let mut table = create_table(&["Fighter", "Weapon", "State", "Head", "Body", "Dodge"]);
    for fighter in &fighters {
        let Ok(character) = scene.get(fighter.id) else {
            add_table_row(
                &mut table,
                [fighter.script.name.as_str(), "-", "stamped", "-", "-", "-"],
            );
            continue;
        };
        let state = match (character.alive, character.ragdolled) {
            (true, _) => "alive",
            (false, true) => "ragdoll",
            (false, false) => "dying",
        };
        let limbs = &character.positioning.limbs;
        add_table_row(
            &mut table,
            [
                character.name.clone(),
                describe_weapon(character.equipped.as_ref().map(|w| w.data.as_ref())),
                state.to_string(),
                fmt_f32(limbs.head().health),
                fmt_f32(limbs.body().health),
                fmt_f32(character.dodge),
            ],
        );
    }
    table.printstd();
    println!("Kills: {}", scene.session.kills);
    Ok(())
}
