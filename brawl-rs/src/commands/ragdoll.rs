//! Ragdoll command implementations

use anyhow::{Context, Result};
use brawl_combat::scene::RAGDOLL_MEASURE_INTERVAL;
use brawl_combat::{Character, CharacterStats};
use brawl_ragdoll::{FlatGround, NodeId, Ragdoll, RagdollNodes, VerletSettings, VerletSolver, build_ragdoll};
use clap::Subcommand;
use colored::Colorize;
use glam::Vec2;

use crate::utils::{add_table_row, create_table, fmt_f32, fmt_vec2};

/// Frames the rest pose is given to settle before the ragdoll is seeded
const SETTLE_FRAMES: usize = 30;
const FRAME: f32 = 1.0 / 60.0;

#[derive(Subcommand)]
pub enum RagdollCommands {
    /// Build a ragdoll from the rest pose and list its nodes and links
    Build {
        /// Character scale
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// Face left instead of right
        #[arg(long)]
        flipped: bool,

        /// Print the ragdoll as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop a rest-pose ragdoll onto flat ground and print where its nodes end up
    Simulate {
        /// Number of 60 Hz frames to simulate
        #[arg(long, default_value_t = 120)]
        steps: usize,

        /// Character scale
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// Horizontal push applied to every node at the start
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        push: f32,

        /// Verlet cycles per second
        #[arg(long, default_value_t = 200.0)]
        rate: f32,
    },
}

pub fn execute(command: RagdollCommands) -> Result<()> {
    match command {
        RagdollCommands::Build { scale, flipped, json } => execute_build(scale, flipped, json),
        RagdollCommands::Simulate {
            steps,
            scale,
            push,
            rate,
        } => execute_simulate(steps, scale, push, rate),
    }
}

/// Ragdoll of a character standing still at the origin
fn rest_pose_ragdoll(scale: f32, flipped: bool) -> Result<Ragdoll> {
    if !scale.is_finite() || scale <= 0.0 {
        anyhow::bail!("Character scale must be positive, got {}", scale);
    }
    let stats = CharacterStats {
        scale,
        ..Default::default()
    };
    let mut character = Character::new("rest", stats, Vec2::ZERO);
    let facing = if flipped { -1000.0 } else { 1000.0 };
    character.aim_target = character.aim_origin() + Vec2::new(facing, 0.0);
    for _ in 0..SETTLE_FRAMES {
        character.update(FRAME, 0.0);
    }

    let seed = character.positioning.ragdoll_seed(RAGDOLL_MEASURE_INTERVAL);
    build_ragdoll(&seed).with_context(|| format!("Failed to build ragdoll at scale {scale}"))
}

fn node_names(nodes: &RagdollNodes) -> [(NodeId, &'static str); 9] {
    [
        (nodes.head_back, "head_back"),
        (nodes.head_top, "head_top"),
        (nodes.nose, "nose"),
        (nodes.neck, "neck"),
        (nodes.body_back, "body_back"),
        (nodes.body_front, "body_front"),
        (nodes.bottom, "bottom"),
        (nodes.hands[0], "first_hand"),
        (nodes.hands[1], "second_hand"),
    ]
}

fn name_of(nodes: &RagdollNodes, id: NodeId) -> String {
    node_names(nodes)
        .into_iter()
        .find(|(node, _)| *node == id)
        .map_or_else(|| format!("#{}", id.0), |(_, name)| name.to_string())
}

fn print_nodes(ragdoll: &Ragdoll) -> Result<()> {
    let mut table = create_table(&["Node", "Position", "Velocity", "Radius", "Mass"]);
    for (id, name) in node_names(&ragdoll.nodes) {
        let node = ragdoll.graph.node(id)?;
        add_table_row(
            &mut table,
            [
                name.to_string(),
                fmt_vec2(node.position),
                fmt_vec2(node.velocity()),
                fmt_f32(node.radius),
                fmt_f32(node.mass),
            ],
        );
    }
    table.printstd();
    Ok(())
}

fn execute_build(scale: f32, flipped: bool, json: bool) -> Result<()> {
    let ragdoll = rest_pose_ragdoll(scale, flipped)?;
    log::info!(
        "Built ragdoll with {} nodes and {} links",
        ragdoll.graph.nodes.len(),
        ragdoll.graph.links.len()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&ragdoll)?);
        return Ok(());
    }

    println!("{}", "Nodes".bold());
    print_nodes(&ragdoll)?;

    println!();
    println!("{}", "Links".bold());
    let mut table = create_table(&["From", "To", "Mode", "Distance"]);
    for link in &ragdoll.graph.links {
        add_table_row(
            &mut table,
            [
                name_of(&ragdoll.nodes, link.a),
                name_of(&ragdoll.nodes, link.b),
                format!("{:?}", link.mode),
                fmt_f32(link.target_distance),
            ],
        );
    }
    table.printstd();

    println!();
    println!("{}", "Driven limbs".bold());
    let mut table = create_table(&["Limb", "Up", "Center", "Rotational offset"]);
    for link in &ragdoll.graph.transform_links {
        add_table_row(
            &mut table,
            [
                format!("{:?}", link.limb),
                name_of(&ragdoll.nodes, link.up),
                name_of(&ragdoll.nodes, link.center),
                fmt_f32(link.rotational_offset),
            ],
        );
    }
    table.printstd();
    Ok(())
}

fn execute_simulate(steps: usize, scale: f32, push: f32, rate: f32) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        anyhow::bail!("Verlet rate must be positive, got {}", rate);
    }
    let mut ragdoll = rest_pose_ragdoll(scale, false)?;
    for node in &mut ragdoll.graph.nodes {
        node.acceleration.x += push;
    }

    let mut solver = VerletSolver::new(VerletSettings {
        rate,
        ..Default::default()
    });
    let ground = FlatGround { height: 0.0 };
    let start = ragdoll.graph.center_of_mass();
    let mut cycles = 0;
    for step in 0..steps {
        cycles += solver.step_ragdoll(&mut ragdoll, FRAME, &ground)?;
        log::debug!("Step {}: center of mass {}", step, fmt_vec2(ragdoll.graph.center_of_mass()));
    }

    println!(
        "Simulated {} frames ({} verlet cycles), center of mass {} -> {}",
        steps,
        cycles,
        fmt_vec2(start),
        fmt_vec2(ragdoll.graph.center_of_mass())
    );
    print_nodes(&ragdoll)
}
