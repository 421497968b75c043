//! Fixed-rate Verlet integration
//!
//! Each step runs a whole number of cycles at [`VerletSettings::rate`]. A cycle
//! integrates every node, then relaxes every link once. Driven limbs follow their
//! node pairs after the cycles, smoothed over the frame time.

use brawl_anim::math::{smooth_angle_approach, smooth_approach_vec};
use glam::Vec2;

use crate::builder::Ragdoll;
use crate::error::Result;
use crate::graph::{RagdollGraph, VerletLink, VerletNode};

/// Speed at which driven limbs chase their node-derived transform
pub const LIMB_FOLLOW_SPEED: f32 = 35.0;
/// Maximum number of half-unit pushes when resolving an overlap
const MAX_DEPENETRATION_ITERATIONS: usize = 100;
const DEPENETRATION_STEP: f32 = 0.5;
/// Fraction of velocity kept after bouncing off a surface
const BOUNCE_RETENTION: f32 = 0.9;

/// Integration settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct VerletSettings {
    /// Cycles per second
    pub rate: f32,
    pub gravity: Vec2,
    /// Fraction of a link's error corrected per cycle
    pub stiffness: f32,
    /// Upper bound on cycles per step
    pub max_cycles: u32,
}

impl Default for VerletSettings {
    fn default() -> Self {
        Self {
            rate: 200.0,
            gravity: Vec2::new(0.0, -20.0),
            stiffness: 0.45,
            max_cycles: 256,
        }
    }
}

/// Contact with level geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Closest point on the surface
    pub point: Vec2,
    /// Unit normal pointing away from the surface
    pub normal: Vec2,
}

/// Level geometry that ragdoll nodes collide with
pub trait CollisionSurface {
    /// First surface crossed travelling from `from` to `to`
    fn raycast(&self, from: Vec2, to: Vec2) -> Option<SurfaceHit>;

    /// Surface overlapping the circle, if any
    fn overlap(&self, center: Vec2, radius: f32) -> Option<SurfaceHit>;
}

/// Empty space
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCollision;

impl CollisionSurface for NoCollision {
    fn raycast(&self, _from: Vec2, _to: Vec2) -> Option<SurfaceHit> {
        None
    }

    fn overlap(&self, _center: Vec2, _radius: f32) -> Option<SurfaceHit> {
        None
    }
}

/// An infinite horizontal floor; everything below `height` is solid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatGround {
    pub height: f32,
}

impl CollisionSurface for FlatGround {
    fn raycast(&self, from: Vec2, to: Vec2) -> Option<SurfaceHit> {
        if from.y < self.height || to.y >= self.height {
            return None;
        }
        let t = (from.y - self.height) / (from.y - to.y);
        Some(SurfaceHit {
            point: Vec2::new(from.x + (to.x - from.x) * t, self.height),
            normal: Vec2::Y,
        })
    }

    fn overlap(&self, center: Vec2, radius: f32) -> Option<SurfaceHit> {
        (center.y - radius < self.height).then_some(SurfaceHit {
            point: Vec2::new(center.x, self.height),
            normal: Vec2::Y,
        })
    }
}

fn project_on_plane(v: Vec2, normal: Vec2) -> Vec2 {
    v - normal * v.dot(normal)
}

/// Accumulates frame time and runs fixed-rate cycles
#[derive(Debug, Clone, Default)]
pub struct VerletSolver {
    pub settings: VerletSettings,
    accumulator: f32,
}

impl VerletSolver {
    pub fn new(settings: VerletSettings) -> Self {
        Self {
            settings,
            accumulator: 0.0,
        }
    }

    fn interval(&self) -> f32 {
        1.0 / self.settings.rate
    }

    /// Number of whole cycles due after adding `dt`
    fn take_cycles(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let interval = self.interval();
        let due = (self.accumulator / interval).floor();
        self.accumulator -= due * interval;
        let cycles = due.clamp(0.0, self.settings.max_cycles as f32) as u32;
        if due > cycles as f32 {
            log::trace!("Dropping {} verlet cycles over the limit", due - cycles as f32);
        }
        cycles
    }

    /// Advance the graph by `dt`, returning the number of cycles run
    pub fn step(&mut self, graph: &mut RagdollGraph, dt: f32, surface: &impl CollisionSurface) -> u32 {
        let cycles = self.take_cycles(dt);
        for _ in 0..cycles {
            for node in &mut graph.nodes {
                self.solve_motion(node, surface);
            }
            for i in 0..graph.links.len() {
                let link = graph.links[i];
                self.solve_link(&mut graph.nodes, &link);
            }
        }
        cycles
    }

    /// Advance a ragdoll and move its driven limbs towards their targets
    pub fn step_ragdoll(&mut self, ragdoll: &mut Ragdoll, dt: f32, surface: &impl CollisionSurface) -> Result<u32> {
        let cycles = self.step(&mut ragdoll.graph, dt, surface);
        for link in &ragdoll.graph.transform_links {
            let (position, rotation) = ragdoll.graph.limb_target(link)?;
            if let Some(limb) = ragdoll.limbs.get_mut(link.limb) {
                limb.rotation = smooth_angle_approach(limb.rotation, rotation, LIMB_FOLLOW_SPEED, dt);
                limb.position = smooth_approach_vec(limb.position, position, LIMB_FOLLOW_SPEED, dt);
            }
        }
        Ok(cycles)
    }

    fn solve_motion(&self, node: &mut VerletNode, surface: &impl CollisionSurface) {
        let mut velocity = node.position - node.previous_position;
        node.previous_position = node.position;
        velocity += node.acceleration * 2.0 + self.settings.gravity * self.interval() * 3.0;

        let reach = velocity.length().max(node.radius);
        let probe = node.position + velocity.normalize_or_zero() * reach;

        if let Some(hit) = surface.raycast(node.position, probe) {
            velocity = project_on_plane(velocity, hit.normal);
            node.position = hit.point + hit.normal * node.radius;
            node.previous_position = node.position;
            node.position += velocity * BOUNCE_RETENTION;
        } else if let Some(mut hit) = surface.overlap(node.position + velocity, node.radius) {
            for _ in 0..MAX_DEPENETRATION_ITERATIONS {
                node.position += hit.normal * DEPENETRATION_STEP;
                match surface.overlap(node.position, node.radius) {
                    Some(next) => hit = next,
                    None => break,
                }
            }
            node.previous_position = node.position;
            velocity = project_on_plane(velocity, hit.normal);
            node.position += velocity * (1.0 - node.friction);
        } else {
            node.position += velocity;
        }

        node.acceleration = Vec2::ZERO;
        node.previous_velocity = velocity;
    }

    fn solve_link(&self, nodes: &mut [VerletNode], link: &VerletLink) {
        let (Some(a), Some(b)) = (nodes.get(link.a.0).copied(), nodes.get(link.b.0).copied()) else {
            return;
        };
        let distance = a.position.distance(b.position);
        let Some(target) = link.correction_target(distance) else {
            return;
        };

        let total_mass = a.mass + b.mass;
        let a_influence = if total_mass > 0.0 { b.mass / total_mass } else { 0.5 };
        let b_influence = 1.0 - a_influence;

        let midpoint = (a.position + b.position) * 0.5;
        let error = (distance - target) * self.settings.stiffness;

        nodes[link.a.0].position += (midpoint - a.position).normalize_or_zero() * error * a_influence;
        nodes[link.b.0].position += (midpoint - b.position).normalize_or_zero() * error * b_influence;
    }
}
