//! Point-mass nodes, distance links and transform links

use brawl_anim::math::{rotate_point, vector_to_angle};
use glam::Vec2;

use crate::error::{RagdollError, Result};

/// Index of a node within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

/// A simulated point mass
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct VerletNode {
    pub position: Vec2,
    pub previous_position: Vec2,
    /// Consumed and cleared by the next integration step
    pub acceleration: Vec2,
    pub previous_velocity: Vec2,
    /// Resistance to sliding when pushed out of geometry, `0..=1`
    pub friction: f32,
    pub radius: f32,
    pub mass: f32,
}

impl VerletNode {
    pub fn new(position: Vec2, radius: f32, mass: f32) -> Self {
        Self {
            position,
            previous_position: position,
            acceleration: Vec2::ZERO,
            previous_velocity: Vec2::ZERO,
            friction: 0.0,
            radius,
            mass,
        }
    }

    /// Displacement over the last step
    pub fn velocity(&self) -> Vec2 {
        self.position - self.previous_position
    }
}

/// How a link constrains the distance between its nodes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkMode {
    /// Always pulled towards the target distance
    KeepDistance,
    /// Only corrected when further apart than the target
    MaxDistanceOnly,
    /// Only corrected when closer than the target
    MinDistanceOnly,
    /// Kept within `[min, max]`
    MinMax { min: f32, max: f32 },
}

/// A distance constraint between two nodes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct VerletLink {
    pub a: NodeId,
    pub b: NodeId,
    pub mode: LinkMode,
    pub target_distance: f32,
}

impl VerletLink {
    /// Distance the solver will pull towards, or `None` if `distance` satisfies
    /// the link as-is
    pub fn correction_target(&self, distance: f32) -> Option<f32> {
        match self.mode {
            LinkMode::KeepDistance => Some(self.target_distance),
            LinkMode::MaxDistanceOnly => (distance > self.target_distance).then_some(self.target_distance),
            LinkMode::MinDistanceOnly => (distance <= self.target_distance).then_some(self.target_distance),
            LinkMode::MinMax { min, max } => {
                if distance > min && distance < max {
                    None
                } else if distance < min {
                    Some(min)
                } else {
                    Some(max)
                }
            }
        }
    }
}

/// World transform of a rigid limb
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct LimbTransform {
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    /// Absolute size of the limb
    pub size: Vec2,
}

impl LimbTransform {
    pub fn new(position: Vec2, rotation: f32, size: Vec2) -> Self {
        Self {
            position,
            rotation,
            size,
        }
    }

    /// Map a point in limb-local units into world space
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        rotate_point(local * self.size, self.rotation, Vec2::ZERO) + self.position
    }
}

/// Which limb a transform link drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum DrivenLimb {
    Head,
    Body,
    Hand(usize),
}

/// Drives a limb transform from a pair of nodes
///
/// The limb's rotation follows the direction perpendicular to `center -> up`,
/// and its position keeps the offset from `center` it had when the link was made.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformLink {
    pub limb: DrivenLimb,
    pub up: NodeId,
    pub center: NodeId,
    /// Offset from the center node, in the limb's rotated frame
    pub local_offset: Vec2,
    /// Degrees added to the node-derived angle
    pub rotational_offset: f32,
}

fn right_angle(up: Vec2, center: Vec2) -> f32 {
    let up_vector = (up - center).normalize_or(Vec2::Y);
    vector_to_angle(Vec2::new(up_vector.y, -up_vector.x))
}

/// Constraint graph replacing animated control of a character
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct RagdollGraph {
    pub nodes: Vec<VerletNode>,
    pub links: Vec<VerletLink>,
    pub transform_links: Vec<TransformLink>,
}

impl RagdollGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: VerletNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Result<&VerletNode> {
        self.nodes.get(id.0).ok_or(RagdollError::UnknownNode {
            index: id.0,
            count: self.nodes.len(),
        })
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut VerletNode> {
        let count = self.nodes.len();
        self.nodes
            .get_mut(id.0)
            .ok_or(RagdollError::UnknownNode { index: id.0, count })
    }

    /// Link two nodes; the target distance is their current separation
    pub fn link(&mut self, a: NodeId, b: NodeId, mode: LinkMode) -> Result<&mut VerletLink> {
        if a == b {
            return Err(RagdollError::SelfLink(a.0));
        }
        let target_distance = self.node(a)?.position.distance(self.node(b)?.position);
        self.links.push(VerletLink {
            a,
            b,
            mode,
            target_distance,
        });
        let index = self.links.len() - 1;
        Ok(&mut self.links[index])
    }

    /// Link two nodes with an explicit target distance
    pub fn link_with_distance(&mut self, a: NodeId, b: NodeId, mode: LinkMode, distance: f32) -> Result<()> {
        self.link(a, b, mode)?.target_distance = distance;
        Ok(())
    }

    /// Attach a limb to a node pair, preserving its current offset and angle
    pub fn drive_limb(
        &mut self,
        limb: DrivenLimb,
        transform: &LimbTransform,
        up: NodeId,
        center: NodeId,
    ) -> Result<&mut TransformLink> {
        let up_position = self.node(up)?.position;
        let center_position = self.node(center)?.position;
        let angle = right_angle(up_position, center_position);

        self.transform_links.push(TransformLink {
            limb,
            up,
            center,
            local_offset: rotate_point(transform.position - center_position, -transform.rotation, Vec2::ZERO),
            rotational_offset: transform.rotation - angle,
        });
        let index = self.transform_links.len() - 1;
        Ok(&mut self.transform_links[index])
    }

    /// Target transform for a driven limb given the current node positions
    pub fn limb_target(&self, link: &TransformLink) -> Result<(Vec2, f32)> {
        let center = self.node(link.center)?.position;
        let up = self.node(link.up)?.position;
        let rotation = link.rotational_offset + right_angle(up, center);
        let position = center + rotate_point(link.local_offset, rotation, Vec2::ZERO);
        Ok((position, rotation))
    }

    /// Centroid of all nodes
    pub fn center_of_mass(&self) -> Vec2 {
        let total: f32 = self.nodes.iter().map(|n| n.mass).sum();
        if total <= 0.0 {
            return Vec2::ZERO;
        }
        self.nodes
            .iter()
            .map(|n| n.position * n.mass)
            .sum::<Vec2>()
            / total
    }
}
