//! Construction of the default character ragdoll
//!
//! The ragdoll is a fixed topology of nine nodes: a skull triangle, a neck, two
//! body sides, a bottom, and one node per hand. Node seeds are limb-local points
//! pushed through the limb's world transform, so the whole graph scales with the
//! character.

use glam::Vec2;

use crate::error::{RagdollError, Result};
use crate::graph::{DrivenLimb, LimbTransform, LinkMode, NodeId, RagdollGraph, VerletNode};

/// Radius of skull and body side nodes, before scaling
pub const JOINT_RADIUS: f32 = 17.0;
pub const NECK_RADIUS: f32 = 60.0;
pub const BOTTOM_RADIUS: f32 = 70.0;
pub const HAND_RADIUS: f32 = 25.0;
/// Longest reach of a hand from the neck, before scaling
pub const MAX_HAND_REACH: f32 = 280.0;
/// Impact offsets are converted to at most this much initial acceleration
pub const MAX_IMPACT_ACCELERATION: f32 = 25.0;
const IMPACT_GAIN: f32 = 2.9;
const MEASURED_VELOCITY_GAIN: f32 = 0.2;

/// Last known state of one limb
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct LimbSeed {
    pub transform: LimbTransform,
    /// Translation measured over the last velocity sample
    pub measured_delta: Vec2,
    /// Pending visual impact offset
    pub impact_offset: Vec2,
}

impl LimbSeed {
    pub fn at_rest(transform: LimbTransform) -> Self {
        Self {
            transform,
            measured_delta: Vec2::ZERO,
            impact_offset: Vec2::ZERO,
        }
    }
}

/// Everything needed to turn a character into a ragdoll
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct RagdollSeed {
    pub scale: f32,
    pub flipped: bool,
    pub head: LimbSeed,
    pub body: LimbSeed,
    pub hands: [LimbSeed; 2],
    /// Interval in seconds between velocity measurements
    pub measure_interval: f32,
}

/// Handles to the named nodes of a built ragdoll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct RagdollNodes {
    pub head_back: NodeId,
    pub head_top: NodeId,
    pub nose: NodeId,
    pub neck: NodeId,
    pub body_back: NodeId,
    pub body_front: NodeId,
    pub bottom: NodeId,
    pub hands: [NodeId; 2],
}

/// Limb transforms driven by the ragdoll
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct RagdollLimbs {
    pub head: LimbTransform,
    pub body: LimbTransform,
    pub hands: [LimbTransform; 2],
}

impl RagdollLimbs {
    pub fn get(&self, limb: DrivenLimb) -> Option<&LimbTransform> {
        match limb {
            DrivenLimb::Head => Some(&self.head),
            DrivenLimb::Body => Some(&self.body),
            DrivenLimb::Hand(i) => self.hands.get(i),
        }
    }

    pub fn get_mut(&mut self, limb: DrivenLimb) -> Option<&mut LimbTransform> {
        match limb {
            DrivenLimb::Head => Some(&mut self.head),
            DrivenLimb::Body => Some(&mut self.body),
            DrivenLimb::Hand(i) => self.hands.get_mut(i),
        }
    }
}

/// A built ragdoll graph with its named nodes and driven limbs
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Ragdoll {
    pub graph: RagdollGraph,
    pub nodes: RagdollNodes,
    pub limbs: RagdollLimbs,
}

fn seed_node(limb: &LimbSeed, local: Vec2, radius: f32, mass: f32, measure_interval: f32) -> VerletNode {
    let mut node = VerletNode::new(limb.transform.local_to_world(local), radius, mass);
    node.friction = 1.0;

    node.acceleration += limb.impact_offset * IMPACT_GAIN;
    node.acceleration = node.acceleration.clamp_length_max(MAX_IMPACT_ACCELERATION);
    node.acceleration += limb.measured_delta * measure_interval * MEASURED_VELOCITY_GAIN;
    node
}

/// Build the default ragdoll for a character pose
pub fn build_ragdoll(seed: &RagdollSeed) -> Result<Ragdoll> {
    let scale = seed.scale;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RagdollError::InvalidScale(scale));
    }
    let fl = if seed.flipped { -1.0 } else { 1.0 };
    let interval = seed.measure_interval;
    let mut graph = RagdollGraph::new();

    let joint = JOINT_RADIUS * scale;
    let head_back = graph.add_node(seed_node(&seed.head, Vec2::new(-0.25 * fl, -0.35), joint, 1.0, interval));
    let head_top = graph.add_node(seed_node(&seed.head, Vec2::new(-0.25 * fl, 0.3), joint, 1.0, interval));
    let nose = graph.add_node(seed_node(&seed.head, Vec2::new(0.4 * fl, 0.0), joint, 1.0, interval));
    graph.drive_limb(DrivenLimb::Head, &seed.head.transform, head_top, head_back)?;

    // Skull triangle
    graph.link(head_back, head_top, LinkMode::KeepDistance)?;
    graph.link(head_top, nose, LinkMode::KeepDistance)?;
    graph.link(nose, head_back, LinkMode::KeepDistance)?;

    let neck = graph.add_node(seed_node(&seed.body, Vec2::new(0.0, 0.3), NECK_RADIUS * scale, 2.0, interval));
    let body_back = graph.add_node(seed_node(&seed.body, Vec2::new(-0.25 * fl, 0.0), joint, 1.0, interval));
    let body_front = graph.add_node(seed_node(&seed.body, Vec2::new(0.3 * fl, 0.0), joint, 1.0, interval));
    let bottom = graph.add_node(seed_node(&seed.body, Vec2::new(0.0, -0.32), BOTTOM_RADIUS * scale, 5.0, interval));
    graph.drive_limb(DrivenLimb::Body, &seed.body.transform, neck, bottom)?;

    // Head to neck
    graph.link(neck, head_top, LinkMode::KeepDistance)?;
    graph.link(neck, nose, LinkMode::KeepDistance)?;
    graph.link(head_back, neck, LinkMode::MaxDistanceOnly)?;

    // Keep the head from folding into the torso
    graph.link(
        body_front,
        nose,
        LinkMode::MinMax {
            min: 107.0 * scale,
            max: 260.0 * scale,
        },
    )?;
    graph.link(
        bottom,
        nose,
        LinkMode::MinMax {
            min: 300.0 * scale,
            max: 400.0 * scale,
        },
    )?;
    graph.link_with_distance(bottom, nose, LinkMode::MinDistanceOnly, 230.0 * scale)?;
    graph.link_with_distance(body_back, head_top, LinkMode::MinDistanceOnly, 190.0 * scale)?;

    // Torso
    graph.link(body_back, body_front, LinkMode::KeepDistance)?;
    graph.link(body_back, neck, LinkMode::KeepDistance)?;
    graph.link(body_front, neck, LinkMode::KeepDistance)?;
    graph.link(body_back, bottom, LinkMode::KeepDistance)?;
    graph.link(neck, bottom, LinkMode::KeepDistance)?;
    graph.link(body_front, bottom, LinkMode::KeepDistance)?;

    let mut hands = [NodeId(0); 2];
    for (i, hand) in seed.hands.iter().enumerate() {
        hands[i] = graph.add_node(seed_node(hand, Vec2::ZERO, HAND_RADIUS * scale, 1.0, interval));
        graph
            .drive_limb(DrivenLimb::Hand(i), &hand.transform, neck, hands[i])?
            .rotational_offset = -90.0;
    }
    for hand in hands {
        graph.link_with_distance(hand, neck, LinkMode::MaxDistanceOnly, MAX_HAND_REACH * scale)?;
    }

    log::debug!(
        "Built ragdoll with {} nodes and {} links at scale {}",
        graph.nodes.len(),
        graph.links.len(),
        scale
    );

    Ok(Ragdoll {
        graph,
        nodes: RagdollNodes {
            head_back,
            head_top,
            nose,
            neck,
            body_back,
            body_front,
            bottom,
            hands,
        },
        limbs: RagdollLimbs {
            head: seed.head.transform,
            body: seed.body.transform,
            hands: [seed.hands[0].transform, seed.hands[1].transform],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(scale: f32, flipped: bool) -> RagdollSeed {
        let limb = |position: Vec2, size: Vec2| LimbSeed::at_rest(LimbTransform::new(position * scale, 0.0, size * scale));
        RagdollSeed {
            scale,
            flipped,
            head: limb(Vec2::new(0.0, 180.0), Vec2::new(160.0, 160.0)),
            body: limb(Vec2::ZERO, Vec2::new(192.0, 356.0)),
            hands: [
                limb(Vec2::new(120.0, 20.0), Vec2::new(60.0, 60.0)),
                limb(Vec2::new(-80.0, 10.0), Vec2::new(60.0, 60.0)),
            ],
            measure_interval: 1.0 / 30.0,
        }
    }

    #[test]
    fn test_topology() {
        let ragdoll = build_ragdoll(&seed(1.0, false)).unwrap();
        assert_eq!(ragdoll.graph.nodes.len(), 9);
        assert_eq!(ragdoll.graph.links.len(), 18);
        assert_eq!(ragdoll.graph.transform_links.len(), 4);

        let neck = ragdoll.graph.node(ragdoll.nodes.neck).unwrap();
        assert!((neck.mass - 2.0).abs() < 0.001);
        assert!((neck.radius - NECK_RADIUS).abs() < 0.001);
        let bottom = ragdoll.graph.node(ragdoll.nodes.bottom).unwrap();
        assert!((bottom.mass - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_flip_mirrors_nose() {
        let right = build_ragdoll(&seed(1.0, false)).unwrap();
        let left = build_ragdoll(&seed(1.0, true)).unwrap();
        let nose_r = right.graph.node(right.nodes.nose).unwrap().position;
        let nose_l = left.graph.node(left.nodes.nose).unwrap().position;
        assert!((nose_r.x - 64.0).abs() < 0.001);
        assert!((nose_l.x + 64.0).abs() < 0.001);
    }

    #[test]
    fn test_impact_acceleration_is_clamped() {
        let mut s = seed(1.0, false);
        s.head.impact_offset = Vec2::new(1000.0, 0.0);
        let ragdoll = build_ragdoll(&s).unwrap();
        let head = ragdoll.graph.node(ragdoll.nodes.nose).unwrap();
        assert!((head.acceleration.length() - MAX_IMPACT_ACCELERATION).abs() < 0.001);

        s.head.impact_offset = Vec2::new(1.0, 0.0);
        let ragdoll = build_ragdoll(&s).unwrap();
        let head = ragdoll.graph.node(ragdoll.nodes.nose).unwrap();
        assert!((head.acceleration.x - 2.9).abs() < 0.001);
    }

    #[test]
    fn test_measured_velocity_adds_acceleration() {
        let mut s = seed(1.0, false);
        s.hands[0].measured_delta = Vec2::new(300.0, 0.0);
        let ragdoll = build_ragdoll(&s).unwrap();
        let hand = ragdoll.graph.node(ragdoll.nodes.hands[0]).unwrap();
        assert!((hand.acceleration.x - 300.0 / 30.0 * 0.2).abs() < 0.001);
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert_eq!(build_ragdoll(&seed(0.0, false)), Err(RagdollError::InvalidScale(0.0)));
    }
}
