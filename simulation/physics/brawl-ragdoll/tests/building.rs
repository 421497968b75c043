//! Integration tests for ragdoll construction and simulation

use brawl_ragdoll::{
    FlatGround, LimbSeed, LimbTransform, LinkMode, NoCollision, RagdollError, RagdollSeed,
    VerletSolver, build_ragdoll,
};
use glam::Vec2;
use proptest::prelude::*;
use test_case::test_case;

fn seed(scale: f32, flipped: bool) -> RagdollSeed {
    let limb = |position: Vec2, size: Vec2| {
        LimbSeed::at_rest(LimbTransform::new(position * scale, 0.0, size * scale))
    };
    RagdollSeed {
        scale,
        flipped,
        head: limb(Vec2::new(20.0, 190.0), Vec2::new(160.0, 160.0)),
        body: limb(Vec2::ZERO, Vec2::new(192.0, 356.0)),
        hands: [
            limb(Vec2::new(130.0, 30.0), Vec2::new(60.0, 60.0)),
            limb(Vec2::new(-90.0, 10.0), Vec2::new(60.0, 60.0)),
        ],
        measure_interval: 1.0 / 30.0,
    }
}

#[test_case(0.0 ; "zero")]
#[test_case(-1.0 ; "negative")]
#[test_case(f32::NAN ; "nan")]
fn test_invalid_scale(scale: f32) {
    let err = build_ragdoll(&seed(scale, false)).unwrap_err();
    assert!(matches!(err, RagdollError::InvalidScale(_)));
}

#[test]
fn test_every_link_starts_satisfied_or_bounded() {
    let ragdoll = build_ragdoll(&seed(1.0, false)).unwrap();
    for link in &ragdoll.graph.links {
        let a = ragdoll.graph.node(link.a).unwrap().position;
        let b = ragdoll.graph.node(link.b).unwrap().position;
        if link.mode == LinkMode::KeepDistance {
            assert!((a.distance(b) - link.target_distance).abs() < 0.001);
        }
    }
}

#[test]
fn test_ragdoll_falls_onto_ground() {
    let mut ragdoll = build_ragdoll(&seed(1.0, false)).unwrap();
    let mut solver = VerletSolver::default();
    let ground = FlatGround { height: -400.0 };

    let start = ragdoll.graph.center_of_mass();
    for _ in 0..300 {
        solver.step_ragdoll(&mut ragdoll, 1.0 / 60.0, &ground).unwrap();
    }
    let end = ragdoll.graph.center_of_mass();

    assert!(end.y < start.y);
    for node in &ragdoll.graph.nodes {
        assert!(node.position.y > -400.0 - 2.0 * node.radius, "node sank to {}", node.position.y);
        assert!(node.position.is_finite());
    }
}

#[test]
fn test_limbs_follow_nodes() {
    let mut ragdoll = build_ragdoll(&seed(1.0, false)).unwrap();
    let mut solver = VerletSolver::default();
    let start = ragdoll.limbs.head.position;
    for _ in 0..30 {
        solver.step_ragdoll(&mut ragdoll, 1.0 / 60.0, &NoCollision).unwrap();
    }
    assert!(ragdoll.limbs.head.position.y < start.y);
}

proptest! {
    #[test]
    fn prop_geometry_scales_with_character(scale in 0.25f32..4.0, flipped in any::<bool>()) {
        let unit = build_ragdoll(&seed(1.0, flipped)).unwrap();
        let scaled = build_ragdoll(&seed(scale, flipped)).unwrap();

        prop_assert_eq!(unit.graph.nodes.len(), scaled.graph.nodes.len());
        prop_assert_eq!(unit.graph.links.len(), scaled.graph.links.len());

        for (u, s) in unit.graph.nodes.iter().zip(&scaled.graph.nodes) {
            prop_assert!((u.position * scale - s.position).length() < 0.01 * scale.max(1.0));
            prop_assert!((u.radius * scale - s.radius).abs() < 0.001 * scale.max(1.0));
            prop_assert!((u.mass - s.mass).abs() < f32::EPSILON);
        }
        for (u, s) in unit.graph.links.iter().zip(&scaled.graph.links) {
            prop_assert!((u.target_distance * scale - s.target_distance).abs() < 0.01 * scale.max(1.0));
        }
    }
}
