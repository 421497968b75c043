//! Verlet ragdolls for 2D limb-animated characters
//!
//! A ragdoll replaces animated control of a character once it stops being
//! driven by gameplay. [`build_ragdoll`] turns the last known limb transforms
//! into a graph of point masses and distance links; [`VerletSolver`] simulates
//! it at a fixed rate and moves the limbs along with their nodes.
//!
//! # Example
//!
//! ```rust
//! use brawl_ragdoll::{LimbSeed, LimbTransform, NoCollision, RagdollSeed, VerletSolver, build_ragdoll};
//! use glam::Vec2;
//!
//! let limb = |x: f32, y: f32, size: f32| {
//!     LimbSeed::at_rest(LimbTransform::new(Vec2::new(x, y), 0.0, Vec2::splat(size)))
//! };
//! let seed = RagdollSeed {
//!     scale: 1.0,
//!     flipped: false,
//!     head: limb(0.0, 180.0, 160.0),
//!     body: limb(0.0, 0.0, 300.0),
//!     hands: [limb(100.0, 0.0, 60.0), limb(-100.0, 0.0, 60.0)],
//!     measure_interval: 1.0 / 30.0,
//! };
//!
//! let mut ragdoll = build_ragdoll(&seed)?;
//! let mut solver = VerletSolver::default();
//! solver.step_ragdoll(&mut ragdoll, 1.0 / 60.0, &NoCollision)?;
//! assert!(ragdoll.limbs.body.position.y < 0.0);
//! # Ok::<(), brawl_ragdoll::RagdollError>(())
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod solver;

pub use builder::{LimbSeed, Ragdoll, RagdollLimbs, RagdollNodes, RagdollSeed, build_ragdoll};
pub use error::{RagdollError, Result};
pub use graph::{DrivenLimb, LimbTransform, LinkMode, NodeId, RagdollGraph, TransformLink, VerletLink, VerletNode};
pub use solver::{CollisionSurface, FlatGround, NoCollision, SurfaceHit, VerletSettings, VerletSolver};
