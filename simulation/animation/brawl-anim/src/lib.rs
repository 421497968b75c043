//! Keyframe animation playback for 2D limb-animated characters
//!
//! This crate provides the animation side of a character:
//! - Immutable animation assets with per-limb curves and grip look timelines
//! - Playing instances with their own timers and speed
//! - Gameplay constraints derived from the playing animations
//! - Two-slot blending between the current and the previous animation
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use brawl_anim::{
//!     AnimationConstraint, AnimationStack, BlendContext, CharacterAnimation, Curve,
//!     LimbAnimation,
//! };
//! use glam::Vec2;
//!
//! let walk = CharacterAnimation::new("walk", "locomotion")
//!     .with_body(
//!         LimbAnimation::new(1.0)
//!             .with_translation(Curve::from_pairs([(0.0, Vec2::ZERO), (1.0, Vec2::X * 10.0)])),
//!     )
//!     .with_constraint(0.0, AnimationConstraint::PREVENT_DODGE)
//!     .build()?;
//!
//! let mut stack = AnimationStack::default();
//! stack.play(Arc::new(walk), 1.0);
//! stack.advance(0.5);
//!
//! assert!(stack.constraints(AnimationConstraint::ALLOW_ALL).contains(AnimationConstraint::PREVENT_DODGE));
//! let pose = stack.mixed(&BlendContext::default());
//! assert!(pose.is_some());
//! # Ok::<(), brawl_anim::AnimationError>(())
//! ```

pub mod blend;
pub mod clip;
pub mod constraint;
pub mod curve;
pub mod error;
pub mod math;
pub mod playback;
pub mod registry;
pub mod stack;

pub use blend::{AnimationResult, BlendContext, HandResult, LimbPose, blend, mixed, sample};
pub use clip::{CharacterAnimation, HandLimbAnimation, HandLook, HandLookKey, LimbAnimation};
pub use constraint::{AnimationConstraint, ConstraintKeyframe, active_segment, aggregate_constraints};
pub use curve::{Curve, Key};
pub use error::{AnimationError, Result};
pub use math::{Angle, Lerp};
pub use playback::{ALMOST_OVER, ActiveAnimation, PlaybackId};
pub use registry::{AnimationLibrary, AnimationRegistry};
pub use stack::{AnimationStack, CompletedAnimation, DEFAULT_MIX_DURATION, MixSettings};
