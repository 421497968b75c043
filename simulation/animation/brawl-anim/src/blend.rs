//! Pose sampling and two-slot blending
//!
//! [`sample`] turns one playing instance into an [`AnimationResult`] for a given
//! character context. [`blend`] mixes a fading-out result into the current one:
//! transforms interpolate, grip looks snap at the midpoint.

use glam::Vec2;

use crate::clip::HandLook;
use crate::math::{Lerp, easing, lerp_angle, rotate_point, vector_to_angle};
use crate::playback::ActiveAnimation;

/// Character state the sampled pose depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendContext {
    pub flipped: bool,
    /// Physical scale of the character
    pub scale: f32,
    /// Normalized aim direction
    pub aim_direction: Vec2,
    /// World-space center of the character
    pub center: Vec2,
    /// Resting pose offsets of the two hands, indexed by hand slot
    pub hand_pose_positions: [Vec2; 2],
}

impl BlendContext {
    /// `-1` when mirrored, `1` otherwise
    pub fn flip_scaling(&self) -> f32 {
        if self.flipped { -1.0 } else { 1.0 }
    }

    /// Hand slot driven by the animation's hand at `animation_index`
    pub fn hand_slot(&self, animation_index: usize) -> usize {
        if self.flipped {
            1 - animation_index
        } else {
            animation_index
        }
    }
}

impl Default for BlendContext {
    fn default() -> Self {
        Self {
            flipped: false,
            scale: 1.0,
            aim_direction: Vec2::X,
            center: Vec2::ZERO,
            hand_pose_positions: [Vec2::ZERO; 2],
        }
    }
}

/// Transform of one limb
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct LimbPose {
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for LimbPose {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl LimbPose {
    fn blend(&self, to: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(to.position, t),
            rotation: lerp_angle(self.rotation, to.rotation, t),
            scale: self.scale.lerp(to.scale, t),
        }
    }
}

/// Pose of one hand plus its animated grip look
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct HandResult {
    pub pose: LimbPose,
    pub look: Option<HandLook>,
}

/// Final animated pose of a character
///
/// Head and body are limb-local offsets. Hand positions are in world space.
/// Hands are in animation order; use [`BlendContext::hand_slot`] to map them onto
/// the character's hands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationResult {
    pub head: LimbPose,
    pub body: LimbPose,
    pub hands: [HandResult; 2],
}

/// Compute the raw pose of a single playing animation
pub fn sample(active: &ActiveAnimation, ctx: &BlendContext) -> AnimationResult {
    let flip = ctx.flip_scaling();
    let animation = active.animation();

    let mut result = AnimationResult {
        head: LimbPose {
            position: active.head_position() * Vec2::new(flip, 1.0),
            rotation: active.head_rotation() * flip,
            scale: active.head_scale(),
        },
        body: LimbPose {
            position: active.body_position() * Vec2::new(flip, 1.0),
            rotation: active.body_rotation() * flip,
            scale: active.body_scale(),
        },
        hands: [HandResult::default(); 2],
    };

    let Some(hands) = animation.hands.as_ref() else {
        return result;
    };

    for (index, hand) in hands.iter().enumerate() {
        let slot = ctx.hand_slot(index);
        let limb = &hand.limb;
        let out = &mut result.hands[index];

        if let Some(translation) = &limb.translation {
            let mut position = active.hand_position(index) * Vec2::new(flip, 1.0);
            position = position * ctx.scale + ctx.center;

            let pose_position = ctx.hand_pose_positions[slot];
            if animation.relative_hand_position {
                let origin = translation.evaluate(0.0).unwrap_or(Vec2::ZERO) * Vec2::new(flip, 1.0);
                position += pose_position - origin;
            }

            if limb.adjust_for_aim {
                let pivot = pose_position + ctx.center;
                let aim = if ctx.flipped {
                    -ctx.aim_direction
                } else {
                    ctx.aim_direction
                };
                position = rotate_point(position, vector_to_angle(aim), pivot);
            }
            out.pose.position = position;
        }

        let aim_offset = if limb.adjust_for_aim {
            vector_to_angle(ctx.aim_direction * flip)
        } else {
            0.0
        };
        out.pose.rotation = aim_offset + active.hand_rotation(index) * flip;
        out.pose.scale = active.hand_scale(index);

        if hand.has_looks() {
            out.look = active.hand_look(index);
        }
    }

    result
}

/// Blend from `previous` into `current` at the given mix progress
///
/// The factor is `quad_in_out(mix_progress)`. Grip looks do not interpolate: the
/// previous look holds while the factor is below one half.
pub fn blend(previous: &AnimationResult, current: &AnimationResult, mix_progress: f32) -> AnimationResult {
    let mix = easing::quad_in_out(mix_progress);

    let mut hands = current.hands;
    for (out, prev) in hands.iter_mut().zip(previous.hands.iter()) {
        out.pose = prev.pose.blend(&out.pose, mix);
        out.look = if mix < 0.5 { prev.look } else { out.look };
    }

    AnimationResult {
        head: previous.head.blend(&current.head, mix),
        body: previous.body.blend(&current.body, mix),
        hands,
    }
}

/// Pose of a list of playing animations, newest last
///
/// Returns `None` when nothing is playing. With a single animation, or once the
/// mix has completed, this is exactly the newest animation's raw pose.
pub fn mixed(animations: &[ActiveAnimation], mix_progress: f32, ctx: &BlendContext) -> Option<AnimationResult> {
    let (current, rest) = animations.split_last()?;
    let result = sample(current, ctx);

    match rest.last() {
        Some(previous) if mix_progress < 1.0 => Some(blend(&sample(previous, ctx), &result, mix_progress)),
        _ => Some(result),
    }
}
