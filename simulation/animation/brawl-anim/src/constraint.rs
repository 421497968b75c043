//! Gameplay constraints imposed by playing animations
//!
//! Every animation carries a chronologically sorted list of [`ConstraintKeyframe`]s.
//! A keyframe's flags are in force from its own time up to, but not including, the
//! next keyframe's time. The constraints of a character are the union of the active
//! segment of each playing animation plus a character-level override.

use bitflags::bitflags;

use crate::playback::ActiveAnimation;

bitflags! {
    /// Restrictions an animation places on the character playing it
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
    pub struct AnimationConstraint: u32 {
        const PREVENT_DYING = 1 << 0;
        const PREVENT_WALKING = 1 << 1;
        const PREVENT_AIMING = 1 << 2;
        const PREVENT_DODGE = 1 << 3;
        const PREVENT_SHOOTING = 1 << 4;
        const PREVENT_MELEE = 1 << 5;
        const PREVENT_BEING_SHOT = 1 << 6;
        const PREVENT_BEING_MELEED = 1 << 7;
        const PREVENT_RAGDOLL = 1 << 8;
        const PREVENT_WORLD_INTERACTION = 1 << 9;
        const PREVENT_THROWING = 1 << 10;
        /// Shared bit: iron sights and melee blocking are the same stance
        const PREVENT_IRON_SIGHT = 1 << 11;
        const PREVENT_BLOCK = 1 << 11;
        const PREVENT_MIX_TRANSITION = 1 << 12;
        const PREVENT_FLIP = 1 << 13;
        const FACE_FORWARDS = 1 << 14;
        const PREVENT_DEATH_ANIMATION = 1 << 15;

        const PREVENT_ALL_ATTACKING = Self::PREVENT_MELEE.bits()
            | Self::PREVENT_SHOOTING.bits()
            | Self::PREVENT_THROWING.bits();
        const PREVENT_ALL_MOVEMENT = Self::PREVENT_WALKING.bits()
            | Self::PREVENT_AIMING.bits()
            | Self::PREVENT_FLIP.bits();
        const PREVENT_ALL_DAMAGE = Self::PREVENT_BEING_SHOT.bits()
            | Self::PREVENT_BEING_MELEED.bits();

        const PREVENT_ALL = u32::MAX;
    }
}

impl AnimationConstraint {
    /// No restrictions
    pub const ALLOW_ALL: Self = Self::empty();
}

impl Default for AnimationConstraint {
    fn default() -> Self {
        Self::ALLOW_ALL
    }
}

/// Constraint flags that take effect at a point in an animation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintKeyframe {
    /// Time in seconds, on the unscaled timer
    pub time: f32,
    pub constraints: AnimationConstraint,
}

impl ConstraintKeyframe {
    pub const fn new(time: f32, constraints: AnimationConstraint) -> Self {
        Self { time, constraints }
    }
}

/// Flags of the segment containing `timer`
///
/// Walks the keyframes in order and returns the flags of the first keyframe `k`
/// with `k.time <= timer` and `timer < next.time` (or no next keyframe). Before the
/// first keyframe nothing is in force.
pub fn active_segment(keyframes: &[ConstraintKeyframe], timer: f32) -> AnimationConstraint {
    for (i, current) in keyframes.iter().enumerate() {
        let next = keyframes.get(i + 1);
        if timer >= current.time && next.is_none_or(|n| timer < n.time) {
            return current.constraints;
        }
    }
    AnimationConstraint::ALLOW_ALL
}

/// Union of every playing animation's active segment and the override
pub fn aggregate_constraints<'a>(
    animations: impl IntoIterator<Item = &'a ActiveAnimation>,
    additional: AnimationConstraint,
) -> AnimationConstraint {
    let mut result = AnimationConstraint::ALLOW_ALL;
    for active in animations {
        result |= active_segment(&active.animation().constraints, active.unscaled_timer());
    }
    result | additional
}
