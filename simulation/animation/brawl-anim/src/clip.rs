//! Immutable character animation assets
//!
//! A [`CharacterAnimation`] holds one optional [`LimbAnimation`] per animated limb,
//! a pair of [`HandLimbAnimation`]s with grip look timelines, and the constraint
//! keyframes that gate gameplay while it plays. Assets are built once and shared
//! between playing instances through `Arc`.

use glam::Vec2;

use crate::constraint::{AnimationConstraint, ConstraintKeyframe};
use crate::curve::Curve;
use crate::error::{AnimationError, Result};
use crate::math::Angle;

/// How a hand visually grips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum HandLook {
    #[default]
    Fist,
    HoldPistol,
    HoldUnderside,
    HoldRifle,
    Point,
    Open,
    HoldStock,
}

impl HandLook {
    pub const ALL: [Self; 7] = [
        Self::Fist,
        Self::HoldPistol,
        Self::HoldUnderside,
        Self::HoldRifle,
        Self::Point,
        Self::Open,
        Self::HoldStock,
    ];
}

/// Translation, rotation and scale curves for one limb
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct LimbAnimation {
    pub translation: Option<Curve<Vec2>>,
    /// Rotation in degrees
    pub rotation: Option<Curve<Angle>>,
    pub scale: Option<Curve<Vec2>>,
    /// Duration in seconds; the curves are sampled at `timer / duration`
    pub duration: f32,
    /// Rotate the sampled pose around the limb pivot by the aim direction
    pub adjust_for_aim: bool,
}

impl LimbAnimation {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_translation(mut self, curve: Curve<Vec2>) -> Self {
        self.translation = Some(curve);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, curve: Curve<Angle>) -> Self {
        self.rotation = Some(curve);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, curve: Curve<Vec2>) -> Self {
        self.scale = Some(curve);
        self
    }

    #[must_use]
    pub fn adjusted_for_aim(mut self) -> Self {
        self.adjust_for_aim = true;
        self
    }

    /// Largest key count across translation and rotation
    pub fn key_count(&self) -> usize {
        let t = self.translation.as_ref().map_or(0, Curve::len);
        let r = self.rotation.as_ref().map_or(0, Curve::len);
        t.max(r)
    }
}

/// A grip look change at a normalized time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct HandLookKey {
    pub time: f32,
    pub look: Option<HandLook>,
}

/// Limb animation for a hand, with a grip look timeline
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct HandLimbAnimation {
    pub limb: LimbAnimation,
    pub looks: Vec<HandLookKey>,
}

impl HandLimbAnimation {
    pub fn new(limb: LimbAnimation) -> Self {
        Self {
            limb,
            looks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_look(mut self, time: f32, look: Option<HandLook>) -> Self {
        self.looks.push(HandLookKey { time, look });
        self
    }

    /// Grip look at normalized time `t`
    ///
    /// Scans from the last entry backwards and returns the first look whose time
    /// is at or before `t`.
    pub fn look_at(&self, t: f32) -> Option<HandLook> {
        self.looks
            .iter()
            .rev()
            .find(|key| key.time <= t)
            .and_then(|key| key.look)
    }

    pub fn has_looks(&self) -> bool {
        !self.looks.is_empty()
    }
}

/// A complete animation for a character
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterAnimation {
    pub name: String,
    /// Group used for "is any X playing" queries, e.g. `deaths` or `melee`
    pub group: String,
    pub head: Option<LimbAnimation>,
    pub body: Option<LimbAnimation>,
    pub hands: Option<[HandLimbAnimation; 2]>,
    /// Sorted chronologically
    pub constraints: Vec<ConstraintKeyframe>,
    /// Hand translations are relative to the hand's resting pose
    pub relative_hand_position: bool,
    total_duration: f32,
}

impl CharacterAnimation {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            head: None,
            body: None,
            hands: None,
            constraints: Vec::new(),
            relative_hand_position: false,
            total_duration: 0.0,
        }
    }

    #[must_use]
    pub fn with_head(mut self, limb: LimbAnimation) -> Self {
        self.head = Some(limb);
        self
    }

    #[must_use]
    pub fn with_body(mut self, limb: LimbAnimation) -> Self {
        self.body = Some(limb);
        self
    }

    #[must_use]
    pub fn with_hands(mut self, first: HandLimbAnimation, second: HandLimbAnimation) -> Self {
        self.hands = Some([first, second]);
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, time: f32, constraints: AnimationConstraint) -> Self {
        self.constraints.push(ConstraintKeyframe::new(time, constraints));
        self
    }

    #[must_use]
    pub fn with_relative_hands(mut self, relative: bool) -> Self {
        self.relative_hand_position = relative;
        self
    }

    /// Validate the asset, sort its constraints and compute the total duration
    pub fn build(mut self) -> Result<Self> {
        if self.head.is_none() && self.body.is_none() && self.hands.is_none() {
            return Err(AnimationError::Empty(self.name));
        }

        for limb in self.limbs() {
            if !limb.duration.is_finite() || limb.duration <= 0.0 {
                return Err(AnimationError::InvalidDuration {
                    animation: self.name.clone(),
                    duration: limb.duration,
                });
            }
        }

        self.constraints
            .sort_by(|a, b| a.time.total_cmp(&b.time));
        self.total_duration = self
            .limbs()
            .map(|limb| limb.duration)
            .fold(0.0, f32::max);

        log::trace!(
            "Built animation '{}' ({}s, {} constraint keyframes)",
            self.name,
            self.total_duration,
            self.constraints.len()
        );
        Ok(self)
    }

    /// Longest limb duration in seconds
    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    /// Largest key count over head, body and hand translation/rotation curves
    pub fn max_key_count(&self) -> usize {
        self.limbs().map(LimbAnimation::key_count).max().unwrap_or(0)
    }

    /// Every present limb animation, hands included
    pub fn limbs(&self) -> impl Iterator<Item = &LimbAnimation> {
        self.head
            .iter()
            .chain(self.body.iter())
            .chain(self.hands.iter().flat_map(|hands| hands.iter().map(|h| &h.limb)))
    }

    pub fn hand(&self, index: usize) -> Option<&HandLimbAnimation> {
        self.hands.as_ref().and_then(|hands| hands.get(index))
    }
}
