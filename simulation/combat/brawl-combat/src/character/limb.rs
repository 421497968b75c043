//! Limb records and the per-character limb arena

use std::ops::{Index, IndexMut};

use brawl_anim::HandLook;
use brawl_anim::math::{smooth_angle_approach, smooth_approach_vec};
use glam::Vec2;

use crate::world::EntityId;

/// Unscaled size of the body sprite
pub const BODY_SIZE: Vec2 = Vec2::new(192.0, 356.0);
pub const HEAD_SIZE: Vec2 = Vec2::new(160.0, 160.0);
pub const HAND_SIZE: Vec2 = Vec2::new(64.0, 64.0);
pub const FOOT_SIZE: Vec2 = Vec2::new(84.0, 40.0);
/// Neck position as a fraction of the body size
pub const HEAD_OFFSET_RELATIVE_TO_BODY: Vec2 = Vec2::new(0.3 - 0.35, 0.6 - 0.22);
pub const HEAD_ROTATION_PIVOT: Vec2 = Vec2::new(-0.2, -0.3);
pub const BODY_ROTATION_PIVOT: Vec2 = Vec2::new(0.0, -0.5);
/// Distance from the floor to the character center, before scaling
pub const HALF_HEIGHT: f32 = 200.0;

pub const FOOT_RENDER_ORDER: i32 = 1000;
pub const BODY_RENDER_ORDER: i32 = 2000;
pub const HEAD_RENDER_ORDER: i32 = 3000;
pub const MAIN_HAND_RENDER_ORDER: i32 = 4000;
pub const OTHER_HAND_RENDER_ORDER: i32 = -100;

/// Slot of a limb in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum LimbKind {
    Head,
    Body,
    FirstHand,
    SecondHand,
    FirstFoot,
    SecondFoot,
}

impl LimbKind {
    pub const ALL: [Self; 6] = [
        Self::Head,
        Self::Body,
        Self::FirstHand,
        Self::SecondHand,
        Self::FirstFoot,
        Self::SecondFoot,
    ];
    pub const HANDS: [Self; 2] = [Self::FirstHand, Self::SecondHand];

    pub fn hand(index: usize) -> Option<Self> {
        Self::HANDS.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_hand(self) -> bool {
        matches!(self, Self::FirstHand | Self::SecondHand)
    }

    /// Head and body take damage
    pub fn is_body_part(self) -> bool {
        matches!(self, Self::Head | Self::Body)
    }

    /// Local point the limb's impact rotation swings around
    pub fn rotation_pivot(self) -> Vec2 {
        match self {
            Self::Head => HEAD_ROTATION_PIVOT,
            _ => BODY_ROTATION_PIVOT,
        }
    }
}

/// Visual knock-back of a struck entity, decaying back to rest
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ImpactOffset {
    pub translation: Vec2,
    /// Degrees
    pub rotation: f32,
    pub decay_speed: f32,
}

impl ImpactOffset {
    pub const DEFAULT_DECAY_SPEED: f32 = 10.0;

    pub fn decay(&mut self, dt: f32) {
        self.translation = smooth_approach_vec(self.translation, Vec2::ZERO, self.decay_speed, dt);
        self.rotation = smooth_angle_approach(self.rotation, 0.0, self.decay_speed, dt);
    }
}

impl Default for ImpactOffset {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            decay_speed: Self::DEFAULT_DECAY_SPEED,
        }
    }
}

/// State of one limb
#[derive(Debug, Clone, PartialEq)]
pub struct Limb {
    pub kind: LimbKind,
    /// Collider entity for limbs that can be struck
    pub entity: Option<EntityId>,
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    /// Scaled size
    pub size: Vec2,
    pub render_order: i32,
    /// Rest offset from the character center
    pub initial_offset: Vec2,

    /// Offset from the character center written by the hand pose solver
    pub pose_position: Vec2,
    pub pose_rotation: f32,

    pub animation_position: Vec2,
    pub animation_rotation: f32,
    pub animation_scale: Vec2,
    pub previous_animated_position: Vec2,
    pub previous_animated_rotation: f32,

    pub look: HandLook,
    /// Look requested by the playing animation, overriding `look`
    pub animated_look: Option<HandLook>,
    pub is_left_hand: bool,
    pub follow_recoil: bool,

    /// Smoothed look direction, head only
    pub direction: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub impact: ImpactOffset,
    /// Position at the end of the previous frame
    pub last_position: Vec2,
}

impl Limb {
    fn new(kind: LimbKind, position: Vec2, initial_offset: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            entity: None,
            position,
            rotation: 0.0,
            size,
            render_order: 0,
            initial_offset,
            pose_position: Vec2::ZERO,
            pose_rotation: 0.0,
            animation_position: Vec2::ZERO,
            animation_rotation: 0.0,
            animation_scale: Vec2::ONE,
            previous_animated_position: position,
            previous_animated_rotation: 0.0,
            look: HandLook::Fist,
            animated_look: None,
            is_left_hand: kind == LimbKind::SecondHand,
            follow_recoil: false,
            direction: Vec2::X,
            health: 1.0,
            max_health: 1.0,
            impact: ImpactOffset::default(),
            last_position: position,
        }
    }

    /// Look as rendered, preferring the animated one
    pub fn visible_look(&self, animated: bool) -> HandLook {
        match self.animated_look {
            Some(look) if animated => look,
            _ => self.look,
        }
    }

    /// Movement since the previous frame
    pub fn measured_delta(&self) -> Vec2 {
        self.position - self.last_position
    }

    pub fn is_dead(&self) -> bool {
        self.health <= f32::EPSILON
    }
}

/// The six limbs of a character, indexed by [`LimbKind`]
#[derive(Debug, Clone, PartialEq)]
pub struct Limbs([Limb; 6]);

impl Limbs {
    /// Rest layout for a character standing with its feet at `bottom`
    pub fn at_rest(bottom: Vec2, scale: f32, head_health: f32, body_health: f32) -> Self {
        let center = bottom + Vec2::new(0.0, HALF_HEIGHT * scale);
        let body_size = BODY_SIZE * scale;
        let head = bottom + HEAD_OFFSET_RELATIVE_TO_BODY * body_size + Vec2::new(0.0, body_size.y / 2.0);
        let hand1 = center + crate::pose::HAND_OFFSET_1 * scale;
        let hand2 = center + crate::pose::HAND_OFFSET_2 * scale;
        let foot1 = bottom + Vec2::new(40.0, 10.0) * scale;
        let foot2 = bottom + Vec2::new(-30.0, -6.0) * scale;

        let mut limbs = Self([
            Limb::new(LimbKind::Head, head, head - center, HEAD_SIZE * scale),
            Limb::new(LimbKind::Body, bottom, bottom - center, body_size),
            Limb::new(LimbKind::FirstHand, hand1, hand1 - center, HAND_SIZE * scale),
            Limb::new(LimbKind::SecondHand, hand2, hand2 - center, HAND_SIZE * scale),
            Limb::new(LimbKind::FirstFoot, foot1, foot1 - center, FOOT_SIZE * scale),
            Limb::new(LimbKind::SecondFoot, foot2, foot2 - center, FOOT_SIZE * scale),
        ]);

        limbs[LimbKind::Head].render_order = HEAD_RENDER_ORDER;
        limbs[LimbKind::Head].health = head_health;
        limbs[LimbKind::Head].max_health = head_health;
        limbs[LimbKind::Body].render_order = BODY_RENDER_ORDER;
        limbs[LimbKind::Body].health = body_health;
        limbs[LimbKind::Body].max_health = body_health;
        limbs[LimbKind::FirstHand].render_order = 1;
        limbs[LimbKind::SecondHand].render_order = -1;
        limbs[LimbKind::FirstFoot].render_order = FOOT_RENDER_ORDER - 2;
        limbs[LimbKind::SecondFoot].render_order = FOOT_RENDER_ORDER - 1;
        limbs
    }

    pub fn head(&self) -> &Limb {
        &self[LimbKind::Head]
    }

    pub fn body(&self) -> &Limb {
        &self[LimbKind::Body]
    }

    pub fn hands(&self) -> [&Limb; 2] {
        [&self[LimbKind::FirstHand], &self[LimbKind::SecondHand]]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Limb> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Limb> {
        self.0.iter_mut()
    }
}

impl Index<LimbKind> for Limbs {
    type Output = Limb;

    fn index(&self, kind: LimbKind) -> &Limb {
        &self.0[kind.index()]
    }
}

impl IndexMut<LimbKind> for Limbs {
    fn index_mut(&mut self, kind: LimbKind) -> &mut Limb {
        &mut self.0[kind.index()]
    }
}
