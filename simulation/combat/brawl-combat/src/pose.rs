//! Procedural hand posing per weapon category
//!
//! [`WeaponCategory::classify`] picks a category once per frame and
//! [`pose_hands`] runs the matching closed-form pose. Hand positions are offsets
//! from the character center; hand 0 is the first (main) hand regardless of flip.

use std::fmt;
use std::sync::Arc;

use brawl_anim::HandLook;
use brawl_anim::math::{angle_to_vector, easing, lerp_angle, rotate_point, vector_to_angle};
use glam::Vec2;

use crate::weapon::{HandPositionMode, MeleeDamageType, Weapon, WeaponData, WeaponType};

/// Rest offset of the first fist from the character center
pub const HAND_OFFSET_1: Vec2 = Vec2::new(-105.09, 26.76);
pub const HAND_OFFSET_2: Vec2 = Vec2::new(160.63, 39.61);
/// Hand shift towards the eye at full iron sight
pub const IRONSIGHT_OFFSET: Vec2 = Vec2::new(-25.0, 50.0);
/// Furthest the aiming hand reaches from the center, before scaling
pub const MAX_HAND_RANGE: f32 = 280.0;

const MELEE_GRIP_TILT: f32 = 17.76;
const HEAD_FOLLOW_OFFSET: f32 = 24.0;
const DEFLECTION_LINE_LENGTH: f32 = 500.0;

/// Character state the hand poses depend on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseInput {
    pub flipped: bool,
    pub scale: f32,
    /// Normalized aim direction
    pub aim_direction: Vec2,
    pub head_direction: Vec2,
    /// World rotation of the head
    pub head_rotation: f32,
    /// Aim target relative to the center, clamped to hand range
    pub hand_aim_position: Vec2,
    pub iron_sight_progress: f32,
    pub block_progress: f32,
    pub smoothed_block_impact: f32,
    /// World hand positions from the previous frame
    pub hand_positions: [Vec2; 2],
}

impl Default for PoseInput {
    fn default() -> Self {
        Self {
            flipped: false,
            scale: 1.0,
            aim_direction: Vec2::X,
            head_direction: Vec2::X,
            head_rotation: 0.0,
            hand_aim_position: Vec2::ZERO,
            iron_sight_progress: 0.0,
            block_progress: 0.0,
            smoothed_block_impact: 0.0,
            hand_positions: [Vec2::ZERO; 2],
        }
    }
}

impl PoseInput {
    pub fn flip_scaling(&self) -> f32 {
        if self.flipped { -1.0 } else { 1.0 }
    }
}

/// Procedural pose of one hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    /// Offset from the character center, or from the main hand when it follows
    pub position: Vec2,
    pub rotation: f32,
    pub look: HandLook,
    pub follow_recoil: bool,
}

impl Default for HandPose {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            look: HandLook::Fist,
            follow_recoil: false,
        }
    }
}

/// Segment along a blocking blade, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeflectionLine {
    pub start: Vec2,
    pub end: Vec2,
}

/// Output of the hand pose solver
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandPoses {
    pub hands: [HandPose; 2],
    /// The second hand's pose is relative to the main hand
    pub secondary_follows_primary: bool,
    /// Melee poses cancel any firearm recoil
    pub reset_recoil: bool,
    pub deflection_line: Option<DeflectionLine>,
}

/// Caller-supplied adjustment that runs after the category pose
pub trait HandPoseOverride {
    fn apply(&self, input: &PoseInput, poses: &mut HandPoses);
}

impl<F> HandPoseOverride for F
where
    F: Fn(&PoseInput, &mut HandPoses),
{
    fn apply(&self, input: &PoseInput, poses: &mut HandPoses) {
        self(input, poses);
    }
}

/// Ordered list of pose overrides
#[derive(Clone, Default)]
pub struct PoseOverrides(Vec<Arc<dyn HandPoseOverride>>);

impl PoseOverrides {
    pub fn push(&mut self, pose_override: impl HandPoseOverride + 'static) {
        self.0.push(Arc::new(pose_override));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PoseOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoseOverrides({})", self.0.len())
    }
}

/// Which pose function drives the hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponCategory {
    Unarmed,
    /// Holding a weapon without a hand mode; hands keep their last pose
    Holstered,
    OneHandedFirearm,
    TwoHandedFirearm,
    OneHandedSword,
    TwoHandedSword,
    OneHandedAxe,
    TwoHandedAxe,
    OneHandedBlunt,
    TwoHandedBlunt,
}

impl WeaponCategory {
    /// Category for the equipped weapon, or `None` for an invalid melee weapon
    pub fn classify(weapon: Option<&WeaponData>) -> Option<Self> {
        let Some(data) = weapon else {
            return Some(Self::Unarmed);
        };
        let two_hands = match data.hand_position_mode {
            HandPositionMode::None => return Some(Self::Holstered),
            HandPositionMode::OneHand => false,
            HandPositionMode::TwoHands => true,
        };

        let category = match (data.weapon_type, data.melee_damage_type, two_hands) {
            (WeaponType::Firearm, _, false) => Self::OneHandedFirearm,
            (WeaponType::Firearm, _, true) => Self::TwoHandedFirearm,
            (WeaponType::Melee, MeleeDamageType::Blade, false) => Self::OneHandedSword,
            (WeaponType::Melee, MeleeDamageType::Blade, true) => Self::TwoHandedSword,
            (WeaponType::Melee, MeleeDamageType::Axe, false) => Self::OneHandedAxe,
            (WeaponType::Melee, MeleeDamageType::Axe, true) => Self::TwoHandedAxe,
            (WeaponType::Melee, MeleeDamageType::Blunt, false) => Self::OneHandedBlunt,
            (WeaponType::Melee, MeleeDamageType::Blunt, true) => Self::TwoHandedBlunt,
            (WeaponType::Melee, MeleeDamageType::Firearm, _) => {
                log::error!(
                    "Invalid melee damage type on '{}'. Only Blade, Axe and Blunt are valid",
                    data.name
                );
                return None;
            }
        };
        Some(category)
    }
}

/// Pose both hands for the equipped weapon, then run the overrides
pub fn pose_hands(poses: &mut HandPoses, input: &PoseInput, weapon: Option<&Weapon>, overrides: &PoseOverrides) {
    poses.secondary_follows_primary = false;
    poses.reset_recoil = false;

    match WeaponCategory::classify(weapon.map(|w| w.data.as_ref())) {
        Some(WeaponCategory::Unarmed) => fist_fight(poses, input),
        Some(WeaponCategory::OneHandedFirearm) => one_handed_gun(poses, input, weapon),
        Some(WeaponCategory::TwoHandedFirearm) => two_handed_gun(poses, input, weapon),
        Some(WeaponCategory::OneHandedSword | WeaponCategory::OneHandedAxe | WeaponCategory::OneHandedBlunt) => {
            one_handed_sword(poses, input);
        }
        Some(WeaponCategory::TwoHandedSword) => two_handed_sword(poses, input),
        Some(WeaponCategory::TwoHandedAxe | WeaponCategory::TwoHandedBlunt) => two_handed_axe(poses, input, weapon),
        Some(WeaponCategory::Holstered) | None => {}
    }

    for pose_override in &overrides.0 {
        pose_override.apply(input, poses);
    }
}

fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Blend a hand towards the unarmed guard stance
pub fn unarmed_protective(input: &PoseInput, hand: &mut HandPose, index: usize) {
    let flip = input.flip_scaling();
    let t = easing::cubic_in_out(input.block_progress);
    let i = index as f32;

    let target = Vec2::new(
        flip * (150.0 + 50.0 * i),
        30.0 + 60.0 * i + input.aim_direction.y * 40.0,
    );
    let mut target_rotation = input.head_rotation + 60.0 + 25.0 * i;
    if input.flipped {
        target_rotation = -target_rotation - 180.0;
    }

    hand.position = hand.position.lerp(target, t);
    hand.rotation = lerp_angle(hand.rotation, target_rotation, t);
}

/// Blend a hand towards the melee block stance
fn deflection_pose(poses: &mut HandPoses, input: &PoseInput, index: usize) {
    let flip = input.flip_scaling();
    let aim = input.aim_direction;
    let intensity = input.smoothed_block_impact * 4.0;

    let mut target = Vec2::new(
        if input.flipped { -150.0 } else { -50.0 },
        if input.flipped { 200.0 } else { 150.0 },
    ) + aim * 48.0 * input.scale;
    target.x -= flip * intensity.abs() * 32.0;

    let mut angle = 230.0 + vector_to_angle(Vec2::new(aim.x.abs(), aim.y)) * -0.2;
    angle -= flip * intensity * 8.0;
    if input.flipped {
        angle -= 190.0;
    }

    let t = easing::cubic_in_out(input.block_progress);
    let hand = &mut poses.hands[index];
    hand.position = hand.position.lerp(target, t);
    hand.rotation = lerp_angle(hand.rotation, angle, t);

    if t > 0.5 {
        poses.hands[1].look = HandLook::Open;
    }
}

fn record_deflection_line(poses: &mut HandPoses, input: &PoseInput) {
    let start = input.hand_positions[0];
    let end = start + angle_to_vector(poses.hands[0].rotation + 90.0) * DEFLECTION_LINE_LENGTH * input.flip_scaling();
    poses.deflection_line = Some(DeflectionLine { start, end });
}

fn fist_fight(poses: &mut HandPoses, input: &PoseInput) {
    let flip = input.flip_scaling();
    let dir = input.aim_direction;
    let clamped = Vec2::new(sign(dir.x) * dir.x.abs().max(0.5), dir.y.clamp(-0.2, 0.2)).normalize_or_zero();
    let angle = vector_to_angle(clamped);

    let pos1 = rotate_point(Vec2::new(HAND_OFFSET_1.x, HAND_OFFSET_1.y * flip), angle, Vec2::ZERO) * input.scale;
    let pos2 = rotate_point(Vec2::new(HAND_OFFSET_2.x, HAND_OFFSET_2.y * flip), angle, Vec2::ZERO) * input.scale;
    let (first, second) = if input.flipped { (pos2, pos1) } else { (pos1, pos2) };

    for (hand, position) in poses.hands.iter_mut().zip([first, second]) {
        hand.position = position;
        hand.rotation = angle;
        hand.look = HandLook::Fist;
    }

    let (a, b) = if input.flipped { (1, 0) } else { (0, 1) };
    unarmed_protective(input, &mut poses.hands[0], a);
    unarmed_protective(input, &mut poses.hands[1], b);
}

fn one_handed_gun(poses: &mut HandPoses, input: &PoseInput, weapon: Option<&Weapon>) {
    let hold_stock = weapon.is_some_and(|w| w.data.hold_stock_hand_pose);
    let main = HandPose {
        position: input.hand_aim_position,
        rotation: vector_to_angle(input.aim_direction),
        look: if hold_stock { HandLook::HoldStock } else { HandLook::HoldPistol },
        follow_recoil: true,
    };
    poses.hands[0] = main;

    let iron = input.iron_sight_progress;
    let curve_y = easing::circ_in_out(iron);
    let curve_x = easing::circ_in_out(iron + 0.1);

    let rest = Vec2::new(if input.flipped { 50.0 } else { 100.0 }, -80.0);
    let rest_rotation = if input.flipped { 180.0 } else { 0.0 };

    let look = if iron > 0.1 && iron < 0.9 {
        HandLook::Open
    } else if let Some(weapon) = weapon {
        if (iron > 0.9 && weapon.data.hold_stock_hand_pose) || weapon.hold_points.len() > 1 {
            HandLook::HoldStock
        } else {
            HandLook::Fist
        }
    } else {
        HandLook::Fist
    };

    poses.hands[1] = HandPose {
        position: Vec2::new(
            rest.x + (main.position.x - rest.x) * curve_x,
            rest.y + (main.position.y - rest.y) * curve_y,
        ),
        rotation: lerp_angle(rest_rotation, main.rotation, curve_x),
        look,
        follow_recoil: iron >= 0.9,
    };
}

fn two_handed_gun(poses: &mut HandPoses, input: &PoseInput, weapon: Option<&Weapon>) {
    poses.secondary_follows_primary = true;
    let flip = input.flip_scaling();

    poses.hands[0] = HandPose {
        position: input.hand_aim_position,
        rotation: vector_to_angle(input.aim_direction),
        look: HandLook::HoldPistol,
        follow_recoil: true,
    };

    match weapon.filter(|w| w.hold_points.len() >= 2) {
        Some(weapon) => {
            let second = &mut poses.hands[1];
            second.follow_recoil = false;

            let mut hold = weapon.hold_points[1] - weapon.pivot;
            if weapon.data.is_pump_action {
                // Without an animated slide the grip offset is counted twice
                hold += weapon.pump_position.map_or(hold, |p| p - Vec2::new(0.0, 15.0));
            }
            hold.y *= flip;
            second.position = hold;
            second.look = if weapon.data.hold_for_grip {
                HandLook::HoldRifle
            } else {
                HandLook::HoldUnderside
            };

            if weapon.data.hold_stock_hand_pose {
                poses.hands[0].look = HandLook::HoldStock;
            }
        }
        None => {
            let main = poses.hands[0];
            let second = &mut poses.hands[1];
            second.position = main.position + Vec2::new(-10.0, 10.0);
            second.look = HandLook::HoldPistol;
            second.follow_recoil = main.follow_recoil;
        }
    }
    poses.hands[1].rotation = 0.0;
}

fn melee_offsets(input: &PoseInput, first: Vec2, second: Vec2) -> (Vec2, Vec2) {
    let head = input.head_direction * HEAD_FOLLOW_OFFSET * input.scale;
    (first - head, second + head)
}

fn one_handed_sword(poses: &mut HandPoses, input: &PoseInput) {
    let flip = input.flip_scaling();
    let angle = if input.flipped { 180.0 } else { 0.0 };
    let (pos1, pos2) = melee_offsets(
        input,
        Vec2::new(HAND_OFFSET_1.x * flip, HAND_OFFSET_1.y),
        Vec2::new(HAND_OFFSET_2.x * flip, HAND_OFFSET_2.y),
    );
    poses.reset_recoil = true;

    let main = &mut poses.hands[0];
    main.position = if input.flipped { pos2 } else { pos1 };
    main.rotation = angle - MELEE_GRIP_TILT * flip;
    main.look = HandLook::HoldPistol;

    let other = &mut poses.hands[1];
    other.position = if input.flipped { pos1 } else { pos2 };
    other.position.x -= flip * 50.0;
    other.position.y -= 100.0;
    other.rotation = angle;
    other.look = HandLook::Fist;

    record_deflection_line(poses, input);
    deflection_pose(poses, input, 0);
}

fn two_handed_sword(poses: &mut HandPoses, input: &PoseInput) {
    let flip = input.flip_scaling();
    let angle = if input.flipped { 180.0 } else { 0.0 };
    let (pos1, pos2) = melee_offsets(
        input,
        Vec2::new(HAND_OFFSET_1.x * flip, HAND_OFFSET_1.y),
        Vec2::new(HAND_OFFSET_2.x * flip, HAND_OFFSET_2.y),
    );
    poses.reset_recoil = true;

    for hand in &mut poses.hands {
        hand.position = if input.flipped { pos2 } else { pos1 };
        hand.rotation = angle - MELEE_GRIP_TILT * flip;
        hand.look = HandLook::HoldPistol;
    }

    record_deflection_line(poses, input);
    deflection_pose(poses, input, 0);
    deflection_pose(poses, input, 1);
}

fn two_handed_axe(poses: &mut HandPoses, input: &PoseInput, weapon: Option<&Weapon>) {
    poses.secondary_follows_primary = true;
    let flip = input.flip_scaling();
    let angle = if input.flipped { 180.0 } else { 0.0 };
    let (pos1, pos2) = melee_offsets(
        input,
        Vec2::new(-HAND_OFFSET_1.x * 2.0, HAND_OFFSET_1.y),
        Vec2::new(HAND_OFFSET_1.x * 2.0, HAND_OFFSET_1.y),
    );
    poses.reset_recoil = true;

    let main = &mut poses.hands[0];
    main.position = if input.flipped { pos2 } else { pos1 };
    main.rotation = angle - MELEE_GRIP_TILT * flip;
    main.look = HandLook::HoldPistol;

    let off = &mut poses.hands[1];
    off.position = match weapon.filter(|w| !w.hold_points.is_empty()) {
        Some(weapon) => {
            let mut hold = weapon.hold_points[1 % weapon.hold_points.len()] - weapon.pivot;
            hold.y *= flip;
            hold
        }
        None => pos2,
    };
    off.rotation = 0.0;
    off.look = HandLook::HoldPistol;

    record_deflection_line(poses, input);
    deflection_pose(poses, input, 0);
}
