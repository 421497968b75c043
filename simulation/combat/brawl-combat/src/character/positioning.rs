//! Per-frame limb placement
//!
//! Each frame the procedural pose (center, body tilt, head look, weapon hand
//! poses) is computed and then blended towards the animated pose by the eased
//! animation transition factor. The body goes first because the head and hands
//! hang off it.

use brawl_anim::math::{
    delta_angle, easing, lerp_angle, rotate_point, smooth_approach, smooth_approach_vec, vector_to_angle,
};
use brawl_anim::{AnimationConstraint, AnimationStack, BlendContext};
use brawl_ragdoll::{LimbSeed, LimbTransform, RagdollLimbs, RagdollSeed};
use glam::Vec2;

use super::limb::{
    HALF_HEIGHT, HEAD_OFFSET_RELATIVE_TO_BODY, LimbKind, Limbs, MAIN_HAND_RENDER_ORDER, OTHER_HAND_RENDER_ORDER,
};
use crate::pose::{HandPoses, IRONSIGHT_OFFSET, MAX_HAND_RANGE, PoseInput, PoseOverrides, pose_hands};
use crate::weapon::Weapon;

const IRON_SIGHT_DURATION: f32 = 0.2;
const BLOCK_DURATION: f32 = 0.25;
const TRANSITION_DURATION: f32 = 0.2;
const LOOK_DIRECTION_SPEED: f32 = 20.0;
/// Beyond this distance the center jumps to its target instead of sliding
const CENTER_SNAP_DISTANCE: f32 = 400.0;

/// Inputs for one positioning pass
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub dt: f32,
    pub aim_target: Vec2,
    pub floor_level: f32,
    pub walk_acceleration: Vec2,
    pub weapon: Option<&'a Weapon>,
    pub iron_sighting: bool,
    pub blocking: bool,
    pub recoil_handling_ability: f32,
    pub constraints: AnimationConstraint,
    pub overrides: &'a PoseOverrides,
}

/// Limb transforms and the procedural state that drives them
#[derive(Debug, Clone, PartialEq)]
pub struct Positioning {
    pub limbs: Limbs,
    pub flipped: bool,
    pub scale: f32,
    /// Horizontal position and height above the floor the center moves towards
    pub target: Vec2,
    /// Height the character hovers above the floor
    pub flying_offset: f32,
    pub center: Vec2,
    /// Middle of the rotated body
    pub visual_center: Vec2,
    /// Aim target relative to the center, clamped to hand range
    pub hand_aim_position: Vec2,
    pub iron_sight_progress: f32,
    pub block_progress: f32,
    pub current_recoil: f32,
    pub smoothed_recoil: f32,
    pub recoil_position_offset: Vec2,
    pub recoil_angle_offset: f32,
    pub tilt: f32,
    pub block_impact_intensity: f32,
    pub smoothed_block_impact_intensity: f32,
    /// How much the animated pose overrides the procedural one
    pub transition: f32,
    pub transition_eased: f32,
    pub hand_poses: HandPoses,
}

impl Positioning {
    /// Rest pose for a character standing with its feet at `bottom`
    pub fn new(bottom: Vec2, scale: f32, head_health: f32, body_health: f32) -> Self {
        let limbs = Limbs::at_rest(bottom, scale, head_health, body_health);
        let center = bottom + Vec2::new(0.0, HALF_HEIGHT * scale);
        Self {
            visual_center: limbs.body().position + Vec2::new(0.0, limbs.body().size.y / 2.0),
            limbs,
            flipped: false,
            scale,
            target: Vec2::new(bottom.x, 0.0),
            flying_offset: 0.0,
            center,
            hand_aim_position: Vec2::ZERO,
            iron_sight_progress: 0.0,
            block_progress: 0.0,
            current_recoil: 0.0,
            smoothed_recoil: 0.0,
            recoil_position_offset: Vec2::ZERO,
            recoil_angle_offset: 0.0,
            tilt: 0.0,
            block_impact_intensity: 0.0,
            smoothed_block_impact_intensity: 0.0,
            transition: 0.0,
            transition_eased: 0.0,
            hand_poses: HandPoses::default(),
        }
    }

    pub fn is_flying(&self) -> bool {
        self.flying_offset > f32::EPSILON
    }

    pub fn flip_scaling(&self) -> f32 {
        if self.flipped { -1.0 } else { 1.0 }
    }

    /// Point aim directions are measured from
    pub fn aim_origin(&self) -> Vec2 {
        Vec2::new(self.center.x, self.limbs.head().position.y)
    }

    pub fn aim_direction(&self, aim_target: Vec2) -> Vec2 {
        (aim_target - self.aim_origin()).normalize_or(Vec2::X * self.flip_scaling())
    }

    /// Context for sampling animations against this pose
    pub fn blend_context(&self, aim_target: Vec2) -> BlendContext {
        BlendContext {
            flipped: self.flipped,
            scale: self.scale,
            aim_direction: self.aim_direction(aim_target),
            center: self.center,
            hand_pose_positions: [
                self.limbs[LimbKind::FirstHand].pose_position,
                self.limbs[LimbKind::SecondHand].pose_position,
            ],
        }
    }

    /// Run one full positioning pass
    pub fn update(&mut self, animations: &AnimationStack, frame: &FrameInput<'_>) {
        for limb in self.limbs.iter_mut() {
            limb.last_position = limb.position;
            limb.impact.decay(frame.dt);
        }

        self.progress(frame);
        self.position_center(frame);
        self.prepare_animation(animations, frame);
        self.position_body(animations, frame);
        self.position_head(frame);
        self.position_hands(animations, frame);
        self.position_feet();
        self.update_hand_render_orders(frame.weapon);

        log::trace!(
            "Positioned limbs around {:?} (transition {:.2})",
            self.center,
            self.transition_eased
        );
    }

    /// Iron sight and block progress, recoil recovery
    pub fn progress(&mut self, frame: &FrameInput<'_>) {
        let dt = frame.dt;
        let step = |value: f32, on: bool, duration: f32| {
            let delta = dt / duration;
            (value + if on { delta } else { -delta }).clamp(0.0, 1.0)
        };
        self.iron_sight_progress = step(self.iron_sight_progress, frame.iron_sighting, IRON_SIGHT_DURATION);
        self.block_progress = step(self.block_progress, frame.blocking, BLOCK_DURATION);

        self.smoothed_recoil = smooth_approach(self.smoothed_recoil, self.current_recoil, 25.0, dt);
        let recovery = match frame.weapon {
            Some(weapon) => {
                let multiplier = if frame.iron_sighting { 2.0 } else { 1.0 } * frame.recoil_handling_ability;
                weapon.data.recoil_handling * multiplier * 5.0 + 2.0
            }
            None => 19.0,
        };
        self.current_recoil = smooth_approach(self.current_recoil, 0.0, recovery, dt);
    }

    fn position_center(&mut self, frame: &FrameInput<'_>) {
        let mut target = self.target;
        target.y += frame.floor_level + self.flying_offset + HALF_HEIGHT * self.scale;

        self.center = if target.distance_squared(self.center) > CENTER_SNAP_DISTANCE * CENTER_SNAP_DISTANCE {
            target
        } else {
            smooth_approach_vec(self.center, target, 20.0, frame.dt)
        };
    }

    fn prepare_animation(&mut self, animations: &AnimationStack, frame: &FrameInput<'_>) {
        if frame.constraints.contains(AnimationConstraint::PREVENT_MIX_TRANSITION) {
            self.transition = 1.0;
        } else {
            let fading = animations
                .main()
                .is_none_or(|main| main.unscaled_timer() > main.animation().total_duration() - TRANSITION_DURATION);
            let delta = frame.dt / TRANSITION_DURATION;
            self.transition += if fading { -delta } else { delta };
        }
        self.transition = self.transition.clamp(0.0, 1.0);
        self.transition_eased = easing::quad_in_out(self.transition);

        let ctx = self.blend_context(frame.aim_target);
        let Some(mixed) = animations.mixed(&ctx) else {
            for limb in self.limbs.iter_mut() {
                limb.animation_position = Vec2::ZERO;
                limb.animation_rotation = 0.0;
                limb.animation_scale = Vec2::ONE;
                limb.animated_look = None;
            }
            return;
        };

        let scale = self.scale;
        for (kind, pose) in [(LimbKind::Head, mixed.head), (LimbKind::Body, mixed.body)] {
            let limb = &mut self.limbs[kind];
            limb.animation_position = pose.position * scale;
            limb.animation_rotation = pose.rotation;
            limb.animation_scale = pose.scale;
        }
        for (i, kind) in LimbKind::HANDS.into_iter().enumerate() {
            let result = mixed.hands[ctx.hand_slot(i)];
            let hand = &mut self.limbs[kind];
            hand.animation_position = result.pose.position;
            hand.animation_rotation = result.pose.rotation;
            hand.animation_scale = result.pose.scale;
            hand.animated_look = result.look;
        }
    }

    fn position_body(&mut self, animations: &AnimationStack, frame: &FrameInput<'_>) {
        let flip = self.flip_scaling();
        let scale = self.scale;
        let head_direction = self.limbs.head().direction;
        let center = self.center;

        let body = &mut self.limbs[LimbKind::Body];
        let position = center + body.initial_offset + body.animation_position + body.impact.translation / scale;
        body.position = position;

        let mut rotation = body.animation_rotation;
        if animations.is_playing_group("deaths") {
            rotation += flip * 7.5;
        } else {
            rotation += flip * (8.0 + head_direction.y * 15.0);
            rotation += body.impact.rotation / scale;
            rotation += self.smoothed_block_impact_intensity;
        }

        let walk_tilt = frame.walk_acceleration.x * 0.5 * -0.01;
        let mut recoil_tilt = self.smoothed_recoil * self.smoothed_recoil * 3.0 * flip;
        if frame.iron_sighting {
            recoil_tilt *= 2.0;
        }
        self.tilt = smooth_approach(self.tilt, walk_tilt + recoil_tilt, 15.0, frame.dt);
        rotation += self.tilt * (1.0 - self.transition_eased);

        body.rotation = rotation;
        self.visual_center = rotate_point(position + Vec2::new(0.0, body.size.y / 2.0), rotation, position);
    }

    fn position_head(&mut self, frame: &FrameInput<'_>) {
        let flip = self.flip_scaling();
        let scale = self.scale;
        let eased = self.transition_eased;
        let face_forwards = frame.constraints.contains(AnimationConstraint::FACE_FORWARDS);
        let body = self.limbs.body().clone();

        let head = &mut self.limbs[LimbKind::Head];
        let look = (frame.aim_target - head.position).normalize_or_zero() * 10.0;
        let target_direction = Vec2::new(look.x * flip, look.y).lerp(Vec2::X, 0.95);
        head.direction = smooth_approach_vec(head.direction, target_direction, LOOK_DIRECTION_SPEED, frame.dt);

        let mut position = body.position.lerp(body.position + head.animation_position, eased);
        position.y += body.size.y / 2.0;
        position += body.size * Vec2::new(HEAD_OFFSET_RELATIVE_TO_BODY.x * flip, HEAD_OFFSET_RELATIVE_TO_BODY.y);
        position = rotate_point(position, body.rotation, body.position);
        position += head.impact.translation / scale;
        head.position = position;

        let mut rotation = if face_forwards {
            0.0
        } else {
            vector_to_angle(head.direction) * flip
        };
        let animated = body.animation_rotation + head.animation_rotation;
        rotation += delta_angle(rotation, rotation + animated) * eased;
        rotation += head.impact.rotation / scale;
        head.rotation = rotation;
    }

    fn position_hands(&mut self, animations: &AnimationStack, frame: &FrameInput<'_>) {
        let flip = self.flip_scaling();
        let dt = frame.dt;
        let aim_direction = self.aim_direction(frame.aim_target);

        let mut recoil_rotation = self.current_recoil * 25.0 * flip;
        if let Some(weapon) = frame.weapon {
            recoil_rotation *= weapon.data.rotational_recoil_intensity;
        }
        self.recoil_position_offset =
            self.smoothed_recoil * rotate_point(Vec2::new(-100.0, flip * 40.0), vector_to_angle(aim_direction), Vec2::ZERO);
        self.recoil_angle_offset = recoil_rotation;
        self.smoothed_block_impact_intensity =
            smooth_approach(self.smoothed_block_impact_intensity, self.block_impact_intensity, 25.0, dt);
        self.block_impact_intensity = smooth_approach(self.block_impact_intensity, 0.0, 8.0, dt);

        let mut iron_offset = IRONSIGHT_OFFSET * easing::quad_in_out(self.iron_sight_progress) * self.scale;
        iron_offset.x *= flip;

        let reach = MAX_HAND_RANGE * frame.weapon.map_or(1.0, |w| w.data.max_hand_range_multiplier) * self.scale;
        self.hand_aim_position = (frame.aim_target - self.center).clamp_length_max(reach);

        let input = PoseInput {
            flipped: self.flipped,
            scale: self.scale,
            aim_direction,
            head_direction: self.limbs.head().direction,
            head_rotation: self.limbs.head().rotation,
            hand_aim_position: self.hand_aim_position,
            iron_sight_progress: self.iron_sight_progress,
            block_progress: self.block_progress,
            smoothed_block_impact: self.smoothed_block_impact_intensity,
            hand_positions: [
                self.limbs[LimbKind::FirstHand].position,
                self.limbs[LimbKind::SecondHand].position,
            ],
        };
        pose_hands(&mut self.hand_poses, &input, frame.weapon, frame.overrides);
        if self.hand_poses.reset_recoil {
            self.current_recoil = 0.0;
        }
        for (kind, pose) in LimbKind::HANDS.into_iter().zip(self.hand_poses.hands) {
            let hand = &mut self.limbs[kind];
            hand.pose_position = pose.position;
            hand.pose_rotation = pose.rotation;
            hand.look = pose.look;
            hand.follow_recoil = pose.follow_recoil;
        }

        let playing = animations.is_playing();
        let hands_animated = animations.main().is_some_and(|a| a.animation().hands.is_some());
        let keep_pose_rotation = (animations.is_playing_group("dodge") || animations.is_playing_group("pickup"))
            && !animations.is_playing_group("melee");
        let armed = frame.weapon.is_some();
        let follows = self.hand_poses.secondary_follows_primary;
        let eased = self.transition_eased;
        let recoil_pivot = self.visual_center + self.hand_aim_position * 0.5;

        for kind in LimbKind::HANDS {
            if follows && kind == LimbKind::SecondHand {
                continue;
            }
            let hand = &mut self.limbs[kind];

            let mut rotation = hand.pose_rotation;
            let mut position = self.center + hand.pose_position;
            position.x += self.tilt * -5.0;

            let mut animated_position = hand.animation_position;
            let mut animated_rotation = if !playing {
                hand.animation_rotation
            } else if keep_pose_rotation {
                rotation
            } else {
                hand.animation_rotation + if self.flipped { 180.0 } else { 0.0 }
            };

            if hands_animated {
                hand.previous_animated_rotation = animated_rotation;
                hand.previous_animated_position = animated_position;
            } else {
                animated_rotation = hand.previous_animated_rotation;
                animated_position = hand.previous_animated_position;
            }

            if armed && hand.follow_recoil {
                rotation += self.recoil_angle_offset;
                position = rotate_point(
                    position + self.recoil_position_offset,
                    self.recoil_angle_offset * 0.5,
                    recoil_pivot,
                );
            }

            position += iron_offset;
            hand.position = position.lerp(animated_position, eased);
            hand.rotation = lerp_angle(rotation, animated_rotation, eased);
        }

        if follows {
            let main = &self.limbs[LimbKind::FirstHand];
            let (main_position, main_rotation) = (main.position, main.rotation);
            let second = &mut self.limbs[LimbKind::SecondHand];
            second.position = main_position + rotate_point(second.pose_position, main_rotation, Vec2::ZERO);
            second.rotation = main_rotation + second.pose_rotation;
        }
    }

    fn position_feet(&mut self) {
        let flip = self.flip_scaling();
        let center = self.center;
        let body = self.limbs.body().clone();

        for kind in [LimbKind::FirstFoot, LimbKind::SecondFoot] {
            let foot = &mut self.limbs[kind];
            let offset = Vec2::new(foot.initial_offset.x * flip, foot.initial_offset.y);
            let mut position = center + offset + Vec2::new(body.animation_position.x, 0.0);
            position = rotate_point(position, body.rotation, body.position);
            position.x -= 5.0 * flip;
            position.y -= 7.0;

            foot.position = position;
            foot.rotation = body.animation_rotation + if self.flipped { 8.0 } else { -8.0 };
        }
    }

    /// Draw order of the hands relative to the body
    pub fn update_hand_render_orders(&mut self, weapon: Option<&Weapon>) {
        let two_handed = weapon.is_some_and(|w| w.hold_points.len() >= 2);
        let flipped = self.flipped;
        let blocking = self.block_progress > 0.5;

        for kind in LimbKind::HANDS {
            let hand = &mut self.limbs[kind];
            let back = flipped ^ hand.is_left_hand;
            hand.render_order = if !hand.is_left_hand && blocking {
                MAIN_HAND_RENDER_ORDER + 101
            } else if two_handed {
                if flipped { OTHER_HAND_RENDER_ORDER } else { MAIN_HAND_RENDER_ORDER }
            } else if back {
                OTHER_HAND_RENDER_ORDER
            } else {
                MAIN_HAND_RENDER_ORDER
            };
        }
    }

    /// Visual knock-back on a limb after a hit
    pub fn apply_impact(&mut self, kind: LimbKind, translation: Vec2, rotation: f32) {
        let impact = &mut self.limbs[kind].impact;
        impact.translation += translation;
        impact.rotation += rotation;
    }

    /// Snapshot of the limbs to build a ragdoll from
    pub fn ragdoll_seed(&self, measure_interval: f32) -> RagdollSeed {
        let seed = |kind: LimbKind, position: Vec2| {
            let limb = &self.limbs[kind];
            LimbSeed {
                transform: LimbTransform::new(position, limb.rotation, limb.size),
                measured_delta: limb.measured_delta(),
                impact_offset: limb.impact.translation,
            }
        };
        RagdollSeed {
            scale: self.scale,
            flipped: self.flipped,
            head: seed(LimbKind::Head, self.limbs.head().position),
            body: seed(LimbKind::Body, self.visual_center),
            hands: [
                seed(LimbKind::FirstHand, self.limbs[LimbKind::FirstHand].position),
                seed(LimbKind::SecondHand, self.limbs[LimbKind::SecondHand].position),
            ],
            measure_interval,
        }
    }

    /// Copy ragdoll-driven transforms back onto the limbs
    pub fn follow_ragdoll(&mut self, driven: &RagdollLimbs) {
        let head = &mut self.limbs[LimbKind::Head];
        head.position = driven.head.position;
        head.rotation = driven.head.rotation;

        let body = &mut self.limbs[LimbKind::Body];
        body.rotation = driven.body.rotation;
        body.position = driven.body.position - rotate_point(Vec2::new(0.0, body.size.y / 2.0), body.rotation, Vec2::ZERO);
        self.visual_center = driven.body.position;

        for (kind, transform) in LimbKind::HANDS.into_iter().zip(driven.hands) {
            let hand = &mut self.limbs[kind];
            hand.position = transform.position;
            hand.rotation = transform.rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapon::{HandPositionMode, MeleeDamageType, MeleeSize, WeaponData};
    use std::sync::Arc;

    fn frame<'a>(overrides: &'a PoseOverrides, aim_target: Vec2) -> FrameInput<'a> {
        FrameInput {
            dt: 1.0 / 60.0,
            aim_target,
            floor_level: 0.0,
            walk_acceleration: Vec2::ZERO,
            weapon: None,
            iron_sighting: false,
            blocking: false,
            recoil_handling_ability: 0.4,
            constraints: AnimationConstraint::ALLOW_ALL,
            overrides,
        }
    }

    #[test]
    fn test_progress_ramps_and_clamps() {
        let overrides = PoseOverrides::default();
        let mut positioning = Positioning::new(Vec2::ZERO, 1.0, 1.0, 1.0);
        let mut input = frame(&overrides, Vec2::new(500.0, 200.0));
        input.iron_sighting = true;
        input.blocking = true;
        input.dt = 0.1;

        positioning.progress(&input);
        assert!((positioning.iron_sight_progress - 0.5).abs() < 0.001);
        assert!((positioning.block_progress - 0.4).abs() < 0.001);

        input.dt = 1.0;
        positioning.progress(&input);
        assert!((positioning.iron_sight_progress - 1.0).abs() < 0.001);
        assert!((positioning.block_progress - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_recoil_recovers() {
        let overrides = PoseOverrides::default();
        let mut positioning = Positioning::new(Vec2::ZERO, 1.0, 1.0, 1.0);
        positioning.current_recoil = 1.0;
        let input = frame(&overrides, Vec2::new(500.0, 200.0));
        for _ in 0..120 {
            positioning.progress(&input);
        }
        assert!(positioning.current_recoil < 0.01);
    }

    #[test]
    fn test_rest_update_keeps_layout() {
        let overrides = PoseOverrides::default();
        let mut positioning = Positioning::new(Vec2::ZERO, 1.0, 1.0, 1.0);
        let stack = AnimationStack::default();
        let input = frame(&overrides, Vec2::new(800.0, 250.0));

        for _ in 0..30 {
            positioning.update(&stack, &input);
        }
        let head = positioning.limbs.head().position;
        let body = positioning.limbs.body().position;
        assert!(head.y > body.y);
        assert!((positioning.center - Vec2::new(0.0, HALF_HEIGHT)).length() < 0.01);
        assert!(positioning.transition_eased.abs() < 0.001);
        // Idle fists sit in front of and behind the body
        let first = positioning.limbs[LimbKind::FirstHand].position;
        let second = positioning.limbs[LimbKind::SecondHand].position;
        assert!(first.x < second.x);
    }

    #[test]
    fn test_flying_offset_lifts_center() {
        let overrides = PoseOverrides::default();
        let mut positioning = Positioning::new(Vec2::ZERO, 1.0, 1.0, 1.0);
        assert!(!positioning.is_flying());
        positioning.flying_offset = 200.0;
        assert!(positioning.is_flying());

        let stack = AnimationStack::default();
        let input = frame(&overrides, Vec2::new(800.0, 250.0));
        for _ in 0..60 {
            positioning.update(&stack, &input);
        }
        assert!((positioning.center.y - (HALF_HEIGHT + 200.0)).abs() < 0.5);
    }

    #[test]
    fn test_hand_aim_is_clamped_to_reach() {
        let overrides = PoseOverrides::default();
        let mut positioning = Positioning::new(Vec2::ZERO, 1.0, 1.0, 1.0);
        let stack = AnimationStack::default();
        positioning.update(&stack, &frame(&overrides, Vec2::new(5000.0, 200.0)));
        assert!((positioning.hand_aim_position.length() - MAX_HAND_RANGE).abs() < 0.01);
    }

    #[test]
    fn test_center_snaps_when_far() {
        let overrides = PoseOverrides::default();
        let mut positioning = Positioning::new(Vec2::ZERO, 1.0, 1.0, 1.0);
        positioning.target = Vec2::new(2000.0, 0.0);
        let stack = AnimationStack::default();
        positioning.update(&stack, &frame(&overrides, Vec2::new(2500.0, 200.0)));
        assert!((positioning.center - Vec2::new(2000.0, HALF_HEIGHT)).length() < 0.001);
    }

    #[test]
    fn test_hand_render_orders() {
        let mut positioning = Positioning::new(Vec2::ZERO, 1.0, 1.0, 1.0);
        positioning.update_hand_render_orders(None);
        assert_eq!(positioning.limbs[LimbKind::FirstHand].render_order, MAIN_HAND_RENDER_ORDER);
        assert_eq!(positioning.limbs[LimbKind::SecondHand].render_order, OTHER_HAND_RENDER_ORDER);

        positioning.block_progress = 1.0;
        positioning.update_hand_render_orders(None);
        assert_eq!(positioning.limbs[LimbKind::FirstHand].render_order, MAIN_HAND_RENDER_ORDER + 101);

        positioning.block_progress = 0.0;
        positioning.flipped = true;
        let rifle = Weapon::new(Arc::new(WeaponData::firearm("rifle", HandPositionMode::TwoHands)))
            .with_hold_points([Vec2::ZERO, Vec2::X]);
        positioning.update_hand_render_orders(Some(&rifle));
        assert_eq!(positioning.limbs[LimbKind::FirstHand].render_order, OTHER_HAND_RENDER_ORDER);
        assert_eq!(positioning.limbs[LimbKind::SecondHand].render_order, OTHER_HAND_RENDER_ORDER);
    }

    #[test]
    fn test_melee_pose_cancels_recoil() {
        let overrides = PoseOverrides::default();
        let mut positioning = Positioning::new(Vec2::ZERO, 1.0, 1.0, 1.0);
        positioning.current_recoil = 1.0;
        let sword = Weapon::new(Arc::new(WeaponData::melee("sword", MeleeDamageType::Blade, MeleeSize::Medium, 0.3)));
        let mut input = frame(&overrides, Vec2::new(800.0, 250.0));
        input.weapon = Some(&sword);
        positioning.update(&AnimationStack::default(), &input);
        assert_eq!(positioning.current_recoil, 0.0);
        assert!(positioning.hand_poses.deflection_line.is_some());
    }

    #[test]
    fn test_ragdoll_seed_uses_visual_center() {
        let positioning = Positioning::new(Vec2::ZERO, 2.0, 1.0, 1.0);
        let seed = positioning.ragdoll_seed(1.0 / 60.0);
        assert_eq!(seed.scale, 2.0);
        assert_eq!(seed.body.transform.position, positioning.visual_center);
        assert_eq!(seed.hands[0].transform.position, positioning.limbs[LimbKind::FirstHand].position);
    }
}
