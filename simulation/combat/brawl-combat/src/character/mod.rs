//! Characters: the aggregate that animation, posing and melee all act on

pub mod flags;
pub mod limb;
pub mod positioning;
pub mod stats;

pub use flags::CharacterFlags;
pub use limb::{ImpactOffset, Limb, LimbKind, Limbs};
pub use positioning::{FrameInput, Positioning};
pub use stats::CharacterStats;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use brawl_anim::{
    AnimationConstraint, AnimationRegistry, AnimationStack, CharacterAnimation, CompletedAnimation, HandLook, PlaybackId,
};
use brawl_ragdoll::{CollisionSurface, Ragdoll, VerletSolver};
use glam::Vec2;

use crate::melee::MeleeSequenceState;
use crate::pose::PoseOverrides;
use crate::weapon::Weapon;
use crate::world::{CollisionLayers, EntityId};

/// Time after a drain before the dodge meter refills
pub const DODGE_REGENERATION_COOLDOWN: f32 = 0.8;
/// Dodge meter regained per second
pub const DODGE_REGENERATION_RATE: f32 = 0.6;

const DODGE_ANIMATIONS: [&str; 2] = ["dodge_1", "dodge_2"];

/// Generational handle of a character within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterId {
    pub index: u32,
    pub generation: u32,
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A fighter in the scene
#[derive(Debug)]
pub struct Character {
    pub name: String,
    pub alive: bool,
    pub ragdolled: bool,
    pub is_player: bool,
    pub flags: CharacterFlags,
    pub stats: CharacterStats,
    pub faction: String,
    /// Layer the character's own colliders live on
    pub layer: CollisionLayers,
    /// Layers this character attacks
    pub enemy_layers: CollisionLayers,
    /// World point the character looks and aims at
    pub aim_target: Vec2,
    pub walk_acceleration: Vec2,
    pub dodge: f32,
    pub dodge_regen_cooldown: f32,
    pub is_melee_blocking: bool,
    pub is_iron_sighting: bool,
    pub equipped: Option<Weapon>,
    pub animations: AnimationStack,
    /// Playback of the death animation, reported once it runs to its end
    pub death_animation: Option<PlaybackId>,
    /// Added to the constraints of the playing animations
    pub constraint_override: AnimationConstraint,
    pub positioning: Positioning,
    pub melee_sequence: Option<MeleeSequenceState>,
    pub ragdoll: Option<Ragdoll>,
    pub ragdoll_solver: VerletSolver,
    /// Remove the ragdoll from the scene once it settles
    pub delete_ragdoll: bool,
    /// Entities this character's own raycasts pass through
    pub attack_ignore: HashSet<EntityId>,
    pub animation_flip_flop: u32,
    pub pose_overrides: PoseOverrides,
}

impl Character {
    /// A new character standing with its feet at `position`
    pub fn new(name: impl Into<String>, stats: CharacterStats, position: Vec2) -> Self {
        let positioning = Positioning::new(position, stats.scale, stats.head_health, stats.body_health);
        Self {
            name: name.into(),
            alive: true,
            ragdolled: false,
            is_player: false,
            flags: CharacterFlags::default(),
            faction: String::new(),
            layer: CollisionLayers::ENEMY,
            enemy_layers: CollisionLayers::PLAYER,
            aim_target: position + Vec2::new(1000.0, 0.0),
            walk_acceleration: Vec2::ZERO,
            dodge: 1.0,
            dodge_regen_cooldown: 0.0,
            is_melee_blocking: false,
            is_iron_sighting: false,
            equipped: None,
            animations: AnimationStack::default(),
            death_animation: None,
            constraint_override: AnimationConstraint::ALLOW_ALL,
            positioning,
            melee_sequence: None,
            ragdoll: None,
            ragdoll_solver: VerletSolver::default(),
            delete_ragdoll: false,
            attack_ignore: HashSet::new(),
            animation_flip_flop: 0,
            pose_overrides: PoseOverrides::default(),
            stats,
        }
    }

    /// Make this the player character, fighting on the player layer
    pub fn into_player(mut self) -> Self {
        self.is_player = true;
        self.layer = CollisionLayers::PLAYER;
        self.enemy_layers = CollisionLayers::ENEMY;
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.equipped = Some(weapon);
        self
    }

    pub fn with_flags(mut self, flags: CharacterFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = faction.into();
        self
    }

    /// Aim at `point`, flipping to face it
    pub fn face_towards(&mut self, point: Vec2) {
        self.aim_target = point;
        self.positioning.flipped = point.x < self.positioning.center.x;
    }

    pub fn has_weapon(&self) -> bool {
        self.equipped.is_some()
    }

    /// Constraints of the playing animations and the override combined
    pub fn constraints(&self) -> AnimationConstraint {
        self.animations.constraints(self.constraint_override)
    }

    pub fn is_constrained(&self, constraint: AnimationConstraint) -> bool {
        self.constraints().intersects(constraint)
    }

    pub fn has_dodge(&self) -> bool {
        (self.dodge * 100.0) as i32 >= 1
    }

    pub fn can_dodge(&self) -> bool {
        if self.flags.contains(CharacterFlags::INVINCIBLE) {
            return true;
        }
        if self.is_constrained(AnimationConstraint::PREVENT_DODGE) {
            return false;
        }
        self.has_dodge()
    }

    /// Whether the meter is below `threshold` of its capacity
    pub fn is_low_on_dodge(&self, threshold: f32) -> bool {
        self.stats.dodge_ability > f32::EPSILON && self.dodge / self.stats.dodge_ability < threshold
    }

    pub fn drain_dodge(&mut self, drain: f32) {
        self.dodge = (self.dodge - drain).max(0.0);
        self.dodge_regen_cooldown = DODGE_REGENERATION_COOLDOWN;
    }

    /// Refill the dodge meter once the cooldown has run out
    pub fn regenerate_dodge(&mut self, dt: f32) {
        let capacity = self.stats.dodge_ability;
        self.dodge = self.dodge.min(capacity);
        if self.dodge_regen_cooldown <= f32::EPSILON && capacity > f32::EPSILON {
            self.dodge = (self.dodge + dt * DODGE_REGENERATION_RATE).clamp(0.0, capacity);
        } else {
            self.dodge_regen_cooldown -= dt;
        }
    }

    pub fn is_deflecting_bullets(&self) -> bool {
        self.is_melee_blocking
            && self.stats.can_deflect
            && self
                .equipped
                .as_ref()
                .is_some_and(|w| w.data.can_deflect_bullets)
    }

    pub fn aim_origin(&self) -> Vec2 {
        self.positioning.aim_origin()
    }

    pub fn aim_direction(&self) -> Vec2 {
        self.positioning.aim_direction(self.aim_target)
    }

    /// Visual center of the body
    pub fn center(&self) -> Vec2 {
        self.positioning.visual_center
    }

    pub fn is_flipped(&self) -> bool {
        self.positioning.flipped
    }

    pub fn play_animation(&mut self, animation: Arc<CharacterAnimation>, speed: f32) -> PlaybackId {
        log::debug!("{} plays '{}' at {:.2}x", self.name, animation.name, speed);
        self.animations.play(animation, speed)
    }

    /// Play the named animation, warning and doing nothing if it is missing
    pub fn play_named(&mut self, registry: &dyn AnimationRegistry, key: &str, speed: f32) -> Option<PlaybackId> {
        match registry.animation(key) {
            Some(animation) => Some(self.play_animation(animation, speed)),
            None => {
                log::warn!("{} cannot play missing animation '{}'", self.name, key);
                None
            }
        }
    }

    /// Alternate between the dodge animations
    pub fn try_dodge_animation(&mut self, registry: &dyn AnimationRegistry) -> Option<PlaybackId> {
        if self.flags.contains(CharacterFlags::INVINCIBLE) || self.is_constrained(AnimationConstraint::PREVENT_DODGE) {
            return None;
        }
        let key = DODGE_ANIMATIONS[self.animation_flip_flop as usize % DODGE_ANIMATIONS.len()];
        let speed = 1.0 / self.stats.dodge_ability.max(0.85);
        self.animation_flip_flop = self.animation_flip_flop.wrapping_add(1);
        self.play_named(registry, key, speed)
    }

    /// Set `alive` from the health of the head and body; returns true on death
    pub fn update_alive_status(&mut self) -> bool {
        if !self.alive || self.is_constrained(AnimationConstraint::PREVENT_DYING) {
            return false;
        }
        let limbs = &self.positioning.limbs;
        if limbs.head().is_dead() || limbs.body().is_dead() {
            self.kill();
            return true;
        }
        false
    }

    pub fn kill(&mut self) {
        if self.alive {
            log::debug!("{} died", self.name);
        }
        self.alive = false;
    }

    /// Subtract `damage` from a body part
    pub fn damage(&mut self, kind: LimbKind, damage: f32) {
        if self.flags.contains(CharacterFlags::INVINCIBLE) || !kind.is_body_part() {
            return;
        }
        let limb = &mut self.positioning.limbs[kind];
        limb.health -= damage;
        log::trace!("{} {:?} took {:.3} damage, {:.3} left", self.name, kind, damage, limb.health);
    }

    /// Let go of the equipped weapon
    pub fn take_weapon(&mut self) -> Option<Weapon> {
        let weapon = self.equipped.take();
        if let Some(weapon) = &weapon {
            log::debug!("{} lets go of {}", self.name, weapon.data.name);
            for kind in LimbKind::HANDS {
                self.positioning.limbs[kind].look = HandLook::Fist;
            }
        }
        weapon
    }

    /// Whether `turn_into_ragdoll` would do anything
    pub fn can_become_ragdoll(&self) -> bool {
        !self.alive && !self.ragdolled && !self.flags.contains(CharacterFlags::NO_RAGDOLL)
    }

    /// One frame of animation, dodge and limb placement while not ragdolled
    pub fn update(&mut self, dt: f32, floor_level: f32) -> Vec<CompletedAnimation> {
        self.regenerate_dodge(dt);
        if self.ragdolled {
            return Vec::new();
        }

        let completed = self.animations.advance(dt);
        let constraints = self.constraints();
        if !constraints.contains(AnimationConstraint::PREVENT_FLIP) {
            self.positioning.flipped = self.aim_target.x < self.positioning.center.x;
        }

        let frame = FrameInput {
            dt,
            aim_target: self.aim_target,
            floor_level,
            walk_acceleration: self.walk_acceleration,
            weapon: self.equipped.as_ref(),
            iron_sighting: self.is_iron_sighting,
            blocking: self.is_melee_blocking,
            recoil_handling_ability: self.stats.recoil_handling_ability,
            constraints,
            overrides: &self.pose_overrides,
        };
        self.positioning.update(&self.animations, &frame);
        completed
    }

    /// Simulate the ragdoll, if any, and move the limbs with it
    pub fn step_ragdoll(&mut self, dt: f32, surface: &impl CollisionSurface) -> crate::Result<u32> {
        let Some(ragdoll) = self.ragdoll.as_mut() else {
            return Ok(0);
        };
        let cycles = self.ragdoll_solver.step_ragdoll(ragdoll, dt, surface)?;
        self.positioning.follow_ragdoll(&ragdoll.limbs);
        Ok(cycles)
    }
}

#[cfg(test)]
mod tests {
    use brawl_anim::{AnimationLibrary, Curve, LimbAnimation};

    use super::*;

    fn character() -> Character {
        let stats = CharacterStats {
            dodge_ability: 1.0,
            ..Default::default()
        };
        Character::new("grunt", stats, Vec2::ZERO)
    }

    fn library() -> AnimationLibrary {
        let mut library = AnimationLibrary::new();
        for name in DODGE_ANIMATIONS {
            library.insert(
                CharacterAnimation::new(name, "dodge")
                    .with_body(LimbAnimation::new(0.5).with_translation(Curve::constant(Vec2::ZERO)))
                    .with_constraint(0.0, AnimationConstraint::PREVENT_DODGE)
                    .build()
                    .unwrap(),
            );
        }
        library
    }

    #[test]
    fn test_character_id_display() {
        assert_eq!(CharacterId { index: 3, generation: 1 }.to_string(), "3v1");
    }

    #[test]
    fn test_drain_dodge_clamps_and_starts_cooldown() {
        let mut c = character();
        c.drain_dodge(0.3);
        assert!((c.dodge - 0.7).abs() < 0.001);
        assert!((c.dodge_regen_cooldown - DODGE_REGENERATION_COOLDOWN).abs() < 0.001);
        c.drain_dodge(5.0);
        assert!(c.dodge.abs() < 0.001);
        assert!(!c.has_dodge());
        assert!(!c.can_dodge());
    }

    #[test]
    fn test_has_dodge_truncates() {
        let mut c = character();
        c.dodge = 0.011;
        assert!(c.has_dodge());
        c.dodge = 0.009;
        assert!(!c.has_dodge());
    }

    #[test]
    fn test_invincible_can_always_dodge() {
        let mut c = character().with_flags(CharacterFlags::default() | CharacterFlags::INVINCIBLE);
        c.dodge = 0.0;
        assert!(c.can_dodge());
    }

    #[test]
    fn test_dodge_regenerates_after_cooldown() {
        let mut c = character();
        c.drain_dodge(1.0);
        c.regenerate_dodge(0.5);
        assert!(c.dodge.abs() < 0.001);
        c.regenerate_dodge(0.5);
        assert!(c.dodge.abs() < 0.001);
        c.regenerate_dodge(0.5);
        assert!((c.dodge - 0.3).abs() < 0.001);
        for _ in 0..10 {
            c.regenerate_dodge(0.5);
        }
        assert!((c.dodge - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_dodge_animation_alternates_and_blocks_dodging() {
        let library = library();
        let mut c = character();
        assert!(c.try_dodge_animation(&library).is_some());
        assert!(c.animations.is_playing_animation("dodge_1"));
        assert!(!c.can_dodge());
        assert!(c.try_dodge_animation(&library).is_none());

        c.animations.stop_all();
        assert!(c.try_dodge_animation(&library).is_some());
        assert!(c.animations.is_playing_animation("dodge_2"));
    }

    #[test]
    fn test_death_by_head_damage() {
        let mut c = character();
        assert!(!c.update_alive_status());
        c.damage(LimbKind::Head, 0.5);
        assert!(c.update_alive_status());
        assert!(!c.alive);
        assert!(c.can_become_ragdoll());
        assert!(!c.update_alive_status());
    }

    #[test]
    fn test_hands_take_no_damage() {
        let mut c = character();
        c.damage(LimbKind::FirstHand, 10.0);
        assert!(!c.update_alive_status());
        assert!(c.alive);
    }

    #[test]
    fn test_deflecting_needs_weapon_and_stat() {
        use crate::weapon::{MeleeDamageType, MeleeSize, WeaponData};

        let mut data = WeaponData::melee("katana", MeleeDamageType::Blade, MeleeSize::Medium, 0.5);
        data.can_deflect_bullets = true;
        let mut c = character().with_weapon(Weapon::new(Arc::new(data)));
        c.is_melee_blocking = true;
        assert!(!c.is_deflecting_bullets());
        c.stats.can_deflect = true;
        assert!(c.is_deflecting_bullets());
    }

    #[test]
    fn test_update_flips_towards_target() {
        let mut c = character();
        c.aim_target = Vec2::new(-500.0, 0.0);
        c.update(1.0 / 60.0, 0.0);
        assert!(c.is_flipped());
    }
}
