//! Picking the death animation that fits a killing hit
//!
//! Death animations live in the [`DEATH_GROUP`] group and are told apart by
//! name: `f_<kind>_*` plays when the hit came from the side the character
//! faces, `b_<kind>_*` when it came from behind.

use std::fmt;
use std::sync::Arc;

use brawl_anim::{AnimationRegistry, CharacterAnimation};
use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::character::Character;
use crate::scene::DEATH_GROUP;

/// Damage intensity a death animation needs to play at all
pub const DEATH_ANIMATION_INTENSITY: f32 = 1.25;
/// Roll chance for bullet and melee kills
pub const DEFAULT_DEATH_CHANCE: f32 = 0.5;
/// Roll chance for kills by a hard impact
pub const IMPACT_DEATH_CHANCE: f32 = 0.9;
/// Hits this close to the body's center height count as body shots
pub const BODY_SHOT_BAND: f32 = 0.2;

/// The hit that killed a character
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathHit {
    /// Travel direction of whatever struck the character
    pub direction: Vec2,
    /// Where it struck, relative to the struck body part; negative y is below its center
    pub local_point: Vec2,
    /// Chance each roll has of letting a death animation play
    pub chance: f32,
}

impl DeathHit {
    pub fn new(direction: Vec2, local_point: Vec2) -> Self {
        Self {
            direction,
            local_point,
            chance: DEFAULT_DEATH_CHANCE,
        }
    }

    #[must_use]
    pub fn with_chance(mut self, chance: f32) -> Self {
        self.chance = chance;
        self
    }
}

impl Default for DeathHit {
    fn default() -> Self {
        Self::new(Vec2::X, Vec2::ZERO)
    }
}

/// Where a killing hit landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathKind {
    Headshot,
    Throatshot,
    Bodyshot,
    Legshot,
}

impl fmt::Display for DeathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Headshot => "headshot",
            Self::Throatshot => "throatshot",
            Self::Bodyshot => "bodyshot",
            Self::Legshot => "legshot",
        };
        f.write_str(label)
    }
}

impl DeathKind {
    pub const ALL: [Self; 4] = [Self::Headshot, Self::Throatshot, Self::Bodyshot, Self::Legshot];

    /// Kind of a body hit, by the height it landed at
    pub fn from_body_hit(local_y: f32) -> Self {
        if local_y.abs() < BODY_SHOT_BAND {
            Self::Bodyshot
        } else if local_y < 0.0 {
            Self::Legshot
        } else {
            Self::Throatshot
        }
    }

    /// Name prefix of the animations for this kind
    pub fn prefix(self, from_front: bool) -> String {
        format!("{}_{}_", if from_front { 'f' } else { 'b' }, self)
    }

    pub fn animations(self, registry: &dyn AnimationRegistry, from_front: bool) -> Vec<Arc<CharacterAnimation>> {
        let prefix = self.prefix(from_front);
        registry
            .group(DEATH_GROUP)
            .into_iter()
            .filter(|a| a.name.starts_with(&prefix))
            .collect()
    }
}

/// `1 / (weakest body part health + 1)`, floored at a divisor of 0.01
pub fn damage_intensity(character: &Character) -> f32 {
    let limbs = &character.positioning.limbs;
    1.0 / (limbs.head().health.min(limbs.body().health) + 1.0).max(0.01)
}

/// Whether the head lost a larger share of its health than the body
pub fn is_head_more_damaged(character: &Character) -> bool {
    let limbs = &character.positioning.limbs;
    let head = limbs.head();
    let body = limbs.body();
    head.health / head.max_health < body.health / body.max_health
}

/// Whether a hit travelling along `direction` came from the side the character faces
pub fn comes_from_front(character: &Character, direction: Vec2) -> bool {
    (direction.x > 0.0) == character.is_flipped()
}

fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    rng.random::<f32>() > 1.0 - chance
}

/// The death animation `hit` calls for, or `None` when the character should just go limp
///
/// Only a damaging enough hit plays one, and only when a roll of `hit.chance`
/// passes. A head that took the worse of it needs a second roll.
pub fn choose_death_animation<R: Rng + ?Sized>(
    registry: &dyn AnimationRegistry,
    character: &Character,
    hit: &DeathHit,
    rng: &mut R,
) -> Option<Arc<CharacterAnimation>> {
    let intensity = damage_intensity(character);
    if intensity <= DEATH_ANIMATION_INTENSITY || !roll(rng, hit.chance) {
        log::trace!("{} dies without animation (intensity {:.2})", character.name, intensity);
        return None;
    }

    let kind = if is_head_more_damaged(character) {
        if !roll(rng, hit.chance) {
            return None;
        }
        DeathKind::Headshot
    } else {
        DeathKind::from_body_hit(hit.local_point.y)
    };
    let from_front = comes_from_front(character, hit.direction);
    let choice = kind.animations(registry, from_front).choose(rng).cloned();
    if choice.is_none() {
        log::warn!("No '{}' death animations for {}", kind.prefix(from_front), character.name);
    }
    choice
}
