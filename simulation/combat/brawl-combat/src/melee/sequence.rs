//! Chained melee attacks
//!
//! A sequence is a list of keys played one after another. Each key names an
//! attack animation, the keyframes at which it connects, and the keyframe from
//! which a buffered follow-up attack may start the next key. Sequences are
//! driven by [`MeleeSequenceState::step`], which tells the caller what to do
//! this frame instead of doing it, so the state can be tested without a scene.

use std::collections::HashMap;
use std::sync::Arc;

use brawl_anim::CharacterAnimation;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::weapon::{MeleeDamageType, Weapon};

/// Past this fraction of the animation the key is treated as finished
const KEY_END: f32 = 0.99;
/// Without a buffered attack the sequence ends once this fraction has played
const KEY_TAIL: f32 = 0.9;

/// One attack within a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceKey {
    /// Animation played when facing right
    pub facing_right: String,
    /// Animation played when facing left
    pub facing_left: String,
    /// Keyframe from which the next key may start; `-1` allows it immediately
    pub transition_frame: i32,
    /// Keyframes at which the attack connects, ascending
    pub hit_frames: Vec<i32>,
}

impl SequenceKey {
    /// A key using the same animation in both directions
    pub fn new(animation: impl Into<String>, transition_frame: i32, hit_frames: impl Into<Vec<i32>>) -> Self {
        let animation = animation.into();
        Self {
            facing_left: animation.clone(),
            facing_right: animation,
            transition_frame,
            hit_frames: hit_frames.into(),
        }
    }

    /// A key with separate animations per facing direction
    pub fn double_sided(
        facing_right: impl Into<String>,
        facing_left: impl Into<String>,
        transition_frame: i32,
        hit_frames: impl Into<Vec<i32>>,
    ) -> Self {
        Self {
            facing_right: facing_right.into(),
            facing_left: facing_left.into(),
            transition_frame,
            hit_frames: hit_frames.into(),
        }
    }

    pub fn animation(&self, facing_right: bool) -> &str {
        if facing_right { &self.facing_right } else { &self.facing_left }
    }
}

/// A named chain of attacks
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct MeleeSequence {
    pub name: String,
    pub keys: Vec<SequenceKey>,
}

impl MeleeSequence {
    pub fn new(name: impl Into<String>, keys: impl Into<Vec<SequenceKey>>) -> Self {
        Self {
            name: name.into(),
            keys: keys.into(),
        }
    }
}

/// Sequences by name
#[derive(Debug, Clone, Default)]
pub struct MeleeSequenceLibrary {
    sequences: HashMap<String, Arc<MeleeSequence>>,
}

impl MeleeSequenceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sequence: MeleeSequence) -> Arc<MeleeSequence> {
        let sequence = Arc::new(sequence);
        if self
            .sequences
            .insert(sequence.name.clone(), Arc::clone(&sequence))
            .is_some()
        {
            log::warn!("Replacing melee sequence '{}'", sequence.name);
        }
        sequence
    }

    pub fn get(&self, name: &str) -> Option<Arc<MeleeSequence>> {
        self.sequences.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Sequence names a character picks from, per weapon kind
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct MeleeSequenceNames {
    pub unarmed: Vec<String>,
    pub sword: Vec<String>,
    pub two_handed: Vec<String>,
    pub blunt: Vec<String>,
    pub two_handed_gun: Vec<String>,
    pub one_handed_gun: Vec<String>,
}

impl Default for MeleeSequenceNames {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            unarmed: names(&["unarmed_adept"]),
            sword: names(&["sword_adept_2", "sword_adept"]),
            two_handed: names(&["twohanded_blunt"]),
            blunt: names(&["blunt"]),
            two_handed_gun: names(&["twohanded_gun"]),
            one_handed_gun: names(&["onehanded_gun"]),
        }
    }
}

impl MeleeSequenceNames {
    /// Candidate sequences for the equipped weapon
    pub fn candidates(&self, weapon: Option<&Weapon>) -> &[String] {
        let Some(weapon) = weapon else {
            return &self.unarmed;
        };
        let two_handed = weapon.hold_points.len() == 2;
        match weapon.data.melee_damage_type {
            MeleeDamageType::Blade => &self.sword,
            MeleeDamageType::Axe => &self.blunt,
            MeleeDamageType::Firearm if two_handed => &self.two_handed_gun,
            MeleeDamageType::Firearm => &self.one_handed_gun,
            MeleeDamageType::Blunt if two_handed => &self.two_handed,
            MeleeDamageType::Blunt => &self.blunt,
        }
    }

    /// Pick a random candidate
    pub fn pick<R: Rng + ?Sized>(&self, weapon: Option<&Weapon>, rng: &mut R) -> Option<&str> {
        self.candidates(weapon).choose(rng).map(String::as_str)
    }
}

/// Attack speed for a character, faster with skill and slower with size
pub fn melee_speed(melee_skill: f32, scale: f32) -> f32 {
    (1.0 + melee_skill / 3.0) / scale
}

/// What the owner of a sequence should do this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceStep {
    /// The sequence ended; detach it
    Finished,
    /// Start the given key's animation and report it with [`MeleeSequenceState::started`]
    Play(SequenceKey),
    /// The attack is playing; `hit` is set when a hit frame was reached, with
    /// whether it belongs to the last key
    Attack { hit: Option<bool> },
}

#[derive(Debug, Clone)]
struct CurrentAttack {
    animation: Arc<CharacterAnimation>,
    max_key_count: usize,
}

/// A sequence in progress on one character
#[derive(Debug, Clone)]
pub struct MeleeSequenceState {
    pub sequence: Arc<MeleeSequence>,
    pub current_index: usize,
    pub complete: bool,
    /// A follow-up attack was requested during the current key
    pub can_continue: bool,
    pub speed: f32,
    pub hit_frames_spent: usize,
    pub animation_timer: f32,
    current: Option<CurrentAttack>,
}

impl MeleeSequenceState {
    pub fn new(sequence: Arc<MeleeSequence>, speed: f32) -> Self {
        Self {
            sequence,
            current_index: 0,
            complete: false,
            can_continue: false,
            speed,
            hit_frames_spent: 0,
            animation_timer: 0.0,
            current: None,
        }
    }

    /// Record the animation started for the current key
    pub fn started(&mut self, animation: Arc<CharacterAnimation>) {
        let max_key_count = animation.max_key_count();
        self.current = Some(CurrentAttack {
            animation,
            max_key_count,
        });
    }

    /// Keyframe the current attack has reached
    pub fn current_frame(&self) -> Option<i32> {
        let current = self.current.as_ref()?;
        let total = current.animation.total_duration();
        if total <= f32::EPSILON {
            return Some(0);
        }
        Some((self.animation_timer / total * current.max_key_count as f32).ceil() as i32)
    }

    /// Advance by `dt` and report what should happen
    pub fn step(&mut self, dt: f32) -> SequenceStep {
        let key_count = self.sequence.keys.len();
        if self.complete || key_count == 0 {
            return SequenceStep::Finished;
        }
        let key_index = self.current_index % key_count;
        let is_last = key_index == key_count - 1;
        let key = &self.sequence.keys[key_index];

        let total = match &self.current {
            Some(current) => current.animation.total_duration(),
            None => 0.0,
        };
        let Some(frame) = self
            .current_frame()
            .filter(|_| self.animation_timer < total * KEY_END)
        else {
            self.can_continue = false;
            self.hit_frames_spent = 0;
            self.animation_timer = 0.0;
            return SequenceStep::Play(key.clone());
        };

        let mut hit = None;
        if let Some(&hit_frame) = key.hit_frames.get(self.hit_frames_spent)
            && frame >= hit_frame
        {
            self.hit_frames_spent += 1;
            hit = Some(is_last);
        }

        if self.animation_timer > total * KEY_TAIL && !self.can_continue {
            self.complete = true;
            return SequenceStep::Attack { hit };
        }

        if frame >= key.transition_frame {
            if self.current_index + 1 == key_count {
                self.complete = true;
                return SequenceStep::Attack { hit };
            }
            if self.can_continue {
                self.current = None;
                self.current_index += 1;
            }
        }

        self.animation_timer += dt * self.speed;
        SequenceStep::Attack { hit }
    }
}
