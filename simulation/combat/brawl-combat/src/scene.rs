//! The scene aggregate: characters, props, loose weapons and deferred tasks
//!
//! A frame runs in a fixed order: every character is animated and posed, then
//! melee sequences fire their hits, then ragdolls are simulated, and finally
//! deferred tasks run. Melee hits mutate their victim synchronously.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use brawl_anim::{AnimationConstraint, AnimationRegistry, CharacterAnimation, HandLook};
use brawl_ragdoll::build_ragdoll;
use glam::Vec2;
use rand::Rng;

use crate::character::{Character, CharacterFlags, CharacterId, ImpactOffset, LimbKind};
use crate::death::{DeathHit, choose_death_animation};
use crate::error::{CombatError, Result};
use crate::event::CombatEvent;
use crate::melee::{MeleeSequenceLibrary, MeleeSequenceState, SequenceStep, melee_speed};
use crate::schedule::Scheduler;
use crate::session::Session;
use crate::tuning::CombatTuning;
use crate::weapon::{LooseWeapon, Weapon};
use crate::world::{Collider, CollisionLayers, EntityId, PhysicsWorld, Rect, Terrain, TerrainSurface};

/// Group holding the death animations
pub const DEATH_GROUP: &str = "deaths";
/// Interval limb motion is measured over when seeding a ragdoll
pub const RAGDOLL_MEASURE_INTERVAL: f32 = 1.0 / 100.0;
/// Delay before the death music starts in a player death sequence
pub const DEATH_MUSIC_DELAY: f32 = 1.0;

/// A character limb registered as a physics entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyPart {
    pub character: CharacterId,
    pub limb: LimbKind,
}

/// A static object that shakes when struck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prop {
    pub rect: Rect,
    /// Local point the prop rotates around, in units of its size
    pub pivot: Vec2,
    pub impact: ImpactOffset,
}

/// State of the running player death sequence
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerDeathSequence {
    /// Seconds since the sequence started
    pub time: f32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    character: Option<Character>,
}

/// Everything the combat core simulates
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    body_parts: HashMap<EntityId, BodyPart>,
    props: HashMap<EntityId, Prop>,
    next_entity: u64,
    pub loose_weapons: Vec<LooseWeapon>,
    pub session: Session,
    pub tuning: CombatTuning,
    pub(crate) animations: Arc<dyn AnimationRegistry>,
    sequences: Arc<MeleeSequenceLibrary>,
    pub(crate) terrain: Box<dyn Terrain>,
    scheduler: Scheduler<Scene>,
    pub(crate) events: Vec<CombatEvent>,
    player_death: Option<PlayerDeathSequence>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("characters", &self.len())
            .field("props", &self.props.len())
            .field("loose_weapons", &self.loose_weapons.len())
            .field("session", &self.session)
            .field("scheduler", &self.scheduler)
            .field("player_death", &self.player_death)
            .finish_non_exhaustive()
    }
}

impl Scene {
    pub fn new(
        animations: Arc<dyn AnimationRegistry>,
        sequences: Arc<MeleeSequenceLibrary>,
        terrain: Box<dyn Terrain>,
    ) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            body_parts: HashMap::new(),
            props: HashMap::new(),
            // Low ids are left for level geometry
            next_entity: 1000,
            loose_weapons: Vec::new(),
            session: Session::default(),
            tuning: CombatTuning::default(),
            animations,
            sequences,
            terrain,
            scheduler: Scheduler::new(),
            events: Vec::new(),
            player_death: None,
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn with_tuning(mut self, tuning: CombatTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn registry(&self) -> &dyn AnimationRegistry {
        self.animations.as_ref()
    }

    pub fn terrain(&self) -> &dyn Terrain {
        self.terrain.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler<Self> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<Self> {
        &mut self.scheduler
    }

    fn allocate_entity(&mut self) -> EntityId {
        let entity = EntityId(self.next_entity);
        self.next_entity += 1;
        entity
    }

    /// Add a character, registering its head and body as physics entities
    pub fn spawn(&mut self, mut character: Character) -> CharacterId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let id = CharacterId {
            index,
            generation: self.slots[index as usize].generation,
        };

        character.attack_ignore.clear();
        for kind in LimbKind::ALL {
            let entity = self.allocate_entity();
            character.positioning.limbs[kind].entity = Some(entity);
            character.attack_ignore.insert(entity);
            if kind.is_body_part() {
                self.body_parts.insert(entity, BodyPart { character: id, limb: kind });
            }
        }

        log::debug!("Spawned {} as {}", character.name, id);
        self.slots[index as usize].character = Some(character);
        id
    }

    /// Remove a character; its id and every task holding it go stale
    pub fn despawn(&mut self, id: CharacterId) -> Result<Character> {
        self.get(id)?;
        let slot = &mut self.slots[id.index as usize];
        let character = slot.character.take().ok_or(CombatError::StaleCharacter(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.body_parts.retain(|_, part| part.character != id);
        log::debug!("Despawned {} ({})", character.name, id);
        Ok(character)
    }

    pub fn get(&self, id: CharacterId) -> Result<&Character> {
        let slot = self
            .slots
            .get(id.index as usize)
            .ok_or(CombatError::UnknownCharacter(id))?;
        if slot.generation != id.generation {
            return Err(CombatError::StaleCharacter(id));
        }
        slot.character.as_ref().ok_or(CombatError::StaleCharacter(id))
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Result<&mut Character> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .ok_or(CombatError::UnknownCharacter(id))?;
        if slot.generation != id.generation {
            return Err(CombatError::StaleCharacter(id));
        }
        slot.character.as_mut().ok_or(CombatError::StaleCharacter(id))
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.get(id).is_ok()
    }

    /// Two distinct characters borrowed at once
    pub fn pair_mut(&mut self, a: CharacterId, b: CharacterId) -> Result<(&mut Character, &mut Character)> {
        if a == b {
            return Err(CombatError::SameCharacter(a));
        }
        self.get(a)?;
        self.get(b)?;
        let (low, high, swapped) = if a.index < b.index { (a, b, false) } else { (b, a, true) };
        let (head, tail) = self.slots.split_at_mut(high.index as usize);
        let first = head[low.index as usize]
            .character
            .as_mut()
            .ok_or(CombatError::StaleCharacter(low))?;
        let second = tail[0]
            .character
            .as_mut()
            .ok_or(CombatError::StaleCharacter(high))?;
        Ok(if swapped { (second, first) } else { (first, second) })
    }

    /// Ids of every live slot, in slot order
    pub fn ids(&self) -> Vec<CharacterId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.character.is_some())
            .map(|(index, slot)| CharacterId {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }

    pub fn characters(&self) -> impl Iterator<Item = (CharacterId, &Character)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.character.as_ref().map(|c| {
                (
                    CharacterId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    c,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.character.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn body_part(&self, entity: EntityId) -> Option<BodyPart> {
        self.body_parts.get(&entity).copied()
    }

    /// Add a prop that reacts to melee hits
    pub fn add_prop(&mut self, rect: Rect) -> EntityId {
        let entity = self.allocate_entity();
        self.props.insert(
            entity,
            Prop {
                rect,
                pivot: Vec2::ZERO,
                impact: ImpactOffset::default(),
            },
        );
        entity
    }

    pub fn prop(&self, entity: EntityId) -> Option<&Prop> {
        self.props.get(&entity)
    }

    pub(crate) fn prop_mut(&mut self, entity: EntityId) -> Option<&mut Prop> {
        self.props.get_mut(&entity)
    }

    /// Hit boxes of every standing character and prop, for syncing a physics world
    pub fn colliders(&self) -> Vec<Collider> {
        let mut colliders = Vec::new();
        for (_, character) in self.characters().filter(|(_, c)| !c.ragdolled) {
            let limbs = &character.positioning.limbs;
            let head = limbs.head();
            let body = limbs.body();
            if let Some(entity) = head.entity {
                colliders.push(Collider {
                    entity,
                    rect: Rect::from_center(head.position, head.size),
                    layers: character.layer,
                });
            }
            if let Some(entity) = body.entity {
                colliders.push(Collider {
                    entity,
                    rect: Rect::from_center(character.positioning.visual_center, body.size),
                    layers: character.layer,
                });
            }
        }
        colliders.extend(self.props.iter().map(|(&entity, prop)| Collider {
            entity,
            rect: prop.rect,
            layers: CollisionLayers::PROPS,
        }));
        colliders
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Invalidate every deferred task, e.g. when the level restarts
    pub fn advance_epoch(&mut self) -> u64 {
        self.session.epoch = self.scheduler.advance_epoch();
        self.session.epoch
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.scheduler.set_paused(paused);
    }

    /// Move a character's weapon into the scene
    pub fn drop_weapon(&mut self, id: CharacterId, velocity: Vec2) -> Result<Option<Weapon>> {
        let character = self.get_mut(id)?;
        let position = character.positioning.limbs[LimbKind::FirstHand].position;
        let Some(weapon) = character.take_weapon() else {
            return Ok(None);
        };
        self.place_loose_weapon(id, weapon.clone(), position, velocity);
        Ok(Some(weapon))
    }

    pub(crate) fn place_loose_weapon(&mut self, owner: CharacterId, weapon: Weapon, position: Vec2, velocity: Vec2) {
        self.events.push(CombatEvent::WeaponDropped {
            character: owner,
            weapon: weapon.data.name.clone(),
            position,
        });
        self.loose_weapons.push(LooseWeapon {
            weapon,
            position,
            velocity,
        });
    }

    /// Start a melee attack, or buffer a follow-up if one is running
    pub fn try_perform_melee_attack<R: Rng + ?Sized>(&mut self, id: CharacterId, rng: &mut R) -> Result<bool> {
        let sequences = Arc::clone(&self.sequences);
        let character = self.get_mut(id)?;
        if !character.alive || character.ragdolled || character.is_constrained(AnimationConstraint::PREVENT_MELEE) {
            return Ok(false);
        }
        let speed = melee_speed(character.stats.melee_skill, character.stats.scale);
        character.animation_flip_flop = character.animation_flip_flop.wrapping_add(1);

        if let Some(state) = character.melee_sequence.as_mut() {
            state.can_continue = true;
            return Ok(true);
        }

        let Some(name) = character
            .stats
            .melee_sequences
            .pick(character.equipped.as_ref(), rng)
            .map(str::to_string)
        else {
            return Ok(false);
        };
        let Some(sequence) = sequences.get(&name) else {
            log::warn!("{} has no melee sequence named '{}'", character.name, name);
            return Ok(false);
        };
        log::debug!("{} starts melee sequence '{}'", character.name, name);
        character.melee_sequence = Some(MeleeSequenceState::new(sequence, speed));
        Ok(true)
    }

    /// Advance every running melee sequence by one frame
    fn update_melee_sequences<R: Rng + ?Sized>(&mut self, physics: &dyn PhysicsWorld, rng: &mut R, dt: f32) {
        for id in self.ids() {
            if let Err(e) = self.update_melee_sequence(physics, rng, id, dt) {
                log::error!("Melee sequence of {} failed: {}", id, e);
            }
        }
    }

    fn update_melee_sequence<R: Rng + ?Sized>(
        &mut self,
        physics: &dyn PhysicsWorld,
        rng: &mut R,
        id: CharacterId,
        dt: f32,
    ) -> Result<()> {
        let registry = Arc::clone(&self.animations);
        let character = self.get_mut(id)?;
        let blocked =
            !character.alive || character.ragdolled || character.is_constrained(AnimationConstraint::PREVENT_MELEE);
        let facing_right = !character.is_flipped();
        let Some(state) = character.melee_sequence.as_mut() else {
            return Ok(());
        };
        if blocked {
            character.melee_sequence = None;
            return Ok(());
        }

        match state.step(dt) {
            SequenceStep::Finished => character.melee_sequence = None,
            SequenceStep::Play(key) => {
                let speed = state.speed;
                let name = key.animation(facing_right);
                match registry.animation(name) {
                    Some(animation) => {
                        state.started(Arc::clone(&animation));
                        character.play_animation(animation, speed);
                    }
                    None => {
                        log::warn!("Melee sequence animation '{}' is missing", name);
                        character.melee_sequence = None;
                    }
                }
            }
            SequenceStep::Attack { hit: Some(last) } => {
                self.perform_hit_frame(physics, rng, id, last)?;
            }
            SequenceStep::Attack { hit: None } => {}
        }
        Ok(())
    }

    fn update_player_death(&mut self, dt: f32) {
        if let Some(sequence) = self.player_death.as_mut() {
            sequence.time += dt;
        }
    }

    pub fn player_death_sequence(&self) -> Option<&PlayerDeathSequence> {
        self.player_death.as_ref()
    }

    /// Begin the player death sequence; only one may run at a time
    pub fn start_player_death_sequence(&mut self) -> Result<()> {
        if self.player_death.is_some() {
            return Err(CombatError::PlayerDeathSequenceActive);
        }
        self.player_death = Some(PlayerDeathSequence::default());
        self.events.push(CombatEvent::PlayerDeathSequenceStarted);
        self.scheduler.after(DEATH_MUSIC_DELAY, |scene: &mut Self| {
            if scene.player_death.is_some() {
                scene.events.push(CombatEvent::DeathMusicCue);
            }
        });
        log::debug!("Player death sequence started");
        Ok(())
    }

    /// End the player death sequence, e.g. on revive
    pub fn end_player_death_sequence(&mut self) -> bool {
        self.player_death.take().is_some()
    }

    /// Hand a dead character over to a ragdoll
    ///
    /// Every node is pushed by `velocity` plus a spin of `torque` around the
    /// body center. Returns false when the character cannot become a ragdoll.
    pub fn turn_into_ragdoll(&mut self, id: CharacterId, velocity: Vec2, torque: f32) -> Result<bool> {
        let character = self.get_mut(id)?;
        if !character.can_become_ragdoll() {
            return Ok(false);
        }
        let mut ragdoll = build_ragdoll(&character.positioning.ragdoll_seed(RAGDOLL_MEASURE_INTERVAL))?;
        let center = character.center();
        for node in &mut ragdoll.graph.nodes {
            let offset = node.position - center;
            let spin = Vec2::new(-offset.y, offset.x).normalize_or_zero();
            node.acceleration += spin * torque + velocity;
        }

        character.ragdolled = true;
        character.ragdoll = Some(ragdoll);
        character.melee_sequence = None;
        character.walk_acceleration = Vec2::ZERO;
        character.delete_ragdoll = character.flags.contains(CharacterFlags::DELETE_RAGDOLL);
        for kind in LimbKind::HANDS {
            character.positioning.limbs[kind].look = HandLook::Open;
        }
        log::debug!("{} turned into a ragdoll", character.name);

        self.drop_weapon(id, Vec2::ZERO)?;
        self.events.push(CombatEvent::Ragdolled { character: id });
        Ok(true)
    }

    /// Kill a character and play out its death
    ///
    /// A death animation fitting `hit` plays when the hit was hard enough and
    /// its chance rolls pass; otherwise the character becomes a ragdoll right
    /// away. Returns true when an animation started or the character went limp.
    pub fn try_start_death_sequence<R: Rng + ?Sized>(
        &mut self,
        id: CharacterId,
        hit: &DeathHit,
        rng: &mut R,
    ) -> Result<bool> {
        let character = self.get_mut(id)?;
        if character.is_constrained(AnimationConstraint::PREVENT_DYING) {
            return Ok(false);
        }
        character.kill();
        character.walk_acceleration = Vec2::ZERO;
        let prevent_ragdoll = character.is_constrained(AnimationConstraint::PREVENT_RAGDOLL);
        let flying = character.positioning.is_flying();

        if character.is_constrained(AnimationConstraint::PREVENT_DEATH_ANIMATION)
            || flying
            || character.is_player
            || character.animations.is_playing_group(DEATH_GROUP)
        {
            let well_underway = character
                .animations
                .main()
                .is_some_and(|main| main.unscaled_timer() > main.animation().total_duration() * 0.2);
            if flying || (!prevent_ragdoll && (character.is_player || well_underway)) {
                return self.turn_into_ragdoll(id, Vec2::ZERO, 0.0);
            }
            return Ok(false);
        }

        let character = self.get(id)?;
        match choose_death_animation(self.animations.as_ref(), character, hit, rng) {
            Some(animation) => self.play_death_animation(id, animation),
            None if !prevent_ragdoll => self.turn_into_ragdoll(id, Vec2::ZERO, 0.0),
            None => Ok(false),
        }
    }

    /// Play `animation` as the death of a dead character
    ///
    /// The character drops its weapon and goes limp instead if the ground
    /// under it is not flat. Once the animation runs to its end a player
    /// becomes a ragdoll and anyone else is stamped and removed.
    pub fn play_death_animation(&mut self, id: CharacterId, animation: Arc<CharacterAnimation>) -> Result<bool> {
        self.drop_weapon(id, Vec2::ZERO)?;
        let x = self.get(id)?.center().x;
        if !self.terrain.is_flat_at(x) {
            return self.turn_into_ragdoll(id, Vec2::ZERO, 0.0);
        }

        let character = self.get_mut(id)?;
        character.animations.stop_all();
        character.death_animation = Some(character.play_animation(Arc::clone(&animation), 1.0));
        self.events.push(CombatEvent::DeathAnimation {
            character: id,
            animation: animation.name.clone(),
        });

        self.scheduler.for_duration(animation.total_duration(), move |scene: &mut Self, _dt| {
            let Ok(character) = scene.get(id) else {
                return;
            };
            if character.ragdolled || character.is_constrained(AnimationConstraint::PREVENT_RAGDOLL) {
                return;
            }
            if !scene.terrain.is_flat_at(character.positioning.visual_center.x)
                && let Err(e) = scene.turn_into_ragdoll(id, Vec2::ZERO, 0.0)
            {
                log::error!("Failed to ragdoll {} off uneven ground: {}", id, e);
            }
        });
        Ok(true)
    }

    /// A death animation ran to its end
    fn finish_death_animation(&mut self, id: CharacterId) -> Result<()> {
        let character = self.get(id)?;
        if character.ragdolled {
            return Ok(());
        }
        if character.is_player {
            self.turn_into_ragdoll(id, Vec2::ZERO, 0.0)?;
        } else {
            self.despawn(id)?;
            self.events.push(CombatEvent::Stamped { character: id });
        }
        Ok(())
    }

    /// Animate and pose one character, reporting whether its death animation ended
    fn update_character(&mut self, id: CharacterId, dt: f32) -> Result<bool> {
        let floor = self.terrain.floor_level_at(self.get(id)?.positioning.center.x);
        let character = self.get_mut(id)?;
        let completed = character.update(dt, floor);
        let Some(death) = character.death_animation else {
            return Ok(false);
        };
        if completed.iter().any(|c| c.id == death) {
            character.death_animation = None;
            return Ok(true);
        }
        Ok(false)
    }

    /// One frame of the whole scene
    ///
    /// A failure tied to one character is logged and the frame goes on for
    /// everyone else.
    pub fn update<R: Rng + ?Sized>(&mut self, physics: &dyn PhysicsWorld, rng: &mut R, dt: f32) -> Result<()> {
        let mut finished = Vec::new();
        for id in self.ids() {
            match self.update_character(id, dt) {
                Ok(true) => finished.push(id),
                Ok(false) => {}
                Err(e) => log::error!("Failed to update {}: {}", id, e),
            }
        }
        for id in finished {
            if let Err(e) = self.finish_death_animation(id) {
                log::error!("Failed to finish the death animation of {}: {}", id, e);
            }
        }

        self.update_melee_sequences(physics, rng, dt);

        for id in self.ids() {
            let terrain = self.terrain.as_ref();
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                continue;
            };
            if let Some(character) = slot.character.as_mut().filter(|c| c.ragdolled)
                && let Err(e) = character.step_ragdoll(dt, &TerrainSurface(terrain))
            {
                log::error!("Failed to step the ragdoll of {}: {}", id, e);
            }
        }

        for prop in self.props.values_mut() {
            prop.impact.decay(dt);
        }
        self.update_player_death(dt);

        self.scheduler.advance(dt);
        let mut due = self.scheduler.take_pending();
        due.run_due(self, dt);
        self.scheduler.merge(due);
        Ok(())
    }
}
