//! Resolving a single melee hit
//!
//! A hit is a raycast from the attacker along its aim. Whatever it strikes
//! first gets shoved. If that is a character, the exchange is decided in this
//! order: parry, block or stun through the block, player dodge, and finally
//! damage, after which the victim either reacts or dies.

use std::sync::Arc;

use brawl_anim::AnimationConstraint;
use brawl_anim::math::rotate_point;
use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::matchup::{MeleeInteractionResponse, block_response};
use crate::character::{CharacterFlags, CharacterId, LimbKind};
use crate::error::Result;
use crate::event::CombatEvent;
use crate::scene::{BodyPart, Scene};
use crate::weapon::{Weapon, WeaponData};
use crate::world::{CollisionLayers, PhysicsWorld, RaycastHit};

const HIT_REACTIONS: [&str; 2] = ["hit_enemy_1", "hit_enemy_2"];
const LIGHT_STUN_FORWARDS: &str = "stun_light_forwards";
const LIGHT_STUN_BACKWARDS: [&str; 2] = ["stun_light_backwards", "stun_light_backwards2"];
const HEAVY_STUN_FORWARDS: &str = "stun_heavy_forwards";
const HEAVY_STUN_BACKWARDS: [&str; 2] = ["stun_heavy_backwards", "stun_heavy_backwards2"];
const WALL_STUN_FORWARDS: &str = "stun_wall_heavy_forwards";
const WALL_STUN_BACKWARDS: &str = "stun_wall_heavy_backwards";
const STUN_GROUP: &str = "stun";

/// Stun played on whoever gets their swing parried or blocked through
fn sword_stun(flipped: bool) -> &'static str {
    if flipped { "melee_stun_sword_R" } else { "melee_stun_sword_L" }
}

/// Parameters of one melee hit
#[derive(Debug, Clone, PartialEq)]
pub struct MeleeHit {
    pub actor: CharacterId,
    pub origin: Vec2,
    pub direction: Vec2,
    /// Reach before the overreach from tuning is added
    pub distance: f32,
    pub damage: f32,
    /// Layers that can be struck; level geometry always blocks
    pub mask: CollisionLayers,
    /// The attacking weapon, `None` for fists
    pub weapon: Option<Arc<WeaponData>>,
    /// Last hit of an unarmed sequence
    pub final_attack: bool,
}

/// How a melee hit ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeleeOutcome {
    /// Nothing within reach
    Missed,
    /// Struck level geometry or a prop
    Obstructed,
    /// Struck a character that does not react to melee right now
    Ignored { victim: CharacterId },
    /// The victim parried; the attacker is stunned and may have lost its weapon
    Parried { victim: CharacterId, disarmed: bool },
    Blocked { victim: CharacterId },
    /// The attack broke through the block
    StunnedThroughBlock { victim: CharacterId },
    Dodged { victim: CharacterId },
    Hit {
        victim: CharacterId,
        limb: LimbKind,
        killed: bool,
    },
}

impl Scene {
    /// Attack with the current weapon at a sequence hit frame
    pub(crate) fn perform_hit_frame<R: Rng + ?Sized>(
        &mut self,
        physics: &dyn PhysicsWorld,
        rng: &mut R,
        actor: CharacterId,
        last_in_sequence: bool,
    ) -> Result<MeleeOutcome> {
        let tuning = self.tuning;
        let character = self.get(actor)?;
        let scale = character.stats.scale;
        let skill = character.stats.melee_skill;
        let multiplier = scale.powi(8);
        let weapon = character.equipped.as_ref().map(|w| Arc::clone(&w.data));

        let (distance, damage, final_attack) = match weapon.as_deref() {
            Some(data) if data.is_melee() => (data.range * scale, data.damage * multiplier, false),
            Some(data) => {
                let base = if data.throwable_heavy {
                    tuning.heavy_firearm_melee_damage
                } else {
                    tuning.firearm_melee_damage
                };
                (data.range * scale, base * skill * multiplier, false)
            }
            None => (
                tuning.unarmed_range * scale,
                tuning.unarmed_damage * skill * multiplier,
                last_in_sequence,
            ),
        };

        let hit = MeleeHit {
            actor,
            origin: character.aim_origin(),
            direction: character.aim_direction(),
            distance,
            damage,
            mask: character.enemy_layers,
            weapon,
            final_attack,
        };
        self.do_melee_hit(physics, rng, &hit)
    }

    /// Resolve one melee hit
    pub fn do_melee_hit<R: Rng + ?Sized>(
        &mut self,
        physics: &dyn PhysicsWorld,
        rng: &mut R,
        hit: &MeleeHit,
    ) -> Result<MeleeOutcome> {
        let tuning = self.tuning;
        let registry = Arc::clone(&self.animations);
        let actor_id = hit.actor;
        let direction = hit.direction.normalize_or_zero();

        let (actor_skill, ray) = {
            let actor = self.get(actor_id)?;
            let ray = physics.raycast(
                hit.origin,
                direction,
                hit.distance + tuning.melee_overreach,
                hit.mask | CollisionLayers::BLOCK_PHYSICS,
                &actor.attack_ignore,
            );
            (actor.stats.melee_skill, ray)
        };
        let Some(ray) = ray else {
            log::trace!("Melee hit by {} found nothing", actor_id);
            return Ok(MeleeOutcome::Missed);
        };

        let part = self.body_part(ray.entity).filter(|p| self.contains(p.character));
        self.shove_struck_entity(&ray, part, direction, actor_skill);

        let Some(part) = part else {
            if self.prop(ray.entity).is_some() {
                self.events.push(CombatEvent::PropStruck {
                    actor: actor_id,
                    entity: ray.entity,
                    position: ray.position,
                });
            }
            return Ok(MeleeOutcome::Obstructed);
        };
        let victim_id = part.character;

        {
            let victim = self.get(victim_id)?;
            if !victim.flags.contains(CharacterFlags::ATTACK_RESPONSE_MELEE)
                || victim.is_constrained(AnimationConstraint::PREVENT_BEING_MELEED)
                || (victim.is_player && self.session.player_invulnerable)
            {
                return Ok(MeleeOutcome::Ignored { victim: victim_id });
            }
        }

        let mut events = Vec::new();
        let mut dropped: Vec<(CharacterId, Weapon, Vec2, Vec2)> = Vec::new();
        let (actor, victim) = self.pair_mut(actor_id, victim_id)?;
        // Matchups and dodges go by what the actor holds, not the swing's weapon
        let actor_armed = actor.has_weapon();

        if victim.is_melee_blocking && victim.can_dodge() {
            if victim.has_weapon() && victim.positioning.block_progress < 1.0 && !actor.is_player {
                actor.dodge = 0.0;
                actor.dodge_regen_cooldown = tuning.perfect_block_cooldown;
                let disarmed = rng.random::<f32>() > actor.stats.melee_skill;
                if disarmed {
                    let position = actor.positioning.limbs[LimbKind::FirstHand].position;
                    if let Some(weapon) = actor.take_weapon() {
                        dropped.push((actor_id, weapon, position, Vec2::ZERO));
                    }
                }
                actor.play_named(registry.as_ref(), sword_stun(actor.is_flipped()), 1.0);

                let positioning = &mut victim.positioning;
                positioning.block_impact_intensity += tuning.parry_impact_intensity;
                positioning.block_progress += (1.0 - positioning.block_progress) * tuning.perfect_block_lerp;
                positioning.tilt += tuning.parry_impact_tilt;

                log::debug!("{} parried {} (disarmed: {})", victim.name, actor.name, disarmed);
                events.push(CombatEvent::Parried {
                    actor: actor_id,
                    victim: victim_id,
                    disarmed,
                });
                self.finish_hit(events, dropped);
                return Ok(MeleeOutcome::Parried {
                    victim: victim_id,
                    disarmed,
                });
            }

            let actor_weapon = actor.equipped.as_ref().map(|w| w.data.as_ref());
            let victim_weapon = victim.equipped.as_ref().map(|w| w.data.as_ref());
            match block_response(actor_weapon, victim_weapon) {
                MeleeInteractionResponse::BlockVictim => {
                    victim.drain_dodge(hit.damage * tuning.block_drain);
                    victim.positioning.block_impact_intensity += rng.random_range(-1.0..1.0);
                    victim.positioning.tilt += tuning.block_impact_tilt;
                    log::debug!("{} blocked {}", victim.name, actor.name);
                    events.push(CombatEvent::Clash {
                        actor: actor_id,
                        victim: victim_id,
                        position: ray.position,
                        stunned: false,
                    });
                    self.finish_hit(events, dropped);
                    return Ok(MeleeOutcome::Blocked { victim: victim_id });
                }
                MeleeInteractionResponse::StunVictim => {
                    victim.drain_dodge(hit.damage * tuning.stun_drain);
                    let stun = sword_stun(victim.is_flipped());
                    victim.play_named(registry.as_ref(), stun, 1.0);
                    victim.positioning.block_impact_intensity += rng.random_range(-1.0..1.0);
                    log::debug!("{} broke through the block of {}", actor.name, victim.name);
                    events.push(CombatEvent::Clash {
                        actor: actor_id,
                        victim: victim_id,
                        position: ray.position,
                        stunned: true,
                    });
                    events.push(CombatEvent::Stunned {
                        character: victim_id,
                        animation: stun.to_string(),
                    });
                    self.finish_hit(events, dropped);
                    return Ok(MeleeOutcome::StunnedThroughBlock { victim: victim_id });
                }
                MeleeInteractionResponse::Invalid | MeleeInteractionResponse::Unobstructed => {}
            }
        }

        if victim.is_player && actor_armed && victim.can_dodge() {
            victim.drain_dodge(hit.damage * tuning.player_dodge_drain);
            if victim.dodge > 0.0 || victim.stats.dodge_oversaturate {
                victim.try_dodge_animation(registry.as_ref());
                events.push(CombatEvent::Dodged {
                    actor: actor_id,
                    victim: victim_id,
                });
                self.finish_hit(events, dropped);
                return Ok(MeleeOutcome::Dodged { victim: victim_id });
            }
        }

        if hit.weapon.is_none() && victim.is_player && victim.can_dodge() {
            victim.drain_dodge(hit.damage);
        } else {
            victim.damage(part.limb, hit.damage);
        }
        events.push(CombatEvent::Hit {
            actor: actor_id,
            victim: victim_id,
            limb: part.limb,
            damage: hit.damage,
            position: ray.position,
        });

        if !victim.is_player
            && !hit.final_attack
            && victim.flags.contains(CharacterFlags::STUN_ANIMATION_ON_NON_FATAL_SHOT)
            && victim.dodge < tuning.light_stun_dodge_threshold
        {
            let forwards = (victim.center().x > actor.center().x) != victim.is_flipped();
            let stun = if forwards {
                LIGHT_STUN_FORWARDS
            } else {
                LIGHT_STUN_BACKWARDS.choose(rng).copied().unwrap_or(LIGHT_STUN_FORWARDS)
            };
            victim.play_named(registry.as_ref(), stun, tuning.light_stun_speed);
        }

        if hit.weapon.as_ref().is_some_and(|w| w.melee_damage_type.is_sharp()) {
            events.push(CombatEvent::Slash {
                victim: victim_id,
                position: ray.position,
                direction,
            });
            for _ in 0..rng.random_range(1..=2) {
                events.push(CombatEvent::BloodSpurt {
                    position: ray.position,
                    direction,
                });
            }
        } else {
            events.push(CombatEvent::Impact {
                victim: victim_id,
                position: ray.position,
            });
        }

        let died = victim.update_alive_status();
        let mut heavy_stun = false;
        let mut ragdoll_velocity = None;

        if victim.alive {
            if !actor_armed && !victim.is_player && hit.final_attack {
                let position = victim.positioning.limbs[LimbKind::FirstHand].position;
                let away = if victim.is_flipped() { -1.0 } else { 1.0 };
                if let Some(weapon) = victim.take_weapon() {
                    let velocity = Vec2::new(away, 0.5) * tuning.disarm_impulse;
                    dropped.push((victim_id, weapon, position, velocity));
                }
                victim.melee_sequence = None;
                heavy_stun = !victim.animations.is_playing_group(STUN_GROUP);
            } else {
                let reaction_group = registry.animation(HIT_REACTIONS[0]).map(|a| a.group.clone());
                let reacting = reaction_group.is_some_and(|group| victim.animations.is_playing_group(&group));
                if !victim.animations.is_playing() || reacting {
                    if let Some(&reaction) = HIT_REACTIONS.choose(rng) {
                        victim.play_named(registry.as_ref(), reaction, 1.0);
                    }
                }
            }
        } else if died {
            events.push(CombatEvent::Killed {
                actor: actor_id,
                victim: victim_id,
            });
            if !victim.is_constrained(AnimationConstraint::PREVENT_RAGDOLL) {
                let knockback = actor.stats.melee_knockback.max(tuning.min_knockback);
                let mut velocity = actor.aim_direction() * knockback;
                velocity.y *= 1.5;
                let hand = &actor.positioning.limbs[LimbKind::FirstHand];
                velocity += (hand.animation_position - hand.previous_animated_position) * tuning.hand_velocity_gain;
                ragdoll_velocity = Some(velocity);
            }
        }

        let actor_is_player = actor.is_player;
        let player_died = died && victim.is_player;
        self.finish_hit(events, dropped);

        if died && actor_is_player && self.session.counts_kills() {
            self.session.kills += 1;
        }
        if player_died && let Err(e) = self.start_player_death_sequence() {
            log::warn!("{} died during a running death sequence: {}", victim_id, e);
        }
        if heavy_stun {
            self.stun_heavy(physics, rng, victim_id, true)?;
        }
        if let Some(velocity) = ragdoll_velocity {
            self.turn_into_ragdoll(victim_id, velocity, 0.0)?;
        }

        Ok(MeleeOutcome::Hit {
            victim: victim_id,
            limb: part.limb,
            killed: died,
        })
    }

    fn finish_hit(&mut self, events: Vec<CombatEvent>, dropped: Vec<(CharacterId, Weapon, Vec2, Vec2)>) {
        self.events.extend(events);
        for (owner, weapon, position, velocity) in dropped {
            self.place_loose_weapon(owner, weapon, position, velocity);
        }
    }

    /// Knock back whatever the ray struck
    fn shove_struck_entity(&mut self, ray: &RaycastHit, part: Option<BodyPart>, direction: Vec2, skill: f32) {
        let rotation = self.tuning.impact_rotation * skill * if direction.x > 0.0 { 1.0 } else { -1.0 };
        let translation = direction * self.tuning.impact_translation * skill;

        match part {
            Some(part) => {
                let Ok(victim) = self.get_mut(part.character) else {
                    return;
                };
                if !victim.flags.contains(CharacterFlags::ATTACK_RESPONSE_MELEE) {
                    return;
                }
                let limb = &mut victim.positioning.limbs[part.limb];
                let local = rotate_point(ray.position - limb.position, -limb.rotation, Vec2::ZERO) / limb.size;
                let above_pivot = local.y > part.limb.rotation_pivot().y;
                limb.impact.rotation += if above_pivot { -rotation } else { rotation };
                limb.impact.translation += translation;
            }
            None => {
                let Some(prop) = self.prop_mut(ray.entity) else {
                    return;
                };
                let local = (ray.position - prop.rect.center()) / (prop.rect.max - prop.rect.min).max(Vec2::ONE);
                let above_pivot = local.y > prop.pivot.y;
                prop.impact.rotation += if above_pivot { -rotation } else { rotation };
                prop.impact.translation += translation;
            }
        }
    }

    /// Knock a character off its feet
    ///
    /// `facing_impact` is true when the blow came from the front. A wall behind
    /// the character within reach turns it into a wall stun. Nothing happens on
    /// uneven ground.
    pub fn stun_heavy<R: Rng + ?Sized>(
        &mut self,
        physics: &dyn PhysicsWorld,
        rng: &mut R,
        id: CharacterId,
        facing_impact: bool,
    ) -> Result<bool> {
        let registry = Arc::clone(&self.animations);
        let reach = self.tuning.wall_check_distance;
        let character = self.get(id)?;
        let center = character.center();
        if !self.terrain.is_flat_at(center.x) {
            return Ok(false);
        }

        let direction = if facing_impact == character.is_flipped() { 1.0 } else { -1.0 };
        let wall = physics
            .raycast(
                center,
                Vec2::new(direction, 0.0),
                reach,
                CollisionLayers::BLOCK_PHYSICS,
                &character.attack_ignore,
            )
            .is_some();

        let animation = match (wall, facing_impact) {
            (true, true) => WALL_STUN_BACKWARDS,
            (true, false) => WALL_STUN_FORWARDS,
            (false, true) => HEAVY_STUN_BACKWARDS
                .choose(rng)
                .copied()
                .unwrap_or(HEAVY_STUN_FORWARDS),
            (false, false) => HEAVY_STUN_FORWARDS,
        };

        let character = self.get_mut(id)?;
        character.melee_sequence = None;
        character.play_named(registry.as_ref(), animation, 1.0);
        log::debug!("{} is heavily stunned ({})", character.name, animation);
        self.events.push(CombatEvent::Stunned {
            character: id,
            animation: animation.to_string(),
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::character::{Character, CharacterStats};
    use crate::presets;
    use crate::weapon::{MeleeDamageType, MeleeSize};
    use crate::world::{FlatArena, Rect};

    fn scene() -> Scene {
        Scene::new(
            Arc::new(presets::animation_library().unwrap()),
            Arc::new(presets::sequence_library()),
            Box::new(FlatArena::new(0.0)),
        )
    }

    fn blade(size: MeleeSize, damage: f32) -> Weapon {
        Weapon::new(Arc::new(WeaponData::melee("blade", MeleeDamageType::Blade, size, damage)))
    }

    fn fighter(name: &str, x: f32, weapon: Option<Weapon>) -> Character {
        let stats = CharacterStats {
            melee_skill: 1.0,
            dodge_ability: 1.0,
            ..Default::default()
        };
        let mut character = Character::new(name, stats, Vec2::new(x, 0.0));
        character.aim_target = character.aim_origin() + Vec2::X * 1000.0;
        character.equipped = weapon;
        character
    }

    fn arena(scene: &Scene) -> FlatArena {
        let mut arena = FlatArena::new(0.0);
        arena.sync(scene.colliders());
        arena
    }

    fn swing(scene: &Scene, actor: CharacterId, damage: f32) -> MeleeHit {
        let character = scene.get(actor).unwrap();
        MeleeHit {
            actor,
            origin: character.aim_origin(),
            direction: Vec2::X,
            distance: 256.0,
            damage,
            mask: CollisionLayers::CHARACTERS | CollisionLayers::PROPS,
            weapon: character.equipped.as_ref().map(|w| Arc::clone(&w.data)),
            final_attack: false,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_miss_out_of_reach() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 0.5))));
        scene.spawn(fighter("victim", 2000.0, None));
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 0.5);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::Missed);
        assert!(scene.events().is_empty());
    }

    #[test]
    fn test_prop_obstructs_and_shakes() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 0.5))));
        scene.spawn(fighter("victim", 300.0, None));
        let prop = scene.add_prop(Rect::new(Vec2::new(120.0, 0.0), Vec2::new(160.0, 400.0)));
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 0.5);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::Obstructed);

        let impact = scene.prop(prop).unwrap().impact;
        assert!(impact.translation.x > 0.0);
        assert!(impact.rotation.abs() > 0.001);
        assert!(matches!(scene.events()[0], CombatEvent::PropStruck { entity, .. } if entity == prop));
    }

    #[test]
    fn test_perfect_block_parries() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Large, 0.5))));
        let mut victim = fighter("victim", 300.0, Some(blade(MeleeSize::Small, 0.3))).into_player();
        victim.is_melee_blocking = true;
        victim.positioning.block_progress = 0.3;
        let victim = scene.spawn(victim);
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 0.5);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::Parried { victim, disarmed: false });

        let attacker = scene.get(actor).unwrap();
        assert!(attacker.dodge.abs() < 0.001);
        assert!((attacker.dodge_regen_cooldown - 1.0).abs() < 0.001);
        assert!(attacker.has_weapon());
        assert!(attacker.animations.is_playing_animation("melee_stun_sword_L"));

        let defender = scene.get(victim).unwrap();
        assert!((defender.positioning.block_progress - 0.86).abs() < 0.001);
        assert!((defender.positioning.tilt + 7.0).abs() < 0.001);
        assert!((defender.positioning.limbs.body().health - 0.3).abs() < 0.001);
    }

    #[test]
    fn test_player_attack_is_never_parried() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 0.5))).into_player());
        let mut victim = fighter("victim", 300.0, Some(blade(MeleeSize::Medium, 0.5)));
        victim.is_melee_blocking = true;
        victim.positioning.block_progress = 0.3;
        let victim = scene.spawn(victim);
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 0.5);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::Blocked { victim });

        let defender = scene.get(victim).unwrap();
        assert!((defender.dodge - 0.99).abs() < 0.001);
        assert!((defender.positioning.tilt - 4.0).abs() < 0.001);
        assert!((defender.positioning.limbs.body().health - 0.3).abs() < 0.001);
    }

    #[test]
    fn test_heavier_blade_breaks_block() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 0.5))).into_player());
        let mut victim = fighter("victim", 300.0, Some(blade(MeleeSize::Small, 0.3)));
        victim.is_melee_blocking = true;
        let victim = scene.spawn(victim);
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 0.5);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::StunnedThroughBlock { victim });

        let defender = scene.get(victim).unwrap();
        assert!((defender.dodge - 0.95).abs() < 0.001);
        assert!(defender.animations.is_playing_animation("melee_stun_sword_L"));
        assert!(
            scene
                .events()
                .iter()
                .any(|e| matches!(e, CombatEvent::Clash { stunned: true, .. }))
        );
    }

    #[test]
    fn test_player_dodges_armed_attack() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 0.5))));
        let victim = scene.spawn(fighter("victim", 300.0, None).into_player());
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 0.5);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::Dodged { victim });

        let player = scene.get(victim).unwrap();
        assert!((player.dodge - 0.25).abs() < 0.001);
        assert!(player.animations.is_playing_animation("dodge_1"));
        assert!((player.positioning.limbs.body().health - 0.3).abs() < 0.001);
    }

    #[test]
    fn test_unarmed_hit_drains_player_dodge() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, None));
        let victim = scene.spawn(fighter("victim", 300.0, None).into_player());
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 0.1);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert!(matches!(outcome, MeleeOutcome::Hit { killed: false, .. }));

        let player = scene.get(victim).unwrap();
        assert!((player.dodge - 0.9).abs() < 0.001);
        assert!((player.positioning.limbs.body().health - 0.3).abs() < 0.001);
    }

    #[test]
    fn test_invulnerable_player_is_ignored() {
        let mut scene = scene();
        scene.session.player_invulnerable = true;
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 5.0))));
        let victim = scene.spawn(fighter("victim", 300.0, None).into_player());
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 5.0);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::Ignored { victim });
        assert!(scene.get(victim).unwrap().alive);
    }

    #[test]
    fn test_lethal_blade_hit_ragdolls() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 1.0))).into_player());
        let victim = scene.spawn(fighter("victim", 300.0, None));
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 1.0);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(
            outcome,
            MeleeOutcome::Hit {
                victim,
                limb: LimbKind::Body,
                killed: true
            }
        );

        let dead = scene.get(victim).unwrap();
        assert!(!dead.alive);
        assert!(dead.ragdolled);
        assert!(dead.ragdoll.is_some());
        assert_eq!(scene.session.kills, 1);

        let events = scene.events();
        assert!(events.iter().any(|e| matches!(e, CombatEvent::Slash { .. })));
        assert!(events.iter().any(|e| matches!(e, CombatEvent::BloodSpurt { .. })));
        assert!(events.iter().any(|e| matches!(e, CombatEvent::Killed { .. })));
        assert!(events.iter().any(|e| matches!(e, CombatEvent::Ragdolled { .. })));
    }

    #[test]
    fn test_unarmed_finisher_disarms() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, None).into_player());
        let victim = scene.spawn(fighter("victim", 300.0, Some(blade(MeleeSize::Medium, 0.5))));
        let arena = arena(&scene);

        let mut hit = swing(&scene, actor, 0.01);
        hit.final_attack = true;
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert!(matches!(outcome, MeleeOutcome::Hit { killed: false, .. }));

        let stunned = scene.get(victim).unwrap();
        assert!(!stunned.has_weapon());
        assert!(stunned.animations.is_playing_group("stun"));
        assert_eq!(scene.loose_weapons.len(), 1);
        assert!(scene.loose_weapons[0].velocity.x > 0.0);
        assert!(
            scene
                .events()
                .iter()
                .any(|e| matches!(e, CombatEvent::Impact { .. }))
        );
    }

    #[test]
    fn test_hit_frame_uses_unarmed_damage() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, None).into_player());
        let victim = scene.spawn(fighter("victim", 300.0, None));
        let arena = arena(&scene);

        let outcome = scene.perform_hit_frame(&arena, &mut rng(), actor, false).unwrap();
        assert!(matches!(outcome, MeleeOutcome::Hit { killed: false, .. }));
        let health = scene.get(victim).unwrap().positioning.limbs.body().health;
        assert!((health - 0.18).abs() < 0.001);
        assert!(scene.get(victim).unwrap().animations.is_playing());
    }

    #[test]
    fn test_block_matchup_reads_equipped_weapon() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 0.5))).into_player());
        let mut victim = fighter("victim", 300.0, Some(blade(MeleeSize::Small, 0.3)));
        victim.is_melee_blocking = true;
        let victim = scene.spawn(victim);
        let arena = arena(&scene);

        let mut hit = swing(&scene, actor, 0.5);
        hit.weapon = Some(Arc::new(WeaponData::melee(
            "knife",
            MeleeDamageType::Blade,
            MeleeSize::Small,
            0.5,
        )));
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::StunnedThroughBlock { victim });
    }

    #[test]
    fn test_player_dodges_armed_actor_without_swing_weapon() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 0.5))));
        let victim = scene.spawn(fighter("victim", 300.0, None).into_player());
        let arena = arena(&scene);

        let mut hit = swing(&scene, actor, 0.5);
        hit.weapon = None;
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert_eq!(outcome, MeleeOutcome::Dodged { victim });
    }

    #[test]
    fn test_player_killed_during_death_sequence() {
        let mut scene = scene();
        let actor = scene.spawn(fighter("actor", 0.0, Some(blade(MeleeSize::Medium, 1.0))));
        let mut player = fighter("victim", 300.0, None).into_player();
        player.dodge = 0.0;
        let victim = scene.spawn(player);
        scene.start_player_death_sequence().unwrap();
        let arena = arena(&scene);

        let hit = swing(&scene, actor, 1.0);
        let outcome = scene.do_melee_hit(&arena, &mut rng(), &hit).unwrap();
        assert!(matches!(outcome, MeleeOutcome::Hit { killed: true, .. }));

        let dead = scene.get(victim).unwrap();
        assert!(!dead.alive);
        assert!(dead.ragdolled);
        assert!(scene.player_death_sequence().is_some());
    }

    #[test]
    fn test_stun_heavy_into_wall() {
        let mut scene = scene();
        let victim = scene.spawn(fighter("victim", 300.0, None));
        let walls = FlatArena::new(0.0).with_walls(100.0, 5000.0, 1);

        assert!(scene.stun_heavy(&walls, &mut rng(), victim, true).unwrap());
        let character = scene.get(victim).unwrap();
        assert!(character.animations.is_playing_animation("stun_wall_heavy_backwards"));
        assert!(character.melee_sequence.is_none());
    }

    #[test]
    fn test_stun_heavy_in_the_open() {
        let mut scene = scene();
        let victim = scene.spawn(fighter("victim", 300.0, None));
        let open = FlatArena::new(0.0);

        assert!(scene.stun_heavy(&open, &mut rng(), victim, false).unwrap());
        let character = scene.get(victim).unwrap();
        assert!(character.animations.is_playing_animation("stun_heavy_forwards"));
    }
}
