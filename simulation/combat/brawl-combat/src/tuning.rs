//! Gameplay tunables for melee resolution

/// Numbers that shape a melee exchange
///
/// The defaults reproduce the stock game feel. Every field can be overridden
/// from a JSON file with the `serde-support` feature.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct CombatTuning {
    /// Extra raycast length added to every melee hit
    pub melee_overreach: f32,
    /// Dodge drained from a victim that blocks, per unit of damage
    pub block_drain: f32,
    /// Dodge drained from a victim that gets stunned through a block
    pub stun_drain: f32,
    /// Dodge drained from the player by an armed attack
    pub player_dodge_drain: f32,
    /// Regeneration cooldown forced onto an attacker that was parried
    pub perfect_block_cooldown: f32,
    /// How far a parry pushes the victim's block progress towards 1
    pub perfect_block_lerp: f32,
    pub block_impact_tilt: f32,
    pub parry_impact_tilt: f32,
    pub parry_impact_intensity: f32,
    pub light_stun_speed: f32,
    /// Light stuns only play while the victim's dodge is below this
    pub light_stun_dodge_threshold: f32,
    pub unarmed_range: f32,
    pub unarmed_damage: f32,
    /// Damage of a firearm swung as a club
    pub firearm_melee_damage: f32,
    pub heavy_firearm_melee_damage: f32,
    pub min_knockback: f32,
    /// Weight of the attacking hand's motion in the ragdoll launch velocity
    pub hand_velocity_gain: f32,
    pub impact_rotation: f32,
    pub impact_translation: f32,
    /// Distance checked behind a stunned character for a wall
    pub wall_check_distance: f32,
    /// Impulse applied to a weapon knocked out of a hand
    pub disarm_impulse: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            melee_overreach: 200.0,
            block_drain: 0.02,
            stun_drain: 0.1,
            player_dodge_drain: 1.5,
            perfect_block_cooldown: 1.0,
            perfect_block_lerp: 0.8,
            block_impact_tilt: 4.0,
            parry_impact_tilt: -7.0,
            parry_impact_intensity: -3.0,
            light_stun_speed: 1.2,
            light_stun_dodge_threshold: 0.5,
            unarmed_range: 256.0,
            unarmed_damage: 0.12,
            firearm_melee_damage: 0.125,
            heavy_firearm_melee_damage: 0.25,
            min_knockback: 0.5,
            hand_velocity_gain: 2.0,
            impact_rotation: 5.0,
            impact_translation: 25.0,
            wall_check_distance: 800.0,
            disarm_impulse: 500.0,
        }
    }
}
