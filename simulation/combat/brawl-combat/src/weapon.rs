//! Weapon assets and equipped weapon instances

use std::fmt;
use std::sync::Arc;

use glam::Vec2;

/// Broad weapon family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponType {
    #[default]
    Firearm,
    Melee,
}

/// How a weapon hurts when swung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum MeleeDamageType {
    /// Not a melee weapon; firearms are swung as clubs
    #[default]
    Firearm,
    Blade,
    Axe,
    Blunt,
}

impl MeleeDamageType {
    /// Blades and axes leave slash marks
    pub fn is_sharp(self) -> bool {
        matches!(self, Self::Blade | Self::Axe)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum MeleeSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Which hands hold the weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum HandPositionMode {
    None,
    #[default]
    OneHand,
    TwoHands,
}

/// Immutable weapon asset
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct WeaponData {
    pub name: String,
    pub weapon_type: WeaponType,
    pub melee_damage_type: MeleeDamageType,
    pub melee_size: MeleeSize,
    /// Wins every block exchange it takes part in
    pub special_melee: bool,
    pub damage: f32,
    /// Melee reach before scaling
    pub range: f32,
    pub can_deflect_bullets: bool,
    pub hand_position_mode: HandPositionMode,
    /// Scales how far from the body the aiming hand may reach
    pub max_hand_range_multiplier: f32,
    /// Recoil recovery speed
    pub recoil_handling: f32,
    /// Degrees of hand rotation per unit of recoil
    pub rotational_recoil_intensity: f32,
    /// Second hand wraps the grip instead of cupping the underside
    pub hold_for_grip: bool,
    pub hold_stock_hand_pose: bool,
    pub is_pump_action: bool,
    /// Heavy firearms hit harder when swung
    pub throwable_heavy: bool,
}

impl Default for WeaponData {
    fn default() -> Self {
        Self {
            name: String::new(),
            weapon_type: WeaponType::Firearm,
            melee_damage_type: MeleeDamageType::Firearm,
            melee_size: MeleeSize::Medium,
            special_melee: false,
            damage: 1.0,
            range: 256.0,
            can_deflect_bullets: false,
            hand_position_mode: HandPositionMode::OneHand,
            max_hand_range_multiplier: 1.0,
            recoil_handling: 1.0,
            rotational_recoil_intensity: 1.0,
            hold_for_grip: false,
            hold_stock_hand_pose: false,
            is_pump_action: false,
            throwable_heavy: false,
        }
    }
}

impl WeaponData {
    /// A melee weapon with the given properties
    pub fn melee(name: impl Into<String>, damage_type: MeleeDamageType, size: MeleeSize, damage: f32) -> Self {
        Self {
            name: name.into(),
            weapon_type: WeaponType::Melee,
            melee_damage_type: damage_type,
            melee_size: size,
            damage,
            ..Default::default()
        }
    }

    /// A firearm held with `hands`
    pub fn firearm(name: impl Into<String>, hands: HandPositionMode) -> Self {
        Self {
            name: name.into(),
            hand_position_mode: hands,
            ..Default::default()
        }
    }

    pub fn with_special_melee(mut self) -> Self {
        self.special_melee = true;
        self
    }

    pub fn with_hands(mut self, hands: HandPositionMode) -> Self {
        self.hand_position_mode = hands;
        self
    }

    pub fn is_melee(&self) -> bool {
        self.weapon_type == WeaponType::Melee
    }

    /// Matchup profile, `None` for firearms
    pub fn melee_profile(&self) -> Option<MeleeProfile> {
        self.is_melee().then_some(MeleeProfile {
            damage_type: self.melee_damage_type,
            size: self.melee_size,
            special: self.special_melee,
        })
    }
}

/// The properties of a melee weapon that decide a block exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct MeleeProfile {
    pub damage_type: MeleeDamageType,
    pub size: MeleeSize,
    pub special: bool,
}

impl MeleeProfile {
    pub const fn new(damage_type: MeleeDamageType, size: MeleeSize) -> Self {
        Self {
            damage_type,
            size,
            special: false,
        }
    }

    pub const fn special(mut self) -> Self {
        self.special = true;
        self
    }
}

impl fmt::Display for MeleeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.size, self.damage_type)?;
        if self.special {
            write!(f, " (special)")?;
        }
        Ok(())
    }
}

/// A weapon instance held by a character or lying in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub data: Arc<WeaponData>,
    /// Grip points in weapon-local space
    pub hold_points: Vec<Vec2>,
    /// Weapon-local point the weapon rotates around
    pub pivot: Vec2,
    /// Current position of the animated pump slide, for pump actions
    pub pump_position: Option<Vec2>,
}

impl Weapon {
    pub fn new(data: Arc<WeaponData>) -> Self {
        Self {
            data,
            hold_points: Vec::new(),
            pivot: Vec2::ZERO,
            pump_position: None,
        }
    }

    pub fn with_hold_points(mut self, points: impl IntoIterator<Item = Vec2>) -> Self {
        self.hold_points = points.into_iter().collect();
        self
    }

    pub fn is_melee(&self) -> bool {
        self.data.is_melee()
    }
}

/// A weapon dropped into the scene
#[derive(Debug, Clone, PartialEq)]
pub struct LooseWeapon {
    pub weapon: Weapon,
    pub position: Vec2,
    pub velocity: Vec2,
}
