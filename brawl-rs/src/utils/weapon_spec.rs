//! Parsing of short weapon descriptions such as `blade:small` or `blunt:large:special`

use anyhow::{Result, bail};
use brawl_combat::{HandPositionMode, MeleeDamageType, MeleeSize, WeaponData};

/// Damage given to melee weapons built from a spec
pub const DEFAULT_MELEE_DAMAGE: f32 = 0.5;

fn parse_damage_type(value: &str) -> Result<MeleeDamageType> {
    match value.to_lowercase().as_str() {
        "blade" | "sword" => Ok(MeleeDamageType::Blade),
        "axe" => Ok(MeleeDamageType::Axe),
        "blunt" | "club" => Ok(MeleeDamageType::Blunt),
        _ => bail!("Unknown melee damage type: {}", value),
    }
}

fn parse_size(value: &str) -> Result<MeleeSize> {
    match value.to_lowercase().as_str() {
        "small" | "s" => Ok(MeleeSize::Small),
        "medium" | "m" => Ok(MeleeSize::Medium),
        "large" | "l" => Ok(MeleeSize::Large),
        _ => bail!("Unknown melee size: {}", value),
    }
}

/// Parse a weapon spec; `none` means unarmed
///
/// Accepted forms are `none`, `firearm`, `firearm:two`, `<type>:<size>` and
/// `<type>:<size>:special`. The size defaults to medium.
pub fn parse_weapon(spec: &str, damage: f32) -> Result<Option<WeaponData>> {
    let parts: Vec<&str> = spec.trim().split(':').collect();
    let weapon = match parts.as_slice() {
        ["none" | "unarmed"] => return Ok(None),
        ["firearm" | "gun"] => WeaponData::firearm(spec, HandPositionMode::OneHand),
        ["firearm" | "gun", "two"] => WeaponData::firearm(spec, HandPositionMode::TwoHands),
        [damage_type] => WeaponData::melee(spec, parse_damage_type(damage_type)?, MeleeSize::Medium, damage),
        [damage_type, size] => WeaponData::melee(spec, parse_damage_type(damage_type)?, parse_size(size)?, damage),
        [damage_type, size, "special"] => {
            WeaponData::melee(spec, parse_damage_type(damage_type)?, parse_size(size)?, damage).with_special_melee()
        }
        _ => bail!("Invalid weapon spec '{}'; expected e.g. blade:small, blunt:large:special, firearm or none", spec),
    };
    Ok(Some(weapon))
}

/// Human readable name of a possibly missing weapon
pub fn describe_weapon(weapon: Option<&WeaponData>) -> String {
    match weapon.and_then(WeaponData::melee_profile) {
        Some(profile) => profile.to_string(),
        None if weapon.is_some() => "Firearm".to_string(),
        None => "Unarmed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_melee() {
        let weapon = parse_weapon("blunt:large:special", 0.4).unwrap().unwrap();
        assert_eq!(weapon.melee_damage_type, MeleeDamageType::Blunt);
        assert_eq!(weapon.melee_size, MeleeSize::Large);
        assert!(weapon.special_melee);
        assert!((weapon.damage - 0.4).abs() < 0.001);
    }

    #[test]
    fn test_parse_defaults_to_medium() {
        let weapon = parse_weapon("axe", DEFAULT_MELEE_DAMAGE).unwrap().unwrap();
        assert_eq!(weapon.melee_size, MeleeSize::Medium);
    }

    #[test]
    fn test_parse_none_and_firearm() {
        assert!(parse_weapon("none", 0.5).unwrap().is_none());
        let gun = parse_weapon("firearm:two", 0.5).unwrap().unwrap();
        assert!(!gun.is_melee());
        assert_eq!(gun.hand_position_mode, HandPositionMode::TwoHands);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_weapon("spoon:small", 0.5).is_err());
        assert!(parse_weapon("blade:tiny", 0.5).is_err());
        assert!(parse_weapon("blade:small:shiny", 0.5).is_err());
    }

    #[test]
    fn test_describe() {
        let knife = parse_weapon("blade:small", 0.5).unwrap();
        assert_eq!(describe_weapon(knife.as_ref()), "Small Blade");
        assert_eq!(describe_weapon(None), "Unarmed");
    }
}
