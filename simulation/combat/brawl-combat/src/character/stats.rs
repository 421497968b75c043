use crate::melee::MeleeSequenceNames;

/// Combat abilities of a character
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct CharacterStats {
    pub name: String,
    /// Physical size; damage and reach scale with it
    pub scale: f32,
    /// `0..=1`; higher is faster and harder to parry
    pub melee_skill: f32,
    /// Upper bound of the dodge meter
    pub dodge_ability: f32,
    /// Allows dodging even when the meter is drained to zero
    pub dodge_oversaturate: bool,
    pub melee_knockback: f32,
    pub recoil_handling_ability: f32,
    /// Allows deflecting bullets while blocking
    pub can_deflect: bool,
    pub head_health: f32,
    pub body_health: f32,
    pub melee_sequences: MeleeSequenceNames,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            scale: 1.0,
            melee_skill: 0.2,
            dodge_ability: 0.0,
            dodge_oversaturate: false,
            melee_knockback: 0.0,
            recoil_handling_ability: 0.4,
            can_deflect: false,
            head_health: 0.2,
            body_health: 0.3,
            melee_sequences: MeleeSequenceNames::default(),
        }
    }
}
