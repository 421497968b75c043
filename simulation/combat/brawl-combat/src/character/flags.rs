use bitflags::bitflags;

bitflags! {
    /// Per-character behaviour switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
    pub struct CharacterFlags: u32 {
        /// Cannot be damaged or killed
        const INVINCIBLE = 1;
        /// Never turns into a ragdoll
        const NO_RAGDOLL = 2;
        const ATTACK_RESPONSE_THROWN_PROJECTILE = 4;
        const ATTACK_RESPONSE_MELEE = 8;
        const ATTACK_RESPONSE_BULLET = 16;
        /// Flinches when hit without dying
        const STUN_ANIMATION_ON_NON_FATAL_SHOT = 32;
        /// The ragdoll is removed instead of left behind
        const DELETE_RAGDOLL = 64;
    }
}

impl Default for CharacterFlags {
    fn default() -> Self {
        Self::all() - Self::INVINCIBLE - Self::NO_RAGDOLL
    }
}
