//! Values scoped to one play session

/// What kind of level is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum GameMode {
    #[default]
    Campaign,
    Experiment,
    Editor,
}

/// Session context shared by everything in a scene
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct Session {
    pub mode: GameMode,
    /// Player cannot be meleed or killed
    pub player_invulnerable: bool,
    /// Kills by the player, counted in campaign mode
    pub kills: u32,
    /// Bumped whenever the scene is reset; deferred tasks from older epochs are dropped
    pub epoch: u64,
}

impl Session {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn counts_kills(&self) -> bool {
        self.mode == GameMode::Campaign
    }
}
