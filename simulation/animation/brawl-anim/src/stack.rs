//! Per-character list of playing animations
//!
//! The stack holds at most two instances: the current animation (last) and the
//! one fading out underneath it. Playing a new animation restarts the mix; once
//! the mix completes the older instance is dropped.

use std::sync::Arc;

use crate::blend::{self, AnimationResult, BlendContext};
use crate::clip::CharacterAnimation;
use crate::constraint::{AnimationConstraint, aggregate_constraints};
use crate::playback::{ActiveAnimation, PlaybackId};

/// Default time in seconds for a full blend between two animations
pub const DEFAULT_MIX_DURATION: f32 = 0.3125;

/// Blend timing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct MixSettings {
    /// Seconds to blend from the previous animation into a new one
    pub mix_duration: f32,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            mix_duration: DEFAULT_MIX_DURATION,
        }
    }
}

/// An animation that played to its end during [`AnimationStack::advance`]
#[derive(Debug, Clone)]
pub struct CompletedAnimation {
    pub id: PlaybackId,
    pub animation: Arc<CharacterAnimation>,
}

/// The playing animations of one character
#[derive(Debug, Clone)]
pub struct AnimationStack {
    active: Vec<ActiveAnimation>,
    mix_progress: f32,
    settings: MixSettings,
    next_id: u64,
}

impl Default for AnimationStack {
    fn default() -> Self {
        Self::new(MixSettings::default())
    }
}

impl AnimationStack {
    pub fn new(settings: MixSettings) -> Self {
        Self {
            active: Vec::with_capacity(2),
            mix_progress: 1.0,
            settings,
            next_id: 1,
        }
    }

    /// Start playing `animation` on top of the current one
    pub fn play(&mut self, animation: Arc<CharacterAnimation>, speed: f32) -> PlaybackId {
        // Only the current instance may fade out underneath the new one
        if self.active.len() > 1 {
            let excess = self.active.len() - 1;
            self.active.drain(..excess);
        }

        let id = PlaybackId(self.next_id);
        self.next_id += 1;

        log::debug!("Playing '{}' at speed {} ({:?})", animation.name, speed, id);
        self.active.push(ActiveAnimation::new(id, animation, speed));
        self.mix_progress = 0.0;
        id
    }

    /// Drop every animation without end notifications
    pub fn stop_all(&mut self) {
        if !self.active.is_empty() {
            log::debug!("Stopping {} animation(s)", self.active.len());
        }
        self.active.clear();
    }

    /// Stop one instance; it is removed on the next advance without completing
    pub fn stop(&mut self, id: PlaybackId) -> bool {
        match self.active.iter_mut().find(|a| a.id() == id) {
            Some(active) => {
                active.stop();
                true
            }
            None => false,
        }
    }

    pub fn animations(&self) -> &[ActiveAnimation] {
        &self.active
    }

    /// The newest instance
    pub fn main(&self) -> Option<&ActiveAnimation> {
        self.active.last()
    }

    pub fn main_mut(&mut self) -> Option<&mut ActiveAnimation> {
        self.active.last_mut()
    }

    pub fn get(&self, id: PlaybackId) -> Option<&ActiveAnimation> {
        self.active.iter().find(|a| a.id() == id)
    }

    pub fn is_playing(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn is_playing_animation(&self, name: &str) -> bool {
        self.active.iter().any(|a| a.animation().name == name)
    }

    /// Group names compare case-insensitively
    pub fn is_playing_group(&self, group: &str) -> bool {
        self.active
            .iter()
            .any(|a| a.animation().group.eq_ignore_ascii_case(group))
    }

    pub fn mix_progress(&self) -> f32 {
        self.mix_progress
    }

    pub fn settings(&self) -> &MixSettings {
        &self.settings
    }

    /// Constraints of every playing instance plus `additional`
    pub fn constraints(&self, additional: AnimationConstraint) -> AnimationConstraint {
        aggregate_constraints(&self.active, additional)
    }

    /// Blended pose of the playing animations
    pub fn mixed(&self, ctx: &BlendContext) -> Option<AnimationResult> {
        blend::mixed(&self.active, self.mix_progress, ctx)
    }

    /// Move the mix and every timer forward by `dt`
    ///
    /// Instances that are over are removed before their timers move. Those that
    /// ran out naturally are returned; stopped ones are not.
    pub fn advance(&mut self, dt: f32) -> Vec<CompletedAnimation> {
        let speed = self.main().map_or(1.0, |a| a.speed);
        let step = if self.settings.mix_duration > 0.0 {
            dt / self.settings.mix_duration * speed
        } else {
            1.0
        };
        self.mix_progress = (self.mix_progress + step).clamp(0.0, 1.0);

        let mut completed = Vec::new();
        self.active.retain_mut(|active| {
            if active.is_over() {
                if !active.was_stopped() {
                    completed.push(CompletedAnimation {
                        id: active.id(),
                        animation: Arc::clone(active.animation()),
                    });
                }
                return false;
            }
            active.advance(dt);
            true
        });

        if self.mix_progress >= 1.0 && self.active.len() > 1 {
            let excess = self.active.len() - 1;
            self.active.drain(..excess);
        }

        for c in &completed {
            log::trace!("Animation '{}' completed ({:?})", c.animation.name, c.id);
        }
        completed
    }
}
