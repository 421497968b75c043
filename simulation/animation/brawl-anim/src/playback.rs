//! One playing instance of a character animation

use std::sync::Arc;

use glam::Vec2;

use crate::clip::{CharacterAnimation, HandLook, LimbAnimation};
use crate::math::Angle;

/// Identifies a playing instance across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(pub u64);

/// Fraction of the total duration after which an animation counts as almost over
pub const ALMOST_OVER: f32 = 0.95;

/// A playing animation with its own timer and speed
#[derive(Debug, Clone)]
pub struct ActiveAnimation {
    id: PlaybackId,
    animation: Arc<CharacterAnimation>,
    /// Playback speed multiplier
    pub speed: f32,
    unscaled_timer: f32,
    max_key_count: usize,
    stopped: bool,
}

impl ActiveAnimation {
    pub fn new(id: PlaybackId, animation: Arc<CharacterAnimation>, speed: f32) -> Self {
        let max_key_count = animation.max_key_count();
        Self {
            id,
            animation,
            speed,
            unscaled_timer: 0.0,
            max_key_count,
            stopped: false,
        }
    }

    pub fn id(&self) -> PlaybackId {
        self.id
    }

    pub fn animation(&self) -> &Arc<CharacterAnimation> {
        &self.animation
    }

    pub fn unscaled_timer(&self) -> f32 {
        self.unscaled_timer
    }

    pub fn set_unscaled_timer(&mut self, timer: f32) {
        self.unscaled_timer = timer;
    }

    pub fn scaled_timer(&self) -> f32 {
        self.unscaled_timer * self.speed
    }

    pub fn scaled_duration(&self) -> f32 {
        self.speed * self.animation.total_duration()
    }

    /// Cached at construction
    pub fn max_key_count(&self) -> usize {
        self.max_key_count
    }

    pub fn is_over(&self) -> bool {
        self.unscaled_timer > self.animation.total_duration()
    }

    pub fn is_almost_over(&self, percentage: f32) -> bool {
        self.unscaled_timer >= self.animation.total_duration() * percentage
    }

    /// Force the instance to finish; no end notification is produced
    pub fn stop(&mut self) {
        self.unscaled_timer = f32::MAX;
        self.stopped = true;
    }

    pub fn was_stopped(&self) -> bool {
        self.stopped
    }

    /// Advance by a frame; the timer moves by `dt * speed`
    pub fn advance(&mut self, dt: f32) {
        if !self.stopped {
            self.unscaled_timer += dt * self.speed;
        }
    }

    /// Normalized time for a limb
    pub fn progress(&self, limb: &LimbAnimation) -> f32 {
        self.unscaled_timer / limb.duration
    }

    fn position(&self, limb: Option<&LimbAnimation>) -> Vec2 {
        limb.and_then(|l| l.translation.as_ref()?.evaluate(self.progress(l)))
            .unwrap_or(Vec2::ZERO)
    }

    fn rotation(&self, limb: Option<&LimbAnimation>) -> f32 {
        limb.and_then(|l| l.rotation.as_ref()?.evaluate(self.progress(l)))
            .map_or(0.0, |Angle(degrees)| degrees)
    }

    fn scale(&self, limb: Option<&LimbAnimation>) -> Vec2 {
        limb.and_then(|l| l.scale.as_ref()?.evaluate(self.progress(l)))
            .unwrap_or(Vec2::ONE)
    }

    fn hand_limb(&self, index: usize) -> Option<&LimbAnimation> {
        self.animation.hand(index).map(|h| &h.limb)
    }

    pub fn head_position(&self) -> Vec2 {
        self.position(self.animation.head.as_ref())
    }

    pub fn head_rotation(&self) -> f32 {
        self.rotation(self.animation.head.as_ref())
    }

    pub fn head_scale(&self) -> Vec2 {
        self.scale(self.animation.head.as_ref())
    }

    pub fn body_position(&self) -> Vec2 {
        self.position(self.animation.body.as_ref())
    }

    pub fn body_rotation(&self) -> f32 {
        self.rotation(self.animation.body.as_ref())
    }

    pub fn body_scale(&self) -> Vec2 {
        self.scale(self.animation.body.as_ref())
    }

    pub fn hand_position(&self, index: usize) -> Vec2 {
        self.position(self.hand_limb(index))
    }

    pub fn hand_rotation(&self, index: usize) -> f32 {
        self.rotation(self.hand_limb(index))
    }

    pub fn hand_scale(&self, index: usize) -> Vec2 {
        self.scale(self.hand_limb(index))
    }

    /// Grip look from the hand's timeline, `None` without one
    pub fn hand_look(&self, index: usize) -> Option<HandLook> {
        let hand = self.animation.hand(index)?;
        hand.look_at(self.progress(&hand.limb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::HandLimbAnimation;
    use crate::curve::Curve;

    fn animation() -> Arc<CharacterAnimation> {
        let body = LimbAnimation::new(2.0)
            .with_translation(Curve::from_pairs([(0.0, Vec2::ZERO), (1.0, Vec2::new(100.0, 0.0))]))
            .with_rotation(Curve::from_pairs([(0.0, Angle(0.0)), (1.0, Angle(90.0))]));
        let hand = HandLimbAnimation::new(LimbAnimation::new(1.0))
            .with_look(0.0, Some(HandLook::Open))
            .with_look(0.5, Some(HandLook::Point));
        Arc::new(
            CharacterAnimation::new("walk", "locomotion")
                .with_body(body)
                .with_hands(hand, HandLimbAnimation::new(LimbAnimation::new(1.0)))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_timers() {
        let mut active = ActiveAnimation::new(PlaybackId(1), animation(), 2.0);
        active.advance(0.5);
        assert!((active.unscaled_timer() - 1.0).abs() < 0.001);
        assert!((active.scaled_timer() - 2.0).abs() < 0.001);
        assert!((active.scaled_duration() - 4.0).abs() < 0.001);
        assert!(!active.is_over());

        active.advance(0.5);
        assert!(active.is_almost_over(ALMOST_OVER));
        assert!(!active.is_over());
        active.advance(0.01);
        assert!(active.is_over());
    }

    #[test]
    fn test_sampling_and_defaults() {
        let mut active = ActiveAnimation::new(PlaybackId(1), animation(), 1.0);
        active.set_unscaled_timer(1.0);

        assert!((active.body_position().x - 50.0).abs() < 0.001);
        assert!((active.body_rotation() - 45.0).abs() < 0.001);
        // Missing curves fall back to identity
        assert_eq!(active.head_position(), Vec2::ZERO);
        assert_eq!(active.head_rotation(), 0.0);
        assert_eq!(active.body_scale(), Vec2::ONE);
        assert_eq!(active.hand_position(1), Vec2::ZERO);
        assert_eq!(active.hand_look(1), None);
        assert_eq!(active.hand_look(0), Some(HandLook::Point));
    }

    #[test]
    fn test_stop_marks_finished() {
        let mut active = ActiveAnimation::new(PlaybackId(7), animation(), 1.0);
        active.stop();
        assert!(active.is_over());
        assert!(active.was_stopped());
        active.advance(1.0);
        assert_eq!(active.unscaled_timer(), f32::MAX);
    }

    #[test]
    fn test_max_key_count_cached() {
        let active = ActiveAnimation::new(PlaybackId(1), animation(), 1.0);
        assert_eq!(active.max_key_count(), 2);
    }
}
