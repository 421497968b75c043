//! Read-only lookup of animation assets by key

use std::collections::HashMap;
use std::sync::Arc;

use crate::clip::CharacterAnimation;
use crate::error::{AnimationError, Result};

/// Source of already-deserialized animation assets
pub trait AnimationRegistry {
    fn animation(&self, key: &str) -> Option<Arc<CharacterAnimation>>;

    /// Every animation whose group matches, case-insensitively, in key order
    fn group(&self, group: &str) -> Vec<Arc<CharacterAnimation>>;

    fn require(&self, key: &str) -> Result<Arc<CharacterAnimation>> {
        self.animation(key)
            .ok_or_else(|| AnimationError::UnknownAnimation(key.to_string()))
    }
}

/// In-memory registry keyed by animation name
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    animations: HashMap<String, Arc<CharacterAnimation>>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the animation's own name, replacing any previous entry
    pub fn insert(&mut self, animation: CharacterAnimation) -> Arc<CharacterAnimation> {
        let animation = Arc::new(animation);
        if let Some(previous) = self
            .animations
            .insert(animation.name.clone(), Arc::clone(&animation))
        {
            log::warn!("Replacing animation '{}'", previous.name);
        }
        animation
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

impl AnimationRegistry for AnimationLibrary {
    fn animation(&self, key: &str) -> Option<Arc<CharacterAnimation>> {
        self.animations.get(key).cloned()
    }

    fn group(&self, group: &str) -> Vec<Arc<CharacterAnimation>> {
        let mut found: Vec<_> = self
            .animations
            .values()
            .filter(|a| a.group.eq_ignore_ascii_case(group))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}
