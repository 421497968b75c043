//! Keyframe curves sampled over normalized time

use crate::math::Lerp;

/// A single curve key
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Key<T> {
    /// Normalized position in `[0, 1]`
    pub position: f32,
    /// Value at this position
    pub value: T,
}

impl<T> Key<T> {
    pub const fn new(position: f32, value: T) -> Self {
        Self { position, value }
    }
}

/// Piecewise linear curve over `[0, 1]`
///
/// Keys are kept sorted by position. Sampling before the first key returns the
/// first value, sampling after the last key returns the last value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Curve<T> {
    keys: Vec<Key<T>>,
}

impl<T: Lerp + Copy> Curve<T> {
    /// Create a curve, sorting the keys by position
    pub fn new(mut keys: Vec<Key<T>>) -> Self {
        keys.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { keys }
    }

    /// Curve that holds a single value
    pub fn constant(value: T) -> Self {
        Self {
            keys: vec![Key::new(0.0, value)],
        }
    }

    /// Build from `(position, value)` pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f32, T)>) -> Self {
        Self::new(pairs.into_iter().map(|(p, v)| Key::new(p, v)).collect())
    }

    pub fn keys(&self) -> &[Key<T>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sample the curve at normalized time `t`, or `None` if the curve has no keys
    pub fn evaluate(&self, t: f32) -> Option<T> {
        let index = find_key_index(&self.keys, t)?;
        let current = &self.keys[index];

        let Some(next) = self.keys.get(index + 1) else {
            return Some(current.value);
        };

        let span = next.position - current.position;
        let local = if span > 0.0 {
            ((t - current.position) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(current.value.lerp(&next.value, local))
    }
}

/// Find the index of the key at or before `t`
///
/// Returns the earlier key of the bracketing pair, `0` when `t` precedes every key,
/// and the last index when `t` is at or past the final key.
pub fn find_key_index<T>(keys: &[Key<T>], t: f32) -> Option<usize> {
    if keys.is_empty() {
        return None;
    }

    let last_index = keys.len() - 1;
    if t >= keys[last_index].position {
        return Some(last_index);
    }

    // Largest index where keys[index].position <= t
    let mut low = 0;
    let mut high = last_index;
    while low < high {
        let mid = (low + high).div_ceil(2);
        if keys[mid].position <= t {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Some(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Angle;
    use glam::Vec2;

    #[test]
    fn test_find_key_index_empty() {
        let keys: Vec<Key<f32>> = vec![];
        assert_eq!(find_key_index(&keys, 0.0), None);
    }

    #[test]
    fn test_find_key_index_multiple() {
        let curve = Curve::from_pairs([(0.0, 0.0_f32), (0.25, 1.0), (0.5, 2.0), (1.0, 3.0)]);
        let keys = curve.keys();

        assert_eq!(find_key_index(keys, -1.0), Some(0));
        assert_eq!(find_key_index(keys, 0.1), Some(0));
        assert_eq!(find_key_index(keys, 0.25), Some(1));
        assert_eq!(find_key_index(keys, 0.7), Some(2));
        assert_eq!(find_key_index(keys, 1.0), Some(3));
        assert_eq!(find_key_index(keys, 5.0), Some(3));
    }

    #[test]
    fn test_evaluate_linear() {
        let curve = Curve::from_pairs([(0.0, Vec2::ZERO), (1.0, Vec2::new(10.0, -10.0))]);
        let v = curve.evaluate(0.5).unwrap_or_default();
        assert!((v.x - 5.0).abs() < 0.001);
        assert!((v.y + 5.0).abs() < 0.001);
    }

    #[test]
    fn test_evaluate_clamps_outside_range() {
        let curve = Curve::from_pairs([(0.2, 1.0_f32), (0.8, 2.0)]);
        assert_eq!(curve.evaluate(0.0), Some(1.0));
        assert_eq!(curve.evaluate(1.5), Some(2.0));
    }

    #[test]
    fn test_keys_are_sorted() {
        let curve = Curve::from_pairs([(1.0, 3.0_f32), (0.0, 1.0)]);
        assert_eq!(curve.keys()[0].position, 0.0);
        assert_eq!(curve.evaluate(0.5), Some(2.0));
    }

    #[test]
    fn test_angle_curve_wraps() {
        let curve = Curve::from_pairs([(0.0, Angle(170.0)), (1.0, Angle(-170.0))]);
        let mid = curve.evaluate(0.5).unwrap_or_default().0;
        assert!((mid - 180.0).abs() < 0.001);
    }
}
