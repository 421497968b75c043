//! Angle helpers, easing curves and the interpolation trait
//!
//! All angles in this workspace are degrees, counter-clockwise, with 0 pointing
//! along +X. Vectors are [`glam::Vec2`].

use glam::Vec2;

/// Trait for values that can be interpolated
pub trait Lerp {
    /// Interpolate from `self` towards `other` by `t`
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::lerp(*self, *other, t)
    }
}

/// An angle in degrees that interpolates along the shortest arc
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Angle(pub f32);

impl Lerp for Angle {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self(lerp_angle(self.0, other.0, t))
    }
}

impl From<f32> for Angle {
    fn from(degrees: f32) -> Self {
        Self(degrees)
    }
}

/// Angle of a vector in degrees
pub fn vector_to_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

/// Unit vector pointing along the given angle in degrees
pub fn angle_to_vector(degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(cos, sin)
}

/// Signed shortest difference from `from` to `to`, in `[-180, 180)`
pub fn delta_angle(from: f32, to: f32) -> f32 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Interpolate between two angles along the shortest arc
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    from + delta_angle(from, to) * t
}

/// Rotate `point` around `pivot` by `degrees`
pub fn rotate_point(point: Vec2, degrees: f32, pivot: Vec2) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(point - pivot) + pivot
}

/// Frame-rate independent exponential approach towards a target
pub fn smooth_approach(current: f32, target: f32, speed: f32, dt: f32) -> f32 {
    current.lerp(&target, 1.0 - (-speed * dt).exp())
}

/// Frame-rate independent exponential approach for vectors
pub fn smooth_approach_vec(current: Vec2, target: Vec2, speed: f32, dt: f32) -> Vec2 {
    current.lerp(target, 1.0 - (-speed * dt).exp())
}

/// [`smooth_approach`] for angles, taking the shortest arc
pub fn smooth_angle_approach(current: f32, target: f32, speed: f32, dt: f32) -> f32 {
    lerp_angle(current, target, 1.0 - (-speed * dt).exp())
}

/// Standard in-out easing curves over `[0, 1]`
pub mod easing {
    /// Quadratic ease-in-out
    pub fn quad_in_out(x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        if x < 0.5 {
            2.0 * x * x
        } else {
            1.0 - (-2.0 * x + 2.0).powi(2) / 2.0
        }
    }

    /// Cubic ease-in-out
    pub fn cubic_in_out(x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        if x < 0.5 {
            4.0 * x * x * x
        } else {
            1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
        }
    }

    /// Circular ease-in-out
    pub fn circ_in_out(x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        if x < 0.5 {
            (1.0 - (1.0 - (2.0 * x).powi(2)).sqrt()) / 2.0
        } else {
            ((1.0 - (-2.0 * x + 2.0).powi(2)).sqrt() + 1.0) / 2.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::easing::*;
    use super::*;

    #[test]
    fn test_vector_angle_roundtrip() {
        assert!((vector_to_angle(Vec2::X) - 0.0).abs() < 0.001);
        assert!((vector_to_angle(Vec2::Y) - 90.0).abs() < 0.001);
        assert!((vector_to_angle(Vec2::NEG_X).abs() - 180.0).abs() < 0.001);

        let v = angle_to_vector(45.0);
        assert!((v.x - v.y).abs() < 0.001);
        assert!((v.length() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_lerp_angle_takes_short_arc() {
        // 350 -> 10 should pass through 0, not 180
        let mid = lerp_angle(350.0, 10.0, 0.5);
        assert!((mid.rem_euclid(360.0) - 0.0).abs() < 0.001 || (mid - 360.0).abs() < 0.001);

        assert!((lerp_angle(0.0, 90.0, 0.5) - 45.0).abs() < 0.001);
        assert!((delta_angle(170.0, -170.0) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_rotate_point() {
        let p = rotate_point(Vec2::new(2.0, 1.0), 90.0, Vec2::new(1.0, 1.0));
        assert!((p.x - 1.0).abs() < 0.001);
        assert!((p.y - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_easing_endpoints() {
        for f in [quad_in_out, cubic_in_out, circ_in_out] {
            assert!(f(0.0).abs() < 0.001);
            assert!((f(0.5) - 0.5).abs() < 0.001);
            assert!((f(1.0) - 1.0).abs() < 0.001);
        }
        // Out of range input is clamped rather than producing NaN
        assert!((circ_in_out(1.1) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_quad_in_out_snap_neighbourhood() {
        assert!(quad_in_out(0.49) < 0.5);
        assert!(quad_in_out(0.51) > 0.5);
    }

    #[test]
    fn test_smooth_approach_converges() {
        let mut v = 10.0;
        for _ in 0..200 {
            v = smooth_approach(v, 0.0, 10.0, 0.016);
        }
        assert!(v.abs() < 0.01);
    }
}
