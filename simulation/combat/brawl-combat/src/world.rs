//! Collaborator interfaces for physics queries and level terrain
//!
//! The combat core never owns a physics engine. It asks a [`PhysicsWorld`] for
//! raycasts and a [`Terrain`] for floor shape. [`FlatArena`] is a small
//! axis-aligned implementation of both, enough for tests and scripted duels.

use std::collections::HashSet;
use std::fmt;

use bitflags::bitflags;
use brawl_ragdoll::{CollisionSurface, FlatGround, SurfaceHit};
use glam::Vec2;

/// Opaque handle of a physics entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Collision filter bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
    pub struct CollisionLayers: u32 {
        /// Level geometry that stops attacks and ragdolls
        const BLOCK_PHYSICS = 1 << 0;
        const PLAYER = 1 << 1;
        const ENEMY = 1 << 2;
        const PROPS = 1 << 3;
        const CHARACTERS = Self::PLAYER.bits() | Self::ENEMY.bits();
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() / 2.0;
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Entry distance and surface normal of a ray, if it hits within `max_distance`
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;
        let mut normal = Vec2::ZERO;

        for axis in 0..2 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let mut t1 = (lo - o) / d;
            let mut t2 = (hi - o) / d;
            let mut axis_normal = Vec2::ZERO;
            axis_normal[axis] = -d.signum();
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            if t1 > t_min {
                t_min = t1;
                normal = axis_normal;
            }
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if normal == Vec2::ZERO {
            // Origin inside the rectangle
            normal = -direction.normalize_or_zero();
        }
        Some((t_min, normal))
    }
}

/// Result of a physics raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub position: Vec2,
    pub normal: Vec2,
    pub distance: f32,
    pub entity: EntityId,
}

/// Physics queries the combat core relies on
pub trait PhysicsWorld {
    /// Closest hit along `direction` within `max_distance`
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionLayers,
        ignore: &HashSet<EntityId>,
    ) -> Option<RaycastHit>;

    /// Every entity whose collider overlaps `rect`
    fn query_rectangle(&self, rect: Rect, mask: CollisionLayers) -> Vec<EntityId>;
}

/// Floor shape of the level
pub trait Terrain {
    fn floor_level_at(&self, x: f32) -> f32;

    /// Death animations need level ground to play out
    fn is_flat_at(&self, x: f32) -> bool;
}

/// A rectangle collider registered with a [`FlatArena`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub entity: EntityId,
    pub rect: Rect,
    pub layers: CollisionLayers,
}

/// Flat floor plus rectangle colliders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatArena {
    pub floor: f32,
    statics: Vec<Collider>,
    dynamics: Vec<Collider>,
}

impl FlatArena {
    pub fn new(floor: f32) -> Self {
        Self {
            floor,
            ..Default::default()
        }
    }

    /// Add level geometry that never moves
    pub fn add_static(&mut self, collider: Collider) {
        self.statics.push(collider);
    }

    /// Add a pair of walls at `left` and `right`
    pub fn with_walls(mut self, left: f32, right: f32, first_entity: u64) -> Self {
        for (i, x) in [left, right].into_iter().enumerate() {
            self.add_static(Collider {
                entity: EntityId(first_entity + i as u64),
                rect: Rect::new(Vec2::new(x - 25.0, self.floor), Vec2::new(x + 25.0, self.floor + 2000.0)),
                layers: CollisionLayers::BLOCK_PHYSICS,
            });
        }
        self
    }

    /// Replace every moving collider, typically once per frame
    pub fn sync(&mut self, colliders: impl IntoIterator<Item = Collider>) {
        self.dynamics.clear();
        self.dynamics.extend(colliders);
    }

    pub fn colliders(&self) -> impl Iterator<Item = &Collider> {
        self.statics.iter().chain(self.dynamics.iter())
    }
}

impl PhysicsWorld for FlatArena {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionLayers,
        ignore: &HashSet<EntityId>,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        self.colliders()
            .filter(|c| c.layers.intersects(mask) && !ignore.contains(&c.entity))
            .filter_map(|c| {
                c.rect
                    .raycast(origin, direction, max_distance)
                    .map(|(distance, normal)| RaycastHit {
                        position: origin + direction * distance,
                        normal,
                        distance,
                        entity: c.entity,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn query_rectangle(&self, rect: Rect, mask: CollisionLayers) -> Vec<EntityId> {
        self.colliders()
            .filter(|c| c.layers.intersects(mask) && c.rect.overlaps(&rect))
            .map(|c| c.entity)
            .collect()
    }
}

impl Terrain for FlatArena {
    fn floor_level_at(&self, _x: f32) -> f32 {
        self.floor
    }

    fn is_flat_at(&self, _x: f32) -> bool {
        true
    }
}

/// Ragdoll collision against the floor of a [`Terrain`]
pub struct TerrainSurface<'a>(pub &'a dyn Terrain);

impl CollisionSurface for TerrainSurface<'_> {
    fn raycast(&self, from: Vec2, to: Vec2) -> Option<SurfaceHit> {
        FlatGround {
            height: self.0.floor_level_at(to.x),
        }
        .raycast(from, to)
    }

    fn overlap(&self, center: Vec2, radius: f32) -> Option<SurfaceHit> {
        FlatGround {
            height: self.0.floor_level_at(center.x),
        }
        .overlap(center, radius)
    }
}

impl CollisionSurface for FlatArena {
    fn raycast(&self, from: Vec2, to: Vec2) -> Option<SurfaceHit> {
        FlatGround { height: self.floor }.raycast(from, to)
    }

    fn overlap(&self, center: Vec2, radius: f32) -> Option<SurfaceHit> {
        FlatGround { height: self.floor }.overlap(center, radius)
    }
}
