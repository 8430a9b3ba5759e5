#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_math::Vec2;

use crate::constants::PHYSICS_EPSILON;

// ============================================================================
// Poses
// ============================================================================

/// Position plus heading on the ground plane. Heading is in radians,
/// counter-clockwise from +X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct Pose2 {
    pub position: Vec2,
    pub heading: f32,
}

impl Pose2 {
    #[must_use]
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }
}

// Unit vector for an angle given in degrees.
#[must_use]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

// ============================================================================
// Shapes
// ============================================================================

/// Axis-aligned box described by its center and half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Shape {
    Box(Aabb),
    Circle(Circle),
}

impl Shape {
    /// Distance along a unit-length ray to the first point of this shape,
    /// or `None` when the ray misses within `max_distance`. A ray starting
    /// inside the shape hits at distance zero.
    #[must_use]
    pub fn ray_distance(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<f32> {
        match self {
            Self::Box(aabb) => ray_vs_aabb(origin, direction, max_distance, aabb),
            Self::Circle(circle) => ray_vs_circle(origin, direction, max_distance, circle),
        }
    }

    #[must_use]
    pub const fn center(&self) -> Vec2 {
        match self {
            Self::Box(aabb) => aabb.center,
            Self::Circle(circle) => circle.center,
        }
    }

    pub fn set_center(&mut self, center: Vec2) {
        match self {
            Self::Box(aabb) => aabb.center = center,
            Self::Circle(circle) => circle.center = center,
        }
    }
}

// ============================================================================
// Ray Intersection
// ============================================================================

// Compute the intersection interval of a ray with a slab (used in ray-AABB tests)
#[must_use]
pub fn ray_slab_interval(local_coord: f32, ray_dir: f32, half_extent: f32, t_min: f32, t_max: f32) -> Option<(f32, f32)> {
    if ray_dir.abs() > PHYSICS_EPSILON {
        let t1 = (-half_extent - local_coord) / ray_dir;
        let t2 = (half_extent - local_coord) / ray_dir;
        let new_min = t_min.max(t1.min(t2));
        let new_max = t_max.min(t1.max(t2));
        if new_min <= new_max {
            Some((new_min, new_max))
        } else {
            None
        }
    } else if local_coord.abs() > half_extent {
        None
    } else {
        Some((t_min, t_max))
    }
}

#[must_use]
pub fn ray_vs_aabb(origin: Vec2, direction: Vec2, max_distance: f32, aabb: &Aabb) -> Option<f32> {
    let local = origin - aabb.center;

    let (t_min, t_max) = ray_slab_interval(local.x, direction.x, aabb.half_extents.x, 0.0, max_distance)?;
    let (t_min, _) = ray_slab_interval(local.y, direction.y, aabb.half_extents.y, t_min, t_max)?;

    Some(t_min)
}

#[must_use]
pub fn ray_vs_circle(origin: Vec2, direction: Vec2, max_distance: f32, circle: &Circle) -> Option<f32> {
    let offset = origin - circle.center;
    let b = offset.dot(direction);
    let c = circle.radius.mul_add(-circle.radius, offset.length_squared());

    // Outside and pointing away
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discriminant = b.mul_add(b, -c);
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()).max(0.0);
    (t <= max_distance).then_some(t)
}
