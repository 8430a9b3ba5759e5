#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_math::Vec2;

use crate::geometry::Shape;

// ============================================================================
// Layers
// ============================================================================

/// What a collider represents to a vision query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum Classification {
    Obstacle,
    Player,
}

impl Classification {
    #[must_use]
    pub const fn layer(self) -> LayerMask {
        match self {
            Self::Obstacle => LayerMask::OBSTACLES,
            Self::Player => LayerMask::PLAYER,
        }
    }
}

/// Bit set of classifications a ray is allowed to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const OBSTACLES: Self = Self(1 << 0);
    pub const PLAYER: Self = Self(1 << 1);
    pub const VISION: Self = Self(Self::OBSTACLES.0 | Self::PLAYER.0);

    #[must_use]
    pub const fn includes(self, classification: Classification) -> bool {
        self.0 & classification.layer().0 != 0
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Nearest intersection along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec2,
    pub classification: Classification,
}

/// Ray-intersection service the environment supplies to sensors.
///
/// Implementations must return the closest hit among colliders whose
/// classification is included in `mask`; `direction` is unit length.
pub trait RaycastQuery {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit>;
}

// ============================================================================
// Collider Set
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct Collider {
    pub shape: Shape,
    pub classification: Classification,
}

impl Collider {
    #[must_use]
    pub const fn obstacle(shape: Shape) -> Self {
        Self {
            shape,
            classification: Classification::Obstacle,
        }
    }

    #[must_use]
    pub const fn player(shape: Shape) -> Self {
        Self {
            shape,
            classification: Classification::Player,
        }
    }
}

/// Flat list of colliders scanned linearly per ray.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    colliders: Vec<Collider>,
}

impl ColliderSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { colliders: Vec::new() }
    }

    pub fn push(&mut self, collider: Collider) -> usize {
        self.colliders.push(collider);
        self.colliders.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Collider> {
        self.colliders.get(index)
    }

    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Collider> {
        self.colliders.get_mut(index)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.colliders.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }
}

impl FromIterator<Collider> for ColliderSet {
    fn from_iter<T: IntoIterator<Item = Collider>>(iter: T) -> Self {
        Self {
            colliders: iter.into_iter().collect(),
        }
    }
}

impl RaycastQuery for ColliderSet {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        self.colliders
            .iter()
            .filter(|collider| mask.includes(collider.classification))
            .filter_map(|collider| {
                collider
                    .shape
                    .ray_distance(origin, direction, max_distance)
                    .map(|distance| (distance, collider.classification))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, classification)| RayHit {
                distance,
                point: origin + direction * distance,
                classification,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Aabb, Circle};

    fn wall_at(x: f32) -> Collider {
        Collider::obstacle(Shape::Box(Aabb {
            center: Vec2::new(x, 0.0),
            half_extents: Vec2::new(0.2, 2.0),
        }))
    }

    fn player_at(x: f32) -> Collider {
        Collider::player(Shape::Circle(Circle {
            center: Vec2::new(x, 0.0),
            radius: 0.4,
        }))
    }

    #[test]
    fn nearest_hit_wins() {
        let set: ColliderSet = [player_at(4.0), wall_at(2.0)].into_iter().collect();
        let hit = set.cast_ray(Vec2::ZERO, Vec2::X, 10.0, LayerMask::VISION).unwrap();
        assert_eq!(hit.classification, Classification::Obstacle);

        let set: ColliderSet = [player_at(2.0), wall_at(4.0)].into_iter().collect();
        let hit = set.cast_ray(Vec2::ZERO, Vec2::X, 10.0, LayerMask::VISION).unwrap();
        assert_eq!(hit.classification, Classification::Player);
    }

    #[test]
    fn mask_filters_classifications() {
        let set: ColliderSet = [player_at(4.0), wall_at(2.0)].into_iter().collect();
        let hit = set.cast_ray(Vec2::ZERO, Vec2::X, 10.0, LayerMask::PLAYER).unwrap();
        assert_eq!(hit.classification, Classification::Player);
        assert!(set.cast_ray(Vec2::ZERO, Vec2::X, 10.0, LayerMask::NONE).is_none());
    }

    #[test]
    fn hit_point_lies_on_ray() {
        let set: ColliderSet = std::iter::once(wall_at(3.0)).collect();
        let hit = set.cast_ray(Vec2::ZERO, Vec2::X * 5.0, 10.0, LayerMask::OBSTACLES).unwrap();
        assert!((hit.point - Vec2::new(2.8, 0.0)).length() < 1e-5);
    }

    #[test]
    fn zero_direction_is_a_miss() {
        let set: ColliderSet = std::iter::once(wall_at(0.0)).collect();
        assert!(set.cast_ray(Vec2::ZERO, Vec2::ZERO, 10.0, LayerMask::VISION).is_none());
    }
}
