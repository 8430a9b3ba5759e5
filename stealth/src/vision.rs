//! Per-guard vision cone sensor.
//!
//! A cone casts a fan of rays around the guard's heading and reports whether
//! the nearest thing any ray touches is the player. Detection only runs while
//! the manager is armed; the false-to-true edge is reported separately so the
//! manager can start a detection episode exactly once per sighting.

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_ecs::component::Component;
use bevy_math::Vec2;
use tracing::debug;

use crate::{
    constants::*,
    geometry::{Pose2, direction_from_degrees},
    raycast::{Classification, LayerMask, RaycastQuery},
};

// ============================================================================
// Configuration
// ============================================================================

/// Back-and-forth sweep applied on top of the guard's heading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct Oscillation {
    pub speed: f32, // degrees per second
    pub range: f32, // degrees, full sweep
}

impl Default for Oscillation {
    fn default() -> Self {
        Self {
            speed: VISION_ROTATION_SPEED,
            range: VISION_ROTATION_RANGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct ConeConfig {
    pub range: f32,
    pub angle: f32, // degrees, full cone
    pub ray_count: u32,
    pub oscillation: Option<Oscillation>,
}

impl Default for ConeConfig {
    fn default() -> Self {
        Self {
            range: VISION_RANGE,
            angle: VISION_ANGLE,
            ray_count: VISION_RAY_COUNT,
            oscillation: None,
        }
    }
}

impl ConeConfig {
    /// Clamp into the supported ranges. Runs once when a cone is built, never per tick.
    #[must_use]
    pub fn normalized(self) -> Self {
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        Self {
            range: finite_or(self.range, VISION_RANGE).max(MIN_VISION_RANGE),
            angle: finite_or(self.angle, VISION_ANGLE).clamp(MIN_VISION_ANGLE, MAX_VISION_ANGLE),
            ray_count: self.ray_count.max(MIN_VISION_RAY_COUNT),
            oscillation: self.oscillation.map(|osc| Oscillation {
                speed: finite_or(osc.speed, VISION_ROTATION_SPEED).abs(),
                range: finite_or(osc.range, VISION_ROTATION_RANGE).abs(),
            }),
        }
    }

    #[must_use]
    pub fn half_angle(&self) -> f32 {
        self.angle / 2.0
    }
}

// ============================================================================
// Sensor
// ============================================================================

/// Result of one evaluation. `spotted` is true only on the tick detection begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorReport {
    pub detected: bool,
    pub spotted: bool,
}

#[derive(Debug, Clone, Component)]
pub struct VisionCone {
    config: ConeConfig,
    rotation_offset: f32,    // degrees
    rotation_direction: f32, // +1 or -1
    detected: bool,
    detected_last_tick: bool,
}

impl VisionCone {
    #[must_use]
    pub fn new(config: ConeConfig) -> Self {
        Self {
            config: config.normalized(),
            rotation_offset: 0.0,
            rotation_direction: 1.0,
            detected: false,
            detected_last_tick: false,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ConeConfig {
        &self.config
    }

    #[must_use]
    pub const fn rotation_offset(&self) -> f32 {
        self.rotation_offset
    }

    #[must_use]
    pub const fn is_player_detected(&self) -> bool {
        self.detected
    }

    /// Advance the sweep. No-op for cones without oscillation.
    pub fn rotate(&mut self, delta: f32) {
        let Some(osc) = self.config.oscillation else {
            return;
        };

        self.rotation_offset += osc.speed * self.rotation_direction * delta;

        let limit = osc.range / 2.0;
        if self.rotation_offset.abs() > limit {
            self.rotation_direction = -self.rotation_direction;
            self.rotation_offset = self.rotation_offset.clamp(-limit, limit);
        }
    }

    /// World-space ray directions for the given guard pose, evenly spaced
    /// from `-angle/2` to `+angle/2` around the current heading.
    pub fn ray_directions(&self, pose: &Pose2) -> impl Iterator<Item = Vec2> + use<> {
        let step = self.config.angle / self.config.ray_count as f32;
        let start = pose.heading.to_degrees() + self.rotation_offset - self.config.half_angle();

        (0..=self.config.ray_count).map(move |i| direction_from_degrees(step.mul_add(i as f32, start)))
    }

    /// Cast the cone and update edge state.
    pub fn evaluate<Q>(&mut self, pose: &Pose2, query: &Q, armed: bool) -> SensorReport
    where
        Q: RaycastQuery + ?Sized,
    {
        if !armed {
            self.reset();
            return SensorReport::default();
        }

        let hit_player = self.ray_directions(pose).find_map(|direction| {
            query
                .cast_ray(pose.position, direction, self.config.range, LayerMask::VISION)
                .filter(|hit| hit.classification == Classification::Player)
        });

        let detected = hit_player.is_some();
        let spotted = detected && !self.detected_last_tick;

        if let Some(hit) = hit_player.filter(|_| spotted) {
            debug!(
                "cone at ({:.2}, {:.2}) detected player at ({:.2}, {:.2})",
                pose.position.x, pose.position.y, hit.point.x, hit.point.y
            );
        }

        self.detected = detected;
        self.detected_last_tick = detected;

        SensorReport { detected, spotted }
    }

    // Forget any ongoing sighting so the next detection counts as a new one.
    pub const fn reset(&mut self) {
        self.detected = false;
        self.detected_last_tick = false;
    }
}
