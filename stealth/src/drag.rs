//! Body dragging: the player action that arms the vision cones.

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_ecs::prelude::Resource;
use bevy_math::Vec2;
use tracing::{debug, info, warn};

use crate::{constants::*, detection::DetectionManager};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct BodyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub position: Vec2,
    pub draggable: bool,
}

// Player speed knob the drag slows down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locomotion {
    pub move_speed: f32,
}

// Per-tick player motion the dragged body follows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerMotion {
    pub position: Vec2,
    pub input_direction: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct DragConfig {
    pub drag_distance: f32,
    pub speed_multiplier: f32,
    pub pickup_radius: f32,
    pub follow_rate: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drag_distance: DRAG_DISTANCE,
            speed_multiplier: DRAG_SPEED_MULTIPLIER,
            pickup_radius: DRAG_PICKUP_RADIUS,
            follow_rate: DRAG_FOLLOW_RATE,
        }
    }
}

impl DragConfig {
    #[must_use]
    pub fn normalized(self) -> Self {
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        Self {
            drag_distance: finite_or(self.drag_distance, DRAG_DISTANCE).max(0.0),
            speed_multiplier: finite_or(self.speed_multiplier, DRAG_SPEED_MULTIPLIER).max(0.0),
            pickup_radius: finite_or(self.pickup_radius, DRAG_PICKUP_RADIUS).max(0.0),
            follow_rate: finite_or(self.follow_rate, DRAG_FOLLOW_RATE).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Dragging {
    body: BodyId,
    base_speed: f32,
}

// ============================================================================
// Body Drag Controller
// ============================================================================

#[derive(Debug, Clone, Resource)]
pub struct BodyDrag {
    config: DragConfig,
    dragging: Option<Dragging>,
    last_heading: Vec2,
}

impl Default for BodyDrag {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl BodyDrag {
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self {
            config: config.normalized(),
            dragging: None,
            last_heading: Vec2::X,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DragConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    #[must_use]
    pub fn dragged_body(&self) -> Option<BodyId> {
        self.dragging.map(|d| d.body)
    }

    /// Nearest draggable body within the pickup radius.
    #[must_use]
    pub fn nearest_body(&self, player_pos: Vec2, bodies: &[Body]) -> Option<BodyId> {
        let radius_sq = self.config.pickup_radius * self.config.pickup_radius;

        bodies
            .iter()
            .filter(|body| body.draggable)
            .map(|body| (body.id, body.position.distance_squared(player_pos)))
            .filter(|(_, dist_sq)| *dist_sq <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Pick up the nearest body, slow the player down and arm the cones.
    pub fn try_start(
        &mut self,
        player_pos: Vec2,
        bodies: &[Body],
        locomotion: &mut Locomotion,
        manager: Option<&mut DetectionManager>,
    ) -> Option<BodyId> {
        if self.dragging.is_some() {
            return None;
        }

        let Some(body) = self.nearest_body(player_pos, bodies) else {
            debug!("no body within {:.1}m to drag", self.config.pickup_radius);
            return None;
        };

        self.dragging = Some(Dragging {
            body,
            base_speed: locomotion.move_speed,
        });
        locomotion.move_speed *= self.config.speed_multiplier;
        info!("started dragging {:?}", body);

        if let Some(manager) = manager {
            manager.set_armed(true);
        } else {
            warn!("dragging without a detection manager, cones stay disarmed");
        }

        Some(body)
    }

    /// Drop the body, restore speed and disarm the cones.
    pub fn stop(&mut self, locomotion: &mut Locomotion, manager: Option<&mut DetectionManager>) {
        let Some(dragging) = self.dragging.take() else {
            return;
        };

        locomotion.move_speed = dragging.base_speed;
        info!("stopped dragging {:?}", dragging.body);

        if let Some(manager) = manager {
            manager.set_armed(false);
        } else {
            warn!("stopped dragging without a detection manager");
        }
    }

    /// Ease the dragged body toward a point behind the player.
    pub fn follow(&mut self, motion: &PlayerMotion, bodies: &mut [Body], delta: f32) {
        let heading = self.heading(motion);

        let Some(dragging) = self.dragging else {
            return;
        };
        let Some(body) = bodies.iter_mut().find(|body| body.id == dragging.body) else {
            warn!("dragged body {:?} no longer exists", dragging.body);
            return;
        };

        let target = motion.position - heading * self.config.drag_distance;
        let t = (delta * self.config.follow_rate).clamp(0.0, 1.0);
        body.position = body.position.lerp(target, t);
    }

    // Movement input, then velocity, then whatever direction we last moved in.
    fn heading(&mut self, motion: &PlayerMotion) -> Vec2 {
        let moving = [motion.input_direction, motion.velocity]
            .into_iter()
            .find(|dir| dir.length() >= DRAG_HEADING_THRESHOLD)
            .map(Vec2::normalize);

        if let Some(dir) = moving {
            self.last_heading = dir;
        }
        self.last_heading
    }
}
