use bevy_app::{App, Update};
use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use bevy_time::Time;
use std::time::Duration;
use tracing::info;

use stealth::{
    Body, BodyDrag, BodyId, Circle, Collider, ColliderSet, DetectionManager, Locomotion, PlayerMotion, Pose2, SensorId,
    Shape, StarRating, VisionCone,
};

use crate::{
    resources::{Bodies, DespawnAt, Guard, PlayerScript, PlayerState, SceneColliders, SimStats, TickStep},
    scenario::Scenario,
    systems::{
        clock::advance_clock_system,
        detection::detection_system,
        guards::{guard_despawn_system, vision_cone_system},
        players::{body_follow_system, player_input_system, player_movement_system},
    },
};

// ============================================================================
// App Construction
// ============================================================================

/// Build a headless app for `scenario`, stepping `1 / tick_rate` seconds per update.
#[must_use]
pub fn build_app(scenario: &Scenario, tick_rate: u32) -> App {
    let mut app = App::new();
    let config = scenario.config;

    // Scene: static obstacles first, then the player's collider
    let mut set: ColliderSet = scenario.obstacles.iter().copied().map(Collider::obstacle).collect();
    let player_collider = set.push(Collider::player(Shape::Circle(Circle {
        center: scenario.player.position,
        radius: scenario.player.radius,
    })));

    let bodies: Vec<Body> = (0u32..)
        .zip(&scenario.bodies)
        .map(|(id, &position)| Body {
            id: BodyId(id),
            position,
            draggable: true,
        })
        .collect();

    let mut manager = DetectionManager::new(config.detection);
    for (id, guard) in (0u32..).zip(&scenario.guards) {
        let sensor_id = SensorId(id);
        manager.register_sensor(sensor_id);

        let pose = Pose2::new(guard.position, guard.heading.to_radians());
        let mut entity = app.world_mut().spawn((
            Guard {
                name: guard.name.clone(),
                pose,
            },
            sensor_id,
            VisionCone::new(scenario.cone_for(guard)),
        ));
        if let Some(at) = guard.despawn_at {
            entity.insert(DespawnAt(at));
        }
    }
    info!(
        "{} guards, {} obstacles, {} bodies",
        manager.sensor_count(),
        scenario.obstacles.len(),
        bodies.len()
    );

    app.insert_resource(Time::<()>::default())
        .insert_resource(TickStep(tick_step(tick_rate)))
        .insert_resource(SceneColliders {
            set,
            player: player_collider,
        })
        .insert_resource(PlayerState {
            motion: PlayerMotion {
                position: scenario.player.position,
                input_direction: Vec2::ZERO,
                velocity: Vec2::ZERO,
            },
            locomotion: Locomotion {
                move_speed: scenario.player.move_speed,
            },
            drag_key_held: false,
        })
        .insert_resource(Bodies(bodies))
        .insert_resource(PlayerScript(scenario.script.clone()))
        .insert_resource(StarRating::new(scenario.rating.start, scenario.rating.max))
        .insert_resource(BodyDrag::new(config.drag))
        .insert_resource(manager)
        .insert_resource(SimStats::default())
        .add_systems(
            Update,
            (
                advance_clock_system,
                player_input_system,
                player_movement_system,
                body_follow_system,
                vision_cone_system,
                detection_system,
                guard_despawn_system,
            )
                .chain(),
        );

    app
}

#[must_use]
pub fn tick_step(tick_rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(tick_rate.max(1)))
}

/// Number of updates needed to cover `duration` seconds.
#[must_use]
pub fn tick_count(duration: f32, tick_rate: u32) -> u64 {
    let ticks = (f64::from(duration) * f64::from(tick_rate)).ceil();
    if ticks.is_finite() && ticks > 0.0 { ticks as u64 } else { 0 }
}

/// Run `ticks` updates back to back.
pub fn run_ticks(app: &mut App, ticks: u64) {
    for _ in 0..ticks {
        app.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_math() {
        assert_eq!(tick_step(4), Duration::from_millis(250));
        assert_eq!(tick_count(1.0, 30), 30);
        assert_eq!(tick_count(1.01, 10), 11);
        assert_eq!(tick_count(0.0, 30), 0);
    }
}
