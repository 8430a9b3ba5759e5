use bevy_ecs::prelude::*;
use bevy_time::Time;
use tracing::{debug, info};

use stealth::{DetectionManager, SensorId, VisionCone};

use crate::resources::{DespawnAt, Guard, SceneColliders};

// ============================================================================
// Vision Cone System
// ============================================================================

// Sweep and evaluate every cone, reporting each result to the manager.
pub fn vision_cone_system(
    time: Res<Time>,
    scene: Res<SceneColliders>,
    mut manager: ResMut<DetectionManager>,
    mut guards: Query<(&Guard, &SensorId, &mut VisionCone)>,
) {
    let delta = time.delta_secs();
    let now = time.elapsed_secs();
    let armed = manager.is_armed();

    for (guard, sensor_id, mut cone) in &mut guards {
        cone.rotate(delta);
        let report = cone.evaluate(&guard.pose, &scene.set, armed);
        if report.spotted {
            debug!("{} spotted the player", guard.name);
        }
        manager.report(*sensor_id, report, now);
    }
}

// ============================================================================
// Guard Despawn System
// ============================================================================

// Runs after the detection tick so the registry never changes mid-pass.
pub fn guard_despawn_system(
    mut commands: Commands,
    time: Res<Time>,
    mut manager: ResMut<DetectionManager>,
    guards: Query<(Entity, &Guard, &SensorId, &DespawnAt)>,
) {
    let now = time.elapsed_secs();

    for (entity, guard, sensor_id, despawn_at) in &guards {
        if now >= despawn_at.0 {
            manager.unregister_sensor(*sensor_id);
            commands.entity(entity).despawn();
            info!("{} left the level", guard.name);
        }
    }
}
