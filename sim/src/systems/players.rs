use bevy_ecs::prelude::*;
use bevy_time::Time;

use stealth::{BodyDrag, DetectionManager};

use crate::resources::{Bodies, PlayerScript, PlayerState, SceneColliders};

// ============================================================================
// Player Input System
// ============================================================================

// Reads the scripted input for this tick: drag key edges and walk direction.
pub fn player_input_system(
    time: Res<Time>,
    script: Res<PlayerScript>,
    bodies: Res<Bodies>,
    mut player: ResMut<PlayerState>,
    mut drag: ResMut<BodyDrag>,
    mut manager: ResMut<DetectionManager>,
) {
    let now = time.elapsed_secs();
    let player = &mut *player;

    let held = script.0.drag_held_at(now);
    let pressed = held && !player.drag_key_held;
    player.drag_key_held = held;

    // Pick up only on the press edge, drop whenever the key is up
    if pressed && !drag.is_dragging() {
        drag.try_start(
            player.motion.position,
            &bodies.0,
            &mut player.locomotion,
            Some(&mut *manager),
        );
    } else if !held && drag.is_dragging() {
        drag.stop(&mut player.locomotion, Some(&mut *manager));
    }

    let direction = script.0.direction_at(now);
    player.motion.input_direction = direction;
    player.motion.velocity = direction * player.locomotion.move_speed;
}

// ============================================================================
// Player Movement System
// ============================================================================

pub fn player_movement_system(time: Res<Time>, mut player: ResMut<PlayerState>, mut scene: ResMut<SceneColliders>) {
    let delta = time.delta_secs();

    let velocity = player.motion.velocity;
    player.motion.position += velocity * delta;

    let position = player.motion.position;
    let index = scene.player;
    if let Some(collider) = scene.set.get_mut(index) {
        collider.shape.set_center(position);
    }
}

// ============================================================================
// Body Follow System
// ============================================================================

pub fn body_follow_system(
    time: Res<Time>,
    player: Res<PlayerState>,
    mut drag: ResMut<BodyDrag>,
    mut bodies: ResMut<Bodies>,
) {
    drag.follow(&player.motion, &mut bodies.0, time.delta_secs());
}
