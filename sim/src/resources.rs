use bevy_ecs::prelude::*;
use std::time::Duration;

use stealth::{Body, ColliderSet, DetectionState, Locomotion, PlayerMotion, Pose2};

use crate::scenario::Script;

// ============================================================================
// Bevy Resources
// ============================================================================

// Fixed simulation step, advanced once per update
#[derive(Resource, Debug, Clone, Copy)]
pub struct TickStep(pub Duration);

// Level colliders plus the index of the player's own collider
#[derive(Resource, Debug)]
pub struct SceneColliders {
    pub set: ColliderSet,
    pub player: usize,
}

#[derive(Resource, Debug)]
pub struct PlayerState {
    pub motion: PlayerMotion,
    pub locomotion: Locomotion,
    pub drag_key_held: bool,
}

#[derive(Resource, Debug, Default)]
pub struct Bodies(pub Vec<Body>);

#[derive(Resource, Debug, Default)]
pub struct PlayerScript(pub Script);

// ============================================================================
// Bevy Components
// ============================================================================

#[derive(Component, Debug, Clone)]
pub struct Guard {
    pub name: String,
    pub pose: Pose2,
}

// Simulation time at which the guard leaves the level
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAt(pub f32);

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRecord {
    pub tick: u64,
    pub time: f32,
    pub armed: bool,
    pub state: DetectionState,
    pub progress: f32,
    pub rating: f32,
}

#[derive(Resource, Debug, Default)]
pub struct SimStats {
    pub ticks: u64,
    pub warnings: u32,
    pub catches: u32,
    pub escapes: u32,
    pub blocked: u32,
    pub peak_progress: f32,
    pub history: Vec<TickRecord>,
}

impl SimStats {
    #[must_use]
    pub fn last(&self) -> Option<&TickRecord> {
        self.history.last()
    }
}
