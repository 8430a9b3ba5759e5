use bevy_ecs::prelude::*;
use bevy_time::Time;

use crate::resources::TickStep;

// Advance simulation time by exactly one fixed step per update.
pub fn advance_clock_system(step: Res<TickStep>, mut time: ResMut<Time>) {
    time.advance_by(step.0);
}
