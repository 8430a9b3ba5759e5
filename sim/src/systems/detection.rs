use bevy_ecs::prelude::*;
use bevy_time::Time;
use tracing::{info, warn};

use stealth::{DetectionEvent, DetectionManager, PenaltySink, StarRating};

use crate::resources::{SimStats, TickRecord};

// ============================================================================
// Detection System
// ============================================================================

// Advance the grace timer from this tick's reports and apply side effects.
pub fn detection_system(
    time: Res<Time>,
    mut manager: ResMut<DetectionManager>,
    mut rating: ResMut<StarRating>,
    mut stats: ResMut<SimStats>,
) {
    let now = time.elapsed_secs();
    manager.tick(time.delta_secs(), now, Some(&mut *rating));

    for event in manager.drain_events() {
        match event {
            DetectionEvent::Warning { sensor } => {
                stats.warnings += 1;
                warn!("[{:.2}s] spotted by {:?}! escape quickly", now, sensor);
            }
            DetectionEvent::Caught { sensor, rating } => {
                stats.catches += 1;
                match rating {
                    Some((before, after)) => info!("[{:.2}s] caught by {:?}, stars {:.1} -> {:.1}", now, sensor, before, after),
                    None => info!("[{:.2}s] caught by {:?}", now, sensor),
                }
            }
            DetectionEvent::Escaped => {
                stats.escapes += 1;
                info!("[{:.2}s] escaped", now);
            }
            DetectionEvent::SpotBlocked { remaining, .. } => {
                stats.blocked += 1;
                info!("[{:.2}s] spotted while invulnerable ({:.1}s left)", now, remaining);
            }
        }
    }

    let progress = manager.detection_progress();
    stats.peak_progress = stats.peak_progress.max(progress);
    stats.ticks += 1;

    let record = TickRecord {
        tick: stats.ticks,
        time: now,
        armed: manager.is_armed(),
        state: manager.state(),
        progress,
        rating: rating.rating(),
    };
    stats.history.push(record);
}
