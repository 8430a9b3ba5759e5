//! Cross-cone detection state machine.
//!
//! The manager aggregates per-tick sensor reports into one suspicion timer.
//! A sighting starts a grace period; staying seen for the whole period gets
//! the player caught, which costs rating and grants a short invulnerability
//! window. Losing sight of the player for a single tick resets everything.
//!
//! Per tick, callers report every sensor first and then call [`DetectionManager::tick`].
//! Registry changes requested in between are deferred until the tick closes.

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_ecs::prelude::{Component, Resource};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::{
    constants::*,
    rating::PenaltySink,
    vision::SensorReport,
};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Component)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct SensorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionState {
    Idle,
    Detecting { elapsed: f32, sensor: SensorId },
    Invulnerable { until: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionEvent {
    // A sensor started a detection episode
    Warning { sensor: SensorId },
    // Grace period ran out; `rating` is (before, after) when a sink was present
    Caught { sensor: SensorId, rating: Option<(f32, f32)> },
    // Every sensor lost sight during an episode
    Escaped,
    // A sighting arrived during the invulnerability window
    SpotBlocked { sensor: SensorId, remaining: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct DetectionConfig {
    pub grace_period: f32,
    pub penalty_amount: f32,
    pub invulnerability_duration: f32,
    pub show_detection_warning: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            grace_period: DETECTION_GRACE_PERIOD,
            penalty_amount: STAR_PENALTY_AMOUNT,
            invulnerability_duration: POST_CATCH_INVULNERABILITY,
            show_detection_warning: true,
        }
    }
}

impl DetectionConfig {
    #[must_use]
    pub fn normalized(self) -> Self {
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        Self {
            grace_period: finite_or(self.grace_period, DETECTION_GRACE_PERIOD).max(MIN_GRACE_PERIOD),
            penalty_amount: finite_or(self.penalty_amount, STAR_PENALTY_AMOUNT).max(MIN_PENALTY_AMOUNT),
            invulnerability_duration: finite_or(self.invulnerability_duration, POST_CATCH_INVULNERABILITY).max(0.0),
            show_detection_warning: self.show_detection_warning,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RegistryChange {
    Register(SensorId),
    Unregister(SensorId),
}

// ============================================================================
// Detection Manager
// ============================================================================

#[derive(Debug, Resource)]
pub struct DetectionManager {
    config: DetectionConfig,
    // Registered sensors and whether each reported the player this tick
    sensors: HashMap<SensorId, bool>,
    pending: Vec<RegistryChange>,
    pass_open: bool,
    armed: bool,
    state: DetectionState,
    invulnerable_until: f32,
    events: Vec<DetectionEvent>,
}

impl Default for DetectionManager {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl DetectionManager {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config: config.normalized(),
            sensors: HashMap::new(),
            pending: Vec::new(),
            pass_open: false,
            armed: false,
            state: DetectionState::Idle,
            invulnerable_until: f32::NEG_INFINITY,
            events: Vec::new(),
        }
    }

    // ============================================================================
    // Registry
    // ============================================================================

    pub fn register_sensor(&mut self, id: SensorId) {
        if self.pass_open {
            debug!("deferring registration of sensor {:?}", id);
            self.pending.push(RegistryChange::Register(id));
            return;
        }
        if self.sensors.insert(id, false).is_none() {
            debug!("registered sensor {:?} ({} total)", id, self.sensors.len());
        }
    }

    pub fn unregister_sensor(&mut self, id: SensorId) {
        if self.pass_open {
            debug!("deferring removal of sensor {:?}", id);
            self.pending.push(RegistryChange::Unregister(id));
            return;
        }
        if self.sensors.remove(&id).is_some() {
            debug!("unregistered sensor {:?} ({} left)", id, self.sensors.len());
            self.retarget_episode(id);
        }
    }

    // An episode must never point at a sensor that is gone.
    fn retarget_episode(&mut self, removed: SensorId) {
        let DetectionState::Detecting { elapsed, sensor } = self.state else {
            return;
        };
        if sensor != removed {
            return;
        }

        if let Some(next) = self.sensors.keys().min().copied() {
            debug!("episode handed from {:?} to {:?}", removed, next);
            self.state = DetectionState::Detecting { elapsed, sensor: next };
        } else {
            info!("last sensor removed, player escaped detection");
            self.state = DetectionState::Idle;
            self.events.push(DetectionEvent::Escaped);
        }
    }

    #[must_use]
    pub fn is_registered(&self, id: SensorId) -> bool {
        self.sensors.contains_key(&id)
    }

    #[must_use]
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    // ============================================================================
    // Arming
    // ============================================================================

    pub fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
        if !armed && self.state != DetectionState::Idle {
            debug!("disarmed while {:?}, resetting to idle", self.state);
            self.state = DetectionState::Idle;
        }
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    // ============================================================================
    // Sensor Pass
    // ============================================================================

    /// Record one sensor's evaluation for the current tick.
    pub fn report(&mut self, id: SensorId, report: SensorReport, now: f32) {
        let Some(detected) = self.sensors.get_mut(&id) else {
            warn!("ignoring report from unregistered sensor {:?}", id);
            return;
        };
        self.pass_open = true;
        *detected |= report.detected;

        if report.spotted {
            self.on_player_spotted(id, now);
        }
    }

    /// Edge-triggered sighting from `sensor`; may start a detection episode.
    pub fn on_player_spotted(&mut self, sensor: SensorId, now: f32) {
        if !self.armed {
            debug!("sighting from {:?} ignored while disarmed", sensor);
            return;
        }

        if now < self.invulnerable_until {
            let remaining = self.invulnerable_until - now;
            debug!("detection blocked, still invulnerable for {:.1}s", remaining);
            self.events.push(DetectionEvent::SpotBlocked { sensor, remaining });
            return;
        }

        if let DetectionState::Detecting { elapsed, .. } = self.state {
            debug!("already detecting (timer: {:.2}s)", elapsed);
            return;
        }

        self.state = DetectionState::Detecting { elapsed: 0.0, sensor };
        info!(
            "detection started by {:?}, grace period {:.2}s",
            sensor, self.config.grace_period
        );

        if self.config.show_detection_warning {
            self.events.push(DetectionEvent::Warning { sensor });
        }
    }

    // ============================================================================
    // Tick
    // ============================================================================

    /// Advance the timer using this tick's reports, then close the pass.
    pub fn tick(&mut self, delta: f32, now: f32, sink: Option<&mut dyn PenaltySink>) {
        let delta = delta.max(0.0);
        let any_detected = self.sensors.values().any(|&detected| detected);

        match self.state {
            DetectionState::Idle => {}
            DetectionState::Invulnerable { until } => {
                if now >= until {
                    debug!("invulnerability expired");
                    self.state = DetectionState::Idle;
                }
            }
            DetectionState::Detecting { elapsed, sensor } => {
                if any_detected {
                    let elapsed = elapsed + delta;
                    if elapsed >= self.config.grace_period {
                        info!(
                            "grace period ended ({:.2}s >= {:.2}s)",
                            elapsed, self.config.grace_period
                        );
                        self.catch_player(sensor, now, sink);
                    } else {
                        self.state = DetectionState::Detecting { elapsed, sensor };
                    }
                } else {
                    info!("player escaped detection");
                    self.state = DetectionState::Idle;
                    self.events.push(DetectionEvent::Escaped);
                }
            }
        }

        self.close_pass();
    }

    fn catch_player(&mut self, sensor: SensorId, now: f32, sink: Option<&mut dyn PenaltySink>) {
        let rating = if let Some(sink) = sink {
            let before = sink.rating();
            let after = sink.decrease_rating(self.config.penalty_amount);
            info!("caught! rating {:.1} -> {:.1} (lost {:.1})", before, after, before - after);
            Some((before, after))
        } else {
            warn!("player caught but no penalty sink is configured");
            None
        };

        self.invulnerable_until = now + self.config.invulnerability_duration;
        self.state = DetectionState::Invulnerable {
            until: self.invulnerable_until,
        };
        debug!("invulnerable for {:.1}s", self.config.invulnerability_duration);

        self.events.push(DetectionEvent::Caught { sensor, rating });
    }

    fn close_pass(&mut self) {
        for detected in self.sensors.values_mut() {
            *detected = false;
        }
        self.pass_open = false;

        for change in std::mem::take(&mut self.pending) {
            match change {
                RegistryChange::Register(id) => self.register_sensor(id),
                RegistryChange::Unregister(id) => self.unregister_sensor(id),
            }
        }
    }

    // ============================================================================
    // Queries
    // ============================================================================

    #[must_use]
    pub const fn config(&self) -> &DetectionConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> DetectionState {
        self.state
    }

    #[must_use]
    pub const fn detection_timer(&self) -> f32 {
        match self.state {
            DetectionState::Detecting { elapsed, .. } => elapsed,
            _ => 0.0,
        }
    }

    #[must_use]
    pub const fn triggering_sensor(&self) -> Option<SensorId> {
        match self.state {
            DetectionState::Detecting { sensor, .. } => Some(sensor),
            _ => None,
        }
    }

    /// Fraction of the grace period used up, in `[0, 1]`; zero unless detecting.
    #[must_use]
    pub fn detection_progress(&self) -> f32 {
        match self.state {
            DetectionState::Detecting { elapsed, .. } => {
                (elapsed / self.config.grace_period.max(PHYSICS_EPSILON)).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn invulnerability_remaining(&self, now: f32) -> f32 {
        (self.invulnerable_until - now).max(0.0)
    }

    #[must_use]
    pub fn is_invulnerable(&self, now: f32) -> bool {
        now < self.invulnerable_until
    }

    pub fn drain_events(&mut self) -> Vec<DetectionEvent> {
        std::mem::take(&mut self.events)
    }
}
