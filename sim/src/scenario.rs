use anyhow::{Context, Result, bail};
use bevy_math::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use stealth::{ConeConfig, Shape, StealthConfig, constants::STAR_RATING_MAX};

use crate::constants::{PLAYER_MOVE_SPEED, PLAYER_RADIUS};

// ============================================================================
// Scenario File
// ============================================================================

/// A scripted play session: level geometry, guards, bodies and a timeline of
/// player actions standing in for live input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: StealthConfig,
    pub duration: f32, // seconds
    #[serde(default)]
    pub rating: RatingSetup,
    #[serde(default)]
    pub player: PlayerSetup,
    #[serde(default)]
    pub obstacles: Vec<Shape>,
    #[serde(default)]
    pub guards: Vec<GuardSetup>,
    #[serde(default)]
    pub bodies: Vec<Vec2>,
    #[serde(default)]
    pub script: Script,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSetup {
    pub start: f32,
    pub max: f32,
}

impl Default for RatingSetup {
    fn default() -> Self {
        Self {
            start: STAR_RATING_MAX,
            max: STAR_RATING_MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSetup {
    pub position: Vec2,
    pub move_speed: f32,
    pub radius: f32,
}

impl Default for PlayerSetup {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            move_speed: PLAYER_MOVE_SPEED,
            radius: PLAYER_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardSetup {
    pub name: String,
    pub position: Vec2,
    #[serde(default)]
    pub heading: f32, // degrees
    // Falls back to `config.cone`
    #[serde(default)]
    pub cone: Option<ConeConfig>,
    // Guard leaves the level at this time
    #[serde(default)]
    pub despawn_at: Option<f32>,
}

// ============================================================================
// Player Script
// ============================================================================

/// From `at` onwards the player walks in `direction` (zero = stand still).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveKey {
    pub at: f32,
    pub direction: Vec2,
}

/// Drag key held from `start` until `end`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DragHold {
    pub start: f32,
    pub end: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    pub moves: Vec<MoveKey>,
    pub drag: Vec<DragHold>,
}

impl Script {
    /// Direction of the latest move key at or before `now`.
    #[must_use]
    pub fn direction_at(&self, now: f32) -> Vec2 {
        self.moves
            .iter()
            .filter(|key| key.at <= now)
            .max_by(|a, b| a.at.total_cmp(&b.at))
            .map_or(Vec2::ZERO, |key| key.direction.normalize_or_zero())
    }

    #[must_use]
    pub fn drag_held_at(&self, now: f32) -> bool {
        self.drag.iter().any(|hold| hold.start <= now && now < hold.end)
    }
}

// ============================================================================
// Loading
// ============================================================================

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut scenario: Self = serde_json::from_str(json).context("Failed to parse scenario")?;
        scenario.config = scenario.config.normalized();
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            bail!("duration must be positive, got {}", self.duration);
        }
        if self.player.radius <= 0.0 {
            bail!("player radius must be positive, got {}", self.player.radius);
        }
        for hold in &self.script.drag {
            if hold.end < hold.start {
                bail!("drag hold ends ({}) before it starts ({})", hold.end, hold.start);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn cone_for(&self, guard: &GuardSetup) -> ConeConfig {
        guard.cone.unwrap_or(self.config.cone).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{ "duration": 3.0 }"#;

    #[test]
    fn minimal_scenario_uses_defaults() {
        let scenario = Scenario::from_json_str(MINIMAL).unwrap();
        assert!(scenario.guards.is_empty());
        assert_eq!(scenario.player.move_speed, PLAYER_MOVE_SPEED);
        assert_eq!(scenario.rating.start, STAR_RATING_MAX);
    }

    #[test]
    fn rejects_non_positive_duration() {
        let err = Scenario::from_json_str(r#"{ "duration": 0.0 }"#).unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn rejects_backwards_drag_hold() {
        let json = r#"{ "duration": 3.0, "script": { "drag": [ { "start": 2.0, "end": 1.0 } ] } }"#;
        assert!(Scenario::from_json_str(json).is_err());
    }

    #[test]
    fn script_lookups() {
        let script = Script {
            moves: vec![
                MoveKey {
                    at: 0.0,
                    direction: Vec2::new(2.0, 0.0),
                },
                MoveKey {
                    at: 1.0,
                    direction: Vec2::ZERO,
                },
            ],
            drag: vec![DragHold { start: 0.5, end: 1.5 }],
        };
        assert_eq!(script.direction_at(0.5), Vec2::X);
        assert_eq!(script.direction_at(1.0), Vec2::ZERO);
        assert!(!script.drag_held_at(0.25));
        assert!(script.drag_held_at(0.5));
        assert!(!script.drag_held_at(1.5));
    }

    #[test]
    fn guard_cone_falls_back_to_config() {
        let json = r#"{
            "duration": 3.0,
            "config": { "cone": { "range": 8.0 } },
            "guards": [
                { "name": "a", "position": [0.0, 0.0] },
                { "name": "b", "position": [1.0, 0.0], "heading": 90.0, "cone": { "range": 2.0, "ray_count": 1 } }
            ]
        }"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        assert_eq!(scenario.cone_for(&scenario.guards[0]).range, 8.0);
        let custom = scenario.cone_for(&scenario.guards[1]);
        assert_eq!(custom.range, 2.0);
        assert_eq!(custom.ray_count, 3);
    }
}
