#[cfg(feature = "json")]
use anyhow::{Context, Result};
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "json")]
use std::path::Path;

use crate::{detection::DetectionConfig, drag::DragConfig, vision::ConeConfig};

// ============================================================================
// Stealth Configuration
// ============================================================================

/// Startup-time knobs for one play session. Values are clamped once on load.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct StealthConfig {
    pub detection: DetectionConfig,
    pub drag: DragConfig,
    // Cone used by guards that don't bring their own
    pub cone: ConeConfig,
}

impl StealthConfig {
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            detection: self.detection.normalized(),
            drag: self.drag.normalized(),
            cone: self.cone.normalized(),
        }
    }
}

#[cfg(feature = "json")]
impl StealthConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse stealth config")?;
        Ok(config.normalized())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::constants::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = StealthConfig::from_json_str(r#"{ "detection": { "grace_period": 1.5 } }"#).unwrap();
        assert_abs_diff_eq!(config.detection.grace_period, 1.5);
        assert_abs_diff_eq!(config.detection.penalty_amount, STAR_PENALTY_AMOUNT);
        assert_eq!(config.drag, DragConfig::default());
        assert_eq!(config.cone, ConeConfig::default());
    }

    #[test]
    fn loaded_values_are_clamped() {
        let config = StealthConfig::from_json_str(
            r#"{
                "detection": { "grace_period": -3.0, "invulnerability_duration": -1.0 },
                "cone": { "range": 0.0, "angle": 0.0, "ray_count": 1 }
            }"#,
        )
        .unwrap();
        assert_abs_diff_eq!(config.detection.grace_period, MIN_GRACE_PERIOD);
        assert_abs_diff_eq!(config.detection.invulnerability_duration, 0.0);
        assert_abs_diff_eq!(config.cone.range, MIN_VISION_RANGE);
        assert_abs_diff_eq!(config.cone.angle, MIN_VISION_ANGLE);
        assert_eq!(config.cone.ray_count, MIN_VISION_RAY_COUNT);
    }

    #[test]
    fn oscillation_is_optional() {
        let config = StealthConfig::from_json_str(r#"{ "cone": { "oscillation": { "speed": 45.0 } } }"#).unwrap();
        let osc = config.cone.oscillation.unwrap();
        assert_abs_diff_eq!(osc.speed, 45.0);
        assert_abs_diff_eq!(osc.range, VISION_ROTATION_RANGE);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = StealthConfig::from_json_str("{ not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse stealth config"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = StealthConfig::from_json_file("/nonexistent/stealth.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/stealth.json"));
    }
}
