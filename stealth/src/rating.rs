use bevy_ecs::prelude::Resource;
use tracing::debug;

use crate::constants::STAR_RATING_MAX;

// ============================================================================
// Penalty Sink
// ============================================================================

/// Receives the penalty when the player is caught. Clamping is the sink's job.
pub trait PenaltySink {
    fn rating(&self) -> f32;

    /// Lower the rating by `amount` and return the new rating.
    fn decrease_rating(&mut self, amount: f32) -> f32;
}

// ============================================================================
// Star Rating
// ============================================================================

/// Restaurant star rating kept within `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Resource)]
pub struct StarRating {
    value: f32,
    max: f32,
}

impl Default for StarRating {
    fn default() -> Self {
        Self::new(STAR_RATING_MAX, STAR_RATING_MAX)
    }
}

impl StarRating {
    #[must_use]
    pub fn new(value: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            value: value.clamp(0.0, max),
            max,
        }
    }

    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }
}

impl PenaltySink for StarRating {
    fn rating(&self) -> f32 {
        self.value
    }

    fn decrease_rating(&mut self, amount: f32) -> f32 {
        let before = self.value;
        self.value = (self.value - amount.max(0.0)).max(0.0);
        debug!("star rating {:.1} -> {:.1}", before, self.value);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn decrease_floors_at_zero() {
        let mut rating = StarRating::new(1.5, 5.0);
        assert_abs_diff_eq!(rating.decrease_rating(1.0), 0.5);
        assert_abs_diff_eq!(rating.decrease_rating(1.0), 0.0);
        assert_abs_diff_eq!(rating.rating(), 0.0);
    }

    #[test]
    fn negative_amounts_are_ignored() {
        let mut rating = StarRating::default();
        assert_abs_diff_eq!(rating.decrease_rating(-2.0), STAR_RATING_MAX);
    }

    #[test]
    fn construction_clamps_initial_value() {
        assert_abs_diff_eq!(StarRating::new(9.0, 5.0).rating(), 5.0);
        assert_abs_diff_eq!(StarRating::new(-1.0, 5.0).rating(), 0.0);
    }
}
