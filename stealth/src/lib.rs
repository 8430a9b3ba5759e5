//! Engine-independent stealth detection for a top-down 2D game.
//!
//! Guards carry [`vision::VisionCone`] sensors that raycast for the player
//! while the player drags a body ([`drag::BodyDrag`]). Their per-tick reports
//! feed one [`detection::DetectionManager`], which runs the grace period,
//! applies the rating penalty through a [`rating::PenaltySink`] and keeps the
//! player invulnerable for a while after a capture.
//!
//! One tick, in order:
//! 1. update the drag state (arms or disarms the manager),
//! 2. rotate and evaluate every cone, reporting each result to the manager,
//! 3. call [`detection::DetectionManager::tick`] and drain its events.

pub mod config;
pub mod constants;
pub mod detection;
pub mod drag;
pub mod geometry;
pub mod rating;
pub mod raycast;
pub mod vision;

pub use config::StealthConfig;
pub use detection::{DetectionConfig, DetectionEvent, DetectionManager, DetectionState, SensorId};
pub use drag::{Body, BodyDrag, BodyId, DragConfig, Locomotion, PlayerMotion};
pub use geometry::{Aabb, Circle, Pose2, Shape};
pub use rating::{PenaltySink, StarRating};
pub use raycast::{Classification, Collider, ColliderSet, LayerMask, RayHit, RaycastQuery};
pub use vision::{ConeConfig, Oscillation, SensorReport, VisionCone};
