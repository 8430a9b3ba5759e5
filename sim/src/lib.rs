//! Headless scenario runner for the `stealth` crate.
//!
//! A scenario file describes a level, its guards and a scripted player. The
//! runner drives everything through a `bevy_ecs` schedule at a fixed tick
//! rate and records what the detection manager did on every tick.

pub mod app;
pub mod config;
pub mod constants;
pub mod resources;
pub mod scenario;
pub mod systems;

pub use app::{build_app, run_ticks, tick_count, tick_step};
pub use scenario::Scenario;
