//! Property tests for the detection state machine and the arming gate.

use bevy_math::Vec2;
use proptest::prelude::*;
use stealth::{
    Aabb, Circle, Collider, ColliderSet, ConeConfig, DetectionConfig, DetectionEvent, DetectionManager,
    DetectionState, PenaltySink, Pose2, SensorId, SensorReport, Shape, StarRating, VisionCone,
};

const GRACE: f32 = 0.5;

fn manager_with(sensors: u32) -> DetectionManager {
    let mut manager = DetectionManager::new(DetectionConfig {
        grace_period: GRACE,
        penalty_amount: 1.0,
        invulnerability_duration: 2.0,
        show_detection_warning: true,
    });
    for id in 0..sensors {
        manager.register_sensor(SensorId(id));
    }
    manager.set_armed(true);
    manager
}

// Feeds per-sensor visibility into the manager with proper edge reports.
struct Driver {
    manager: DetectionManager,
    rating: StarRating,
    last: Vec<bool>,
    now: f32,
}

impl Driver {
    fn new(sensors: usize) -> Self {
        Self {
            manager: manager_with(sensors as u32),
            rating: StarRating::new(100.0, 100.0),
            last: vec![false; sensors],
            now: 0.0,
        }
    }

    fn step(&mut self, visible: &[bool], delta: f32) {
        for (i, (&seen, last)) in visible.iter().zip(self.last.iter_mut()).enumerate() {
            let report = SensorReport {
                detected: seen,
                spotted: seen && !*last,
            };
            *last = seen;
            self.manager.report(SensorId(i as u32), report, self.now);
        }
        self.manager.tick(delta, self.now, Some(&mut self.rating));
        self.now += delta;
    }
}

fn tick_pattern() -> impl Strategy<Value = Vec<Vec<bool>>> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), 3), 1..80)
}

proptest! {
    #[test]
    fn unarmed_cone_never_detects(
        px in -8.0f32..8.0,
        py in -8.0f32..8.0,
        heading in -std::f32::consts::PI..std::f32::consts::PI,
        with_wall in any::<bool>(),
    ) {
        let mut scene: ColliderSet = std::iter::once(Collider::player(Shape::Circle(Circle {
            center: Vec2::new(px, py),
            radius: 0.5,
        })))
        .collect();
        if with_wall {
            scene.push(Collider::obstacle(Shape::Box(Aabb {
                center: Vec2::new(1.0, 1.0),
                half_extents: Vec2::splat(0.5),
            })));
        }

        let mut cone = VisionCone::new(ConeConfig::default());
        let pose = Pose2::new(Vec2::ZERO, heading);
        prop_assert_eq!(cone.evaluate(&pose, &scene, false), SensorReport::default());
        prop_assert!(!cone.is_player_detected());
    }

    #[test]
    fn timer_grows_by_delta_and_resets_on_escape(
        pattern in tick_pattern(),
        delta in prop::sample::select(vec![0.015_625f32, 0.031_25, 0.0625, 0.125]),
    ) {
        let mut driver = Driver::new(3);

        for visible in &pattern {
            let before = driver.manager.state();
            driver.step(visible, delta);
            let after = driver.manager.state();
            let any = visible.iter().any(|&v| v);

            if let DetectionState::Detecting { elapsed: prev, .. } = before {
                if !any {
                    prop_assert_eq!(after, DetectionState::Idle);
                    prop_assert_eq!(driver.manager.detection_timer(), 0.0);
                } else if let DetectionState::Detecting { elapsed, .. } = after {
                    prop_assert!((elapsed - (prev + delta)).abs() < 1e-6);
                } else {
                    let caught = matches!(after, DetectionState::Invulnerable { .. });
                    prop_assert!(caught, "expected a capture, got {:?}", after);
                    prop_assert!(prev + delta >= GRACE - 1e-6);
                }
            }

            let progress = driver.manager.detection_progress();
            prop_assert!((0.0..=1.0).contains(&progress));
        }
    }

    #[test]
    fn one_penalty_per_capture(pattern in tick_pattern()) {
        let mut driver = Driver::new(3);
        let mut captures = 0;

        for visible in &pattern {
            let was_invulnerable = matches!(driver.manager.state(), DetectionState::Invulnerable { .. });
            driver.step(visible, 0.125);
            let is_invulnerable = matches!(driver.manager.state(), DetectionState::Invulnerable { .. });
            if is_invulnerable && !was_invulnerable {
                captures += 1;
            }
        }

        let caught_events = driver
            .manager
            .drain_events()
            .iter()
            .filter(|event| matches!(event, DetectionEvent::Caught { .. }))
            .count();
        prop_assert_eq!(caught_events, captures);
        prop_assert!((driver.rating.rating() - (100.0 - captures as f32)).abs() < 1e-4);
    }

    #[test]
    fn disarming_always_lands_in_idle(pattern in tick_pattern(), stop_at in 0usize..80) {
        let mut driver = Driver::new(3);

        for (i, visible) in pattern.iter().enumerate() {
            if i == stop_at {
                driver.manager.set_armed(false);
                prop_assert_eq!(driver.manager.state(), DetectionState::Idle);
                prop_assert_eq!(driver.manager.detection_timer(), 0.0);
                prop_assert_eq!(driver.manager.detection_progress(), 0.0);
                driver.manager.set_armed(true);
            }
            driver.step(visible, 0.125);
        }

        driver.manager.set_armed(false);
        prop_assert_eq!(driver.manager.state(), DetectionState::Idle);
    }
}
