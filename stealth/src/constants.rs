// ============================================================================
// Floating-Point Comparisons
// ============================================================================

// Small value for floating-point comparisons (near-zero checks, division guards).
pub const PHYSICS_EPSILON: f32 = 1e-6;

// ============================================================================
// Detection
// ============================================================================

pub const DETECTION_GRACE_PERIOD: f32 = 0.5; // seconds continuously seen before capture
pub const STAR_PENALTY_AMOUNT: f32 = 1.0; // stars lost per capture
pub const POST_CATCH_INVULNERABILITY: f32 = 2.0; // seconds

// Lower bound for the grace period after clamping
pub const MIN_GRACE_PERIOD: f32 = 0.01; // seconds

// Lower bound for the penalty; every capture must cost something
pub const MIN_PENALTY_AMOUNT: f32 = 0.01; // stars

// ============================================================================
// Vision Cones
// ============================================================================

pub const VISION_RANGE: f32 = 5.0; // meters
pub const VISION_ANGLE: f32 = 60.0; // degrees, full cone
pub const VISION_RAY_COUNT: u32 = 10;

pub const VISION_ROTATION_SPEED: f32 = 30.0; // degrees per second
pub const VISION_ROTATION_RANGE: f32 = 90.0; // degrees, full sweep

// Clamp bounds applied when a cone is configured
pub const MIN_VISION_RANGE: f32 = 0.1;
pub const MIN_VISION_ANGLE: f32 = 1.0;
pub const MAX_VISION_ANGLE: f32 = 360.0;
pub const MIN_VISION_RAY_COUNT: u32 = 3;

// ============================================================================
// Body Dragging
// ============================================================================

pub const DRAG_DISTANCE: f32 = 1.5; // meters behind the player
pub const DRAG_SPEED_MULTIPLIER: f32 = 0.8; // applied to player move speed
pub const DRAG_PICKUP_RADIUS: f32 = 2.0; // meters
pub const DRAG_FOLLOW_RATE: f32 = 15.0; // lerp factor per second

// Below this length a direction vector counts as "not moving"
pub const DRAG_HEADING_THRESHOLD: f32 = 0.1;

// ============================================================================
// Star Rating
// ============================================================================

pub const STAR_RATING_MAX: f32 = 5.0;
