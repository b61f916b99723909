// Math utilities shared by processors and behaviors

use glam::Vec2;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Where `value` sits between `a` and `b`, unclamped.
/// Returns 0.0 for a degenerate range.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    (value - a) / (b - a)
}

/// Remap a magnitude through a dead zone.
///
/// Magnitudes at or below `min` become 0, at or above `max` become 1,
/// and everything between is mapped linearly.
pub fn dead_zone_magnitude(magnitude: f32, min: f32, max: f32) -> f32 {
    if magnitude <= min {
        0.0
    } else if magnitude >= max {
        1.0
    } else {
        clamp(inverse_lerp(min, max, magnitude), 0.0, 1.0)
    }
}

/// Apply `dead_zone_magnitude` to a vector, keeping its direction
pub fn dead_zone_vec2(value: Vec2, min: f32, max: f32) -> Vec2 {
    let length = value.length();
    if length <= f32::EPSILON {
        return Vec2::ZERO;
    }
    value / length * dead_zone_magnitude(length, min, max)
}
