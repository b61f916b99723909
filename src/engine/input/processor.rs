// Stateless value processors applied by bindings before behavior checks

use super::value::InputValue;

pub const DEFAULT_DEAD_ZONE_MIN: f32 = 0.2;
pub const DEFAULT_DEAD_ZONE_MAX: f32 = 0.9;

/// A pure transform on an action value.
///
/// Processors carry only their construction parameters, so a binding can
/// share them freely and apply them in declaration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Processor {
    /// Magnitudes at or below `min` become zero, at or above `max` become
    /// unit length, linear in between
    DeadZone { min: f32, max: f32 },
    /// Negate the selected components
    Inverter { invert_x: bool, invert_y: bool },
    /// Rescale to unit length; the zero vector is left alone
    Normalizer,
}

impl Processor {
    /// Dead zone with the default thresholds
    pub fn dead_zone() -> Self {
        Processor::DeadZone {
            min: DEFAULT_DEAD_ZONE_MIN,
            max: DEFAULT_DEAD_ZONE_MAX,
        }
    }

    pub fn process<T: InputValue>(&self, value: T) -> T {
        match *self {
            Processor::DeadZone { min, max } => value.dead_zone(min, max),
            Processor::Inverter { invert_x, invert_y } => value.invert(invert_x, invert_y),
            Processor::Normalizer => value.normalize(),
        }
    }
}

/// Run `value` through every processor in order
pub fn apply_chain<T: InputValue>(processors: &[Processor], value: T) -> T {
    processors
        .iter()
        .fold(value, |current, processor| processor.process(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec2;

    #[test]
    fn test_dead_zone_below_min_is_zero() {
        let dz = Processor::DeadZone { min: 0.2, max: 0.9 };
        assert_eq!(dz.process(Vec2::new(0.1, 0.1)), Vec2::ZERO);
        assert_eq!(dz.process(0.2f32), 0.0);
    }

    #[test]
    fn test_dead_zone_above_max_is_unit() {
        let dz = Processor::DeadZone { min: 0.2, max: 0.9 };
        let out = dz.process(Vec2::new(0.0, 0.95));
        assert_relative_eq!(out.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(out.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(dz.process(-1.0f32), -1.0);
    }

    #[test]
    fn test_dead_zone_is_linear_between() {
        let dz = Processor::DeadZone { min: 0.2, max: 0.9 };
        let a = dz.process(0.375f32);
        let b = dz.process(0.55f32);
        let c = dz.process(0.725f32);
        assert_relative_eq!(a, 0.25, epsilon = 1e-5);
        assert_relative_eq!(b, 0.5, epsilon = 1e-5);
        assert_relative_eq!(c, 0.75, epsilon = 1e-5);
    }

    #[test]
    fn test_dead_zone_preserves_direction() {
        let dz = Processor::dead_zone();
        let input = Vec2::new(0.3, -0.4);
        let out = dz.process(input);
        assert_relative_eq!(out.normalize().x, input.normalize().x, epsilon = 1e-5);
        assert_relative_eq!(out.normalize().y, input.normalize().y, epsilon = 1e-5);
    }

    #[test]
    fn test_dead_zone_leaves_buttons_alone() {
        assert!(Processor::dead_zone().process(true));
        assert!(!Processor::dead_zone().process(false));
    }

    #[test]
    fn test_inverter_axes() {
        let only_y = Processor::Inverter {
            invert_x: false,
            invert_y: true,
        };
        assert_eq!(only_y.process(Vec2::new(0.5, 0.25)), Vec2::new(0.5, -0.25));

        let both = Processor::Inverter {
            invert_x: true,
            invert_y: true,
        };
        assert_eq!(both.process(Vec2::new(0.5, 0.25)), Vec2::new(-0.5, -0.25));
    }

    #[test]
    fn test_inverter_trigger_uses_x_flag() {
        let invert_x = Processor::Inverter {
            invert_x: true,
            invert_y: false,
        };
        assert_eq!(invert_x.process(0.7f32), -0.7);

        let invert_y = Processor::Inverter {
            invert_x: false,
            invert_y: true,
        };
        assert_eq!(invert_y.process(0.7f32), 0.7);
    }

    #[test]
    fn test_normalizer_unit_length() {
        let out = Processor::Normalizer.process(Vec2::new(3.0, 4.0));
        assert_relative_eq!(out.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(out.x, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_normalizer_zero_vector() {
        assert_eq!(Processor::Normalizer.process(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_chain_applies_in_order() {
        let chain = [
            Processor::Normalizer,
            Processor::Inverter {
                invert_x: true,
                invert_y: false,
            },
        ];
        let out = apply_chain(&chain, Vec2::new(2.0, 0.0));
        assert_eq!(out, Vec2::new(-1.0, 0.0));

        // Dead zone after normalization never zeroes a non-zero input
        let chain = [Processor::Normalizer, Processor::dead_zone()];
        let out = apply_chain(&chain, Vec2::new(0.05, 0.0));
        assert_relative_eq!(out.x, 1.0, epsilon = 1e-6);
    }
}
