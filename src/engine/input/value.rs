// Action value kinds: Axis2, Button and Trigger

use crate::core::math;
use glam::Vec2;
use std::fmt;

/// Default magnitude above which an analog value counts as pressed
pub const DEFAULT_PRESS_POINT: f32 = 0.5;

/// Two-dimensional axis value (sticks, WASD, mouse position/delta, scroll)
pub type Axis2 = Vec2;

/// Digital button value
pub type Button = bool;

/// One-dimensional analog value (gamepad triggers, scroll amount)
pub type Trigger = f32;

/// Which physical device family produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HardwareOrigin {
    Gamepad,
    Mouse,
    #[default]
    Keyboard,
}

impl fmt::Display for HardwareOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HardwareOrigin::Gamepad => "GAMEPAD",
            HardwareOrigin::Mouse => "MOUSE",
            HardwareOrigin::Keyboard => "KEYBOARD",
        };
        f.write_str(name)
    }
}

/// Tag naming which of the three value kinds an action carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Axes,
    Button,
    Trigger,
}

impl ValueKind {
    /// Parse the `actionType` suffix of a config key (`axes`, `button`, `trigger`)
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.trim().to_ascii_lowercase().as_str() {
            "axes" => Some(ValueKind::Axes),
            "button" => Some(ValueKind::Button),
            "trigger" => Some(ValueKind::Trigger),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Axes => "axes",
            ValueKind::Button => "button",
            ValueKind::Trigger => "trigger",
        };
        f.write_str(name)
    }
}

/// A value of any of the three kinds, tagged
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionValue {
    Axes(Axis2),
    Button(Button),
    Trigger(Trigger),
}

impl ActionValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ActionValue::Axes(_) => ValueKind::Axes,
            ActionValue::Button(_) => ValueKind::Button,
            ActionValue::Trigger(_) => ValueKind::Trigger,
        }
    }
}

/// Raw value read from a hardware event before it is shaped into an action value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Digital(bool),
    Scalar(f32),
    Vector(Vec2),
}

/// Pressed state of the four logical sub-directions of a value.
///
/// Scalar kinds only ever use `right` (the positive direction) and `left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Directions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Directions {
    /// True if any sub-direction is pressed
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Sub-directions that went from released to pressed
    pub fn pressed_since(&self, previous: &Directions) -> bool {
        (self.up && !previous.up)
            || (self.down && !previous.down)
            || (self.left && !previous.left)
            || (self.right && !previous.right)
    }

    /// Sub-directions that went from pressed to released
    pub fn released_since(&self, previous: &Directions) -> bool {
        previous.pressed_since(self)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for glam::Vec2 {}
    impl Sealed for bool {}
    impl Sealed for f32 {}
}

/// Behavior shared by the three action value kinds.
///
/// Sealed: only `Axis2`, `Button` and `Trigger` implement it.
pub trait InputValue: sealed::Sealed + Copy + PartialEq + fmt::Debug + Default + 'static {
    /// Kind tag for this value type
    const KIND: ValueKind;

    /// Shape a raw sample into this kind
    fn from_sample(sample: Sample) -> Self;

    /// Wrap into the tagged form
    fn into_action_value(self) -> ActionValue;

    /// Unwrap from the tagged form; `None` on a kind mismatch
    fn from_action_value(value: ActionValue) -> Option<Self>;

    /// Magnitude used for press-point comparisons
    fn magnitude(&self) -> f32;

    /// Per-direction pressed state against `press_point`
    fn directions(&self, press_point: f32) -> Directions;

    /// Remap magnitude through a dead zone, keeping direction
    fn dead_zone(self, min: f32, max: f32) -> Self;

    /// Negate the selected components
    fn invert(self, invert_x: bool, invert_y: bool) -> Self;

    /// Rescale to unit magnitude; the zero value stays zero
    fn normalize(self) -> Self;
}

impl InputValue for Axis2 {
    const KIND: ValueKind = ValueKind::Axes;

    fn into_action_value(self) -> ActionValue {
        ActionValue::Axes(self)
    }

    fn from_action_value(value: ActionValue) -> Option<Self> {
        match value {
            ActionValue::Axes(inner) => Some(inner),
            _ => None,
        }
    }

    fn from_sample(sample: Sample) -> Self {
        match sample {
            Sample::Digital(pressed) => Vec2::new(if pressed { 1.0 } else { 0.0 }, 0.0),
            Sample::Scalar(value) => Vec2::new(value, 0.0),
            Sample::Vector(value) => value,
        }
    }

    fn magnitude(&self) -> f32 {
        self.length()
    }

    fn directions(&self, press_point: f32) -> Directions {
        Directions {
            up: self.y >= press_point,
            down: self.y <= -press_point,
            left: self.x <= -press_point,
            right: self.x >= press_point,
        }
    }

    fn dead_zone(self, min: f32, max: f32) -> Self {
        math::dead_zone_vec2(self, min, max)
    }

    fn invert(self, invert_x: bool, invert_y: bool) -> Self {
        Vec2::new(
            if invert_x { -self.x } else { self.x },
            if invert_y { -self.y } else { self.y },
        )
    }

    fn normalize(self) -> Self {
        self.normalize_or_zero()
    }
}

impl InputValue for Button {
    const KIND: ValueKind = ValueKind::Button;

    fn into_action_value(self) -> ActionValue {
        ActionValue::Button(self)
    }

    fn from_action_value(value: ActionValue) -> Option<Self> {
        match value {
            ActionValue::Button(inner) => Some(inner),
            _ => None,
        }
    }

    fn from_sample(sample: Sample) -> Self {
        match sample {
            Sample::Digital(pressed) => pressed,
            Sample::Scalar(value) => value.abs() >= DEFAULT_PRESS_POINT,
            Sample::Vector(value) => value.length() >= DEFAULT_PRESS_POINT,
        }
    }

    fn magnitude(&self) -> f32 {
        if *self {
            1.0
        } else {
            0.0
        }
    }

    fn directions(&self, _press_point: f32) -> Directions {
        Directions {
            right: *self,
            ..Directions::default()
        }
    }

    fn dead_zone(self, _min: f32, _max: f32) -> Self {
        self
    }

    /// A button has a single component; either flag flips it
    fn invert(self, invert_x: bool, invert_y: bool) -> Self {
        if invert_x || invert_y {
            !self
        } else {
            self
        }
    }

    fn normalize(self) -> Self {
        self
    }
}

impl InputValue for Trigger {
    const KIND: ValueKind = ValueKind::Trigger;

    fn into_action_value(self) -> ActionValue {
        ActionValue::Trigger(self)
    }

    fn from_action_value(value: ActionValue) -> Option<Self> {
        match value {
            ActionValue::Trigger(inner) => Some(inner),
            _ => None,
        }
    }

    fn from_sample(sample: Sample) -> Self {
        match sample {
            Sample::Digital(pressed) => {
                if pressed {
                    1.0
                } else {
                    0.0
                }
            }
            Sample::Scalar(value) => value,
            Sample::Vector(value) => value.length(),
        }
    }

    fn magnitude(&self) -> f32 {
        self.abs()
    }

    fn directions(&self, press_point: f32) -> Directions {
        Directions {
            right: *self >= press_point,
            left: *self <= -press_point,
            ..Directions::default()
        }
    }

    fn dead_zone(self, min: f32, max: f32) -> Self {
        self.signum() * math::dead_zone_magnitude(self.abs(), min, max)
    }

    fn invert(self, invert_x: bool, _invert_y: bool) -> Self {
        if invert_x {
            -self
        } else {
            self
        }
    }

    fn normalize(self) -> Self {
        if self == 0.0 {
            0.0
        } else {
            self.signum()
        }
    }
}
