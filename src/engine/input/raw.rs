// Raw hardware events delivered by the platform layer

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Action code carried by key and mouse-button events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawAction {
    Press,
    Release,
    /// OS key repeat; bindings never react to it
    Repeat,
}

impl RawAction {
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            RawAction::Press
        } else {
            RawAction::Release
        }
    }

    pub fn from_state(state: ElementState) -> Self {
        Self::from_pressed(state == ElementState::Pressed)
    }
}

/// Raw callback channels bindings can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RawChannel {
    Key,
    Cursor,
    MouseButton,
    Scroll,
    /// Polled once per tick
    GamepadAxes,
    /// Polled once per tick
    GamepadButtons,
}

impl RawChannel {
    /// Channels fed by the gamepad poll instead of callbacks
    pub fn is_polled(&self) -> bool {
        matches!(self, RawChannel::GamepadAxes | RawChannel::GamepadButtons)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: KeyCode,
    pub action: RawAction,
}

/// Cursor position in window pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorInput {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonInput {
    pub button: MouseButton,
    pub action: RawAction,
}

/// Scroll offset in lines; positive `dy` scrolls up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInput {
    pub dx: f64,
    pub dy: f64,
}

/// Pixels treated as one scroll line for touchpad deltas
pub const PIXELS_PER_SCROLL_LINE: f64 = 20.0;

/// A callback-driven raw event, already translated from the window system
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    Key(KeyInput),
    Cursor(CursorInput),
    MouseButton(MouseButtonInput),
    Scroll(ScrollInput),
}

impl RawEvent {
    /// Translate a winit window event. Returns `None` for events that carry
    /// no input, and for keys without a physical key code.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key) = event.physical_key else {
                    return None;
                };
                let action = if event.repeat {
                    RawAction::Repeat
                } else {
                    RawAction::from_state(event.state)
                };
                Some(RawEvent::Key(KeyInput { key, action }))
            }
            WindowEvent::CursorMoved { position, .. } => Some(RawEvent::Cursor(CursorInput {
                x: position.x,
                y: position.y,
            })),
            WindowEvent::MouseInput { state, button, .. } => {
                Some(RawEvent::MouseButton(MouseButtonInput {
                    button: *button,
                    action: RawAction::from_state(*state),
                }))
            }
            WindowEvent::MouseWheel { delta, .. } => {
                Some(RawEvent::Scroll(ScrollInput::from_delta(*delta)))
            }
            _ => None,
        }
    }
}

impl ScrollInput {
    /// Scroll in lines from either kind of wheel delta
    pub fn from_delta(delta: MouseScrollDelta) -> Self {
        match delta {
            MouseScrollDelta::LineDelta(dx, dy) => Self {
                dx: f64::from(dx),
                dy: f64::from(dy),
            },
            MouseScrollDelta::PixelDelta(offset) => Self {
                dx: offset.x / PIXELS_PER_SCROLL_LINE,
                dy: offset.y / PIXELS_PER_SCROLL_LINE,
            },
        }
    }
}

/// Platform-level gamepad identifier
pub type GamepadId = usize;

/// A gamepad was plugged in or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamepadConnection {
    pub id: GamepadId,
    pub connected: bool,
}

/// Digital gamepad buttons, Xbox naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GamepadButton {
    South,
    East,
    West,
    North,
    LeftBumper,
    RightBumper,
    Back,
    Start,
    Guide,
    LeftThumb,
    RightThumb,
    DpadUp,
    DpadRight,
    DpadDown,
    DpadLeft,
}

impl GamepadButton {
    pub const COUNT: usize = 15;

    pub const ALL: [GamepadButton; GamepadButton::COUNT] = [
        GamepadButton::South,
        GamepadButton::East,
        GamepadButton::West,
        GamepadButton::North,
        GamepadButton::LeftBumper,
        GamepadButton::RightBumper,
        GamepadButton::Back,
        GamepadButton::Start,
        GamepadButton::Guide,
        GamepadButton::LeftThumb,
        GamepadButton::RightThumb,
        GamepadButton::DpadUp,
        GamepadButton::DpadRight,
        GamepadButton::DpadDown,
        GamepadButton::DpadLeft,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Analog gamepad axes. Sticks report -1..1 with up positive, triggers 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GamepadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

impl GamepadAxis {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Left or right stick/trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadSide {
    Left,
    Right,
}

/// Snapshot of one gamepad's buttons and axes, taken by polling
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadState {
    pub buttons: [bool; GamepadButton::COUNT],
    pub axes: [f32; GamepadAxis::COUNT],
}

impl GamepadState {
    pub fn is_pressed(&self, button: GamepadButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn axis(&self, axis: GamepadAxis) -> f32 {
        self.axes[axis.index()]
    }

    pub fn set_button(&mut self, button: GamepadButton, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    pub fn set_axis(&mut self, axis: GamepadAxis, value: f32) {
        self.axes[axis.index()] = value;
    }

    /// Stick position as (x, y)
    pub fn stick(&self, side: GamepadSide) -> (f32, f32) {
        match side {
            GamepadSide::Left => (self.axis(GamepadAxis::LeftX), self.axis(GamepadAxis::LeftY)),
            GamepadSide::Right => (
                self.axis(GamepadAxis::RightX),
                self.axis(GamepadAxis::RightY),
            ),
        }
    }

    pub fn trigger(&self, side: GamepadSide) -> f32 {
        match side {
            GamepadSide::Left => self.axis(GamepadAxis::LeftTrigger),
            GamepadSide::Right => self.axis(GamepadAxis::RightTrigger),
        }
    }

    /// Combine two pads into one view: a button is held if either pad holds
    /// it, and each stick or trigger takes the pad pushing it further
    pub fn merge(&self, other: &GamepadState) -> GamepadState {
        let mut merged = *self;
        for (held, other_held) in merged.buttons.iter_mut().zip(other.buttons) {
            *held |= other_held;
        }

        for side in [GamepadSide::Left, GamepadSide::Right] {
            let (x, y) = other.stick(side);
            let (ours_x, ours_y) = self.stick(side);
            if x * x + y * y > ours_x * ours_x + ours_y * ours_y {
                let (axis_x, axis_y) = match side {
                    GamepadSide::Left => (GamepadAxis::LeftX, GamepadAxis::LeftY),
                    GamepadSide::Right => (GamepadAxis::RightX, GamepadAxis::RightY),
                };
                merged.set_axis(axis_x, x);
                merged.set_axis(axis_y, y);
            }
        }

        for axis in [GamepadAxis::LeftTrigger, GamepadAxis::RightTrigger] {
            if other.axis(axis).abs() > self.axis(axis).abs() {
                merged.set_axis(axis, other.axis(axis));
            }
        }

        merged
    }

    /// First pressed button in declaration order
    pub fn first_pressed(&self) -> Option<GamepadButton> {
        GamepadButton::ALL
            .iter()
            .copied()
            .find(|button| self.is_pressed(*button))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_action_from_pressed() {
        assert_eq!(RawAction::from_pressed(true), RawAction::Press);
        assert_eq!(RawAction::from_pressed(false), RawAction::Release);
    }

    #[test]
    fn test_polled_channels() {
        assert!(RawChannel::GamepadAxes.is_polled());
        assert!(RawChannel::GamepadButtons.is_polled());
        assert!(!RawChannel::Key.is_polled());
        assert!(!RawChannel::Scroll.is_polled());
    }

    #[test]
    fn test_gamepad_button_indices_are_dense() {
        for (i, button) in GamepadButton::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }

    #[test]
    fn test_gamepad_state_accessors() {
        let mut state = GamepadState::default();
        assert_eq!(state.first_pressed(), None);

        state.set_button(GamepadButton::North, true);
        state.set_button(GamepadButton::Start, true);
        assert!(state.is_pressed(GamepadButton::North));
        assert_eq!(state.first_pressed(), Some(GamepadButton::North));

        state.set_axis(GamepadAxis::RightX, 0.5);
        state.set_axis(GamepadAxis::RightY, -0.25);
        assert_eq!(state.stick(GamepadSide::Right), (0.5, -0.25));

        state.set_axis(GamepadAxis::LeftTrigger, 0.8);
        assert_eq!(state.trigger(GamepadSide::Left), 0.8);
    }

    #[test]
    fn test_merged_pads_keep_the_active_one() {
        let mut active = GamepadState::default();
        active.set_button(GamepadButton::South, true);
        active.set_axis(GamepadAxis::LeftX, 0.3);
        active.set_axis(GamepadAxis::LeftY, -0.9);
        active.set_axis(GamepadAxis::RightTrigger, 0.7);

        let mut other = GamepadState::default();
        other.set_button(GamepadButton::Start, true);
        other.set_axis(GamepadAxis::LeftX, 0.5);
        other.set_axis(GamepadAxis::RightX, -0.4);

        for merged in [active.merge(&other), other.merge(&active)] {
            assert!(merged.is_pressed(GamepadButton::South));
            assert!(merged.is_pressed(GamepadButton::Start));
            assert!(!merged.is_pressed(GamepadButton::North));
            // The stick moves as a whole, not axis by axis
            assert_eq!(merged.stick(GamepadSide::Left), (0.3, -0.9));
            assert_eq!(merged.stick(GamepadSide::Right), (-0.4, 0.0));
            assert_eq!(merged.trigger(GamepadSide::Right), 0.7);
        }

        let idle = GamepadState::default();
        assert_eq!(active.merge(&idle), active);
    }

    #[test]
    fn test_raw_action_from_element_state() {
        assert_eq!(RawAction::from_state(ElementState::Pressed), RawAction::Press);
        assert_eq!(RawAction::from_state(ElementState::Released), RawAction::Release);
    }

    #[test]
    fn test_scroll_from_line_and_pixel_delta() {
        let lines = ScrollInput::from_delta(MouseScrollDelta::LineDelta(0.0, -2.0));
        assert_eq!(lines, ScrollInput { dx: 0.0, dy: -2.0 });

        let pixels = ScrollInput::from_delta(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(40.0, 10.0),
        ));
        assert_eq!(pixels, ScrollInput { dx: 2.0, dy: 0.5 });
    }
}
