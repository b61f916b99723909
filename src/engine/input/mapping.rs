// Mapping names: what physical or composite source a binding listens to

use super::raw::{GamepadButton, GamepadSide, RawChannel};
use super::value::HardwareOrigin;
use std::fmt;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Which part of a scroll event a mapping reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollFilter {
    /// Both axes as a vector
    Both,
    Up,
    Down,
    Left,
    Right,
}

/// Coarse classification of a mapping, deciding its raw channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingType {
    Keyboard,
    MousePos,
    MouseScroll,
    MouseInput,
    GamepadAxes,
    GamepadButton,
    Unknown,
}

impl MappingType {
    /// The raw channel a binding of this type subscribes to
    pub fn channel(&self) -> Option<RawChannel> {
        match self {
            MappingType::Keyboard => Some(RawChannel::Key),
            MappingType::MousePos => Some(RawChannel::Cursor),
            MappingType::MouseScroll => Some(RawChannel::Scroll),
            MappingType::MouseInput => Some(RawChannel::MouseButton),
            MappingType::GamepadAxes => Some(RawChannel::GamepadAxes),
            MappingType::GamepadButton => Some(RawChannel::GamepadButtons),
            MappingType::Unknown => None,
        }
    }
}

/// A physical input source, or a composite derived from several
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mapping {
    Key(KeyCode),
    /// W/A/S/D as a 2D direction
    Wasd,
    /// Arrow keys as a 2D direction
    Arrows,
    KeyAny,

    MousePosition,
    MouseDelta,
    MouseScroll(ScrollFilter),
    MouseButton(MouseButton),
    MouseAny,

    Stick(GamepadSide),
    Trigger(GamepadSide),
    /// Stick clicked in
    StickPress(GamepadSide),
    /// Trigger past the press point, read as a button
    TriggerPress(GamepadSide),
    GamepadButton(GamepadButton),
    /// D-pad as a 2D direction
    Dpad,
    GamepadAny,

    /// Unrecognized name; the binding stays inert
    Unknown(String),
}

impl Mapping {
    /// Resolve a mapping name such as `KEYBOARD_WASD` or `GAMEPAD_LEFT_STICK`
    pub fn parse(name: &str) -> Mapping {
        let name = name.trim();
        let upper = name.to_ascii_uppercase();

        let parsed = if let Some(rest) = upper.strip_prefix("KEYBOARD_") {
            parse_keyboard(rest)
        } else if let Some(rest) = upper.strip_prefix("MOUSE_") {
            parse_mouse(rest)
        } else if let Some(rest) = upper.strip_prefix("GAMEPAD_") {
            parse_gamepad(rest)
        } else {
            None
        };

        parsed.unwrap_or_else(|| Mapping::Unknown(name.to_string()))
    }

    pub fn mapping_type(&self) -> MappingType {
        match self {
            Mapping::Key(_) | Mapping::Wasd | Mapping::Arrows | Mapping::KeyAny => {
                MappingType::Keyboard
            }
            Mapping::MousePosition | Mapping::MouseDelta => MappingType::MousePos,
            Mapping::MouseScroll(_) => MappingType::MouseScroll,
            Mapping::MouseButton(_) | Mapping::MouseAny => MappingType::MouseInput,
            Mapping::Stick(_) | Mapping::Trigger(_) => MappingType::GamepadAxes,
            Mapping::StickPress(_)
            | Mapping::TriggerPress(_)
            | Mapping::GamepadButton(_)
            | Mapping::Dpad
            | Mapping::GamepadAny => MappingType::GamepadButton,
            Mapping::Unknown(_) => MappingType::Unknown,
        }
    }

    pub fn channel(&self) -> Option<RawChannel> {
        self.mapping_type().channel()
    }

    /// Device family that produces this mapping's values
    pub fn origin(&self) -> Option<HardwareOrigin> {
        match self.mapping_type() {
            MappingType::Keyboard => Some(HardwareOrigin::Keyboard),
            MappingType::MousePos | MappingType::MouseScroll | MappingType::MouseInput => {
                Some(HardwareOrigin::Mouse)
            }
            MappingType::GamepadAxes | MappingType::GamepadButton => {
                Some(HardwareOrigin::Gamepad)
            }
            MappingType::Unknown => None,
        }
    }

    /// Derived from several physical sources
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Mapping::Wasd | Mapping::Arrows | Mapping::Dpad | Mapping::GamepadAny
        )
    }

    /// Reacts to any key or button of its device
    pub fn is_any(&self) -> bool {
        matches!(self, Mapping::KeyAny | Mapping::MouseAny | Mapping::GamepadAny)
    }

    /// The four keys a composite keyboard mapping polls, as up/down/left/right
    pub fn direction_keys(&self) -> Option<[KeyCode; 4]> {
        match self {
            Mapping::Wasd => Some([KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyA, KeyCode::KeyD]),
            Mapping::Arrows => Some([
                KeyCode::ArrowUp,
                KeyCode::ArrowDown,
                KeyCode::ArrowLeft,
                KeyCode::ArrowRight,
            ]),
            _ => None,
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::Unknown(name) => write!(f, "{} (unknown)", name),
            other => write!(f, "{:?}", other),
        }
    }
}

fn parse_keyboard(rest: &str) -> Option<Mapping> {
    match rest {
        "WASD" => Some(Mapping::Wasd),
        "ARROWS" => Some(Mapping::Arrows),
        "ANY" => Some(Mapping::KeyAny),
        _ => key_from_name(rest).map(Mapping::Key),
    }
}

fn parse_mouse(rest: &str) -> Option<Mapping> {
    let mapping = match rest {
        "POSITION" => Mapping::MousePosition,
        "DELTA" => Mapping::MouseDelta,
        "SCROLL" => Mapping::MouseScroll(ScrollFilter::Both),
        "SCROLL_UP" => Mapping::MouseScroll(ScrollFilter::Up),
        "SCROLL_DOWN" => Mapping::MouseScroll(ScrollFilter::Down),
        "SCROLL_LEFT" => Mapping::MouseScroll(ScrollFilter::Left),
        "SCROLL_RIGHT" => Mapping::MouseScroll(ScrollFilter::Right),
        "LEFT" => Mapping::MouseButton(MouseButton::Left),
        "RIGHT" => Mapping::MouseButton(MouseButton::Right),
        "MIDDLE" => Mapping::MouseButton(MouseButton::Middle),
        "BACK" => Mapping::MouseButton(MouseButton::Back),
        "FORWARD" => Mapping::MouseButton(MouseButton::Forward),
        "ANY" => Mapping::MouseAny,
        other => {
            let index = other.strip_prefix("BUTTON_")?.parse::<u16>().ok()?;
            Mapping::MouseButton(MouseButton::Other(index))
        }
    };
    Some(mapping)
}

fn parse_gamepad(rest: &str) -> Option<Mapping> {
    let mapping = match rest {
        "LEFT_STICK" => Mapping::Stick(GamepadSide::Left),
        "RIGHT_STICK" => Mapping::Stick(GamepadSide::Right),
        "LEFT_TRIGGER" => Mapping::Trigger(GamepadSide::Left),
        "RIGHT_TRIGGER" => Mapping::Trigger(GamepadSide::Right),
        "LEFT_STICK_PRESS" => Mapping::StickPress(GamepadSide::Left),
        "RIGHT_STICK_PRESS" => Mapping::StickPress(GamepadSide::Right),
        "LEFT_TRIGGER_PRESS" => Mapping::TriggerPress(GamepadSide::Left),
        "RIGHT_TRIGGER_PRESS" => Mapping::TriggerPress(GamepadSide::Right),
        "A" | "CROSS" => Mapping::GamepadButton(GamepadButton::South),
        "B" | "CIRCLE" => Mapping::GamepadButton(GamepadButton::East),
        "X" | "SQUARE" => Mapping::GamepadButton(GamepadButton::West),
        "Y" | "TRIANGLE" => Mapping::GamepadButton(GamepadButton::North),
        "LEFT_BUMPER" => Mapping::GamepadButton(GamepadButton::LeftBumper),
        "RIGHT_BUMPER" => Mapping::GamepadButton(GamepadButton::RightBumper),
        "BACK" => Mapping::GamepadButton(GamepadButton::Back),
        "START" => Mapping::GamepadButton(GamepadButton::Start),
        "GUIDE" => Mapping::GamepadButton(GamepadButton::Guide),
        "DPAD_UP" => Mapping::GamepadButton(GamepadButton::DpadUp),
        "DPAD_RIGHT" => Mapping::GamepadButton(GamepadButton::DpadRight),
        "DPAD_DOWN" => Mapping::GamepadButton(GamepadButton::DpadDown),
        "DPAD_LEFT" => Mapping::GamepadButton(GamepadButton::DpadLeft),
        "DPAD" => Mapping::Dpad,
        "ANY" => Mapping::GamepadAny,
        _ => return None,
    };
    Some(mapping)
}

/// Translate the key part of a `KEYBOARD_*` name into a winit key code
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let key = match name {
        // Letters
        "A" => KeyCode::KeyA,
        "B" => KeyCode::KeyB,
        "C" => KeyCode::KeyC,
        "D" => KeyCode::KeyD,
        "E" => KeyCode::KeyE,
        "F" => KeyCode::KeyF,
        "G" => KeyCode::KeyG,
        "H" => KeyCode::KeyH,
        "I" => KeyCode::KeyI,
        "J" => KeyCode::KeyJ,
        "K" => KeyCode::KeyK,
        "L" => KeyCode::KeyL,
        "M" => KeyCode::KeyM,
        "N" => KeyCode::KeyN,
        "O" => KeyCode::KeyO,
        "P" => KeyCode::KeyP,
        "Q" => KeyCode::KeyQ,
        "R" => KeyCode::KeyR,
        "S" => KeyCode::KeyS,
        "T" => KeyCode::KeyT,
        "U" => KeyCode::KeyU,
        "V" => KeyCode::KeyV,
        "W" => KeyCode::KeyW,
        "X" => KeyCode::KeyX,
        "Y" => KeyCode::KeyY,
        "Z" => KeyCode::KeyZ,

        // Numbers
        "0" => KeyCode::Digit0,
        "1" => KeyCode::Digit1,
        "2" => KeyCode::Digit2,
        "3" => KeyCode::Digit3,
        "4" => KeyCode::Digit4,
        "5" => KeyCode::Digit5,
        "6" => KeyCode::Digit6,
        "7" => KeyCode::Digit7,
        "8" => KeyCode::Digit8,
        "9" => KeyCode::Digit9,

        // Function keys
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F3" => KeyCode::F3,
        "F4" => KeyCode::F4,
        "F5" => KeyCode::F5,
        "F6" => KeyCode::F6,
        "F7" => KeyCode::F7,
        "F8" => KeyCode::F8,
        "F9" => KeyCode::F9,
        "F10" => KeyCode::F10,
        "F11" => KeyCode::F11,
        "F12" => KeyCode::F12,

        // Arrows
        "UP" => KeyCode::ArrowUp,
        "DOWN" => KeyCode::ArrowDown,
        "LEFT" => KeyCode::ArrowLeft,
        "RIGHT" => KeyCode::ArrowRight,

        // Modifiers
        "LEFT_SHIFT" => KeyCode::ShiftLeft,
        "RIGHT_SHIFT" => KeyCode::ShiftRight,
        "LEFT_CONTROL" => KeyCode::ControlLeft,
        "RIGHT_CONTROL" => KeyCode::ControlRight,
        "LEFT_ALT" => KeyCode::AltLeft,
        "RIGHT_ALT" => KeyCode::AltRight,

        // Special keys
        "SPACE" => KeyCode::Space,
        "ENTER" => KeyCode::Enter,
        "ESCAPE" => KeyCode::Escape,
        "TAB" => KeyCode::Tab,
        "BACKSPACE" => KeyCode::Backspace,
        "DELETE" => KeyCode::Delete,
        "INSERT" => KeyCode::Insert,
        "HOME" => KeyCode::Home,
        "END" => KeyCode::End,
        "PAGE_UP" => KeyCode::PageUp,
        "PAGE_DOWN" => KeyCode::PageDown,
        "CAPS_LOCK" => KeyCode::CapsLock,

        // Punctuation
        "GRAVE_ACCENT" => KeyCode::Backquote,
        "MINUS" => KeyCode::Minus,
        "EQUAL" => KeyCode::Equal,
        "COMMA" => KeyCode::Comma,
        "PERIOD" => KeyCode::Period,
        "SLASH" => KeyCode::Slash,
        "SEMICOLON" => KeyCode::Semicolon,
        "APOSTROPHE" => KeyCode::Quote,
        "LEFT_BRACKET" => KeyCode::BracketLeft,
        "RIGHT_BRACKET" => KeyCode::BracketRight,
        "BACKSLASH" => KeyCode::Backslash,

        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyboard_mappings() {
        assert_eq!(Mapping::parse("KEYBOARD_SPACE"), Mapping::Key(KeyCode::Space));
        assert_eq!(Mapping::parse("keyboard_w"), Mapping::Key(KeyCode::KeyW));
        assert_eq!(Mapping::parse("KEYBOARD_WASD"), Mapping::Wasd);
        assert_eq!(Mapping::parse("KEYBOARD_ARROWS"), Mapping::Arrows);
        assert_eq!(Mapping::parse("KEYBOARD_ANY"), Mapping::KeyAny);
        assert_eq!(
            Mapping::parse("KEYBOARD_LEFT_SHIFT"),
            Mapping::Key(KeyCode::ShiftLeft)
        );
    }

    #[test]
    fn test_parse_mouse_mappings() {
        assert_eq!(Mapping::parse("MOUSE_DELTA"), Mapping::MouseDelta);
        assert_eq!(
            Mapping::parse("MOUSE_SCROLL_UP"),
            Mapping::MouseScroll(ScrollFilter::Up)
        );
        assert_eq!(
            Mapping::parse("MOUSE_LEFT"),
            Mapping::MouseButton(MouseButton::Left)
        );
        assert_eq!(
            Mapping::parse("MOUSE_BUTTON_7"),
            Mapping::MouseButton(MouseButton::Other(7))
        );
    }

    #[test]
    fn test_parse_gamepad_mappings() {
        assert_eq!(
            Mapping::parse("GAMEPAD_LEFT_STICK"),
            Mapping::Stick(GamepadSide::Left)
        );
        assert_eq!(
            Mapping::parse("GAMEPAD_RIGHT_STICK_PRESS"),
            Mapping::StickPress(GamepadSide::Right)
        );
        assert_eq!(
            Mapping::parse("GAMEPAD_CROSS"),
            Mapping::GamepadButton(GamepadButton::South)
        );
        assert_eq!(Mapping::parse("GAMEPAD_DPAD"), Mapping::Dpad);
    }

    #[test]
    fn test_unknown_mappings() {
        assert!(matches!(Mapping::parse("JOYSTICK_FIRE"), Mapping::Unknown(_)));
        assert!(matches!(Mapping::parse("KEYBOARD_NOPE"), Mapping::Unknown(_)));
        assert!(matches!(Mapping::parse("MOUSE_BUTTON_X"), Mapping::Unknown(_)));
        assert_eq!(Mapping::parse("JOYSTICK_FIRE").channel(), None);
        assert_eq!(Mapping::parse("JOYSTICK_FIRE").origin(), None);
    }

    #[test]
    fn test_channel_routing() {
        assert_eq!(Mapping::parse("KEYBOARD_WASD").channel(), Some(RawChannel::Key));
        assert_eq!(
            Mapping::parse("MOUSE_POSITION").channel(),
            Some(RawChannel::Cursor)
        );
        assert_eq!(Mapping::parse("MOUSE_DELTA").channel(), Some(RawChannel::Cursor));
        assert_eq!(
            Mapping::parse("MOUSE_SCROLL_DOWN").channel(),
            Some(RawChannel::Scroll)
        );
        assert_eq!(
            Mapping::parse("MOUSE_MIDDLE").channel(),
            Some(RawChannel::MouseButton)
        );
        assert_eq!(
            Mapping::parse("GAMEPAD_LEFT_TRIGGER").channel(),
            Some(RawChannel::GamepadAxes)
        );
        assert_eq!(
            Mapping::parse("GAMEPAD_LEFT_TRIGGER_PRESS").channel(),
            Some(RawChannel::GamepadButtons)
        );
        assert_eq!(
            Mapping::parse("GAMEPAD_START").channel(),
            Some(RawChannel::GamepadButtons)
        );
    }

    #[test]
    fn test_origin_and_shape() {
        assert_eq!(
            Mapping::parse("GAMEPAD_A").origin(),
            Some(HardwareOrigin::Gamepad)
        );
        assert_eq!(
            Mapping::parse("MOUSE_SCROLL").origin(),
            Some(HardwareOrigin::Mouse)
        );
        assert!(Mapping::Wasd.is_composite());
        assert!(Mapping::GamepadAny.is_any());
        assert!(!Mapping::Key(KeyCode::KeyA).is_composite());
        assert_eq!(
            Mapping::Wasd.direction_keys(),
            Some([KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyA, KeyCode::KeyD])
        );
    }
}
