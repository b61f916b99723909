// Active input scheme: keyboard and mouse versus gamepad
//
// The input manager does not enforce a scheme. Listeners that care use a
// `SchemeTracker` to switch when a value arrives from the other device
// family.

use super::value::HardwareOrigin;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputScheme {
    #[default]
    KeyboardMouse,
    Gamepad,
}

impl InputScheme {
    /// Keyboard and mouse share a scheme
    pub fn of(origin: HardwareOrigin) -> Self {
        match origin {
            HardwareOrigin::Gamepad => InputScheme::Gamepad,
            HardwareOrigin::Keyboard | HardwareOrigin::Mouse => InputScheme::KeyboardMouse,
        }
    }
}

impl fmt::Display for InputScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputScheme::KeyboardMouse => f.write_str("KEYBOARD_MOUSE"),
            InputScheme::Gamepad => f.write_str("GAMEPAD"),
        }
    }
}

/// Tracks which scheme a listener currently assumes
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeTracker {
    current: InputScheme,
    locked: bool,
}

impl SchemeTracker {
    pub fn new(initial: InputScheme) -> Self {
        Self {
            current: initial,
            locked: false,
        }
    }

    pub fn current(&self) -> InputScheme {
        self.current
    }

    /// While locked, values from the other scheme are ignored instead of
    /// switching to it
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Decide whether to accept a value from `origin`, switching scheme if
    /// it comes from the other device family
    pub fn accept(&mut self, origin: HardwareOrigin) -> bool {
        let scheme = InputScheme::of(origin);
        if scheme == self.current {
            return true;
        }
        if self.locked {
            return false;
        }
        log::debug!("Input scheme switched {} -> {}", self.current, scheme);
        self.current = scheme;
        true
    }
}
