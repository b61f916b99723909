// Gamepad sources: polled hardware state for the gamepad channels

use super::raw::{GamepadConnection, GamepadId, GamepadState};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// A provider of gamepad connections and state snapshots.
///
/// The input manager calls `pump` once per tick to learn about plugged and
/// unplugged pads, then `snapshot` for each connected one.
pub trait GamepadSource {
    /// Process pending driver events and return connection changes
    fn pump(&mut self) -> Vec<GamepadConnection>;

    /// Current state of a connected gamepad
    fn snapshot(&self, id: GamepadId) -> Option<GamepadState>;
}

/// A gamepad source driven by hand, for tests and input replays
#[derive(Debug, Default)]
pub struct ScriptedGamepads {
    pending: VecDeque<GamepadConnection>,
    states: HashMap<GamepadId, GamepadState>,
}

impl ScriptedGamepads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug in a pad with a neutral state
    pub fn connect(&mut self, id: GamepadId) {
        self.states.entry(id).or_default();
        self.pending.push_back(GamepadConnection { id, connected: true });
    }

    pub fn disconnect(&mut self, id: GamepadId) {
        self.states.remove(&id);
        self.pending.push_back(GamepadConnection {
            id,
            connected: false,
        });
    }

    /// Replace a connected pad's state. Unknown ids are ignored.
    pub fn set_state(&mut self, id: GamepadId, state: GamepadState) {
        if let Some(current) = self.states.get_mut(&id) {
            *current = state;
        }
    }

    /// Mutable state of a connected pad
    pub fn state_mut(&mut self, id: GamepadId) -> Option<&mut GamepadState> {
        self.states.get_mut(&id)
    }
}

impl GamepadSource for ScriptedGamepads {
    fn pump(&mut self) -> Vec<GamepadConnection> {
        self.pending.drain(..).collect()
    }

    fn snapshot(&self, id: GamepadId) -> Option<GamepadState> {
        self.states.get(&id).copied()
    }
}

/// A shared source, so a host can keep driving it after handing it over
impl<S: GamepadSource> GamepadSource for Rc<RefCell<S>> {
    fn pump(&mut self) -> Vec<GamepadConnection> {
        self.borrow_mut().pump()
    }

    fn snapshot(&self, id: GamepadId) -> Option<GamepadState> {
        self.borrow().snapshot(id)
    }
}

#[cfg(feature = "gamepad")]
pub use self::gilrs_source::GilrsGamepads;

#[cfg(feature = "gamepad")]
mod gilrs_source {
    use super::GamepadSource;
    use crate::engine::input::raw::{
        GamepadAxis, GamepadButton, GamepadConnection, GamepadId, GamepadState,
    };
    use crate::engine::input::InputError;
    use gilrs::{Axis, Button, Gilrs};
    use std::collections::HashMap;

    const BUTTONS: [(GamepadButton, Button); GamepadButton::COUNT] = [
        (GamepadButton::South, Button::South),
        (GamepadButton::East, Button::East),
        (GamepadButton::West, Button::West),
        (GamepadButton::North, Button::North),
        (GamepadButton::LeftBumper, Button::LeftTrigger),
        (GamepadButton::RightBumper, Button::RightTrigger),
        (GamepadButton::Back, Button::Select),
        (GamepadButton::Start, Button::Start),
        (GamepadButton::Guide, Button::Mode),
        (GamepadButton::LeftThumb, Button::LeftThumb),
        (GamepadButton::RightThumb, Button::RightThumb),
        (GamepadButton::DpadUp, Button::DPadUp),
        (GamepadButton::DpadRight, Button::DPadRight),
        (GamepadButton::DpadDown, Button::DPadDown),
        (GamepadButton::DpadLeft, Button::DPadLeft),
    ];

    /// Gamepads read through gilrs
    pub struct GilrsGamepads {
        gilrs: Gilrs,
        ids: HashMap<GamepadId, gilrs::GamepadId>,
        /// Pads already connected at startup, reported on the first pump
        initial: Vec<GamepadConnection>,
    }

    impl GilrsGamepads {
        pub fn new() -> Result<Self, InputError> {
            let gilrs = Gilrs::new().map_err(|e| InputError::Gamepad(e.to_string()))?;

            let mut ids = HashMap::new();
            let mut initial = Vec::new();
            for (id, gamepad) in gilrs.gamepads() {
                log::info!("Gamepad {} found: {}", id, gamepad.name());
                let index = usize::from(id);
                ids.insert(index, id);
                initial.push(GamepadConnection {
                    id: index,
                    connected: true,
                });
            }

            Ok(Self {
                gilrs,
                ids,
                initial,
            })
        }
    }

    impl GamepadSource for GilrsGamepads {
        fn pump(&mut self) -> Vec<GamepadConnection> {
            let mut changes = std::mem::take(&mut self.initial);

            while let Some(event) = self.gilrs.next_event() {
                let index = usize::from(event.id);
                match event.event {
                    gilrs::EventType::Connected => {
                        log::info!("Gamepad {} connected", event.id);
                        self.ids.insert(index, event.id);
                        changes.push(GamepadConnection {
                            id: index,
                            connected: true,
                        });
                    }
                    gilrs::EventType::Disconnected => {
                        log::info!("Gamepad {} disconnected", event.id);
                        self.ids.remove(&index);
                        changes.push(GamepadConnection {
                            id: index,
                            connected: false,
                        });
                    }
                    _ => {}
                }
            }

            changes
        }

        fn snapshot(&self, id: GamepadId) -> Option<GamepadState> {
            let gamepad = self.gilrs.connected_gamepad(*self.ids.get(&id)?)?;
            let mut state = GamepadState::default();

            for (ours, theirs) in BUTTONS {
                state.set_button(ours, gamepad.is_pressed(theirs));
            }

            // Up is positive on our sticks
            state.set_axis(GamepadAxis::LeftX, gamepad.value(Axis::LeftStickX));
            state.set_axis(GamepadAxis::LeftY, -gamepad.value(Axis::LeftStickY));
            state.set_axis(GamepadAxis::RightX, gamepad.value(Axis::RightStickX));
            state.set_axis(GamepadAxis::RightY, -gamepad.value(Axis::RightStickY));

            // Triggers report -1..1 on most drivers
            let trigger = |axis: Axis| ((gamepad.value(axis) + 1.0) / 2.0).clamp(0.0, 1.0);
            state.set_axis(GamepadAxis::LeftTrigger, trigger(Axis::LeftZ));
            state.set_axis(GamepadAxis::RightTrigger, trigger(Axis::RightZ));

            Some(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::raw::GamepadButton;

    #[test]
    fn test_scripted_connections_drain_once() {
        let mut pads = ScriptedGamepads::new();
        pads.connect(0);
        pads.connect(3);

        let changes = pads.pump();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.connected));
        assert!(pads.pump().is_empty());
    }

    #[test]
    fn test_scripted_state_follows_connection() {
        let mut pads = ScriptedGamepads::new();
        assert_eq!(pads.snapshot(1), None);

        pads.connect(1);
        let mut state = GamepadState::default();
        state.set_button(GamepadButton::South, true);
        pads.set_state(1, state);
        assert_eq!(pads.snapshot(1), Some(state));

        pads.disconnect(1);
        assert_eq!(pads.snapshot(1), None);
        // Setting state on an unplugged pad does nothing
        pads.set_state(1, state);
        assert_eq!(pads.snapshot(1), None);
        assert_eq!(pads.pump().last().map(|c| c.connected), Some(false));
    }
}
