// Input mapping system
//
// Turns raw keyboard, mouse and gamepad events into typed actions that
// gameplay code listens to. Actions and their bindings are declared in a
// sectioned config file, one section per action set.
//
// ## Architecture
//
// - `value`: the three action value kinds (Axis2, Button, Trigger)
// - `mapping`: names of physical and composite input sources
// - `raw`: raw events and gamepad snapshots from the platform layer
// - `processor` / `behavior`: value transforms and gesture detectors
// - `binding`: one mapping feeding one action
// - `action` / `action_set`: named typed endpoints and their groups
// - `grammar` / `config`: binding grammar, config files and settings
// - `gamepad`: polled gamepad sources
// - `scheme`: keyboard/mouse versus gamepad arbitration for listeners
// - `manager`: owns everything and dispatches once per frame
//
// ## Usage Example
//
// ```rust
// use rusted_input::engine::input::{InputManager, SubscriberId};
//
// let mut input = InputManager::new();
// input.load_action_config("[Gameplay]\njump-button = KEYBOARD_SPACE, GAMEPAD_A\n");
// input.add_button_listener("Gameplay", "jump", SubscriberId::next(), |pressed, origin| {
//     println!("jump {} from {}", pressed, origin);
// })?;
//
// // In your event loop
// input.process_window_event(&window_event);
//
// // Once per frame
// input.tick();
// ```

pub mod action;
pub mod action_set;
pub mod behavior;
pub mod binding;
pub mod clock;
pub mod config;
pub mod gamepad;
pub mod grammar;
pub mod manager;
pub mod mapping;
pub mod processor;
pub mod raw;
pub mod scheme;
pub mod value;

// Re-export commonly used types
pub use action::{ActionId, SubscriberId};
pub use action_set::ActionSet;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{apply_cursor_mode, CursorMode, InputSettings};
pub use gamepad::{GamepadSource, ScriptedGamepads};
pub use manager::{InputManager, LoadReport, StopHandle, TickFlow};
pub use mapping::Mapping;
pub use raw::RawEvent;
pub use scheme::{InputScheme, SchemeTracker};
pub use value::{ActionValue, Axis2, Button, HardwareOrigin, Trigger, ValueKind};

#[cfg(feature = "gamepad")]
pub use gamepad::GilrsGamepads;

/// Input configuration and usage errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Unknown mapping: {0}")]
    UnknownMapping(String),

    #[error("Malformed modifier: {0}")]
    MalformedModifier(String),

    #[error("Unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("Invalid value '{value}' for {param} in {modifier}")]
    InvalidParameter {
        modifier: String,
        param: String,
        value: String,
    },

    #[error("Invalid action key '{0}': expected actionName-actionType")]
    InvalidActionKey(String),

    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    #[error("Duplicate action name: {0}")]
    DuplicateAction(String),

    #[error("Unknown action set: {0}")]
    UnknownActionSet(String),

    #[error("Unknown action: {action_set}.{action}")]
    UnknownAction { action_set: String, action: String },

    #[error("No active action set")]
    NoActiveActionSet,

    #[error("Input is disabled")]
    Disabled,

    #[error("Invalid action kind for '{action}': expected {expected}, got {actual}")]
    KindMismatch {
        action: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("Binding not subscribed: {0}")]
    NotSubscribed(String),

    #[error("Binding already subscribed: {0}")]
    AlreadySubscribed(String),

    #[error("Gamepad error: {0}")]
    Gamepad(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = InputError::UnknownMapping("JOYSTICK_1".to_string());
        assert_eq!(err.to_string(), "Unknown mapping: JOYSTICK_1");

        let err = InputError::KindMismatch {
            action: "move".to_string(),
            expected: ValueKind::Button,
            actual: ValueKind::Axes,
        };
        assert_eq!(
            err.to_string(),
            "Invalid action kind for 'move': expected button, got axes"
        );
    }
}
