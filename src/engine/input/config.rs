// Input configuration: sectioned action files and engine settings
//
// Action files look like
//
//     ; comment
//     [Gameplay]
//     move-axes = KEYBOARD_WASD, GAMEPAD_LEFT_STICK
//     jump-button = KEYBOARD_SPACE, GAMEPAD_A
//
// Each section is an action set. Engine settings live in a TOML `[input]`
// table and pick whether input is enabled and how the cursor behaves.

use super::InputError;
use serde::Deserialize;
use std::fmt;

/// Receives the structure of a sectioned config file in order
pub trait ConfigVisitor {
    fn visit_section(&mut self, name: &str);

    /// An entry under the most recent section, or before any section if
    /// `section` is `None`
    fn visit_entry(&mut self, section: Option<&str>, key: &str, value: &str);
}

/// Walk a sectioned key/value text, calling `visitor` for each element.
///
/// Malformed lines are skipped and returned as warnings, with 1-based line
/// numbers.
pub fn parse_sections(text: &str, visitor: &mut dyn ConfigVisitor) -> Vec<InputError> {
    let mut warnings = Vec::new();
    let mut section: Option<String> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            match rest.strip_suffix(']').map(str::trim) {
                Some(name) if !name.is_empty() => {
                    visitor.visit_section(name);
                    section = Some(name.to_string());
                }
                _ => warnings.push(InputError::Settings(format!(
                    "line {}: malformed section header '{}'",
                    index + 1,
                    line
                ))),
            }
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                visitor.visit_entry(section.as_deref(), key.trim(), value.trim());
            }
            _ => warnings.push(InputError::Settings(format!(
                "line {}: expected 'key = value', got '{}'",
                index + 1,
                line
            ))),
        }
    }

    warnings
}

/// How the OS cursor behaves over the game window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CursorMode {
    #[default]
    Normal,
    Hidden,
    /// Hidden and locked to the window, for mouse-look
    Disabled,
}

impl CursorMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Some(CursorMode::Normal),
            "HIDDEN" => Some(CursorMode::Hidden),
            "DISABLED" => Some(CursorMode::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for CursorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CursorMode::Normal => "NORMAL",
            CursorMode::Hidden => "HIDDEN",
            CursorMode::Disabled => "DISABLED",
        };
        f.write_str(name)
    }
}

/// Engine-level input settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub enabled: bool,
    pub cursor_mode: CursorMode,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cursor_mode: CursorMode::Normal,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EngineConfig {
    #[serde(default)]
    input: InputSettings,
}

impl InputSettings {
    /// Read the `[input]` table of an engine config. A missing table yields
    /// the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, InputError> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| InputError::Settings(e.to_string()))?;
        Ok(config.input)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Apply a cursor mode to a window. Grab failures are logged; some
/// platforms only support one of the grab modes.
pub fn apply_cursor_mode(window: &winit::window::Window, mode: CursorMode) {
    use winit::window::CursorGrabMode;

    window.set_cursor_visible(mode == CursorMode::Normal);

    let result = match mode {
        CursorMode::Normal | CursorMode::Hidden => window.set_cursor_grab(CursorGrabMode::None),
        CursorMode::Disabled => window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined)),
    };

    if let Err(e) = result {
        log::warn!("Failed to apply cursor mode {}: {}", mode, e);
    }
}
