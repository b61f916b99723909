// Binding grammar: action keys and comma-separated binding specs
//
// A config entry looks like
//
//     move-axes = {processor-dead-zone<min:0.1>}, KEYBOARD_WASD{processor-normalizer}, GAMEPAD_LEFT_STICK
//
// The key is `actionName-actionType`. The value is a list of bindings, each a
// mapping name optionally followed by a `{...}` modifier block. A bare block
// in first position holds global modifiers for every binding without its own
// block. Modifiers are chained with `>` and take `<key:value|key:value>`
// parameters.

use super::behavior::{
    Behavior, BehaviorKind, PressMode, DEFAULT_HOLD_TIME, DEFAULT_MULTIPRESS_COUNT,
    DEFAULT_MULTIPRESS_TIME,
};
use super::mapping::Mapping;
use super::processor::{Processor, DEFAULT_DEAD_ZONE_MAX, DEFAULT_DEAD_ZONE_MIN};
use super::value::{ValueKind, DEFAULT_PRESS_POINT};
use super::InputError;
use std::str::FromStr;

/// Behavior and processors attached to one binding
#[derive(Debug, Clone, Default)]
pub struct ModifierSet {
    pub behavior: Option<Behavior>,
    pub processors: Vec<Processor>,
}

/// One binding parsed from a config value
#[derive(Debug, Clone)]
pub struct BindingSpec {
    /// The binding text as written, modifiers included
    pub text: String,
    pub mapping: Mapping,
    pub modifiers: ModifierSet,
}

/// One parsed `actionName-actionType = bindings` line
#[derive(Debug, Clone)]
pub struct ActionDecl {
    pub name: String,
    pub kind: ValueKind,
    pub bindings: Vec<BindingSpec>,
}

/// Split `actionName-actionType` into name and kind
pub fn parse_action_key(key: &str) -> Result<(String, ValueKind), InputError> {
    let key = key.trim();
    let (name, suffix) = key
        .rsplit_once('-')
        .ok_or_else(|| InputError::InvalidActionKey(key.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::InvalidActionKey(key.to_string()));
    }

    let kind = ValueKind::from_suffix(suffix)
        .ok_or_else(|| InputError::UnknownActionType(suffix.trim().to_string()))?;
    Ok((name.to_string(), kind))
}

/// Parse one config line into an action declaration.
///
/// Only a bad key is fatal for the line. Problems inside the binding list are
/// pushed onto `warnings` and parsing carries on with defaults.
pub fn parse_action_line(
    key: &str,
    value: &str,
    warnings: &mut Vec<InputError>,
) -> Result<ActionDecl, InputError> {
    let (name, kind) = parse_action_key(key)?;

    let mut global: Option<ModifierSet> = None;
    let mut bindings = Vec::new();

    for (index, token) in split_top_level(value).into_iter().enumerate() {
        if token.starts_with('{') {
            if index == 0 {
                let block = block_contents(token, warnings);
                global = Some(parse_modifier_block(block, warnings));
            } else {
                warnings.push(InputError::MalformedModifier(format!(
                    "global modifier block must come first in '{}'",
                    key.trim()
                )));
            }
            continue;
        }

        let (mapping_name, modifiers) = match token.find('{') {
            Some(open) => {
                let block = block_contents(&token[open..], warnings);
                (&token[..open], Some(parse_modifier_block(block, warnings)))
            }
            None => (token, None),
        };

        let mapping = Mapping::parse(mapping_name);
        if let Mapping::Unknown(unknown) = &mapping {
            warnings.push(InputError::UnknownMapping(unknown.clone()));
        }

        let modifiers = modifiers
            .or_else(|| global.clone())
            .unwrap_or_default();

        bindings.push(BindingSpec {
            text: token.to_string(),
            mapping,
            modifiers,
        });
    }

    Ok(ActionDecl {
        name,
        kind,
        bindings,
    })
}

/// Split on commas that are not inside a `{...}` block
fn split_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Contents of a `{...}` block; tolerates a missing closing brace
fn block_contents<'a>(block: &'a str, warnings: &mut Vec<InputError>) -> &'a str {
    let inner = block.strip_prefix('{').unwrap_or(block);
    match inner.rfind('}') {
        Some(close) => &inner[..close],
        None => {
            warnings.push(InputError::MalformedModifier(format!(
                "missing '}}' in '{}'",
                block
            )));
            inner
        }
    }
}

/// Parse the inside of a modifier block: `name<k:v|k:v>name<...>...`
pub fn parse_modifier_block(block: &str, warnings: &mut Vec<InputError>) -> ModifierSet {
    let mut set = ModifierSet::default();
    let mut rest = block;

    loop {
        rest = rest.trim_start_matches(|c: char| c == '>' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let end = rest.find(['<', '>']).unwrap_or(rest.len());
        let name = rest[..end].trim();
        rest = &rest[end..];

        let params = if let Some(after) = rest.strip_prefix('<') {
            match after.find('>') {
                Some(close) => {
                    rest = &after[close + 1..];
                    &after[..close]
                }
                None => {
                    warnings.push(InputError::MalformedModifier(format!(
                        "unterminated parameters for '{}'",
                        name
                    )));
                    rest = "";
                    after
                }
            }
        } else {
            ""
        };

        apply_modifier(name, params, &mut set, warnings);
    }

    set
}

/// Parsed `key:value` pairs of one modifier
struct Params<'a> {
    modifier: &'a str,
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Params<'a> {
    fn parse(modifier: &'a str, text: &'a str, warnings: &mut Vec<InputError>) -> Self {
        let mut pairs = Vec::new();
        for pair in text.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            match pair.split_once(':') {
                Some((key, value)) => pairs.push((key.trim(), value.trim())),
                None => warnings.push(InputError::MalformedModifier(format!(
                    "expected key:value in '{}' of {}",
                    pair, modifier
                ))),
            }
        }
        Self { modifier, pairs }
    }

    fn raw(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
    }

    /// Numeric parameter, falling back to `default` when absent or invalid
    fn number<T: FromStr + Copy>(&self, key: &str, default: T, warnings: &mut Vec<InputError>) -> T {
        let Some(text) = self.raw(key) else {
            return default;
        };
        match text.parse() {
            Ok(value) => value,
            Err(_) => {
                warnings.push(self.invalid(key, text));
                default
            }
        }
    }

    fn flag(&self, key: &str, default: bool, warnings: &mut Vec<InputError>) -> bool {
        let Some(text) = self.raw(key) else {
            return default;
        };
        match text.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                warnings.push(self.invalid(key, text));
                default
            }
        }
    }

    fn invalid(&self, key: &str, value: &str) -> InputError {
        InputError::InvalidParameter {
            modifier: self.modifier.to_string(),
            param: key.to_string(),
            value: value.to_string(),
        }
    }
}

fn apply_modifier(
    name: &str,
    params: &str,
    set: &mut ModifierSet,
    warnings: &mut Vec<InputError>,
) {
    let params = Params::parse(name, params, warnings);

    let behavior = match name.to_ascii_lowercase().as_str() {
        "behavior-press" => {
            let mode = match params.raw("press-type") {
                Some(text) => PressMode::parse(text).unwrap_or_else(|| {
                    warnings.push(params.invalid("press-type", text));
                    PressMode::default()
                }),
                None => PressMode::default(),
            };
            let point = params.number("press-point", DEFAULT_PRESS_POINT, warnings);
            Some(Behavior::new(BehaviorKind::Press { mode }, point))
        }
        "behavior-hold" => {
            let min_hold_time = params.number("time", DEFAULT_HOLD_TIME, warnings);
            let point = params.number("press-point", DEFAULT_PRESS_POINT, warnings);
            Some(Behavior::new(BehaviorKind::Hold { min_hold_time }, point))
        }
        "behavior-multipress" => {
            let press_count = params.number("count", DEFAULT_MULTIPRESS_COUNT, warnings);
            let max_time = params.number("time", DEFAULT_MULTIPRESS_TIME, warnings);
            let point = params.number("press-point", DEFAULT_PRESS_POINT, warnings);
            Some(Behavior::new(
                BehaviorKind::Multipress {
                    press_count,
                    max_time,
                },
                point,
            ))
        }
        "processor-normalizer" => {
            set.processors.push(Processor::Normalizer);
            None
        }
        "processor-inverter" => {
            set.processors.push(Processor::Inverter {
                invert_x: params.flag("invert-x", false, warnings),
                invert_y: params.flag("invert-y", false, warnings),
            });
            None
        }
        "processor-dead-zone" => {
            set.processors.push(Processor::DeadZone {
                min: params.number("min", DEFAULT_DEAD_ZONE_MIN, warnings),
                max: params.number("max", DEFAULT_DEAD_ZONE_MAX, warnings),
            });
            None
        }
        "" => {
            warnings.push(InputError::MalformedModifier(
                "empty modifier name".to_string(),
            ));
            None
        }
        _ => {
            warnings.push(InputError::UnknownModifier(name.to_string()));
            None
        }
    };

    if let Some(behavior) = behavior {
        if let Some(previous) = &set.behavior {
            warnings.push(InputError::MalformedModifier(format!(
                "{} replaces {}: only one behavior per binding, the last one wins",
                behavior.kind(),
                previous.kind()
            )));
        }
        set.behavior = Some(behavior);
    }
}
