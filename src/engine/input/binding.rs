// Bindings: glue between one hardware mapping and one action
//
// A binding reads raw events from the channel its mapping subscribes to,
// turns them into a typed value, runs its processor chain and then decides,
// through its behavior or built-in change detection, whether the value is
// forwarded to the parent action.

use super::action::ActionId;
use super::behavior::Behavior;
use super::mapping::{Mapping, ScrollFilter};
use super::processor::{apply_chain, Processor};
use super::raw::{
    CursorInput, GamepadButton, GamepadSide, GamepadState, KeyInput, MouseButtonInput,
    RawAction, ScrollInput,
};
use super::value::{
    ActionValue, Axis2, Button, HardwareOrigin, InputValue, Sample, Trigger, ValueKind,
    DEFAULT_PRESS_POINT,
};
use glam::Vec2;
use std::collections::HashSet;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Index of a binding in the input manager's binding table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub usize);

/// Read-only platform state handed to bindings with each raw event
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    /// Event time in seconds
    pub now: f64,
    /// Keys currently held down, for composite keyboard mappings
    pub pressed_keys: &'a HashSet<KeyCode>,
}

/// Last key or button seen by an `*_ANY` mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnyIdentity {
    Key(KeyCode),
    Mouse(MouseButton),
    Gamepad(GamepadButton),
}

/// Number of logical sub-keys a mapping tracks for change detection
fn sub_key_count(mapping: &Mapping) -> usize {
    match mapping {
        Mapping::Wasd | Mapping::Arrows | Mapping::Dpad => 4,
        Mapping::GamepadAny => GamepadButton::COUNT,
        _ => 1,
    }
}

/// A binding producing values of kind `T` for one action
#[derive(Debug)]
pub struct Binding<T: InputValue> {
    name: String,
    mapping: Mapping,
    origin: HardwareOrigin,
    action: ActionId,
    behavior: Option<Behavior>,
    processors: Vec<Processor>,

    /// Last raw action code per logical sub-key
    last_codes: Vec<RawAction>,
    /// Key or button that last drove an ANY mapping
    last_any: Option<AnyIdentity>,
    /// Last processed value, for analog change detection and hold polling
    last_value: T,
    /// Previous cursor position, for deltas
    last_cursor: Option<Vec2>,
    /// Per-frame accumulated mouse delta or scroll
    accumulator: Vec2,
}

impl<T: InputValue> Binding<T> {
    pub fn new(
        name: impl Into<String>,
        mapping: Mapping,
        action: ActionId,
        behavior: Option<Behavior>,
        processors: Vec<Processor>,
    ) -> Self {
        let origin = mapping.origin().unwrap_or_default();
        let last_codes = vec![RawAction::Release; sub_key_count(&mapping)];
        Self {
            name: name.into(),
            mapping,
            origin,
            action,
            behavior,
            processors,
            last_codes,
            last_any: None,
            last_value: T::default(),
            last_cursor: None,
            accumulator: Vec2::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    pub fn origin(&self) -> HardwareOrigin {
        self.origin
    }

    pub fn behavior(&self) -> Option<&Behavior> {
        self.behavior.as_ref()
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    /// Never fires: the mapping name was not recognized
    pub fn is_inert(&self) -> bool {
        matches!(self.mapping, Mapping::Unknown(_))
    }

    /// Last value computed from hardware, after processors
    pub fn last_value(&self) -> T {
        self.last_value
    }

    /// Handle a key event
    pub fn on_key(&mut self, event: &KeyInput, ctx: &BindingContext<'_>) -> Option<T> {
        if event.action == RawAction::Repeat {
            return None;
        }

        match self.mapping {
            Mapping::Key(key) => {
                if event.key != key {
                    return None;
                }
                let changed = self.track_code(0, event.action);
                let sample = Sample::Digital(event.action == RawAction::Press);
                self.finish(sample, changed, false, ctx.now)
            }
            Mapping::Wasd | Mapping::Arrows => {
                let keys = self.mapping.direction_keys()?;
                if !keys.contains(&event.key) {
                    return None;
                }
                let held = keys.map(|key| ctx.pressed_keys.contains(&key));
                let changed = self.track_directions(held);
                self.finish(Sample::Vector(direction_vector(held)), changed, false, ctx.now)
            }
            Mapping::KeyAny => {
                let (changed, fresh) =
                    self.track_any(AnyIdentity::Key(event.key), event.action)?;
                let sample = Sample::Digital(event.action == RawAction::Press);
                self.finish(sample, changed, fresh, ctx.now)
            }
            _ => None,
        }
    }

    /// Handle a mouse button event
    pub fn on_mouse_button(
        &mut self,
        event: &MouseButtonInput,
        ctx: &BindingContext<'_>,
    ) -> Option<T> {
        if event.action == RawAction::Repeat {
            return None;
        }

        match self.mapping {
            Mapping::MouseButton(button) => {
                if event.button != button {
                    return None;
                }
                let changed = self.track_code(0, event.action);
                let sample = Sample::Digital(event.action == RawAction::Press);
                self.finish(sample, changed, false, ctx.now)
            }
            Mapping::MouseAny => {
                let (changed, fresh) =
                    self.track_any(AnyIdentity::Mouse(event.button), event.action)?;
                let sample = Sample::Digital(event.action == RawAction::Press);
                self.finish(sample, changed, fresh, ctx.now)
            }
            _ => None,
        }
    }

    /// Handle a cursor move
    pub fn on_cursor(&mut self, event: &CursorInput, ctx: &BindingContext<'_>) -> Option<T> {
        let position = Vec2::new(event.x as f32, event.y as f32);
        match self.mapping {
            Mapping::MousePosition => {
                self.last_cursor = Some(position);
                self.finish_analog(Sample::Vector(position), ctx.now)
            }
            Mapping::MouseDelta => {
                let previous = self.last_cursor.replace(position)?;
                let delta = position - previous;
                if delta == Vec2::ZERO {
                    return None;
                }
                self.accumulator += delta;
                self.finish(Sample::Vector(self.accumulator), true, false, ctx.now)
            }
            _ => None,
        }
    }

    /// Handle a scroll event
    pub fn on_scroll(&mut self, event: &ScrollInput, ctx: &BindingContext<'_>) -> Option<T> {
        let Mapping::MouseScroll(filter) = self.mapping else {
            return None;
        };

        let dx = event.dx as f32;
        let dy = event.dy as f32;
        let amount = match filter {
            ScrollFilter::Both => Vec2::new(dx, dy),
            ScrollFilter::Up => Vec2::new(dy.max(0.0), 0.0),
            ScrollFilter::Down => Vec2::new((-dy).max(0.0), 0.0),
            ScrollFilter::Left => Vec2::new((-dx).max(0.0), 0.0),
            ScrollFilter::Right => Vec2::new(dx.max(0.0), 0.0),
        };
        if amount == Vec2::ZERO {
            return None;
        }

        self.accumulator += amount;
        let sample = match filter {
            // A trigger keeps the sign of vertical scrolling
            ScrollFilter::Both if T::KIND == ValueKind::Trigger => {
                Sample::Scalar(self.accumulator.y)
            }
            ScrollFilter::Both => Sample::Vector(self.accumulator),
            _ => Sample::Scalar(self.accumulator.x),
        };
        self.finish(sample, true, false, ctx.now)
    }

    /// Handle a polled gamepad snapshot on the axes channel
    pub fn on_gamepad_axes(
        &mut self,
        state: &GamepadState,
        ctx: &BindingContext<'_>,
    ) -> Option<T> {
        let sample = match self.mapping {
            Mapping::Stick(side) => {
                let (x, y) = state.stick(side);
                Sample::Vector(Vec2::new(x, y))
            }
            Mapping::Trigger(side) => Sample::Scalar(state.trigger(side)),
            _ => return None,
        };
        self.finish_analog(sample, ctx.now)
    }

    /// Handle a polled gamepad snapshot on the buttons channel
    pub fn on_gamepad_buttons(
        &mut self,
        state: &GamepadState,
        ctx: &BindingContext<'_>,
    ) -> Option<T> {
        match self.mapping {
            Mapping::GamepadButton(button) => self.finish_button(state.is_pressed(button), ctx),
            Mapping::StickPress(side) => {
                let button = match side {
                    GamepadSide::Left => GamepadButton::LeftThumb,
                    GamepadSide::Right => GamepadButton::RightThumb,
                };
                self.finish_button(state.is_pressed(button), ctx)
            }
            Mapping::TriggerPress(side) => {
                self.finish_button(state.trigger(side) >= DEFAULT_PRESS_POINT, ctx)
            }
            Mapping::Dpad => {
                let held = [
                    GamepadButton::DpadUp,
                    GamepadButton::DpadDown,
                    GamepadButton::DpadLeft,
                    GamepadButton::DpadRight,
                ]
                .map(|button| state.is_pressed(button));
                let changed = self.track_directions(held);
                self.finish(Sample::Vector(direction_vector(held)), changed, false, ctx.now)
            }
            Mapping::GamepadAny => {
                let mut changed = false;
                for button in GamepadButton::ALL {
                    let code = RawAction::from_pressed(state.is_pressed(button));
                    changed |= self.track_code(button.index(), code);
                }

                let mut fresh = false;
                if let Some(first) = state.first_pressed() {
                    let identity = AnyIdentity::Gamepad(first);
                    if self.last_any != Some(identity) {
                        self.last_any = Some(identity);
                        fresh = true;
                    }
                }

                let pressed = state.first_pressed().is_some();
                self.finish(Sample::Digital(pressed), changed, fresh, ctx.now)
            }
            _ => None,
        }
    }

    /// Re-evaluate a time-driven behavior without a new event.
    ///
    /// Keyboard and mouse report nothing while a key is held, so hold
    /// detection for them is driven from the per-frame tick. Gamepad
    /// bindings are polled every frame anyway and are skipped here.
    pub fn poll_behavior(&mut self, now: f64) -> Option<T> {
        if self.is_inert() || self.mapping.channel().is_some_and(|c| c.is_polled()) {
            return None;
        }
        let behavior = self.behavior.as_mut()?;
        if !behavior.is_time_driven() {
            return None;
        }
        let value = self.last_value;
        behavior.check(value, false, now).then_some(value)
    }

    /// Zero the per-frame accumulators. Safe to call when nothing accumulated.
    pub fn reset_accumulators(&mut self) {
        self.accumulator = Vec2::ZERO;
    }

    /// Drop the cursor origin and accumulators. The next cursor event only
    /// sets a new origin, so motion missed while input was off is not
    /// reported as one jump.
    pub fn forget_motion(&mut self) {
        self.last_cursor = None;
        self.accumulator = Vec2::ZERO;
    }

    fn finish_button(&mut self, pressed: bool, ctx: &BindingContext<'_>) -> Option<T> {
        let changed = self.track_code(0, RawAction::from_pressed(pressed));
        self.finish(Sample::Digital(pressed), changed, false, ctx.now)
    }

    /// Analog sources without action codes: changed means the processed
    /// value differs from the last one
    fn finish_analog(&mut self, sample: Sample, now: f64) -> Option<T> {
        let value = apply_chain(&self.processors, T::from_sample(sample));
        let changed = value != self.last_value;
        self.gate(value, changed, false, now)
    }

    fn finish(&mut self, sample: Sample, changed: bool, fresh: bool, now: f64) -> Option<T> {
        let value = apply_chain(&self.processors, T::from_sample(sample));
        self.gate(value, changed, fresh, now)
    }

    fn gate(&mut self, value: T, changed: bool, fresh: bool, now: f64) -> Option<T> {
        self.last_value = value;
        let fire = match self.behavior.as_mut() {
            Some(behavior) => behavior.check(value, fresh, now),
            None => changed || fresh,
        };
        if fire {
            log::trace!("binding '{}' fired {:?}", self.name, value);
            Some(value)
        } else {
            None
        }
    }

    /// Record the code for one sub-key, returning whether it changed
    fn track_code(&mut self, index: usize, code: RawAction) -> bool {
        match self.last_codes.get_mut(index) {
            Some(last) if *last != code => {
                *last = code;
                true
            }
            _ => false,
        }
    }

    /// Record up/down/left/right held state, returning whether any changed
    fn track_directions(&mut self, held: [bool; 4]) -> bool {
        let mut changed = false;
        for (index, pressed) in held.into_iter().enumerate() {
            changed |= self.track_code(index, RawAction::from_pressed(pressed));
        }
        changed
    }

    /// Change detection for ANY mappings.
    ///
    /// A press of a different key switches identity and is reported as
    /// fresh; releases of keys other than the current one are ignored.
    fn track_any(&mut self, identity: AnyIdentity, action: RawAction) -> Option<(bool, bool)> {
        if self.last_any == Some(identity) {
            return Some((self.track_code(0, action), false));
        }
        if action != RawAction::Press {
            return None;
        }
        self.last_any = Some(identity);
        self.track_code(0, action);
        Some((true, true))
    }
}

/// up/down/left/right held state as a direction, up positive
fn direction_vector(held: [bool; 4]) -> Vec2 {
    let axis = |positive: bool, negative: bool| -> f32 {
        (positive as i32 - negative as i32) as f32
    };
    Vec2::new(axis(held[3], held[2]), axis(held[0], held[1]))
}

/// A binding of any of the three value kinds
#[derive(Debug)]
pub enum BindingSlot {
    Axes(Binding<Axis2>),
    Button(Binding<Button>),
    Trigger(Binding<Trigger>),
}

macro_rules! with_binding {
    ($slot:expr, $binding:ident => $body:expr) => {
        match $slot {
            BindingSlot::Axes($binding) => $body,
            BindingSlot::Button($binding) => $body,
            BindingSlot::Trigger($binding) => $body,
        }
    };
}

impl BindingSlot {
    /// Build a binding of the given kind
    pub fn new(
        kind: ValueKind,
        name: impl Into<String>,
        mapping: Mapping,
        action: ActionId,
        behavior: Option<Behavior>,
        processors: Vec<Processor>,
    ) -> Self {
        match kind {
            ValueKind::Axes => {
                BindingSlot::Axes(Binding::new(name, mapping, action, behavior, processors))
            }
            ValueKind::Button => {
                BindingSlot::Button(Binding::new(name, mapping, action, behavior, processors))
            }
            ValueKind::Trigger => {
                BindingSlot::Trigger(Binding::new(name, mapping, action, behavior, processors))
            }
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            BindingSlot::Axes(_) => ValueKind::Axes,
            BindingSlot::Button(_) => ValueKind::Button,
            BindingSlot::Trigger(_) => ValueKind::Trigger,
        }
    }

    pub fn name(&self) -> &str {
        with_binding!(self, b => b.name())
    }

    pub fn mapping(&self) -> &Mapping {
        with_binding!(self, b => b.mapping())
    }

    pub fn action(&self) -> ActionId {
        with_binding!(self, b => b.action())
    }

    pub fn origin(&self) -> HardwareOrigin {
        with_binding!(self, b => b.origin())
    }

    pub fn is_inert(&self) -> bool {
        with_binding!(self, b => b.is_inert())
    }

    pub fn on_key(&mut self, event: &KeyInput, ctx: &BindingContext<'_>) -> Option<ActionValue> {
        with_binding!(self, b => b.on_key(event, ctx).map(InputValue::into_action_value))
    }

    pub fn on_mouse_button(
        &mut self,
        event: &MouseButtonInput,
        ctx: &BindingContext<'_>,
    ) -> Option<ActionValue> {
        with_binding!(self, b => b.on_mouse_button(event, ctx).map(InputValue::into_action_value))
    }

    pub fn on_cursor(
        &mut self,
        event: &CursorInput,
        ctx: &BindingContext<'_>,
    ) -> Option<ActionValue> {
        with_binding!(self, b => b.on_cursor(event, ctx).map(InputValue::into_action_value))
    }

    pub fn on_scroll(
        &mut self,
        event: &ScrollInput,
        ctx: &BindingContext<'_>,
    ) -> Option<ActionValue> {
        with_binding!(self, b => b.on_scroll(event, ctx).map(InputValue::into_action_value))
    }

    pub fn on_gamepad_axes(
        &mut self,
        state: &GamepadState,
        ctx: &BindingContext<'_>,
    ) -> Option<ActionValue> {
        with_binding!(self, b => b.on_gamepad_axes(state, ctx).map(InputValue::into_action_value))
    }

    pub fn on_gamepad_buttons(
        &mut self,
        state: &GamepadState,
        ctx: &BindingContext<'_>,
    ) -> Option<ActionValue> {
        with_binding!(self, b => b.on_gamepad_buttons(state, ctx).map(InputValue::into_action_value))
    }

    pub fn poll_behavior(&mut self, now: f64) -> Option<ActionValue> {
        with_binding!(self, b => b.poll_behavior(now).map(InputValue::into_action_value))
    }

    pub fn reset_accumulators(&mut self) {
        with_binding!(self, b => b.reset_accumulators())
    }

    pub fn forget_motion(&mut self) {
        with_binding!(self, b => b.forget_motion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::behavior::PressMode;
    use crate::engine::input::raw::GamepadAxis;

    fn key(key: KeyCode, action: RawAction) -> KeyInput {
        KeyInput { key, action }
    }

    fn ctx(keys: &HashSet<KeyCode>, now: f64) -> BindingContext<'_> {
        BindingContext {
            now,
            pressed_keys: keys,
        }
    }

    fn button_binding(name: &str, behavior: Option<Behavior>) -> Binding<Button> {
        Binding::new(name, Mapping::parse(name), ActionId(0), behavior, Vec::new())
    }

    #[test]
    fn test_key_press_and_release_forward() {
        let keys = HashSet::new();
        let mut binding = button_binding("KEYBOARD_SPACE", None);

        let pressed = binding.on_key(&key(KeyCode::Space, RawAction::Press), &ctx(&keys, 0.0));
        assert_eq!(pressed, Some(true));

        let released =
            binding.on_key(&key(KeyCode::Space, RawAction::Release), &ctx(&keys, 0.1));
        assert_eq!(released, Some(false));
    }

    #[test]
    fn test_repeat_never_forwards() {
        let keys = HashSet::new();
        let mut binding = button_binding("KEYBOARD_SPACE", None);
        binding.on_key(&key(KeyCode::Space, RawAction::Press), &ctx(&keys, 0.0));

        for i in 0..5 {
            let out = binding.on_key(
                &key(KeyCode::Space, RawAction::Repeat),
                &ctx(&keys, 0.1 * i as f64),
            );
            assert_eq!(out, None);
        }
    }

    #[test]
    fn test_repeat_never_forwards_for_any_mapping() {
        let keys = HashSet::new();
        let mut binding = button_binding("KEYBOARD_ANY", None);
        assert_eq!(
            binding.on_key(&key(KeyCode::KeyQ, RawAction::Repeat), &ctx(&keys, 0.0)),
            None
        );
    }

    #[test]
    fn test_same_code_twice_does_not_refire() {
        let keys = HashSet::new();
        let mut binding = button_binding("KEYBOARD_E", None);
        assert!(binding
            .on_key(&key(KeyCode::KeyE, RawAction::Press), &ctx(&keys, 0.0))
            .is_some());
        assert!(binding
            .on_key(&key(KeyCode::KeyE, RawAction::Press), &ctx(&keys, 0.1))
            .is_none());
    }

    #[test]
    fn test_other_keys_ignored() {
        let keys = HashSet::new();
        let mut binding = button_binding("KEYBOARD_SPACE", None);
        assert_eq!(
            binding.on_key(&key(KeyCode::KeyA, RawAction::Press), &ctx(&keys, 0.0)),
            None
        );
    }

    #[test]
    fn test_wasd_composite_direction() {
        let mut binding: Binding<Axis2> =
            Binding::new("KEYBOARD_WASD", Mapping::Wasd, ActionId(0), None, Vec::new());

        let mut keys = HashSet::new();
        keys.insert(KeyCode::KeyW);
        let out = binding.on_key(&key(KeyCode::KeyW, RawAction::Press), &ctx(&keys, 0.0));
        assert_eq!(out, Some(Vec2::new(0.0, 1.0)));

        keys.insert(KeyCode::KeyD);
        let out = binding.on_key(&key(KeyCode::KeyD, RawAction::Press), &ctx(&keys, 0.1));
        assert_eq!(out, Some(Vec2::new(1.0, 1.0)));

        keys.remove(&KeyCode::KeyW);
        let out = binding.on_key(&key(KeyCode::KeyW, RawAction::Release), &ctx(&keys, 0.2));
        assert_eq!(out, Some(Vec2::new(1.0, 0.0)));

        // Keys outside the composite are not ours
        let out = binding.on_key(&key(KeyCode::KeyQ, RawAction::Press), &ctx(&keys, 0.3));
        assert_eq!(out, None);
    }

    #[test]
    fn test_any_mapping_switches_identity_fresh() {
        let keys = HashSet::new();
        let mut binding = button_binding(
            "KEYBOARD_ANY",
            Some(Behavior::press(PressMode::Press)),
        );

        assert_eq!(
            binding.on_key(&key(KeyCode::KeyA, RawAction::Press), &ctx(&keys, 0.0)),
            Some(true)
        );
        // A second key while A is still down: the press behavior alone would
        // see no edge, the identity switch forces a fresh evaluation
        assert_eq!(
            binding.on_key(&key(KeyCode::KeyB, RawAction::Press), &ctx(&keys, 0.1)),
            Some(true)
        );
        // Releasing the old key is ignored
        assert_eq!(
            binding.on_key(&key(KeyCode::KeyA, RawAction::Release), &ctx(&keys, 0.2)),
            None
        );
    }

    #[test]
    fn test_mouse_button_mapping() {
        let keys = HashSet::new();
        let mut binding = button_binding("MOUSE_LEFT", None);
        let press = MouseButtonInput {
            button: MouseButton::Left,
            action: RawAction::Press,
        };
        let other = MouseButtonInput {
            button: MouseButton::Right,
            action: RawAction::Press,
        };
        assert_eq!(binding.on_mouse_button(&other, &ctx(&keys, 0.0)), None);
        assert_eq!(binding.on_mouse_button(&press, &ctx(&keys, 0.0)), Some(true));
    }

    #[test]
    fn test_mouse_delta_accumulates_and_resets() {
        let keys = HashSet::new();
        let mut binding: Binding<Axis2> =
            Binding::new("MOUSE_DELTA", Mapping::MouseDelta, ActionId(0), None, Vec::new());

        // First position only establishes the origin
        assert_eq!(
            binding.on_cursor(&CursorInput { x: 10.0, y: 5.0 }, &ctx(&keys, 0.0)),
            None
        );

        let moves = [(11.0, 5.0), (13.0, 5.0), (14.0, 5.0)];
        let mut last = None;
        for (x, y) in moves {
            last = binding.on_cursor(&CursorInput { x, y }, &ctx(&keys, 0.0));
        }
        assert_eq!(last, Some(Vec2::new(4.0, 0.0)));

        binding.reset_accumulators();
        let next = binding.on_cursor(&CursorInput { x: 15.0, y: 5.0 }, &ctx(&keys, 0.1));
        assert_eq!(next, Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_mouse_position_change_detection() {
        let keys = HashSet::new();
        let mut binding: Binding<Axis2> = Binding::new(
            "MOUSE_POSITION",
            Mapping::MousePosition,
            ActionId(0),
            None,
            Vec::new(),
        );
        let at = CursorInput { x: 100.0, y: 50.0 };
        assert_eq!(
            binding.on_cursor(&at, &ctx(&keys, 0.0)),
            Some(Vec2::new(100.0, 50.0))
        );
        assert_eq!(binding.on_cursor(&at, &ctx(&keys, 0.1)), None);
    }

    #[test]
    fn test_scroll_up_filters_and_accumulates() {
        let keys = HashSet::new();
        let mut binding: Binding<Trigger> = Binding::new(
            "MOUSE_SCROLL_UP",
            Mapping::MouseScroll(ScrollFilter::Up),
            ActionId(0),
            None,
            Vec::new(),
        );

        let down = ScrollInput { dx: 0.0, dy: -1.0 };
        let up = ScrollInput { dx: 0.0, dy: 1.0 };
        assert_eq!(binding.on_scroll(&down, &ctx(&keys, 0.0)), None);
        assert_eq!(binding.on_scroll(&up, &ctx(&keys, 0.0)), Some(1.0));
        assert_eq!(binding.on_scroll(&up, &ctx(&keys, 0.0)), Some(2.0));

        binding.reset_accumulators();
        binding.reset_accumulators();
        assert_eq!(binding.on_scroll(&up, &ctx(&keys, 0.1)), Some(1.0));
    }

    #[test]
    fn test_scroll_trigger_keeps_vertical_sign() {
        let keys = HashSet::new();
        let mut binding: Binding<Trigger> = Binding::new(
            "MOUSE_SCROLL",
            Mapping::MouseScroll(ScrollFilter::Both),
            ActionId(0),
            None,
            Vec::new(),
        );

        let down = ScrollInput { dx: 0.0, dy: -2.0 };
        assert_eq!(binding.on_scroll(&down, &ctx(&keys, 0.0)), Some(-2.0));
        binding.reset_accumulators();
        let up = ScrollInput { dx: 0.0, dy: 1.0 };
        assert_eq!(binding.on_scroll(&up, &ctx(&keys, 0.1)), Some(1.0));
    }

    #[test]
    fn test_forget_motion_restarts_cursor_origin() {
        let keys = HashSet::new();
        let mut binding: Binding<Axis2> =
            Binding::new("MOUSE_DELTA", Mapping::MouseDelta, ActionId(0), None, Vec::new());
        binding.on_cursor(&CursorInput { x: 0.0, y: 0.0 }, &ctx(&keys, 0.0));
        binding.on_cursor(&CursorInput { x: 2.0, y: 0.0 }, &ctx(&keys, 0.0));

        binding.forget_motion();
        assert_eq!(
            binding.on_cursor(&CursorInput { x: 500.0, y: 0.0 }, &ctx(&keys, 0.1)),
            None
        );
        assert_eq!(
            binding.on_cursor(&CursorInput { x: 501.0, y: 0.0 }, &ctx(&keys, 0.1)),
            Some(Vec2::new(1.0, 0.0))
        );
    }

    #[test]
    fn test_gamepad_stick_with_processors() {
        let keys = HashSet::new();
        let mut binding: Binding<Axis2> = Binding::new(
            "GAMEPAD_LEFT_STICK",
            Mapping::Stick(GamepadSide::Left),
            ActionId(0),
            None,
            vec![Processor::dead_zone()],
        );

        let mut state = GamepadState::default();
        state.set_axis(GamepadAxis::LeftX, 0.1);
        // Inside the dead zone: processed value equals the initial zero
        assert_eq!(binding.on_gamepad_axes(&state, &ctx(&keys, 0.0)), None);

        state.set_axis(GamepadAxis::LeftY, 1.0);
        let out = binding.on_gamepad_axes(&state, &ctx(&keys, 0.0));
        assert!(out.is_some());
        assert!((out.unwrap().length() - 1.0).abs() < 1e-5);

        // Unchanged snapshot does not refire
        assert_eq!(binding.on_gamepad_axes(&state, &ctx(&keys, 0.1)), None);
    }

    #[test]
    fn test_gamepad_button_and_dpad() {
        let keys = HashSet::new();
        let mut jump = button_binding("GAMEPAD_A", None);
        let mut dpad: Binding<Axis2> =
            Binding::new("GAMEPAD_DPAD", Mapping::Dpad, ActionId(1), None, Vec::new());

        let mut state = GamepadState::default();
        assert_eq!(jump.on_gamepad_buttons(&state, &ctx(&keys, 0.0)), None);

        state.set_button(GamepadButton::South, true);
        state.set_button(GamepadButton::DpadLeft, true);
        assert_eq!(jump.on_gamepad_buttons(&state, &ctx(&keys, 0.0)), Some(true));
        assert_eq!(
            dpad.on_gamepad_buttons(&state, &ctx(&keys, 0.0)),
            Some(Vec2::new(-1.0, 0.0))
        );
        assert_eq!(jump.on_gamepad_buttons(&state, &ctx(&keys, 0.1)), None);
    }

    #[test]
    fn test_trigger_press_reads_axis_as_button() {
        let keys = HashSet::new();
        let mut binding = button_binding("GAMEPAD_RIGHT_TRIGGER_PRESS", None);
        let mut state = GamepadState::default();
        state.set_axis(GamepadAxis::RightTrigger, 0.7);
        assert_eq!(binding.on_gamepad_buttons(&state, &ctx(&keys, 0.0)), Some(true));
    }

    #[test]
    fn test_hold_poll_fires_once() {
        let keys = HashSet::new();
        let mut binding = button_binding("KEYBOARD_SPACE", Some(Behavior::hold(1.0)));

        assert_eq!(
            binding.on_key(&key(KeyCode::Space, RawAction::Press), &ctx(&keys, 0.0)),
            None
        );
        assert_eq!(binding.poll_behavior(0.5), None);
        assert_eq!(binding.poll_behavior(1.1), Some(true));
        assert_eq!(binding.poll_behavior(1.5), None);
    }

    #[test]
    fn test_inert_binding_never_fires() {
        let keys = HashSet::new();
        let mut binding = button_binding("JOYSTICK_TRIGGER", None);
        assert!(binding.is_inert());
        assert_eq!(
            binding.on_key(&key(KeyCode::Space, RawAction::Press), &ctx(&keys, 0.0)),
            None
        );
        assert_eq!(binding.poll_behavior(1.0), None);
    }

    #[test]
    fn test_slot_kind_and_forwarding() {
        let keys = HashSet::new();
        let mut slot = BindingSlot::new(
            ValueKind::Trigger,
            "KEYBOARD_F",
            Mapping::parse("KEYBOARD_F"),
            ActionId(3),
            None,
            Vec::new(),
        );
        assert_eq!(slot.kind(), ValueKind::Trigger);
        assert_eq!(slot.action(), ActionId(3));
        assert_eq!(slot.origin(), HardwareOrigin::Keyboard);
        assert_eq!(
            slot.on_key(&key(KeyCode::KeyF, RawAction::Press), &ctx(&keys, 0.0)),
            Some(ActionValue::Trigger(1.0))
        );
    }
}
