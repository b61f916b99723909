// Input manager - owns action sets, bindings and the per-frame dispatch
//
// Raw events go to every binding subscribed to their channel. Bindings that
// fire write into their action and mark it active. `tick()` runs once per
// frame: it polls time-driven behaviors and gamepads, then invokes the
// listeners of every active action exactly once.

use super::action::{ActionId, ActionSlot, SlotAccess, SubscriberId};
use super::action_set::ActionSet;
use super::binding::{BindingContext, BindingId, BindingSlot};
use super::clock::{Clock, SystemClock};
use super::config::{parse_sections, ConfigVisitor, CursorMode, InputSettings};
use super::gamepad::GamepadSource;
use super::grammar::parse_action_line;
use super::raw::{
    CursorInput, GamepadConnection, GamepadId, KeyInput, MouseButtonInput, RawAction,
    RawChannel, RawEvent, ScrollInput,
};
use super::value::{ActionValue, Axis2, Button, HardwareOrigin, Trigger};
use super::InputError;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use winit::event::WindowEvent;
use winit::keyboard::KeyCode;

/// What the host loop should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Lets listeners ask the host loop to stop after the current tick
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn request(&self) {
        self.0.set(true);
    }
}

/// Outcome of loading an action configuration
#[derive(Debug, Default)]
pub struct LoadReport {
    pub action_sets: usize,
    pub actions: usize,
    pub bindings: usize,
    /// Problems that were skipped or defaulted
    pub warnings: Vec<InputError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Log a rejected call and hand the error back
fn reject<T>(err: InputError) -> Result<T, InputError> {
    log::warn!("{}", err);
    Err(err)
}

/// Main input manager coordinating bindings, actions and dispatch
pub struct InputManager {
    enabled: bool,
    cursor_mode: CursorMode,
    clock: Box<dyn Clock>,
    gamepads: Option<Box<dyn GamepadSource>>,
    connected_gamepads: BTreeSet<GamepadId>,

    /// Bindings are declared before actions and dropped first
    bindings: Vec<Option<BindingSlot>>,
    subscriptions: HashMap<RawChannel, BTreeSet<BindingId>>,

    actions: Vec<ActionSlot>,
    /// Action names are unique across all sets
    action_names: HashMap<String, ActionId>,
    action_sets: HashMap<String, ActionSet>,
    active_set: Option<String>,

    /// Actions to dispatch on the next drain
    active_actions: BTreeSet<ActionId>,
    pressed_keys: HashSet<KeyCode>,
    stop: StopHandle,
}

impl InputManager {
    /// Create an enabled manager with no actions, timed by the system clock
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            enabled: true,
            cursor_mode: CursorMode::default(),
            clock,
            gamepads: None,
            connected_gamepads: BTreeSet::new(),
            bindings: Vec::new(),
            subscriptions: HashMap::new(),
            actions: Vec::new(),
            action_names: HashMap::new(),
            action_sets: HashMap::new(),
            active_set: None,
            active_actions: BTreeSet::new(),
            pressed_keys: HashSet::new(),
            stop: StopHandle::default(),
        }
    }

    /// Create a manager configured from engine settings
    pub fn from_settings(settings: &InputSettings) -> Self {
        let mut manager = Self::new();
        manager.enabled = settings.enabled;
        manager.cursor_mode = settings.cursor_mode;
        manager
    }

    /// Set the source polled for gamepad state each tick
    pub fn set_gamepad_source(&mut self, source: Box<dyn GamepadSource>) {
        self.gamepads = Some(source);
    }

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable all input. Disabling discards actions already
    /// marked active this frame. Mouse deltas restart from the first cursor
    /// event after the switch.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.active_actions.clear();
        }
        if self.enabled != enabled {
            log::info!("Input {}", if enabled { "enabled" } else { "disabled" });
            // Cursor motion is not seen while disabled
            for binding in self.bindings.iter_mut().flatten() {
                binding.forget_motion();
            }
        }
        self.enabled = enabled;
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    /// Record the cursor mode. The host applies it to its window with
    /// `apply_cursor_mode`.
    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        log::debug!("Cursor mode set to {}", mode);
        self.cursor_mode = mode;
    }

    pub fn active_action_set(&self) -> Option<&str> {
        self.active_set.as_deref()
    }

    /// Names of all loaded action sets, sorted
    pub fn action_set_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.action_sets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn action_set(&self, name: &str) -> Option<&ActionSet> {
        self.action_sets.get(name)
    }

    /// Switch the active action set. Pending dispatches of the old set are
    /// discarded. Unknown names leave the current set in place.
    pub fn set_active_action_set(&mut self, name: &str) -> Result<(), InputError> {
        if !self.action_sets.contains_key(name) {
            return reject(InputError::UnknownActionSet(name.to_string()));
        }
        self.active_actions.clear();
        self.active_set = Some(name.to_string());
        log::info!("Active action set: {}", name);
        Ok(())
    }

    /// Queue an action of the active set for dispatch with its last value
    pub fn mark_active_action(&mut self, name: &str) -> Result<(), InputError> {
        if !self.enabled {
            return reject(InputError::Disabled);
        }
        let Some(set_name) = self.active_set.as_deref() else {
            return reject(InputError::NoActiveActionSet);
        };
        let id = self
            .action_sets
            .get(set_name)
            .and_then(|set| set.get(name));
        match id {
            Some(id) => {
                self.active_actions.insert(id);
                Ok(())
            }
            None => reject(InputError::UnknownAction {
                action_set: set_name.to_string(),
                action: name.to_string(),
            }),
        }
    }

    /// Handle that listeners can keep to stop the host loop
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Make the next tick return `TickFlow::Stop`
    pub fn request_stop(&self) {
        self.stop.request();
    }

    /// Last value of an action, tagged with its kind
    pub fn action_value(&self, action_set: &str, action: &str) -> Result<ActionValue, InputError> {
        let id = self.find_action(action_set, action)?;
        self.actions
            .get(id.0)
            .map(ActionSlot::last_value)
            .ok_or_else(|| InputError::UnknownAction {
                action_set: action_set.to_string(),
                action: action.to_string(),
            })
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.iter().flatten().count()
    }

    /// Number of bindings subscribed to a raw channel
    pub fn subscription_count(&self, channel: RawChannel) -> usize {
        self.subscriptions.get(&channel).map_or(0, BTreeSet::len)
    }

    pub fn connected_gamepads(&self) -> impl Iterator<Item = GamepadId> + '_ {
        self.connected_gamepads.iter().copied()
    }

    /// Number of actions waiting for the next drain
    pub fn pending_actions(&self) -> usize {
        self.active_actions.len()
    }

    // ---------------------------------------------------------------------
    // Listeners
    // ---------------------------------------------------------------------

    fn find_action(&self, action_set: &str, action: &str) -> Result<ActionId, InputError> {
        let set = self
            .action_sets
            .get(action_set)
            .ok_or_else(|| InputError::UnknownActionSet(action_set.to_string()))?;
        set.get(action).ok_or_else(|| InputError::UnknownAction {
            action_set: action_set.to_string(),
            action: action.to_string(),
        })
    }

    /// Register a listener on an action of kind `T`. The action's declared
    /// kind must match.
    pub fn add_listener<T, F>(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
        listener: F,
    ) -> Result<(), InputError>
    where
        T: SlotAccess,
        F: FnMut(T, HardwareOrigin) + 'static,
    {
        let id = match self.find_action(action_set, action) {
            Ok(id) => id,
            Err(e) => return reject(e),
        };
        let Some(slot) = self.actions.get_mut(id.0) else {
            return reject(InputError::UnknownAction {
                action_set: action_set.to_string(),
                action: action.to_string(),
            });
        };

        let actual = slot.kind();
        match T::action_mut(slot) {
            Some(typed) => {
                typed.add_listener(subscriber, Box::new(listener));
                log::debug!("{} listens to {}.{}", subscriber, action_set, action);
                Ok(())
            }
            None => reject(InputError::KindMismatch {
                action: action.to_string(),
                expected: T::KIND,
                actual,
            }),
        }
    }

    pub fn add_axes_listener(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
        listener: impl FnMut(Axis2, HardwareOrigin) + 'static,
    ) -> Result<(), InputError> {
        self.add_listener::<Axis2, _>(action_set, action, subscriber, listener)
    }

    pub fn add_button_listener(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
        listener: impl FnMut(Button, HardwareOrigin) + 'static,
    ) -> Result<(), InputError> {
        self.add_listener::<Button, _>(action_set, action, subscriber, listener)
    }

    pub fn add_trigger_listener(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
        listener: impl FnMut(Trigger, HardwareOrigin) + 'static,
    ) -> Result<(), InputError> {
        self.add_listener::<Trigger, _>(action_set, action, subscriber, listener)
    }

    /// Remove a listener whatever the action's kind. Returns whether one was
    /// registered; unknown subscribers are not an error.
    pub fn remove_listener(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
    ) -> Result<bool, InputError> {
        let id = match self.find_action(action_set, action) {
            Ok(id) => id,
            Err(e) => return reject(e),
        };
        Ok(self
            .actions
            .get_mut(id.0)
            .is_some_and(|slot| slot.remove_listener(subscriber)))
    }

    fn remove_typed_listener<T: SlotAccess>(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
    ) -> Result<bool, InputError> {
        let id = match self.find_action(action_set, action) {
            Ok(id) => id,
            Err(e) => return reject(e),
        };
        let Some(slot) = self.actions.get_mut(id.0) else {
            return Ok(false);
        };
        let actual = slot.kind();
        match T::action_mut(slot) {
            Some(typed) => Ok(typed.remove_listener(subscriber)),
            None => reject(InputError::KindMismatch {
                action: action.to_string(),
                expected: T::KIND,
                actual,
            }),
        }
    }

    pub fn remove_axes_listener(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
    ) -> Result<bool, InputError> {
        self.remove_typed_listener::<Axis2>(action_set, action, subscriber)
    }

    pub fn remove_button_listener(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
    ) -> Result<bool, InputError> {
        self.remove_typed_listener::<Button>(action_set, action, subscriber)
    }

    pub fn remove_trigger_listener(
        &mut self,
        action_set: &str,
        action: &str,
        subscriber: SubscriberId,
    ) -> Result<bool, InputError> {
        self.remove_typed_listener::<Trigger>(action_set, action, subscriber)
    }

    // ---------------------------------------------------------------------
    // Raw events
    // ---------------------------------------------------------------------

    /// Process a winit window event. Non-input events are ignored.
    pub fn process_window_event(&mut self, event: &WindowEvent) {
        if let Some(raw) = RawEvent::from_window_event(event) {
            self.handle_raw_event(raw);
        }
    }

    pub fn handle_raw_event(&mut self, event: RawEvent) {
        match event {
            RawEvent::Key(key) => self.handle_key(key),
            RawEvent::Cursor(cursor) => self.handle_cursor(cursor),
            RawEvent::MouseButton(button) => self.handle_mouse_button(button),
            RawEvent::Scroll(scroll) => self.handle_scroll(scroll),
        }
    }

    pub fn handle_key(&mut self, event: KeyInput) {
        // Key state is tracked even while disabled so composites are
        // correct once input comes back
        match event.action {
            RawAction::Press => {
                self.pressed_keys.insert(event.key);
            }
            RawAction::Release => {
                self.pressed_keys.remove(&event.key);
            }
            RawAction::Repeat => {}
        }
        self.dispatch(RawChannel::Key, |binding, ctx| binding.on_key(&event, ctx));
    }

    pub fn handle_cursor(&mut self, event: CursorInput) {
        self.dispatch(RawChannel::Cursor, |binding, ctx| {
            binding.on_cursor(&event, ctx)
        });
    }

    pub fn handle_mouse_button(&mut self, event: MouseButtonInput) {
        self.dispatch(RawChannel::MouseButton, |binding, ctx| {
            binding.on_mouse_button(&event, ctx)
        });
    }

    pub fn handle_scroll(&mut self, event: ScrollInput) {
        self.dispatch(RawChannel::Scroll, |binding, ctx| {
            binding.on_scroll(&event, ctx)
        });
    }

    /// Track a gamepad being plugged in or removed
    pub fn handle_gamepad_connection(&mut self, event: GamepadConnection) {
        if event.connected {
            if self.connected_gamepads.insert(event.id) {
                log::info!("Gamepad {} connected", event.id);
            }
        } else if self.connected_gamepads.remove(&event.id) {
            log::info!("Gamepad {} disconnected", event.id);
        }
    }

    /// Run `handler` on every binding subscribed to `channel` and forward
    /// whatever fires
    fn dispatch<F>(&mut self, channel: RawChannel, mut handler: F)
    where
        F: FnMut(&mut BindingSlot, &BindingContext<'_>) -> Option<ActionValue>,
    {
        if !self.enabled {
            return;
        }
        let Some(ids) = self.subscriptions.get(&channel) else {
            return;
        };

        let ctx = BindingContext {
            now: self.clock.now(),
            pressed_keys: &self.pressed_keys,
        };

        let mut fired = Vec::new();
        for id in ids {
            if let Some(Some(binding)) = self.bindings.get_mut(id.0) {
                if let Some(value) = handler(binding, &ctx) {
                    fired.push((binding.action(), value, binding.origin()));
                }
            }
        }

        for (action, value, origin) in fired {
            self.forward(action, value, origin);
        }
    }

    /// Store a fired value in its action and mark it active. Actions outside
    /// the active set keep their previous value.
    fn forward(&mut self, id: ActionId, value: ActionValue, origin: HardwareOrigin) {
        if !self.enabled {
            return;
        }
        let Some(slot) = self.actions.get_mut(id.0) else {
            return;
        };
        if self.active_set.as_deref() != Some(slot.action_set()) {
            log::trace!("'{}' fired outside the active set", slot.name());
            return;
        }
        if !slot.set_value(value, origin) {
            log::warn!(
                "Dropped {} value for {} action '{}'",
                value.kind(),
                slot.kind(),
                slot.name()
            );
            return;
        }
        self.active_actions.insert(id);
    }

    // ---------------------------------------------------------------------
    // Per-frame
    // ---------------------------------------------------------------------

    /// Run one frame of input.
    ///
    /// Time-driven behaviors and gamepads are polled, then every active
    /// action is dispatched once with its latest value. Actions touched only
    /// by keyboard and mouse go first; an action also written by a gamepad
    /// this frame carries the gamepad's value. Accumulators are reset last.
    pub fn tick(&mut self) -> TickFlow {
        if !self.enabled {
            return TickFlow::Continue;
        }

        self.poll_held_behaviors();
        let event_driven = std::mem::take(&mut self.active_actions);

        self.poll_gamepads();
        let polled = std::mem::take(&mut self.active_actions);

        let first: Vec<ActionId> = event_driven.difference(&polled).copied().collect();
        self.execute(first);
        self.execute(polled);

        for binding in self.bindings.iter_mut().flatten() {
            binding.reset_accumulators();
        }

        if self.stop.0.replace(false) {
            TickFlow::Stop
        } else {
            TickFlow::Continue
        }
    }

    fn execute(&mut self, ids: impl IntoIterator<Item = ActionId>) {
        for id in ids {
            if let Some(slot) = self.actions.get_mut(id.0) {
                slot.execute();
            }
        }
    }

    /// Keyboard and mouse stay silent while held, so hold behaviors on them
    /// are re-checked here with the binding's last value
    fn poll_held_behaviors(&mut self) {
        let now = self.clock.now();
        let mut fired = Vec::new();
        for binding in self.bindings.iter_mut().flatten() {
            if let Some(value) = binding.poll_behavior(now) {
                fired.push((binding.action(), value, binding.origin()));
            }
        }
        for (action, value, origin) in fired {
            self.forward(action, value, origin);
        }
    }

    fn poll_gamepads(&mut self) {
        let changes = match self.gamepads.as_mut() {
            Some(source) => source.pump(),
            None => return,
        };
        for change in changes {
            self.handle_gamepad_connection(change);
        }

        // Bindings keep one gesture state, so every pad feeds a single
        // merged snapshot
        let Some(source) = self.gamepads.as_ref() else {
            return;
        };
        let merged = self
            .connected_gamepads
            .iter()
            .filter_map(|id| source.snapshot(*id))
            .reduce(|merged, state| merged.merge(&state));
        let Some(state) = merged else {
            return;
        };

        self.dispatch(RawChannel::GamepadAxes, |binding, ctx| {
            binding.on_gamepad_axes(&state, ctx)
        });
        self.dispatch(RawChannel::GamepadButtons, |binding, ctx| {
            binding.on_gamepad_buttons(&state, ctx)
        });
    }

    // ---------------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------------

    /// Subscribe a binding to its mapping's raw channel
    pub fn subscribe(&mut self, id: BindingId) -> Result<(), InputError> {
        let Some(Some(binding)) = self.bindings.get(id.0) else {
            return reject(InputError::NotSubscribed(format!("binding #{}", id.0)));
        };
        let Some(channel) = binding.mapping().channel() else {
            log::debug!("Binding '{}' has no channel to subscribe to", binding.name());
            return Ok(());
        };
        if !self.subscriptions.entry(channel).or_default().insert(id) {
            return reject(InputError::AlreadySubscribed(binding.name().to_string()));
        }
        Ok(())
    }

    /// Remove a binding from its channel. Unsubscribing twice is reported
    /// but harmless.
    pub fn unsubscribe(&mut self, id: BindingId) -> Result<(), InputError> {
        let name = match self.bindings.get(id.0) {
            Some(Some(binding)) => binding.name().to_string(),
            _ => format!("binding #{}", id.0),
        };
        let removed = self
            .subscriptions
            .values_mut()
            .fold(false, |removed, ids| ids.remove(&id) || removed);
        if removed {
            Ok(())
        } else {
            reject(InputError::NotSubscribed(name))
        }
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Load action sets from sectioned config text.
    ///
    /// Bad lines are skipped and reported; the rest of the file still loads.
    /// The first section becomes the active set if none is active yet.
    pub fn load_action_config(&mut self, text: &str) -> LoadReport {
        let mut loader = ConfigLoader {
            manager: self,
            report: LoadReport::default(),
            first_section: None,
        };
        let malformed = parse_sections(text, &mut loader);
        let ConfigLoader {
            mut report,
            first_section,
            ..
        } = loader;
        report.warnings.extend(malformed);

        if self.active_set.is_none() {
            if let Some(first) = first_section {
                // The section was created by the loader, so this cannot fail
                let _ = self.set_active_action_set(&first);
            }
        }

        for warning in &report.warnings {
            log::warn!("Input config: {}", warning);
        }
        log::info!(
            "Loaded {} action sets, {} actions, {} bindings ({} warnings)",
            report.action_sets,
            report.actions,
            report.bindings,
            report.warnings.len()
        );
        report
    }

    pub fn load_action_config_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<LoadReport, InputError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => return reject(e.into()),
        };
        log::info!("Loading input config from {}", path.display());
        Ok(self.load_action_config(&text))
    }

    fn declare_action(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
        report: &mut LoadReport,
    ) {
        let decl = match parse_action_line(key, value, &mut report.warnings) {
            Ok(decl) => decl,
            Err(e) => {
                report.warnings.push(e);
                return;
            }
        };

        if self.action_names.contains_key(&decl.name) {
            report
                .warnings
                .push(InputError::DuplicateAction(decl.name.clone()));
            return;
        }

        let action_id = ActionId(self.actions.len());
        self.actions
            .push(ActionSlot::new(decl.kind, &decl.name, section));
        self.action_names.insert(decl.name.clone(), action_id);
        self.action_sets
            .entry(section.to_string())
            .or_insert_with(|| ActionSet::new(section))
            .insert(decl.name.clone(), action_id);
        report.actions += 1;

        for spec in decl.bindings {
            let behavior = spec.modifiers.behavior.as_ref().map(|b| b.fresh_copy());
            let binding_id = BindingId(self.bindings.len());
            self.bindings.push(Some(BindingSlot::new(
                decl.kind,
                spec.text,
                spec.mapping,
                action_id,
                behavior,
                spec.modifiers.processors,
            )));
            // Freshly pushed ids are never subscribed yet
            let _ = self.subscribe(binding_id);
            report.bindings += 1;
        }

        log::debug!("Declared {} action '{}' in {}", decl.kind, decl.name, section);
    }

    /// Drop every binding, action and action set. Bindings leave their
    /// channels before anything else is torn down.
    pub fn clear(&mut self) {
        for index in 0..self.bindings.len() {
            if self.subscriptions.values().any(|ids| ids.contains(&BindingId(index))) {
                let _ = self.unsubscribe(BindingId(index));
            }
        }
        self.bindings.clear();
        self.subscriptions.clear();
        self.active_actions.clear();
        self.action_sets.clear();
        self.action_names.clear();
        self.actions.clear();
        self.active_set = None;
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputManager {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Builds action sets from config sections as they are visited
struct ConfigLoader<'a> {
    manager: &'a mut InputManager,
    report: LoadReport,
    first_section: Option<String>,
}

impl ConfigVisitor for ConfigLoader<'_> {
    fn visit_section(&mut self, name: &str) {
        if self.first_section.is_none() {
            self.first_section = Some(name.to_string());
        }
        if !self.manager.action_sets.contains_key(name) {
            self.manager
                .action_sets
                .insert(name.to_string(), ActionSet::new(name));
            self.report.action_sets += 1;
        }
    }

    fn visit_entry(&mut self, section: Option<&str>, key: &str, value: &str) {
        match section {
            Some(section) => self
                .manager
                .declare_action(section, key, value, &mut self.report),
            None => self.report.warnings.push(InputError::Settings(format!(
                "'{}' is outside of any action set section",
                key
            ))),
        }
    }
}
