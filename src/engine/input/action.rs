// Actions: named, typed endpoints that gameplay code listens to

use super::value::{ActionValue, Axis2, Button, HardwareOrigin, InputValue, Trigger, ValueKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Index of an action in the input manager's action table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub usize);

/// Opaque, stable identity of a listener's owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

static NEXT_SUBSCRIBER: AtomicU64 = AtomicU64::new(1);

impl SubscriberId {
    /// Hand out a process-unique id
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIBER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber#{}", self.0)
    }
}

/// Callback invoked with an action's latest value and where it came from
pub type Listener<T> = Box<dyn FnMut(T, HardwareOrigin)>;

/// A named action carrying values of kind `T`
pub struct Action<T: InputValue> {
    name: String,
    action_set: String,
    last_value: T,
    last_hardware: HardwareOrigin,
    listeners: HashMap<SubscriberId, Listener<T>>,
}

impl<T: InputValue> Action<T> {
    pub fn new(name: impl Into<String>, action_set: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_set: action_set.into(),
            last_value: T::default(),
            last_hardware: HardwareOrigin::default(),
            listeners: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the action set this action was declared in
    pub fn action_set(&self) -> &str {
        &self.action_set
    }

    pub fn last_value(&self) -> T {
        self.last_value
    }

    pub fn last_hardware(&self) -> HardwareOrigin {
        self.last_hardware
    }

    /// Store a new value. Dispatch is scheduled by the input manager.
    pub(crate) fn set_value(&mut self, value: T, hardware: HardwareOrigin) {
        self.last_value = value;
        self.last_hardware = hardware;
    }

    /// Invoke every listener with the stored value. Order is unspecified.
    pub(crate) fn execute(&mut self) {
        let value = self.last_value;
        let hardware = self.last_hardware;
        for listener in self.listeners.values_mut() {
            listener(value, hardware);
        }
    }

    /// Register a listener; an existing one for `subscriber` is replaced
    pub fn add_listener(&mut self, subscriber: SubscriberId, listener: Listener<T>) {
        if self.listeners.insert(subscriber, listener).is_some() {
            log::debug!(
                "Replaced listener for {} on action '{}'",
                subscriber,
                self.name
            );
        }
    }

    /// Remove a listener. Unknown subscribers are a no-op.
    /// Returns true if one was removed.
    pub fn remove_listener(&mut self, subscriber: SubscriberId) -> bool {
        self.listeners.remove(&subscriber).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: InputValue> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("action_set", &self.action_set)
            .field("last_value", &self.last_value)
            .field("last_hardware", &self.last_hardware)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// An action of any kind, tagged with its declared kind
#[derive(Debug)]
pub enum ActionSlot {
    Axes(Action<Axis2>),
    Button(Action<Button>),
    Trigger(Action<Trigger>),
}

impl ActionSlot {
    pub fn new(kind: ValueKind, name: &str, action_set: &str) -> Self {
        match kind {
            ValueKind::Axes => ActionSlot::Axes(Action::new(name, action_set)),
            ValueKind::Button => ActionSlot::Button(Action::new(name, action_set)),
            ValueKind::Trigger => ActionSlot::Trigger(Action::new(name, action_set)),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ActionSlot::Axes(_) => ValueKind::Axes,
            ActionSlot::Button(_) => ValueKind::Button,
            ActionSlot::Trigger(_) => ValueKind::Trigger,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ActionSlot::Axes(action) => action.name(),
            ActionSlot::Button(action) => action.name(),
            ActionSlot::Trigger(action) => action.name(),
        }
    }

    pub fn action_set(&self) -> &str {
        match self {
            ActionSlot::Axes(action) => action.action_set(),
            ActionSlot::Button(action) => action.action_set(),
            ActionSlot::Trigger(action) => action.action_set(),
        }
    }

    /// Last value in tagged form
    pub fn last_value(&self) -> ActionValue {
        match self {
            ActionSlot::Axes(action) => ActionValue::Axes(action.last_value()),
            ActionSlot::Button(action) => ActionValue::Button(action.last_value()),
            ActionSlot::Trigger(action) => ActionValue::Trigger(action.last_value()),
        }
    }

    pub fn last_hardware(&self) -> HardwareOrigin {
        match self {
            ActionSlot::Axes(action) => action.last_hardware(),
            ActionSlot::Button(action) => action.last_hardware(),
            ActionSlot::Trigger(action) => action.last_hardware(),
        }
    }

    /// Store a tagged value; returns false if its kind does not match
    pub(crate) fn set_value(&mut self, value: ActionValue, hardware: HardwareOrigin) -> bool {
        match (self, value) {
            (ActionSlot::Axes(action), ActionValue::Axes(v)) => action.set_value(v, hardware),
            (ActionSlot::Button(action), ActionValue::Button(v)) => action.set_value(v, hardware),
            (ActionSlot::Trigger(action), ActionValue::Trigger(v)) => {
                action.set_value(v, hardware)
            }
            _ => return false,
        }
        true
    }

    pub(crate) fn execute(&mut self) {
        match self {
            ActionSlot::Axes(action) => action.execute(),
            ActionSlot::Button(action) => action.execute(),
            ActionSlot::Trigger(action) => action.execute(),
        }
    }

    /// Remove a listener whatever the action's kind
    pub fn remove_listener(&mut self, subscriber: SubscriberId) -> bool {
        match self {
            ActionSlot::Axes(action) => action.remove_listener(subscriber),
            ActionSlot::Button(action) => action.remove_listener(subscriber),
            ActionSlot::Trigger(action) => action.remove_listener(subscriber),
        }
    }

    pub fn listener_count(&self) -> usize {
        match self {
            ActionSlot::Axes(action) => action.listener_count(),
            ActionSlot::Button(action) => action.listener_count(),
            ActionSlot::Trigger(action) => action.listener_count(),
        }
    }
}

/// Typed access into an `ActionSlot`, checked against the slot's tag
pub trait SlotAccess: InputValue {
    fn action_mut(slot: &mut ActionSlot) -> Option<&mut Action<Self>>;
}

impl SlotAccess for Axis2 {
    fn action_mut(slot: &mut ActionSlot) -> Option<&mut Action<Self>> {
        match slot {
            ActionSlot::Axes(action) => Some(action),
            _ => None,
        }
    }
}

impl SlotAccess for Button {
    fn action_mut(slot: &mut ActionSlot) -> Option<&mut Action<Self>> {
        match slot {
            ActionSlot::Button(action) => Some(action),
            _ => None,
        }
    }
}

impl SlotAccess for Trigger {
    fn action_mut(slot: &mut ActionSlot) -> Option<&mut Action<Self>> {
        match slot {
            ActionSlot::Trigger(action) => Some(action),
            _ => None,
        }
    }
}
