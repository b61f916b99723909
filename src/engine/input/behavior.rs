// Gesture detectors that gate when a binding forwards its value

use super::value::{Directions, InputValue, DEFAULT_PRESS_POINT};
use std::fmt;

pub const DEFAULT_HOLD_TIME: f32 = 0.4;
pub const DEFAULT_MULTIPRESS_COUNT: u32 = 2;
pub const DEFAULT_MULTIPRESS_TIME: f32 = 0.5;

/// Which transitions a press behavior reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PressMode {
    Press,
    Release,
    #[default]
    PressAndRelease,
}

impl PressMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "PRESS" => Some(PressMode::Press),
            "RELEASE" => Some(PressMode::Release),
            "PRESS_AND_RELEASE" => Some(PressMode::PressAndRelease),
            _ => None,
        }
    }
}

/// The gesture a behavior detects, with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorKind {
    /// Fires on press and/or release edges
    Press { mode: PressMode },
    /// Fires once when held continuously for `min_hold_time` seconds
    Hold { min_hold_time: f32 },
    /// Fires when `press_count` presses land within `max_time` seconds
    Multipress { press_count: u32, max_time: f32 },
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorKind::Press { mode } => write!(f, "press({:?})", mode),
            BehaviorKind::Hold { min_hold_time } => write!(f, "hold({}s)", min_hold_time),
            BehaviorKind::Multipress {
                press_count,
                max_time,
            } => write!(f, "multipress({}x in {}s)", press_count, max_time),
        }
    }
}

/// Stateful gesture detector owned by a single binding.
///
/// `check` is handed every processed value the binding sees together with
/// the time of the event. Values are reduced to per-direction pressed state
/// against `press_point`, so a diagonal WASD press tracks up and right
/// independently.
#[derive(Debug, Clone)]
pub struct Behavior {
    kind: BehaviorKind,
    press_point: f32,

    /// Pressed state from the previous check
    last: Directions,

    /// Hold: when the current hold started, and whether it already fired
    hold_started: Option<f64>,
    hold_fired: bool,

    /// Multipress: presses counted in the current window and when it opened
    press_counter: u32,
    window_started: f64,
}

impl Behavior {
    /// Create a behavior with an explicit press point
    pub fn new(kind: BehaviorKind, press_point: f32) -> Self {
        Self {
            kind,
            press_point,
            last: Directions::default(),
            hold_started: None,
            hold_fired: false,
            press_counter: 0,
            window_started: 0.0,
        }
    }

    pub fn press(mode: PressMode) -> Self {
        Self::new(BehaviorKind::Press { mode }, DEFAULT_PRESS_POINT)
    }

    pub fn hold(min_hold_time: f32) -> Self {
        Self::new(BehaviorKind::Hold { min_hold_time }, DEFAULT_PRESS_POINT)
    }

    pub fn multipress(press_count: u32, max_time: f32) -> Self {
        Self::new(
            BehaviorKind::Multipress {
                press_count,
                max_time,
            },
            DEFAULT_PRESS_POINT,
        )
    }

    pub fn kind(&self) -> BehaviorKind {
        self.kind
    }

    pub fn press_point(&self) -> f32 {
        self.press_point
    }

    /// True for behaviors that can fire without a new input event
    pub fn is_time_driven(&self) -> bool {
        matches!(self.kind, BehaviorKind::Hold { .. })
    }

    /// Same parameters, fresh gesture state
    pub fn fresh_copy(&self) -> Self {
        Self::new(self.kind, self.press_point)
    }

    /// Forget any gesture in progress
    pub fn reset(&mut self) {
        self.last = Directions::default();
        self.hold_started = None;
        self.hold_fired = false;
        self.press_counter = 0;
        self.window_started = 0.0;
    }

    /// Feed a new value observed at time `now` (seconds).
    ///
    /// Returns true when the gesture is detected. With
    /// `ignore_last_value_checking` the value is judged as the start of a new
    /// gesture: the previous state is discarded first.
    pub fn check<T: InputValue>(
        &mut self,
        value: T,
        ignore_last_value_checking: bool,
        now: f64,
    ) -> bool {
        if ignore_last_value_checking {
            self.reset();
        }

        let current = value.directions(self.press_point);
        let previous = self.last;
        self.last = current;

        match self.kind {
            BehaviorKind::Press { mode } => {
                Self::check_press(mode, &previous, &current, ignore_last_value_checking)
            }
            BehaviorKind::Hold { min_hold_time } => {
                self.check_hold(min_hold_time, current.any(), now)
            }
            BehaviorKind::Multipress {
                press_count,
                max_time,
            } => self.check_multipress(press_count, max_time, &previous, &current, now),
        }
    }

    fn check_press(
        mode: PressMode,
        previous: &Directions,
        current: &Directions,
        fresh: bool,
    ) -> bool {
        if fresh {
            return match mode {
                PressMode::Press => current.any(),
                PressMode::Release => !current.any(),
                PressMode::PressAndRelease => true,
            };
        }

        let pressed = current.pressed_since(previous);
        let released = current.released_since(previous);
        match mode {
            PressMode::Press => pressed,
            PressMode::Release => released,
            PressMode::PressAndRelease => pressed || released,
        }
    }

    fn check_hold(&mut self, min_hold_time: f32, pressed: bool, now: f64) -> bool {
        if !pressed {
            self.hold_started = None;
            self.hold_fired = false;
            return false;
        }

        let started = *self.hold_started.get_or_insert(now);
        if self.hold_fired {
            return false;
        }

        if now - started >= f64::from(min_hold_time) {
            self.hold_fired = true;
            return true;
        }
        false
    }

    fn check_multipress(
        &mut self,
        press_count: u32,
        max_time: f32,
        previous: &Directions,
        current: &Directions,
        now: f64,
    ) -> bool {
        if !current.pressed_since(previous) {
            return false;
        }

        let window_expired = now - self.window_started > f64::from(max_time);
        if self.press_counter == 0 || window_expired {
            self.press_counter = 0;
            self.window_started = now;
        }
        self.press_counter += 1;

        if self.press_counter >= press_count.max(1) {
            self.press_counter = 0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_press_mode_parse() {
        assert_eq!(PressMode::parse("PRESS"), Some(PressMode::Press));
        assert_eq!(PressMode::parse("release"), Some(PressMode::Release));
        assert_eq!(
            PressMode::parse("PRESS_AND_RELEASE"),
            Some(PressMode::PressAndRelease)
        );
        assert_eq!(PressMode::parse("TAP"), None);
    }

    #[test]
    fn test_press_fires_on_press_edge_only() {
        let mut behavior = Behavior::press(PressMode::Press);
        assert!(behavior.check(true, false, 0.0));
        assert!(!behavior.check(true, false, 0.1));
        assert!(!behavior.check(false, false, 0.2));
        assert!(behavior.check(true, false, 0.3));
    }

    #[test]
    fn test_release_fires_on_release_edge_only() {
        let mut behavior = Behavior::press(PressMode::Release);
        assert!(!behavior.check(true, false, 0.0));
        assert!(behavior.check(false, false, 0.1));
        assert!(!behavior.check(false, false, 0.2));
    }

    #[test]
    fn test_press_and_release_fires_on_every_change() {
        let mut behavior = Behavior::press(PressMode::PressAndRelease);
        let sequence = [true, true, false, false, true, false, true, true];
        let mut last = false;
        for (i, value) in sequence.into_iter().enumerate() {
            let fired = behavior.check(value, false, i as f64 * 0.1);
            assert_eq!(fired, value != last, "step {}", i);
            last = value;
        }
    }

    #[test]
    fn test_press_uses_press_point_for_triggers() {
        let mut behavior = Behavior::new(
            BehaviorKind::Press {
                mode: PressMode::Press,
            },
            0.5,
        );
        assert!(!behavior.check(0.3f32, false, 0.0));
        assert!(behavior.check(0.6f32, false, 0.1));
        assert!(!behavior.check(0.9f32, false, 0.2));
    }

    #[test]
    fn test_press_tracks_diagonal_directions_independently() {
        let mut behavior = Behavior::press(PressMode::Press);
        assert!(behavior.check(Vec2::new(0.0, 1.0), false, 0.0));
        // Adding right while up is still held is a new press
        assert!(behavior.check(Vec2::new(1.0, 1.0), false, 0.1));
        // Dropping up while right stays held is not a press
        assert!(!behavior.check(Vec2::new(1.0, 0.0), false, 0.2));
    }

    #[test]
    fn test_press_ignore_last_value_fires_fresh() {
        let mut behavior = Behavior::press(PressMode::Press);
        assert!(behavior.check(true, false, 0.0));
        assert!(!behavior.check(true, false, 0.1));
        assert!(behavior.check(true, true, 0.2));
    }

    #[test]
    fn test_hold_short_press_never_fires() {
        let mut behavior = Behavior::hold(1.0);
        assert!(!behavior.check(true, false, 0.0));
        assert!(!behavior.check(true, false, 0.5));
        assert!(!behavior.check(false, false, 0.6));
        assert!(!behavior.check(false, false, 2.0));
    }

    #[test]
    fn test_hold_fires_once_per_hold() {
        let mut behavior = Behavior::hold(1.0);
        assert!(!behavior.check(true, false, 0.0));
        assert!(!behavior.check(true, false, 0.9));
        assert!(behavior.check(true, false, 1.0));
        assert!(!behavior.check(true, false, 1.5));
        assert!(!behavior.check(true, false, 3.0));

        // Release resets, a new hold can fire again
        assert!(!behavior.check(false, false, 3.1));
        assert!(!behavior.check(true, false, 4.0));
        assert!(behavior.check(true, false, 5.2));
    }

    #[test]
    fn test_hold_zero_time_fires_on_press() {
        let mut behavior = Behavior::hold(0.0);
        assert!(behavior.check(true, false, 0.0));
        assert!(!behavior.check(true, false, 0.1));
    }

    #[test]
    fn test_hold_ignore_last_value_restarts_timer() {
        let mut behavior = Behavior::hold(1.0);
        assert!(!behavior.check(true, false, 0.0));
        assert!(!behavior.check(true, true, 0.8));
        assert!(!behavior.check(true, false, 1.2));
        assert!(behavior.check(true, false, 1.9));
    }

    #[test]
    fn test_multipress_within_window_fires_once() {
        let mut behavior = Behavior::multipress(2, 0.5);
        assert!(!behavior.check(true, false, 0.0));
        assert!(!behavior.check(false, false, 0.1));
        assert!(behavior.check(true, false, 0.3));
        assert!(!behavior.check(false, false, 0.35));
        // Counter restarted after firing
        assert!(!behavior.check(true, false, 0.4));
    }

    #[test]
    fn test_multipress_window_expiry_resets_counter() {
        let mut behavior = Behavior::multipress(2, 0.5);
        assert!(!behavior.check(true, false, 0.0));
        assert!(!behavior.check(false, false, 0.2));
        assert!(!behavior.check(true, false, 0.7));
        assert!(!behavior.check(false, false, 0.8));
        // Counting restarted at 0.7, so this second press lands in time
        assert!(behavior.check(true, false, 0.9));
    }

    #[test]
    fn test_multipress_triple() {
        let mut behavior = Behavior::multipress(3, 1.0);
        let mut fires = 0;
        for i in 0..6 {
            let t = i as f64 * 0.1;
            if behavior.check(i % 2 == 0, false, t) {
                fires += 1;
            }
        }
        assert_eq!(fires, 1);
    }

    #[test]
    fn test_multipress_ignore_last_value_counts_as_first_press() {
        let mut behavior = Behavior::multipress(2, 0.5);
        assert!(!behavior.check(true, false, 0.0));
        assert!(!behavior.check(false, false, 0.1));
        assert!(!behavior.check(true, true, 0.2));
        assert!(!behavior.check(false, false, 0.3));
        assert!(behavior.check(true, false, 0.4));
    }

    #[test]
    fn test_fresh_copy_drops_state() {
        let mut behavior = Behavior::press(PressMode::Press);
        assert!(behavior.check(true, false, 0.0));
        let mut copy = behavior.fresh_copy();
        assert!(copy.check(true, false, 0.1));
        assert!(!behavior.check(true, false, 0.1));
    }

    #[test]
    fn test_is_time_driven() {
        assert!(Behavior::hold(0.4).is_time_driven());
        assert!(!Behavior::press(PressMode::Press).is_time_driven());
        assert!(!Behavior::multipress(2, 0.5).is_time_driven());
    }
}
