use anyhow::Result;
use log::info;
use rusted_input::engine::input::{
    apply_cursor_mode, CursorMode, InputManager, InputSettings, SubscriberId, TickFlow,
};
use std::cell::Cell;
use std::rc::Rc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

const DEFAULT_ACTIONS: &str = include_str!("../config/input.ini");
const ENGINE_CONFIG: &str = include_str!("../config/engine.toml");

/// Action set the demo should switch to after the current tick
type PendingSwitch = Rc<Cell<Option<&'static str>>>;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Rusted Input demo...");

    let settings = InputSettings::from_toml_str(ENGINE_CONFIG)?;
    let mut input = InputManager::from_settings(&settings);

    #[cfg(feature = "gamepad")]
    match rusted_input::engine::input::GilrsGamepads::new() {
        Ok(pads) => input.set_gamepad_source(Box::new(pads)),
        Err(e) => log::warn!("{}. Gamepads will not be available.", e),
    }

    // An action file given on the command line replaces the built-in one
    let report = match std::env::args().nth(1) {
        Some(path) => input.load_action_config_file(path)?,
        None => input.load_action_config(DEFAULT_ACTIONS),
    };
    if !report.is_clean() {
        log::warn!("Action config loaded with {} warnings", report.warnings.len());
    }

    let pending_switch: PendingSwitch = Rc::new(Cell::new(None));
    register_listeners(&mut input, &pending_switch)?;

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Rusted Input")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    apply_cursor_mode(&window, input.cursor_mode());
    info!("Window created successfully");

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent { event, .. } => {
                input.process_window_event(&event);
            }
            Event::AboutToWait => {
                if input.tick() == TickFlow::Stop {
                    info!("Quit requested, shutting down...");
                    elwt.exit();
                    return;
                }

                if let Some(set) = pending_switch.take() {
                    if input.set_active_action_set(set).is_ok() {
                        let mode = if set == "Menu" {
                            CursorMode::Normal
                        } else {
                            CursorMode::Disabled
                        };
                        input.set_cursor_mode(mode);
                        apply_cursor_mode(&window, mode);
                    }
                }
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}

/// Log every demo action and wire pause, resume and quit
fn register_listeners(input: &mut InputManager, pending_switch: &PendingSwitch) -> Result<()> {
    let id = SubscriberId::next();

    for action in ["move", "look"] {
        input.add_axes_listener("Gameplay", action, id, move |value, origin| {
            info!("{} {:?} from {}", action, value, origin);
        })?;
    }
    for action in ["jump", "charge", "dash"] {
        input.add_button_listener("Gameplay", action, id, move |pressed, origin| {
            info!("{} {} from {}", action, pressed, origin);
        })?;
    }
    input.add_trigger_listener("Gameplay", "throttle", id, |value, origin| {
        info!("throttle {:.2} from {}", value, origin);
    })?;

    input.add_axes_listener("Menu", "navigate", id, |value, _| {
        info!("navigate {:?}", value);
    })?;
    input.add_button_listener("Menu", "confirm", id, |_, _| info!("confirm"))?;

    let switch = Rc::clone(pending_switch);
    input.add_button_listener("Gameplay", "pause", id, move |_, _| {
        switch.set(Some("Menu"));
    })?;
    let switch = Rc::clone(pending_switch);
    input.add_button_listener("Menu", "resume", id, move |_, _| {
        switch.set(Some("Gameplay"));
    })?;

    let stop = input.stop_handle();
    input.add_button_listener("Menu", "quit", id, move |_, _| stop.request())?;

    Ok(())
}
