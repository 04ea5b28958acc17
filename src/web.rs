//! Browser bindings
//!
//! The page's window manager creates one `GameWindow` per open game window,
//! calls `start()` when it mounts, renders `snapshot_json()` every animation
//! frame, and calls `free()` (or `stop()`) when the window closes.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{KeyboardEvent, Window};

use crate::host::{GameKind, MountedGame};
use crate::settings::Settings;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {err}").into());
    }
    log::info!("Retro Arcade loaded");
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// Window keyboard listeners plus the tick timer
struct Listeners {
    key_down: Closure<dyn FnMut(KeyboardEvent)>,
    key_up: Closure<dyn FnMut(KeyboardEvent)>,
    timer: Closure<dyn FnMut()>,
    interval_id: Option<i32>,
}

impl Listeners {
    fn new(game: &Rc<RefCell<MountedGame>>) -> Self {
        let key_down = {
            let game = game.clone();
            Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                // Keep arrow keys from scrolling the desktop behind the game
                if game.borrow_mut().handle_key_down(&event.key()) {
                    event.prevent_default();
                }
            })
        };
        let key_up = {
            let game = game.clone();
            Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().handle_key_up(&event.key());
            })
        };
        let timer = {
            let game = game.clone();
            Closure::<dyn FnMut()>::new(move || {
                game.borrow_mut().advance(js_sys::Date::now());
            })
        };
        Self {
            key_down,
            key_up,
            timer,
            interval_id: None,
        }
    }

    fn attach(&mut self, window: &Window, tick_interval_ms: f64) -> Result<(), JsValue> {
        window.add_event_listener_with_callback("keydown", self.key_down.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("keyup", self.key_up.as_ref().unchecked_ref())?;
        let timeout = tick_interval_ms.round().max(1.0) as i32;
        let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
            self.timer.as_ref().unchecked_ref(),
            timeout,
        )?;
        self.interval_id = Some(id);
        Ok(())
    }

    /// Safe on a partially attached set
    fn detach(&mut self, window: &Window) {
        if let Some(id) = self.interval_id.take() {
            window.clear_interval_with_handle(id);
        }
        for (event, callback) in [("keydown", &self.key_down), ("keyup", &self.key_up)] {
            if let Err(err) =
                window.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove {} listener: {:?}", event, err);
            }
        }
    }
}

/// A game hosted in one desktop window
#[wasm_bindgen]
pub struct GameWindow {
    game: Rc<RefCell<MountedGame>>,
    listeners: Option<Listeners>,
}

#[wasm_bindgen]
impl GameWindow {
    /// `kind` is a game id (`paddle-ball`, `grid-snake`, `falling-piece`, or
    /// `pong`/`snake`/`tetris`); `settings_json` is an optional `Settings` object
    #[wasm_bindgen(constructor)]
    pub fn new(kind: &str, settings_json: Option<String>) -> Result<GameWindow, JsValue> {
        let kind = GameKind::from_str(kind).ok_or_else(|| js_error(format!("unknown game: {kind}")))?;
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json).map_err(js_error)?,
            None => Settings::default(),
        };
        let seed = js_sys::Date::now() as u64;
        Ok(Self {
            game: Rc::new(RefCell::new(MountedGame::mount(kind, &settings, seed))),
            listeners: None,
        })
    }

    /// Attach keyboard listeners and start the tick timer. Calling it again
    /// while started does nothing.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.listeners.is_some() {
            return Ok(());
        }
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let interval = self.game.borrow().tick_interval_ms();
        let listeners = self.listeners.insert(Listeners::new(&self.game));
        if let Err(err) = listeners.attach(&window, interval) {
            log::warn!("Failed to attach game window: {:?}", err);
            self.stop();
            return Err(err);
        }
        self.game.borrow_mut().start();
        Ok(())
    }

    /// Detach listeners and clear the timer. The last state stays readable.
    pub fn stop(&mut self) {
        if let Some(mut listeners) = self.listeners.take() {
            match web_sys::window() {
                Some(window) => listeners.detach(&window),
                None => log::warn!("No window while stopping game"),
            }
        }
        self.game.borrow_mut().stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.game.borrow().is_running()
    }

    #[wasm_bindgen(js_name = isOver)]
    pub fn is_over(&self) -> bool {
        self.game.borrow().is_over()
    }

    pub fn kind(&self) -> String {
        self.game.borrow().kind().as_str().to_string()
    }

    /// For hosts that drive the clock from their own animation loop
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        self.game.borrow_mut().advance(now_ms)
    }

    /// For hosts that forward keys from their own global listener
    #[wasm_bindgen(js_name = handleKeyDown)]
    pub fn handle_key_down(&mut self, key: &str) -> bool {
        self.game.borrow_mut().handle_key_down(key)
    }

    #[wasm_bindgen(js_name = handleKeyUp)]
    pub fn handle_key_up(&mut self, key: &str) -> bool {
        self.game.borrow_mut().handle_key_up(key)
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.game.borrow().snapshot_json().map_err(js_error)
    }

    #[wasm_bindgen(js_name = takeEventsJson)]
    pub fn take_events_json(&mut self) -> Result<String, JsValue> {
        self.game.borrow_mut().take_events_json().map_err(js_error)
    }

    /// Restart button on the game-over overlay
    pub fn restart(&mut self) {
        let seed = js_sys::Date::now() as u64;
        self.game.borrow_mut().restart(seed);
    }
}

impl Drop for GameWindow {
    fn drop(&mut self) {
        self.stop();
    }
}
