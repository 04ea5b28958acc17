//! Retro Arcade entry point
//!
//! The browser build is driven through `web::GameWindow`. Natively this runs
//! a headless demo on a simulated 60 fps clock with scripted key presses and
//! prints each game's final snapshot as JSON.
//!
//! Usage: `retro-arcade [game] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use retro_arcade::{GameKind, Settings};

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let kinds = match args.first() {
        Some(name) => match GameKind::from_str(name) {
            Some(kind) => vec![kind],
            None => {
                let known: Vec<_> = GameKind::ALL.iter().map(GameKind::as_str).collect();
                eprintln!("Unknown game '{}', expected one of: {}", name, known.join(", "));
                std::process::exit(2);
            }
        },
        None => GameKind::ALL.to_vec(),
    };
    let seconds = args
        .get(1)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(30.0);

    let settings = Settings::default();
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    log::info!("Retro Arcade (native) demo, {}s per game", seconds);
    for kind in kinds {
        run_demo(kind, &settings, seed, seconds);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}

/// Frames between scripted key presses
#[cfg(not(target_arch = "wasm32"))]
const PRESS_EVERY: u64 = 45;
/// Frames a scripted key stays held
#[cfg(not(target_arch = "wasm32"))]
const HOLD_FOR: u64 = 20;

#[cfg(not(target_arch = "wasm32"))]
fn run_demo(kind: retro_arcade::GameKind, settings: &retro_arcade::Settings, seed: u64, seconds: f64) {
    use retro_arcade::{Key, MountedGame};

    let mut game = MountedGame::mount(kind, settings, seed);
    game.start();

    let frame_ms = 1000.0 / 60.0;
    let frames = (seconds * 1000.0 / frame_ms) as u64;
    let mut ticks = 0u64;
    for frame in 0..=frames {
        let key = Key::ALL[(frame / PRESS_EVERY) as usize % Key::ALL.len()];
        match frame % PRESS_EVERY {
            0 => {
                game.handle_key_down(key.as_str());
            }
            HOLD_FOR => {
                game.handle_key_up(key.as_str());
            }
            _ => {}
        }
        ticks += u64::from(game.advance(frame as f64 * frame_ms));
        if game.is_over() {
            log::info!("{} ended after {} ticks", kind.as_str(), ticks);
            break;
        }
    }
    game.stop();

    match game.snapshot_json() {
        Ok(json) => println!("{}: {}", kind.as_str(), json),
        Err(err) => log::error!("Failed to serialize {} snapshot: {}", kind.as_str(), err),
    }
}
