//! Retro Arcade - the three games of a retro desktop portfolio
//!
//! Core modules:
//! - `sim`: Deterministic simulations (paddle-ball, grid-snake, falling-piece)
//! - `host`: Lifecycle, fixed-step clock and input queue for a mounted game
//! - `settings`: Host timing configuration
//! - `web`: Browser bindings (wasm32 only)

pub mod host;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use host::{GameKind, GameRunner, MountedGame};
pub use settings::Settings;
pub use sim::{
    FallingPieceSimulation, GridSnakeSimulation, Key, PaddleBallSimulation, Simulation,
};

/// Timing constants shared by every game window
pub mod consts {
    /// Paddle-ball tick interval (60 Hz for smooth motion)
    pub const PADDLE_BALL_TICK_MS: f64 = 1000.0 / 60.0;
    /// Grid-snake tick interval
    pub const GRID_SNAKE_TICK_MS: f64 = 200.0;
    /// Falling-piece descent interval (input is applied immediately, outside this clock)
    pub const FALLING_PIECE_TICK_MS: f64 = 1000.0;

    /// Maximum ticks run per `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap fed into the accumulator (tab switches, debugger pauses)
    pub const MAX_FRAME_MS: f64 = 250.0;
    /// Undrained events kept per window; older ones are dropped first
    pub const MAX_PENDING_EVENTS: usize = 256;
}
