//! Host timing settings
//!
//! Supplied by the page as JSON when a game window mounts. Gameplay constants
//! are fixed; these only control how the host clock drives the simulations.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::host::GameKind;

/// Host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Paddle-ball tick interval (ms)
    pub paddle_ball_tick_ms: f64,
    /// Grid-snake tick interval (ms)
    pub grid_snake_tick_ms: f64,
    /// Falling-piece descent interval (ms)
    pub falling_piece_tick_ms: f64,
    /// Maximum ticks per `advance`
    pub max_substeps: u32,
    /// Longest frame gap counted toward ticks (ms)
    pub max_frame_ms: f64,
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paddle_ball_tick_ms: PADDLE_BALL_TICK_MS,
            grid_snake_tick_ms: GRID_SNAKE_TICK_MS,
            falling_piece_tick_ms: FALLING_PIECE_TICK_MS,
            max_substeps: MAX_SUBSTEPS,
            max_frame_ms: MAX_FRAME_MS,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> String {
        // Flat struct of numbers, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Tick interval for one kind of game
    pub fn tick_interval_ms(&self, kind: GameKind) -> f64 {
        match kind {
            GameKind::PaddleBall => self.paddle_ball_tick_ms,
            GameKind::GridSnake => self.grid_snake_tick_ms,
            GameKind::FallingPiece => self.falling_piece_tick_ms,
        }
    }

    /// Replace nonsensical timing values with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let valid = |ms: f64| ms.is_finite() && ms > 0.0;
        if !valid(self.paddle_ball_tick_ms) {
            log::warn!("Invalid paddle_ball_tick_ms {}, using default", self.paddle_ball_tick_ms);
            self.paddle_ball_tick_ms = defaults.paddle_ball_tick_ms;
        }
        if !valid(self.grid_snake_tick_ms) {
            log::warn!("Invalid grid_snake_tick_ms {}, using default", self.grid_snake_tick_ms);
            self.grid_snake_tick_ms = defaults.grid_snake_tick_ms;
        }
        if !valid(self.falling_piece_tick_ms) {
            log::warn!("Invalid falling_piece_tick_ms {}, using default", self.falling_piece_tick_ms);
            self.falling_piece_tick_ms = defaults.falling_piece_tick_ms;
        }
        if !valid(self.max_frame_ms) {
            self.max_frame_ms = defaults.max_frame_ms;
        }
        if self.max_substeps == 0 {
            self.max_substeps = defaults.max_substeps;
        }
        self
    }
}
