//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One discrete step per `tick`, no wall-clock time
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod falling_piece;
pub mod grid_snake;
pub mod input;
pub mod paddle_ball;
pub mod tetromino;

pub use collision::{Side, ball_paddle_contact, cell_in_bounds, reflect_velocity, spans_overlap};
pub use falling_piece::{
    ActivePiece, BOARD_HEIGHT, BOARD_WIDTH, Board, FallingPieceEvent, FallingPieceSimulation,
    FallingPieceSnapshot,
};
pub use grid_snake::{GRID_SIZE, GridSnakeEvent, GridSnakeSimulation, GridSnakeSnapshot};
pub use input::{Direction, HeldKeys, Key};
pub use paddle_ball::{PaddleBallEvent, PaddleBallSimulation, PaddleBallSnapshot, Scores};
pub use tetromino::{PieceKind, Shape};

use serde::Serialize;

/// A game a host window can mount and drive.
///
/// Ticks and key events are delivered one at a time by a single owner; an
/// implementation never sees them concurrently.
pub trait Simulation {
    /// Read-only renderable state
    type Snapshot: Serialize + std::fmt::Debug;
    /// Domain event emitted by `tick` or input handling
    type Event: Serialize + std::fmt::Debug;

    /// Advance by one fixed step
    fn tick(&mut self);

    fn handle_key_down(&mut self, key: Key);

    fn handle_key_up(&mut self, key: Key);

    /// Forget any keys still held, e.g. when the window stops listening
    fn release_all_keys(&mut self) {}

    fn snapshot(&self) -> Self::Snapshot;

    /// Whether the game reached a terminal state
    fn is_over(&self) -> bool;

    /// Drain events recorded since the last call
    fn take_events(&mut self) -> Vec<Self::Event>;
}
