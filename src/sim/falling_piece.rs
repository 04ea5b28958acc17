//! Falling-piece puzzle simulation
//!
//! A piece descends one row per tick and locks when it cannot move further.
//! Horizontal moves, rotation and soft drop are applied the moment the key
//! arrives; invalid moves are silently ignored.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::Simulation;
use super::collision::cell_in_bounds;
use super::input::Key;
use super::tetromino::{PieceKind, Shape};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
/// Points per cleared row
pub const POINTS_PER_ROW: u64 = 100;

/// Where new pieces appear
pub const SPAWN_POS: IVec2 = IVec2::new(BOARD_WIDTH as i32 / 2 - 1, 0);

/// Empty, or locked with the color of the piece that filled it
pub type Cell = Option<PieceKind>;
pub type Row = [Cell; BOARD_WIDTH];

const EMPTY_ROW: Row = [None; BOARD_WIDTH];

/// Grid of locked cells, `rows[0]` is the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [Row; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            rows: [EMPTY_ROW; BOARD_HEIGHT],
        }
    }
}

impl Board {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Cell at (col, row), `None` when off the board
    pub fn get(&self, cell: IVec2) -> Option<Cell> {
        if !cell_in_bounds(cell, BOARD_WIDTH as i32, BOARD_HEIGHT as i32) {
            return None;
        }
        Some(self.rows[cell.y as usize][cell.x as usize])
    }

    /// Overwrite a cell; off-board writes are ignored
    pub fn set(&mut self, cell: IVec2, value: Cell) {
        if cell_in_bounds(cell, BOARD_WIDTH as i32, BOARD_HEIGHT as i32) {
            self.rows[cell.y as usize][cell.x as usize] = value;
        }
    }

    /// True if any occupied cell of `shape` anchored at `pos` is off the
    /// board or lands on a locked cell
    pub fn collides(&self, shape: &Shape, pos: IVec2) -> bool {
        shape
            .occupied()
            .any(|offset| !matches!(self.get(pos + offset), Some(None)))
    }

    /// Write the piece's cells into the board
    pub fn lock(&mut self, shape: &Shape, pos: IVec2, kind: PieceKind) {
        for offset in shape.occupied() {
            self.set(pos + offset, Some(kind));
        }
    }

    /// Remove fully occupied rows and prepend the same number of empty rows.
    /// Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let kept: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| row.iter().any(Option::is_none))
            .copied()
            .collect();
        let cleared = BOARD_HEIGHT - kept.len();
        if cleared > 0 {
            let mut rows = [EMPTY_ROW; BOARD_HEIGHT];
            rows[cleared..].copy_from_slice(&kept);
            self.rows = rows;
        }
        cleared
    }

    pub fn top_row_occupied(&self) -> bool {
        self.rows[0].iter().any(Option::is_some)
    }

    pub fn occupied_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }
}

/// The piece under player control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: Shape,
    /// Top-left anchor in board coordinates (col, row)
    pub pos: IVec2,
}

impl ActivePiece {
    /// Absolute board cells covered by the piece
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.shape.occupied().map(move |offset| self.pos + offset)
    }
}

/// Things that happened during a tick or key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FallingPieceEvent {
    Spawned(PieceKind),
    Locked,
    LinesCleared(usize),
    GameOver,
}

/// Active piece as the renderer sees it
#[derive(Debug, Clone, Serialize)]
pub struct ActivePieceSnapshot {
    pub kind: PieceKind,
    pub color: &'static str,
    pub cells: Vec<IVec2>,
}

/// Renderable state. Board cells hold a CSS color or `null`.
#[derive(Debug, Clone, Serialize)]
pub struct FallingPieceSnapshot {
    pub width: usize,
    pub height: usize,
    pub board: Vec<Vec<Option<&'static str>>>,
    pub active_piece: Option<ActivePieceSnapshot>,
    pub score: u64,
    pub game_over: bool,
}

/// Falling-block puzzle
#[derive(Debug, Clone)]
pub struct FallingPieceSimulation {
    pub board: Board,
    pub active: Option<ActivePiece>,
    pub score: u64,
    pub game_over: bool,
    rng: Pcg32,
    events: Vec<FallingPieceEvent>,
}

impl FallingPieceSimulation {
    /// Empty board with a first piece already spawned
    pub fn new(seed: u64) -> Self {
        let mut sim = Self {
            board: Board::default(),
            active: None,
            score: 0,
            game_over: false,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        sim.spawn_piece();
        sim
    }

    /// Spawn a uniformly random piece
    pub fn spawn_piece(&mut self) {
        let kind = PieceKind::random(&mut self.rng);
        self.spawn_kind(kind);
    }

    /// Spawn `kind` at the top center, replacing any active piece.
    /// A piece with no room to appear locks where it stands and ends the game.
    pub fn spawn_kind(&mut self, kind: PieceKind) {
        let shape = kind.shape();
        if self.board.collides(&shape, SPAWN_POS) {
            self.active = None;
            // Every shape occupies its own top row, so this always reaches row 0
            self.board.lock(&shape, SPAWN_POS, kind);
            self.events.push(FallingPieceEvent::Locked);
            debug_assert!(self.board.top_row_occupied());
            self.finish("blocked spawn");
            return;
        }
        self.active = Some(ActivePiece {
            kind,
            shape,
            pos: SPAWN_POS,
        });
        self.events.push(FallingPieceEvent::Spawned(kind));
    }

    /// Descend one row, or lock in place if the row below is blocked
    pub fn soft_drop(&mut self) {
        if self.game_over {
            return;
        }
        let Some(piece) = &mut self.active else {
            return;
        };
        let candidate = piece.pos + IVec2::Y;
        if self.board.collides(&piece.shape, candidate) {
            self.lock_active();
        } else {
            piece.pos = candidate;
        }
    }

    /// Shift left (`-1`) or right (`1`) if the target is free
    pub fn move_horizontal(&mut self, dx: i32) {
        if self.game_over {
            return;
        }
        if let Some(piece) = &mut self.active {
            let candidate = piece.pos + IVec2::new(dx, 0);
            if !self.board.collides(&piece.shape, candidate) {
                piece.pos = candidate;
            }
        }
    }

    /// Quarter turn clockwise in place, no wall kicks
    pub fn rotate(&mut self) {
        if self.game_over {
            return;
        }
        if let Some(piece) = &mut self.active {
            let rotated = piece.shape.rotated();
            if !self.board.collides(&rotated, piece.pos) {
                piece.shape = rotated;
            }
        }
    }

    /// Clear everything and start over with a fresh piece
    pub fn reset(&mut self) {
        self.board = Board::default();
        self.active = None;
        self.score = 0;
        self.game_over = false;
        log::info!("Falling-piece reset");
        self.spawn_piece();
    }

    fn lock_active(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };
        self.board.lock(&piece.shape, piece.pos, piece.kind);
        self.events.push(FallingPieceEvent::Locked);

        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            self.score += POINTS_PER_ROW * cleared as u64;
            self.events.push(FallingPieceEvent::LinesCleared(cleared));
            log::debug!("Cleared {} rows, score {}", cleared, self.score);
        }

        if self.board.top_row_occupied() {
            self.finish("stack reached the top row");
        } else {
            self.spawn_piece();
        }
    }

    fn finish(&mut self, reason: &str) {
        self.game_over = true;
        self.events.push(FallingPieceEvent::GameOver);
        log::info!("Falling-piece game over ({}), score {}", reason, self.score);
    }
}

impl Simulation for FallingPieceSimulation {
    type Snapshot = FallingPieceSnapshot;
    type Event = FallingPieceEvent;

    fn tick(&mut self) {
        self.soft_drop();
    }

    fn handle_key_down(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => self.move_horizontal(-1),
            Key::ArrowRight => self.move_horizontal(1),
            Key::ArrowDown => self.soft_drop(),
            Key::ArrowUp => self.rotate(),
        }
    }

    fn handle_key_up(&mut self, _key: Key) {}

    fn snapshot(&self) -> FallingPieceSnapshot {
        FallingPieceSnapshot {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            board: self
                .board
                .rows()
                .iter()
                .map(|row| row.iter().map(|cell| cell.map(|kind| kind.color())).collect())
                .collect(),
            active_piece: self.active.as_ref().map(|piece| ActivePieceSnapshot {
                kind: piece.kind,
                color: piece.kind.color(),
                cells: piece.cells().collect(),
            }),
            score: self.score,
            game_over: self.game_over,
        }
    }

    fn is_over(&self) -> bool {
        self.game_over
    }

    fn take_events(&mut self) -> Vec<FallingPieceEvent> {
        std::mem::take(&mut self.events)
    }
}
