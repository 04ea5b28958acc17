//! The seven fixed tetromino shapes

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tetromino identity. Doubles as the color tag of locked board cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    Z,
    S,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::Z,
        PieceKind::S,
    ];

    /// CSS color name used by the page renderer
    pub fn color(&self) -> &'static str {
        match self {
            PieceKind::I => "cyan",
            PieceKind::O => "yellow",
            PieceKind::T => "purple",
            PieceKind::L => "orange",
            PieceKind::J => "blue",
            PieceKind::Z => "red",
            PieceKind::S => "green",
        }
    }

    /// Spawn orientation
    pub fn shape(&self) -> Shape {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[1, 1, 1, 1]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::T => &[&[1, 1, 1], &[0, 1, 0]],
            PieceKind::L => &[&[1, 1, 1], &[1, 0, 0]],
            PieceKind::J => &[&[1, 1, 1], &[0, 0, 1]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0]],
        };
        Shape::from_rows(rows)
    }

    /// Uniform pick among the seven kinds
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A rectangular occupancy matrix, row-major, `cells[row][col]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    cells: Vec<Vec<bool>>,
}

impl Shape {
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            cells: rows
                .iter()
                .map(|row| row.iter().map(|&v| v != 0).collect())
                .collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.cells
    }

    /// Offsets (col, row) of occupied cells relative to the top-left anchor
    pub fn occupied(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| IVec2::new(x as i32, y as i32))
        })
    }

    /// Quarter turn clockwise: transpose, then reverse each new row.
    ///
    /// Row `i` of the result is column `i` of `self` read bottom to top.
    pub fn rotated(&self) -> Self {
        let height = self.height();
        let cells = (0..self.width())
            .map(|col| (0..height).rev().map(|row| self.cells[row][col]).collect())
            .collect();
        Self { cells }
    }
}
