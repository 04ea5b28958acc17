//! Keyboard input shared by all three games
//!
//! Only the four arrow keys are recognized; everything else is dropped by
//! the host before it reaches a simulation.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A recognized key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::ArrowUp, Key::ArrowDown, Key::ArrowLeft, Key::ArrowRight];

    /// DOM `KeyboardEvent.key` name
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::ArrowUp => "ArrowUp",
            Key::ArrowDown => "ArrowDown",
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowRight => "ArrowRight",
        }
    }

    /// Parse a DOM key name. Names are case-sensitive, as the browser reports them.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            _ => None,
        }
    }

    /// The grid direction this key steers toward
    pub fn direction(&self) -> Direction {
        match self {
            Key::ArrowUp => Direction::Up,
            Key::ArrowDown => Direction::Down,
            Key::ArrowLeft => Direction::Left,
            Key::ArrowRight => Direction::Right,
        }
    }
}

/// Keys currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    bits: u8,
}

impl HeldKeys {
    fn mask(key: Key) -> u8 {
        1 << key as u8
    }

    pub fn press(&mut self, key: Key) {
        self.bits |= Self::mask(key);
    }

    pub fn release(&mut self, key: Key) {
        self.bits &= !Self::mask(key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.bits & Self::mask(key) != 0
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }
}

/// Unit step on the snake grid. Screen coordinates: y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn to_ivec2(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}
