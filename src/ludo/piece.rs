use std::{fmt, num::NonZeroU8};

use crate::ludo::{Color, FINISH_INDEX};

pub const PIECES_PER_COLOR: u8 = 4;

/// A piece is named by its color and its slot number (1..=4).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId {
    color: Color,
    slot: u8,
}

impl PieceId {
    pub fn new(color: Color, slot: u8) -> Self {
        assert!((1..=PIECES_PER_COLOR).contains(&slot), "Invalid piece slot {}", slot);
        PieceId { color, slot }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Dense index over all 16 pieces.
    pub fn index(&self) -> usize {
        self.color.index() * PIECES_PER_COLOR as usize + (self.slot - 1) as usize
    }

    pub fn all_of(color: Color) -> impl Iterator<Item = PieceId> {
        (1..=PIECES_PER_COLOR).map(move |slot| PieceId { color, slot })
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.color, self.slot)
    }
}

impl fmt::Debug for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Home,
    OnPath(u8),
    Finished,
}

impl Position {
    pub fn path_index(&self) -> Option<u8> {
        match self {
            Position::OnPath(index) => Some(*index),
            _ => None,
        }
    }

    /// Path index with home counted as one step before the entry cell.
    pub fn progress(&self) -> i16 {
        match self {
            Position::Home => -1,
            Position::OnPath(index) => *index as i16,
            Position::Finished => FINISH_INDEX as i16,
        }
    }
}

/// One byte per piece for the board table.
/// 1 = home, 2 = finished, index + 3 = on the path.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionCompressed {
    data: NonZeroU8,
}

impl PositionCompressed {
    pub const HOME: Self = PositionCompressed { data: NonZeroU8::MIN };

    pub const FINISHED: Self = PositionCompressed { data: NonZeroU8::MIN.saturating_add(1) };

    /// Creates a position on the path from an index (0-56).
    pub const fn from_index(index: u8) -> Self {
        PositionCompressed { data: NonZeroU8::MIN.saturating_add(index + 2) }
    }

    pub fn get(&self) -> u8 {
        self.data.get()
    }
}

impl From<Position> for PositionCompressed {
    fn from(pos: Position) -> Self {
        match pos {
            Position::Home => PositionCompressed::HOME,
            Position::Finished => PositionCompressed::FINISHED,
            Position::OnPath(index) => PositionCompressed::from_index(index),
        }
    }
}

impl From<PositionCompressed> for Position {
    fn from(compressed: PositionCompressed) -> Self {
        match compressed.data.get() {
            1 => Position::Home,
            2 => Position::Finished,
            n => Position::OnPath(n - 3),
        }
    }
}

impl fmt::Debug for PositionCompressed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", Position::from(*self))
    }
}
