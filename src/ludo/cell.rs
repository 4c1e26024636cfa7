use std::fmt;

use crate::ludo::{Color, PieceId};

/// A square of the 15x15 board grid, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    pub const fn new(row: u8, col: u8) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell-{}-{}", self.row, self.col)
    }
}

/// Where a piece is drawn. Pieces at home sit on their own yard circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Yard(PieceId),
    Cell(Cell),
}

impl Location {
    pub fn cell(&self) -> Option<Cell> {
        match self {
            Location::Yard(_) => None,
            Location::Cell(cell) => Some(*cell),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Yard(piece) => write!(f, "home-{}", piece),
            Location::Cell(cell) => write!(f, "{}", cell),
        }
    }
}

/// Top-left cell of the 6x6 yard a color's pieces wait in.
pub fn yard_origin(color: Color) -> Cell {
    match color {
        Color::Red => Cell::new(1, 1),
        Color::Green => Cell::new(1, 10),
        Color::Blue => Cell::new(10, 10),
        Color::Yellow => Cell::new(10, 1),
    }
}
