use crate::ludo::{Cell, Color, GeometryError};

pub const TRACK_LEN: usize = 52;
pub const HOME_STRETCH_LEN: usize = 6;
pub const PATH_LEN: usize = 58;
pub const FINISH_INDEX: u8 = (PATH_LEN - 1) as u8;
/// First path index of a color's private approach. Captures only happen below it.
pub const HOME_STRETCH_START: u8 = 51;

const fn c(row: u8, col: u8) -> Cell {
    Cell::new(row, col)
}

/// The shared ring, clockwise, starting at red's entry.
pub const COMMON_TRACK: [Cell; TRACK_LEN] = [
    c(7, 1), c(7, 2), c(7, 3), c(7, 4), c(7, 5), c(7, 6),
    c(6, 7), c(5, 7), c(4, 7), c(3, 7), c(2, 7), c(1, 7), c(1, 8),
    c(1, 9), c(2, 9), c(3, 9), c(4, 9), c(5, 9), c(6, 9),
    c(7, 10), c(7, 11), c(7, 12), c(7, 13), c(7, 14), c(7, 15), c(8, 15),
    c(9, 15), c(9, 14), c(9, 13), c(9, 12), c(9, 11), c(9, 10),
    c(10, 9), c(11, 9), c(12, 9), c(13, 9), c(14, 9), c(15, 9), c(15, 8),
    c(15, 7), c(14, 7), c(13, 7), c(12, 7), c(11, 7), c(10, 7),
    c(9, 6), c(9, 5), c(9, 4), c(9, 3), c(9, 2), c(9, 1), c(8, 1),
];

pub const SAFE_CELLS: [Cell; 8] = [
    c(7, 2), c(3, 7), c(2, 9), c(7, 13), c(9, 14), c(13, 9), c(14, 7), c(9, 3),
];

/// Static board tables. Validated once when the paths are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub track: Vec<Cell>,
    pub entries: [Cell; 4],
    pub turn_offs: [Cell; 4],
    pub home_stretches: [Vec<Cell>; 4],
    pub safe_cells: Vec<Cell>,
}

impl Geometry {
    /// The classic 15x15 board.
    pub fn standard() -> Self {
        let mut entries = [c(0, 0); 4];
        let mut turn_offs = [c(0, 0); 4];
        let mut home_stretches: [Vec<Cell>; 4] = Default::default();

        for color in Color::ALL {
            let (entry, turn_off, stretch) = match color {
                Color::Red => (
                    c(7, 1),
                    c(8, 1),
                    vec![c(8, 2), c(8, 3), c(8, 4), c(8, 5), c(8, 6), c(8, 7)],
                ),
                Color::Green => (
                    c(1, 9),
                    c(1, 8),
                    vec![c(2, 8), c(3, 8), c(4, 8), c(5, 8), c(6, 8), c(7, 8)],
                ),
                Color::Blue => (
                    c(9, 15),
                    c(8, 15),
                    vec![c(8, 14), c(8, 13), c(8, 12), c(8, 11), c(8, 10), c(8, 9)],
                ),
                Color::Yellow => (
                    c(15, 7),
                    c(15, 8),
                    vec![c(14, 8), c(13, 8), c(12, 8), c(11, 8), c(10, 8), c(9, 8)],
                ),
            };
            entries[color.index()] = entry;
            turn_offs[color.index()] = turn_off;
            home_stretches[color.index()] = stretch;
        }

        Geometry {
            track: COMMON_TRACK.to_vec(),
            entries,
            turn_offs,
            home_stretches,
            safe_cells: SAFE_CELLS.to_vec(),
        }
    }

    pub fn entry(&self, color: Color) -> Cell {
        self.entries[color.index()]
    }

    pub fn turn_off(&self, color: Color) -> Cell {
        self.turn_offs[color.index()]
    }

    pub fn home_stretch(&self, color: Color) -> &[Cell] {
        &self.home_stretches[color.index()]
    }

    pub fn finish_cell(&self, color: Color) -> Option<Cell> {
        self.home_stretch(color).last().copied()
    }

    pub fn track_index(&self, cell: Cell) -> Option<usize> {
        self.track.iter().position(|&t| t == cell)
    }

    /// Checks everything that can be checked without walking the paths.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.track.len() != TRACK_LEN {
            return Err(GeometryError::TrackLength(self.track.len()));
        }
        for (i, cell) in self.track.iter().enumerate() {
            if self.track[..i].contains(cell) {
                return Err(GeometryError::DuplicateTrackCell(*cell));
            }
        }
        for color in Color::ALL {
            let entry = self.entry(color);
            if self.track_index(entry).is_none() {
                return Err(GeometryError::MissingEntry { color, cell: entry });
            }
            let turn_off = self.turn_off(color);
            if self.track_index(turn_off).is_none() {
                return Err(GeometryError::MissingTurnOff { color, cell: turn_off });
            }
            let len = self.home_stretch(color).len();
            if len != HOME_STRETCH_LEN {
                return Err(GeometryError::HomeStretchLength { color, len });
            }
        }
        for &safe in self.safe_cells.iter() {
            if Color::ALL.iter().any(|&color| self.finish_cell(color) == Some(safe)) {
                return Err(GeometryError::SafeCellOnFinish(safe));
            }
            if self.track_index(safe).is_none() {
                return Err(GeometryError::SafeCellOffTrack(safe));
            }
        }
        Ok(())
    }
}
