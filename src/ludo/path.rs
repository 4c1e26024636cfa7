use crate::ludo::{Cell, Color, Geometry, GeometryError, FINISH_INDEX, HOME_STRETCH_START, PATH_LEN};

/// The full path of every color: entry cell, once around the ring up to the
/// turn-off cell, then the home stretch. Built once, never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paths {
    full: [[Cell; PATH_LEN]; 4],
}

impl Paths {
    pub fn build(geometry: &Geometry) -> Result<Paths, GeometryError> {
        geometry.validate()?;

        let mut full = [[Cell::new(0, 0); PATH_LEN]; 4];
        for color in Color::ALL {
            let path = build_full_path(geometry, color)?;
            full[color.index()].copy_from_slice(&path);
        }
        Ok(Paths { full })
    }

    pub fn full_path(&self, color: Color) -> &[Cell; PATH_LEN] {
        &self.full[color.index()]
    }

    pub fn cell(&self, color: Color, index: u8) -> Cell {
        self.full[color.index()][index as usize]
    }

    pub fn entry_cell(&self, color: Color) -> Cell {
        self.cell(color, 0)
    }

    pub fn finish_cell(&self, color: Color) -> Cell {
        self.cell(color, FINISH_INDEX)
    }

    /// Path index of `cell` for `color`, if the color ever passes over it.
    pub fn index_of(&self, color: Color, cell: Cell) -> Option<u8> {
        self.full[color.index()]
            .iter()
            .position(|&c| c == cell)
            .map(|i| i as u8)
    }

    /// Cells stepped on when moving from `from` (exclusive) to `to` (inclusive).
    /// `None` as start means the piece leaves home.
    pub fn steps(&self, color: Color, from: Option<u8>, to: u8) -> &[Cell] {
        let start = from.map_or(0, |i| i as usize + 1);
        let end = (to as usize + 1).min(PATH_LEN);
        &self.full[color.index()][start.min(end)..end]
    }

    pub fn is_private(index: u8) -> bool {
        index >= HOME_STRETCH_START
    }
}

/// Walks the ring from the entry cell to the turn-off cell, wrapping, then
/// appends the home stretch.
pub fn build_full_path(geometry: &Geometry, color: Color) -> Result<Vec<Cell>, GeometryError> {
    let entry = geometry.entry(color);
    let turn_off = geometry.turn_off(color);
    let start = geometry
        .track_index(entry)
        .ok_or(GeometryError::MissingEntry { color, cell: entry })?;

    let track = &geometry.track;
    let mut path = Vec::with_capacity(PATH_LEN);
    let mut reached_turn_off = false;
    for step in 0..track.len() {
        let cell = track[(start + step) % track.len()];
        path.push(cell);
        if cell == turn_off {
            reached_turn_off = true;
            break;
        }
    }
    if !reached_turn_off {
        return Err(GeometryError::MissingTurnOff { color, cell: turn_off });
    }

    path.extend_from_slice(geometry.home_stretch(color));

    if path.len() != PATH_LEN {
        return Err(GeometryError::PathLength { color, len: path.len() });
    }
    Ok(path)
}
