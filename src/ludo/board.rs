use hashbrown::{HashMap, HashSet};

use crate::{
    ludo::{
        Cell, Color, Geometry, GeometryError, Location, Paths, PieceId, Position,
        PositionCompressed, FINISH_INDEX, HOME_STRETCH_START, PIECES_PER_COLOR, yard_origin,
    },
    misc::TinyVec,
};

/// Every piece of every color could share a cell in theory.
pub type CellPieces = TinyVec<PieceId, 16>;

/// Positions of all pieces plus the indexes derived from them.
/// Only [`Board::set_piece_position`] mutates it, which keeps the
/// occupancy index and finish counts in sync with the piece table.
#[derive(Debug, Clone)]
pub struct Board {
    paths: Paths,
    safe: HashSet<Cell>,
    in_play: [bool; 4],
    pieces: [PositionCompressed; 16],
    occupancy: HashMap<Cell, CellPieces>,
    finished: [u8; 4],
}

impl Board {
    /// Standard geometry with the given colors in play, all pieces at home.
    pub fn new(colors: &[Color]) -> Result<Self, GeometryError> {
        Self::with_geometry(&Geometry::standard(), colors)
    }

    pub fn with_geometry(geometry: &Geometry, colors: &[Color]) -> Result<Self, GeometryError> {
        let paths = Paths::build(geometry)?;
        let mut in_play = [false; 4];
        for color in colors {
            in_play[color.index()] = true;
        }
        Ok(Board {
            paths,
            safe: geometry.safe_cells.iter().copied().collect(),
            in_play,
            pieces: [PositionCompressed::HOME; 16],
            occupancy: HashMap::new(),
            finished: [0; 4],
        })
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn is_safe(&self, cell: Cell) -> bool {
        self.safe.contains(&cell)
    }

    pub fn in_play(&self, color: Color) -> bool {
        self.in_play[color.index()]
    }

    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL.into_iter().filter(|&c| self.in_play(c))
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = PieceId> {
        PieceId::all_of(color)
    }

    pub fn all_pieces(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.colors().flat_map(PieceId::all_of)
    }

    pub fn position(&self, piece: PieceId) -> Position {
        self.pieces[piece.index()].into()
    }

    /// The board cell a piece stands on. Home pieces have none.
    pub fn cell_of(&self, piece: PieceId) -> Option<Cell> {
        match self.position(piece) {
            Position::Home => None,
            Position::OnPath(index) => Some(self.paths.cell(piece.color(), index)),
            Position::Finished => Some(self.paths.finish_cell(piece.color())),
        }
    }

    pub fn location(&self, piece: PieceId) -> Location {
        match self.cell_of(piece) {
            Some(cell) => Location::Cell(cell),
            None => Location::Yard(piece),
        }
    }

    /// Pieces standing on the path at `cell`. Finished pieces are not indexed.
    pub fn pieces_at(&self, cell: Cell) -> CellPieces {
        self.occupancy.get(&cell).copied().unwrap_or_default()
    }

    pub fn opponents_at(&self, cell: Cell, color: Color) -> CellPieces {
        self.pieces_at(cell)
            .iter()
            .copied()
            .filter(|p| p.color() != color)
            .collect()
    }

    /// Opponents of `color` that a piece landing on `cell` would send home.
    /// Safe cells protect everyone. A piece at its own index 51 or beyond is
    /// in its private approach and can never be captured.
    pub fn capturable_at(&self, cell: Cell, color: Color) -> CellPieces {
        if self.is_safe(cell) {
            return CellPieces::new();
        }
        self.opponents_at(cell, color)
            .iter()
            .copied()
            .filter(|&p| {
                self.position(p)
                    .path_index()
                    .is_some_and(|index| index < HOME_STRETCH_START)
            })
            .collect()
    }

    pub fn finished_count(&self, color: Color) -> u8 {
        self.finished[color.index()]
    }

    pub fn has_finished(&self, color: Color) -> bool {
        self.finished_count(color) == PIECES_PER_COLOR
    }

    /// Sum of path progress, used to rank colors that did not finish.
    pub fn progress(&self, color: Color) -> i32 {
        self.pieces(color)
            .map(|p| self.position(p).progress() as i32 + 1)
            .sum()
    }

    /// Pieces of `color` that can use `die`. Home pieces need a six, path
    /// pieces must not overshoot the finish.
    pub fn legal_moves(&self, color: Color, die: u8) -> TinyVec<PieceId, 4> {
        let mut legal = TinyVec::new();
        if !self.in_play(color) {
            return legal;
        }
        for piece in self.pieces(color) {
            let movable = match self.position(piece) {
                Position::Home => die == 6,
                Position::OnPath(index) => index.checked_add(die).is_some_and(|to| to <= FINISH_INDEX),
                Position::Finished => false,
            };
            if movable {
                legal.push(piece);
            }
        }
        legal
    }

    /// Where `piece` would land with `die`, if it can move at all.
    pub fn destination(&self, piece: PieceId, die: u8) -> Option<Position> {
        match self.position(piece) {
            Position::Home if die == 6 => Some(Position::OnPath(0)),
            Position::OnPath(index) => match index.checked_add(die)? {
                FINISH_INDEX => Some(Position::Finished),
                to if to < FINISH_INDEX => Some(Position::OnPath(to)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns true if a move landing on path `index` of `color` would capture
    /// anything there.
    pub fn would_capture(&self, color: Color, index: u8) -> bool {
        if index >= HOME_STRETCH_START {
            return false;
        }
        let cell = self.paths.cell(color, index);
        !self.capturable_at(cell, color).is_empty()
    }

    /// The single mutator. Keeps the occupancy index and finish counts
    /// consistent. Illegal transitions are programming errors and panic.
    pub fn set_piece_position(&mut self, piece: PieceId, position: Position) {
        let color = piece.color();
        assert!(self.in_play(color), "{} is not in play", color);
        let previous = self.position(piece);
        assert!(previous != Position::Finished, "{} has already finished", piece);
        if let Position::OnPath(index) = position {
            assert!(index < FINISH_INDEX, "Path index {} out of range for {}", index, piece);
        }

        if let Position::OnPath(index) = previous {
            let cell = self.paths.cell(color, index);
            if let Some(list) = self.occupancy.get_mut(&cell) {
                list.remove(&piece);
                if list.is_empty() {
                    self.occupancy.remove(&cell);
                }
            }
        }

        match position {
            Position::OnPath(index) => {
                let cell = self.paths.cell(color, index);
                self.occupancy.entry(cell).or_default().push(piece);
            }
            Position::Finished => self.finished[color.index()] += 1,
            Position::Home => {}
        }

        self.pieces[piece.index()] = position.into();
    }

    /// Board as text, one character per grid cell. Pieces are shown by color
    /// letter, stacks by their count.
    pub fn to_fancy_string(&self) -> String {
        let mut grid = [[' '; 15]; 15];
        let mut put = |cell: Cell, ch: char| {
            grid[cell.row as usize - 1][cell.col as usize - 1] = ch;
        };

        for color in Color::ALL {
            let path = self.paths.full_path(color);
            for cell in &path[..HOME_STRETCH_START as usize] {
                put(*cell, if self.is_safe(*cell) { '*' } else { '.' });
            }
            for cell in &path[HOME_STRETCH_START as usize + 1..] {
                put(*cell, color.letter().to_ascii_lowercase());
            }
            put(path[HOME_STRETCH_START as usize], '.');
        }

        for (cell, pieces) in self.occupancy.iter() {
            let ch = match pieces.len() {
                1 => pieces.first().map_or('?', |p| p.color().letter()),
                n => char::from_digit(n as u32, 10).unwrap_or('+'),
            };
            put(*cell, ch);
        }

        for color in self.colors() {
            let origin = yard_origin(color);
            let at_home = self
                .pieces(color)
                .filter(|&p| self.position(p) == Position::Home)
                .count();
            put(
                Cell::new(origin.row + 2, origin.col + 2),
                char::from_digit(at_home as u32, 10).unwrap_or('?'),
            );
            put(Cell::new(origin.row + 2, origin.col + 3), color.letter());
        }

        let mut out = String::new();
        for row in grid.iter() {
            out.extend(row.iter());
            out.push('\n');
        }
        for color in self.colors() {
            out.push_str(&format!("{}: {} finished  ", color, self.finished_count(color)));
        }
        out
    }
}
