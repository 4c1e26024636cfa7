use thiserror::Error;

use crate::ludo::{Cell, Color, PieceId};

/// Static board tables are inconsistent. The game cannot start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("common track has {0} cells, expected {expected}", expected = crate::ludo::TRACK_LEN)]
    TrackLength(usize),

    #[error("cell {0} appears more than once on the common track")]
    DuplicateTrackCell(Cell),

    #[error("entry cell {cell} of {color} is not on the common track")]
    MissingEntry { color: Color, cell: Cell },

    #[error("turn-off cell {cell} of {color} is not on the common track")]
    MissingTurnOff { color: Color, cell: Cell },

    #[error("home stretch of {color} has {len} cells, expected {expected}", expected = crate::ludo::HOME_STRETCH_LEN)]
    HomeStretchLength { color: Color, len: usize },

    #[error("path of {color} has {len} cells, expected {expected}", expected = crate::ludo::PATH_LEN)]
    PathLength { color: Color, len: usize },

    #[error("safe cell {0} is not on the common track")]
    SafeCellOffTrack(Cell),

    #[error("safe cell {0} is a finish cell")]
    SafeCellOnFinish(Cell),
}

/// A roll or move request that was refused. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the game is over")]
    GameOver,

    #[error("it is {expected}'s turn, not {got}'s")]
    NotYourTurn { expected: Color, got: Color },

    #[error("roll the die first")]
    NotRolled,

    #[error("the die has already been rolled")]
    AlreadyRolled,

    #[error("move or deselect the selected piece first")]
    SelectionPending,

    #[error("no piece is selected")]
    NothingSelected,

    #[error("{0} cannot move with this roll")]
    NotEligible(PieceId),

    #[error("{0} needs a six to leave home")]
    NeedSix(PieceId),

    #[error("{piece} would overshoot the finish from {from} with {die}")]
    Overshoot { piece: PieceId, from: u8, die: u8 },

    #[error("{0} has already finished")]
    PieceFinished(PieceId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("player count must be 2, 3 or 4, got {0}")]
    PlayerCount(u8),

    #[error("a rotation needs between 2 and 4 distinct colors")]
    Rotation,

    #[error("unknown color '{0}'")]
    UnknownColor(String),

    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),
}
