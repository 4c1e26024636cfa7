mod board;
pub use board::{Board, CellPieces};

mod cell;
pub use cell::{Cell, Location, yard_origin};

mod color;
pub use color::Color;

mod config;
pub use config::{DEFAULT_ROTATION, GameConfig};

mod dice;
pub use dice::{DIE_FACES, DiceSource, RandomDice, ScriptedDice};

mod error;
pub use error::{ConfigError, GeometryError, Rejection};

mod event;
pub use event::{ForfeitReason, GameEvent, NullPresentation, Presentation, TracePresentation, dispatch};

mod geometry;
pub use geometry::{
    COMMON_TRACK, FINISH_INDEX, Geometry, HOME_STRETCH_LEN, HOME_STRETCH_START, PATH_LEN,
    SAFE_CELLS, TRACK_LEN,
};

mod path;
pub use path::{Paths, build_full_path};

mod piece;
pub use piece::{PIECES_PER_COLOR, PieceId, Position, PositionCompressed};

mod session;
pub use session::{CapturedPieces, GameSession, LegalPieces, MoveOutcome, Phase, RollOutcome};
