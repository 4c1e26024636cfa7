use tracing::info;

use crate::ludo::{Cell, Color, Location, PieceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForfeitReason {
    /// No piece can use the die.
    NoMoves,
    /// The consecutive-six limit was reached.
    TooManySixes,
    /// The turn clock ran out.
    Forced,
}

/// Everything the session reports after changing state. Queued in order and
/// handed to a [`Presentation`] by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Rolled { color: Color, die: u8 },
    PieceMoved { piece: PieceId, from: Location, to: Location },
    PieceCaptured { piece: PieceId, by: PieceId, at: Cell },
    PieceFinished { piece: PieceId },
    TurnForfeited { color: Color, reason: ForfeitReason },
    TurnChanged { color: Color },
    Placed { color: Color, place: usize },
    GameEnded { placements: Vec<Color> },
}

/// Receives notifications from the rules engine. It cannot veto anything.
pub trait Presentation {
    fn on_rolled(&mut self, _color: Color, _die: u8) {}

    fn on_piece_moved(&mut self, _piece: PieceId, _from: Location, _to: Location) {}

    /// `yard` is where the captured piece is sent back to.
    fn on_piece_captured(&mut self, _piece: PieceId, _yard: Location) {}

    fn on_piece_finished(&mut self, _piece: PieceId) {}

    fn on_turn_changed(&mut self, _color: Color) {}

    fn on_game_ended(&mut self, _placements: &[Color]) {}
}

/// Routes one event to the matching callback.
pub fn dispatch(event: &GameEvent, presentation: &mut impl Presentation) {
    match event {
        GameEvent::Rolled { color, die } => presentation.on_rolled(*color, *die),
        GameEvent::PieceMoved { piece, from, to } => presentation.on_piece_moved(*piece, *from, *to),
        GameEvent::PieceCaptured { piece, .. } => {
            presentation.on_piece_captured(*piece, Location::Yard(*piece))
        }
        GameEvent::PieceFinished { piece } => presentation.on_piece_finished(*piece),
        GameEvent::TurnChanged { color } => presentation.on_turn_changed(*color),
        GameEvent::GameEnded { placements } => presentation.on_game_ended(placements),
        GameEvent::TurnForfeited { .. } | GameEvent::Placed { .. } => {}
    }
}

/// Presentation that ignores everything. Used by headless games.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl Presentation for NullPresentation {}

/// Writes every notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracePresentation;

impl Presentation for TracePresentation {
    fn on_rolled(&mut self, color: Color, die: u8) {
        info!(%color, die, "rolled");
    }

    fn on_piece_moved(&mut self, piece: PieceId, from: Location, to: Location) {
        info!(%piece, %from, %to, "moved");
    }

    fn on_piece_captured(&mut self, piece: PieceId, yard: Location) {
        info!(%piece, %yard, "captured");
    }

    fn on_piece_finished(&mut self, piece: PieceId) {
        info!(%piece, "finished");
    }

    fn on_turn_changed(&mut self, color: Color) {
        info!(%color, "turn");
    }

    fn on_game_ended(&mut self, placements: &[Color]) {
        info!(?placements, "game over");
    }
}
