use tracing::{debug, info, instrument};

use crate::{
    ludo::{
        Board, Color, DIE_FACES, DiceSource, ForfeitReason, GameConfig, GameEvent, GeometryError, PieceId,
        Position, Presentation, RandomDice, Rejection, FINISH_INDEX, HOME_STRETCH_START, dispatch,
    },
    misc::TinyVec,
};

pub type LegalPieces = TinyVec<PieceId, 4>;

/// At most every opponent piece can be captured at once.
pub type CapturedPieces = TinyVec<PieceId, 12>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingRoll,
    /// The die is rolled and more than one piece could use it.
    AwaitingSelection { die: u8, legal: LegalPieces },
    GameOver,
}

/// What happened to a roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollOutcome {
    /// No piece could use the die. The turn passed.
    NoLegalMoves { die: u8 },
    /// Too many sixes in a row. The turn passed.
    Forfeited { die: u8 },
    /// Only one sensible move existed and it was played.
    AutoMoved(MoveOutcome),
    /// The player has to pick one of `legal`.
    AwaitingSelection { die: u8, legal: LegalPieces },
}

impl RollOutcome {
    pub fn die(&self) -> u8 {
        match self {
            RollOutcome::NoLegalMoves { die }
            | RollOutcome::Forfeited { die }
            | RollOutcome::AwaitingSelection { die, .. } => *die,
            RollOutcome::AutoMoved(outcome) => outcome.die,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub piece: PieceId,
    pub die: u8,
    pub from: Position,
    pub to: Position,
    pub captured: CapturedPieces,
    pub finished: bool,
    /// 1 for the first color to bring all pieces home, and so on.
    pub placement: Option<usize>,
    pub extra_turn: bool,
    pub game_over: bool,
}

/// One game of Ludo. Owns the board and the dice, enforces turn order and
/// queues [`GameEvent`]s for the presentation layer.
#[derive(Debug, Clone)]
pub struct GameSession<D: DiceSource = RandomDice> {
    config: GameConfig,
    board: Board,
    dice: D,
    rotation: Vec<Color>,
    current: usize,
    phase: Phase,
    selected: Option<PieceId>,
    consecutive_sixes: u8,
    placements: Vec<Color>,
    turns: u32,
    captures: u32,
    events: Vec<GameEvent>,
}

impl<D: DiceSource> GameSession<D> {
    pub fn new(config: GameConfig, dice: D) -> Result<Self, GeometryError> {
        let board = Board::new(&config.rotation)?;
        let rotation = config.rotation.clone();
        let mut session = GameSession {
            config,
            board,
            dice,
            rotation,
            current: 0,
            phase: Phase::AwaitingRoll,
            selected: None,
            consecutive_sixes: 0,
            placements: Vec::new(),
            turns: 0,
            captures: 0,
            events: Vec::new(),
        };
        let first = session.current_turn();
        session.events.push(GameEvent::TurnChanged { color: first });
        Ok(session)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn current_turn(&self) -> Color {
        self.rotation[self.current]
    }

    /// The rolled value, 0 while nothing is rolled.
    pub fn die(&self) -> u8 {
        match self.phase {
            Phase::AwaitingSelection { die, .. } => die,
            _ => 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    pub fn active_colors(&self) -> &[Color] {
        &self.rotation
    }

    pub fn placements(&self) -> &[Color] {
        &self.placements
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn consecutive_sixes(&self) -> u8 {
        self.consecutive_sixes
    }

    /// Number of times the turn has passed to another color.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn captures(&self) -> u32 {
        self.captures
    }

    /// Pieces the current player may move with the pending roll.
    pub fn legal_moves(&self) -> LegalPieces {
        match self.phase {
            Phase::AwaitingSelection { legal, .. } => legal,
            _ => LegalPieces::new(),
        }
    }

    /// Placed colors first, then the rest by how far their pieces got.
    pub fn standings(&self) -> Vec<Color> {
        let mut rest: Vec<Color> = self
            .board
            .colors()
            .filter(|c| !self.placements.contains(c))
            .collect();
        rest.sort_by_key(|&c| std::cmp::Reverse(self.board.progress(c)));
        self.placements.iter().copied().chain(rest).collect()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drains the event queue into `presentation`.
    pub fn dispatch_events(&mut self, presentation: &mut impl Presentation) {
        for event in self.drain_events() {
            dispatch(&event, presentation);
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn roll(&mut self, color: Color) -> Result<RollOutcome, Rejection> {
        self.check_turn(color)?;
        if self.selected.is_some() {
            return Err(Rejection::SelectionPending);
        }
        if let Phase::AwaitingSelection { .. } = self.phase {
            return Err(Rejection::AlreadyRolled);
        }

        let die = self.dice.roll();
        assert!((1..=DIE_FACES).contains(&die), "die value {} out of range", die);
        debug!(die, "rolled");
        self.events.push(GameEvent::Rolled { color, die });

        if die == 6 {
            self.consecutive_sixes += 1;
        } else {
            self.consecutive_sixes = 0;
        }
        if let Some(limit) = self.config.max_consecutive_sixes {
            if self.consecutive_sixes >= limit {
                info!(%color, sixes = self.consecutive_sixes, "roll forfeited");
                self.forfeit(ForfeitReason::TooManySixes);
                return Ok(RollOutcome::Forfeited { die });
            }
        }

        let legal = self.board.legal_moves(color, die);
        let Some(&first) = legal.first() else {
            debug!(%color, die, "no legal moves");
            self.forfeit(ForfeitReason::NoMoves);
            return Ok(RollOutcome::NoLegalMoves { die });
        };

        self.phase = Phase::AwaitingSelection { die, legal };
        let all_home = legal.all(|&p| self.board.position(p) == Position::Home);
        if legal.len() == 1 || all_home {
            return Ok(RollOutcome::AutoMoved(self.move_piece(first, die)));
        }
        Ok(RollOutcome::AwaitingSelection { die, legal })
    }

    /// Marks `piece` as the one to move. Replaces an earlier selection.
    pub fn select(&mut self, piece: PieceId) -> Result<(), Rejection> {
        let die = self.pending_die(piece.color())?;
        self.check_move(piece, die)?;
        self.selected = Some(piece);
        Ok(())
    }

    pub fn deselect(&mut self) -> Result<PieceId, Rejection> {
        self.selected.take().ok_or(Rejection::NothingSelected)
    }

    /// Moves the selected piece.
    pub fn commit(&mut self) -> Result<MoveOutcome, Rejection> {
        let piece = self.selected.ok_or(Rejection::NothingSelected)?;
        self.apply_move(piece)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn apply_move(&mut self, piece: PieceId) -> Result<MoveOutcome, Rejection> {
        let die = self.pending_die(piece.color())?;
        self.check_move(piece, die)?;
        Ok(self.move_piece(piece, die))
    }

    /// Passes the turn without moving, whatever was rolled or selected.
    pub fn force_end_turn(&mut self) -> Result<(), Rejection> {
        if self.is_over() {
            return Err(Rejection::GameOver);
        }
        info!(color = %self.current_turn(), "turn ended by clock");
        self.forfeit(ForfeitReason::Forced);
        Ok(())
    }

    fn check_turn(&self, color: Color) -> Result<(), Rejection> {
        if self.is_over() {
            return Err(Rejection::GameOver);
        }
        let expected = self.current_turn();
        if color != expected {
            return Err(Rejection::NotYourTurn { expected, got: color });
        }
        Ok(())
    }

    fn pending_die(&self, color: Color) -> Result<u8, Rejection> {
        self.check_turn(color)?;
        match self.phase {
            Phase::AwaitingSelection { die, .. } => Ok(die),
            _ => Err(Rejection::NotRolled),
        }
    }

    fn check_move(&self, piece: PieceId, die: u8) -> Result<(), Rejection> {
        match self.board.position(piece) {
            Position::Finished => return Err(Rejection::PieceFinished(piece)),
            Position::Home if die != 6 => return Err(Rejection::NeedSix(piece)),
            Position::OnPath(from) if from.saturating_add(die) > FINISH_INDEX => {
                return Err(Rejection::Overshoot { piece, from, die });
            }
            _ => {}
        }
        if !self.legal_moves().contains(&piece) {
            return Err(Rejection::NotEligible(piece));
        }
        Ok(())
    }

    /// Applies an already validated move and resolves the end of the turn.
    fn move_piece(&mut self, piece: PieceId, die: u8) -> MoveOutcome {
        let color = piece.color();
        let from = self.board.position(piece);
        let from_location = self.board.location(piece);
        let Some(to) = self.board.destination(piece, die) else {
            unreachable!("{} cannot move {}", piece, die);
        };

        self.board.set_piece_position(piece, to);
        let to_location = self.board.location(piece);
        self.events.push(GameEvent::PieceMoved { piece, from: from_location, to: to_location });
        debug!(%piece, ?from, ?to, "moved");

        let mut captured = CapturedPieces::new();
        if let Position::OnPath(index) = to {
            let cell = self.board.paths().cell(color, index);
            if index < HOME_STRETCH_START {
                let victims = self.board.capturable_at(cell, color);
                for victim in victims.iter().copied() {
                    self.board.set_piece_position(victim, Position::Home);
                    self.events.push(GameEvent::PieceCaptured { piece: victim, by: piece, at: cell });
                    info!(%victim, by = %piece, %cell, "captured");
                    captured.push(victim);
                }
            }
        }
        self.captures += captured.len() as u32;

        let finished = to == Position::Finished;
        let mut placement = None;
        if finished {
            self.events.push(GameEvent::PieceFinished { piece });
            if self.board.has_finished(color) {
                placement = Some(self.place(color));
            }
        }

        self.selected = None;
        let game_over = self.is_over();
        let extra_turn =
            !game_over && placement.is_none() && (die == 6 || !captured.is_empty() || finished);

        if !game_over {
            if placement.is_some() {
                self.retire_current();
            } else if extra_turn {
                self.phase = Phase::AwaitingRoll;
            } else {
                self.advance_turn();
            }
        }

        MoveOutcome { piece, die, from, to, captured, finished, placement, extra_turn, game_over }
    }

    /// Records that `color` brought all pieces home and ends the game if
    /// enough colors did.
    fn place(&mut self, color: Color) -> usize {
        self.placements.push(color);
        let place = self.placements.len();
        info!(%color, place, "placed");
        self.events.push(GameEvent::Placed { color, place });

        let remaining = self.rotation.len() - 1;
        if place >= self.config.placements_to_end || remaining <= 1 {
            self.phase = Phase::GameOver;
            self.selected = None;
            info!(placements = ?self.placements, "game over");
            debug!("final board\n{}", self.board.to_fancy_string());
            self.events.push(GameEvent::GameEnded { placements: self.placements.clone() });
        }
        place
    }

    fn forfeit(&mut self, reason: ForfeitReason) {
        let color = self.current_turn();
        self.events.push(GameEvent::TurnForfeited { color, reason });
        self.advance_turn();
    }

    fn advance_turn(&mut self) {
        self.current = (self.current + 1) % self.rotation.len();
        self.start_turn();
    }

    /// Drops the current color from the rotation. The color after it moves next.
    fn retire_current(&mut self) {
        self.rotation.remove(self.current);
        if self.current >= self.rotation.len() {
            self.current = 0;
        }
        self.start_turn();
    }

    fn start_turn(&mut self) {
        self.phase = Phase::AwaitingRoll;
        self.selected = None;
        self.consecutive_sixes = 0;
        self.turns += 1;
        let color = self.current_turn();
        self.events.push(GameEvent::TurnChanged { color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ludo::{Location, ScriptedDice};

    fn session(dice: &[u8]) -> GameSession<ScriptedDice> {
        GameSession::new(GameConfig::default(), ScriptedDice::new(dice.iter().copied())).unwrap()
    }

    fn red(slot: u8) -> PieceId {
        PieceId::new(Color::Red, slot)
    }

    fn green(slot: u8) -> PieceId {
        PieceId::new(Color::Green, slot)
    }

    #[test]
    fn test_home_piece_needs_six() {
        let mut session = session(&[3]);
        let outcome = session.roll(Color::Red).unwrap();
        assert_eq!(outcome, RollOutcome::NoLegalMoves { die: 3 });
        assert_eq!(session.board().position(red(1)), Position::Home);
        assert_eq!(session.current_turn(), Color::Yellow);
    }

    #[test]
    fn test_six_from_home_moves_automatically() {
        let mut session = session(&[6]);
        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.piece, red(1));
        assert_eq!(outcome.to, Position::OnPath(0));
        assert!(outcome.extra_turn);
        assert_eq!(session.current_turn(), Color::Red);
        assert_eq!(session.die(), 0);
    }

    #[test]
    fn test_overshoot_is_rejected_repeatably() {
        let mut session = session(&[5]);
        session.board.set_piece_position(red(1), Position::OnPath(53));
        session.board.set_piece_position(red(2), Position::OnPath(10));
        session.board.set_piece_position(red(3), Position::OnPath(20));

        let outcome = session.roll(Color::Red).unwrap();
        assert!(matches!(outcome, RollOutcome::AwaitingSelection { die: 5, .. }));
        for _ in 0..2 {
            assert_eq!(
                session.apply_move(red(1)),
                Err(Rejection::Overshoot { piece: red(1), from: 53, die: 5 })
            );
            assert_eq!(session.board().position(red(1)), Position::OnPath(53));
        }
        assert_eq!(session.apply_move(red(4)), Err(Rejection::NeedSix(red(4))));

        let outcome = session.apply_move(red(2)).unwrap();
        assert_eq!(outcome.to, Position::OnPath(15));
        assert_eq!(session.current_turn(), Color::Yellow);
    }

    #[test]
    fn test_exact_landing_finishes_and_grants_extra_turn() {
        let mut session = session(&[3]);
        session.board.set_piece_position(red(1), Position::OnPath(54));
        session.board.set_piece_position(red(2), Position::OnPath(3));
        session.roll(Color::Red).unwrap();

        let outcome = session.apply_move(red(1)).unwrap();
        assert!(outcome.finished);
        assert_eq!(outcome.to, Position::Finished);
        assert_eq!(session.board().finished_count(Color::Red), 1);
        assert!(outcome.extra_turn);
        assert_eq!(session.current_turn(), Color::Red);
        assert_eq!(session.apply_move(red(1)), Err(Rejection::NotRolled));
    }

    #[test]
    fn test_finished_piece_cannot_move() {
        let mut session = session(&[2]);
        session.board.set_piece_position(red(1), Position::Finished);
        session.board.set_piece_position(red(2), Position::OnPath(3));
        session.board.set_piece_position(red(3), Position::OnPath(8));
        session.roll(Color::Red).unwrap();
        assert_eq!(session.select(red(1)), Err(Rejection::PieceFinished(red(1))));
    }

    #[test]
    fn test_capture_sends_opponent_home() {
        let mut session = session(&[3]);
        session.board.set_piece_position(red(1), Position::OnPath(4));
        // Green index 46 is red index 7.
        session.board.set_piece_position(green(1), Position::OnPath(46));

        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.to, Position::OnPath(7));
        assert_eq!(outcome.captured.to_vec(), vec![green(1)]);
        assert_eq!(session.board().position(green(1)), Position::Home);
        assert!(outcome.extra_turn);
        assert_eq!(session.current_turn(), Color::Red);
        assert_eq!(session.captures(), 1);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::PieceCaptured {
            piece: green(1),
            by: red(1),
            at: session.board().paths().cell(Color::Red, 7),
        }));
    }

    #[test]
    fn test_leaving_home_captures_on_entry_cell() {
        let mut session = session(&[6]);
        // Green index 39 is red's entry cell.
        session.board.set_piece_position(green(2), Position::OnPath(39));
        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.captured.to_vec(), vec![green(2)]);
    }

    #[test]
    fn test_safe_cell_protects() {
        let mut session = session(&[3]);
        session.board.set_piece_position(red(1), Position::OnPath(6));
        // Green index 48 is red index 9, a safe cell.
        session.board.set_piece_position(green(1), Position::OnPath(48));

        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert!(outcome.captured.is_empty());
        let cell = session.board().paths().cell(Color::Red, 9);
        assert_eq!(session.board().pieces_at(cell).to_vec(), vec![green(1), red(1)]);
        assert!(!outcome.extra_turn);
        assert_eq!(session.current_turn(), Color::Yellow);
    }

    #[test]
    fn test_same_color_pieces_stack() {
        let mut session = session(&[3]);
        session.board.set_piece_position(red(1), Position::OnPath(4));
        session.board.set_piece_position(red(2), Position::OnPath(7));
        session.roll(Color::Red).unwrap();

        let outcome = session.apply_move(red(1)).unwrap();
        assert!(outcome.captured.is_empty());
        let cell = session.board().paths().cell(Color::Red, 7);
        assert_eq!(session.board().pieces_at(cell).to_vec(), vec![red(2), red(1)]);
    }

    #[test]
    fn test_capture_takes_every_opponent_on_the_cell() {
        let mut session = session(&[3]);
        session.board.set_piece_position(red(1), Position::OnPath(4));
        // Green index 46 and blue index 33 are both red index 7.
        let blue = PieceId::new(Color::Blue, 1);
        session.board.set_piece_position(green(1), Position::OnPath(46));
        session.board.set_piece_position(blue, Position::OnPath(33));

        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.captured.to_vec(), vec![green(1), blue]);
        assert_eq!(session.board().position(green(1)), Position::Home);
        assert_eq!(session.board().position(blue), Position::Home);
        assert_eq!(session.captures(), 2);
        let cell = session.board().paths().cell(Color::Red, 7);
        assert_eq!(session.board().pieces_at(cell).to_vec(), vec![red(1)]);

        let captures = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PieceCaptured { by, .. } if *by == red(1)))
            .count();
        assert_eq!(captures, 2);
    }

    #[test]
    fn test_turn_off_cell_never_captures() {
        let mut session = session(&[4]);
        session.board.set_piece_position(red(1), Position::OnPath(47));
        // Green index 38 is red's turn-off cell.
        session.board.set_piece_position(green(1), Position::OnPath(38));

        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.to, Position::OnPath(51));
        assert!(outcome.captured.is_empty());
        assert_eq!(session.board().position(green(1)), Position::OnPath(38));
    }

    #[test]
    fn test_piece_on_turn_off_cell_cannot_be_captured() {
        let mut session = session(&[4, 3, 3, 3]);
        session.board.set_piece_position(red(1), Position::OnPath(47));
        session.board.set_piece_position(green(1), Position::OnPath(35));

        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.to, Position::OnPath(51));
        session.roll(Color::Yellow).unwrap();
        session.roll(Color::Blue).unwrap();

        // Green index 38 is red's turn-off cell.
        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Green).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.to, Position::OnPath(38));
        assert!(outcome.captured.is_empty());
        assert!(!outcome.extra_turn);
        assert_eq!(session.board().position(red(1)), Position::OnPath(51));
        let cell = session.board().paths().cell(Color::Red, 51);
        assert_eq!(session.board().pieces_at(cell).to_vec(), vec![red(1), green(1)]);
        assert_eq!(session.captures(), 0);
    }

    #[test]
    fn test_home_stretch_moves() {
        let mut session = session(&[6]);
        session.board.set_piece_position(red(1), Position::OnPath(50));
        session.board.set_piece_position(red(2), Position::OnPath(51));
        session.board.set_piece_position(red(3), Position::Finished);
        session.board.set_piece_position(red(4), Position::Finished);

        session.roll(Color::Red).unwrap();
        let outcome = session.apply_move(red(1)).unwrap();
        assert_eq!(outcome.to, Position::OnPath(56));
        assert!(outcome.captured.is_empty());

        // Only red-2 can still use a six.
        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.piece, red(2));
        assert!(outcome.finished);
        assert_eq!(session.board().finished_count(Color::Red), 3);
    }

    #[test]
    fn test_rotation_order() {
        let mut session = session(&[2]);
        session.board.set_piece_position(red(1), Position::OnPath(10));
        let mut order = vec![session.current_turn()];
        for _ in 0..4 {
            session.roll(session.current_turn()).unwrap();
            order.push(session.current_turn());
        }
        assert_eq!(
            order,
            vec![Color::Red, Color::Yellow, Color::Blue, Color::Green, Color::Red]
        );
        assert_eq!(session.board().position(red(1)), Position::OnPath(12));
    }

    #[test]
    fn test_last_piece_home_places_color() {
        let mut session = session(&[6]);
        session.board.set_piece_position(red(1), Position::OnPath(51));
        for slot in 2..=4 {
            session.board.set_piece_position(red(slot), Position::Finished);
        }

        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Red).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.placement, Some(1));
        assert!(!outcome.extra_turn);
        assert!(!outcome.game_over);
        assert_eq!(session.placements(), &[Color::Red]);
        assert_eq!(session.active_colors(), &[Color::Yellow, Color::Blue, Color::Green]);
        assert_eq!(session.current_turn(), Color::Yellow);
    }

    #[test]
    fn test_last_color_in_rotation_hands_over_to_first() {
        let mut session = session(&[1]);
        let green_pieces: Vec<PieceId> = PieceId::all_of(Color::Green).collect();
        session.board.set_piece_position(green_pieces[0], Position::OnPath(56));
        for &piece in &green_pieces[1..] {
            session.board.set_piece_position(piece, Position::Finished);
        }
        for _ in 0..3 {
            session.roll(session.current_turn()).unwrap();
        }
        assert_eq!(session.current_turn(), Color::Green);
        session.roll(Color::Green).unwrap();
        assert_eq!(session.placements(), &[Color::Green]);
        assert_eq!(session.current_turn(), Color::Red);
    }

    #[test]
    fn test_three_placements_end_the_game() {
        let mut session = session(&[1]);
        for color in [Color::Red, Color::Yellow, Color::Blue] {
            session.board.set_piece_position(PieceId::new(color, 1), Position::OnPath(56));
            for slot in 2..=4 {
                session.board.set_piece_position(PieceId::new(color, slot), Position::Finished);
            }
        }

        for color in [Color::Red, Color::Yellow, Color::Blue] {
            session.roll(color).unwrap();
        }
        assert!(session.is_over());
        assert_eq!(session.placements(), &[Color::Red, Color::Yellow, Color::Blue]);
        assert_eq!(session.roll(Color::Green), Err(Rejection::GameOver));
        assert_eq!(session.apply_move(green(1)), Err(Rejection::GameOver));
        assert_eq!(session.force_end_turn(), Err(Rejection::GameOver));
        assert_eq!(session.standings().last(), Some(&Color::Green));

        let events = session.drain_events();
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameEnded { placements: vec![Color::Red, Color::Yellow, Color::Blue] })
        );
    }

    #[test]
    fn test_two_player_game_ends_with_first_placement() {
        let config = GameConfig::for_players(2).unwrap();
        let mut session = GameSession::new(config, ScriptedDice::new([1])).unwrap();
        let yellow = PieceId::new(Color::Yellow, 1);
        session.board.set_piece_position(yellow, Position::OnPath(56));
        for slot in 2..=4 {
            session.board.set_piece_position(PieceId::new(Color::Yellow, slot), Position::Finished);
        }
        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Yellow).unwrap() else {
            panic!("expected an automatic move");
        };
        assert!(outcome.game_over);
        assert!(session.is_over());
        assert_eq!(session.standings(), vec![Color::Yellow, Color::Green]);
    }

    #[test]
    fn test_three_player_game_ends_when_one_color_is_left() {
        let config = GameConfig::for_players(3).unwrap();
        let mut session = GameSession::new(config, ScriptedDice::new([1])).unwrap();
        for color in [Color::Yellow, Color::Blue] {
            session.board.set_piece_position(PieceId::new(color, 1), Position::OnPath(56));
            for slot in 2..=4 {
                session.board.set_piece_position(PieceId::new(color, slot), Position::Finished);
            }
        }

        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Yellow).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.placement, Some(1));
        assert!(!outcome.game_over);
        assert_eq!(session.active_colors(), &[Color::Blue, Color::Green]);

        let RollOutcome::AutoMoved(outcome) = session.roll(Color::Blue).unwrap() else {
            panic!("expected an automatic move");
        };
        assert_eq!(outcome.placement, Some(2));
        assert!(outcome.game_over);
        assert!(session.is_over());
        assert_eq!(session.placements(), &[Color::Yellow, Color::Blue]);
        assert_eq!(session.roll(Color::Green), Err(Rejection::GameOver));
        assert_eq!(session.standings(), vec![Color::Yellow, Color::Blue, Color::Green]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_die_outside_faces_panics() {
        struct Loaded;

        impl DiceSource for Loaded {
            fn roll(&mut self) -> u8 {
                7
            }
        }

        let mut session = GameSession::new(GameConfig::default(), Loaded).unwrap();
        session.board.set_piece_position(red(1), Position::OnPath(10));
        let _ = session.roll(Color::Red);
    }

    #[test]
    fn test_third_six_forfeits() {
        let mut session = session(&[6]);
        session.board.set_piece_position(red(1), Position::OnPath(10));

        session.roll(Color::Red).unwrap();
        session.apply_move(red(2)).unwrap();
        session.roll(Color::Red).unwrap();
        session.apply_move(red(1)).unwrap();
        assert_eq!(session.consecutive_sixes(), 2);

        assert_eq!(session.roll(Color::Red), Ok(RollOutcome::Forfeited { die: 6 }));
        assert_eq!(session.current_turn(), Color::Yellow);
        assert_eq!(session.board().position(red(1)), Position::OnPath(16));
        assert_eq!(session.consecutive_sixes(), 0);
    }

    #[test]
    fn test_unlimited_sixes() {
        let config = GameConfig { max_consecutive_sixes: None, ..GameConfig::default() };
        let mut session = GameSession::new(config, ScriptedDice::new([6])).unwrap();
        for _ in 0..5 {
            let outcome = session.roll(Color::Red).unwrap();
            if let RollOutcome::AwaitingSelection { legal, .. } = outcome {
                session.apply_move(legal.to_vec()[0]).unwrap();
            }
        }
        assert_eq!(session.current_turn(), Color::Red);
        assert_eq!(session.consecutive_sixes(), 5);
    }

    #[test]
    fn test_force_end_turn() {
        let mut session = session(&[4]);
        session.board.set_piece_position(red(1), Position::OnPath(1));
        session.board.set_piece_position(red(2), Position::OnPath(2));
        session.roll(Color::Red).unwrap();
        session.select(red(1)).unwrap();

        session.force_end_turn().unwrap();
        assert_eq!(session.current_turn(), Color::Yellow);
        assert_eq!(session.die(), 0);
        assert_eq!(session.selected(), None);
        assert!(session.drain_events().contains(&GameEvent::TurnForfeited {
            color: Color::Red,
            reason: ForfeitReason::Forced,
        }));
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut session = session(&[4]);
        session.board.set_piece_position(red(1), Position::OnPath(1));
        session.board.set_piece_position(red(2), Position::OnPath(2));

        assert_eq!(
            session.roll(Color::Yellow),
            Err(Rejection::NotYourTurn { expected: Color::Red, got: Color::Yellow })
        );
        assert_eq!(session.apply_move(red(1)), Err(Rejection::NotRolled));
        assert_eq!(session.deselect(), Err(Rejection::NothingSelected));
        assert_eq!(session.commit(), Err(Rejection::NothingSelected));

        session.roll(Color::Red).unwrap();
        assert_eq!(session.roll(Color::Red), Err(Rejection::AlreadyRolled));
        session.select(red(2)).unwrap();
        assert_eq!(session.roll(Color::Red), Err(Rejection::SelectionPending));
        assert_eq!(
            session.apply_move(green(1)),
            Err(Rejection::NotYourTurn { expected: Color::Red, got: Color::Green })
        );
        assert_eq!(session.deselect(), Ok(red(2)));
        assert_eq!(session.board().position(red(1)), Position::OnPath(1));
        assert_eq!(session.board().position(red(2)), Position::OnPath(2));
        assert_eq!(session.die(), 4);
    }

    #[test]
    fn test_select_and_commit() {
        let mut session = session(&[4]);
        session.board.set_piece_position(red(1), Position::OnPath(1));
        session.board.set_piece_position(red(2), Position::OnPath(2));
        session.roll(Color::Red).unwrap();
        session.select(red(1)).unwrap();
        session.select(red(2)).unwrap();

        let outcome = session.commit().unwrap();
        assert_eq!(outcome.piece, red(2));
        assert_eq!(session.board().position(red(2)), Position::OnPath(6));
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_events_reach_presentation() {
        #[derive(Default)]
        struct Moves(Vec<(PieceId, Location, Location)>);

        impl Presentation for Moves {
            fn on_piece_moved(&mut self, piece: PieceId, from: Location, to: Location) {
                self.0.push((piece, from, to));
            }
        }

        let mut session = session(&[6]);
        session.roll(Color::Red).unwrap();
        let mut moves = Moves::default();
        session.dispatch_events(&mut moves);
        let entry = session.board().paths().entry_cell(Color::Red);
        assert_eq!(moves.0, vec![(red(1), Location::Yard(red(1)), Location::Cell(entry))]);
        assert!(session.drain_events().is_empty());
    }
}
