use std::{fmt, str::FromStr};

use rand::{Rng, seq::IndexedRandom};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use crate::ludo::{
    Board, Cell, Color, ConfigError, DiceSource, FINISH_INDEX, GameSession, HOME_STRETCH_START,
    MoveOutcome, PieceId, Position, Rejection, RollOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    /// Uniform random pick.
    Easy,
    /// Fixed priority rules.
    Medium,
    /// Weighted scoring of every candidate.
    #[default]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

pub const FINISH_SCORE: i32 = 1000;
pub const LEAVE_HOME_SCORE: i32 = 800;
pub const STUCK_AT_HOME_SCORE: i32 = -1000;
pub const CAPTURE_SCORE: i32 = 660;
pub const SAFE_DESTINATION_SCORE: i32 = 200;
pub const THREATENED_DESTINATION_SCORE: i32 = -300;
pub const ESCAPE_SCORE: i32 = 340;
pub const LEAVING_SAFE_CELL_SCORE: i32 = -320;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    Finish,
    LeaveHome,
    StuckAtHome,
    Capture,
    Safety,
    LeavingSafeCell,
    Progress,
    Position,
}

/// Score of one candidate move with the parts it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveScore {
    pub piece: PieceId,
    pub total: i32,
    pub factors: Vec<(Factor, i32)>,
}

impl MoveScore {
    fn new(piece: PieceId) -> Self {
        MoveScore { piece, total: 0, factors: Vec::new() }
    }

    fn add(&mut self, factor: Factor, value: i32) {
        self.total += value;
        self.factors.push((factor, value));
    }

    pub fn factor(&self, factor: Factor) -> Option<i32> {
        self.factors.iter().find(|(f, _)| *f == factor).map(|(_, v)| *v)
    }
}

/// The chosen piece and, for the hard tier, the scores behind the choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub piece: PieceId,
    pub scores: Vec<MoveScore>,
}

pub fn choose_move(
    board: &Board,
    legal: &[PieceId],
    die: u8,
    difficulty: Difficulty,
    rng: &mut impl Rng,
) -> Option<PieceId> {
    decide(board, legal, die, difficulty, rng).map(|d| d.piece)
}

pub fn decide(
    board: &Board,
    legal: &[PieceId],
    die: u8,
    difficulty: Difficulty,
    rng: &mut impl Rng,
) -> Option<Decision> {
    match difficulty {
        Difficulty::Easy => {
            let piece = *legal.choose(rng)?;
            Some(Decision { piece, scores: Vec::new() })
        }
        Difficulty::Medium => {
            let piece = choose_medium(board, legal, die)?;
            Some(Decision { piece, scores: Vec::new() })
        }
        Difficulty::Hard => {
            let scores = score_moves(board, legal, die);
            let mut best: Option<&MoveScore> = None;
            for score in scores.iter() {
                if best.is_none_or(|b| score.total > b.total) {
                    best = Some(score);
                }
            }
            let piece = best?.piece;
            debug!(%piece, die, ?scores, "hard choice");
            Some(Decision { piece, scores })
        }
    }
}

fn choose_medium(board: &Board, legal: &[PieceId], die: u8) -> Option<PieceId> {
    if die == 6 {
        if let Some(&home) = legal.iter().find(|&&p| board.position(p) == Position::Home) {
            return Some(home);
        }
    }

    let target = |piece: PieceId| match board.position(piece) {
        Position::Home => Some(0),
        Position::OnPath(index) => index.checked_add(die),
        Position::Finished => None,
    };

    if let Some(&finisher) = legal.iter().find(|&&p| target(p) == Some(FINISH_INDEX)) {
        return Some(finisher);
    }

    if let Some(&capturer) = legal
        .iter()
        .find(|&&p| target(p).is_some_and(|t| board.would_capture(p.color(), t)))
    {
        return Some(capturer);
    }

    let mut furthest = *legal.first()?;
    for &piece in legal {
        if board.position(piece).progress() > board.position(furthest).progress() {
            furthest = piece;
        }
    }
    Some(furthest)
}

/// Scores every candidate in parallel. The order of `legal` is kept.
pub fn score_moves(board: &Board, legal: &[PieceId], die: u8) -> Vec<MoveScore> {
    legal
        .to_vec()
        .into_par_iter()
        .map(|piece| evaluate_move(board, piece, die))
        .collect()
}

pub fn evaluate_move(board: &Board, piece: PieceId, die: u8) -> MoveScore {
    let mut score = MoveScore::new(piece);
    let color = piece.color();
    let current = match board.position(piece) {
        Position::OnPath(index) => index as i16,
        _ => -1,
    };
    let new_index = current + die as i16;

    if new_index == FINISH_INDEX as i16 {
        score.add(Factor::Finish, FINISH_SCORE);
        return score;
    }
    match board.position(piece) {
        Position::Home if die == 6 => {
            score.add(Factor::LeaveHome, LEAVE_HOME_SCORE);
            return score;
        }
        Position::Home | Position::Finished => {
            score.add(Factor::StuckAtHome, STUCK_AT_HOME_SCORE);
            return score;
        }
        Position::OnPath(_) => {}
    }
    if new_index > FINISH_INDEX as i16 {
        score.add(Factor::StuckAtHome, STUCK_AT_HOME_SCORE);
        return score;
    }

    let paths = board.paths();
    let new_index = new_index as u8;
    let current = current as u8;
    let target = paths.cell(color, new_index);
    let current_cell = paths.cell(color, current);
    let target_safe = new_index >= HOME_STRETCH_START || board.is_safe(target);
    let current_safe = current >= HOME_STRETCH_START || board.is_safe(current_cell);

    if !target_safe {
        let victims = board.capturable_at(target, color);
        if !victims.is_empty() {
            let bonus: i32 = victims
                .iter()
                .filter_map(|&v| board.position(v).path_index())
                .map(|i| 2 * i as i32)
                .sum();
            score.add(Factor::Capture, CAPTURE_SCORE + bonus);
        }
    }

    if target_safe {
        score.add(Factor::Safety, SAFE_DESTINATION_SCORE);
    } else {
        let exposed = (!current_safe).then_some(current_cell);
        score.add(Factor::Safety, threat_score(board, color, exposed, target));
    }

    if current_safe && !target_safe {
        score.add(Factor::LeavingSafeCell, LEAVING_SAFE_CELL_SCORE);
    }

    score.add(Factor::Progress, 100 * new_index as i32 / FINISH_INDEX as i32);

    let bonus = position_bonus(board, color, new_index);
    if bonus > 0 {
        score.add(Factor::Position, bonus);
    }
    score
}

/// Penalty for every opponent that could land on `target` next turn, bonus for
/// every opponent threatening `exposed`, the cell the piece would escape from.
fn threat_score(board: &Board, color: Color, exposed: Option<Cell>, target: Cell) -> i32 {
    let paths = board.paths();
    let mut total = 0;
    for opponent in board.colors().filter(|&c| c != color) {
        for piece in board.pieces(opponent) {
            let Some(from) = board.position(piece).path_index() else {
                continue;
            };
            for die in 1..=6 {
                let landing = from + die;
                if landing >= HOME_STRETCH_START {
                    break;
                }
                let cell = paths.cell(opponent, landing);
                if cell == target {
                    total += THREATENED_DESTINATION_SCORE;
                    break;
                }
                if exposed == Some(cell) {
                    total += ESCAPE_SCORE;
                }
            }
        }
    }
    total
}

/// 20, 30, ... 80 for landing on the 2nd ... 8th safe cell along the path.
fn position_bonus(board: &Board, color: Color, index: u8) -> i32 {
    if index >= HOME_STRETCH_START {
        return 0;
    }
    let path = board.paths().full_path(color);
    if !board.is_safe(path[index as usize]) {
        return 0;
    }
    let nth = path[..=index as usize].iter().filter(|&&c| board.is_safe(c)).count() as i32;
    if nth >= 2 { 10 * nth } else { 0 }
}

/// Rolls for the current color and, when the roll leaves a choice, picks and
/// plays a piece. Returns the move made, if any.
pub fn play_turn<D: DiceSource>(
    session: &mut GameSession<D>,
    difficulty: Difficulty,
    rng: &mut impl Rng,
) -> Result<Option<MoveOutcome>, Rejection> {
    let color = session.current_turn();
    match session.roll(color)? {
        RollOutcome::AwaitingSelection { die, legal } => {
            let legal = legal.to_vec();
            match choose_move(session.board(), &legal, die, difficulty, rng) {
                Some(piece) => session.apply_move(piece).map(Some),
                None => Ok(None),
            }
        }
        RollOutcome::AutoMoved(outcome) => Ok(Some(outcome)),
        RollOutcome::NoLegalMoves { .. } | RollOutcome::Forfeited { .. } => Ok(None),
    }
}
