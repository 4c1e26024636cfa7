use std::fmt;

use hashbrown::HashMap;
use rand::{SeedableRng, rngs::StdRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, warn};

use crate::{
    engine::{Difficulty, play_turn},
    ludo::{Color, GameConfig, GameSession, GeometryError, NullPresentation, RandomDice},
};

/// Upper bound on rolls in one headless game. Real games need a few hundred.
pub const MAX_ROLLS: u32 = 20_000;

/// Result of one headless game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    /// Placed colors first, then the rest by progress.
    pub standings: Vec<Color>,
    pub turns: u32,
    pub captures: u32,
    pub finished: bool,
}

/// Plays one AI-only game. `difficulties` lists one tier per color of the
/// rotation, in rotation order.
pub fn play_game(
    config: &GameConfig,
    difficulties: &[Difficulty],
    seed: u64,
) -> Result<GameRecord, GeometryError> {
    let mut session = GameSession::new(config.clone(), RandomDice::seeded(seed))?;
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));

    let mut rolls = 0;
    while !session.is_over() && rolls < MAX_ROLLS {
        let color = session.current_turn();
        let difficulty = difficulty_for(config, difficulties, color);
        if let Err(rejection) = play_turn(&mut session, difficulty, &mut rng) {
            warn!(%rejection, %color, "AI move rejected");
            break;
        }
        rolls += 1;
    }
    session.dispatch_events(&mut NullPresentation);

    let finished = session.is_over();
    if !finished {
        warn!(seed, rolls, "game did not finish");
    }
    debug!(seed, turns = session.turns(), placements = ?session.placements(), "game done");
    Ok(GameRecord {
        standings: session.standings(),
        turns: session.turns(),
        captures: session.captures(),
        finished,
    })
}

fn difficulty_for(config: &GameConfig, difficulties: &[Difficulty], color: Color) -> Difficulty {
    config
        .rotation
        .iter()
        .position(|&c| c == color)
        .and_then(|i| difficulties.get(i).copied())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub games: u32,
    pub unfinished: u32,
    /// Per color, how often it ended in each rank (index 0 = first place).
    pub ranks: HashMap<Color, [u32; 4]>,
    pub total_turns: u64,
    pub total_captures: u64,
}

impl BatchStats {
    pub fn record(&mut self, record: &GameRecord) {
        self.games += 1;
        if !record.finished {
            self.unfinished += 1;
        }
        for (rank, color) in record.standings.iter().enumerate() {
            self.ranks.entry(*color).or_default()[rank] += 1;
        }
        self.total_turns += record.turns as u64;
        self.total_captures += record.captures as u64;
    }

    pub fn wins(&self, color: Color) -> u32 {
        self.ranks.get(&color).map_or(0, |r| r[0])
    }

    pub fn win_rate(&self, color: Color) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins(color) as f32 / self.games as f32 * 100.0
    }

    pub fn average_turns(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f32 / self.games as f32
    }

    pub fn average_captures(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_captures as f32 / self.games as f32
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "============================================")?;
        writeln!(f, "Games: {}, Unfinished: {}", self.games, self.unfinished)?;
        writeln!(
            f,
            "Average turns: {:.1}, Average captures: {:.1}",
            self.average_turns(),
            self.average_captures()
        )?;
        for color in Color::ALL {
            let Some(ranks) = self.ranks.get(&color) else {
                continue;
            };
            writeln!(
                f,
                "{:<7} 1st: {:>5} 2nd: {:>5} 3rd: {:>5} 4th: {:>5} Win Rate: {:.2}%",
                color.name(),
                ranks[0],
                ranks[1],
                ranks[2],
                ranks[3],
                self.win_rate(color)
            )?;
        }
        write!(f, "============================================")
    }
}

/// Runs `games` independent games on the rayon pool. Game `i` uses seed
/// `seed + i`, so a batch is reproducible.
pub fn run_batch(
    config: &GameConfig,
    difficulties: &[Difficulty],
    games: u32,
    seed: u64,
) -> Result<BatchStats, GeometryError> {
    let records = (0..games)
        .into_par_iter()
        .map(|i| play_game(config, difficulties, seed.wrapping_add(i as u64)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut stats = BatchStats::default();
    for record in records.iter() {
        stats.record(record);
    }
    Ok(stats)
}
