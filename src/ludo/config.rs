use crate::ludo::{Color, ConfigError};

/// Turn order when all four colors play.
pub const DEFAULT_ROTATION: [Color; 4] = [Color::Red, Color::Yellow, Color::Blue, Color::Green];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Active colors in turn order. The first one starts.
    pub rotation: Vec<Color>,
    /// The game stops once this many colors have brought all pieces home.
    pub placements_to_end: usize,
    /// This many sixes in a row forfeit the roll. `None` allows any streak.
    pub max_consecutive_sixes: Option<u8>,
}

impl GameConfig {
    /// Standard setup for 2, 3 or 4 players.
    pub fn for_players(count: u8) -> Result<Self, ConfigError> {
        let rotation: Vec<Color> = match count {
            4 => DEFAULT_ROTATION.to_vec(),
            3 => DEFAULT_ROTATION.into_iter().filter(|&c| c != Color::Red).collect(),
            2 => DEFAULT_ROTATION
                .into_iter()
                .filter(|&c| c != Color::Red && c != Color::Blue)
                .collect(),
            n => return Err(ConfigError::PlayerCount(n)),
        };
        Ok(GameConfig { rotation, ..GameConfig::default() })
    }

    pub fn with_rotation(rotation: Vec<Color>) -> Result<Self, ConfigError> {
        let distinct = rotation
            .iter()
            .enumerate()
            .all(|(i, c)| !rotation[..i].contains(c));
        if !(2..=4).contains(&rotation.len()) || !distinct {
            return Err(ConfigError::Rotation);
        }
        Ok(GameConfig { rotation, ..GameConfig::default() })
    }

    pub fn player_count(&self) -> usize {
        self.rotation.len()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rotation: DEFAULT_ROTATION.to_vec(),
            placements_to_end: 3,
            max_consecutive_sixes: Some(3),
        }
    }
}
