use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use thiserror::Error;
use tracing::warn;

use crate::ludo::Color;

pub const FALLBACK: &str = "No insight available.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlavorError {
    #[error("commentary service unavailable: {0}")]
    Unavailable(String),

    #[error("commentary service returned nothing")]
    Empty,
}

/// Short commentary on a roll. Purely cosmetic, never affects the rules.
pub trait FlavorText {
    fn commentary(&mut self, color: Color, die: u8) -> Result<String, FlavorError>;
}

const SIX_LINES: [&str; 4] = [
    "A six! {color} is on the march.",
    "{color} rolls a six. Somebody should be nervous.",
    "Six pips and another roll for {color}.",
    "The die smiles on {color}.",
];

const LOW_LINES: [&str; 4] = [
    "{color} inches forward with a {die}.",
    "Only a {die}. Patience, {color}.",
    "A {die} for {color}. Every step counts.",
    "{color} takes the scenic route with a {die}.",
];

const MID_LINES: [&str; 4] = [
    "{color} rolls {die}. Eyes on the safe squares.",
    "A solid {die} for {color}.",
    "{color} moves {die}. Is anyone in range?",
    "{die} steps closer to home for {color}.",
];

/// Offline provider picking from a handful of phrases.
#[derive(Debug, Clone)]
pub struct CannedFlavor<R = StdRng> {
    rng: R,
}

impl CannedFlavor<StdRng> {
    pub fn new() -> Self {
        CannedFlavor { rng: StdRng::from_os_rng() }
    }

    pub fn seeded(seed: u64) -> Self {
        CannedFlavor { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for CannedFlavor<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> FlavorText for CannedFlavor<R> {
    fn commentary(&mut self, color: Color, die: u8) -> Result<String, FlavorError> {
        let lines = match die {
            6 => &SIX_LINES,
            1 | 2 => &LOW_LINES,
            _ => &MID_LINES,
        };
        let line = lines.choose(&mut self.rng).ok_or(FlavorError::Empty)?;
        Ok(line
            .replace("{color}", &capitalize(color.name()))
            .replace("{die}", &die.to_string()))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Asks `provider` for commentary. A missing provider, an error or an empty
/// answer all give [`FALLBACK`].
pub fn flavor_or_fallback<F: FlavorText + ?Sized>(
    provider: Option<&mut F>,
    color: Color,
    die: u8,
) -> String {
    let Some(provider) = provider else {
        return FALLBACK.to_string();
    };
    match provider.commentary(color, die) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(%color, die, "empty commentary");
            FALLBACK.to_string()
        }
        Err(err) => {
            warn!(%color, die, %err, "commentary failed");
            FALLBACK.to_string()
        }
    }
}
