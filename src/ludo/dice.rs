use rand::{Rng, SeedableRng, rngs::StdRng};

pub const DIE_FACES: u8 = 6;

/// Anything that can produce a die value in 1..=6.
pub trait DiceSource {
    fn roll(&mut self) -> u8;
}

/// Uniform die backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomDice<R = StdRng> {
    rng: R,
}

impl RandomDice<StdRng> {
    pub fn from_entropy() -> Self {
        RandomDice { rng: StdRng::from_os_rng() }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomDice { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> RandomDice<R> {
    pub fn with_rng(rng: R) -> Self {
        RandomDice { rng }
    }
}

impl<R: Rng> DiceSource for RandomDice<R> {
    fn roll(&mut self) -> u8 {
        self.rng.random_range(1..=DIE_FACES)
    }
}

/// Replays a fixed sequence of values, starting over when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    values: Vec<u8>,
    next: usize,
}

impl ScriptedDice {
    pub fn new(values: impl IntoIterator<Item = u8>) -> Self {
        let values: Vec<u8> = values.into_iter().collect();
        assert!(!values.is_empty(), "ScriptedDice needs at least one value");
        assert!(
            values.iter().all(|v| (1..=DIE_FACES).contains(v)),
            "Die values must be between 1 and 6"
        );
        ScriptedDice { values, next: 0 }
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self) -> u8 {
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        value
    }
}

impl<D: DiceSource + ?Sized> DiceSource for Box<D> {
    fn roll(&mut self) -> u8 {
        (**self).roll()
    }
}
