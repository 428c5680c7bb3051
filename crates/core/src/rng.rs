use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Uniform randomness consumed by every generator in the crate.
///
/// Only `next_u64` is required; the derived helpers keep index and unit
/// sampling identical across implementations so a scripted source replays
/// the same decisions as a seeded one.
pub trait DrawRng {
    fn next_u64(&mut self) -> u64;

    /// Uniform index in `0..bound`. Returns 0 for an empty range.
    fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as usize
    }

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl<R: DrawRng + ?Sized> DrawRng for &mut R {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }
}

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::from_seed(rand::thread_rng().next_u64())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl DrawRng for RngState {
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

/// Replays a fixed sequence of raw values, wrapping around at the end.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: Vec<u64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: impl Into<Vec<u64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl DrawRng for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
