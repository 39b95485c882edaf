use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random draws in `[0, 1)`.
///
/// All randomness of a run (random planner choices, file placement, fault samples)
/// goes through one sampler, so a fixed seed makes the run reproducible.
pub trait UniformSampler: std::fmt::Debug {
    fn sample(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must not be zero.
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index requested from an empty range");
        let index = (self.sample() * len as f64).floor() as usize;
        index.min(len.saturating_sub(1))
    }
}

/// Pseudo random sampler seeded once per run.
#[derive(Debug, Clone)]
pub struct SeededSampler {
    seed: u64,
    rng: StdRng,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl UniformSampler for SeededSampler {
    fn sample(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when it runs out. Used to script scenarios.
#[derive(Debug, Clone)]
pub struct ReplaySampler {
    draws: Vec<f64>,
    next: usize,
}

impl ReplaySampler {
    /// An empty list replays `0.0` forever.
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, next: 0 }
    }

    /// Number of draws handed out so far.
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl UniformSampler for ReplaySampler {
    fn sample(&mut self) -> f64 {
        if self.draws.is_empty() {
            self.next += 1;
            return 0.0;
        }
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_draws() {
        let mut a = SeededSampler::new(42);
        let mut b = SeededSampler::new(42);
        for _ in 0..100 {
            let draw = a.sample();
            assert!((0.0..1.0).contains(&draw));
            assert_eq!(draw, b.sample());
        }
    }

    #[test]
    fn index_stays_in_range() {
        let mut sampler = ReplaySampler::new(vec![0.0, 0.5, 0.999_999_999]);
        assert_eq!(sampler.index(4), 0);
        assert_eq!(sampler.index(4), 2);
        assert_eq!(sampler.index(4), 3);
        assert_eq!(sampler.consumed(), 3);
    }
}
