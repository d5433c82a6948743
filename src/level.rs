use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws node levels from a geometric distribution truncated at `max_level`.
///
/// The generator is owned by the list and seeded explicitly, so two lists built
/// with the same seed and fed the same inserts end up with identical shapes.
#[derive(Debug, Clone)]
pub(crate) struct LevelSampler {
    rng: StdRng,
    max_level: usize,
    probability: f64,
}

impl LevelSampler {
    pub(crate) fn new(seed: u64, max_level: usize, probability: f64) -> Self {
        debug_assert!(max_level >= 1);
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_level,
            probability,
        }
    }

    #[inline]
    pub(crate) fn max_level(&self) -> usize {
        self.max_level
    }

    #[inline]
    pub(crate) fn probability(&self) -> f64 {
        self.probability
    }

    /// Returns a level in `[1, max_level]`.
    pub(crate) fn sample(&mut self) -> usize {
        if self.probability == 0.5 && self.max_level <= 65 {
            // Every bit is a fair coin flip: the run of trailing ones is the
            // number of promotions. Masking to `max_level - 1` bits truncates.
            let mask = (!0u64)
                .checked_shr(65 - self.max_level as u32)
                .unwrap_or(0);
            let flips = self.rng.gen::<u64>() & mask;
            return 1 + flips.trailing_ones() as usize;
        }
        let mut level = 1;
        while level < self.max_level && self.rng.gen::<f64>() < self.probability {
            level += 1;
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::LevelSampler;

    #[test]
    fn levels_stay_in_bounds() {
        for &max_level in &[1, 2, 5, 32, 64, 65, 80] {
            let mut sampler = LevelSampler::new(3, max_level, 0.5);
            for _ in 0..2000 {
                let level = sampler.sample();
                assert!(level >= 1 && level <= max_level, "{} > {}", level, max_level);
            }
        }
    }

    #[test]
    fn same_seed_same_levels() {
        let mut a = LevelSampler::new(99, 32, 0.5);
        let mut b = LevelSampler::new(99, 32, 0.5);
        let left: Vec<_> = (0..100).map(|_| a.sample()).collect();
        let right: Vec<_> = (0..100).map(|_| b.sample()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn degenerate_probabilities() {
        let mut never = LevelSampler::new(1, 16, 0.0);
        let mut always = LevelSampler::new(1, 16, 1.0);
        for _ in 0..100 {
            assert_eq!(never.sample(), 1);
            assert_eq!(always.sample(), 16);
        }
    }

    #[test]
    fn roughly_geometric() {
        let samples = 20_000;
        for &(p, expected_base) in &[(0.5, 0.5), (0.25, 0.75)] {
            let mut sampler = LevelSampler::new(7, 32, p);
            let base = (0..samples).filter(|_| sampler.sample() == 1).count();
            let ratio = base as f64 / samples as f64;
            assert!(
                (ratio - expected_base).abs() < 0.03,
                "p = {}: {} of levels were 1",
                p,
                ratio
            );
        }
    }
}
