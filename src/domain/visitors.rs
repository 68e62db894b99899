//! "N people are viewing this offer" counter.

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisitorCounter {
    min: u32,
    max: u32,
}

impl VisitorCounter {
    /// Inverted bounds are swapped.
    pub fn new(min: u32, max: u32) -> Self {
        if min <= max { Self { min, max } } else { Self { min: max, max: min } }
    }

    pub fn bounds(&self) -> (u32, u32) { (self.min, self.max) }

    /// Uniform draw in `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 { rng.gen_range(self.min..=self.max) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let counter = VisitorCounter::new(10, 20);
        for _ in 0..500 {
            let n = counter.sample(&mut rng);
            assert!((10..=20).contains(&n));
        }
    }

    #[test]
    fn test_inverted_and_degenerate_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(VisitorCounter::new(30, 5).bounds(), (5, 30));
        assert_eq!(VisitorCounter::new(42, 42).sample(&mut rng), 42);
    }
}
