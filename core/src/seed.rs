use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeds handed out to successive minefields of one engine.
///
/// Every minefield gets its own `ChaCha8Rng` seeded from the next value, so a game can be
/// regenerated from the initial seed and the number of games played before it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSequence {
    initial: u64,
    next: u64,
}

impl SeedSequence {
    pub fn new(seed: Option<u64>) -> Self {
        let initial = seed.unwrap_or_else(|| {
            let seed = rand::random();
            log::debug!("no seed given, picked {seed}");
            seed
        });
        Self {
            initial,
            next: initial,
        }
    }

    pub const fn initial(&self) -> u64 {
        self.initial
    }

    pub const fn peek(&self) -> u64 {
        self.next
    }

    pub fn next_rng(&mut self) -> ChaCha8Rng {
        let seed = self.next;
        self.next = self.next.wrapping_add(1);
        ChaCha8Rng::seed_from_u64(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn successive_rngs_use_incrementing_seeds() {
        let mut seeds = SeedSequence::new(Some(42));
        let mut first = seeds.next_rng();
        assert_eq!(seeds.peek(), 43);
        let mut second = seeds.next_rng();

        let mut expected_first = ChaCha8Rng::seed_from_u64(42);
        let mut expected_second = ChaCha8Rng::seed_from_u64(43);
        assert_eq!(first.random::<u64>(), expected_first.random::<u64>());
        assert_eq!(second.random::<u64>(), expected_second.random::<u64>());
        assert_eq!(seeds.initial(), 42);
    }

    #[test]
    fn seed_wraps_around() {
        let mut seeds = SeedSequence::new(Some(u64::MAX));
        let _ = seeds.next_rng();
        assert_eq!(seeds.peek(), 0);
    }
}
