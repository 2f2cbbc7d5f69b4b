use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::{Result, ServiceError};

/// Supplies seeds for new layouts. Failing to produce one aborts game creation.
pub trait SeedSource {
    fn next_seed(&mut self) -> Result<u64>;
}

impl<T: SeedSource + ?Sized> SeedSource for Box<T> {
    fn next_seed(&mut self) -> Result<u64> {
        (**self).next_seed()
    }
}

/// Seeds from the operating system's randomness.
#[derive(Copy, Clone, Debug, Default)]
pub struct OsSeedSource;

impl SeedSource for OsSeedSource {
    fn next_seed(&mut self) -> Result<u64> {
        OsRng.try_next_u64().map_err(|err| {
            log::error!("OS randomness unavailable: {}", err);
            ServiceError::Entropy
        })
    }
}

/// Deterministic seeds `start, start + 1, ...`, for replays and tests.
#[derive(Copy, Clone, Debug)]
pub struct SeedSequence {
    next: u64,
}

impl SeedSequence {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }
}

impl SeedSource for SeedSequence {
    fn next_seed(&mut self) -> Result<u64> {
        let seed = self.next;
        self.next = self.next.wrapping_add(1);
        Ok(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_counts_up() {
        let mut seeds = SeedSequence::new(u64::MAX - 1);

        assert_eq!(seeds.next_seed(), Ok(u64::MAX - 1));
        assert_eq!(seeds.next_seed(), Ok(u64::MAX));
        assert_eq!(seeds.next_seed(), Ok(0));
    }

    #[test]
    fn boxed_sources_delegate() {
        let mut seeds: Box<dyn SeedSource> = Box::new(SeedSequence::new(5));

        assert_eq!(seeds.next_seed(), Ok(5));
        assert_eq!(seeds.next_seed(), Ok(6));
    }
}
