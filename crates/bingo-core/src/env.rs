//! Environment abstraction for deterministic testing.
//!
//! Decouples game logic from system resources (wall clock, randomness).
//! Problem selection, grid generation, claim ids, and claim timestamps all go
//! through this trait, so a seeded simulation replays the same game.

/// Abstract environment providing time and randomness.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `wall_clock_millis()` never goes backwards within one peer
/// - Given the same seed, a simulated implementation produces the same
///   sequence of random bytes
pub trait Environment: Clone + Send + Sync + 'static {
    /// Milliseconds since the Unix epoch (or a logical clock in simulation).
    ///
    /// Used as the timestamp of bingo claims.
    fn wall_clock_millis(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Uniform random index in `0..bound`.
    ///
    /// Uses rejection sampling so small bounds carry no modulo bias. Returns
    /// 0 when `bound` is 0 or 1.
    fn random_below(&self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }

        let bound = bound as u64;
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let value = self.random_u64();
            if value < zone {
                return (value % bound) as usize;
            }
        }
    }
}
