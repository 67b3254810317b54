//! Environment selection for simulated peers.

use bingo_app::{Environment, SystemEnv};
use bingo_harness::SimEnv;

/// OS randomness, or a seeded stream per peer.
///
/// Timestamps always come from the wall clock, since peers run on real
/// tokio timers. A seed fixes grids, problem order, and claim ids.
#[derive(Debug, Clone)]
pub enum PeerEnv {
    /// Production randomness.
    System(SystemEnv),
    /// Seeded randomness.
    Seeded(SimEnv),
}

impl PeerEnv {
    /// Environment for peer `index` under an optional seed.
    pub fn for_peer(seed: Option<u64>, index: u64) -> Self {
        match seed {
            Some(seed) => Self::Seeded(SimEnv::with_seed(seed).for_peer(index)),
            None => Self::System(SystemEnv::new()),
        }
    }
}

impl Environment for PeerEnv {
    fn wall_clock_millis(&self) -> u64 {
        SystemEnv::new().wall_clock_millis()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        match self {
            Self::System(env) => env.random_bytes(buffer),
            Self::Seeded(env) => env.random_bytes(buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_peers_repeat() {
        let a = PeerEnv::for_peer(Some(9), 2);
        let b = PeerEnv::for_peer(Some(9), 2);
        assert_eq!(a.random_u64(), b.random_u64());
    }

    #[test]
    fn seeded_peers_differ() {
        let a = PeerEnv::for_peer(Some(9), 1);
        let b = PeerEnv::for_peer(Some(9), 2);
        assert_ne!(a.random_u64(), b.random_u64());
    }
}
