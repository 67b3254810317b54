//! Simulated broadcast network.
//!
//! Models the guarantees of the local broadcast transport and nothing more:
//!
//! - A message goes to every other joined peer, never back to its sender.
//! - Per-sender FIFO: messages from one sender reach a receiver in send
//!   order. Deliveries from different senders interleave in seeded random
//!   order.
//! - At most once: each copy may be dropped with probability
//!   [`NetworkConfig::drop_rate`]. No duplication, no replay.
//! - A peer that joins late sees nothing published before it joined.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use bytes::Bytes;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Index of a peer in the simulation.
pub type PeerId = usize;

/// Fault injection settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetworkConfig {
    /// Probability in `[0, 1]` that one copy of a message is lost.
    pub drop_rate: f64,
}

impl NetworkConfig {
    /// Every message reaches every joined peer.
    pub fn lossless() -> Self {
        Self { drop_rate: 0.0 }
    }

    /// Each copy is lost with probability `drop_rate`, clamped to `[0, 1]`.
    pub fn lossy(drop_rate: f64) -> Self {
        Self { drop_rate: drop_rate.clamp(0.0, 1.0) }
    }
}

/// One message handed to one receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Publishing peer.
    pub from: PeerId,
    /// Receiving peer.
    pub to: PeerId,
    /// Encoded message.
    pub payload: Bytes,
}

/// Counters for a simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    /// Messages published.
    pub published: usize,
    /// Copies handed to receivers.
    pub delivered: usize,
    /// Copies lost to fault injection.
    pub dropped: usize,
}

/// Deterministic in-memory broadcast network.
#[derive(Debug)]
pub struct SimNetwork {
    rng: ChaCha8Rng,
    config: NetworkConfig,
    members: BTreeSet<PeerId>,
    /// In-flight copies keyed by `(receiver, sender)`.
    queues: BTreeMap<(PeerId, PeerId), VecDeque<Bytes>>,
    stats: NetworkStats,
}

impl SimNetwork {
    /// Empty network with its own seeded RNG.
    pub fn new(seed: u64, config: NetworkConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            members: BTreeSet::new(),
            queues: BTreeMap::new(),
            stats: NetworkStats::default(),
        }
    }

    /// Subscribe `peer` to the topic.
    pub fn join(&mut self, peer: PeerId) {
        self.members.insert(peer);
    }

    /// Unsubscribe `peer`, discarding anything still in flight to it.
    pub fn leave(&mut self, peer: PeerId) {
        self.members.remove(&peer);
        self.queues.retain(|(to, _), _| *to != peer);
    }

    /// Broadcast `payload` from `from` to every other member.
    pub fn publish(&mut self, from: PeerId, payload: &Bytes) {
        self.stats.published += 1;

        let drop_rate = self.config.drop_rate.min(1.0);
        let receivers: Vec<PeerId> = self.members.iter().copied().filter(|&p| p != from).collect();
        for to in receivers {
            if drop_rate > 0.0 && self.rng.gen_bool(drop_rate) {
                self.stats.dropped += 1;
                tracing::trace!(from, to, "message dropped");
                continue;
            }
            self.queues.entry((to, from)).or_default().push_back(payload.clone());
        }
    }

    /// Hand one in-flight message to its receiver.
    ///
    /// Picks a random non-empty `(receiver, sender)` queue and pops its
    /// oldest message. Returns `None` when nothing is in flight.
    pub fn deliver_next(&mut self) -> Option<Delivery> {
        if self.queues.is_empty() {
            return None;
        }

        let choice = self.rng.gen_range(0..self.queues.len());
        let key = self.queues.keys().nth(choice).copied()?;
        let queue = self.queues.get_mut(&key)?;
        let payload = queue.pop_front()?;
        if queue.is_empty() {
            self.queues.remove(&key);
        }

        self.stats.delivered += 1;
        let (to, from) = key;
        Some(Delivery { from, to, payload })
    }

    /// Copies still in flight.
    pub fn pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// True when nothing is in flight.
    pub fn is_quiet(&self) -> bool {
        self.queues.is_empty()
    }

    /// Counters so far.
    pub fn stats(&self) -> NetworkStats {
        self.stats
    }
}
