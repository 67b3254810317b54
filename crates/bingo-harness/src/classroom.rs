//! Simulated classroom for convergence testing.
//!
//! One teacher and any number of students, each a real [`Peer`] on its own
//! [`SimEnv`] stream, connected by a [`SimNetwork`]. The teacher is always
//! peer 0. Everything a peer publishes goes into the network; nothing
//! reaches another peer until the simulation delivers it.

use std::sync::Arc;

use bingo_app::{Peer, PeerAction, PeerError, PeerEvent};
use bingo_core::ProblemBank;

use crate::{
    Operation,
    invariants::{PeerSnapshot, SystemSnapshot},
    sim_env::SimEnv,
    sim_network::{Delivery, NetworkConfig, PeerId, SimNetwork},
};

/// Index of the teacher in [`Classroom::peers`].
pub const TEACHER: PeerId = 0;

/// A teacher, its students, and the network between them.
pub struct Classroom {
    env: SimEnv,
    network: SimNetwork,
    bank: Arc<ProblemBank>,
    peers: Vec<Peer<SimEnv>>,
    resets: usize,
    late_joins: usize,
}

impl Classroom {
    /// Start a teacher and one student per name, all joined before anything
    /// is published.
    ///
    /// # Errors
    ///
    /// Fails if a name is blank or the bank cannot fill a grid.
    pub fn new(
        seed: u64,
        bank: Arc<ProblemBank>,
        students: &[&str],
        config: NetworkConfig,
    ) -> Result<Self, PeerError> {
        let env = SimEnv::with_seed(seed);
        let mut network = SimNetwork::new(seed, config);

        let teacher = Peer::start_teacher(env.for_peer(TEACHER as u64), Arc::clone(&bank));
        network.join(TEACHER);

        let mut classroom =
            Self { env, network, bank, peers: vec![teacher], resets: 0, late_joins: 0 };
        for name in students {
            classroom.add_student(name)?;
        }
        classroom.late_joins = 0;
        Ok(classroom)
    }

    /// Start another student mid-game.
    ///
    /// The newcomer sees nothing published before it joined.
    pub fn join_student(&mut self, name: &str) -> Result<PeerId, PeerError> {
        let id = self.add_student(name)?;
        tracing::debug!(peer = id, name, "student joined late");
        Ok(id)
    }

    fn add_student(&mut self, name: &str) -> Result<PeerId, PeerError> {
        let id = self.peers.len();
        let peer = Peer::start_student(self.env.for_peer(id as u64), Arc::clone(&self.bank), name)?;
        self.peers.push(peer);
        self.network.join(id);
        self.late_joins += 1;
        Ok(id)
    }

    /// Feed `event` to one peer and route what it publishes into the network.
    ///
    /// Returns the peer's actions. An unknown peer yields nothing.
    pub fn handle(&mut self, peer: PeerId, event: PeerEvent) -> Vec<PeerAction> {
        let confirming = matches!(event, PeerEvent::ConfirmReset);
        let Some(target) = self.peers.get_mut(peer) else {
            return vec![];
        };

        let actions = target.handle(event);
        for action in &actions {
            if let PeerAction::Publish(bytes) = action {
                self.network.publish(peer, bytes);
                if confirming {
                    self.resets += 1;
                }
            }
        }
        actions
    }

    /// Hand one in-flight message to its receiver.
    ///
    /// Returns `None` when nothing is in flight.
    pub fn deliver_one(&mut self) -> Option<Delivery> {
        let delivery = self.network.deliver_next()?;
        self.handle(delivery.to, PeerEvent::MessageReceived(delivery.payload.clone()));
        Some(delivery)
    }

    /// Deliver until the network is quiet or `max_steps` deliveries ran.
    ///
    /// Returns the number of deliveries.
    pub fn run_until_quiet(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.deliver_one().is_some() {
            steps += 1;
        }
        steps
    }

    /// Apply one generated operation.
    pub fn apply(&mut self, op: &Operation) {
        tracing::trace!(op = op.name(), "apply");

        match *op {
            Operation::AdvanceProblem => {
                self.handle(TEACHER, PeerEvent::AdvanceProblem);
            },
            Operation::RequestReset => {
                self.handle(TEACHER, PeerEvent::RequestReset);
            },
            Operation::ConfirmReset => {
                self.handle(TEACHER, PeerEvent::ConfirmReset);
            },
            Operation::CancelReset => {
                self.handle(TEACHER, PeerEvent::CancelReset);
            },
            Operation::ToggleCell { student, index } => {
                if let Some(peer) = self.student(student) {
                    self.handle(peer, PeerEvent::ToggleCell { index: usize::from(index) });
                }
            },
            Operation::MarkCurrent { student } => {
                let Some(peer) = self.student(student) else { return };
                let unmarked = self.peer(peer).and_then(|p| {
                    let cell = p.current_answer_cell()?;
                    p.grid()?.cell(cell).filter(|c| !c.marked).map(|_| cell)
                });
                if let Some(index) = unmarked {
                    self.handle(peer, PeerEvent::ToggleCell { index });
                }
            },
            Operation::ClaimBingo { student } => {
                if let Some(peer) = self.student(student) {
                    self.handle(peer, PeerEvent::ClaimBingo);
                }
            },
            Operation::Deliver { count } => {
                self.run_until_quiet(usize::from(count));
            },
            Operation::AdvanceTime { millis } => {
                self.env.advance_time(u64::from(millis));
            },
        }
    }

    /// Peer id of the student in `slot`, wrapping over the student count.
    pub fn student(&self, slot: u8) -> Option<PeerId> {
        let students = self.peers.len() - 1;
        (students > 0).then(|| 1 + usize::from(slot) % students)
    }

    /// Every peer, teacher first.
    pub fn peers(&self) -> &[Peer<SimEnv>] {
        &self.peers
    }

    /// One peer.
    pub fn peer(&self, id: PeerId) -> Option<&Peer<SimEnv>> {
        self.peers.get(id)
    }

    /// The teacher.
    pub fn teacher(&self) -> &Peer<SimEnv> {
        &self.peers[TEACHER]
    }

    /// Shared simulation environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// The network between peers.
    pub fn network(&self) -> &SimNetwork {
        &self.network
    }

    /// Confirmed resets so far.
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Capture every peer plus the delivery conditions.
    pub fn snapshot(&self) -> SystemSnapshot {
        let mut snapshot = SystemSnapshot {
            fully_delivered: self.network.is_quiet()
                && self.network.stats().dropped == 0
                && self.late_joins == 0,
            reset_free: self.resets == 0,
            ..SystemSnapshot::empty()
        };
        for (id, peer) in self.peers.iter().enumerate() {
            snapshot.add_peer(PeerSnapshot::capture(id, peer));
        }
        snapshot
    }
}
