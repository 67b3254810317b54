//! Autoplay driver.
//!
//! Stands in for a human at the controls. Each tick the teacher posts the
//! next problem. A student makes one move per tick: claim bingo once a line
//! is complete, otherwise mark the newest posted answer still unmarked on
//! their grid. Inbound messages are delivered as soon as they arrive.

use std::time::Duration;

use bingo_app::{Driver, Environment, Notice, Peer, PeerEvent};
use bingo_core::BingoGrid;
use bingo_transport::{LocalChannel, Transport};
use bytes::Bytes;
use tokio::{
    sync::{mpsc, watch},
    time::{Interval, MissedTickBehavior},
};

use crate::SimError;

/// What the driver does on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Post a problem per tick, then idle after `rounds` posts.
    Teacher {
        /// Posts left.
        rounds: usize,
    },
    /// Mark and claim until shut down.
    Student,
}

/// [`Driver`] playing one peer automatically over a [`LocalChannel`].
pub struct AutoplayDriver {
    channel: LocalChannel,
    inbound: mpsc::UnboundedReceiver<Bytes>,
    tick: Interval,
    shutdown: watch::Receiver<bool>,
    plan: Plan,
    next_move: Option<PeerEvent>,
}

impl AutoplayDriver {
    /// Subscribe `channel` and start ticking every `period`.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// - `SimError::Transport` if the channel cannot subscribe
    pub fn new(
        channel: LocalChannel,
        plan: Plan,
        period: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self, SimError> {
        let (tx, inbound) = mpsc::unbounded_channel();
        channel.subscribe(move |bytes| {
            if tx.send(bytes).is_err() {
                tracing::trace!("driver gone, inbound message discarded");
            }
        })?;

        let mut tick = tokio::time::interval(period.max(Duration::from_millis(1)));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Self { channel, inbound, tick, shutdown, plan, next_move: None })
    }

    fn on_tick(&mut self) -> Option<PeerEvent> {
        match &mut self.plan {
            Plan::Teacher { rounds: 0 } => None,
            Plan::Teacher { rounds } => {
                *rounds -= 1;
                Some(PeerEvent::AdvanceProblem)
            },
            Plan::Student => self.next_move.take(),
        }
    }
}

impl Driver for AutoplayDriver {
    type Error = SimError;

    async fn next_event(&mut self) -> Result<Option<PeerEvent>, Self::Error> {
        loop {
            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        return Ok(Some(PeerEvent::Quit));
                    }
                }

                Some(bytes) = self.inbound.recv() => {
                    return Ok(Some(PeerEvent::MessageReceived(bytes)));
                }

                _ = self.tick.tick() => {
                    if let Some(event) = self.on_tick() {
                        return Ok(Some(event));
                    }
                }
            }
        }
    }

    fn publish(&mut self, payload: Bytes) -> Result<(), Self::Error> {
        self.channel.publish(payload);
        Ok(())
    }

    fn state_changed<E: Environment>(&mut self, peer: &Peer<E>) -> Result<(), Self::Error> {
        if self.plan != Plan::Student {
            return Ok(());
        }
        let Some(grid) = peer.grid().filter(|g| !g.is_claimed()) else {
            self.next_move = None;
            return Ok(());
        };

        self.next_move = pick_move(peer, grid);
        Ok(())
    }

    fn notify(&mut self, notice: Notice) -> Result<(), Self::Error> {
        match notice {
            Notice::ProblemsExhausted => {
                tracing::info!("every problem posted");
                if let Plan::Teacher { rounds } = &mut self.plan {
                    *rounds = 0;
                }
            },
            Notice::BingoConfirmed(claim) => {
                tracing::info!(name = %claim.name, timestamp = claim.timestamp, "bingo!");
            },
            Notice::Rejected(error) => tracing::debug!(%error, "move rejected"),
            Notice::ConfirmReset => {},
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.channel.close();
        self.inbound.close();
    }
}

/// Claim if a line is complete, else mark the newest posted answer that is
/// on the grid and unmarked.
fn pick_move<E: Environment>(peer: &Peer<E>, grid: &BingoGrid) -> Option<PeerEvent> {
    if grid.has_bingo() {
        return Some(PeerEvent::ClaimBingo);
    }

    peer.state()
        .history()
        .iter()
        .rev()
        .filter_map(|&id| peer.bank().get(id))
        .filter_map(|problem| grid.cell_for_answer(&problem.answer))
        .find(|&index| !is_marked(grid, index))
        .map(|index| PeerEvent::ToggleCell { index })
}

fn is_marked(grid: &BingoGrid, index: usize) -> bool {
    grid.cell(index).is_some_and(|cell| cell.marked)
}
