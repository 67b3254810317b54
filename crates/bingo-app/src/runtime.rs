//! Generic runtime for peer sessions.
//!
//! The Runtime drives one peer's event loop, coordinating between the
//! [`Peer`] state machine and a platform [`Driver`]. Events are processed one
//! at a time, so each peer has a single logical mutator.

use crate::{Driver, Environment, Notice, Peer, PeerAction, PeerEvent};

/// Generic runtime that orchestrates a Peer and a Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time and randomness
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    peer: Peer<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a runtime for an already-started peer.
    pub fn new(driver: D, peer: Peer<E>) -> Self {
        Self { driver, peer }
    }

    /// Run the event loop until the driver runs dry or a `Quit` arrives.
    ///
    /// Returns the peer for inspection.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error. The driver is
    /// stopped either way.
    pub async fn run(mut self) -> Result<Peer<E>, D::Error> {
        let result = self.run_loop().await;
        self.driver.stop();
        tracing::debug!(name = %self.peer.identity().display_name, "runtime stopped");
        result.map(|()| self.peer)
    }

    async fn run_loop(&mut self) -> Result<(), D::Error> {
        self.driver.state_changed(&self.peer)?;

        while let Some(event) = self.driver.next_event().await? {
            if self.process_event(event)? {
                break;
            }
        }
        Ok(())
    }

    /// Feed one event through the peer and execute the resulting actions.
    ///
    /// Returns `true` if the peer asked to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to execute an action.
    pub fn process_event(&mut self, event: PeerEvent) -> Result<bool, D::Error> {
        let actions = self.peer.handle(event);
        self.execute(actions)
    }

    fn execute(&mut self, actions: Vec<PeerAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                PeerAction::Publish(payload) => self.driver.publish(payload)?,
                PeerAction::StateChanged(_) | PeerAction::GridChanged => {
                    self.driver.state_changed(&self.peer)?;
                },
                PeerAction::Notify(notice) => {
                    if let Notice::Rejected(error) = &notice {
                        if error.is_transient() {
                            tracing::debug!(%error, "event refused for now");
                        } else {
                            tracing::warn!(%error, "event refused");
                        }
                    }
                    self.driver.notify(notice)?;
                },
                PeerAction::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Get a reference to the Peer.
    pub fn peer(&self) -> &Peer<E> {
        &self.peer
    }

    /// Get a reference to the Driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
