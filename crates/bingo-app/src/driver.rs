//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the peer runtime from where events come
//! from and where output goes. A terminal frontend, the classroom simulator,
//! and tests each implement it, while the generic [`crate::Runtime`] handles
//! orchestration.

use std::future::Future;

use bytes::Bytes;

use crate::{Environment, Notice, Peer, PeerEvent};

/// Abstracts I/O operations for the peer runtime.
///
/// # Implementations
///
/// - **Simulator**: scripted or autoplayed user input, in-process broadcast
///   hub for transport
/// - **Tests**: a queue of events and a log of everything emitted
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next event: user input or an inbound transport message.
    ///
    /// Returns `None` when the input source is exhausted.
    fn next_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<PeerEvent>, Self::Error>> + Send;

    /// Publish encoded bytes on the broadcast topic.
    ///
    /// # Errors
    ///
    /// Returns an error only if the driver itself has failed. Delivery is
    /// best effort and never reported.
    fn publish(&mut self, payload: Bytes) -> Result<(), Self::Error>;

    /// Show the peer's updated state (game state or grid).
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn state_changed<E: Environment>(&mut self, peer: &Peer<E>) -> Result<(), Self::Error>;

    /// Show a notice to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn notify(&mut self, notice: Notice) -> Result<(), Self::Error>;

    /// Release transport and input resources.
    fn stop(&mut self);
}
