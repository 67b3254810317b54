//! In-process topic registry and per-peer channel handles.
//!
//! Each topic is one `tokio::sync::broadcast` channel. Messages travel in an
//! envelope tagged with the sending channel's id so a channel can skip its
//! own messages.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use bytes::Bytes;
use tokio::{
    runtime::Handle,
    sync::broadcast::{self, error::RecvError},
    task::AbortHandle,
};

use crate::{Transport, config::ChannelConfig, error::TransportError};

#[derive(Debug, Clone)]
struct Envelope {
    sender: u64,
    payload: Bytes,
}

struct Topic {
    sender: broadcast::Sender<Envelope>,
    /// Channels opened on this topic and not yet closed.
    open: usize,
}

#[derive(Default)]
struct HubInner {
    topics: HashMap<String, Topic>,
    next_channel: u64,
}

/// Registry of named topics shared by every peer in the process.
///
/// Cloning is cheap; clones share the same topics.
#[derive(Clone, Default)]
pub struct BroadcastHub {
    inner: Arc<Mutex<HubInner>>,
}

impl BroadcastHub {
    /// Empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel on `topic` with the default capacity.
    pub fn open(&self, topic: &str) -> LocalChannel {
        self.open_with(&ChannelConfig::for_topic(topic))
    }

    /// Open a channel as configured.
    ///
    /// The first channel on a topic fixes its capacity; later channels share
    /// it regardless of their own config.
    pub fn open_with(&self, config: &ChannelConfig) -> LocalChannel {
        let mut inner = lock(&self.inner);
        inner.next_channel += 1;
        let id = inner.next_channel;

        let topic = inner.topics.entry(config.topic.clone()).or_insert_with(|| {
            tracing::debug!(topic = %config.topic, capacity = config.capacity, "topic created");
            let (sender, _) = broadcast::channel(config.capacity.max(1));
            Topic { sender, open: 0 }
        });
        topic.open += 1;
        let sender = topic.sender.clone();
        drop(inner);

        tracing::debug!(topic = %config.topic, channel = id, "channel opened");

        LocalChannel {
            id,
            topic: config.topic.clone(),
            sender,
            hub: Arc::clone(&self.inner),
            closed: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Number of topics with at least one open channel.
    pub fn topic_count(&self) -> usize {
        lock(&self.inner).topics.len()
    }

    /// Number of open channels on `topic`.
    pub fn channel_count(&self, topic: &str) -> usize {
        lock(&self.inner).topics.get(topic).map_or(0, |t| t.open)
    }
}

impl fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastHub").field("topics", &self.topic_count()).finish()
    }
}

/// One peer's handle on a topic.
///
/// Dropping the channel closes it.
pub struct LocalChannel {
    id: u64,
    topic: String,
    sender: broadcast::Sender<Envelope>,
    hub: Arc<Mutex<HubInner>>,
    closed: Arc<AtomicBool>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl LocalChannel {
    /// Topic this channel belongs to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Hub-assigned channel id, unique within the hub.
    pub fn id(&self) -> u64 {
        self.id
    }

    fn release_topic(&self) {
        let mut inner = lock(&self.hub);
        let remove = match inner.topics.get_mut(&self.topic) {
            Some(topic) => {
                topic.open = topic.open.saturating_sub(1);
                topic.open == 0
            },
            None => false,
        };
        if remove {
            inner.topics.remove(&self.topic);
            tracing::debug!(topic = %self.topic, "topic released");
        }
    }
}

impl Transport for LocalChannel {
    fn publish(&self, payload: Bytes) {
        if self.is_closed() {
            return;
        }

        let len = payload.len();
        match self.sender.send(Envelope { sender: self.id, payload }) {
            Ok(receivers) => {
                tracing::trace!(topic = %self.topic, channel = self.id, len, receivers, "published");
            },
            Err(_) => {
                tracing::debug!(topic = %self.topic, channel = self.id, len, "no listeners, dropped");
            },
        }
    }

    fn subscribe<F>(&self, mut handler: F) -> Result<(), TransportError>
    where
        F: FnMut(Bytes) + Send + 'static,
    {
        if self.is_closed() {
            return Err(TransportError::Closed { topic: self.topic.clone() });
        }
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let mut receiver = self.sender.subscribe();
        let own_id = self.id;
        let closed = Arc::clone(&self.closed);
        let topic = self.topic.clone();

        let task = runtime.spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(envelope) => {
                        if closed.load(Ordering::Acquire) {
                            break;
                        }
                        if envelope.sender == own_id {
                            continue;
                        }
                        handler(envelope.payload);
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(%topic, channel = own_id, skipped, "receiver lagged");
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        });

        lock(&self.tasks).push(task.abort_handle());

        // close() may have drained the task list while we were spawning.
        if self.is_closed() {
            task.abort();
        }
        Ok(())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        for task in lock(&self.tasks).drain(..) {
            task.abort();
        }
        self.release_topic();

        tracing::debug!(topic = %self.topic, channel = self.id, "channel closed");
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for LocalChannel {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for LocalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalChannel")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Registry state stays consistent across a panic in another holder, so a
/// poisoned lock is recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
