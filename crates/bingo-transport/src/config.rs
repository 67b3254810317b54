//! Channel configuration.

/// Topic every quiz-bingo peer joins unless configured otherwise.
pub const DEFAULT_TOPIC: &str = "math_bingo_sync";

/// Messages buffered per topic before slow receivers start losing them.
pub const DEFAULT_CAPACITY: usize = 256;

/// Configuration for a broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Topic name. Channels on the same topic hear each other.
    pub topic: String,

    /// Per-topic buffer. Must be non-zero; zero is raised to one.
    pub capacity: usize,
}

impl ChannelConfig {
    /// Config for `topic` with the default capacity.
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self { topic: topic.into(), ..Self::default() }
    }

    /// Override the buffer size.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { topic: DEFAULT_TOPIC.to_string(), capacity: DEFAULT_CAPACITY }
    }
}
