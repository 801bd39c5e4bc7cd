//! Per-queue delivery policy.

use chrono::Duration;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Delivery policy for a single queue.
///
/// Controls how many times a message may be received before it is considered
/// poisoned, how long a dequeued message stays invisible, and how long a
/// message may live before it is silently purged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOptions {
    /// Upper bound on successful dequeues per message. The first dequeue
    /// whose post-increment receive count strictly exceeds this value routes
    /// the message to the dead-letter queue (or drops it).
    pub max_receive_count: u32,
    /// How long a dequeued message remains invisible before it is
    /// automatically restored.
    pub visibility_timeout: Duration,
    /// Maximum age from creation. Expired messages are silently dropped at
    /// enqueue and during sweeps. `None` disables retention.
    pub message_retention_period: Option<Duration>,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            max_receive_count: 3,
            visibility_timeout: Duration::seconds(30),
            message_retention_period: None,
        }
    }
}

impl QueueOptions {
    /// Preset for high-volume consumers: more redelivery attempts and a
    /// visibility window long enough for slow handlers.
    pub fn high_throughput() -> Self {
        Self {
            max_receive_count: 5,
            visibility_timeout: Duration::minutes(2),
            message_retention_period: None,
        }
    }

    /// Preset for tests: tight timeouts so redelivery and retention paths
    /// can be exercised without long sleeps.
    pub fn testing() -> Self {
        Self {
            max_receive_count: 2,
            visibility_timeout: Duration::milliseconds(100),
            message_retention_period: Some(Duration::minutes(5)),
        }
    }

    /// Set the maximum receive count
    pub fn with_max_receive_count(mut self, count: u32) -> Self {
        self.max_receive_count = count;
        self
    }

    /// Set the visibility timeout
    pub fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = timeout;
        self
    }

    /// Set the message retention period
    pub fn with_message_retention_period(mut self, period: Duration) -> Self {
        self.message_retention_period = Some(period);
        self
    }
}
