//! Message types and core domain identifiers.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Unique identifier for messages within a queue's lifetime.
///
/// Ids are assigned either by the caller or by the queue's id generator; the
/// default generator produces random UUIDs in canonical hyphenated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Generate new random message ID
    pub fn new() -> Self {
        let id = uuid::Uuid::new_v4();
        Self(id.to_string())
    }

    /// Get message ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Name under which a queue is registered with a factory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueName(String);

impl QueueName {
    /// Create a new queue name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get queue name as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for QueueName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for QueueName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Timestamp wrapper for consistent time handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp for current time
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create timestamp from DateTime
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get underlying DateTime
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Elapsed time from this timestamp until now. Negative for timestamps
    /// in the future.
    pub fn age(&self) -> Duration {
        Utc::now() - self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.3f UTC"))
    }
}

// ============================================================================
// Message Envelope
// ============================================================================

/// A message travelling through a queue.
///
/// The envelope is conceptually immutable once created: `dequeue` returns a
/// copy stamped with `processed_at`, while the stored record keeps only the
/// id, payload, and creation time.
#[derive(Debug, Clone)]
pub struct QueueMessage<T> {
    pub id: MessageId,
    pub payload: T,
    pub created_at: Timestamp,
    /// Time of the most recent dequeue. Present only on copies returned to
    /// consumers, never on stored records.
    pub processed_at: Option<Timestamp>,
}

impl<T> QueueMessage<T> {
    /// Create new message with a freshly generated id and `created_at = now`
    pub fn new(payload: T) -> Self {
        Self {
            id: MessageId::new(),
            payload,
            created_at: Timestamp::now(),
            processed_at: None,
        }
    }

    /// Rebuild a message from its stored parts (adapters, dead-letter routing)
    pub fn from_parts(id: MessageId, payload: T, created_at: Timestamp) -> Self {
        Self {
            id,
            payload,
            created_at,
            processed_at: None,
        }
    }

    /// Override the message id
    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = id.into();
        self
    }

    /// Override the creation time (replaying historical records)
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }
}

// Equality and hashing are defined over (id, payload, created_at) only;
// `processed_at` is delivery metadata and never participates.
impl<T: PartialEq> PartialEq for QueueMessage<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.payload == other.payload
            && self.created_at == other.created_at
    }
}

impl<T: Eq> Eq for QueueMessage<T> {}

impl<T: Hash> Hash for QueueMessage<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.payload.hash(state);
        self.created_at.hash(state);
    }
}
