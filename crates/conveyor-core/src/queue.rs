//! The abstract queue contract.

use crate::error::QueueError;
use crate::message::{MessageId, QueueMessage};
use async_trait::async_trait;

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

/// Main interface for queue operations across all backends.
///
/// Implementations must make every operation behave as if serialized against
/// other operations on the same queue instance, and must deliver each
/// successfully enqueued message at least once (bounded by the configured
/// maximum receive count).
#[async_trait]
pub trait Queue<T>: Send + Sync {
    /// Append a message to the queue's tail.
    ///
    /// Messages whose age already exceeds the retention period are accepted
    /// and silently discarded, so producers may replay stale records without
    /// side effect.
    async fn enqueue(&self, message: QueueMessage<T>) -> Result<(), QueueError>;

    /// Wrap a bare payload in a message with a generated id and the current
    /// time, then enqueue it. Returns the assigned id.
    async fn enqueue_payload(&self, payload: T) -> Result<MessageId, QueueError>;

    /// Return the first visible message and make it invisible for the
    /// configured visibility timeout. `None` when no visible, non-poisoned
    /// message exists.
    async fn dequeue(&self) -> Result<Option<QueueMessage<T>>, QueueError>;

    /// Permanently remove a previously dequeued message.
    async fn acknowledge(&self, id: &MessageId) -> Result<(), QueueError>;

    /// Give up on a previously dequeued message. With `requeue` the message
    /// returns to the tail, immediately visible, with its receive count
    /// preserved; without it the message is dropped. Returns the message in
    /// both cases.
    async fn reject(&self, id: &MessageId, requeue: bool) -> Result<QueueMessage<T>, QueueError>;

    /// Stop background work and release resources. The queue must not be
    /// used afterwards.
    async fn dispose(&self);
}

/// Produces message ids for payloads enqueued without an explicit envelope.
///
/// Generators must return non-empty strings that are unique within the
/// queue's lifetime. Any `Fn() -> MessageId` closure qualifies.
pub trait IdGenerator: Send + Sync {
    /// Produce the next message id
    fn generate(&self) -> MessageId;
}

impl<F> IdGenerator for F
where
    F: Fn() -> MessageId + Send + Sync,
{
    fn generate(&self) -> MessageId {
        self()
    }
}

/// Default id generator: random UUIDs in canonical hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl UuidIdGenerator {
    /// Create a new UUID id generator
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> MessageId {
        MessageId::new()
    }
}
