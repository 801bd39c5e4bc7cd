//! Error types for queue operations.

use crate::message::{MessageId, QueueName};
use thiserror::Error;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// A payload could not be converted into its stored representation.
#[derive(Debug, Error)]
#[error("serialization failed: {message}")]
pub struct SerializationError {
    message: String,
    #[source]
    source: Option<BoxedCause>,
}

impl SerializationError {
    /// Create a new serialization error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Human-readable description of the failure
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A stored payload could not be converted back into the in-flight type.
#[derive(Debug, Error)]
#[error("deserialization failed: {message}")]
pub struct DeserializationError {
    message: String,
    stored: Option<String>,
    #[source]
    source: Option<BoxedCause>,
}

impl DeserializationError {
    /// Create a new deserialization error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stored: None,
            source: None,
        }
    }

    /// Attach a rendering of the raw stored data that failed to convert
    pub fn with_stored(mut self, stored: impl Into<String>) -> Self {
        self.stored = Some(stored.into());
        self
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Human-readable description of the failure
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw stored data, when the serializer could render it
    pub fn stored_data(&self) -> Option<&str> {
        self.stored.as_deref()
    }
}

/// Comprehensive error type for all queue and factory operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("message not found: {message_id}")]
    MessageNotFound { message_id: MessageId },

    #[error("queue already exists: {queue_name}")]
    QueueAlreadyExists { queue_name: QueueName },

    #[error("queue does not exist: {queue_name}")]
    QueueDoesNotExist { queue_name: QueueName },

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Deserialization(#[from] DeserializationError),
}

impl QueueError {
    /// Check whether this error reports an unknown message id
    pub fn is_message_not_found(&self) -> bool {
        matches!(self, Self::MessageNotFound { .. })
    }
}
