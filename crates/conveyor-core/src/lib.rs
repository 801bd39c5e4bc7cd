//! # Conveyor
//!
//! Embeddable, backend-agnostic message-queue engine with reliable delivery
//! semantics modeled on cloud queue services.
//!
//! This library provides:
//! - The abstract [`Queue`] contract: enqueue, dequeue, acknowledge, reject
//! - A reference in-memory engine ([`MemoryQueue`]) with at-least-once
//!   delivery, visibility timeouts, receive-count accounting, dead-letter
//!   routing, and retention expiry
//! - A [`QueueFactory`] owning named queue lifecycles within a process
//! - A [`Serializer`] boundary decoupling the in-flight payload type from
//!   the stored representation
//!
//! ## Usage
//!
//! ```rust
//! use conveyor_core::{QueueFactory, Queue};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), conveyor_core::QueueError> {
//! let factory: QueueFactory<String> = QueueFactory::new();
//! let queue = factory.create_queue("jobs")?;
//!
//! queue.enqueue_payload("refresh-cache".to_string()).await?;
//! if let Some(message) = queue.dequeue().await? {
//!     // ... process the payload ...
//!     queue.acknowledge(&message.id).await?;
//! }
//! # factory.dispose_all().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod memory;
pub mod message;
pub mod queue;
pub mod serializer;

pub use config::QueueOptions;
pub use error::{DeserializationError, QueueError, SerializationError};
pub use factory::{QueueFactory, QueueSettings};
pub use memory::MemoryQueue;
pub use message::{MessageId, QueueMessage, QueueName, Timestamp};
pub use queue::{IdGenerator, Queue, UuidIdGenerator};
pub use serializer::{FnSerializer, IdentitySerializer, JsonSerializer, Serializer};
