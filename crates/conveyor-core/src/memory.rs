//! In-memory reference queue engine.
//!
//! This module provides a fully functional in-memory queue that:
//! - Preserves FIFO order among visible messages
//! - Implements visibility timeouts and receive-count accounting
//! - Routes poisoned messages to an optional dead-letter queue
//! - Silently purges records past their retention period
//!
//! The engine is intended for embedding, testing, and as the reference
//! implementation for backend adapters.

use crate::config::QueueOptions;
use crate::error::QueueError;
use crate::message::{MessageId, QueueMessage, QueueName, Timestamp};
use crate::queue::{IdGenerator, Queue, UuidIdGenerator};
use crate::serializer::{IdentitySerializer, Serializer};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

/// Period of the background sweep. The sweep only bounds the footprint of
/// idle queues; `dequeue` performs the same reclamation inline.
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

// ============================================================================
// Internal Storage Structures
// ============================================================================

/// A record held in the queue: the stored payload plus the identity and
/// creation time of the message it came from.
#[derive(Debug, Clone)]
struct StoredRecord<S> {
    id: MessageId,
    payload: S,
    created_at: Timestamp,
}

/// Mutable queue state: the FIFO sequence plus the visibility and
/// receive-count side tables.
struct QueueState<S> {
    /// Main message sequence (FIFO order)
    records: VecDeque<StoredRecord<S>>,
    /// Absolute invisibility deadline per id; absence means visible
    invisible_until: HashMap<MessageId, Timestamp>,
    /// Successful dequeues per id since insertion into this queue
    receive_count: HashMap<MessageId, u32>,
}

/// Outcome of one head-first scan over the sequence.
enum DeliveryStep<S> {
    /// No visible message exists
    Empty,
    /// This record's receive count exceeded the maximum; it has been removed
    /// and must be routed (dead-letter queue or drop)
    Poisoned(StoredRecord<S>),
    /// This record was made invisible and is ready to surface to the caller
    Deliver(StoredRecord<S>),
}

impl<S: Clone> QueueState<S> {
    fn new() -> Self {
        Self {
            records: VecDeque::new(),
            invisible_until: HashMap::new(),
            receive_count: HashMap::new(),
        }
    }

    /// Remove records older than the retention period, with their
    /// side-table entries. Returns how many were purged.
    fn sweep_retention(&mut self, now: Timestamp, retention: chrono::Duration) -> usize {
        let cutoff = now.as_datetime() - retention;
        let invisible_until = &mut self.invisible_until;
        let receive_count = &mut self.receive_count;
        let mut purged = 0;
        self.records.retain(|record| {
            let expired = record.created_at.as_datetime() < cutoff;
            if expired {
                invisible_until.remove(&record.id);
                receive_count.remove(&record.id);
                purged += 1;
            }
            !expired
        });
        purged
    }

    /// Drop invisibility entries whose deadline has passed, making the
    /// corresponding messages visible again.
    fn restore_visibility(&mut self, now: Timestamp) {
        self.invisible_until.retain(|_, deadline| *deadline > now);
    }

    /// Scan the sequence head-first for the first visible record. The
    /// receive count is incremented before the poison comparison, so a
    /// message is routed on the first dequeue whose post-increment count
    /// strictly exceeds `max_receive_count`.
    fn next_delivery(&mut self, now: Timestamp, options: &QueueOptions) -> DeliveryStep<S> {
        let mut idx = 0;
        while idx < self.records.len() {
            let id = self.records[idx].id.clone();
            let invisible = self
                .invisible_until
                .get(&id)
                .is_some_and(|deadline| *deadline > now);
            if invisible {
                idx += 1;
                continue;
            }

            let count = self.receive_count.entry(id.clone()).or_insert(0);
            *count += 1;
            if *count > options.max_receive_count {
                self.invisible_until.remove(&id);
                self.receive_count.remove(&id);
                let Some(record) = self.records.remove(idx) else {
                    break;
                };
                return DeliveryStep::Poisoned(record);
            }

            let deadline =
                Timestamp::from_datetime(now.as_datetime() + options.visibility_timeout);
            self.invisible_until.insert(id, deadline);
            return DeliveryStep::Deliver(self.records[idx].clone());
        }
        DeliveryStep::Empty
    }

    /// Remove a record from the sequence by id, leaving the side tables to
    /// the caller.
    fn take_record(&mut self, id: &MessageId) -> Option<StoredRecord<S>> {
        let idx = self.records.iter().position(|record| record.id == *id)?;
        self.records.remove(idx)
    }

    fn clear(&mut self) {
        self.records.clear();
        self.invisible_until.clear();
        self.receive_count.clear();
    }
}

// ============================================================================
// MemoryQueue
// ============================================================================

/// Reference in-memory queue with at-least-once delivery.
///
/// `T` is the in-flight payload type, `S` the stored representation. When
/// the two coincide, [`MemoryQueue::new`] stores payloads as-is; otherwise a
/// [`Serializer`] bridges the boundary.
pub struct MemoryQueue<T, S = T> {
    name: QueueName,
    options: QueueOptions,
    serializer: Arc<dyn Serializer<T, S>>,
    id_generator: Arc<dyn IdGenerator>,
    dead_letter: Option<Arc<dyn Queue<T>>>,
    state: Arc<Mutex<QueueState<S>>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<T, S> std::fmt::Debug for MemoryQueue<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryQueue")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T, S> MemoryQueue<T, S>
where
    S: Clone + Send + 'static,
{
    /// Create a queue that converts payloads through the given serializer
    pub fn with_serializer(
        name: impl Into<QueueName>,
        options: QueueOptions,
        serializer: Arc<dyn Serializer<T, S>>,
    ) -> Self {
        let name = name.into();
        let state = Arc::new(Mutex::new(QueueState::new()));
        let sweeper = spawn_sweeper(
            Arc::downgrade(&state),
            name.clone(),
            options.message_retention_period,
        );
        Self {
            name,
            options,
            serializer,
            id_generator: Arc::new(UuidIdGenerator::new()),
            dead_letter: None,
            state,
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Attach a dead-letter queue for poisoned messages. The reference is
    /// non-owning: disposing this queue leaves the dead-letter queue intact.
    pub fn with_dead_letter(mut self, dead_letter: Arc<dyn Queue<T>>) -> Self {
        self.dead_letter = Some(dead_letter);
        self
    }

    /// Override the id generator used by `enqueue_payload`
    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// The name this queue was created under
    pub fn name(&self) -> &QueueName {
        &self.name
    }

    /// The delivery policy this queue was created with
    pub fn options(&self) -> &QueueOptions {
        &self.options
    }

    fn state(&self) -> MutexGuard<'_, QueueState<S>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> MemoryQueue<T, T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a queue that stores payloads as-is (no serializer)
    pub fn new(name: impl Into<QueueName>, options: QueueOptions) -> Self {
        Self::with_serializer(name, options, Arc::new(IdentitySerializer::new()))
    }
}

/// Spawn the periodic sweep task. Without a running tokio runtime the task
/// is skipped; the dequeue-time sweep alone keeps the queue correct.
fn spawn_sweeper<S: Clone + Send + 'static>(
    state: Weak<Mutex<QueueState<S>>>,
    name: QueueName,
    retention: Option<chrono::Duration>,
) -> Option<JoinHandle<()>> {
    let runtime = tokio::runtime::Handle::try_current().ok()?;
    Some(runtime.spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(state) = state.upgrade() else {
                break;
            };
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            let now = Timestamp::now();
            if let Some(retention) = retention {
                let purged = state.sweep_retention(now, retention);
                if purged > 0 {
                    trace!(queue = %name, purged, "retention sweep purged expired messages");
                }
            }
            state.restore_visibility(now);
        }
    }))
}

#[async_trait]
impl<T, S> Queue<T> for MemoryQueue<T, S>
where
    T: Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
{
    async fn enqueue(&self, message: QueueMessage<T>) -> Result<(), QueueError> {
        // A message already past retention is accepted and discarded, so
        // producers can replay stale records without side effect. Future
        // creation times count as not yet expired.
        if let Some(retention) = self.options.message_retention_period {
            if message.created_at.age() > retention {
                debug!(
                    queue = %self.name,
                    msg_id = %message.id,
                    "discarding retention-expired message at enqueue"
                );
                return Ok(());
            }
        }

        let stored = self.serializer.serialize(&message.payload)?;
        let record = StoredRecord {
            id: message.id.clone(),
            payload: stored,
            created_at: message.created_at,
        };

        let mut state = self.state();
        state.receive_count.insert(record.id.clone(), 0);
        state.records.push_back(record);
        drop(state);

        trace!(queue = %self.name, msg_id = %message.id, "message enqueued");
        Ok(())
    }

    async fn enqueue_payload(&self, payload: T) -> Result<MessageId, QueueError> {
        let id = self.id_generator.generate();
        let message = QueueMessage::from_parts(id.clone(), payload, Timestamp::now());
        self.enqueue(message).await?;
        Ok(id)
    }

    async fn dequeue(&self) -> Result<Option<QueueMessage<T>>, QueueError> {
        loop {
            let now = Timestamp::now();
            // The state lock is released before any dead-letter enqueue is
            // awaited; a poisoned record is already out of this queue by
            // then, so no observer can see it in both places.
            let step = {
                let mut state = self.state();
                if let Some(retention) = self.options.message_retention_period {
                    state.sweep_retention(now, retention);
                }
                state.restore_visibility(now);
                state.next_delivery(now, &self.options)
            };

            match step {
                DeliveryStep::Empty => return Ok(None),
                DeliveryStep::Poisoned(record) => {
                    debug!(
                        queue = %self.name,
                        msg_id = %record.id,
                        max_receive_count = self.options.max_receive_count,
                        "receive count exceeded, routing message out of the queue"
                    );
                    if let Some(dead_letter) = &self.dead_letter {
                        let payload = self.serializer.deserialize(&record.payload)?;
                        let message =
                            QueueMessage::from_parts(record.id, payload, record.created_at);
                        dead_letter.enqueue(message).await?;
                    }
                }
                DeliveryStep::Deliver(record) => {
                    let payload = self.serializer.deserialize(&record.payload)?;
                    let mut message =
                        QueueMessage::from_parts(record.id, payload, record.created_at);
                    message.processed_at = Some(now);
                    trace!(queue = %self.name, msg_id = %message.id, "message dequeued");
                    return Ok(Some(message));
                }
            }
        }
    }

    async fn acknowledge(&self, id: &MessageId) -> Result<(), QueueError> {
        let mut state = self.state();
        if state.take_record(id).is_none() {
            return Err(QueueError::MessageNotFound {
                message_id: id.clone(),
            });
        }
        state.invisible_until.remove(id);
        state.receive_count.remove(id);
        drop(state);

        trace!(queue = %self.name, msg_id = %id, "message acknowledged");
        Ok(())
    }

    async fn reject(&self, id: &MessageId, requeue: bool) -> Result<QueueMessage<T>, QueueError> {
        let record = {
            let mut state = self.state();
            let record =
                state
                    .take_record(id)
                    .ok_or_else(|| QueueError::MessageNotFound {
                        message_id: id.clone(),
                    })?;
            state.invisible_until.remove(id);
            if requeue {
                // Back to the tail, immediately visible; the receive count
                // is preserved so repeated failures still poison the message.
                state.records.push_back(record.clone());
            } else {
                state.receive_count.remove(id);
            }
            record
        };

        let payload = self.serializer.deserialize(&record.payload)?;
        debug!(queue = %self.name, msg_id = %id, requeue, "message rejected");
        Ok(QueueMessage::from_parts(record.id, payload, record.created_at))
    }

    async fn dispose(&self) {
        if let Some(handle) = self
            .sweeper
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
        self.state().clear();
        debug!(queue = %self.name, "queue disposed");
    }
}

impl<T, S> Drop for MemoryQueue<T, S> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .sweeper
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}
