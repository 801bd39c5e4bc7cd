//! Process-local registry of named queues.

use crate::config::QueueOptions;
use crate::error::QueueError;
use crate::memory::MemoryQueue;
use crate::message::QueueName;
use crate::queue::{IdGenerator, Queue, UuidIdGenerator};
use crate::serializer::{IdentitySerializer, Serializer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;

/// Per-queue construction settings, overriding the factory defaults.
pub struct QueueSettings<T, S = T> {
    /// Delivery policy for the queue
    pub options: QueueOptions,
    /// Dead-letter queue for poisoned messages
    pub dead_letter: Option<Arc<dyn Queue<T>>>,
    /// Id generator for `enqueue_payload`; falls back to the factory default
    pub id_generator: Option<Arc<dyn IdGenerator>>,
    /// Payload serializer; falls back to the factory default
    pub serializer: Option<Arc<dyn Serializer<T, S>>>,
}

impl<T, S> Default for QueueSettings<T, S> {
    fn default() -> Self {
        Self {
            options: QueueOptions::default(),
            dead_letter: None,
            id_generator: None,
            serializer: None,
        }
    }
}

impl<T, S> QueueSettings<T, S> {
    /// Create settings with the default delivery policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delivery policy
    pub fn with_options(mut self, options: QueueOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a dead-letter queue
    pub fn with_dead_letter(mut self, dead_letter: Arc<dyn Queue<T>>) -> Self {
        self.dead_letter = Some(dead_letter);
        self
    }

    /// Override the factory's id generator for this queue
    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    /// Override the factory's serializer for this queue
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer<T, S>>) -> Self {
        self.serializer = Some(serializer);
        self
    }
}

/// Owns named queues for one payload/stored type pair.
///
/// The factory hands out shared references to the queues it creates and is
/// responsible for their disposal. Because the registry is parameterized by
/// `(T, S)`, retrieving a queue under a different type pair is a compile
/// error rather than a runtime failure.
pub struct QueueFactory<T, S = T> {
    registry: Mutex<HashMap<QueueName, Arc<MemoryQueue<T, S>>>>,
    default_serializer: Arc<dyn Serializer<T, S>>,
    default_id_generator: Arc<dyn IdGenerator>,
}

impl<T, S> QueueFactory<T, S>
where
    T: Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
{
    /// Create a factory whose queues default to the given serializer
    pub fn with_serializer(serializer: Arc<dyn Serializer<T, S>>) -> Self {
        Self {
            registry: Mutex::new(HashMap::new()),
            default_serializer: serializer,
            default_id_generator: Arc::new(UuidIdGenerator::new()),
        }
    }

    /// Set the default id generator applied to queues this factory creates
    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.default_id_generator = id_generator;
        self
    }

    /// Create and register a queue with the default settings.
    ///
    /// Fails with [`QueueError::QueueAlreadyExists`] if the name is taken.
    pub fn create_queue(
        &self,
        name: impl Into<QueueName>,
    ) -> Result<Arc<MemoryQueue<T, S>>, QueueError> {
        self.create_queue_with(name, QueueSettings::default())
    }

    /// Create and register a queue with explicit settings.
    ///
    /// Fails with [`QueueError::QueueAlreadyExists`] if the name is taken.
    pub fn create_queue_with(
        &self,
        name: impl Into<QueueName>,
        settings: QueueSettings<T, S>,
    ) -> Result<Arc<MemoryQueue<T, S>>, QueueError> {
        let name = name.into();
        let mut registry = self.lock_registry();
        if registry.contains_key(&name) {
            return Err(QueueError::QueueAlreadyExists { queue_name: name });
        }

        let serializer = settings
            .serializer
            .unwrap_or_else(|| self.default_serializer.clone());
        let id_generator = settings
            .id_generator
            .unwrap_or_else(|| self.default_id_generator.clone());

        let mut queue = MemoryQueue::with_serializer(name.clone(), settings.options, serializer)
            .with_id_generator(id_generator);
        if let Some(dead_letter) = settings.dead_letter {
            queue = queue.with_dead_letter(dead_letter);
        }

        let queue = Arc::new(queue);
        registry.insert(name.clone(), queue.clone());
        drop(registry);

        info!(queue = %name, "queue created");
        Ok(queue)
    }

    /// Retrieve a previously registered queue. The same reference is
    /// returned for the same name across calls.
    ///
    /// Fails with [`QueueError::QueueDoesNotExist`] for unregistered names.
    pub fn get_queue(
        &self,
        name: impl Into<QueueName>,
    ) -> Result<Arc<MemoryQueue<T, S>>, QueueError> {
        let name = name.into();
        self.lock_registry()
            .get(&name)
            .cloned()
            .ok_or(QueueError::QueueDoesNotExist { queue_name: name })
    }

    /// Unregister and dispose a queue.
    ///
    /// Fails with [`QueueError::QueueDoesNotExist`] for unregistered names.
    pub async fn delete_queue(&self, name: impl Into<QueueName>) -> Result<(), QueueError> {
        let name = name.into();
        let queue = self
            .lock_registry()
            .remove(&name)
            .ok_or_else(|| QueueError::QueueDoesNotExist {
                queue_name: name.clone(),
            })?;

        queue.dispose().await;
        info!(queue = %name, "queue deleted");
        Ok(())
    }

    /// Dispose every registered queue and clear the registry
    pub async fn dispose_all(&self) {
        let queues: Vec<_> = self.lock_registry().drain().collect();
        for (name, queue) in queues {
            queue.dispose().await;
            debug!(queue = %name, "queue disposed");
        }
    }

    /// Number of currently registered queues
    pub fn queue_count(&self) -> usize {
        self.lock_registry().len()
    }

    fn lock_registry(&self) -> MutexGuard<'_, HashMap<QueueName, Arc<MemoryQueue<T, S>>>> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> QueueFactory<T, T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a factory whose queues store payloads as-is (no serializer)
    pub fn new() -> Self {
        Self::with_serializer(Arc::new(IdentitySerializer::new()))
    }
}

impl<T> Default for QueueFactory<T, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
