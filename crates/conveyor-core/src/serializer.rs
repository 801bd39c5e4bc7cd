//! Payload serialization boundary.
//!
//! A [`Serializer`] bridges the in-flight payload type `T` and the stored
//! representation `S`. It is a capability handed to a queue at construction,
//! not a trait the payload type must implement: any pair of conversion
//! functions will do.

use crate::error::{DeserializationError, SerializationError};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

#[cfg(test)]
#[path = "serializer_tests.rs"]
mod tests;

/// Converts payloads between their in-flight type `T` and the stored
/// representation `S`. Either direction may fail.
pub trait Serializer<T, S>: Send + Sync {
    /// Convert a payload into its stored representation
    fn serialize(&self, payload: &T) -> Result<S, SerializationError>;

    /// Convert a stored representation back into a payload
    fn deserialize(&self, stored: &S) -> Result<T, DeserializationError>;
}

/// Pass-through serializer for queues that store payloads as-is (`S = T`).
///
/// Installed automatically when a queue is constructed without an explicit
/// serializer, so the `T = S` requirement holds by construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySerializer;

impl IdentitySerializer {
    /// Create a new identity serializer
    pub fn new() -> Self {
        Self
    }
}

impl<T: Clone + Send + Sync> Serializer<T, T> for IdentitySerializer {
    fn serialize(&self, payload: &T) -> Result<T, SerializationError> {
        Ok(payload.clone())
    }

    fn deserialize(&self, stored: &T) -> Result<T, DeserializationError> {
        Ok(stored.clone())
    }
}

/// Serializer that stores payloads as JSON-encoded bytes.
pub struct JsonSerializer<T> {
    _payload: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    /// Create a new JSON serializer
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Serializer<T, Bytes> for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, payload: &T) -> Result<Bytes, SerializationError> {
        serde_json::to_vec(payload)
            .map(Bytes::from)
            .map_err(|e| SerializationError::new("cannot encode payload as JSON").with_source(e))
    }

    fn deserialize(&self, stored: &Bytes) -> Result<T, DeserializationError> {
        serde_json::from_slice(stored).map_err(|e| {
            DeserializationError::new("cannot decode stored JSON payload")
                .with_stored(String::from_utf8_lossy(stored))
                .with_source(e)
        })
    }
}

/// Adapts a pair of function values into a [`Serializer`].
pub struct FnSerializer<F, G> {
    serialize: F,
    deserialize: G,
}

impl<F, G> FnSerializer<F, G> {
    /// Create a serializer from a serialize/deserialize function pair
    pub fn new(serialize: F, deserialize: G) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }
}

impl<T, S, F, G> Serializer<T, S> for FnSerializer<F, G>
where
    F: Fn(&T) -> Result<S, SerializationError> + Send + Sync,
    G: Fn(&S) -> Result<T, DeserializationError> + Send + Sync,
{
    fn serialize(&self, payload: &T) -> Result<S, SerializationError> {
        (self.serialize)(payload)
    }

    fn deserialize(&self, stored: &S) -> Result<T, DeserializationError> {
        (self.deserialize)(stored)
    }
}
