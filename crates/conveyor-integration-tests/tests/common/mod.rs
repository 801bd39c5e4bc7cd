//! Common test utilities for conveyor integration tests
//!
//! This module provides:
//! - The `Order` payload type used across scenarios
//! - A call-counting serializer wrapper for observing the serialization
//!   boundary

#![allow(dead_code)]

use bytes::Bytes;
use conveyor_core::{
    DeserializationError, JsonSerializer, SerializationError, Serializer,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Payload type used by the end-to-end scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub amount: f64,
}

/// The canonical test order.
pub fn sample_order() -> Order {
    Order {
        id: "ORD-001".to_string(),
        amount: 99.99,
    }
}

/// JSON serializer that counts how often each direction is invoked.
pub struct CountingJsonSerializer {
    inner: JsonSerializer<Order>,
    serialized: AtomicUsize,
    deserialized: AtomicUsize,
}

impl CountingJsonSerializer {
    pub fn new() -> Self {
        Self {
            inner: JsonSerializer::new(),
            serialized: AtomicUsize::new(0),
            deserialized: AtomicUsize::new(0),
        }
    }

    /// (serialize calls, deserialize calls) so far
    pub fn counts(&self) -> (usize, usize) {
        (
            self.serialized.load(Ordering::SeqCst),
            self.deserialized.load(Ordering::SeqCst),
        )
    }
}

impl Default for CountingJsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<Order, Bytes> for CountingJsonSerializer {
    fn serialize(&self, payload: &Order) -> Result<Bytes, SerializationError> {
        self.serialized.fetch_add(1, Ordering::SeqCst);
        self.inner.serialize(payload)
    }

    fn deserialize(&self, stored: &Bytes) -> Result<Order, DeserializationError> {
        self.deserialized.fetch_add(1, Ordering::SeqCst);
        self.inner.deserialize(stored)
    }
}
