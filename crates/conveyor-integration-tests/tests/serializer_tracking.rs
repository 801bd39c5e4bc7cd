//! Integration tests for the serialization boundary
//!
//! These tests verify:
//! - Enqueue serializes exactly once and dequeue deserializes exactly once
//!   (Scenario S6)
//! - Payload equality holds across the round trip

mod common;

use bytes::Bytes;
use common::{sample_order, CountingJsonSerializer, Order};
use conveyor_core::{Queue, QueueFactory};
use std::sync::Arc;

/// Verify serializer call accounting across one produce/consume cycle.
#[tokio::test]
async fn test_serializer_call_accounting() {
    let serializer = Arc::new(CountingJsonSerializer::new());
    let factory: QueueFactory<Order, Bytes> = QueueFactory::with_serializer(serializer.clone());
    let queue = factory.create_queue("orders").unwrap();

    queue.enqueue_payload(sample_order()).await.unwrap();
    assert_eq!(serializer.counts(), (1, 0));

    let message = queue.dequeue().await.unwrap().expect("order expected");
    assert_eq!(serializer.counts(), (1, 1));
    assert_eq!(message.payload, sample_order());

    factory.dispose_all().await;
}
