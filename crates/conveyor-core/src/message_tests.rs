//! Tests for message types and domain identifiers.

use super::*;
use std::collections::hash_map::DefaultHasher;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// Domain Identifier Tests
// ============================================================================

mod identifiers {
    use super::*;

    /// Verify that generated message ids are canonical hyphenated UUIDs.
    #[test]
    fn test_message_id_is_canonical_uuid() {
        let id = MessageId::new();
        assert_eq!(id.as_str().len(), 36);
        assert_eq!(id.as_str().matches('-').count(), 4);
    }

    /// Verify that consecutive generated ids differ.
    #[test]
    fn test_message_id_uniqueness() {
        let first = MessageId::new();
        let second = MessageId::new();
        assert_ne!(first, second);
    }

    /// Verify conversion from caller-supplied strings.
    #[test]
    fn test_message_id_from_string() {
        let id = MessageId::from("order-42");
        assert_eq!(id.as_str(), "order-42");
        assert_eq!(id.to_string(), "order-42");
    }

    /// Verify queue name construction and display.
    #[test]
    fn test_queue_name_round_trip() {
        let name = QueueName::new("orders");
        assert_eq!(name.as_str(), "orders");
        assert_eq!(name, QueueName::from("orders"));
        assert_eq!(name.to_string(), "orders");
    }

    /// Verify timestamp ordering follows wall-clock order.
    #[test]
    fn test_timestamp_ordering() {
        let earlier = Timestamp::from_datetime(Utc::now() - Duration::seconds(5));
        let later = Timestamp::now();
        assert!(earlier < later);
    }

    /// Verify that age is positive for past timestamps and negative for
    /// future ones.
    #[test]
    fn test_timestamp_age_sign() {
        let past = Timestamp::from_datetime(Utc::now() - Duration::seconds(10));
        assert!(past.age() > Duration::seconds(9));

        let future = Timestamp::from_datetime(Utc::now() + Duration::seconds(10));
        assert!(future.age() < Duration::zero());
    }
}

// ============================================================================
// Message Envelope Tests
// ============================================================================

mod envelope {
    use super::*;

    /// Verify that a fresh message carries a generated id and no delivery
    /// metadata.
    #[test]
    fn test_new_message_defaults() {
        let message = QueueMessage::new("payload");
        assert!(!message.id.as_str().is_empty());
        assert!(message.processed_at.is_none());
    }

    /// Verify builder overrides for id and creation time.
    #[test]
    fn test_builder_overrides() {
        let created_at = Timestamp::from_datetime(Utc::now() - Duration::seconds(60));
        let message = QueueMessage::new("payload")
            .with_id("replay-1")
            .with_created_at(created_at);

        assert_eq!(message.id, MessageId::from("replay-1"));
        assert_eq!(message.created_at, created_at);
    }

    /// Verify reconstruction from stored parts.
    #[test]
    fn test_from_parts() {
        let created_at = Timestamp::now();
        let message = QueueMessage::from_parts(MessageId::from("m-1"), 7u32, created_at);

        assert_eq!(message.id.as_str(), "m-1");
        assert_eq!(message.payload, 7);
        assert_eq!(message.created_at, created_at);
        assert!(message.processed_at.is_none());
    }
}

// ============================================================================
// Equality and Hashing Tests
// ============================================================================

mod equality {
    use super::*;

    /// Verify that messages with equal id, payload, and creation time are
    /// equal.
    #[test]
    fn test_equal_triples_are_equal() {
        let created_at = Timestamp::now();
        let a = QueueMessage::from_parts(MessageId::from("m-1"), "data", created_at);
        let b = QueueMessage::from_parts(MessageId::from("m-1"), "data", created_at);
        assert_eq!(a, b);
    }

    /// Verify that any differing component breaks equality.
    #[test]
    fn test_differing_components_are_unequal() {
        let created_at = Timestamp::now();
        let base = QueueMessage::from_parts(MessageId::from("m-1"), "data", created_at);

        let other_id = QueueMessage::from_parts(MessageId::from("m-2"), "data", created_at);
        assert_ne!(base, other_id);

        let other_payload = QueueMessage::from_parts(MessageId::from("m-1"), "else", created_at);
        assert_ne!(base, other_payload);

        let other_time = QueueMessage::from_parts(
            MessageId::from("m-1"),
            "data",
            Timestamp::from_datetime(created_at.as_datetime() + Duration::seconds(1)),
        );
        assert_ne!(base, other_time);
    }

    /// Verify that delivery metadata never participates in equality.
    #[test]
    fn test_processed_at_is_ignored() {
        let created_at = Timestamp::now();
        let plain = QueueMessage::from_parts(MessageId::from("m-1"), "data", created_at);
        let mut stamped = QueueMessage::from_parts(MessageId::from("m-1"), "data", created_at);
        stamped.processed_at = Some(Timestamp::now());

        assert_eq!(plain, stamped);
        assert_eq!(hash_of(&plain), hash_of(&stamped));
    }

    /// Verify hash consistency: equal messages hash identically.
    #[test]
    fn test_equal_messages_hash_identically() {
        let created_at = Timestamp::now();
        let a = QueueMessage::from_parts(MessageId::from("m-1"), "data", created_at);
        let b = QueueMessage::from_parts(MessageId::from("m-1"), "data", created_at);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
