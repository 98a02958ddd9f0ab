//! Mock implementations for testing.

use async_trait::async_trait;
use enricher_core::{EnrichedRecord, Error, RawRecord, Result};
use parking_lot::Mutex;
use redpanda::{Message, MessageSource, RecordPublisher};
use std::collections::VecDeque;
use std::sync::Arc;
use store::PersistenceSink;

/// In-memory topic: published records are consumed in publish order.
///
/// Implements both `RecordPublisher` and `MessageSource` so tests can drive
/// the pipeline exactly as a producer would, without a Kafka broker. Once
/// drained the source reports itself closed, or fails if `fail_when_drained`
/// is set.
#[derive(Clone, Default)]
pub struct MockBroker {
    queue: Arc<Mutex<VecDeque<Message>>>,
    next_offset: Arc<Mutex<i64>>,
    committed: Arc<Mutex<Vec<i64>>>,
    fail_when_drained: Arc<Mutex<bool>>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw payload, bypassing record encoding.
    pub fn push_raw(&self, key: &str, value: Vec<u8>) -> i64 {
        let mut next = self.next_offset.lock();
        let offset = *next;
        *next += 1;

        self.queue.lock().push_back(Message {
            partition: 0,
            offset,
            key: Some(key.as_bytes().to_vec()),
            value: Some(value),
        });
        offset
    }

    pub fn committed(&self) -> Vec<i64> {
        self.committed.lock().clone()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn set_fail_when_drained(&self, fail: bool) {
        *self.fail_when_drained.lock() = fail;
    }
}

#[async_trait]
impl RecordPublisher for MockBroker {
    async fn publish(&self, key: &str, record: &RawRecord) -> Result<i64> {
        Ok(self.push_raw(key, record.to_payload()?))
    }
}

#[async_trait]
impl MessageSource for MockBroker {
    async fn next_message(&self) -> Result<Option<Message>> {
        if let Some(message) = self.queue.lock().pop_front() {
            return Ok(Some(message));
        }
        if *self.fail_when_drained.lock() {
            return Err(Error::upstream("Mock broker connection lost"));
        }
        Ok(None)
    }

    async fn commit(&self, message: &Message) -> Result<()> {
        self.committed.lock().push(message.offset);
        Ok(())
    }
}

/// Sink that captures records in memory.
#[derive(Clone, Default)]
pub struct MockSink {
    records: Arc<Mutex<Vec<EnrichedRecord>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured(&self) -> Vec<EnrichedRecord> {
        self.records.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Reject every insert with a constraint error.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

#[async_trait]
impl PersistenceSink for MockSink {
    async fn insert(&self, record: &EnrichedRecord) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(Error::constraint("23505", "Mock sink failure"));
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broker_delivers_in_publish_order() {
        let broker = MockBroker::new();
        broker
            .publish("Key-1", &RawRecord::new("A", "B", "C"))
            .await
            .unwrap();
        broker
            .publish("Key-2", &RawRecord::new("D", "E", "F"))
            .await
            .unwrap();

        let first = broker.next_message().await.unwrap().unwrap();
        let second = broker.next_message().await.unwrap().unwrap();

        assert_eq!(first.offset, 0);
        assert_eq!(first.key_str(), "Key-1");
        assert_eq!(second.offset, 1);
        assert!(broker.next_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sink_failure_mode() {
        let sink = MockSink::new();
        sink.set_should_fail(true);

        let record = EnrichedRecord::new(RawRecord::new("A", "B", "C"), 1, "f".into(), "US".into());
        let err = sink.insert(&record).await.unwrap_err();

        assert_eq!(err.kind(), "constraint");
        assert_eq!(sink.count(), 0);
    }
}
