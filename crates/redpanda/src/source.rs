//! Upstream message source abstraction.

use async_trait::async_trait;
use enricher_core::Result;

/// One message read from the topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub value: Option<Vec<u8>>,
}

impl Message {
    /// Key as text for logging; non-UTF-8 bytes are replaced.
    pub fn key_str(&self) -> String {
        self.key
            .as_deref()
            .map(|k| String::from_utf8_lossy(k).into_owned())
            .unwrap_or_default()
    }
}

/// Something that yields messages one at a time.
///
/// Implemented by [`crate::Consumer`]; tests use in-memory sources.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Next message in delivery order.
    ///
    /// `Ok(None)` means the source is closed. `Err` means the source can no
    /// longer be read and is fatal to the caller.
    async fn next_message(&self) -> Result<Option<Message>>;

    /// Marks a message as processed.
    async fn commit(&self, message: &Message) -> Result<()>;
}
