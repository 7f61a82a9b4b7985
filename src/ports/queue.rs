use super::PortError;
use async_trait::async_trait;
use std::time::Duration;

/// A single delivery of a queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub id: String,
    /// Raw body; the queue may deliver a message without one.
    pub body: Option<String>,
    /// Token identifying this delivery, required to delete it.
    pub receipt_handle: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageQueuePort: Send + Sync {
    /// Long-poll for up to `max_messages`, waiting at most `wait`.
    /// Returns an empty vector when nothing arrived in time.
    async fn receive(
        &self,
        max_messages: i32,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, PortError>;

    /// Acknowledge a delivery so the queue does not redeliver it.
    async fn delete(&self, receipt_handle: &str) -> Result<(), PortError>;
}
