use crate::ports::queue::{MessageQueuePort, QueueMessage};
use crate::ports::PortError;
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use std::time::Duration;
use tracing::warn;

/// SqsAdapter implements MessageQueuePort for AWS SQS.
#[derive(Clone)]
pub struct SqsAdapter {
    client: Client,
    queue_url: String,
}

impl SqsAdapter {
    pub fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl MessageQueuePort for SqsAdapter {
    async fn receive(
        &self,
        max_messages: i32,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, PortError> {
        let wait_time = i32::try_from(wait.as_secs()).unwrap_or(20);
        let resp = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_time)
            .send()
            .await?;

        let messages = resp
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|msg| {
                let id = msg.message_id().unwrap_or_default().to_string();
                match msg.receipt_handle() {
                    Some(receipt_handle) => Some(QueueMessage {
                        receipt_handle: receipt_handle.to_string(),
                        body: msg.body().map(str::to_string),
                        id,
                    }),
                    None => {
                        warn!(message_id = %id, "Dropping message without receipt handle");
                        None
                    }
                }
            })
            .collect();

        Ok(messages)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), PortError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await?;
        Ok(())
    }
}
