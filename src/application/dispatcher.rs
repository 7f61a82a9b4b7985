//! Queue consumer that turns storage notifications into transcode jobs.
//!
//! Per message: parse the body, acknowledge probes straight away, submit one
//! job per record in order, and delete the message only once every record was
//! accepted. A message that fails anywhere stays on the queue and comes back
//! after its visibility timeout. Records submitted before the failure are not
//! withdrawn; their requests carry a deterministic idempotency token so the
//! orchestrator can drop the resubmission.

use crate::domain::events::StorageEventEnvelope;
use crate::domain::jobs::{LaunchTarget, TranscodeJobRequest};
use crate::error::DispatchError;
use crate::ports::launcher::JobLauncherPort;
use crate::ports::queue::{MessageQueuePort, QueueMessage};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Messages requested per receive call.
pub const MAX_MESSAGES: i32 = 1;

const RECEIVE_BACKOFF_START: Duration = Duration::from_secs(1);
const RECEIVE_BACKOFF_MAX: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Long-poll wait handed to the queue
    pub wait_time: Duration,
    /// Pause after an empty receive
    pub idle_delay: Duration,
    /// Deadline for one job submission
    pub submit_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            wait_time: Duration::from_secs(10),
            idle_delay: Duration::from_millis(500),
            submit_timeout: Duration::from_secs(30),
        }
    }
}

/// How a message left the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Probe event, deleted without submitting anything.
    ProbeDeleted,
    /// Every record was submitted, then the message was deleted.
    Dispatched { submitted: usize },
}

pub struct DispatchService<Q, L> {
    queue: Q,
    launcher: L,
    target: LaunchTarget,
    settings: PollSettings,
}

impl<Q, L> DispatchService<Q, L>
where
    Q: MessageQueuePort,
    L: JobLauncherPort,
{
    pub fn new(queue: Q, launcher: L, target: LaunchTarget, settings: PollSettings) -> Self {
        Self {
            queue,
            launcher,
            target,
            settings,
        }
    }

    /// Poll until `shutdown` is cancelled. Nothing that happens to a single
    /// message, nor a failed receive, ends the loop.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(target_cluster = %self.target.cluster_id, "Dispatcher started, polling for messages...");
        let mut backoff = RECEIVE_BACKOFF_START;

        while !shutdown.is_cancelled() {
            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.queue.receive(MAX_MESSAGES, self.settings.wait_time) => received,
            };

            match received {
                Ok(messages) if messages.is_empty() => {
                    backoff = RECEIVE_BACKOFF_START;
                    debug!("No messages received");
                    self.pause(self.settings.idle_delay, &shutdown).await;
                }
                Ok(messages) => {
                    backoff = RECEIVE_BACKOFF_START;
                    self.process_batch(&messages).await;
                }
                Err(e) => {
                    let err = DispatchError::Receive(e);
                    error!(retry_in = ?backoff, "{}", err);
                    self.pause(backoff, &shutdown).await;
                    backoff = (backoff * 2).min(RECEIVE_BACKOFF_MAX);
                }
            }
        }

        info!("Dispatcher stopped");
    }

    /// Handle every message of a batch; one failing never skips the rest.
    pub async fn process_batch(&self, messages: &[QueueMessage]) {
        for message in messages {
            match self.process_message(message).await {
                Ok(MessageOutcome::ProbeDeleted) => {
                    info!(message_id = %message.id, "Test event acknowledged");
                }
                Ok(MessageOutcome::Dispatched { submitted }) => {
                    info!(message_id = %message.id, submitted, "Message deleted from the queue");
                }
                Err(e) if e.is_malformed() => {
                    error!(message_id = %message.id, "Error processing message: {}", e);
                }
                Err(e) => {
                    error!(message_id = %message.id, "Error processing message, left for redelivery: {}", e);
                }
            }
        }
    }

    pub async fn process_message(
        &self,
        message: &QueueMessage,
    ) -> Result<MessageOutcome, DispatchError> {
        info!(message_id = %message.id, "Message received");
        let body = message.body.as_deref().ok_or(DispatchError::EmptyBody)?;
        debug!(message_id = %message.id, body, "Message body");

        match StorageEventEnvelope::parse(body)? {
            StorageEventEnvelope::Probe { service, event } => {
                debug!(%service, %event, "Ignoring test event");
                self.acknowledge(message).await?;
                Ok(MessageOutcome::ProbeDeleted)
            }
            StorageEventEnvelope::Notification { records } => {
                if records.is_empty() {
                    warn!(message_id = %message.id, "Notification carries no records");
                }

                for (index, record) in records.iter().enumerate() {
                    let request = TranscodeJobRequest::for_record(record, &self.target);
                    self.submit(&request).await?;
                    info!(
                        message_id = %message.id,
                        record = index,
                        event_name = %record.event_name,
                        "Transcode task started for video: {}",
                        request.object_key
                    );
                }

                self.acknowledge(message).await?;
                Ok(MessageOutcome::Dispatched {
                    submitted: records.len(),
                })
            }
        }
    }

    async fn submit(&self, request: &TranscodeJobRequest) -> Result<(), DispatchError> {
        let submission =
            tokio::time::timeout(self.settings.submit_timeout, self.launcher.submit(request)).await;

        let submitted = match submission {
            Ok(Ok(submitted)) => submitted,
            Ok(Err(source)) => {
                return Err(DispatchError::Submission {
                    bucket: request.bucket_name.clone(),
                    key: request.object_key.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(DispatchError::Submission {
                    bucket: request.bucket_name.clone(),
                    key: request.object_key.clone(),
                    source: format!("timed out after {:?}", self.settings.submit_timeout).into(),
                })
            }
        };

        for task_id in &submitted.task_ids {
            debug!(task_arn = %task_id, key = %request.object_key, "Task accepted");
        }
        Ok(())
    }

    async fn acknowledge(&self, message: &QueueMessage) -> Result<(), DispatchError> {
        self.queue
            .delete(&message.receipt_handle)
            .await
            .map_err(|source| DispatchError::Delete {
                message_id: message.id.clone(),
                source,
            })
    }

    async fn pause(&self, duration: Duration, shutdown: &CancellationToken) {
        if duration.is_zero() {
            return;
        }
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = tokio::time::sleep(duration) => {}
        }
    }
}
