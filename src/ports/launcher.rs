use super::PortError;
use crate::domain::jobs::TranscodeJobRequest;
use async_trait::async_trait;

/// What the orchestrator handed back for an accepted submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedJob {
    /// Identifiers of the tasks scheduled for the request.
    pub task_ids: Vec<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobLauncherPort: Send + Sync {
    /// Submit a transcode job. Returns once the orchestrator accepted or
    /// rejected it; the job's own outcome is never tracked.
    async fn submit(&self, request: &TranscodeJobRequest) -> Result<SubmittedJob, PortError>;
}
