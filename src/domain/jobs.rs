use super::events::StorageRecord;
use uuid::Uuid;

/// Environment variable the worker reads its source bucket from.
pub const BUCKET_NAME_VAR: &str = "BUCKET_NAME";
/// Environment variable the worker reads its source key from.
pub const KEY_VAR: &str = "KEY";

/// Namespace for deterministic submission tokens.
const SUBMISSION_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_8d3b_4c57_9e20_b1a7_5c3d_e984);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub assign_public_ip: bool,
    pub security_groups: Vec<String>,
    pub subnets: Vec<String>,
}

/// Static part of every job submission, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub cluster_id: String,
    pub task_definition_id: String,
    /// Container inside the task definition that receives the overrides.
    pub container_name: String,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJobRequest {
    pub bucket_name: String,
    pub object_key: String,
    pub cluster_id: String,
    pub task_definition_id: String,
    pub container_name: String,
    pub network: NetworkConfig,
    /// Same record, same token: lets the orchestrator drop a resubmission
    /// caused by queue redelivery.
    pub idempotency_token: String,
}

impl TranscodeJobRequest {
    pub fn for_record(record: &StorageRecord, target: &LaunchTarget) -> Self {
        let bucket_name = record.bucket_name().to_string();
        let object_key = record.object_key();
        let idempotency_token = idempotency_token(
            &bucket_name,
            &object_key,
            &record.event_name,
            record.sequencer(),
        );

        Self {
            bucket_name,
            object_key,
            cluster_id: target.cluster_id.clone(),
            task_definition_id: target.task_definition_id.clone(),
            container_name: target.container_name.clone(),
            network: target.network.clone(),
            idempotency_token,
        }
    }

    /// Variables injected into the worker container.
    pub fn environment_overrides(&self) -> Vec<(&'static str, String)> {
        vec![
            (BUCKET_NAME_VAR, self.bucket_name.clone()),
            (KEY_VAR, self.object_key.clone()),
        ]
    }
}

fn idempotency_token(bucket: &str, key: &str, event_name: &str, sequencer: Option<&str>) -> String {
    let name = format!(
        "{}\n{}\n{}\n{}",
        bucket,
        key,
        event_name,
        sequencer.unwrap_or_default()
    );
    Uuid::new_v5(&SUBMISSION_NAMESPACE, name.as_bytes()).to_string()
}
