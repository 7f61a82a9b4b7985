//! Configuration for the dispatcher and worker processes.
//!
//! Values come from the process environment, after an optional `.env` file
//! has been loaded. AWS region and credentials are not read here; the SDK's
//! default provider chain picks them up.

use crate::domain::jobs::{LaunchTarget, NetworkConfig, BUCKET_NAME_VAR, KEY_VAR};
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONTAINER_NAME: &str = "video-transcoder";

/// Configuration for the long-running dispatcher.
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// SQS queue URL receiving S3 notifications
    pub queue_url: String,
    /// Long-poll wait per receive call
    pub wait_time: Duration,
    /// Sleep after a receive that returned nothing
    pub idle_delay: Duration,
    /// Deadline for a single job submission
    pub submit_timeout: Duration,
    /// ECS cluster, task definition and networking for every job
    pub launch_target: LaunchTarget,
}

impl DispatcherConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let wait_secs: u64 = parsed(&lookup, "WAIT_TIME_SECONDS", 10)?;
        if wait_secs > 20 {
            return Err(ConfigError::Invalid {
                name: "WAIT_TIME_SECONDS",
                value: wait_secs.to_string(),
            });
        }

        Ok(Self {
            queue_url: required(&lookup, "SQS_QUEUE_URL")?,
            wait_time: Duration::from_secs(wait_secs),
            idle_delay: Duration::from_millis(parsed(&lookup, "POLL_IDLE_DELAY_MS", 500)?),
            submit_timeout: Duration::from_secs(parsed(&lookup, "SUBMIT_TIMEOUT_SECONDS", 30)?),
            launch_target: LaunchTarget {
                cluster_id: required(&lookup, "CLUSTER")?,
                task_definition_id: required(&lookup, "TASK_DEFINITION")?,
                container_name: lookup("CONTAINER_NAME")
                    .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string()),
                network: NetworkConfig {
                    assign_public_ip: parsed(&lookup, "ASSIGN_PUBLIC_IP", true)?,
                    security_groups: list(&lookup, "SECURITY_GROUPS")?,
                    subnets: list(&lookup, "SUBNETS")?,
                },
            },
        })
    }
}

/// Configuration for one worker run.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Bucket holding the uploaded source
    pub bucket: String,
    /// Key of the uploaded source
    pub key: String,
    /// Bucket receiving the renditions
    pub output_bucket: String,
    /// Prepended to every rendition key
    pub output_prefix: String,
    /// Scratch directory for the source and the renditions
    pub work_dir: PathBuf,
    /// Encoder binary
    pub ffmpeg_path: PathBuf,
    /// Deadline for a single rendition
    pub encode_timeout: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let bucket = required(&lookup, BUCKET_NAME_VAR)?;
        let output_bucket = lookup("OUTPUT_BUCKET")
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| bucket.clone());

        Ok(Self {
            key: required(&lookup, KEY_VAR)?,
            bucket,
            output_bucket,
            output_prefix: lookup("OUTPUT_PREFIX").unwrap_or_default(),
            work_dir: PathBuf::from(lookup("WORK_DIR").unwrap_or_else(|| String::from("."))),
            ffmpeg_path: PathBuf::from(
                lookup("FFMPEG_PATH").unwrap_or_else(|| String::from("ffmpeg")),
            ),
            encode_timeout: Duration::from_secs(parsed(&lookup, "ENCODE_TIMEOUT_SECONDS", 3600)?),
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// Comma-separated list; blanks are dropped, duplicates removed, at least one
/// entry required.
fn list<F>(lookup: &F, name: &'static str) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    let raw = required(lookup, name)?;
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    if items.is_empty() {
        return Err(ConfigError::Invalid { name, value: raw });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    fn dispatcher_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SQS_QUEUE_URL", "https://sqs.us-east-1.amazonaws.com/123/uploads"),
            ("CLUSTER", "transcode"),
            ("TASK_DEFINITION", "video-transcoder:1"),
            ("SECURITY_GROUPS", "sg-1, sg-2,,sg-1"),
            ("SUBNETS", "subnet-a"),
        ]
    }

    #[test]
    fn test_dispatcher_defaults() {
        let config = DispatcherConfig::from_lookup(lookup_from(&dispatcher_env())).unwrap();

        assert_eq!(config.wait_time, Duration::from_secs(10));
        assert_eq!(config.idle_delay, Duration::from_millis(500));
        assert_eq!(config.submit_timeout, Duration::from_secs(30));
        assert_eq!(config.launch_target.container_name, "video-transcoder");
        assert!(config.launch_target.network.assign_public_ip);
        assert_eq!(config.launch_target.network.security_groups, vec!["sg-1", "sg-2"]);
        assert_eq!(config.launch_target.network.subnets, vec!["subnet-a"]);
    }

    #[test]
    fn test_dispatcher_missing_queue() {
        let env: Vec<_> = dispatcher_env()
            .into_iter()
            .filter(|(k, _)| *k != "SQS_QUEUE_URL")
            .collect();
        let err = DispatcherConfig::from_lookup(lookup_from(&env)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SQS_QUEUE_URL"));
    }

    #[test]
    fn test_dispatcher_rejects_bad_values() {
        let mut env = dispatcher_env();
        env.push(("WAIT_TIME_SECONDS", "30"));
        assert!(matches!(
            DispatcherConfig::from_lookup(lookup_from(&env)),
            Err(ConfigError::Invalid { name: "WAIT_TIME_SECONDS", .. })
        ));

        let mut env = dispatcher_env();
        env.push(("ASSIGN_PUBLIC_IP", "maybe"));
        assert!(matches!(
            DispatcherConfig::from_lookup(lookup_from(&env)),
            Err(ConfigError::Invalid { name: "ASSIGN_PUBLIC_IP", .. })
        ));

        let mut env: Vec<_> = dispatcher_env()
            .into_iter()
            .filter(|(k, _)| *k != "SUBNETS")
            .collect();
        env.push(("SUBNETS", " , "));
        assert!(matches!(
            DispatcherConfig::from_lookup(lookup_from(&env)),
            Err(ConfigError::Invalid { name: "SUBNETS", .. })
        ));
    }

    #[test]
    fn test_worker_config() {
        let config = WorkerConfig::from_lookup(lookup_from(&[
            ("BUCKET_NAME", "videos"),
            ("KEY", "a.mp4"),
        ]))
        .unwrap();

        assert_eq!(config.bucket, "videos");
        assert_eq!(config.key, "a.mp4");
        assert_eq!(config.output_bucket, "videos");
        assert_eq!(config.output_prefix, "");
        assert_eq!(config.work_dir, PathBuf::from("."));
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.encode_timeout, Duration::from_secs(3600));

        let config = WorkerConfig::from_lookup(lookup_from(&[
            ("BUCKET_NAME", "videos"),
            ("KEY", "a.mp4"),
            ("OUTPUT_BUCKET", "renditions"),
            ("OUTPUT_PREFIX", "a/"),
        ]))
        .unwrap();
        assert_eq!(config.output_bucket, "renditions");
        assert_eq!(config.output_prefix, "a/");
    }

    #[test]
    fn test_worker_requires_key() {
        let err = WorkerConfig::from_lookup(lookup_from(&[("BUCKET_NAME", "videos")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("KEY"));
    }
}
