use crate::domain::jobs::TranscodeJobRequest;
use crate::ports::launcher::{JobLauncherPort, SubmittedJob};
use crate::ports::PortError;
use async_trait::async_trait;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use aws_sdk_ecs::Client;

/// EcsAdapter implements JobLauncherPort with Fargate RunTask calls.
#[derive(Clone)]
pub struct EcsAdapter {
    client: Client,
}

impl EcsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn network_configuration(request: &TranscodeJobRequest) -> Result<NetworkConfiguration, PortError> {
    let assign_public_ip = if request.network.assign_public_ip {
        AssignPublicIp::Enabled
    } else {
        AssignPublicIp::Disabled
    };

    let vpc = AwsVpcConfiguration::builder()
        .set_subnets(Some(request.network.subnets.clone()))
        .set_security_groups(Some(request.network.security_groups.clone()))
        .assign_public_ip(assign_public_ip)
        .build()?;

    Ok(NetworkConfiguration::builder()
        .awsvpc_configuration(vpc)
        .build())
}

fn task_override(request: &TranscodeJobRequest) -> TaskOverride {
    let environment = request
        .environment_overrides()
        .into_iter()
        .map(|(name, value)| KeyValuePair::builder().name(name).value(value).build())
        .collect();

    let container = ContainerOverride::builder()
        .name(&request.container_name)
        .set_environment(Some(environment))
        .build();

    TaskOverride::builder().container_overrides(container).build()
}

#[async_trait]
impl JobLauncherPort for EcsAdapter {
    async fn submit(&self, request: &TranscodeJobRequest) -> Result<SubmittedJob, PortError> {
        let resp = self
            .client
            .run_task()
            .cluster(&request.cluster_id)
            .task_definition(&request.task_definition_id)
            .launch_type(LaunchType::Fargate)
            .network_configuration(network_configuration(request)?)
            .overrides(task_override(request))
            .client_token(&request.idempotency_token)
            .send()
            .await?;

        let task_ids: Vec<String> = resp
            .tasks()
            .iter()
            .filter_map(|task| task.task_arn().map(str::to_string))
            .collect();

        // RunTask reports placement problems in the body, not as an error.
        if task_ids.is_empty() {
            let reasons: Vec<String> = resp
                .failures()
                .iter()
                .map(|f| {
                    format!(
                        "{} ({})",
                        f.reason().unwrap_or("unknown reason"),
                        f.detail().unwrap_or("-")
                    )
                })
                .collect();
            return Err(if reasons.is_empty() {
                "RunTask started no tasks".into()
            } else {
                format!("RunTask failed: {}", reasons.join(", ")).into()
            });
        }

        Ok(SubmittedJob { task_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::jobs::NetworkConfig;

    fn request() -> TranscodeJobRequest {
        TranscodeJobRequest {
            bucket_name: "videos".into(),
            object_key: "a.mp4".into(),
            cluster_id: "transcode".into(),
            task_definition_id: "video-transcoder:1".into(),
            container_name: "video-transcoder".into(),
            network: NetworkConfig {
                assign_public_ip: false,
                security_groups: vec!["sg-1".into()],
                subnets: vec!["subnet-a".into(), "subnet-b".into()],
            },
            idempotency_token: "token".into(),
        }
    }

    #[test]
    fn test_task_override_carries_bucket_and_key() {
        let overrides = task_override(&request());
        let containers = overrides.container_overrides();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].name(), Some("video-transcoder"));

        let env: Vec<(Option<&str>, Option<&str>)> = containers[0]
            .environment()
            .iter()
            .map(|kv| (kv.name(), kv.value()))
            .collect();
        assert_eq!(
            env,
            vec![(Some("BUCKET_NAME"), Some("videos")), (Some("KEY"), Some("a.mp4"))]
        );
    }

    #[test]
    fn test_network_configuration() {
        let network = network_configuration(&request()).unwrap();
        let vpc = network.awsvpc_configuration().unwrap();
        assert_eq!(vpc.subnets().to_vec(), vec!["subnet-a", "subnet-b"]);
        assert_eq!(vpc.security_groups().to_vec(), vec!["sg-1"]);
        assert_eq!(vpc.assign_public_ip(), Some(&AssignPublicIp::Disabled));
    }
}
