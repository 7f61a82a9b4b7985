//! Dispatcher Binary
//!
//! Long-running process that consumes S3 upload notifications from SQS and
//! starts one Fargate transcode task per uploaded object.
//!
//! Environment Variables:
//! - SQS_QUEUE_URL: SQS queue receiving the bucket notifications
//! - CLUSTER / TASK_DEFINITION: where and what to run
//! - SECURITY_GROUPS / SUBNETS: comma-separated task networking
//! - AWS_REGION (+ credentials): picked up by the AWS SDK

use reelcast::adapters::aws::{ecs::EcsAdapter, sqs::SqsAdapter};
use reelcast::{logging, DispatchService, DispatcherConfig, PollSettings};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init();

    let config = match DispatcherConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(queue_url = %config.queue_url, cluster = %config.launch_target.cluster_id, "Dispatcher configured");

    // Load AWS config
    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    // Create adapters
    let queue = SqsAdapter::new(aws_sdk_sqs::Client::new(&aws), config.queue_url.clone());
    let launcher = EcsAdapter::new(aws_sdk_ecs::Client::new(&aws));

    let dispatcher = DispatchService::new(
        queue,
        launcher,
        config.launch_target.clone(),
        PollSettings {
            wait_time: config.wait_time,
            idle_delay: config.idle_delay,
            submit_timeout: config.submit_timeout,
        },
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    dispatcher.run(shutdown).await;
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await.ok();

    info!("Received shutdown signal");
    shutdown.cancel();
}
