//! Worker Binary
//!
//! Runs once inside the Fargate task started by the dispatcher: downloads the
//! uploaded video, encodes every rendition and uploads the results. Exits
//! non-zero if any step fails.
//!
//! Environment Variables:
//! - BUCKET_NAME / KEY: source object (set by the dispatcher's overrides)
//! - OUTPUT_BUCKET / OUTPUT_PREFIX: where renditions go
//! - AWS_REGION (+ credentials): picked up by the AWS SDK

use reelcast::adapters::aws::s3::S3Adapter;
use reelcast::adapters::ffmpeg::FfmpegEncoder;
use reelcast::domain::profiles::RESOLUTIONS;
use reelcast::{logging, TranscodeWorker, WorkerConfig, WorkerJob};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init();

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Load AWS config
    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let worker = TranscodeWorker::new(
        S3Adapter::new(aws_sdk_s3::Client::new(&aws)),
        FfmpegEncoder::new(config.ffmpeg_path.clone()),
        RESOLUTIONS.to_vec(),
        config.encode_timeout,
    );

    let job = WorkerJob {
        bucket: config.bucket,
        key: config.key,
        output_bucket: config.output_bucket,
        output_prefix: config.output_prefix,
        work_dir: config.work_dir,
    };
    info!(bucket = %job.bucket, key = %job.key, "Transcoding video");

    if let Err(e) = worker.run(&job).await {
        error!("Error in video processing: {}", e);
        std::process::exit(1);
    }
}
