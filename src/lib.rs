//! Reelcast - S3 upload to ECS transcode pipeline
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (notification envelopes, job requests, profiles)
//! - ports/: Trait definitions (queue, job launcher, storage, encoder)
//! - adapters/: Concrete implementations (SQS, ECS, S3, ffmpeg)
//! - application/: Dispatcher loop and transcode worker
//! - config: Environment configuration
//!
//! # Features
//! - `dispatcher`: SQS consumer launching Fargate tasks
//! - `worker`: S3 download/upload for the transcode container
//!
//! Both are enabled by default.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod ports;

// Re-exports for convenience
pub use application::dispatcher::{DispatchService, PollSettings};
pub use application::worker::{TranscodeWorker, WorkerJob};
pub use config::{DispatcherConfig, WorkerConfig};
pub use error::{ConfigError, DispatchError, WorkerError};
