//! AWS adapters.

#[cfg(feature = "dispatcher")]
pub mod ecs;
#[cfg(feature = "dispatcher")]
pub mod sqs;

#[cfg(feature = "worker")]
pub mod s3;
