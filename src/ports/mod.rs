//! Ports - Trait definitions for the collaborators the services drive.

pub mod encoder;
pub mod launcher;
pub mod queue;
pub mod storage;

/// Error type returned across every port.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;
