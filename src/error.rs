//! Error types for the dispatcher and the worker.

use crate::domain::events::EnvelopeError;
use crate::ports::PortError;
use std::fmt;
use thiserror::Error;

/// Failures while handling one queue message. None of them stop the loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed message body: {0}")]
    MalformedBody(#[from] EnvelopeError),

    #[error("message has no body")]
    EmptyBody,

    #[error("job submission failed for s3://{bucket}/{key}: {source}")]
    Submission {
        bucket: String,
        key: String,
        #[source]
        source: PortError,
    },

    #[error("failed to delete message {message_id}: {source}")]
    Delete {
        message_id: String,
        #[source]
        source: PortError,
    },

    #[error("queue receive failed: {0}")]
    Receive(#[source] PortError),
}

impl DispatchError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, DispatchError::MalformedBody(_) | DispatchError::EmptyBody)
    }
}

/// One rendition that did not encode.
#[derive(Debug)]
pub struct EncodeFailure {
    pub profile: &'static str,
    pub reason: String,
}

impl fmt::Display for EncodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.profile, self.reason)
    }
}

/// Failures of the single-shot worker. Each one fails the whole job.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to download s3://{bucket}/{key}: {source}")]
    Download {
        bucket: String,
        key: String,
        #[source]
        source: PortError,
    },

    #[error("{count} rendition(s) failed to encode: {summary}", count = .failed.len(), summary = summarize(.failed))]
    Encode { failed: Vec<EncodeFailure> },

    #[error("failed to upload s3://{bucket}/{key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: PortError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn summarize(failed: &[EncodeFailure]) -> String {
    failed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_lists_every_failure() {
        let err = WorkerError::Encode {
            failed: vec![
                EncodeFailure {
                    profile: "480p",
                    reason: "exit status 1".into(),
                },
                EncodeFailure {
                    profile: "720p",
                    reason: "timed out".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 rendition(s) failed to encode: 480p: exit status 1; 720p: timed out"
        );
    }

    #[test]
    fn test_malformed_classification() {
        assert!(DispatchError::EmptyBody.is_malformed());
        assert!(DispatchError::MalformedBody(EnvelopeError::UnknownShape).is_malformed());
        assert!(!DispatchError::Receive("down".into()).is_malformed());
    }
}
