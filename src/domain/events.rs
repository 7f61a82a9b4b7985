//! Storage notification envelopes carried in queue message bodies.
//!
//! A body is either the probe S3 sends when a notification target is
//! configured, or a batch of object records. Anything else is rejected.

use serde::Deserialize;

/// Event value S3 puts in the probe it sends to a newly configured target.
pub const TEST_EVENT: &str = "s3:TestEvent";

/// Parsed form of a queue message body.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageEventEnvelope {
    Probe { service: String, event: String },
    Notification { records: Vec<StorageRecord> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEnvelope {
    Probe {
        #[serde(rename = "Service")]
        service: String,
        #[serde(rename = "Event")]
        event: String,
    },
    Notification {
        #[serde(rename = "Records")]
        records: Vec<StorageRecord>,
    },
}

/// Why a body could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    InvalidJson(String),
    UnknownShape,
    UnexpectedServiceEvent(String),
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvelopeError::InvalidJson(e) => write!(f, "body is not valid JSON: {}", e),
            EnvelopeError::UnknownShape => {
                write!(f, "body is neither a test event nor a notification")
            }
            EnvelopeError::UnexpectedServiceEvent(event) => {
                write!(f, "unexpected service event {:?}", event)
            }
        }
    }
}

impl std::error::Error for EnvelopeError {}

impl StorageEventEnvelope {
    pub fn parse(body: &str) -> Result<Self, EnvelopeError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| EnvelopeError::InvalidJson(e.to_string()))?;
        let raw: RawEnvelope =
            serde_json::from_value(value).map_err(|_| EnvelopeError::UnknownShape)?;

        match raw {
            RawEnvelope::Probe { service, event } if event == TEST_EVENT => {
                Ok(StorageEventEnvelope::Probe { service, event })
            }
            RawEnvelope::Probe { event, .. } => Err(EnvelopeError::UnexpectedServiceEvent(event)),
            RawEnvelope::Notification { records } => {
                Ok(StorageEventEnvelope::Notification { records })
            }
        }
    }

    pub fn is_probe(&self) -> bool {
        matches!(self, StorageEventEnvelope::Probe { .. })
    }
}

/// One changed object inside a notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageRecord {
    #[serde(rename = "eventName")]
    pub event_name: String,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct S3Object {
    pub key: String,
    #[serde(default)]
    pub sequencer: Option<String>,
}

impl StorageRecord {
    pub fn bucket_name(&self) -> &str {
        &self.s3.bucket.name
    }

    /// Object key with the notification's form encoding removed
    /// (`+` for space, `%XX` escapes).
    pub fn object_key(&self) -> String {
        let raw = &self.s3.object.key;
        url::form_urlencoded::parse(raw.as_bytes())
            .next()
            .map(|(key, _)| key.into_owned())
            .unwrap_or_else(|| raw.clone())
    }

    pub fn sequencer(&self) -> Option<&str> {
        self.s3.object.sequencer.as_deref()
    }
}
