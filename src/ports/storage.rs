use super::PortError;
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Download an object from storage to a local path
    async fn download(&self, bucket: &str, key: &str, local_path: &Path)
        -> Result<(), PortError>;

    /// Upload a file from a local path to storage
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), PortError>;
}
