use crate::ports::storage::StoragePort;
use crate::ports::PortError;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// S3Adapter implements StoragePort for AWS S3.
#[derive(Clone)]
pub struct S3Adapter {
    client: Client,
}

impl S3Adapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StoragePort for S3Adapter {
    async fn download(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<(), PortError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;

        // Stream to disk; sources can be far larger than memory.
        let mut body = resp.body.into_async_read();
        let mut file = tokio::fs::File::create(local_path).await?;
        tokio::io::copy(&mut body, &mut file).await?;
        file.flush().await?;
        Ok(())
    }

    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), PortError> {
        let byte_stream = ByteStream::from_path(local_path).await?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("video/mp4")
            .body(byte_stream)
            .send()
            .await?;
        Ok(())
    }
}
