use crate::domain::profiles::ResolutionProfile;
use crate::error::{EncodeFailure, WorkerError};
use crate::ports::encoder::EncoderPort;
use crate::ports::storage::StoragePort;
use futures::future::{join_all, try_join_all};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

/// Local name the source is downloaded to.
pub const SOURCE_FILE_NAME: &str = "original-video.mp4";

/// What a single worker run operates on.
#[derive(Debug, Clone)]
pub struct WorkerJob {
    pub bucket: String,
    pub key: String,
    pub output_bucket: String,
    pub output_prefix: String,
    pub work_dir: PathBuf,
}

impl WorkerJob {
    pub fn source_path(&self) -> PathBuf {
        self.work_dir.join(SOURCE_FILE_NAME)
    }

    pub fn output_key(&self, profile: &ResolutionProfile) -> String {
        format!("{}{}", self.output_prefix, profile.output_file_name())
    }
}

/// A rendition that reached storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedRendition {
    pub profile: &'static str,
    pub bucket: String,
    pub key: String,
}

pub struct TranscodeWorker<S, E> {
    storage: S,
    encoder: E,
    profiles: Vec<ResolutionProfile>,
    encode_timeout: Duration,
}

impl<S, E> TranscodeWorker<S, E>
where
    S: StoragePort,
    E: EncoderPort,
{
    pub fn new(
        storage: S,
        encoder: E,
        profiles: Vec<ResolutionProfile>,
        encode_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            encoder,
            profiles,
            encode_timeout,
        }
    }

    /// Download, encode every profile concurrently, then upload.
    ///
    /// Nothing is uploaded unless every rendition encoded: a partial ladder is
    /// not servable.
    pub async fn run(&self, job: &WorkerJob) -> Result<Vec<UploadedRendition>, WorkerError> {
        tokio::fs::create_dir_all(&job.work_dir).await?;

        // 1. Download
        let source = job.source_path();
        self.storage
            .download(&job.bucket, &job.key, &source)
            .await
            .map_err(|source| WorkerError::Download {
                bucket: job.bucket.clone(),
                key: job.key.clone(),
                source,
            })?;
        info!(bucket = %job.bucket, key = %job.key, "Source downloaded");

        // 2. Encode
        let outputs = self.encode_all(&source, &job.work_dir).await?;

        // 3. Upload
        let uploads = outputs
            .iter()
            .map(|(profile, path)| self.upload(job, profile, path));
        let uploaded = try_join_all(uploads).await?;

        info!(
            key = %job.key,
            renditions = uploaded.len(),
            "All videos have been transcoded and uploaded successfully"
        );
        Ok(uploaded)
    }

    async fn encode_all(
        &self,
        source: &Path,
        work_dir: &Path,
    ) -> Result<Vec<(ResolutionProfile, PathBuf)>, WorkerError> {
        let encodes = self.profiles.iter().map(|profile| async move {
            let output = profile.output_path(work_dir);
            let result = match tokio::time::timeout(
                self.encode_timeout,
                self.encoder.encode(source, &output, profile),
            )
            .await
            {
                Ok(Ok(())) => Ok(output),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("timed out after {:?}", self.encode_timeout)),
            };
            (*profile, result)
        });

        let mut outputs = Vec::with_capacity(self.profiles.len());
        let mut failed = Vec::new();
        for (profile, result) in join_all(encodes).await {
            match result {
                Ok(path) => {
                    info!(profile = profile.name, "Rendition encoded");
                    outputs.push((profile, path));
                }
                Err(reason) => {
                    error!(profile = profile.name, %reason, "Rendition failed to encode");
                    failed.push(EncodeFailure {
                        profile: profile.name,
                        reason,
                    });
                }
            }
        }

        if failed.is_empty() {
            Ok(outputs)
        } else {
            Err(WorkerError::Encode { failed })
        }
    }

    async fn upload(
        &self,
        job: &WorkerJob,
        profile: &ResolutionProfile,
        path: &Path,
    ) -> Result<UploadedRendition, WorkerError> {
        let key = job.output_key(profile);
        self.storage
            .upload(path, &job.output_bucket, &key)
            .await
            .map_err(|source| WorkerError::Upload {
                bucket: job.output_bucket.clone(),
                key: key.clone(),
                source,
            })?;
        info!(bucket = %job.output_bucket, %key, "Uploaded {}", profile.output_file_name());

        Ok(UploadedRendition {
            profile: profile.name,
            bucket: job.output_bucket.clone(),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profiles::RESOLUTIONS;
    use crate::ports::encoder::MockEncoderPort;
    use crate::ports::storage::MockStoragePort;
    use tempfile::tempdir;

    fn job(work_dir: &Path) -> WorkerJob {
        WorkerJob {
            bucket: "videos".into(),
            key: "a.mp4".into(),
            output_bucket: "renditions".into(),
            output_prefix: "a/".into(),
            work_dir: work_dir.to_path_buf(),
        }
    }

    fn worker(
        storage: MockStoragePort,
        encoder: MockEncoderPort,
    ) -> TranscodeWorker<MockStoragePort, MockEncoderPort> {
        TranscodeWorker::new(storage, encoder, RESOLUTIONS.to_vec(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_every_profile_is_encoded_and_uploaded() {
        let dir = tempdir().unwrap();
        let source = dir.path().join(SOURCE_FILE_NAME);
        let mut storage = MockStoragePort::new();
        let mut encoder = MockEncoderPort::new();

        let expected_source = source.clone();
        storage
            .expect_download()
            .withf(move |bucket, key, path| {
                bucket == "videos" && key == "a.mp4" && path == expected_source.as_path()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let expected_source = source.clone();
        encoder
            .expect_encode()
            .withf(move |input, output, profile| {
                input == expected_source.as_path()
                    && output.file_name().and_then(|n| n.to_str())
                        == Some(profile.output_file_name().as_str())
            })
            .times(3)
            .returning(|_, _, _| Ok(()));
        storage
            .expect_upload()
            .withf(|path, bucket, key| {
                bucket == "renditions"
                    && key.starts_with("a/video-")
                    && path.file_name().and_then(|n| n.to_str()) == key.strip_prefix("a/")
            })
            .times(3)
            .returning(|_, _, _| Ok(()));

        let mut uploaded = worker(storage, encoder).run(&job(dir.path())).await.unwrap();
        uploaded.sort_by(|a, b| a.key.cmp(&b.key));
        let keys: Vec<&str> = uploaded.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, vec!["a/video-360p.mp4", "a/video-480p.mp4", "a/video-720p.mp4"]);
    }

    #[tokio::test]
    async fn test_failed_encode_fails_the_job_without_uploads() {
        let dir = tempdir().unwrap();
        let mut storage = MockStoragePort::new();
        let mut encoder = MockEncoderPort::new();

        storage.expect_download().times(1).returning(|_, _, _| Ok(()));
        encoder
            .expect_encode()
            .times(3)
            .returning(|_, _, profile| {
                if profile.name == "720p" {
                    Err("exit status: 1".into())
                } else {
                    Ok(())
                }
            });
        storage.expect_upload().times(0);

        let err = worker(storage, encoder)
            .run(&job(dir.path()))
            .await
            .unwrap_err();
        match err {
            WorkerError::Encode { failed } => {
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].profile, "720p");
            }
            other => panic!("expected encode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_failure_skips_encoding() {
        let dir = tempdir().unwrap();
        let mut storage = MockStoragePort::new();
        let mut encoder = MockEncoderPort::new();

        storage
            .expect_download()
            .times(1)
            .returning(|_, _, _| Err("NoSuchKey".into()));
        encoder.expect_encode().times(0);
        storage.expect_upload().times(0);

        let err = worker(storage, encoder)
            .run(&job(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Download { .. }));
    }

    #[tokio::test]
    async fn test_upload_failure_fails_the_job() {
        let dir = tempdir().unwrap();
        let mut storage = MockStoragePort::new();
        let mut encoder = MockEncoderPort::new();

        storage.expect_download().times(1).returning(|_, _, _| Ok(()));
        encoder.expect_encode().times(3).returning(|_, _, _| Ok(()));
        storage
            .expect_upload()
            .returning(|_, _, key| {
                if key.ends_with("480p.mp4") {
                    Err("AccessDenied".into())
                } else {
                    Ok(())
                }
            });

        let err = worker(storage, encoder)
            .run(&job(dir.path()))
            .await
            .unwrap_err();
        match err {
            WorkerError::Upload { bucket, key, .. } => {
                assert_eq!(bucket, "renditions");
                assert_eq!(key, "a/video-480p.mp4");
            }
            other => panic!("expected upload error, got {:?}", other),
        }
    }

    #[test]
    fn test_output_key_without_prefix() {
        let mut job = job(Path::new("."));
        job.output_prefix = String::new();
        assert_eq!(job.output_key(&RESOLUTIONS[0]), "video-360p.mp4");
        assert_eq!(job.source_path(), PathBuf::from("./original-video.mp4"));
    }
}
