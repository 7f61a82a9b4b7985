//! ffmpeg CLI encoder.

use crate::domain::profiles::ResolutionProfile;
use crate::ports::encoder::EncoderPort;
use crate::ports::PortError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Trailing stderr kept in error reports.
const STDERR_TAIL: usize = 2048;

#[derive(Debug, Error)]
pub enum FfmpegError {
    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// EncoderPort backed by the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
    video_codec: String,
    audio_codec: String,
    format: String,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            format: "mp4".to_string(),
        }
    }

    pub fn build_args(&self, input: &Path, output: &Path, profile: &ResolutionProfile) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-s".to_string(),
            profile.size(),
            "-f".to_string(),
            self.format.clone(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl EncoderPort for FfmpegEncoder {
    async fn encode(
        &self,
        input: &Path,
        output: &Path,
        profile: &ResolutionProfile,
    ) -> Result<(), PortError> {
        let args = self.build_args(input, output, profile);
        debug!(profile = profile.name, ?args, "Running ffmpeg");

        // Dropping the future (deadline, shutdown) must not leave the encode running.
        let result = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| FfmpegError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let start = stderr.len().saturating_sub(STDERR_TAIL);
            let start = (start..stderr.len())
                .find(|&i| stderr.is_char_boundary(i))
                .unwrap_or(stderr.len());
            return Err(FfmpegError::Failed {
                status: result.status.to_string(),
                stderr: stderr[start..].trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}
