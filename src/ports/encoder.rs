use super::PortError;
use crate::domain::profiles::ResolutionProfile;
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EncoderPort: Send + Sync {
    /// Encode `input` into `output` at the profile's frame size.
    /// Resolves only once the encoder has exited.
    async fn encode(
        &self,
        input: &Path,
        output: &Path,
        profile: &ResolutionProfile,
    ) -> Result<(), PortError>;
}
