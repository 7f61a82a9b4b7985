use std::path::{Path, PathBuf};

/// A target rendition of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionProfile {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Renditions produced for every upload.
pub const RESOLUTIONS: [ResolutionProfile; 3] = [
    ResolutionProfile {
        name: "360p",
        width: 480,
        height: 360,
    },
    ResolutionProfile {
        name: "480p",
        width: 858,
        height: 480,
    },
    ResolutionProfile {
        name: "720p",
        width: 1280,
        height: 720,
    },
];

impl ResolutionProfile {
    /// `video-<name>.mp4`, used both as the local output and the uploaded key.
    pub fn output_file_name(&self) -> String {
        format!("video-{}.mp4", self.name)
    }

    pub fn output_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(self.output_file_name())
    }

    /// Frame size in the `<w>x<h>` form ffmpeg expects.
    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}
