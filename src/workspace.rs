use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, VidsplitError};

/// Output directories for one pipeline run.
///
/// Both are wiped and recreated at the start of every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub audio_dir: PathBuf,
    pub video_dir: PathBuf,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new("audio", "video")
    }
}

impl Workspace {
    pub fn new(audio_dir: impl Into<PathBuf>, video_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            video_dir: video_dir.into(),
        }
    }

    /// `root/audio` and `root/video`.
    pub fn under(root: &Path) -> Self {
        Self::new(root.join("audio"), root.join("video"))
    }

    pub fn dirs(&self) -> [&Path; 2] {
        [self.audio_dir.as_path(), self.video_dir.as_path()]
    }

    /// Remove both directories and everything in them.
    pub fn clean(&self) -> Result<()> {
        for dir in self.dirs() {
            match std::fs::remove_dir_all(dir) {
                Ok(()) => debug!("Removed {}", dir.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(VidsplitError::WorkspacePrep {
                        path: dir.display().to_string(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    /// Create both directories.
    pub fn prepare(&self) -> Result<()> {
        for dir in self.dirs() {
            std::fs::create_dir_all(dir).map_err(|source| VidsplitError::WorkspacePrep {
                path: dir.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// `audio_dir/{base_name}.{extension}`
    pub fn audio_output(&self, source: &Path, extension: &str) -> PathBuf {
        self.audio_dir
            .join(format!("{}.{extension}", base_name(source)))
    }

    /// `video_dir/temp_{file_name}`, the video-only intermediate.
    pub fn temp_video(&self, source: &Path) -> PathBuf {
        let file_name = source.file_name().unwrap_or_default().to_string_lossy();
        self.video_dir.join(format!("temp_{file_name}"))
    }
}

/// File name of `path` without its extension.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}
