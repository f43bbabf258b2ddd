use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Result, VidsplitError};
use crate::media::{ExtractionMode, ExtractionRequest, MediaEngine};
use crate::task_group::TaskGroup;
use crate::workspace::Workspace;

/// Paths produced by a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedStreams {
    pub audio: PathBuf,
    pub video: PathBuf,
}

/// Splits a source file into an audio-only file and a video-only file.
pub struct Extractor {
    engine: Arc<dyn MediaEngine>,
    workspace: Workspace,
    audio_codec: String,
    audio_extension: String,
}

impl Extractor {
    pub fn new(engine: Arc<dyn MediaEngine>, workspace: Workspace) -> Self {
        Self {
            engine,
            workspace,
            audio_codec: "libmp3lame".to_string(),
            audio_extension: "mp3".to_string(),
        }
    }

    pub fn with_audio_codec(mut self, codec: impl Into<String>, extension: impl Into<String>) -> Self {
        self.audio_codec = codec.into();
        self.audio_extension = extension.into();
        self
    }

    /// Run the audio and video extractions concurrently.
    ///
    /// Returns once both have finished. On failure the error of whichever
    /// branch failed first is returned and partial outputs stay on disk.
    pub async fn extract(&self, source: &Path) -> Result<ExtractedStreams> {
        let streams = ExtractedStreams {
            audio: self.workspace.audio_output(source, &self.audio_extension),
            video: self.workspace.temp_video(source),
        };

        info!("Extracting audio and video from {}", source.display());

        let audio = ExtractionRequest::new(
            source,
            &streams.audio,
            ExtractionMode::AudioOnly {
                codec: self.audio_codec.clone(),
            },
        );
        let video = ExtractionRequest::new(source, &streams.video, ExtractionMode::VideoOnly);

        let mut group: TaskGroup<VidsplitError> = TaskGroup::new();

        let engine = self.engine.clone();
        group.spawn(async move {
            engine
                .transcode(&audio)
                .await
                .map_err(|source| VidsplitError::AudioExtraction {
                    path: audio.output.display().to_string(),
                    source,
                })?;
            debug!("Audio written to {}", audio.output.display());
            Ok::<(), VidsplitError>(())
        });

        let engine = self.engine.clone();
        group.spawn(async move {
            engine
                .transcode(&video)
                .await
                .map_err(|source| VidsplitError::VideoExtraction {
                    path: video.output.display().to_string(),
                    source,
                })?;
            debug!("Video written to {}", video.output.display());
            Ok::<(), VidsplitError>(())
        });

        group.join().await?;

        info!(
            "Extracted {} and {}",
            streams.audio.display(),
            streams.video.display()
        );
        Ok(streams)
    }
}
