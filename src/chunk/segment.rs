use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, VidsplitError};
use crate::media::{probe_duration, ExtractionMode, ExtractionRequest, MediaEngine};

use super::plan::{plan, SegmentationPlan};

/// Outcome of cutting a video into chunks.
#[derive(Debug, Clone)]
pub struct SegmentReport {
    pub source_duration: f64,
    pub plan: SegmentationPlan,
    pub chunk_paths: Vec<PathBuf>,
}

impl SegmentReport {
    pub fn total_chunks(&self) -> usize {
        self.plan.total_chunks
    }
}

/// Cuts a video into fixed-size stream-copied chunks, one at a time.
pub struct Segmenter<'a> {
    engine: &'a dyn MediaEngine,
    output_dir: PathBuf,
    base_name: String,
    extension: String,
}

impl<'a> Segmenter<'a> {
    /// Chunks land next to `video` and are named after its file stem.
    pub fn new(engine: &'a dyn MediaEngine, video: &Path) -> Self {
        Self {
            engine,
            output_dir: video.parent().map(Path::to_path_buf).unwrap_or_default(),
            base_name: crate::workspace::base_name(video),
            extension: "mp4".to_string(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Probe `video`, plan its chunks and extract them in index order.
    ///
    /// Stops at the first failing chunk. Chunks written before the failure
    /// are left on disk.
    pub async fn segment(&self, video: &Path, chunk_size: i64) -> Result<SegmentReport> {
        if chunk_size <= 0 {
            return Err(VidsplitError::InvalidChunkSize(chunk_size));
        }

        let source_duration = probe_duration(self.engine, video).await?;
        let plan = plan(source_duration, chunk_size)?;

        info!(
            "Cutting {:.2}s into {} chunks of {}s (trailing {:.2}s)",
            source_duration, plan.total_chunks, chunk_size, plan.trailing_duration
        );

        let mut chunk_paths = Vec::new();

        for spec in plan.chunk_specs(chunk_size, &self.output_dir, &self.base_name, &self.extension)
        {
            debug!(
                "Creating chunk {}: start={}s duration={}s",
                spec.index, spec.start_secs, spec.duration_secs
            );

            let request = ExtractionRequest::new(
                video,
                &spec.output_path,
                ExtractionMode::StreamCopyRange {
                    start_secs: spec.start_secs,
                    duration_secs: spec.duration_secs,
                },
            );

            self.engine
                .transcode(&request)
                .await
                .map_err(|source| VidsplitError::ChunkExtraction {
                    index: spec.index,
                    path: spec.output_path.display().to_string(),
                    source,
                })?;

            chunk_paths.push(spec.output_path);
        }

        info!("Created {} chunks in {}", chunk_paths.len(), self.output_dir.display());

        Ok(SegmentReport {
            source_duration,
            plan,
            chunk_paths,
        })
    }
}
