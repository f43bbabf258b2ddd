use crate::chunk::{SegmentationPlan, Segmenter};
use crate::error::{Result, VidsplitError};
use crate::extract::Extractor;
use crate::media::MediaEngine;
use crate::workspace::{base_name, Workspace};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Configuration for one run of the split pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Output directories, wiped at the start of the run.
    pub workspace: Workspace,
    /// Chunk length in seconds.
    pub chunk_size: i64,
    /// Encoder for the extracted audio track.
    pub audio_codec: String,
    pub audio_extension: String,
    /// Container extension for video chunks.
    pub chunk_extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspace: Workspace::default(),
            chunk_size: 5,
            audio_codec: "libmp3lame".to_string(),
            audio_extension: "mp3".to_string(),
            chunk_extension: "mp4".to_string(),
        }
    }
}

/// Statistics from a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub total_time: Duration,
    pub extraction_time: Duration,
    pub segmentation_time: Duration,
    /// Duration of the video-only stream, in seconds.
    pub source_duration: f64,
    pub chunks_written: usize,
}

/// Result of the split pipeline.
#[derive(Debug)]
pub struct PipelineResult {
    pub audio_path: PathBuf,
    pub chunk_paths: Vec<PathBuf>,
    pub plan: SegmentationPlan,
    pub stats: PipelineStats,
}

/// Split `source` into an audio track and fixed-size video chunks.
///
/// Stages, each aborting the run on failure:
/// 1. Wipe the workspace and check the source exists
/// 2. Recreate the workspace directories
/// 3. Extract audio and video-only streams concurrently
/// 4. Cut the video-only stream into chunks
/// 5. Delete the video-only intermediate
pub async fn process_video(
    engine: Arc<dyn MediaEngine>,
    source: &Path,
    config: &PipelineConfig,
) -> Result<PipelineResult> {
    let start_time = Instant::now();
    let workspace = &config.workspace;

    if config.chunk_size <= 0 {
        return Err(VidsplitError::InvalidChunkSize(config.chunk_size));
    }

    workspace.clean()?;

    if !source.is_file() {
        return Err(VidsplitError::SourceNotFound(source.display().to_string()));
    }

    workspace.prepare()?;

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 1: Stream extraction
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 1/2: Extracting streams from {:?} with {}", source, engine.name());
    let extraction_start = Instant::now();

    let extractor = Extractor::new(engine.clone(), workspace.clone())
        .with_audio_codec(&config.audio_codec, &config.audio_extension);
    let streams = extractor.extract(source).await?;

    let extraction_time = extraction_start.elapsed();
    info!("Extraction complete in {:.2}s", extraction_time.as_secs_f64());

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 2: Segmentation
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 2/2: Cutting {}s chunks", config.chunk_size);
    let segmentation_start = Instant::now();

    let report = Segmenter::new(engine.as_ref(), &streams.video)
        .with_output_dir(&workspace.video_dir)
        .with_base_name(base_name(source))
        .with_extension(&config.chunk_extension)
        .segment(&streams.video, config.chunk_size)
        .await?;

    let segmentation_time = segmentation_start.elapsed();

    std::fs::remove_file(&streams.video).map_err(|source| VidsplitError::Cleanup {
        path: streams.video.display().to_string(),
        source,
    })?;

    let total_time = start_time.elapsed();
    info!(
        "Wrote {} chunks and {:?} in {:.2}s",
        report.chunk_paths.len(),
        streams.audio,
        total_time.as_secs_f64()
    );

    let stats = PipelineStats {
        total_time,
        extraction_time,
        segmentation_time,
        source_duration: report.source_duration,
        chunks_written: report.chunk_paths.len(),
    };

    Ok(PipelineResult {
        audio_path: streams.audio,
        chunk_paths: report.chunk_paths,
        plan: report.plan,
        stats,
    })
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                        Split Complete                         ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Audio:      {}", result.audio_path.display());
    println!("  Chunks:     {}", result.stats.chunks_written);
    if let (Some(first), Some(last)) = (result.chunk_paths.first(), result.chunk_paths.last()) {
        println!("              {}", first.display());
        if first != last {
            println!("              ...");
            println!("              {}", last.display());
        }
    }
    println!("  Duration:   {:.1}s video", result.stats.source_duration);
    if result.plan.has_trailing_chunk() {
        println!(
            "  Trailing:   {:.2}s final chunk",
            result.plan.trailing_duration
        );
    }
    println!();
    println!("  Timing:");
    println!(
        "    Extract:     {:.2}s",
        result.stats.extraction_time.as_secs_f64()
    );
    println!(
        "    Segment:     {:.2}s",
        result.stats.segmentation_time.as_secs_f64()
    );
    println!(
        "    Total:       {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
