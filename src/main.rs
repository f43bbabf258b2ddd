use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidsplit::{print_summary, process_video, Config};

#[derive(Parser)]
#[command(name = "vidsplit")]
#[command(version, about = "Split a video into an audio track and fixed-length chunks")]
#[command(long_about = "Extract the audio track of a video and cut its video stream into \
fixed-duration chunks without re-encoding. Output directories are wiped on every run.")]
struct Cli {
    /// Input video file
    input: PathBuf,

    /// Chunk length in seconds
    #[arg(short, long, allow_negative_numbers = true)]
    chunk_size: Option<i64>,

    /// Directory for the extracted audio track
    #[arg(long)]
    audio_dir: Option<PathBuf>,

    /// Directory for the video chunks
    #[arg(long)]
    video_dir: Option<PathBuf>,

    /// Kill any single ffmpeg/ffprobe call after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(size) = cli.chunk_size {
        config.chunk_size = size;
    }
    if let Some(ref dir) = cli.audio_dir {
        config.audio_dir = dir.clone();
    }
    if let Some(ref dir) = cli.video_dir {
        config.video_dir = dir.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = Some(secs);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    config.validate().context("Configuration validation failed")?;

    let engine = config.engine();
    engine.check().await.context(
        "FFmpeg not found. Install it with: brew install ffmpeg (macOS) or apt install ffmpeg (Linux)",
    )?;

    info!("Input:      {}", cli.input.display());
    info!("Chunk size: {}s", config.chunk_size);
    info!("Audio dir:  {}", config.audio_dir.display());
    info!("Video dir:  {}", config.video_dir.display());

    let result = process_video(Arc::new(engine), &cli.input, &config.pipeline_config())
        .await
        .with_context(|| format!("Failed to split {}", cli.input.display()))?;

    print_summary(&result);
    Ok(())
}
