//! Integration tests for vidsplit
//!
//! These drive the extraction and segmentation stages against a mock media
//! engine, so they run without ffmpeg installed.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Barrier;
use vidsplit::extract::Extractor;
use vidsplit::media::{EngineError, ExtractionMode, ExtractionRequest, MediaEngine};
use vidsplit::workspace::Workspace;
use vidsplit::{process_video, PipelineConfig, VidsplitError};

// ============================================================================
// Mock engine
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stage {
    Audio,
    Video,
    Chunk,
}

fn stage_of(request: &ExtractionRequest) -> Stage {
    match request.mode {
        ExtractionMode::AudioOnly { .. } => Stage::Audio,
        ExtractionMode::VideoOnly => Stage::Video,
        ExtractionMode::StreamCopyRange { .. } => Stage::Chunk,
    }
}

/// Records requests and writes a placeholder file for each output.
struct MockEngine {
    duration: String,
    fail_stage: Option<Stage>,
    delay: Option<(Stage, Duration)>,
    skip_video_output: bool,
    barrier: Option<Arc<Barrier>>,
    requests: Mutex<Vec<ExtractionRequest>>,
}

impl MockEngine {
    fn new(duration: &str) -> Self {
        Self {
            duration: duration.to_string(),
            fail_stage: None,
            delay: None,
            skip_video_output: false,
            barrier: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, stage: Stage) -> Self {
        self.fail_stage = Some(stage);
        self
    }

    fn delaying(mut self, stage: Stage, delay: Duration) -> Self {
        self.delay = Some((stage, delay));
        self
    }

    fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn requests_for(&self, stage: Stage) -> Vec<ExtractionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| stage_of(r) == stage)
            .collect()
    }
}

#[async_trait]
impl MediaEngine for MockEngine {
    async fn probe(&self, _path: &Path) -> Result<String, EngineError> {
        Ok(format!(
            r#"{{"format": {{"filename": "x", "duration": "{}"}}}}"#,
            self.duration
        ))
    }

    async fn transcode(&self, request: &ExtractionRequest) -> Result<(), EngineError> {
        let stage = stage_of(request);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(barrier) = &self.barrier {
            if stage != Stage::Chunk {
                barrier.wait().await;
            }
        }
        if let Some((delayed, delay)) = self.delay {
            if delayed == stage {
                tokio::time::sleep(delay).await;
            }
        }

        if self.fail_stage == Some(stage) {
            return Err(EngineError::Failed {
                program: "mock".to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("{stage:?} failed"),
            });
        }

        if stage == Stage::Video && self.skip_video_output {
            return Ok(());
        }
        std::fs::write(&request.output, b"data").unwrap();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct Fixture {
    _root: TempDir,
    source: PathBuf,
    config: PipelineConfig,
}

fn fixture() -> Fixture {
    let root = TempDir::new().unwrap();
    let source_dir = root.path().join("source");
    std::fs::create_dir_all(&source_dir).unwrap();
    let source = source_dir.join("IMG_8435.MOV");
    std::fs::write(&source, b"source").unwrap();

    let config = PipelineConfig {
        workspace: Workspace::under(root.path()),
        ..PipelineConfig::default()
    };

    Fixture {
        _root: root,
        source,
        config,
    }
}

fn sorted_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Pipeline Tests
// ============================================================================

mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_seventeen_seconds_in_five_second_chunks() {
        let fx = fixture();
        let engine = Arc::new(MockEngine::new("17.000000"));

        let result = process_video(engine.clone(), &fx.source, &fx.config)
            .await
            .unwrap();

        let workspace = &fx.config.workspace;
        assert_eq!(result.audio_path, workspace.audio_dir.join("IMG_8435.mp3"));
        assert_eq!(sorted_files(&workspace.audio_dir), vec!["IMG_8435.mp3"]);
        assert_eq!(
            sorted_files(&workspace.video_dir),
            vec![
                "IMG_8435_chunk_000.mp4",
                "IMG_8435_chunk_001.mp4",
                "IMG_8435_chunk_002.mp4",
                "IMG_8435_chunk_003.mp4",
            ]
        );
        assert!(!workspace.temp_video(&fx.source).exists());

        assert_eq!(result.plan.full_chunks, 3);
        assert_eq!(result.plan.total_chunks, 4);
        assert_eq!(result.stats.chunks_written, 4);
        assert_eq!(result.stats.source_duration, 17.0);

        let cuts: Vec<(u64, f64)> = engine
            .requests_for(Stage::Chunk)
            .iter()
            .map(|r| match r.mode {
                ExtractionMode::StreamCopyRange {
                    start_secs,
                    duration_secs,
                } => (start_secs, duration_secs),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(cuts, vec![(0, 5.0), (5, 5.0), (10, 5.0), (15, 2.0)]);
    }

    #[tokio::test]
    async fn test_chunks_cut_from_video_only_intermediate() {
        let fx = fixture();
        let engine = Arc::new(MockEngine::new("10.0"));

        process_video(engine.clone(), &fx.source, &fx.config)
            .await
            .unwrap();

        let temp = fx.config.workspace.temp_video(&fx.source);
        let video = engine.requests_for(Stage::Video);
        assert_eq!(video.len(), 1);
        assert_eq!(video[0].input, fx.source);
        assert_eq!(video[0].output, temp);

        let audio = engine.requests_for(Stage::Audio);
        assert_eq!(audio.len(), 1);
        assert_eq!(
            audio[0].mode,
            ExtractionMode::AudioOnly {
                codec: "libmp3lame".to_string()
            }
        );

        let chunks = engine.requests_for(Stage::Chunk);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|r| r.input == temp));
    }

    #[tokio::test]
    async fn test_extraction_finishes_before_segmentation() {
        let fx = fixture();
        let engine = Arc::new(MockEngine::new("12.0").delaying(Stage::Audio, Duration::from_millis(100)));

        process_video(engine.clone(), &fx.source, &fx.config)
            .await
            .unwrap();

        let stages: Vec<Stage> = engine.requests().iter().map(stage_of).collect();
        let first_chunk = stages.iter().position(|s| *s == Stage::Chunk).unwrap();
        assert_eq!(first_chunk, 2);
        assert_eq!(stages.len(), 5);
    }

    #[tokio::test]
    async fn test_video_failure_stops_before_segmentation() {
        let fx = fixture();
        let engine = Arc::new(MockEngine::new("17.0").failing(Stage::Video));

        let result = process_video(engine.clone(), &fx.source, &fx.config).await;

        match result {
            Err(VidsplitError::VideoExtraction { path, .. }) => {
                assert!(path.contains("temp_IMG_8435.MOV"));
            }
            other => panic!("Expected VideoExtraction error, got: {other:?}"),
        }
        assert!(engine.requests_for(Stage::Chunk).is_empty());
    }

    #[tokio::test]
    async fn test_audio_failure_reported() {
        let fx = fixture();
        let engine = Arc::new(MockEngine::new("17.0").failing(Stage::Audio));

        let result = process_video(engine.clone(), &fx.source, &fx.config).await;

        assert!(matches!(result, Err(VidsplitError::AudioExtraction { .. })));
        assert!(engine.requests_for(Stage::Chunk).is_empty());
    }

    #[tokio::test]
    async fn test_slow_branch_finishes_before_error_is_returned() {
        let fx = fixture();
        let engine = Arc::new(
            MockEngine::new("17.0")
                .failing(Stage::Video)
                .delaying(Stage::Audio, Duration::from_millis(150)),
        );

        let result = process_video(engine.clone(), &fx.source, &fx.config).await;

        assert!(matches!(result, Err(VidsplitError::VideoExtraction { .. })));
        // The audio branch was still running when video failed.
        let audio = fx.config.workspace.audio_output(&fx.source, "mp3");
        assert!(audio.exists());
    }

    #[tokio::test]
    async fn test_chunk_failure_keeps_earlier_chunks() {
        struct FailThirdChunk(MockEngine);

        #[async_trait]
        impl MediaEngine for FailThirdChunk {
            async fn probe(&self, path: &Path) -> Result<String, EngineError> {
                self.0.probe(path).await
            }

            async fn transcode(&self, request: &ExtractionRequest) -> Result<(), EngineError> {
                if let ExtractionMode::StreamCopyRange { start_secs: 10, .. } = request.mode {
                    return Err(EngineError::Timeout {
                        program: "mock".to_string(),
                        after: Duration::from_secs(1),
                    });
                }
                self.0.transcode(request).await
            }

            fn name(&self) -> &'static str {
                "mock"
            }
        }

        let fx = fixture();
        let engine = Arc::new(FailThirdChunk(MockEngine::new("17.0")));

        let result = process_video(engine, &fx.source, &fx.config).await;

        match result {
            Err(VidsplitError::ChunkExtraction { index, .. }) => assert_eq!(index, 2),
            other => panic!("Expected ChunkExtraction error, got: {other:?}"),
        }

        let workspace = &fx.config.workspace;
        assert!(workspace.temp_video(&fx.source).exists());
        assert!(workspace.video_dir.join("IMG_8435_chunk_001.mp4").exists());
        assert!(!workspace.video_dir.join("IMG_8435_chunk_002.mp4").exists());
    }

    #[tokio::test]
    async fn test_missing_intermediate_is_cleanup_error() {
        let fx = fixture();
        let mut engine = MockEngine::new("6.0");
        engine.skip_video_output = true;
        let engine = Arc::new(engine);

        let result = process_video(engine, &fx.source, &fx.config).await;

        assert!(matches!(result, Err(VidsplitError::Cleanup { .. })));
        let video_dir = &fx.config.workspace.video_dir;
        assert_eq!(sorted_files(video_dir).len(), 2);
    }

    #[tokio::test]
    async fn test_source_not_found() {
        let fx = fixture();
        let engine = Arc::new(MockEngine::new("17.0"));
        let missing = fx.source.with_file_name("missing.mov");

        let result = process_video(engine.clone(), &missing, &fx.config).await;

        assert!(matches!(result, Err(VidsplitError::SourceNotFound(_))));
        assert!(engine.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_chunk_size() {
        let fx = fixture();
        let engine = Arc::new(MockEngine::new("17.0"));
        let config = PipelineConfig {
            chunk_size: -1,
            ..fx.config.clone()
        };

        let result = process_video(engine.clone(), &fx.source, &config).await;

        assert!(matches!(result, Err(VidsplitError::InvalidChunkSize(-1))));
        assert!(engine.requests().is_empty());
    }

    #[tokio::test]
    async fn test_previous_run_output_is_wiped() {
        let fx = fixture();
        let workspace = &fx.config.workspace;
        workspace.prepare().unwrap();
        let stale = workspace.video_dir.join("old_chunk_099.mp4");
        std::fs::write(&stale, b"old").unwrap();

        let engine = Arc::new(MockEngine::new("5.0"));
        process_video(engine, &fx.source, &fx.config).await.unwrap();

        assert!(!stale.exists());
        assert_eq!(
            sorted_files(&workspace.video_dir),
            vec!["IMG_8435_chunk_000.mp4"]
        );
    }

    #[tokio::test]
    async fn test_independent_workspaces_run_concurrently() {
        let first = fixture();
        let second = fixture();

        let (a, b) = tokio::join!(
            process_video(Arc::new(MockEngine::new("9.0")), &first.source, &first.config),
            process_video(Arc::new(MockEngine::new("21.0")), &second.source, &second.config),
        );

        assert_eq!(a.unwrap().chunk_paths.len(), 2);
        assert_eq!(b.unwrap().chunk_paths.len(), 5);
    }
}

// ============================================================================
// Extractor Tests
// ============================================================================

mod extractor_tests {
    use super::*;

    #[tokio::test]
    async fn test_branches_run_concurrently() {
        let fx = fixture();
        fx.config.workspace.prepare().unwrap();

        // Each branch waits for the other; sequential execution would hang.
        let mut engine = MockEngine::new("1.0");
        engine.barrier = Some(Arc::new(Barrier::new(2)));
        let extractor = Extractor::new(Arc::new(engine), fx.config.workspace.clone());

        let streams = tokio::time::timeout(Duration::from_secs(5), extractor.extract(&fx.source))
            .await
            .expect("extraction branches did not run concurrently")
            .unwrap();

        assert!(streams.audio.exists());
        assert!(streams.video.exists());
    }

    #[tokio::test]
    async fn test_custom_audio_codec() {
        let fx = fixture();
        fx.config.workspace.prepare().unwrap();
        let engine = Arc::new(MockEngine::new("1.0"));

        let streams = Extractor::new(engine.clone(), fx.config.workspace.clone())
            .with_audio_codec("aac", "m4a")
            .extract(&fx.source)
            .await
            .unwrap();

        assert_eq!(
            streams.audio,
            fx.config.workspace.audio_dir.join("IMG_8435.m4a")
        );
        let audio = engine.requests_for(Stage::Audio);
        assert_eq!(audio[0].options().to_args(), vec!["-vn", "-acodec", "aac"]);
    }
}
