pub mod ffmpeg;
pub mod probe;

pub use ffmpeg::FfmpegEngine;
pub use probe::{parse_duration, probe_duration};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by the external media tooling.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },
}

/// What an extraction request pulls out of its input.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionMode {
    /// Drop the video stream and encode audio with the given codec.
    AudioOnly { codec: String },
    /// Stream-copy the video stream and drop audio.
    VideoOnly,
    /// Stream-copy every stream between `start_secs` and `start_secs + duration_secs`.
    StreamCopyRange { start_secs: u64, duration_secs: f64 },
}

/// Ordered `key [value]` options handed to the transcoder.
///
/// A `None` value is a bare flag such as `vn`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscodeOptions(Vec<(String, Option<String>)>);

impl TranscodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(mut self, key: &str) -> Self {
        self.0.push((key.to_string(), None));
        self
    }

    pub fn value(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.0.push((key.to_string(), Some(value.to_string())));
        self
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<Option<&str>> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Render as command-line arguments (`-key value`).
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.0.len() * 2);
        for (key, value) in self.iter() {
            args.push(format!("-{key}"));
            args.extend(value.map(str::to_string));
        }
        args
    }
}

/// A declarative extraction job for the media engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: ExtractionMode,
}

impl ExtractionRequest {
    pub fn new(input: &Path, output: &Path, mode: ExtractionMode) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            mode,
        }
    }

    pub fn options(&self) -> TranscodeOptions {
        match &self.mode {
            ExtractionMode::AudioOnly { codec } => {
                TranscodeOptions::new().flag("vn").value("acodec", codec)
            }
            ExtractionMode::VideoOnly => TranscodeOptions::new().value("c:v", "copy").flag("an"),
            ExtractionMode::StreamCopyRange {
                start_secs,
                duration_secs,
            } => TranscodeOptions::new()
                .value("ss", start_secs)
                .value("t", duration_secs)
                .value("c", "copy"),
        }
    }
}

/// The external decode/encode/mux capability.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Return the raw JSON probe document for `path`.
    async fn probe(&self, path: &Path) -> std::result::Result<String, EngineError>;

    /// Run one extraction, overwriting the output file.
    async fn transcode(&self, request: &ExtractionRequest) -> std::result::Result<(), EngineError>;

    fn name(&self) -> &'static str;
}
