use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{EngineError, ExtractionRequest, MediaEngine};

/// Number of trailing stderr lines kept in error reports.
const STDERR_TAIL_LINES: usize = 8;

/// `MediaEngine` backed by the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    timeout: Option<Duration>,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            timeout: None,
        }
    }
}

impl FfmpegEngine {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            timeout: None,
        }
    }

    /// Kill any single tool invocation that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that both executables are installed and runnable.
    pub async fn check(&self) -> Result<(), EngineError> {
        for program in [&self.ffmpeg, &self.ffprobe] {
            let mut command = Command::new(program);
            command.arg("-version");
            self.run(program, command).await?;
            debug!("{} is available", program.display());
        }
        Ok(())
    }

    async fn run(&self, program: &Path, mut command: Command) -> Result<Output, EngineError> {
        let name = program.display().to_string();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let pending = command.output();
        let output = match self.timeout {
            Some(after) => tokio::time::timeout(after, pending)
                .await
                .map_err(|_| EngineError::Timeout {
                    program: name.clone(),
                    after,
                })?,
            None => pending.await,
        }
        .map_err(|source| EngineError::Spawn {
            program: name.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                program: name,
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe(&self, path: &Path) -> Result<String, EngineError> {
        let mut command = Command::new(&self.ffprobe);
        command
            .args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(path);

        debug!("Probing {}", path.display());
        let output = self.run(&self.ffprobe, command).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn transcode(&self, request: &ExtractionRequest) -> Result<(), EngineError> {
        let options = request.options().to_args();

        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"])
            .arg(&request.input)
            .args(&options)
            .arg(&request.output);

        debug!(
            "ffmpeg -i {} {} {}",
            request.input.display(),
            options.join(" "),
            request.output.display()
        );

        self.run(&self.ffmpeg, command).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
