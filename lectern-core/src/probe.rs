use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::media::MediaFile;

/// Reads the playable duration of a staged file.
///
/// Probing never fails: anything that cannot be decoded reports zero
/// seconds and the asset stays usable.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe(&self, file: &MediaFile) -> u64;
}

/// Production probe backed by the `ffprobe` binary.
///
/// The payload is staged to a temporary file, probed with a JSON format
/// dump, and the container duration is floored to whole seconds.
pub struct FfprobeDurationProbe {
    ffprobe_timeout: Duration,
}

impl FfprobeDurationProbe {
    pub fn new() -> Self {
        Self {
            ffprobe_timeout: Duration::from_secs(20),
        }
    }

    pub fn with_timeout(mut self, ffprobe_timeout: Duration) -> Self {
        self.ffprobe_timeout = ffprobe_timeout;
        self
    }
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe(&self, file: &MediaFile) -> u64 {
        let staged = match tempfile::NamedTempFile::new() {
            Ok(staged) => staged,
            Err(err) => {
                warn!(file = %file.file_name, error = %err, "failed to stage file for probing");
                return 0;
            }
        };
        if let Err(err) = tokio::fs::write(staged.path(), file.bytes()).await {
            warn!(file = %file.file_name, error = %err, "failed to write probe staging file");
            return 0;
        }

        let mut command = Command::new("ffprobe");
        command
            .kill_on_drop(true)
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg(staged.path());
        match timeout(self.ffprobe_timeout, command.output()).await {
            Ok(Ok(output)) if output.status.success() => parse_duration_secs(&output.stdout)
                .unwrap_or_else(|| {
                    warn!(file = %file.file_name, "ffprobe payload carried no duration");
                    0
                }),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(file = %file.file_name, "ffprobe returned non-zero status: {stderr}");
                0
            }
            Ok(Err(err)) => {
                warn!(file = %file.file_name, error = %err, "ffprobe could not be run");
                0
            }
            Err(_) => {
                warn!(file = %file.file_name, timeout = ?self.ffprobe_timeout, "ffprobe timed out");
                0
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize, Default)]
struct FfprobeFormat {
    #[serde(default)]
    duration: Option<String>,
}

fn parse_duration_secs(stdout: &[u8]) -> Option<u64> {
    let parsed: FfprobeOutput = serde_json::from_slice(stdout).ok()?;
    let seconds = parsed
        .format
        .duration
        .as_deref()
        .and_then(|value| value.parse::<f64>().ok())?;
    if seconds.is_finite() && seconds > 0.0 {
        Some(seconds.floor() as u64)
    } else {
        None
    }
}
