//! Video duration probing
//!
//! Reads the container duration of a selected video with ffprobe. Every
//! failure collapses to "duration unknown", never to an error on the form.

use crate::error::{ProbeError, ProbeResult};
use crate::models::{FileIdentity, SelectedFile};
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Terminal result of a duration probe. A duration of 0 means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub duration_seconds: f64,
    pub errored: bool,
}

impl ProbeOutcome {
    pub fn resolved(duration_seconds: f64) -> Self {
        Self {
            duration_seconds,
            errored: false,
        }
    }

    pub fn failed() -> Self {
        Self {
            duration_seconds: 0.0,
            errored: true,
        }
    }
}

/// Source of video metadata
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Duration in seconds of the media file at `path`
    async fn read_duration(&self, path: &Path) -> ProbeResult<f64>;
}

/// Probe backed by the `ffprobe` executable
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: String,
}

impl FfprobeProbe {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Pull the duration out of `ffprobe -print_format json` output.
    ///
    /// The container duration wins; the first video stream's duration is
    /// used when the container does not report one.
    pub fn parse_duration(ffprobe_data: &serde_json::Value) -> ProbeResult<f64> {
        let from_format = ffprobe_data
            .get("format")
            .and_then(|format| format.get("duration"))
            .and_then(json_seconds);

        let from_stream = || {
            ffprobe_data
                .get("streams")
                .and_then(|v| v.as_array())?
                .iter()
                .filter(|stream| stream.get("codec_type").and_then(|v| v.as_str()) == Some("video"))
                .find_map(|stream| stream.get("duration").and_then(json_seconds))
        };

        from_format
            .or_else(from_stream)
            .ok_or(ProbeError::MissingDuration)
    }
}

fn json_seconds(value: &serde_json::Value) -> Option<f64> {
    let seconds = match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn read_duration(&self, path: &Path) -> ProbeResult<f64> {
        debug!("Running {} on {}", self.program, path.display());

        let output = Command::new(&self.program)
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
            });
        }

        let ffprobe_data: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        Self::parse_duration(&ffprobe_data)
    }
}

/// A copy of an in-memory file on disk, removed when dropped.
struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    async fn create(name: &str, bytes: &[u8]) -> ProbeResult<Self> {
        let suffix = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let file = tempfile::Builder::new()
            .prefix("publish-intake-")
            .suffix(&suffix)
            .tempfile()
            .map_err(ProbeError::Staging)?;
        tokio::fs::write(file.path(), bytes)
            .await
            .map_err(ProbeError::Staging)?;

        Ok(Self { file })
    }

    fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        debug!("Releasing staged probe file {}", self.file.path().display());
    }
}

/// Read the duration of a selected video.
///
/// In-memory files are staged to a scratch file for the duration of the
/// probe only; it is removed on success and on failure alike.
pub async fn probe_duration(probe: &dyn MediaProbe, file: &SelectedFile) -> ProbeOutcome {
    info!("Probing duration of {}", file.name_with_extension);

    let result = match &file.identity {
        FileIdentity::Path(path) => probe.read_duration(path).await,
        FileIdentity::Memory { name, bytes } => match StagedFile::create(name, bytes).await {
            Ok(staged) => probe.read_duration(staged.path()).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(duration_seconds) => {
            info!(
                "Duration of {} is {:.2}s",
                file.name_with_extension, duration_seconds
            );
            ProbeOutcome::resolved(duration_seconds)
        }
        Err(e) => {
            warn!(
                "Duration probe failed for {}, treating as unknown: {}",
                file.name_with_extension, e
            );
            ProbeOutcome::failed()
        }
    }
}
