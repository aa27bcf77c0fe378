//! ffmpeg capability detection

use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

/// Whether a transcoding engine is present on the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FfmpegStatus {
    pub available: bool,
    pub version: Option<String>,
}

impl FfmpegStatus {
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Detect ffmpeg by running `<program> -version`.
    ///
    /// A missing executable or a failing run reports unavailable rather than
    /// an error.
    pub async fn detect(program: &str) -> Self {
        let output = match Command::new(program)
            .arg("-version")
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("FFmpeg not found at {}: {}", program, e);
                return Self::unavailable();
            }
        };

        if !output.status.success() {
            warn!("FFmpeg at {} failed with status: {:?}", program, output.status);
            return Self::unavailable();
        }

        let version = Self::parse_version(&String::from_utf8_lossy(&output.stdout));
        info!("FFmpeg available at {} (version {:?})", program, version);

        Self {
            available: true,
            version,
        }
    }

    /// Version token from the banner, e.g. `6.1.1` from
    /// `ffmpeg version 6.1.1 Copyright (c) ...`.
    pub fn parse_version(banner: &str) -> Option<String> {
        let first_line = banner.lines().next()?;
        let mut words = first_line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some(_), Some("version"), Some(version)) => Some(version.to_string()),
            _ => None,
        }
    }
}
