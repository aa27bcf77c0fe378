//! Transcode advisor
//!
//! Decides whether a video's bitrate warrants transcoding and estimates how
//! long the optimize pass would take. Everything here is pure.

use serde::Serialize;
use std::fmt;

/// Bitrate above which transcoding is suggested, in bits per second
pub const RECOMMENDED_BITRATE: f64 = 6_000_000.0;

/// Assumed transcoding throughput
pub const PROCESSING_MB_PER_SECOND: f64 = 0.5;

/// Size thresholds (in MB) for reporting the estimate in minutes / hours
pub const MINUTES_THRESHOLD: f64 = 30.0;
pub const HOURS_THRESHOLD: f64 = MINUTES_THRESHOLD * 60.0;

const BYTES_PER_MB: f64 = 1_000_000.0;

/// Inputs the advisor is recomputed from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdvisorInput {
    pub size_bytes: u64,
    pub duration_seconds: f64,
    pub is_video: bool,
    pub file_selected: bool,
    pub ffmpeg_available: bool,
    pub user_optimize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

/// Rounded processing time with its display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimatedDuration {
    pub value: u64,
    pub unit: TimeUnit,
    pub plural: bool,
}

impl fmt::Display for EstimatedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match (self.unit, self.plural) {
            (TimeUnit::Seconds, true) => "seconds",
            (TimeUnit::Seconds, false) => "second",
            (TimeUnit::Minutes, true) => "minutes",
            (TimeUnit::Minutes, false) => "minute",
            (TimeUnit::Hours, true) => "hours",
            (TimeUnit::Hours, false) => "hour",
        };
        write!(f, "{} {}", self.value, unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscodeEstimate {
    pub bitrate_bits_per_second: f64,
    pub recommended: bool,
    pub size_mb: f64,
    pub seconds_to_process: f64,
    pub estimated_duration: EstimatedDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscodeAdvice {
    #[serde(flatten)]
    pub estimate: TranscodeEstimate,
    pub optimize_available: bool,
    pub optimize_active: bool,
}

impl TranscodeAdvice {
    /// Sentence shown under the optimize checkbox, only while the optimize
    /// pass is actually going to run on a non-empty video.
    pub fn estimate_message(&self) -> Option<String> {
        if !self.optimize_active || self.estimate.size_mb <= 0.0 {
            return None;
        }

        Some(format!(
            "Transcoding this {} MB file should take under {}.",
            self.estimate.size_mb.ceil() as u64,
            self.estimate.estimated_duration
        ))
    }
}

/// Bits per second, or 0 when either input is 0.
pub fn bitrate(size_bytes: u64, duration_seconds: f64) -> f64 {
    if size_bytes > 0 && duration_seconds > 0.0 {
        (size_bytes as f64 * 8.0) / duration_seconds
    } else {
        0.0
    }
}

/// Estimate the optimize pass duration from the file size alone.
///
/// The unit is picked by comparing the size in MB against the minute and
/// hour thresholds; the value is the processing time floored in that unit.
pub fn estimate_processing_time(size_bytes: u64) -> EstimatedDuration {
    let size_mb = size_bytes as f64 / BYTES_PER_MB;
    let seconds_to_process = size_mb / PROCESSING_MB_PER_SECOND;

    if size_mb < MINUTES_THRESHOLD {
        EstimatedDuration {
            value: seconds_to_process.floor() as u64,
            unit: TimeUnit::Seconds,
            plural: seconds_to_process > 1.0,
        }
    } else if size_mb < HOURS_THRESHOLD {
        let minutes = (seconds_to_process / 60.0).floor();
        EstimatedDuration {
            value: minutes as u64,
            unit: TimeUnit::Minutes,
            plural: minutes > 1.0,
        }
    } else {
        let hours = (seconds_to_process / 60.0 / 60.0).floor();
        EstimatedDuration {
            value: hours as u64,
            unit: TimeUnit::Hours,
            plural: hours > 1.0,
        }
    }
}

pub fn advise(input: &AdvisorInput) -> TranscodeAdvice {
    let size_mb = input.size_bytes as f64 / BYTES_PER_MB;
    let bitrate_bits_per_second = bitrate(input.size_bytes, input.duration_seconds);
    let recommended = input.is_video
        && input.duration_seconds > 0.0
        && bitrate_bits_per_second > RECOMMENDED_BITRATE;

    let optimize_available = input.file_selected && input.is_video && input.ffmpeg_available;

    TranscodeAdvice {
        estimate: TranscodeEstimate {
            bitrate_bits_per_second,
            recommended,
            size_mb,
            seconds_to_process: size_mb / PROCESSING_MB_PER_SECOND,
            estimated_duration: estimate_processing_time(input.size_bytes),
        },
        optimize_available,
        optimize_active: optimize_available && input.user_optimize,
    }
}
