//! Derived form state
//!
//! Everything the form shows beyond the raw patch is recomputed in one pass
//! from the current inputs, never updated field by field.

use crate::guidance::{UploadAdvice, upload_advice};
use crate::transcode::{AdvisorInput, TranscodeAdvice, advise};
use serde::Serialize;

/// Reactive inputs of the publish form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeInputs {
    pub file_selected: bool,
    pub size_bytes: u64,
    pub duration_seconds: f64,
    pub is_video: bool,
    pub ffmpeg_available: bool,
    pub user_optimize: bool,
    pub is_still_editing: bool,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedState {
    pub transcode: TranscodeAdvice,
    pub upload_advice: Option<UploadAdvice>,
}

impl DerivedState {
    pub fn optimize_available(&self) -> bool {
        self.transcode.optimize_available
    }

    pub fn optimize_active(&self) -> bool {
        self.transcode.optimize_active
    }

    pub fn estimate_message(&self) -> Option<String> {
        self.transcode.estimate_message()
    }
}

pub fn derive(inputs: &IntakeInputs) -> DerivedState {
    let transcode = advise(&AdvisorInput {
        size_bytes: inputs.size_bytes,
        duration_seconds: inputs.duration_seconds,
        is_video: inputs.is_video,
        file_selected: inputs.file_selected,
        ffmpeg_available: inputs.ffmpeg_available,
        user_optimize: inputs.user_optimize,
    });

    let upload_advice = upload_advice(
        inputs.is_video,
        inputs.size_bytes,
        inputs.duration_seconds,
        inputs.is_still_editing,
        inputs.name.as_deref(),
    );

    DerivedState {
        transcode,
        upload_advice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleared_inputs_derive_neutral_state() {
        let derived = derive(&IntakeInputs {
            ffmpeg_available: true,
            user_optimize: true,
            ..Default::default()
        });

        assert!(!derived.optimize_available());
        assert!(!derived.optimize_active());
        assert_eq!(derived.transcode.estimate.bitrate_bits_per_second, 0.0);
        assert_eq!(derived.estimate_message(), None);
        assert_eq!(derived.upload_advice, Some(UploadAdvice::General));
    }

    #[test]
    fn test_video_inputs_derive_everything_at_once() {
        let derived = derive(&IntakeInputs {
            file_selected: true,
            size_bytes: 60_000_000,
            duration_seconds: 60.0,
            is_video: true,
            ffmpeg_available: true,
            user_optimize: true,
            ..Default::default()
        });

        assert!(derived.transcode.estimate.recommended);
        assert!(derived.optimize_active());
        assert_eq!(derived.upload_advice, Some(UploadAdvice::HighBitrate));
        assert_eq!(
            derived.estimate_message().as_deref(),
            Some("Transcoding this 60 MB file should take under 2 minutes.")
        );
    }
}
