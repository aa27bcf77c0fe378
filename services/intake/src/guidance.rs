//! Help text shown under the file selector

use crate::transcode::{RECOMMENDED_BITRATE, bitrate};
use serde::Serialize;

pub const UPLOAD_GUIDE_URL: &str = "https://lbry.com/faq/video-publishing-guide";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UploadAdvice {
    /// Video bitrate is above the recommended ceiling
    HighBitrate,
    /// Video duration could not be read, so the format is suspect
    UnverifiedFormat,
    /// Editing a claim without picking a new file keeps the old one
    KeepExistingFile { name: String },
    /// Default hint for new uploads
    General,
}

impl UploadAdvice {
    pub fn is_warning(&self) -> bool {
        matches!(self, UploadAdvice::HighBitrate | UploadAdvice::UnverifiedFormat)
    }

    pub fn message(&self) -> String {
        match self {
            UploadAdvice::HighBitrate => format!(
                "Your video has a bitrate over 5 Mbps. We suggest transcoding to provide viewers the best experience. Upload Guide: {UPLOAD_GUIDE_URL}"
            ),
            UploadAdvice::UnverifiedFormat => format!(
                "Your video may not be the best format. Use MP4s in H264/AAC format and a friendly bitrate (under 5 Mbps) and resolution (720p) for more reliable streaming. Upload Guide: {UPLOAD_GUIDE_URL}"
            ),
            UploadAdvice::KeepExistingFile { name } => format!(
                "If you don't choose a file, the file from your existing claim {name} will be used"
            ),
            UploadAdvice::General => format!(
                "For video content, use MP4s in H264/AAC format and a friendly bitrate (under 5 Mbps) and resolution (720p) for more reliable streaming. Upload Guide: {UPLOAD_GUIDE_URL}"
            ),
        }
    }
}

/// Pick the hint for the current form state; first match wins.
pub fn upload_advice(
    is_video: bool,
    size_bytes: u64,
    duration_seconds: f64,
    is_still_editing: bool,
    name: Option<&str>,
) -> Option<UploadAdvice> {
    if is_video && duration_seconds > 0.0 && bitrate(size_bytes, duration_seconds) > RECOMMENDED_BITRATE {
        return Some(UploadAdvice::HighBitrate);
    }

    if is_video && duration_seconds <= 0.0 {
        return Some(UploadAdvice::UnverifiedFormat);
    }

    match name.filter(|n| !n.is_empty()) {
        Some(name) if is_still_editing => Some(UploadAdvice::KeepExistingFile {
            name: name.to_string(),
        }),
        _ if !is_still_editing => Some(UploadAdvice::General),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_take_precedence() {
        assert_eq!(
            upload_advice(true, 60_000_000, 60.0, true, Some("clip")),
            Some(UploadAdvice::HighBitrate)
        );
        assert_eq!(
            upload_advice(true, 60_000_000, 0.0, false, None),
            Some(UploadAdvice::UnverifiedFormat)
        );
        assert!(UploadAdvice::HighBitrate.is_warning());
    }

    #[test]
    fn test_editing_hints() {
        assert_eq!(
            upload_advice(false, 10, 0.0, true, Some("my-claim")),
            Some(UploadAdvice::KeepExistingFile {
                name: "my-claim".to_string()
            })
        );
        assert_eq!(upload_advice(false, 10, 0.0, true, None), None);
        assert_eq!(upload_advice(false, 10, 0.0, true, Some("")), None);
    }

    #[test]
    fn test_general_hint_for_new_uploads() {
        let advice = upload_advice(true, 10_000_000, 60.0, false, None);
        assert_eq!(advice, Some(UploadAdvice::General));
        assert!(!UploadAdvice::General.is_warning());
        assert!(UploadAdvice::General.message().contains(UPLOAD_GUIDE_URL));
    }

    #[test]
    fn test_keep_existing_message_names_claim() {
        let advice = UploadAdvice::KeepExistingFile {
            name: "lecture-01".to_string(),
        };
        assert!(advice.message().contains("existing claim lecture-01"));
    }
}
