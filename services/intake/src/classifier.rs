//! File classification for the publish form

use crate::models::{Classification, FileKind, SelectedFile};
use std::path::Path;
use tracing::debug;

/// Extensions treated as markdown posts when the host reports no MIME type
pub const MARKDOWN_FILE_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

/// Classify a selection. `None` is the cleared state.
pub fn classify_selection(file: Option<&SelectedFile>) -> Option<Classification> {
    file.map(classify)
}

/// Classify a file from its declared MIME type, falling back to the
/// extension only when no MIME type was declared.
pub fn classify(file: &SelectedFile) -> Classification {
    let extension = extension_of(&file.name_with_extension);

    let declared = file
        .declared_mime_type
        .as_deref()
        .map(str::trim)
        .filter(|mime| !mime.is_empty());

    let (kind, is_mp4) = match declared {
        Some(mime) => {
            let mut parts = mime.splitn(2, '/');
            let primary = parts.next().unwrap_or_default().to_ascii_lowercase();
            let sub_type = parts
                .next()
                .map(|s| s.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
                .unwrap_or_default();

            match primary.as_str() {
                "video" => (FileKind::Video, sub_type == "mp4"),
                "text" if sub_type == "plain" || sub_type == "markdown" => (FileKind::TextPost, false),
                _ => (FileKind::Generic, false),
            }
        }
        None => match extension.as_deref() {
            Some(ext) if MARKDOWN_FILE_EXTENSIONS.contains(&ext) => (FileKind::TextPost, false),
            _ => (FileKind::Generic, false),
        },
    };

    debug!(
        file = %file.name_with_extension,
        mime = ?declared,
        ?kind,
        is_mp4,
        "Classified selected file"
    );

    Classification {
        kind,
        is_mp4,
        extension,
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
