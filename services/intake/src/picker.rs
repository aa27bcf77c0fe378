//! Desktop file picking: turns a path into a [`SelectedFile`]

use crate::models::SelectedFile;
use std::path::Path;
use tracing::debug;

/// MIME type a desktop picker would report for a file name.
///
/// Unknown extensions report nothing, leaving classification to the
/// extension fallback.
pub fn guess_mime_type(name: &str) -> Option<&'static str> {
    mime_guess::from_path(name).first_raw()
}

/// Stat a file on disk and describe it the way a desktop picker would
pub async fn open_path(path: &Path) -> std::io::Result<SelectedFile> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = guess_mime_type(&name).map(str::to_string);
    debug!("Picked {} ({:?}, {} bytes)", path.display(), mime, metadata.len());

    Ok(SelectedFile::from_path(path, mime, metadata.len()))
}
