use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the bytes of a selected file live.
///
/// Desktop hosts hand over a filesystem path, web hosts an in-memory handle.
/// A file is never both.
#[derive(Debug, Clone, PartialEq)]
pub enum FileIdentity {
    Path(PathBuf),
    Memory { name: String, bytes: Arc<[u8]> },
}

impl FileIdentity {
    /// Key used to recognise the currently selected file: the path on
    /// desktop, the file name on web.
    pub fn key(&self) -> String {
        match self {
            FileIdentity::Path(path) => path.to_string_lossy().into_owned(),
            FileIdentity::Memory { name, .. } => name.clone(),
        }
    }
}

/// The user's chosen upload candidate. Replaced wholesale on every selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub identity: FileIdentity,
    pub declared_mime_type: Option<String>,
    pub size_bytes: u64,
    pub name_with_extension: String,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>, mime_type: Option<String>, size_bytes: u64) -> Self {
        let path = path.into();
        let name_with_extension = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            identity: FileIdentity::Path(path),
            declared_mime_type: mime_type,
            size_bytes,
            name_with_extension,
        }
    }

    pub fn from_bytes(name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let size_bytes = bytes.len() as u64;

        Self {
            identity: FileIdentity::Memory {
                name: name.clone(),
                bytes: bytes.into(),
            },
            declared_mime_type: mime_type,
            size_bytes,
            name_with_extension: name,
        }
    }

    /// File name without its last extension. A name without a dot is kept whole.
    pub fn base_name(&self) -> &str {
        match self.name_with_extension.rfind('.') {
            Some(idx) => &self.name_with_extension[..idx],
            None => &self.name_with_extension,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.identity {
            FileIdentity::Path(path) => Some(path),
            FileIdentity::Memory { .. } => None,
        }
    }
}

/// Logical type of a selected file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    Video,
    TextPost,
    Generic,
}

/// Result of classifying a selected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: FileKind,
    /// Sub-type was `mp4`; only these videos get their duration probed
    pub is_mp4: bool,
    /// Lower-cased extension, if the name has one
    pub extension: Option<String>,
}

impl Classification {
    pub fn is_video(&self) -> bool {
        self.kind == FileKind::Video
    }

    pub fn wants_duration_probe(&self) -> bool {
        self.is_video() && self.is_mp4
    }
}

/// Which editing surface is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    File,
    Post,
}

/// Value of the `filePath` form field
#[derive(Debug, Clone, PartialEq)]
pub enum FilePathValue {
    Cleared,
    Selected(FileIdentity),
}

impl Serialize for FilePathValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilePathValue::Cleared => serializer.serialize_str(""),
            FilePathValue::Selected(identity) => serializer.serialize_str(&identity.key()),
        }
    }
}

/// Sparse update for the publish form. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishFormPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<FilePathValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_dur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_vid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_text: Option<String>,
}

impl PublishFormPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fold `other` into `self`; fields present in `other` win.
    pub fn merge(&mut self, other: PublishFormPatch) {
        if other.file_path.is_some() {
            self.file_path = other.file_path;
        }
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.file_dur.is_some() {
            self.file_dur = other.file_dur;
        }
        if other.file_size.is_some() {
            self.file_size = other.file_size;
        }
        if other.file_vid.is_some() {
            self.file_vid = other.file_vid;
        }
        if other.optimize.is_some() {
            self.optimize = other.optimize;
        }
        if other.file_text.is_some() {
            self.file_text = other.file_text;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_last_extension() {
        let file = SelectedFile::from_path("/videos/my.trip.mp4", Some("video/mp4".into()), 10);
        assert_eq!(file.name_with_extension, "my.trip.mp4");
        assert_eq!(file.base_name(), "my.trip");

        let file = SelectedFile::from_bytes("README", None, vec![]);
        assert_eq!(file.base_name(), "README");
    }

    #[test]
    fn test_identity_key() {
        let file = SelectedFile::from_path("/videos/clip.mp4", None, 1);
        assert_eq!(file.identity.key(), "/videos/clip.mp4");

        let file = SelectedFile::from_bytes("clip.mp4", None, vec![1, 2, 3]);
        assert_eq!(file.identity.key(), "clip.mp4");
        assert_eq!(file.size_bytes, 3);
        assert!(file.path().is_none());
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = PublishFormPatch {
            file_path: Some(FilePathValue::Cleared),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"filePath":""}"#);

        let patch = PublishFormPatch {
            file_dur: Some(12.5),
            file_size: Some(1000),
            file_vid: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"fileDur": 12.5, "fileSize": 1000, "fileVid": true})
        );
    }

    #[test]
    fn test_patch_merge_keeps_untouched_fields() {
        let mut form = PublishFormPatch {
            name: Some("holiday".into()),
            title: Some("Holiday".into()),
            ..Default::default()
        };
        form.merge(PublishFormPatch {
            name: Some("".into()),
            optimize: Some(true),
            ..Default::default()
        });

        assert_eq!(form.name.as_deref(), Some(""));
        assert_eq!(form.title.as_deref(), Some("Holiday"));
        assert_eq!(form.optimize, Some(true));
        assert!(PublishFormPatch::default().is_empty());
    }
}
