//! Run identifiers, downloaded artifacts, and media-kind classification.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-process sequence mixed into run identifiers
static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of one download run.
///
/// Namespaces everything an extraction produces in the shared download
/// directory. Wall-clock milliseconds carry the value; the atomic sequence
/// guarantees uniqueness among concurrent in-flight runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

impl RunId {
    /// Allocate the next run identifier.
    #[must_use]
    pub fn next() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let seq = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xFFF;
        Self((millis << 12) | seq)
    }

    /// File name prefix shared by every artifact of this run.
    #[must_use]
    pub fn file_prefix(&self) -> String {
        format!("ig_{}_", self.0)
    }

    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram send variant chosen for a downloaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Image extensions, sent as a photo
    Photo,
    /// Video-container extensions, sent as a streamable video
    Video,
    /// Everything else, sent as a generic document
    Document,
}

/// Extension-to-kind mapping table
const EXTENSION_KINDS: &[(&str, MediaKind)] = &[
    ("jpg", MediaKind::Photo),
    ("jpeg", MediaKind::Photo),
    ("png", MediaKind::Photo),
    ("webp", MediaKind::Photo),
    ("mp4", MediaKind::Video),
    ("mov", MediaKind::Video),
    ("avi", MediaKind::Video),
    ("mkv", MediaKind::Video),
];

impl MediaKind {
    /// Classify a file by its extension (case-insensitive). Unknown or
    /// missing extensions fall back to [`MediaKind::Document`].
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Document;
        };
        let ext = ext.to_lowercase();
        EXTENSION_KINDS
            .iter()
            .find(|(e, _)| *e == ext)
            .map_or(Self::Document, |(_, kind)| *kind)
    }
}

/// One file produced by an extraction run
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Location inside the download directory
    pub path: PathBuf,
    /// Byte size at resolution time
    pub size: u64,
    /// Send variant inferred from the extension
    pub kind: MediaKind,
}

impl Artifact {
    /// File name component, for user-facing per-item reports.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunId::next();
        let b = RunId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_file_prefix_format() {
        let run = RunId::from_raw(42);
        assert_eq!(run.file_prefix(), "ig_42_");
    }

    #[test]
    fn test_image_extensions() {
        for ext in ["jpg", "jpeg", "png", "webp"] {
            let path = PathBuf::from(format!("file.{ext}"));
            assert_eq!(MediaKind::from_path(&path), MediaKind::Photo, "{ext}");
        }
    }

    #[test]
    fn test_video_extensions() {
        for ext in ["mp4", "mov", "avi", "mkv"] {
            let path = PathBuf::from(format!("file.{ext}"));
            assert_eq!(MediaKind::from_path(&path), MediaKind::Video, "{ext}");
        }
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(
            MediaKind::from_path(Path::new("clip.MP4")),
            MediaKind::Video
        );
        assert_eq!(
            MediaKind::from_path(Path::new("pic.JPEG")),
            MediaKind::Photo
        );
    }

    #[test]
    fn test_unknown_extension_is_document() {
        assert_eq!(
            MediaKind::from_path(Path::new("notes.txt")),
            MediaKind::Document
        );
        assert_eq!(MediaKind::from_path(Path::new("noext")), MediaKind::Document);
    }

    #[test]
    fn test_artifact_file_name() {
        let artifact = Artifact {
            path: PathBuf::from("downloads/ig_1_abc.mp4"),
            size: 10,
            kind: MediaKind::Video,
        };
        assert_eq!(artifact.file_name(), "ig_1_abc.mp4");
    }
}
