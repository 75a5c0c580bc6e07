//! Catalog entries and preview paths.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata record for one processed video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Random identifier (UUID v4).
    pub id: String,
    /// Video file name without its extension.
    pub name: String,
    /// Normalized path of the written contact sheet.
    pub image: String,
}

impl CatalogEntry {
    /// Create an entry with a freshly generated identifier.
    pub fn new(name: impl Into<String>, image: &Path) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            image: image.to_string_lossy().into_owned(),
        }
    }
}

/// File stem of a video path, lossily converted to UTF-8.
pub fn video_name(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Where the contact sheet of `video_path` is written:
/// `<same directory>/<stem><suffix>.jpg`, normalized.
pub fn preview_path(video_path: &Path, suffix: &str) -> PathBuf {
    let file_name = format!("{}{suffix}.jpg", video_name(video_path));
    let directory = video_path.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&directory.join(file_name))
}

/// Lexically normalize a path: drop `.` components and fold `dir/..`
/// pairs, without touching the filesystem.
///
/// Leading `..` components of a relative path are kept, `..` directly
/// under the root is dropped, and an empty result becomes `.`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.last() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }

    if normalized.is_empty() {
        return PathBuf::from(".");
    }
    normalized.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("videos/./trips/../clip.jpg")),
            PathBuf::from("videos/clip.jpg")
        );
        assert_eq!(
            normalize_path(Path::new("../videos/clip.jpg")),
            PathBuf::from("../videos/clip.jpg")
        );
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(normalize_path(Path::new("")), PathBuf::from("."));
    }

    #[cfg(unix)]
    #[test]
    fn normalize_stops_at_root() {
        assert_eq!(
            normalize_path(Path::new("/../media//clip.mp4")),
            PathBuf::from("/media/clip.mp4")
        );
    }

    #[test]
    fn preview_sits_next_to_video() {
        assert_eq!(
            preview_path(Path::new("media/./holiday.mp4"), "_preview"),
            PathBuf::from("media/holiday_preview.jpg")
        );
        assert_eq!(
            preview_path(Path::new("clip.tar.mkv"), "_preview"),
            PathBuf::from("clip.tar_preview.jpg")
        );
    }

    #[test]
    fn entries_get_distinct_ids() {
        let image = Path::new("a_preview.jpg");
        let first = CatalogEntry::new("a", image);
        let second = CatalogEntry::new("a", image);
        assert_ne!(first.id, second.id);
        assert!(Uuid::parse_str(&first.id).is_ok());
        assert_eq!(first.image, "a_preview.jpg");
    }
}
