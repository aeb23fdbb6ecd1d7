//! Storage for uploaded media files (artist images, album covers, song
//! audio and song covers). Files land under a root directory, partitioned
//! per category, and are addressed by the relative path returned on store.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    ArtistImage,
    AlbumCover,
    SongAudio,
    SongCover,
}

impl MediaCategory {
    fn dir(&self) -> &'static str {
        match self {
            MediaCategory::ArtistImage => "artists",
            MediaCategory::AlbumCover => "albums",
            MediaCategory::SongAudio => "songs",
            MediaCategory::SongCover => "songs/covers",
        }
    }
}

pub trait MediaStore: Send + Sync {
    /// Persist `bytes` under the given category, deriving the stored name
    /// from `filename`. Returns the path relative to the media root.
    fn store(&self, category: MediaCategory, filename: &str, bytes: &[u8]) -> Result<String>;

    fn root(&self) -> &Path;
}

pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create media root {:?}", root))?;
        Ok(FsMediaStore { root })
    }
}

/// Strip path components and replace anything outside a safe charset, so a
/// client-supplied filename can never escape the category directory.
fn sanitize_file_name(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.trim_matches(['.', '_']).is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

impl MediaStore for FsMediaStore {
    fn store(&self, category: MediaCategory, filename: &str, bytes: &[u8]) -> Result<String> {
        let mut name = sanitize_file_name(filename);

        // Client filenames without an extension get one sniffed from the
        // content, so downstream file serving picks the right mime type.
        if !name.contains('.') {
            if let Some(kind) = infer::get(bytes) {
                name = format!("{}.{}", name, kind.extension());
            }
        }

        let relative = format!("{}/{}_{}", category.dir(), Uuid::new_v4(), name);
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create media directory {:?}", parent))?;
        }
        std::fs::write(&target, bytes)
            .with_context(|| format!("Failed to write media file {:?}", target))?;
        Ok(relative)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stores_file_under_category_dir() {
        let dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(dir.path()).unwrap();

        let path = store
            .store(MediaCategory::AlbumCover, "cover.jpg", b"jpegdata")
            .unwrap();

        assert!(path.starts_with("albums/"));
        assert!(path.ends_with("_cover.jpg"));
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), b"jpegdata");
    }

    #[test]
    fn stored_names_are_unique_per_upload() {
        let dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(dir.path()).unwrap();

        let first = store
            .store(MediaCategory::SongAudio, "track.mp3", b"a")
            .unwrap();
        let second = store
            .store(MediaCategory::SongAudio, "track.mp3", b"b")
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(dir.path().join(&first)).unwrap(), b"a");
        assert_eq!(std::fs::read(dir.path().join(&second)).unwrap(), b"b");
    }

    #[test]
    fn sanitizes_path_traversal_attempts() {
        let dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(dir.path()).unwrap();

        let path = store
            .store(MediaCategory::ArtistImage, "../../etc/passwd", b"x")
            .unwrap();

        assert!(path.starts_with("artists/"));
        assert!(!path.contains(".."));
        assert!(dir.path().join(&path).exists());
    }

    #[test]
    fn extension_is_sniffed_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(dir.path()).unwrap();

        // Minimal PNG signature.
        let png_header = [0x89u8, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];
        let path = store
            .store(MediaCategory::ArtistImage, "portrait", &png_header)
            .unwrap();

        assert!(path.ends_with(".png"));
    }

    #[test]
    fn song_covers_live_in_their_own_subdir() {
        let dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(dir.path()).unwrap();

        let path = store
            .store(MediaCategory::SongCover, "art.png", b"p")
            .unwrap();
        assert!(path.starts_with("songs/covers/"));
    }
}
