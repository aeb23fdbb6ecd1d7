//! Catalog entity models for the SQLite-backed store.
//!
//! Row structs mirror the database schema; `New*` structs carry the fields
//! of a row about to be inserted (ids are assigned by the store). Media
//! fields hold paths relative to the media root, never bytes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    /// Relative path of the portrait image in the media store.
    pub image: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct NewArtist {
    pub name: String,
    pub image: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
    pub cover_image: String,
    pub release_date: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct NewAlbum {
    pub title: String,
    pub artist_id: i64,
    pub cover_image: String,
    pub release_date: NaiveDate,
}

/// Album row joined with the owning artist's display name.
#[derive(Clone, Debug, Serialize)]
pub struct AlbumWithArtist {
    pub album: Album,
    pub artist_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
    /// Cleared (set to None) when the owning album is deleted.
    pub album_id: Option<i64>,
    pub duration_secs: i64,
    pub release_date: NaiveDate,
    pub audio_file: Option<String>,
    pub cover_image: Option<String>,
    pub lyrics: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewSong {
    pub title: String,
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub duration_secs: i64,
    pub release_date: NaiveDate,
    pub audio_file: Option<String>,
    pub cover_image: Option<String>,
    pub lyrics: Option<String>,
}

/// Song row joined with the owning album's cover path (None for songs
/// without an album, distinct from the song's own cover_image).
#[derive(Clone, Debug, Serialize)]
pub struct SongWithAlbumCover {
    pub song: Song,
    pub album_cover: Option<String>,
}

/// Parse a duration form value into whole seconds.
///
/// Accepts `SS`, `MM:SS` or `HH:MM:SS`.
pub fn parse_duration_secs(s: &str) -> Option<i64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut total: i64 = 0;
    for part in &parts {
        let value: i64 = part.parse().ok()?;
        if value < 0 || (parts.len() > 1 && part.len() > 2) {
            return None;
        }
        total = total * 60 + value;
    }
    Some(total)
}

/// Format whole seconds back as `H:MM:SS`.
pub fn format_duration_secs(secs: i64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}
