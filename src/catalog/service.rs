//! Catalog domain logic: validation of incoming create requests, media
//! persistence, and lookups, on top of a [`CatalogStore`] and [`MediaStore`].

use super::error::CatalogError;
use crate::catalog_store::{
    parse_duration_secs, Album, AlbumWithArtist, Artist, CatalogStore, NewAlbum, NewArtist,
    NewSong, Song, SongWithAlbumCover,
};
use crate::media_store::{MediaCategory, MediaStore};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

/// A file received with a create request, not yet persisted.
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct CreateArtist {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<Upload>,
}

#[derive(Default)]
pub struct CreateAlbum {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub release_date: Option<String>,
    pub cover_image: Option<Upload>,
}

#[derive(Default)]
pub struct CreateSong {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<String>,
    pub release_date: Option<String>,
    pub audio_file: Option<Upload>,
    pub cover_image: Option<Upload>,
    pub lyrics: Option<String>,
}

pub struct CatalogStats {
    pub artists: usize,
    pub albums: usize,
    pub songs: usize,
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    media: Arc<dyn MediaStore>,
}

type CatalogResult<T> = Result<T, CatalogError>;

fn require_text(field: &str, value: Option<String>) -> CatalogResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CatalogError::Validation(format!(
            "Missing required field '{}'",
            field
        ))),
    }
}

fn require_upload(field: &str, value: Option<Upload>) -> CatalogResult<Upload> {
    value.ok_or_else(|| CatalogError::Validation(format!("Missing required field '{}'", field)))
}

fn parse_id(field: &str, value: &str) -> CatalogResult<i64> {
    value.trim().parse().map_err(|_| {
        CatalogError::Validation(format!("Invalid value for field '{}'", field))
    })
}

fn parse_date(field: &str, value: &str) -> CatalogResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CatalogError::Validation(format!(
            "Invalid date for field '{}', expected YYYY-MM-DD",
            field
        ))
    })
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, media: Arc<dyn MediaStore>) -> Self {
        CatalogService { store, media }
    }

    pub fn media_root(&self) -> &std::path::Path {
        self.media.root()
    }

    fn store_media(&self, category: MediaCategory, upload: &Upload) -> CatalogResult<String> {
        self.media
            .store(category, &upload.filename, &upload.bytes)
            .map_err(CatalogError::MediaStorage)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    pub fn create_artist(&self, request: CreateArtist) -> CatalogResult<Artist> {
        let name = require_text("name", request.name)?;
        let image = require_upload("image", request.image)?;

        let image_path = self.store_media(MediaCategory::ArtistImage, &image)?;
        let artist = self.store.insert_artist(&NewArtist {
            name,
            image: image_path,
            description: request.description.unwrap_or_default(),
        })?;
        info!("Added artist '{}' ({})", artist.name, artist.id);
        Ok(artist)
    }

    pub fn create_album(&self, request: CreateAlbum) -> CatalogResult<Album> {
        let title = require_text("title", request.title)?;
        let artist_id = parse_id("artist", &require_text("artist", request.artist)?)?;
        let release_date = parse_date(
            "release_date",
            &require_text("release_date", request.release_date)?,
        )?;
        let cover = require_upload("cover_image", request.cover_image)?;

        // Resolve the parent before any media write so a rejected create
        // leaves nothing behind; the insert re-checks inside its transaction.
        if self.store.get_artist(artist_id)?.is_none() {
            return Err(CatalogError::NotFound("Artist does not exist"));
        }

        let cover_path = self.store_media(MediaCategory::AlbumCover, &cover)?;
        let album = self.store.insert_album(&NewAlbum {
            title,
            artist_id,
            cover_image: cover_path,
            release_date,
        })?;
        info!("Added album '{}' ({})", album.title, album.id);
        Ok(album)
    }

    pub fn create_song(&self, request: CreateSong) -> CatalogResult<Song> {
        let title = require_text("title", request.title)?;
        let artist_id = parse_id("artist", &require_text("artist", request.artist)?)?;
        let album_id = parse_id("album", &require_text("album", request.album)?)?;
        let duration_text = require_text("duration", request.duration)?;
        let duration_secs = parse_duration_secs(&duration_text).ok_or_else(|| {
            CatalogError::Validation(
                "Invalid duration, expected seconds or [HH:]MM:SS".to_string(),
            )
        })?;
        let release_date = match request.release_date {
            Some(ref value) if !value.trim().is_empty() => parse_date("release_date", value)?,
            _ => Local::now().date_naive(),
        };

        if self.store.get_artist(artist_id)?.is_none() {
            return Err(CatalogError::NotFound("Artist does not exist"));
        }
        if self.store.get_album(album_id)?.is_none() {
            return Err(CatalogError::NotFound("Album does not exist"));
        }

        let audio_file = request
            .audio_file
            .as_ref()
            .map(|f| self.store_media(MediaCategory::SongAudio, f))
            .transpose()?;
        let cover_image = request
            .cover_image
            .as_ref()
            .map(|f| self.store_media(MediaCategory::SongCover, f))
            .transpose()?;
        let lyrics = request.lyrics.filter(|text| !text.trim().is_empty());

        let song = self.store.insert_song(&NewSong {
            title,
            artist_id,
            album_id: Some(album_id),
            duration_secs,
            release_date,
            audio_file,
            cover_image,
            lyrics,
        })?;
        info!("Added song '{}' ({})", song.title, song.id);
        Ok(song)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn artists(&self) -> CatalogResult<Vec<Artist>> {
        Ok(self.store.list_artists()?)
    }

    pub fn artist(&self, id: i64) -> CatalogResult<Artist> {
        self.store
            .get_artist(id)?
            .ok_or(CatalogError::NotFound("Artist not found"))
    }

    pub fn artist_songs(&self, artist_id: i64) -> CatalogResult<Vec<SongWithAlbumCover>> {
        Ok(self.store.songs_by_artist(artist_id)?)
    }

    pub fn albums(&self) -> CatalogResult<Vec<AlbumWithArtist>> {
        Ok(self.store.list_albums()?)
    }

    pub fn album(&self, id: i64) -> CatalogResult<AlbumWithArtist> {
        self.store
            .get_album(id)?
            .ok_or(CatalogError::NotFound("Album not found"))
    }

    pub fn album_songs(&self, album_id: i64) -> CatalogResult<Vec<SongWithAlbumCover>> {
        self.store
            .songs_by_album(album_id)?
            .ok_or(CatalogError::NotFound("Album not found"))
    }

    pub fn song(&self, id: i64) -> CatalogResult<SongWithAlbumCover> {
        self.store
            .get_song(id)?
            .ok_or(CatalogError::NotFound("Song not found"))
    }

    // =========================================================================
    // Removal
    // =========================================================================

    pub fn delete_artist(&self, id: i64) -> CatalogResult<()> {
        if self.store.delete_artist(id)? {
            info!("Deleted artist {}", id);
            Ok(())
        } else {
            Err(CatalogError::NotFound("Artist not found"))
        }
    }

    pub fn delete_album(&self, id: i64) -> CatalogResult<()> {
        if self.store.delete_album(id)? {
            info!("Deleted album {}", id);
            Ok(())
        } else {
            Err(CatalogError::NotFound("Album not found"))
        }
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            artists: self.store.artists_count(),
            albums: self.store.albums_count(),
            songs: self.store.songs_count(),
        }
    }
}
