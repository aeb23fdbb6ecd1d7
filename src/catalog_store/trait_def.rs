//! CatalogStore trait definition.

use super::models::*;
use thiserror::Error;

/// Error type for catalog storage operations.
///
/// `MissingParent` is the one failure callers are expected to branch on:
/// an insert referenced an artist or album that does not exist. The check
/// runs inside the same transaction as the insert, so it cannot race a
/// concurrent parent deletion.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("referenced {entity} '{id}' does not exist")]
    MissingParent { entity: &'static str, id: i64 },
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for catalog storage backends.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Insert an artist, returning the stored row with its assigned id.
    fn insert_artist(&self, artist: &NewArtist) -> StoreResult<Artist>;

    /// Insert an album. Fails with `MissingParent` if the artist does not exist.
    fn insert_album(&self, album: &NewAlbum) -> StoreResult<Album>;

    /// Insert a song. Fails with `MissingParent` if the artist, or the album
    /// when one is referenced, does not exist.
    fn insert_song(&self, song: &NewSong) -> StoreResult<Song>;

    /// Delete an artist and, in the same transaction, all its albums and
    /// songs. Returns false if no such artist existed.
    fn delete_artist(&self, id: i64) -> StoreResult<bool>;

    /// Delete an album, clearing the album reference of its songs in the
    /// same transaction. Returns false if no such album existed.
    fn delete_album(&self, id: i64) -> StoreResult<bool>;

    // =========================================================================
    // Reads
    // =========================================================================

    fn get_artist(&self, id: i64) -> StoreResult<Option<Artist>>;

    fn get_album(&self, id: i64) -> StoreResult<Option<AlbumWithArtist>>;

    fn get_song(&self, id: i64) -> StoreResult<Option<SongWithAlbumCover>>;

    /// All artists in insertion order.
    fn list_artists(&self) -> StoreResult<Vec<Artist>>;

    /// All albums in insertion order, each with its artist's display name.
    fn list_albums(&self) -> StoreResult<Vec<AlbumWithArtist>>;

    /// Songs belonging to an artist. An unknown artist id yields an empty
    /// vec, not an error.
    fn songs_by_artist(&self, artist_id: i64) -> StoreResult<Vec<SongWithAlbumCover>>;

    /// Songs belonging to an album, or None if the album does not exist.
    fn songs_by_album(&self, album_id: i64) -> StoreResult<Option<Vec<SongWithAlbumCover>>>;

    // =========================================================================
    // Counts (for the stats endpoint)
    // =========================================================================

    fn artists_count(&self) -> usize;

    fn albums_count(&self) -> usize;

    fn songs_count(&self) -> usize;
}
