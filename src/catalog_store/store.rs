//! SQLite-backed catalog store implementation.
//!
//! A single mutex-guarded write connection serializes all mutations; each
//! mutation runs as one `BEGIN IMMEDIATE` transaction so foreign-key
//! resolution and the cascade/nullify delete rules are atomic. Reads go
//! through a small round-robin pool of read-only WAL connections.

use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::{CatalogStore, StoreError, StoreResult};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);
    let db_version: i64 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    if db_version != (BASE_DB_VERSION + latest_version) as i64 {
        bail!(
            "Catalog database has unsupported version {} (expected {})",
            db_version,
            BASE_DB_VERSION + latest_version
        );
    }

    latest_schema
        .validate(conn)
        .context("Existing catalog database does not match the expected schema")?;
    Ok(())
}

impl SqliteCatalogStore {
    /// Open (or create) the catalog database at `db_path`.
    ///
    /// `read_pool_size` is the number of read-only connections opened for
    /// concurrent read operations.
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        let artist_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))
            .unwrap_or(0);
        let album_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM albums", [], |r| r.get(0))
            .unwrap_or(0);
        let song_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened catalog: {} artists, {} albums, {} songs",
            artist_count, album_count, song_count
        );

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn count(&self, table: &str) -> usize {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }

    // =========================================================================
    // Internal Helper Methods
    // =========================================================================

    fn artist_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM artists WHERE id = ?1)",
            params![id],
            |r| r.get(0),
        )
    }

    fn album_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM albums WHERE id = ?1)",
            params![id],
            |r| r.get(0),
        )
    }

    fn parse_date(row_index: usize, value: String) -> rusqlite::Result<NaiveDate> {
        NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(row_index, Type::Text, Box::new(e))
        })
    }

    /// Parse an Artist from a row (id, name, image, description).
    fn parse_artist_row(row: &rusqlite::Row) -> rusqlite::Result<Artist> {
        Ok(Artist {
            id: row.get(0)?,
            name: row.get(1)?,
            image: row.get(2)?,
            description: row.get(3)?,
        })
    }

    /// Parse an AlbumWithArtist from a row
    /// (id, title, artist_id, cover_image, release_date, artist_name).
    fn parse_album_row(row: &rusqlite::Row) -> rusqlite::Result<AlbumWithArtist> {
        Ok(AlbumWithArtist {
            album: Album {
                id: row.get(0)?,
                title: row.get(1)?,
                artist_id: row.get(2)?,
                cover_image: row.get(3)?,
                release_date: Self::parse_date(4, row.get(4)?)?,
            },
            artist_name: row.get(5)?,
        })
    }

    /// Parse a SongWithAlbumCover from a row
    /// (id, title, artist_id, album_id, duration_secs, release_date,
    ///  audio_file, cover_image, lyrics, album_cover).
    fn parse_song_row(row: &rusqlite::Row) -> rusqlite::Result<SongWithAlbumCover> {
        Ok(SongWithAlbumCover {
            song: Song {
                id: row.get(0)?,
                title: row.get(1)?,
                artist_id: row.get(2)?,
                album_id: row.get(3)?,
                duration_secs: row.get(4)?,
                release_date: Self::parse_date(5, row.get(5)?)?,
                audio_file: row.get(6)?,
                cover_image: row.get(7)?,
                lyrics: row.get(8)?,
            },
            album_cover: row.get(9)?,
        })
    }
}

const SONG_SELECT: &str = "SELECT s.id, s.title, s.artist_id, s.album_id, s.duration_secs, \
     s.release_date, s.audio_file, s.cover_image, s.lyrics, a.cover_image \
     FROM songs s LEFT JOIN albums a ON a.id = s.album_id";

const ALBUM_SELECT: &str = "SELECT al.id, al.title, al.artist_id, al.cover_image, \
     al.release_date, ar.name \
     FROM albums al JOIN artists ar ON ar.id = al.artist_id";

impl CatalogStore for SqliteCatalogStore {
    // =========================================================================
    // Write Operations (one transaction each)
    // =========================================================================

    fn insert_artist(&self, artist: &NewArtist) -> StoreResult<Artist> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> StoreResult<Artist> {
            conn.execute(
                "INSERT INTO artists (name, image, description) VALUES (?1, ?2, ?3)",
                params![&artist.name, &artist.image, &artist.description],
            )?;
            Ok(Artist {
                id: conn.last_insert_rowid(),
                name: artist.name.clone(),
                image: artist.image.clone(),
                description: artist.description.clone(),
            })
        })();

        match result {
            Ok(created) => {
                conn.execute("COMMIT", [])?;
                Ok(created)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn insert_album(&self, album: &NewAlbum) -> StoreResult<Album> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> StoreResult<Album> {
            if !Self::artist_exists(&conn, album.artist_id)? {
                return Err(StoreError::MissingParent {
                    entity: "Artist",
                    id: album.artist_id,
                });
            }

            conn.execute(
                "INSERT INTO albums (title, artist_id, cover_image, release_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    &album.title,
                    album.artist_id,
                    &album.cover_image,
                    album.release_date.to_string(),
                ],
            )?;
            Ok(Album {
                id: conn.last_insert_rowid(),
                title: album.title.clone(),
                artist_id: album.artist_id,
                cover_image: album.cover_image.clone(),
                release_date: album.release_date,
            })
        })();

        match result {
            Ok(created) => {
                conn.execute("COMMIT", [])?;
                Ok(created)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn insert_song(&self, song: &NewSong) -> StoreResult<Song> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> StoreResult<Song> {
            if !Self::artist_exists(&conn, song.artist_id)? {
                return Err(StoreError::MissingParent {
                    entity: "Artist",
                    id: song.artist_id,
                });
            }
            if let Some(album_id) = song.album_id {
                if !Self::album_exists(&conn, album_id)? {
                    return Err(StoreError::MissingParent {
                        entity: "Album",
                        id: album_id,
                    });
                }
            }

            conn.execute(
                "INSERT INTO songs (title, artist_id, album_id, duration_secs, release_date,
                                    audio_file, cover_image, lyrics)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    &song.title,
                    song.artist_id,
                    song.album_id,
                    song.duration_secs,
                    song.release_date.to_string(),
                    &song.audio_file,
                    &song.cover_image,
                    &song.lyrics,
                ],
            )?;
            Ok(Song {
                id: conn.last_insert_rowid(),
                title: song.title.clone(),
                artist_id: song.artist_id,
                album_id: song.album_id,
                duration_secs: song.duration_secs,
                release_date: song.release_date,
                audio_file: song.audio_file.clone(),
                cover_image: song.cover_image.clone(),
                lyrics: song.lyrics.clone(),
            })
        })();

        match result {
            Ok(created) => {
                conn.execute("COMMIT", [])?;
                Ok(created)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn delete_artist(&self, id: i64) -> StoreResult<bool> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> StoreResult<bool> {
            if !Self::artist_exists(&conn, id)? {
                return Ok(false);
            }

            // Songs by other artists that sit on this artist's albums only
            // lose the album link; the artist's own songs go away entirely.
            conn.execute(
                "UPDATE songs SET album_id = NULL
                 WHERE album_id IN (SELECT id FROM albums WHERE artist_id = ?1)",
                params![id],
            )?;
            conn.execute("DELETE FROM songs WHERE artist_id = ?1", params![id])?;
            conn.execute("DELETE FROM albums WHERE artist_id = ?1", params![id])?;
            conn.execute("DELETE FROM artists WHERE id = ?1", params![id])?;
            Ok(true)
        })();

        match result {
            Ok(deleted) => {
                conn.execute("COMMIT", [])?;
                Ok(deleted)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn delete_album(&self, id: i64) -> StoreResult<bool> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> StoreResult<bool> {
            if !Self::album_exists(&conn, id)? {
                return Ok(false);
            }

            conn.execute(
                "UPDATE songs SET album_id = NULL WHERE album_id = ?1",
                params![id],
            )?;
            conn.execute("DELETE FROM albums WHERE id = ?1", params![id])?;
            Ok(true)
        })();

        match result {
            Ok(deleted) => {
                conn.execute("COMMIT", [])?;
                Ok(deleted)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    fn get_artist(&self, id: i64) -> StoreResult<Option<Artist>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        match conn.query_row(
            "SELECT id, name, image, description FROM artists WHERE id = ?1",
            params![id],
            Self::parse_artist_row,
        ) {
            Ok(artist) => Ok(Some(artist)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_album(&self, id: i64) -> StoreResult<Option<AlbumWithArtist>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        match conn.query_row(
            &format!("{} WHERE al.id = ?1", ALBUM_SELECT),
            params![id],
            Self::parse_album_row,
        ) {
            Ok(album) => Ok(Some(album)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_song(&self, id: i64) -> StoreResult<Option<SongWithAlbumCover>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        match conn.query_row(
            &format!("{} WHERE s.id = ?1", SONG_SELECT),
            params![id],
            Self::parse_song_row,
        ) {
            Ok(song) => Ok(Some(song)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_artists(&self) -> StoreResult<Vec<Artist>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        let mut stmt =
            conn.prepare_cached("SELECT id, name, image, description FROM artists ORDER BY id")?;
        let artists = stmt
            .query_map([], Self::parse_artist_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(artists)
    }

    fn list_albums(&self) -> StoreResult<Vec<AlbumWithArtist>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!("{} ORDER BY al.id", ALBUM_SELECT))?;
        let albums = stmt
            .query_map([], Self::parse_album_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(albums)
    }

    fn songs_by_artist(&self, artist_id: i64) -> StoreResult<Vec<SongWithAlbumCover>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "{} WHERE s.artist_id = ?1 ORDER BY s.id",
            SONG_SELECT
        ))?;
        let songs = stmt
            .query_map(params![artist_id], Self::parse_song_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn songs_by_album(&self, album_id: i64) -> StoreResult<Option<Vec<SongWithAlbumCover>>> {
        let conn = self.get_read_conn();
        let conn = conn.lock().unwrap();
        if !Self::album_exists(&conn, album_id)? {
            return Ok(None);
        }
        let mut stmt = conn.prepare_cached(&format!(
            "{} WHERE s.album_id = ?1 ORDER BY s.id",
            SONG_SELECT
        ))?;
        let songs = stmt
            .query_map(params![album_id], Self::parse_song_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(songs))
    }

    // =========================================================================
    // Counts
    // =========================================================================

    fn artists_count(&self) -> usize {
        self.count("artists")
    }

    fn albums_count(&self) -> usize {
        self.count("albums")
    }

    fn songs_count(&self) -> usize {
        self.count("songs")
    }
}
