use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::error;

use crate::catalog::{
    CatalogError, CatalogService, CreateAlbum, CreateArtist, CreateSong, Upload,
};
use crate::catalog_store::{format_duration_secs, Artist, AlbumWithArtist, SongWithAlbumCover};
use tower_http::services::ServeDir;

use axum::{
    extract::{
        multipart::Field, DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};

const MAX_UPLOAD_SIZE_BYTES: usize = 256 * 1024 * 1024;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub artists: usize,
    pub albums: usize,
    pub songs: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn media_url(path: &str) -> String {
    format!("/media/{}", path)
}

#[derive(Serialize)]
struct ArtistResponse {
    id: i64,
    name: String,
    image: String,
    description: String,
}

impl From<Artist> for ArtistResponse {
    fn from(artist: Artist) -> Self {
        ArtistResponse {
            id: artist.id,
            name: artist.name,
            image: media_url(&artist.image),
            description: artist.description,
        }
    }
}

#[derive(Serialize)]
struct AlbumResponse {
    id: i64,
    title: String,
    artist: i64,
    artist_name: String,
    cover_image: String,
    release_date: String,
}

impl From<AlbumWithArtist> for AlbumResponse {
    fn from(entry: AlbumWithArtist) -> Self {
        AlbumResponse {
            id: entry.album.id,
            title: entry.album.title,
            artist: entry.album.artist_id,
            artist_name: entry.artist_name,
            cover_image: media_url(&entry.album.cover_image),
            release_date: entry.album.release_date.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SongResponse {
    id: i64,
    title: String,
    artist: i64,
    album: Option<i64>,
    duration: String,
    release_date: String,
    audio_file: Option<String>,
    cover_image: Option<String>,
    album_cover: Option<String>,
    lyrics: Option<String>,
}

impl From<SongWithAlbumCover> for SongResponse {
    fn from(entry: SongWithAlbumCover) -> Self {
        let song = entry.song;
        SongResponse {
            id: song.id,
            title: song.title,
            artist: song.artist_id,
            album: song.album_id,
            duration: format_duration_secs(song.duration_secs),
            release_date: song.release_date.to_string(),
            audio_file: song.audio_file.as_deref().map(media_url),
            cover_image: song.cover_image.as_deref().map(media_url),
            album_cover: entry.album_cover.as_deref().map(media_url),
            lyrics: song.lyrics,
        }
    }
}

fn error_response(err: CatalogError) -> Response {
    let status = match &err {
        CatalogError::Validation(_) | CatalogError::MediaStorage(_) => StatusCode::BAD_REQUEST,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {:?}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

async fn read_upload(field: Field<'_>) -> Option<Upload> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let bytes = field.bytes().await.ok()?;
    Some(Upload {
        filename,
        bytes: bytes.to_vec(),
    })
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let counts = state.catalog.stats();
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        artists: counts.artists,
        albums: counts.albums,
        songs: counts.songs,
    };
    Json(stats)
}

// =============================================================================
// Artist Routes
// =============================================================================

async fn list_artists(State(catalog): State<GuardedCatalogService>) -> Response {
    match catalog.artists() {
        Ok(artists) => Json(
            artists
                .into_iter()
                .map(ArtistResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => error_response(err),
    }
}

async fn add_artist(
    State(catalog): State<GuardedCatalogService>,
    mut multipart: Multipart,
) -> Response {
    let mut request = CreateArtist::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("name") => request.name = field.text().await.ok(),
            Some("description") => request.description = field.text().await.ok(),
            Some("image") => request.image = read_upload(field).await,
            _ => {}
        }
    }

    match catalog.create_artist(request) {
        Ok(artist) => {
            (StatusCode::CREATED, Json(ArtistResponse::from(artist))).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn get_artist(
    State(catalog): State<GuardedCatalogService>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.artist(id) {
        Ok(artist) => Json(ArtistResponse::from(artist)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_artist_songs(
    State(catalog): State<GuardedCatalogService>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.artist_songs(id) {
        Ok(songs) => Json(
            songs
                .into_iter()
                .map(SongResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => error_response(err),
    }
}

// =============================================================================
// Album Routes
// =============================================================================

async fn list_albums(State(catalog): State<GuardedCatalogService>) -> Response {
    match catalog.albums() {
        Ok(albums) => Json(
            albums
                .into_iter()
                .map(AlbumResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => error_response(err),
    }
}

async fn add_album(
    State(catalog): State<GuardedCatalogService>,
    mut multipart: Multipart,
) -> Response {
    let mut request = CreateAlbum::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("title") => request.title = field.text().await.ok(),
            Some("artist") => request.artist = field.text().await.ok(),
            Some("release_date") => request.release_date = field.text().await.ok(),
            Some("cover_image") => request.cover_image = read_upload(field).await,
            _ => {}
        }
    }

    // Re-read through the service so the response carries the artist name.
    let created = match catalog.create_album(request) {
        Ok(album) => album,
        Err(err) => return error_response(err),
    };
    match catalog.album(created.id) {
        Ok(album) => (StatusCode::CREATED, Json(AlbumResponse::from(album))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_album(
    State(catalog): State<GuardedCatalogService>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.album(id) {
        Ok(album) => Json(AlbumResponse::from(album)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_album_songs(
    State(catalog): State<GuardedCatalogService>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.album_songs(id) {
        Ok(songs) => Json(
            songs
                .into_iter()
                .map(SongResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => error_response(err),
    }
}

// =============================================================================
// Song Routes
// =============================================================================

async fn add_song(
    State(catalog): State<GuardedCatalogService>,
    mut multipart: Multipart,
) -> Response {
    let mut request = CreateSong::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("title") => request.title = field.text().await.ok(),
            Some("artist") => request.artist = field.text().await.ok(),
            Some("album") => request.album = field.text().await.ok(),
            Some("duration") => request.duration = field.text().await.ok(),
            Some("release_date") => request.release_date = field.text().await.ok(),
            Some("audio_file") => request.audio_file = read_upload(field).await,
            Some("cover_image") => request.cover_image = read_upload(field).await,
            Some("lyrics") => request.lyrics = field.text().await.ok(),
            _ => {}
        }
    }

    let created = match catalog.create_song(request) {
        Ok(song) => song,
        Err(err) => return error_response(err),
    };
    match catalog.song(created.id) {
        Ok(song) => (StatusCode::CREATED, Json(SongResponse::from(song))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_song(
    State(catalog): State<GuardedCatalogService>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.song(id) {
        Ok(song) => Json(SongResponse::from(song)).into_response(),
        Err(err) => error_response(err),
    }
}

pub fn make_app(config: ServerConfig, catalog: Arc<CatalogService>) -> Result<Router> {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        catalog: catalog.clone(),
    };

    // Routes are registered with their full trailing-slash paths: nesting
    // a router with a "/" route does not match the "/artists/" spelling.
    let catalog_routes: Router = Router::new()
        .route("/artists/", get(list_artists))
        .route("/artists/add/", post(add_artist))
        .route("/artists/{id}/", get(get_artist))
        .route("/artists/{id}/songs/", get(get_artist_songs))
        .route("/albums/", get(list_albums))
        .route("/albums/add/", post(add_album))
        .route("/albums/{id}/", get(get_album))
        .route("/albums/{id}/songs/", get(get_album_songs))
        .route("/songs/add/", post(add_song))
        .route("/songs/{id}/", get(get_song))
        .with_state(state.clone());

    let home_router: Router = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)).with_state(state.clone()),
    };

    let mut app: Router = home_router
        .merge(catalog_routes)
        .nest_service("/media", ServeDir::new(catalog.media_root()));

    app = app
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    catalog: Arc<CatalogService>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
    };
    let app = make_app(config, catalog)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
