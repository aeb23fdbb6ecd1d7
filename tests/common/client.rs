//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all catalog-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

/// An image upload part with a PNG payload
pub fn image_part(file_name: &str) -> Part {
    Part::bytes(TEST_IMAGE_BYTES.to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .unwrap()
}

/// An audio upload part with an MP3 payload
pub fn audio_part(file_name: &str) -> Part {
    Part::bytes(TEST_AUDIO_BYTES.to_vec())
        .file_name(file_name.to_string())
        .mime_str("audio/mpeg")
        .unwrap()
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }

    async fn post_multipart(&self, path: &str, form: Form) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .multipart(form)
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Form Builders
    // ========================================================================

    /// A complete artist creation form with the default test image.
    pub fn artist_form(name: &str) -> Form {
        Form::new()
            .text("name", name.to_string())
            .part("image", image_part("portrait.png"))
    }

    /// A complete album creation form with the default test cover.
    pub fn album_form(title: &str, artist_id: i64, release_date: &str) -> Form {
        Form::new()
            .text("title", title.to_string())
            .text("artist", artist_id.to_string())
            .text("release_date", release_date.to_string())
            .part("cover_image", image_part("cover.png"))
    }

    /// A minimal song creation form (no file uploads).
    pub fn song_form(title: &str, artist_id: i64, album_id: i64, duration: &str) -> Form {
        Form::new()
            .text("title", title.to_string())
            .text("artist", artist_id.to_string())
            .text("album", album_id.to_string())
            .text("duration", duration.to_string())
    }

    // ========================================================================
    // Home
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Artist Endpoints
    // ========================================================================

    pub async fn list_artists(&self) -> Response {
        self.get("/artists/").await
    }

    pub async fn add_artist(&self, form: Form) -> Response {
        self.post_multipart("/artists/add/", form).await
    }

    pub async fn get_artist(&self, id: i64) -> Response {
        self.get(&format!("/artists/{}/", id)).await
    }

    pub async fn get_artist_songs(&self, id: i64) -> Response {
        self.get(&format!("/artists/{}/songs/", id)).await
    }

    // ========================================================================
    // Album Endpoints
    // ========================================================================

    pub async fn list_albums(&self) -> Response {
        self.get("/albums/").await
    }

    pub async fn add_album(&self, form: Form) -> Response {
        self.post_multipart("/albums/add/", form).await
    }

    pub async fn get_album(&self, id: i64) -> Response {
        self.get(&format!("/albums/{}/", id)).await
    }

    pub async fn get_album_songs(&self, id: i64) -> Response {
        self.get(&format!("/albums/{}/songs/", id)).await
    }

    // ========================================================================
    // Song Endpoints
    // ========================================================================

    pub async fn add_song(&self, form: Form) -> Response {
        self.post_multipart("/songs/add/", form).await
    }

    pub async fn get_song(&self, id: i64) -> Response {
        self.get(&format!("/songs/{}/", id)).await
    }

    // ========================================================================
    // Media
    // ========================================================================

    pub async fn get_media(&self, url_path: &str) -> Response {
        self.get(url_path).await
    }

    // ========================================================================
    // Scenario Helpers
    // ========================================================================

    /// Creates the default test artist and returns its id.
    pub async fn create_default_artist(&self) -> i64 {
        let response = self.add_artist(Self::artist_form(ARTIST_NAME)).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Creates the default test album for `artist_id` and returns its id.
    pub async fn create_default_album(&self, artist_id: i64) -> i64 {
        let response = self
            .add_album(Self::album_form(ALBUM_TITLE, artist_id, ALBUM_RELEASE_DATE))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Creates the default test song on `album_id` and returns its id.
    pub async fn create_default_song(&self, artist_id: i64, album_id: i64) -> i64 {
        let response = self
            .add_song(Self::song_form(SONG_TITLE, artist_id, album_id, SONG_DURATION))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }
}
