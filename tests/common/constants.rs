//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.

// ============================================================================
// Test Catalog Metadata
// ============================================================================

/// Default artist name used by convenience helpers
pub const ARTIST_NAME: &str = "Nova";

/// Default album title used by convenience helpers
pub const ALBUM_TITLE: &str = "Dawn";

/// Default album release date used by convenience helpers
pub const ALBUM_RELEASE_DATE: &str = "2024-05-01";

/// Default song title used by convenience helpers
pub const SONG_TITLE: &str = "Sunrise";

/// Default song duration as submitted (MM:SS)
pub const SONG_DURATION: &str = "03:30";

/// How the default song duration is rendered in responses
pub const SONG_DURATION_FORMATTED: &str = "0:03:30";

// ============================================================================
// Test Upload Payloads
// ============================================================================

/// A tiny PNG-signed payload for image upload fields
pub const TEST_IMAGE_BYTES: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
];

/// A tiny MP3-signed payload for audio upload fields
pub const TEST_AUDIO_BYTES: &[u8] = &[
    0x49, 0x44, 0x33, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xfb, 0x90, 0x00, 0x00,
    0x00,
];

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
