//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.

mod client;
mod constants;
mod server;

// Public API - this is what tests import
pub use client::{audio_part, image_part, TestClient};
pub use constants::*;
pub use server::TestServer;
