//! Melodia Catalog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog;
pub mod catalog_store;
pub mod config;
pub mod media_store;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog::{CatalogError, CatalogService};
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use media_store::{FsMediaStore, MediaStore};
pub use server::{make_app, run_server, RequestsLoggingLevel};
