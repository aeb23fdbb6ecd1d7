mod error;
mod service;

pub use error::CatalogError;
pub use service::*;
