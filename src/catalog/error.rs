use crate::catalog_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request payload is malformed or incomplete.
    #[error("{0}")]
    Validation(String),

    /// A referenced or requested entity does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// An uploaded file could not be persisted.
    #[error("Failed to store media file: {0}")]
    MediaStorage(#[source] anyhow::Error),

    /// The catalog database failed.
    #[error("Catalog storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingParent { entity: "Artist", .. } => {
                CatalogError::NotFound("Artist does not exist")
            }
            StoreError::MissingParent { .. } => CatalogError::NotFound("Album does not exist"),
            StoreError::Db(e) => CatalogError::Storage(e.into()),
        }
    }
}
