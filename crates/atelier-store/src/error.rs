use atelier_training::ModelId;
use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store failures keep their kind: absence, corruption, and IO problems are
/// distinct variants rather than one collapsed sentinel. Callers that only
/// care about presence use the adapters on `ModelStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No bundle (or a required bundle file) is stored under the id.
    #[error("model not found: {0}")]
    NotFound(ModelId),

    /// A bundle file exists but does not parse.
    #[error("corrupt model file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("archive error: {0}")]
    Archive(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
