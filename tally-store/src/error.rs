use std::path::PathBuf;
use tally_ingest::RejectReason;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed collection file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no record '{id}' in collection '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("no signed-in user")]
    Unauthenticated,

    #[error("entry rejected: {0}")]
    Rejected(#[from] RejectReason),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}
