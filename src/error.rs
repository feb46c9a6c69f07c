use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EcdError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("collection not found: {0}")]
    MissingCollection(String),
}

pub type Result<T> = std::result::Result<T, EcdError>;

impl EcdError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EcdError::Io {
            path: path.into(),
            source,
        }
    }
}
