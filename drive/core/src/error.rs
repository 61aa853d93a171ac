use std::path::PathBuf;

use thiserror::Error;

/**
    Errors from loading or serializing a key file.
*/
#[derive(Debug, Clone, Error)]
pub enum KeyStoreError {
    #[error("failed to read key file {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("invalid key file: {0}")]
    Json(String),
}

impl From<serde_json::Error> for KeyStoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

/**
    Error returned by `FromStr` implementations on enum types.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

/**
    Type alias for results that may return a [`KeyStoreError`].
*/
pub type KeyStoreResult<T> = std::result::Result<T, KeyStoreError>;
