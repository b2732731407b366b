use std::{io, path::PathBuf, result};

/// Error types for the codepoint registry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed codepoint file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("codepoint file must contain a JSON object")]
    NotAnObject,

    #[error("codepoint file has no \"{0}\" counter")]
    MissingCounter(&'static str),

    #[error("invalid codepoint for \"{key}\": {value}")]
    InvalidCodepoint { key: String, value: serde_json::Value },

    #[error("codepoint space exhausted after U+{0:X}")]
    Exhausted(u32),
}

pub type Result<T> = result::Result<T, Error>;
