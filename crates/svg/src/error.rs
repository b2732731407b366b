use std::result;

/// Error types for SVG processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse SVG: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

pub type Result<T> = result::Result<T, Error>;
