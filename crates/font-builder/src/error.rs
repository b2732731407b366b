//! Error types for icon font building.

/// Result type for icon font building operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building an icon font.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The SVG source could not be parsed.
    #[error("Failed to parse SVG for glyph '{glyph}': {source}")]
    Svg {
        glyph: String,
        source: roxmltree::Error,
    },

    /// The SVG has neither a usable viewBox nor width/height.
    #[error("Glyph '{0}' has no viewBox or dimensions")]
    NoViewBox(String),

    /// A `d` attribute could not be parsed.
    #[error("Invalid path data in glyph '{glyph}': {message}")]
    PathData { glyph: String, message: String },

    /// A `transform` attribute could not be parsed.
    #[error("Invalid transform in glyph '{glyph}': {message}")]
    Transform { glyph: String, message: String },

    /// The outline could not be converted into a TrueType glyph.
    #[error("Invalid outline for glyph '{glyph}': {message}")]
    Outline { glyph: String, message: String },

    /// Two glyphs were mapped to the same character.
    #[error("Codepoint U+{codepoint:04X} is used by both '{first}' and '{second}'")]
    DuplicateCodepoint {
        codepoint: u32,
        first: String,
        second: String,
    },

    /// Too many glyphs for a TrueType font.
    #[error("Too many glyphs: {0}")]
    TooManyGlyphs(usize),

    /// Failed to build the cmap table.
    #[error("Failed to build cmap table: {0}")]
    Cmap(String),

    /// Font builder error.
    #[error("Font builder error: {0}")]
    FontBuilder(#[from] write_fonts::BuilderError),

    /// Read error.
    #[error("Font read error: {0}")]
    ReadError(#[from] read_fonts::ReadError),

    /// Write error.
    #[error("Font write error: {0}")]
    WriteError(#[from] write_fonts::error::Error),

    /// WOFF2 encoding failed.
    #[error("Failed to encode WOFF2: {0}")]
    Woff2(String),

    /// Compression failed while writing WOFF data.
    #[error("Failed to compress table: {0}")]
    Compress(#[from] std::io::Error),
}
