//! Error types for the build pipeline.

use std::error::Error as StdError;

/// Consistency errors between icons, codepoints and metadata.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Codepoint missing for \"{name}\". Run `iconsmith codepoints` to allocate it.")]
    MissingCodepoint { name: String },

    #[error(
        "Codepoint {codepoint:#X} for \"{name}\" is not a valid character. Run `iconsmith codepoints` to allocate a new one."
    )]
    InvalidCodepoint { name: String, codepoint: u32 },

    #[error("Icon \"{name}\" starts with '#', which is reserved in the codepoint file. Rename it.")]
    ReservedIconName { name: String },

    #[error("Icon \"{name}\" is provided by more than one file")]
    DuplicateIcon { name: String },
}

/// A stage failure, labelled with the stage that raised it.
#[derive(Debug, thiserror::Error)]
#[error("stage \"{stage}\" failed")]
pub struct PipelineError {
    pub stage: &'static str,
    #[source]
    pub source: Box<dyn StdError + Send + Sync + 'static>,
}
