//! Iconsmith Core - build pipeline for SVG icon fonts.
//!
//! Turns a directory of SVG icons into fonts, stylesheets, JavaScript
//! exports, draw.io libraries and a distribution archive.

pub mod config;
pub mod context;
pub mod drawio;
pub mod error;
pub mod exports;
pub mod fonts;
pub mod glyphs;
pub mod icons;
pub mod identity;
pub mod io;
pub mod metadata;
pub mod naming;
pub mod pipeline;
pub mod stylesheet;
pub mod templates;

pub use config::{BuildConfig, BuildPaths};
pub use context::{BuildContext, Glyph, IconEntry};
pub use error::{BuildError, PipelineError};
pub use glyphs::assemble;
pub use icons::{discover, expand_variants, source_names};
pub use metadata::{LintReport, lint};
pub use naming::derive_component_name;
pub use pipeline::{
    BUILD_STAGES, PipelineStage, Stage, build, clean::clean, package::package, run_stages,
};
