//! Icon font generation from SVG sources.
//!
//! Each SVG becomes one TrueType glyph. The viewBox height is normalized to
//! the em, so icons drawn on any grid line up at the same size.

mod builder;
mod error;
mod outline;
pub mod woff;
pub mod woff2;

pub use builder::{DEFAULT_UNITS_PER_EM, IconFontBuilder};
pub use error::{Error, Result};
pub use outline::{Outline, svg_outline};
