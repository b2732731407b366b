//! SVG processing for icon sources.
//!
//! - [`optimize`] rewrites icon markup into a compact, editor-free form
//! - [`inline_markup`] and [`add_icon_class`] prepare markup for embedding
//! - [`tree`] is the owned element tree both are built on

mod error;
mod markup;
mod optimize;
pub mod tree;

pub use error::{Error, Result};
pub use markup::{ICON_CLASS, add_icon_class, inline_markup};
pub use optimize::{OptimizeOptions, optimize, optimize_with};
pub use tree::{Attribute, Element, Node};
