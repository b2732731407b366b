//! CLI command implementations.

mod build;
mod codepoints;
mod lint;

pub use build::build;
pub use codepoints::allocate_codepoints;
pub use lint::lint;
