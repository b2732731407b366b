//! Joining original icons with their registry codepoints.

use std::collections::BTreeMap;

use crate::{
    context::{Glyph, IconEntry},
    error::BuildError,
};

/// Build the font's glyph list from the original icons.
///
/// Glyphs are sorted by name. Every icon must have a codepoint that is a
/// valid `char`, otherwise the first offending icon (in name order) is
/// reported.
pub fn assemble<'a>(
    originals: impl IntoIterator<Item = &'a IconEntry>,
    codepoints: &BTreeMap<String, u32>,
) -> Result<Vec<Glyph>, BuildError> {
    let mut entries: Vec<&IconEntry> = originals.into_iter().collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    entries
        .into_iter()
        .map(|entry| {
            let codepoint = *codepoints
                .get(&entry.name)
                .ok_or_else(|| BuildError::MissingCodepoint { name: entry.name.clone() })?;
            let unicode = char::from_u32(codepoint).ok_or_else(|| {
                BuildError::InvalidCodepoint { name: entry.name.clone(), codepoint }
            })?;
            Ok(Glyph {
                name: entry.name.clone(),
                prefixed_name: entry.prefixed_name.clone(),
                codepoint,
                unicode,
            })
        })
        .collect()
}
