//! Font binaries for the assembled glyphs.

use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result};
use iconsmith_font_builder::{IconFontBuilder, woff, woff2};
use log::info;

use crate::{
    context::BuildContext,
    io::{ensure_dir, read_text, write_text},
};

/// Paths of the generated font files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFiles {
    pub ttf: PathBuf,
    pub woff: PathBuf,
    pub woff2: PathBuf,
}

/// Build `<font>.ttf`, `<font>.woff` and `<font>.woff2` from `ctx.glyphs`, drawing each glyph
/// from its optimized icon file.
pub fn generate_fonts(ctx: &BuildContext) -> Result<FontFiles> {
    ensure_dir(&ctx.paths.fonts_dest)?;
    let sources: HashMap<&str, &PathBuf> =
        ctx.originals().map(|entry| (entry.name.as_str(), &entry.file_path)).collect();

    let mut builder = IconFontBuilder::new(&ctx.config.font_name)
        .version(&ctx.version)
        .description(&ctx.identity);
    for glyph in &ctx.glyphs {
        let path = sources
            .get(glyph.name.as_str())
            .with_context(|| format!("No icon file for glyph \"{}\"", glyph.name))?;
        let svg = read_text(path)?;
        builder
            .add_glyph(&glyph.prefixed_name, glyph.unicode, &svg)
            .with_context(|| format!("Failed to draw glyph from {}", path.display()))?;
    }

    let ttf = builder.build()?;
    let woff = woff::compress(&ttf)?;
    let woff2 = woff2::compress(&ttf)?;

    let files = FontFiles {
        ttf: ctx.font_file("ttf"),
        woff: ctx.font_file("woff"),
        woff2: ctx.font_file("woff2"),
    };
    write_text(&files.ttf, &ttf)?;
    write_text(&files.woff, &woff)?;
    write_text(&files.woff2, &woff2)?;
    info!(
        "  {} glyphs, {} bytes TTF, {} bytes WOFF, {} bytes WOFF2",
        builder.len(),
        ttf.len(),
        woff.len(),
        woff2.len()
    );
    Ok(files)
}
