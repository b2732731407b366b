use anyhow::Result;
use iconsmith_codepoints::CodepointRegistry;
use log::{debug, info};

use super::{PipelineStage, clean::reset_dir, package::package};
use crate::{
    config::ARCHIVE_EXCLUDES,
    context::BuildContext,
    drawio::build_libraries,
    exports::write_exports,
    fonts::generate_fonts,
    glyphs::assemble,
    icons::{discover, expand_variants},
    metadata::{copy_metadata, load_metadata_dir},
    stylesheet::{compile_scss, minify_bundles},
    templates::render_templates,
};

pub const BUILD_STAGES: &[PipelineStage] = &[
    ("clean dist", step_clean_dist),
    ("copy metadata", step_copy_metadata),
    ("prepare svg icons", step_prepare_icons),
    ("allocate codepoints", step_allocate_codepoints),
    ("build font files", step_build_fonts),
    ("render templates", step_render_templates),
    ("compile scss bundles", step_compile_scss),
    ("generate JS icon exports", step_icon_exports),
    ("minify css bundles", step_minify_css),
    ("build draw.io library", step_drawio_library),
    ("package distribution", step_package),
];

fn step_clean_dist(ctx: &mut BuildContext) -> Result<()> {
    reset_dir(&ctx.paths.dist)
}

fn step_copy_metadata(ctx: &mut BuildContext) -> Result<()> {
    let count = copy_metadata(&ctx.paths.metadata_src, &ctx.paths.dist)?;
    info!("  Copied {count} metadata files");
    Ok(())
}

fn step_prepare_icons(ctx: &mut BuildContext) -> Result<()> {
    let mut entries =
        discover(&ctx.paths.icons_src, &ctx.paths.icons_dest, &ctx.config.icon_prefix)?;
    let originals = entries.len();
    let derived = expand_variants(&mut entries, &ctx.paths.icons_dest)?;
    ctx.icon_entries = entries;

    info!("  {originals} icons, {derived} derived filled variants");
    Ok(())
}

fn step_allocate_codepoints(ctx: &mut BuildContext) -> Result<()> {
    if !ctx.config.allocate_codepoints {
        debug!("Codepoint allocation not requested");
        return Ok(());
    }
    let mut registry = CodepointRegistry::load_or_new(&ctx.paths.codepoints)?;
    let assigned = registry.allocate(ctx.originals().map(|entry| entry.name.as_str()))?;
    registry.save(&ctx.paths.codepoints)?;

    for (name, codepoint) in &assigned {
        info!("  {name}: U+{codepoint:X}");
    }
    info!("  Assigned {} new codepoints", assigned.len());
    Ok(())
}

fn step_build_fonts(ctx: &mut BuildContext) -> Result<()> {
    let registry = CodepointRegistry::load(&ctx.paths.codepoints)?.unwrap_or_default();
    ctx.codepoints = registry.entries().clone();
    ctx.glyphs = assemble(ctx.originals(), &ctx.codepoints)?;

    let files = generate_fonts(ctx)?;
    debug!(
        "Wrote {}, {} and {}",
        files.ttf.display(),
        files.woff.display(),
        files.woff2.display()
    );
    Ok(())
}

fn step_render_templates(ctx: &mut BuildContext) -> Result<()> {
    render_templates(ctx)?;
    Ok(())
}

fn step_compile_scss(ctx: &mut BuildContext) -> Result<()> {
    let entry = ctx.paths.style_dest.join(format!("{}.scss", ctx.config.font_name));
    compile_scss(&entry)?;
    Ok(())
}

fn step_icon_exports(ctx: &mut BuildContext) -> Result<()> {
    let count = write_exports(&ctx.paths.icons_dest, &ctx.paths.dist)?;
    info!("  {count} icon exports");
    Ok(())
}

fn step_minify_css(ctx: &mut BuildContext) -> Result<()> {
    let written = minify_bundles(&ctx.paths.style_dest)?;
    info!("  Minified {} stylesheets", written.len());
    Ok(())
}

fn step_drawio_library(ctx: &mut BuildContext) -> Result<()> {
    let metadata = load_metadata_dir(&ctx.paths.metadata_src)?;
    if let Some(archive) =
        build_libraries(&ctx.icon_entries, &metadata, &ctx.paths.dist, &ctx.config.font_name)?
    {
        info!("  Wrote {}", archive.display());
    }
    Ok(())
}

fn step_package(ctx: &mut BuildContext) -> Result<()> {
    let archive = ctx.paths.dist.join(format!("{}.zip", ctx.config.font_name));
    package(&ctx.paths.dist, &archive, ARCHIVE_EXCLUDES)?;
    info!("  Wrote {}", archive.display());
    Ok(())
}
