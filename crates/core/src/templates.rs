//! Stylesheet and preview page rendering.
//!
//! Each template has a built-in default. A file of the same name in the
//! project's `templates/` directory replaces it. Every template sees the same
//! data: `glyphs`, `fontName`, `className`, `fontPath` and `metaData`.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use handlebars::{Handlebars, no_escape};
use log::debug;
use serde::Serialize;

use crate::{
    context::{BuildContext, Glyph},
    io::{ensure_dir, read_text, write_text},
};

/// A template and where its output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    IconsScss,
    VariablesScss,
    IndexHtml,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::IconsScss, Template::VariablesScss, Template::IndexHtml];

    /// File name looked up in the override directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Template::IconsScss => "icons.scss",
            Template::VariablesScss => "variables.scss",
            Template::IndexHtml => "index.html",
        }
    }

    fn default_source(self) -> &'static str {
        match self {
            Template::IconsScss => include_str!("../templates/icons.scss.hbs"),
            Template::VariablesScss => include_str!("../templates/variables.scss.hbs"),
            Template::IndexHtml => include_str!("../templates/index.html.hbs"),
        }
    }

    fn escapes_html(self) -> bool {
        matches!(self, Template::IndexHtml)
    }

    pub fn output_path(self, ctx: &BuildContext) -> PathBuf {
        match self {
            Template::IconsScss => {
                ctx.paths.style_dest.join(format!("{}.scss", ctx.config.font_name))
            }
            Template::VariablesScss => ctx.paths.style_dest.join("variables.scss"),
            Template::IndexHtml => ctx.paths.dist.join("index.html"),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphView<'a> {
    pub name: &'a str,
    pub prefixed_name: &'a str,
    pub codepoint: u32,
    /// Lowercase hex without prefix, e.g. `ea01`.
    pub codepoint_hex: String,
    /// CSS `content` escape, e.g. `\ea01`.
    pub css_content: String,
    pub unicode: String,
}

impl<'a> From<&'a Glyph> for GlyphView<'a> {
    fn from(glyph: &'a Glyph) -> Self {
        let codepoint_hex = format!("{:x}", glyph.codepoint);
        Self {
            name: &glyph.name,
            prefixed_name: &glyph.prefixed_name,
            codepoint: glyph.codepoint,
            css_content: format!("\\{codepoint_hex}"),
            codepoint_hex,
            unicode: glyph.unicode.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData<'a> {
    pub glyphs: Vec<GlyphView<'a>>,
    pub font_name: &'a str,
    pub class_name: &'a str,
    pub font_path: &'a str,
    pub meta_data: &'a str,
}

impl<'a> TemplateData<'a> {
    pub fn from_context(ctx: &'a BuildContext) -> Self {
        Self {
            glyphs: ctx.glyphs.iter().map(GlyphView::from).collect(),
            font_name: &ctx.config.font_name,
            class_name: &ctx.config.class_name,
            font_path: &ctx.config.font_path,
            meta_data: &ctx.identity,
        }
    }
}

/// Template text, taken from `overrides` when present there.
pub fn load_template(overrides: &Path, template: Template) -> Result<Cow<'static, str>> {
    let path = overrides.join(template.file_name());
    if path.is_file() {
        debug!("Using template override {}", path.display());
        Ok(Cow::Owned(read_text(&path)?))
    } else {
        Ok(Cow::Borrowed(template.default_source()))
    }
}

/// Render a template source. HTML escaping is applied only when `escape` is set.
pub fn render(source: &str, data: &TemplateData, escape: bool) -> Result<String> {
    let mut registry = Handlebars::new();
    if !escape {
        registry.register_escape_fn(no_escape);
    }
    registry.render_template(source, data).map_err(|e| anyhow!("{e}"))
}

/// Render every template for the build and write the results. Returns the
/// written paths.
pub fn render_templates(ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    ensure_dir(&ctx.paths.style_dest)?;
    let data = TemplateData::from_context(ctx);

    let mut written = Vec::with_capacity(Template::ALL.len());
    for template in Template::ALL {
        let source = load_template(&ctx.paths.templates, template)?;
        let rendered = render(&source, &data, template.escapes_html())
            .with_context(|| format!("Failed to render template {}", template.file_name()))?;
        let output = template.output_path(ctx);
        write_text(&output, rendered)?;
        debug!("Rendered {}", output.display());
        written.push(output);
    }
    Ok(written)
}
