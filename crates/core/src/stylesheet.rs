//! SCSS compilation and CSS minification.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use log::debug;
use rayon::prelude::*;

use crate::io::{collect_checked, glob_files, read_text, write_text};

/// Compile `entry` to expanded CSS next to it, `foo.scss` becoming `foo.css`.
/// Imports resolve against the entry's directory.
pub fn compile_scss(entry: &Path) -> Result<PathBuf> {
    let load_path = entry.parent().unwrap_or(Path::new("."));
    let options = grass::Options::default()
        .style(grass::OutputStyle::Expanded)
        .load_path(load_path);
    let css = grass::from_path(entry, &options)
        .map_err(|e| anyhow!("Failed to compile {}: {e}", entry.display()))?;

    let output = entry.with_extension("css");
    write_text(&output, format!("{}\n", css.trim_end()))?;
    debug!("Compiled {} to {}", entry.display(), output.display());
    Ok(output)
}

/// Minify a stylesheet. Comments are dropped.
pub fn minify_css(source: &str, filename: &str) -> Result<String> {
    let mut sheet = StyleSheet::parse(
        source,
        ParserOptions { filename: filename.to_string(), ..ParserOptions::default() },
    )
    .map_err(|e| anyhow!("Failed to parse {filename}: {e}"))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| anyhow!("Failed to minify {filename}: {e}"))?;
    let result = sheet
        .to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
        .map_err(|e| anyhow!("Failed to print {filename}: {e}"))?;
    Ok(result.code)
}

/// Write a `.min.css` sibling for every `*.css` in `dir` that is not
/// already minified. Returns the written files.
pub fn minify_bundles(dir: &Path) -> Result<Vec<PathBuf>> {
    let bundles: Vec<PathBuf> = glob_files(dir, "*.css")?
        .into_iter()
        .filter(|path| !is_minified(path))
        .collect();

    let results: Vec<_> = bundles
        .par_iter()
        .map(|path| (path.clone(), minify_file(path)))
        .collect();
    collect_checked(results, "Minifying stylesheets")
}

fn is_minified(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_ascii_lowercase().ends_with(".min.css"))
}

fn minify_file(path: &Path) -> Result<PathBuf> {
    let filename = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
    let minified = minify_css(&read_text(path)?, filename)?;
    let output = path.with_extension("min.css");
    write_text(&output, minified)?;
    debug!("Minified {} to {}", path.display(), output.display());
    Ok(output)
}
