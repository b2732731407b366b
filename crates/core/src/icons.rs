//! Icon discovery, optimization and variant expansion.

use std::{
    collections::HashSet,
    fs::{copy, read_dir},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;

use iconsmith_codepoints::RESERVED_PREFIX;

use crate::{
    config::FILLED_SUFFIX,
    context::IconEntry,
    error::BuildError,
    io::{collect_checked, ensure_dir, is_hidden, read_text, write_text},
};

/// An icon file in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSource {
    pub name: String,
    pub path: PathBuf,
}

/// SVG files directly inside `dir`, sorted by file name. Hidden files are skipped
/// and the extension is matched case-insensitively.
pub fn scan_sources(dir: &Path) -> Result<Vec<IconSource>> {
    let entries =
        read_dir(dir).with_context(|| format!("Failed to read icon directory {}", dir.display()))?;

    let mut sources = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || is_hidden(&path) {
            continue;
        }
        let is_svg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if !is_svg {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        sources.push(IconSource { name: name.to_string(), path });
    }

    sources.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(sources)
}

/// Icon names in `dir`, deduplicated and sorted.
pub fn source_names(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = scan_sources(dir)?.into_iter().map(|s| s.name).collect();
    names.sort();
    names.dedup();
    Ok(names)
}

/// Optimize every icon in `source_dir` into `dest_dir` as `<prefix><name>.svg`.
///
/// Files are processed in parallel. Every failure is logged before the
/// first one is returned.
pub fn discover(source_dir: &Path, dest_dir: &Path, prefix: &str) -> Result<Vec<IconEntry>> {
    ensure_dir(dest_dir)?;
    let sources = scan_sources(source_dir)?;

    let mut seen = HashSet::new();
    for source in &sources {
        if source.name.starts_with(RESERVED_PREFIX) {
            return Err(BuildError::ReservedIconName { name: source.name.clone() }.into());
        }
        if !seen.insert(source.name.as_str()) {
            return Err(BuildError::DuplicateIcon { name: source.name.clone() }.into());
        }
    }

    let results: Vec<_> = sources
        .par_iter()
        .map(|source| (source.path.clone(), optimize_icon(source, dest_dir, prefix)))
        .collect();
    let entries = collect_checked(results, "Optimizing icons")?;

    debug!("Optimized {} icons into {}", entries.len(), dest_dir.display());
    Ok(entries)
}

fn optimize_icon(source: &IconSource, dest_dir: &Path, prefix: &str) -> Result<IconEntry> {
    let prefixed_name = format!("{prefix}{}", source.name);
    let file_path = dest_dir.join(format!("{prefixed_name}.svg"));

    let svg = read_text(&source.path)?;
    let optimized = iconsmith_svg::optimize(&svg)
        .with_context(|| format!("Failed to optimize {}", source.path.display()))?;
    write_text(&file_path, optimized)?;

    Ok(IconEntry { name: source.name.clone(), prefixed_name, file_path, is_original: true })
}

/// Append a `-filled` copy for every icon that has no filled variant of its own.
///
/// Returns the number of variants created.
pub fn expand_variants(entries: &mut Vec<IconEntry>, dest_dir: &Path) -> Result<usize> {
    let mut names: HashSet<String> = entries.iter().map(|e| e.prefixed_name.clone()).collect();
    let mut derived = Vec::new();

    for entry in entries.iter() {
        if entry.prefixed_name.ends_with(FILLED_SUFFIX) {
            continue;
        }
        let filled_name = format!("{}{FILLED_SUFFIX}", entry.prefixed_name);
        if names.contains(&filled_name) {
            continue;
        }

        let file_path = dest_dir.join(format!("{filled_name}.svg"));
        copy(&entry.file_path, &file_path).with_context(|| {
            format!("Failed to copy {} to {}", entry.file_path.display(), file_path.display())
        })?;
        debug!("Derived {filled_name} from {}", entry.prefixed_name);

        names.insert(filled_name.clone());
        derived.push(IconEntry {
            name: format!("{}{FILLED_SUFFIX}", entry.name),
            prefixed_name: filled_name,
            file_path,
            is_original: false,
        });
    }

    let count = derived.len();
    entries.extend(derived);
    Ok(count)
}
