//! draw.io shape libraries built from the icon set and its metadata.
//!
//! Each icon is restyled so draw.io can recolor it, embedded as a base64
//! data URI inside a one-cell mxGraphModel, and listed in the overall library
//! and in the library of its category.

use std::{
    collections::HashMap,
    fs::remove_file,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::{
    context::IconEntry,
    io::{read_text, write_text},
    metadata::IconMetadata,
    pipeline::package::zip_flat,
};

/// Style rule injected into every icon.
pub const STYLE_RULE: &str = ".icon{fill:#000000;}";

/// Cell geometry of every library item.
pub const ITEM_SIZE: u32 = 150;

const HEADER: &str = "&lt;mxGraphModel&gt;&lt;root&gt;&lt;mxCell id=\"0\"/&gt;&lt;mxCell id=\"1\" parent=\"0\"/&gt;&lt;mxCell id=\"2\" value=\"\" style=\"shape=image;editableCssRules=.*;aspect=fixed;image=data:image/svg+xml,";
const FOOTER: &str = ";\" vertex=\"1\" parent=\"1\"&gt;&lt;mxGeometry width=\"150\" height=\"150\" as=\"geometry\"/&gt;&lt;/mxCell&gt;&lt;/root&gt;&lt;/mxGraphModel&gt;";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryItem {
    pub xml: String,
    pub w: u32,
    pub h: u32,
    pub aspect: &'static str,
    pub title: String,
}

/// Library item for one icon file.
pub fn library_item(svg: &str, title: &str) -> Result<LibraryItem> {
    let restyled = iconsmith_svg::add_icon_class(svg, STYLE_RULE)?;
    let encoded = STANDARD.encode(restyled.as_bytes());
    Ok(LibraryItem {
        xml: format!("{HEADER}{encoded}{FOOTER}"),
        w: ITEM_SIZE,
        h: ITEM_SIZE,
        aspect: "fixed",
        title: title.to_string(),
    })
}

/// `<mxlibrary>` document holding `items`.
pub fn render_library(items: &[LibraryItem]) -> Result<String> {
    Ok(format!("<mxlibrary>{}</mxlibrary>", serde_json::to_string_pretty(items)?))
}

/// Items of the overall library and of each category, in entry order.
#[derive(Debug, Default)]
pub struct Libraries {
    pub all: Vec<LibraryItem>,
    /// Keyed by lowercased category; first appearance decides the order.
    pub categories: IndexMap<String, Vec<LibraryItem>>,
}

/// Group `entries` into libraries. Entries without a metadata record are left out.
pub fn collect_libraries(entries: &[IconEntry], metadata: &[IconMetadata]) -> Result<Libraries> {
    let by_name: HashMap<&str, &IconMetadata> =
        metadata.iter().map(|record| (record.name.as_str(), record)).collect();

    let mut libraries = Libraries::default();
    for entry in entries {
        let Some(record) = by_name.get(entry.name.as_str()) else {
            continue;
        };
        let svg = read_text(&entry.file_path)?;
        let item = library_item(&svg, &entry.prefixed_name)
            .with_context(|| format!("Failed to restyle {}", entry.file_path.display()))?;

        libraries.all.push(item.clone());
        libraries.categories.entry(record.category.to_lowercase()).or_default().push(item);
    }
    Ok(libraries)
}

/// Write the libraries into `dest`, zip them into `<font>-drawio.zip` and
/// remove the loose files. Nothing is written when no icon has metadata.
pub fn build_libraries(
    entries: &[IconEntry],
    metadata: &[IconMetadata],
    dest: &Path,
    font_name: &str,
) -> Result<Option<PathBuf>> {
    let libraries = collect_libraries(entries, metadata)?;

    let mut written = Vec::new();
    write_library(&mut written, dest.join(format!("{font_name}.drawio")), &libraries.all)?;
    for (category, items) in &libraries.categories {
        if category.is_empty() {
            continue;
        }
        write_library(&mut written, dest.join(format!("{font_name}-{category}.drawio")), items)?;
    }

    if written.is_empty() {
        debug!("No icon has metadata, skipping draw.io libraries");
        return Ok(None);
    }

    let archive = dest.join(format!("{font_name}-drawio.zip"));
    zip_flat(&archive, &written)?;
    for path in &written {
        remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    debug!("Packed {} draw.io libraries into {}", written.len(), archive.display());
    Ok(Some(archive))
}

fn write_library(written: &mut Vec<PathBuf>, path: PathBuf, items: &[LibraryItem]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    write_text(&path, render_library(items)?)?;
    written.push(path);
    Ok(())
}
