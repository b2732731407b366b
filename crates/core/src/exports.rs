//! JavaScript module exposing every icon as an SVG data URI.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::{
    io::{glob_files, read_text, write_text},
    naming::derive_component_name,
};

const DATA_URI_PREFIX: &str = "data:image/svg+xml;utf8,";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconExport {
    pub component_name: String,
    /// Inline markup, double quotes replaced by single quotes.
    pub svg: String,
    pub source: PathBuf,
}

/// Exports for every `*.svg` in `icon_dir`, sorted by component name.
///
/// Documents without an `<svg>` root are skipped. Two files mapping to the
/// same component name are both kept and a warning names them.
pub fn collect_exports(icon_dir: &Path) -> Result<Vec<IconExport>> {
    let mut exports = Vec::new();
    for path in glob_files(icon_dir, "*.svg")? {
        let source = read_text(&path)?;
        let svg = iconsmith_svg::inline_markup(&source)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let Some(svg) = svg else {
            debug!("Skipping {}: no <svg> root", path.display());
            continue;
        };
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        exports.push(IconExport {
            component_name: derive_component_name(file_name),
            svg,
            source: path,
        });
    }

    exports.sort_by(|a, b| {
        a.component_name
            .to_lowercase()
            .cmp(&b.component_name.to_lowercase())
            .then_with(|| a.component_name.cmp(&b.component_name))
    });
    warn_collisions(&exports);
    Ok(exports)
}

fn warn_collisions(exports: &[IconExport]) {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for export in exports {
        if let Some(first) = seen.insert(&export.component_name, &export.source) {
            warn!(
                "Export name {} is derived from both {} and {}",
                export.component_name,
                first.display(),
                export.source.display()
            );
        }
    }
}

pub fn render_module(exports: &[IconExport]) -> String {
    render_lines(exports, |e| {
        format!("export const {} = \"{DATA_URI_PREFIX}{}\";", e.component_name, e.svg)
    })
}

pub fn render_declarations(exports: &[IconExport]) -> String {
    render_lines(exports, |e| format!("export declare const {}: string;", e.component_name))
}

fn render_lines(exports: &[IconExport], line: impl Fn(&IconExport) -> String) -> String {
    let mut out = exports.iter().map(line).collect::<Vec<_>>().join("\n");
    out.push('\n');
    out
}

/// Write `index.mjs` and `index.d.ts` into `dest`. Returns the number of exports.
pub fn write_exports(icon_dir: &Path, dest: &Path) -> Result<usize> {
    let exports = collect_exports(icon_dir)?;
    write_text(dest.join("index.mjs"), render_module(&exports))?;
    write_text(dest.join("index.d.ts"), render_declarations(&exports))?;
    Ok(exports.len())
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M0 0h1"/></svg>"#;

    #[test]
    fn test_collect_sorted_and_named() {
        let dir = tempdir().unwrap();
        write(dir.path().join("element-home.svg"), SVG).unwrap();
        write(dir.path().join("element-arrow-up.svg"), SVG).unwrap();
        write(dir.path().join("element-2-way.svg"), SVG).unwrap();

        let names: Vec<_> = collect_exports(dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.component_name)
            .collect();
        assert_eq!(names, vec!["element2Way", "elementArrowUp", "elementHome"]);
    }

    #[test]
    fn test_non_svg_documents_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path().join("a.svg"), SVG).unwrap();
        write(dir.path().join("b.svg"), "<html/>").unwrap();
        assert_eq!(collect_exports(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_module_lines() {
        let dir = tempdir().unwrap();
        write(dir.path().join("element-home.svg"), SVG).unwrap();
        let count = write_exports(dir.path(), dir.path()).unwrap();
        assert_eq!(count, 1);

        assert_eq!(
            read_text(dir.path().join("index.mjs")).unwrap(),
            "export const elementHome = \"data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h1'/></svg>\";\n"
        );
        assert_eq!(
            read_text(dir.path().join("index.d.ts")).unwrap(),
            "export declare const elementHome: string;\n"
        );
    }

    #[test]
    fn test_collisions_are_kept() {
        let dir = tempdir().unwrap();
        write(dir.path().join("a-b.svg"), SVG).unwrap();
        write(dir.path().join("a_b.svg"), SVG).unwrap();
        let exports = collect_exports(dir.path()).unwrap();
        assert_eq!(exports.len(), 2);
        assert!(exports.iter().all(|e| e.component_name == "aB"));
    }
}
