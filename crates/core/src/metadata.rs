//! Icon metadata files: loading, copying into the output tree, and linting
//! against the icon directory.

use std::{
    collections::{BTreeSet, HashSet},
    path::Path,
};

use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    icons::source_names,
    io::{check_results_with_paths, ensure_dir, glob_files, read_text, write_text},
};

/// One record of a metadata array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconMetadata {
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Fields the build does not use, kept as they are.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Records of a single metadata file. The file must hold a JSON array.
pub fn load_metadata_file(path: &Path) -> Result<Vec<IconMetadata>> {
    serde_json::from_str(&read_text(path)?)
        .with_context(|| format!("Failed to parse metadata {}", path.display()))
}

/// Records of every `*.json` array in `dir`, in file name order.
/// Files whose top level is not an array are ignored.
pub fn load_metadata_dir(dir: &Path) -> Result<Vec<IconMetadata>> {
    let mut records = Vec::new();
    for path in glob_files(dir, "*.json")? {
        let value: Value = serde_json::from_str(&read_text(&path)?)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if !value.is_array() {
            debug!("Skipping {}: not a metadata array", path.display());
            continue;
        }
        let parsed: Vec<IconMetadata> = serde_json::from_value(value)
            .with_context(|| format!("Invalid metadata record in {}", path.display()))?;
        records.extend(parsed);
    }
    Ok(records)
}

/// Re-write every `*.json` in `src` into `dest`, pretty-printed with a
/// trailing newline. Returns the number of files copied.
pub fn copy_metadata(src: &Path, dest: &Path) -> Result<usize> {
    ensure_dir(dest)?;
    let files = glob_files(src, "*.json")?;

    let results: Vec<_> = files
        .par_iter()
        .map(|path| (path.clone(), copy_formatted(path, dest)))
        .collect();
    check_results_with_paths(&results, "Copying metadata")?;

    Ok(files.len())
}

fn copy_formatted(path: &Path, dest: &Path) -> Result<()> {
    let file_name = path.file_name().context("Metadata path has no file name")?;
    let value: Value = serde_json::from_str(&read_text(path)?)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let mut formatted = serde_json::to_string_pretty(&value)?;
    formatted.push('\n');

    let target = dest.join(file_name);
    write_text(&target, formatted)?;
    debug!("Copied {} to {}", path.display(), target.display());
    Ok(())
}

/// Differences between the icon directory and a metadata file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LintReport {
    /// Listed in the metadata without an icon file, in metadata order.
    pub missing_files: Vec<String>,
    /// Icon files without a metadata record, sorted.
    pub unreferenced: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.missing_files.is_empty() && self.unreferenced.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if !self.missing_files.is_empty() {
            messages.push(format!(
                "Icons {} are referenced but don't exist.",
                quote_list(&self.missing_files)
            ));
        }
        if !self.unreferenced.is_empty() {
            messages.push(format!(
                "Icons {} exist but are never referenced.",
                quote_list(&self.unreferenced)
            ));
        }
        messages
    }
}

fn quote_list(names: &[String]) -> String {
    format!("\"{}\"", names.join("\", \""))
}

/// Compare the icons in `icon_dir` with the records in `metadata_file`.
pub fn lint(icon_dir: &Path, metadata_file: &Path) -> Result<LintReport> {
    let icons: BTreeSet<String> = source_names(icon_dir)?.into_iter().collect();
    let records = load_metadata_file(metadata_file)?;
    let referenced: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();

    let mut seen = HashSet::new();
    let missing_files = records
        .iter()
        .map(|r| r.name.as_str())
        .filter(|name| !icons.contains(*name) && seen.insert(*name))
        .map(str::to_string)
        .collect();
    let unreferenced =
        icons.iter().filter(|name| !referenced.contains(name.as_str())).cloned().collect();

    Ok(LintReport { missing_files, unreferenced })
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, read_to_string, write};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"/>"#;

    fn project(icons: &[&str], metadata: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("icons")).unwrap();
        for icon in icons {
            write(dir.path().join("icons").join(format!("{icon}.svg")), SVG).unwrap();
        }
        write(dir.path().join("metadata.json"), metadata).unwrap();
        dir
    }

    #[test]
    fn test_record_keeps_extra_fields() {
        let records: Vec<IconMetadata> = serde_json::from_str(
            r#"[{"name":"home","category":"Navigation","tags":["house"]},{"name":"x"}]"#,
        )
        .unwrap();
        assert_eq!(records[0].category, "Navigation");
        assert_eq!(records[0].extra["tags"], serde_json::json!(["house"]));
        assert_eq!(records[1].category, "");
    }

    #[test]
    fn test_load_metadata_dir_merges_arrays() {
        let dir = tempdir().unwrap();
        write(dir.path().join("b.json"), r#"[{"name":"b"}]"#).unwrap();
        write(dir.path().join("a.json"), r#"[{"name":"a"}]"#).unwrap();
        write(dir.path().join("settings.json"), r#"{"not":"an array"}"#).unwrap();

        let names: Vec<_> =
            load_metadata_dir(dir.path()).unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_copy_metadata_pretty_prints() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        write(src.path().join("icons.json"), r#"[{"name":"home","category":"Nav"}]"#).unwrap();

        assert_eq!(copy_metadata(src.path(), dest.path()).unwrap(), 1);
        let copied = read_to_string(dest.path().join("icons.json")).unwrap();
        assert_eq!(copied, "[\n  {\n    \"name\": \"home\",\n    \"category\": \"Nav\"\n  }\n]\n");
    }

    #[test]
    fn test_copy_metadata_fails_on_invalid_json() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        write(src.path().join("broken.json"), "[").unwrap();
        assert!(copy_metadata(src.path(), dest.path()).is_err());
    }

    #[test]
    fn test_lint_clean() {
        let dir = project(&["home", "star"], r#"[{"name":"star"},{"name":"home"}]"#);
        let report =
            lint(&dir.path().join("icons"), &dir.path().join("metadata.json")).unwrap();
        assert!(report.is_clean());
        assert!(report.messages().is_empty());
    }

    #[test]
    fn test_lint_reports_missing_file() {
        let dir = project(&["home"], r#"[{"name":"home"},{"name":"gear"}]"#);
        let report =
            lint(&dir.path().join("icons"), &dir.path().join("metadata.json")).unwrap();
        assert_eq!(report.missing_files, vec!["gear"]);
        assert!(!report.is_clean());
        assert_eq!(report.messages(), vec![r#"Icons "gear" are referenced but don't exist."#]);
    }

    #[test]
    fn test_lint_reports_both_sides() {
        let dir = project(&["a", "b", "c"], r#"[{"name":"a"},{"name":"x"},{"name":"y"}]"#);
        let report =
            lint(&dir.path().join("icons"), &dir.path().join("metadata.json")).unwrap();
        assert_eq!(
            report.messages(),
            vec![
                r#"Icons "x", "y" are referenced but don't exist."#.to_string(),
                r#"Icons "b", "c" exist but are never referenced."#.to_string(),
            ]
        );
    }
}
