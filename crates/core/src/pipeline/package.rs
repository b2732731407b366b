//! Distribution archives.

use std::{
    fs::File,
    io::copy,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use log::debug;
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::io::{ensure_dir, is_hidden};

/// Archive every non-hidden file under `root_dir` into `archive_path`.
///
/// Paths matching any of `excludes` (relative, `/`-separated) and the archive
/// itself are left out. Entries are sorted by name.
pub fn package(root_dir: &Path, archive_path: &Path, excludes: &[&str]) -> Result<PathBuf> {
    let patterns = excludes
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}")))
        .collect::<Result<Vec<_>>>()?;

    let entries = collect_entries(root_dir, archive_path, &patterns)?;
    write_archive(archive_path, &entries)?;
    debug!("Archived {} files into {}", entries.len(), archive_path.display());
    Ok(archive_path.to_path_buf())
}

/// Archive `files` under their file names only.
pub fn zip_flat(archive_path: &Path, files: &[PathBuf]) -> Result<()> {
    let entries = files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Invalid file name: {}", path.display()))?;
            Ok((name.to_string(), path.clone()))
        })
        .collect::<Result<Vec<_>>>()?;
    write_archive(archive_path, &entries)
}

fn collect_entries(
    root_dir: &Path,
    archive_path: &Path,
    excludes: &[Pattern],
) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(root_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root_dir.display()))?;
        if !entry.file_type().is_file() || entry.path() == archive_path {
            continue;
        }
        let relative = entry.path().strip_prefix(root_dir)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if excludes.iter().any(|pattern| pattern.matches(&name)) {
            continue;
        }
        entries.push((name, entry.path().to_path_buf()));
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn write_archive(archive_path: &Path, entries: &[(String, PathBuf)]) -> Result<()> {
    if let Some(parent) = archive_path.parent() {
        ensure_dir(parent)?;
    }
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    for (name, path) in entries {
        zip.start_file(name.as_str(), options)?;
        let mut source =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        copy(&mut source, &mut zip)
            .with_context(|| format!("Failed to archive {}", path.display()))?;
    }

    let file = zip.finish()?;
    file.sync_all()
        .with_context(|| format!("Failed to sync {}", archive_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use zip::ZipArchive;

    use super::*;

    fn archive_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect::<Vec<_>>()
    }

    #[test]
    fn test_package_excludes_and_sorts() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        create_dir_all(root.join("fonts")).unwrap();
        create_dir_all(root.join(".cache")).unwrap();
        write(root.join("index.mjs"), "x").unwrap();
        write(root.join("fonts/a.ttf"), "x").unwrap();
        write(root.join("lib.drawio"), "x").unwrap();
        write(root.join("old.zip"), "x").unwrap();
        write(root.join(".hidden"), "x").unwrap();
        write(root.join(".cache/file"), "x").unwrap();

        let archive = root.join("bundle.zip");
        package(root, &archive, &["**/*.zip", "**/*.drawio"]).unwrap();

        let mut names = archive_names(&archive);
        names.sort();
        assert_eq!(names, vec!["fonts/a.ttf", "index.mjs"]);
    }

    #[test]
    fn test_package_without_excludes_skips_archive_itself() {
        let dir = tempdir().unwrap();
        write(dir.path().join("a.txt"), "x").unwrap();
        let archive = dir.path().join("out.zip");
        package(dir.path(), &archive, &[]).unwrap();
        assert_eq!(archive_names(&archive), vec!["a.txt"]);
    }

    #[test]
    fn test_zip_flat_uses_file_names() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("nested")).unwrap();
        let file = dir.path().join("nested/lib.drawio");
        write(&file, "<mxlibrary>[]</mxlibrary>").unwrap();

        let archive = dir.path().join("libs.zip");
        zip_flat(&archive, &[file]).unwrap();
        assert_eq!(archive_names(&archive), vec!["lib.drawio"]);
    }

    #[test]
    fn test_invalid_pattern_fails() {
        let dir = tempdir().unwrap();
        assert!(package(dir.path(), &dir.path().join("a.zip"), &["["]).is_err());
    }
}
