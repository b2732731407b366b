//! Shared file I/O utilities.

use std::{
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::{Pattern, glob};
use log::error;

pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn write_text(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    create_dir_all(path).with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Non-hidden files in `dir` matching `pattern`, sorted. A missing directory yields nothing.
///
/// Glob metacharacters in `dir` itself match literally.
pub fn glob_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let dir_str = dir.to_str().with_context(|| format!("Invalid directory: {}", dir.display()))?;
    let pattern = Path::new(&Pattern::escape(dir_str)).join(pattern);
    let pattern_str = pattern.to_str().context("Invalid pattern path")?;

    let entries =
        glob(pattern_str).with_context(|| format!("Failed to glob pattern: {pattern_str}"))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("Failed to read entry of {}", dir.display()))?;
        if path.is_file() && !is_hidden(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

pub fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()).is_some_and(|name| name.starts_with('.'))
}

/// Check batch operation results with paths, log failures with file names, and bail if any failed.
pub fn check_results_with_paths<T, P: AsRef<Path>>(
    results: &[(P, Result<T>)],
    operation: &str,
) -> Result<()> {
    let errors: Vec<_> = results
        .iter()
        .filter_map(|(path, r)| r.as_ref().err().map(|e| (path.as_ref(), e)))
        .collect();

    if !errors.is_empty() {
        for (path, err) in &errors {
            error!("{}: {err:#}", path.display());
        }
        bail!("{operation} failed for {} files", errors.len());
    }
    Ok(())
}

/// Unwrap batch results once [`check_results_with_paths`] has passed.
pub fn collect_checked<T, P: AsRef<Path>>(
    results: Vec<(P, Result<T>)>,
    operation: &str,
) -> Result<Vec<T>> {
    check_results_with_paths(&results, operation)?;
    results.into_iter().map(|(_, r)| r).collect()
}
