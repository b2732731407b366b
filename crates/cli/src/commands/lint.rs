use std::path::Path;

use anyhow::Result;
use log::{error, info};

/// Compare the icon directory with the metadata file and log every mismatch.
/// Returns whether both sides agree.
pub fn lint(icons: &Path, metadata: &Path) -> Result<bool> {
    let report = iconsmith_core::lint(icons, metadata)?;
    for message in report.messages() {
        error!("{message}");
    }
    if report.is_clean() {
        info!("Icons and metadata are in sync");
    }
    Ok(report.is_clean())
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_referenced_icon_without_file_fails() {
        let dir = tempdir().unwrap();
        let icons = dir.path().join("icons");
        create_dir_all(&icons).unwrap();
        write(icons.join("home.svg"), "<svg/>").unwrap();
        let metadata = dir.path().join("metadata.json");
        write(&metadata, r#"[{"name":"home"},{"name":"gear"}]"#).unwrap();

        assert!(!lint(&icons, &metadata).unwrap());

        write(icons.join("gear.svg"), "<svg/>").unwrap();
        assert!(lint(&icons, &metadata).unwrap());
    }

    #[test]
    fn test_missing_metadata_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(lint(dir.path(), &dir.path().join("nope.json")).is_err());
    }
}
