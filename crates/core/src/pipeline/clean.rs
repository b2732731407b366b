use std::{fs::remove_dir_all, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::io::ensure_dir;

/// Remove `dist_dir` and everything in it. Returns whether anything was removed.
pub fn clean(dist_dir: &Path) -> Result<bool> {
    if dist_dir.exists() {
        remove_dir_all(dist_dir)
            .with_context(|| format!("Failed to remove {}", dist_dir.display()))?;
        info!("Removed {}", dist_dir.display());
        Ok(true)
    } else {
        info!("Skipped {} (not found)", dist_dir.display());
        Ok(false)
    }
}

/// Remove `dir` if present and create it again, empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    clean(dir)?;
    ensure_dir(dir)
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_clean_removes_tree() {
        let dir = tempdir().unwrap();
        let dist = dir.path().join("dist");
        create_dir_all(dist.join("fonts")).unwrap();
        write(dist.join("fonts/a.ttf"), "x").unwrap();

        assert!(clean(&dist).unwrap());
        assert!(!dist.exists());
        assert!(!clean(&dist).unwrap());
    }

    #[test]
    fn test_reset_dir_leaves_empty_directory() {
        let dir = tempdir().unwrap();
        let dist = dir.path().join("dist");
        create_dir_all(&dist).unwrap();
        write(dist.join("stale.txt"), "x").unwrap();

        reset_dir(&dist).unwrap();
        assert!(dist.is_dir());
        assert_eq!(dist.read_dir().unwrap().count(), 0);
    }
}
