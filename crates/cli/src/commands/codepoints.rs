use std::path::Path;

use anyhow::Result;
use iconsmith_codepoints::CodepointRegistry;
use iconsmith_core::{BuildPaths, source_names};
use log::info;

/// Assign codepoints to every icon under `root` that lacks one and save the registry.
/// Returns the number of new assignments.
pub fn allocate_codepoints(root: &Path) -> Result<usize> {
    let paths = BuildPaths::from_root(root);
    let names = source_names(&paths.icons_src)?;

    let mut registry = CodepointRegistry::load_or_new(&paths.codepoints)?;
    let assigned = registry.allocate(&names)?;
    registry.save(&paths.codepoints)?;

    for (name, codepoint) in &assigned {
        info!("{name}: U+{codepoint:X}");
    }
    info!(
        "{} icons, {} new codepoints, next U+{:X}",
        names.len(),
        assigned.len(),
        registry.next_codepoint()
    );
    Ok(assigned.len())
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_allocates_and_persists() {
        let dir = tempdir().unwrap();
        let icons = dir.path().join("assets/icons");
        create_dir_all(&icons).unwrap();
        write(icons.join("b.svg"), "<svg/>").unwrap();
        write(icons.join("a.svg"), "<svg/>").unwrap();

        assert_eq!(allocate_codepoints(dir.path()).unwrap(), 2);
        assert_eq!(allocate_codepoints(dir.path()).unwrap(), 0);

        let registry =
            CodepointRegistry::load(&dir.path().join("assets/icon-codepoints.json")).unwrap().unwrap();
        assert_eq!(registry.get("a"), Some(0xEA01));
        assert_eq!(registry.get("b"), Some(0xEA02));
    }
}
