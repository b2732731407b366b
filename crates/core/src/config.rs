//! Configuration for icon font builds.

use std::path::{Path, PathBuf};

/// Font family and file stem of every generated font artifact.
pub const FONT_NAME: &str = "element-icons";

/// CSS class prefix used by the generated stylesheet.
pub const CLASS_NAME: &str = "element";

/// Font URL prefix written into the stylesheet, relative to the style directory.
pub const FONT_PATH: &str = "../fonts/";

/// Prefix applied to every icon name to form its public name.
pub const ICON_PREFIX: &str = "element-";

/// Suffix marking the filled variant of an icon.
pub const FILLED_SUFFIX: &str = "-filled";

/// Copyright holder used when neither the config nor `package.json` names one.
pub const DEFAULT_HOLDER: &str = "Element";

/// Environment variable holding the commit the build was made from.
pub const COMMIT_ENV: &str = "CI_COMMIT_SHA";

/// Commit placeholder for builds outside CI.
pub const DIRTY_COMMIT: &str = "DIRTY";

/// Characters of the commit hash kept in the build identity.
pub const COMMIT_LENGTH: usize = 8;

/// Files left out of the distribution archive.
pub const ARCHIVE_EXCLUDES: &[&str] = &["**/*.zip", "**/*.drawio"];

/// Source directory of the icon SVGs, relative to the project root.
pub const ICONS_DIR: &str = "assets/icons";

/// Persisted codepoint registry, relative to the project root.
pub const CODEPOINTS_FILE: &str = "assets/icon-codepoints.json";

/// Directory of icon metadata JSON files, relative to the project root.
pub const METADATA_DIR: &str = "src";

/// Metadata file checked by the lint command, relative to the project root.
pub const METADATA_FILE: &str = "src/element-icon-metadata.json";

/// Template overrides, relative to the project root.
pub const TEMPLATES_DIR: &str = "templates";

/// Output directory, relative to the project root.
pub const DIST_DIR: &str = "dist";

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub root: PathBuf,
    /// Output directory; defaults to `<root>/dist`.
    pub dist: Option<PathBuf>,
    pub font_name: String,
    pub class_name: String,
    pub font_path: String,
    pub icon_prefix: String,
    pub holder: Option<String>,
    /// Overrides the version from `package.json`.
    pub product_version: Option<String>,
    /// Extend the codepoint registry before building the fonts.
    pub allocate_codepoints: bool,
}

impl BuildConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dist: None,
            font_name: FONT_NAME.to_string(),
            class_name: CLASS_NAME.to_string(),
            font_path: FONT_PATH.to_string(),
            icon_prefix: ICON_PREFIX.to_string(),
            holder: None,
            product_version: None,
            allocate_codepoints: false,
        }
    }

    pub fn paths(&self) -> BuildPaths {
        let paths = BuildPaths::from_root(&self.root);
        match &self.dist {
            Some(dist) => paths.with_dist(dist),
            None => paths,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Every location the build reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub root: PathBuf,
    pub icons_src: PathBuf,
    pub codepoints: PathBuf,
    pub metadata_src: PathBuf,
    pub templates: PathBuf,
    pub dist: PathBuf,
    pub icons_dest: PathBuf,
    pub fonts_dest: PathBuf,
    pub style_dest: PathBuf,
}

impl BuildPaths {
    pub fn from_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            icons_src: root.join(ICONS_DIR),
            codepoints: root.join(CODEPOINTS_FILE),
            metadata_src: root.join(METADATA_DIR),
            templates: root.join(TEMPLATES_DIR),
            dist: PathBuf::new(),
            icons_dest: PathBuf::new(),
            fonts_dest: PathBuf::new(),
            style_dest: PathBuf::new(),
        }
        .with_dist(&root.join(DIST_DIR))
    }

    pub fn with_dist(mut self, dist: &Path) -> Self {
        self.dist = dist.to_path_buf();
        self.icons_dest = dist.join("icons");
        self.fonts_dest = dist.join("fonts");
        self.style_dest = dist.join("style");
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_paths_from_root() {
        let paths = BuildPaths::from_root(Path::new("/project"));
        assert_eq!(paths.icons_src, Path::new("/project/assets/icons"));
        assert_eq!(paths.codepoints, Path::new("/project/assets/icon-codepoints.json"));
        assert_eq!(paths.metadata_src, Path::new("/project/src"));
        assert_eq!(paths.fonts_dest, Path::new("/project/dist/fonts"));
        assert_eq!(paths.style_dest, Path::new("/project/dist/style"));
    }

    #[test]
    fn test_dist_override() {
        let mut config = BuildConfig::new("/project");
        config.dist = Some(PathBuf::from("/tmp/out"));
        let paths = config.paths();
        assert_eq!(paths.icons_src, Path::new("/project/assets/icons"));
        assert_eq!(paths.icons_dest, Path::new("/tmp/out/icons"));
    }
}
