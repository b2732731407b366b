//! In-memory state threaded through the build stages.

use std::{collections::BTreeMap, path::PathBuf};

use crate::config::{BuildConfig, BuildPaths};

/// One deployable icon file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    /// Source file name without extension.
    pub name: String,
    /// Public name, prefix applied.
    pub prefixed_name: String,
    /// Optimized file in the output icon directory.
    pub file_path: PathBuf,
    /// False for synthesized variants.
    pub is_original: bool,
}

/// An original icon joined with its codepoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub name: String,
    pub prefixed_name: String,
    pub codepoint: u32,
    pub unicode: char,
}

/// Everything one build run accumulates. Created once per build and handed to
/// each stage in turn.
#[derive(Debug)]
pub struct BuildContext {
    pub config: BuildConfig,
    pub paths: BuildPaths,
    /// Originals in discovery order, then derived variants.
    pub icon_entries: Vec<IconEntry>,
    /// Sorted by name.
    pub glyphs: Vec<Glyph>,
    pub codepoints: BTreeMap<String, u32>,
    /// `© holder - version - commit`, resolved before the first stage.
    pub identity: String,
    /// Product version the fonts are stamped with.
    pub version: String,
}

impl BuildContext {
    pub fn new(config: BuildConfig) -> Self {
        let paths = config.paths();
        Self {
            config,
            paths,
            icon_entries: Vec::new(),
            glyphs: Vec::new(),
            codepoints: BTreeMap::new(),
            identity: String::new(),
            version: String::new(),
        }
    }

    pub fn originals(&self) -> impl Iterator<Item = &IconEntry> {
        self.icon_entries.iter().filter(|entry| entry.is_original)
    }

    pub fn font_file(&self, extension: &str) -> PathBuf {
        self.paths.fonts_dest.join(format!("{}.{extension}", self.config.font_name))
    }
}
