//! Build identity stamp embedded in generated artifacts.

use std::{env, fmt, path::Path};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::{BuildConfig, COMMIT_ENV, COMMIT_LENGTH, DEFAULT_HOLDER, DIRTY_COMMIT},
    io::read_text,
};

/// The parts of `package.json` the build reads.
#[derive(Debug, Default, Deserialize)]
pub struct PackageManifest {
    pub version: Option<String>,
    pub author: Option<Value>,
}

impl PackageManifest {
    /// Load `<root>/package.json`, if present.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join("package.json");
        if !path.is_file() {
            return Ok(None);
        }
        let manifest = serde_json::from_str(&read_text(&path)?)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(manifest))
    }

    /// Author name from either the `"Name <email> (url)"` or the `{ "name": .. }` form.
    pub fn author_name(&self) -> Option<String> {
        let name = match self.author.as_ref()? {
            Value::String(author) => author.split(['<', '(']).next().unwrap_or_default(),
            Value::Object(author) => author.get("name")?.as_str()?,
            _ => return None,
        };
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Who built which version from which commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIdentity {
    pub holder: String,
    pub version: String,
    /// Shortened commit hash or the dirty marker.
    pub commit: String,
}

impl fmt::Display for BuildIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "© {} - {} - {}", self.holder, self.version, self.commit)
    }
}

/// Resolve the identity from the config, `package.json` and the environment.
pub fn resolve_identity(config: &BuildConfig) -> Result<BuildIdentity> {
    let manifest = PackageManifest::load(&config.root)?.unwrap_or_default();

    let version = config
        .product_version
        .clone()
        .or_else(|| manifest.version.clone())
        .context("No product version: pass --product-version or add a version to package.json")?;
    let holder = config
        .holder
        .clone()
        .or_else(|| manifest.author_name())
        .unwrap_or_else(|| DEFAULT_HOLDER.to_string());
    let commit = short_commit(env::var(COMMIT_ENV).ok().as_deref());

    let identity = BuildIdentity { holder, version, commit };
    debug!("Build identity: {identity}");
    Ok(identity)
}

/// First characters of the commit hash, or the dirty marker when unknown.
pub fn short_commit(commit: Option<&str>) -> String {
    match commit.map(str::trim) {
        Some(sha) if !sha.is_empty() => sha.chars().take(COMMIT_LENGTH).collect(),
        _ => DIRTY_COMMIT.to_string(),
    }
}
