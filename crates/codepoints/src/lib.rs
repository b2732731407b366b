//! Persistent icon name to codepoint registry.
//!
//! Every icon gets a codepoint in the Private Use Area the first time it is
//! seen. Assigned codepoints are never changed or reclaimed, so fonts built
//! from later icon sets stay compatible with content that embeds old
//! codepoints. The registry is extended in place and written back with
//! sorted keys so diffs stay readable.
//!
//! On disk the registry is a flat JSON object. Keys starting with `#` are
//! bookkeeping (`#nextCodepoint`, `#comment`), everything else is an icon
//! name.

mod error;

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::{read_to_string, write},
    io::ErrorKind,
    path::Path,
};

use log::{debug, warn};
use serde_json::Value;

pub use error::{Error, Result};

/// First codepoint handed out by a fresh registry.
pub const FIRST_CODEPOINT: u32 = 0xEA01;

/// On-disk key holding the next codepoint to allocate.
pub const NEXT_CODEPOINT_KEY: &str = "#nextCodepoint";

/// On-disk key holding the machine-generated notice.
pub const COMMENT_KEY: &str = "#comment";

/// Prefix marking bookkeeping keys in the on-disk format.
pub const RESERVED_PREFIX: char = '#';

pub const DEFAULT_COMMENT: &str = "AUTO-GENERATED. Run `iconsmith codepoints` to update";

/// Typed view of the codepoint file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodepointRegistry {
    entries: BTreeMap<String, u32>,
    next_codepoint: u32,
    /// Bookkeeping keys other than the counter, kept verbatim.
    extra: BTreeMap<String, Value>,
}

impl Default for CodepointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodepointRegistry {
    /// Create an empty registry seeded at [`FIRST_CODEPOINT`].
    pub fn new() -> Self {
        Self::starting_at(FIRST_CODEPOINT)
    }

    /// Create an empty registry whose counter starts at `next_codepoint`.
    pub fn starting_at(next_codepoint: u32) -> Self {
        let mut extra = BTreeMap::new();
        extra.insert(COMMENT_KEY.to_string(), Value::from(DEFAULT_COMMENT));
        Self { entries: BTreeMap::new(), next_codepoint, extra }
    }

    /// Load a registry from disk. Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match read_to_string(path) {
            Ok(text) => Self::from_json(&text).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Read { path: path.to_path_buf(), source }),
        }
    }

    /// Load a registry from disk, or start a fresh one if the file is absent.
    ///
    /// A file that exists but cannot be parsed is an error, never a reset.
    pub fn load_or_new(path: &Path) -> Result<Self> {
        Ok(Self::load(path)?.unwrap_or_default())
    }

    /// Parse the on-disk JSON format.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(object) = value else {
            return Err(Error::NotAnObject);
        };

        let mut entries = BTreeMap::new();
        let mut extra = BTreeMap::new();
        let mut next_codepoint = None;

        for (key, value) in object {
            if key == NEXT_CODEPOINT_KEY {
                next_codepoint = Some(parse_codepoint(&key, &value)?);
            } else if key.starts_with(RESERVED_PREFIX) {
                extra.insert(key, value);
            } else {
                let codepoint = parse_codepoint(&key, &value)?;
                entries.insert(key, codepoint);
            }
        }

        let next_codepoint = next_codepoint.ok_or(Error::MissingCounter(NEXT_CODEPOINT_KEY))?;
        Ok(Self { entries, next_codepoint, extra })
    }

    /// Serialize to the on-disk JSON format: sorted keys, two-space indent,
    /// trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut object: BTreeMap<&str, Value> = BTreeMap::new();
        for (key, value) in &self.extra {
            object.insert(key, value.clone());
        }
        object.insert(NEXT_CODEPOINT_KEY, Value::from(self.next_codepoint));
        for (name, codepoint) in &self.entries {
            object.insert(name, Value::from(*codepoint));
        }

        let mut text = serde_json::to_string_pretty(&object)?;
        text.push('\n');
        Ok(text)
    }

    /// Write the registry to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = self.to_json()?;
        write(path, text).map_err(|source| Error::Write { path: path.to_path_buf(), source })
    }

    /// Assign codepoints to every name that does not have one yet.
    ///
    /// Names are deduplicated and processed in sorted order so the result
    /// does not depend on directory listing order. Existing assignments are
    /// left untouched. Returns the newly assigned `(name, codepoint)` pairs.
    pub fn allocate<I, S>(&mut self, names: I) -> Result<Vec<(String, u32)>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> =
            names.into_iter().map(|name| name.as_ref().to_string()).collect();
        let mut used: BTreeSet<u32> = self.entries.values().copied().collect();
        let mut assigned = Vec::new();

        for name in names {
            if name.starts_with(RESERVED_PREFIX) {
                warn!("Skipping icon \"{name}\": names starting with '{RESERVED_PREFIX}' are reserved");
                continue;
            }
            if self.entries.contains_key(&name) {
                continue;
            }

            // A hand-edited counter may point at a value someone already owns.
            let mut codepoint = self.next_codepoint;
            while used.contains(&codepoint) {
                codepoint = codepoint.checked_add(1).ok_or(Error::Exhausted(codepoint))?;
            }

            debug!("Assigned U+{codepoint:X} to \"{name}\"");
            used.insert(codepoint);
            self.entries.insert(name.clone(), codepoint);
            self.next_codepoint = codepoint.checked_add(1).ok_or(Error::Exhausted(codepoint))?;
            assigned.push((name, codepoint));
        }

        Ok(assigned)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn next_codepoint(&self) -> u32 {
        self.next_codepoint
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Icon entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(name, codepoint)| (name.as_str(), *codepoint))
    }

    pub fn entries(&self) -> &BTreeMap<String, u32> {
        &self.entries
    }

    /// Bookkeeping value stored under a reserved key, e.g. [`COMMENT_KEY`].
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Load the registry at `path` (or start a fresh one), assign codepoints to
/// `names` and write the result back.
pub fn allocate<I, S>(path: &Path, names: I) -> Result<CodepointRegistry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut registry = CodepointRegistry::load_or_new(path)?;
    registry.allocate(names)?;
    registry.save(path)?;
    Ok(registry)
}

fn parse_codepoint(key: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| Error::InvalidCodepoint { key: key.to_string(), value: value.clone() })
}
