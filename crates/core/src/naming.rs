//! Identifier-safe export names.

use std::path::Path;

/// Turn a file name into a camelCase identifier.
///
/// Path and extension are dropped. Every run of characters other than ASCII
/// letters and digits is removed and the character after it is uppercased.
/// The first character is lowercased, and a leading digit gets a `_` prefix.
pub fn derive_component_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let mut name = String::with_capacity(stem.len() + 1);
    let mut after_separator = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            if after_separator {
                name.push(c.to_ascii_uppercase());
            } else {
                name.push(c);
            }
            after_separator = false;
        } else {
            after_separator = true;
        }
    }

    match name.chars().next() {
        None => "_".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{name}"),
        Some(first) => {
            let mut out = String::with_capacity(name.len());
            out.push(first.to_ascii_lowercase());
            out.push_str(&name[first.len_utf8()..]);
            out
        }
    }
}
