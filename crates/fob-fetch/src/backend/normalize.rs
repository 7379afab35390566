//! Metadata shapes and their normalization into a [`PathSet`].

use serde::Deserialize;
use serde_json::Value;

use super::PathSet;
use crate::error::{FetchError, FetchResult};
use crate::paths;

/// Node of a nested listing (`?meta` views and draft archives).
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub files: Vec<TreeEntry>,
}

/// Flat listing: every file of the package with its path from the root.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatListing {
    #[serde(default)]
    pub files: Vec<FlatEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlatEntry {
    pub name: String,
}

/// Place a listing path under the package root.
fn under_root(root: &str, path: &str) -> String {
    paths::normalize(&format!(
        "{}/{}",
        root.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// Normalize a nested listing. Only `file` entries are kept; directories are
/// walked recursively.
pub fn normalize_tree(raw: &Value, root: &str) -> FetchResult<PathSet> {
    let tree: TreeEntry = serde_json::from_value(raw.clone()).map_err(|e| malformed(root, e))?;
    let mut out = PathSet::default();
    collect_tree(&tree, root, &mut out);
    Ok(out)
}

fn collect_tree(entry: &TreeEntry, root: &str, out: &mut PathSet) {
    if entry.kind == "file" {
        out.insert(under_root(root, &entry.path));
    }
    for child in &entry.files {
        collect_tree(child, root, out);
    }
}

/// Normalize a flat listing.
pub fn normalize_flat(raw: &Value, root: &str) -> FetchResult<PathSet> {
    let listing: FlatListing =
        serde_json::from_value(raw.clone()).map_err(|e| malformed(root, e))?;
    Ok(listing
        .files
        .iter()
        .map(|file| under_root(root, &file.name))
        .collect())
}

fn malformed(root: &str, e: serde_json::Error) -> FetchError {
    FetchError::MalformedMetadata {
        origin: root.to_string(),
        reason: e.to_string(),
    }
}
