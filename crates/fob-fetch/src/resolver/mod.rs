//! Hierarchical module resolution over a virtual filesystem.
//!
//! The resolver follows node's algorithm with browser-field handling:
//!
//! 1. Relative and absolute specifiers resolve as a file, then as a directory.
//! 2. Bare specifiers first consult the requesting package's `browser` map,
//!    then every module directory from the requester up to `/`.
//! 3. Files are probed exactly, then with each configured extension.
//! 4. Directories use the `package.json` entry point, then `index`.
//! 5. The final file is passed through its own package's `browser` map.
//!
//! The filesystem is abstract. Existence checks must be cheap and synchronous;
//! reads may do arbitrary async work, including fetching remote content.

mod algorithm;
mod browser;

use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::error::FetchResult;

/// Filesystem the resolver runs against.
#[async_trait]
pub trait VirtualFs: Send + Sync {
    /// Whether a file exists at `path`. Directories are never files.
    fn is_file(&self, path: &str) -> bool;

    /// Content of the file at `path`.
    ///
    /// A missing file is reported as [`FetchError::ResolutionMiss`](crate::FetchError::ResolutionMiss);
    /// the resolver treats that as a negative result and keeps probing.
    async fn read_file(&self, path: &str) -> FetchResult<String>;

    /// Content available without doing any I/O. Used to read `browser` maps
    /// of packages that are already loaded.
    fn cached_content(&self, _path: &str) -> Option<String> {
        None
    }
}

/// Resolution settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    /// Probe suffixes in `.ext` form.
    extensions: Vec<String>,
    /// Directory names searched hierarchically for packages.
    module_directories: Vec<String>,
}

impl PathResolver {
    pub fn new<E, D>(extensions: E, module_directories: D) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .map(|ext| format!(".{ext}"))
                .collect(),
            module_directories: module_directories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(&config.extensions, config.module_directories())
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn module_directories(&self) -> &[String] {
        &self.module_directories
    }
}

#[cfg(test)]
mod tests;
