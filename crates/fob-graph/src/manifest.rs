//! Project manifest: root dependency declarations and transitive lock records.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A dependency declared at the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootDependency {
    pub name: String,
    /// Declared version: numeric semver, a pinned URL, or a GitHub slug.
    pub version: String,
}

/// Resolution record for a transitive dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Requested range, or a URL when the dependency is pinned to one.
    pub semver: String,
    /// Version that actually satisfied the range.
    pub resolved: String,
}

impl LockRecord {
    /// The requested semver when it is a URL, which carries backend information
    /// a plain version number lacks.
    pub fn url_semver(&self) -> Option<&str> {
        is_url_version(&self.semver).then_some(self.semver.as_str())
    }

    /// URL-form semver if present, otherwise the resolved version.
    pub fn preferred_version(&self) -> &str {
        self.url_semver().unwrap_or(&self.resolved)
    }
}

/// Whether a version string is a pinned URL.
pub fn is_url_version(version: &str) -> bool {
    version.starts_with("https://") || version.starts_with("http://")
}

/// Read-only project manifest supplied by the bundler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Root declarations, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<RootDependency>,
    /// Transitive lock records keyed by dependency name.
    #[serde(default)]
    pub dependency_dependencies: FxHashMap<String, LockRecord>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON manifest document.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| Error::InvalidManifest(e.to_string()))
    }

    /// Declare a root dependency.
    pub fn with_dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.dependencies.push(RootDependency {
            name: name.into(),
            version: version.into(),
        });
        self
    }

    /// Record a transitive resolution.
    pub fn with_lock_record(
        mut self,
        name: impl Into<String>,
        semver: impl Into<String>,
        resolved: impl Into<String>,
    ) -> Self {
        self.dependency_dependencies.insert(
            name.into(),
            LockRecord {
                semver: semver.into(),
                resolved: resolved.into(),
            },
        );
        self
    }

    /// Declared root version of `name`; the first declaration wins.
    pub fn root_version(&self, name: &str) -> Option<&str> {
        self.dependencies
            .iter()
            .find(|dep| dep.name == name)
            .map(|dep| dep.version.as_str())
    }

    /// Lock record of the transitive dependency `name`.
    pub fn lock_record(&self, name: &str) -> Option<&LockRecord> {
        self.dependency_dependencies.get(name)
    }
}
