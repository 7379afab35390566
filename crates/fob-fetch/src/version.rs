//! Version lookup for bare dependency names.
//!
//! Sources, in order:
//!
//! 1. `<name>/package.json` resolved from the requester through the graph and
//!    the known remote paths. If that is the root install location and the
//!    manifest declares the dependency, the declared version wins. Otherwise
//!    the file's `version` is used, upgraded to the lock record's URL form
//!    when the lock record resolved to the same version.
//! 2. The lock record: its URL-form semver, else its resolved version.
//! 3. The manifest's root declaration.

use fob_graph::{ModuleGraph, PackageJson};
use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::fetcher::ModuleFetcher;
use crate::paths::{self, EMPTY_MODULE_CODE, EMPTY_SHIM_PATH};
use crate::remote_fs::{RemoteFs, Visited};
use crate::resolver::VirtualFs;

/// A version string and where it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Numeric semver, a pinned URL or a GitHub reference.
    pub version: String,
    /// The package.json the version belongs to, when resolution found one.
    pub package_json_path: Option<String>,
}

impl ModuleFetcher {
    /// Determine the version of `name` as seen from `requester`.
    ///
    /// Fails with [`FetchError::DependencyNotFound`] only when no source
    /// provides a version.
    pub async fn resolve_version(
        &self,
        name: &str,
        requester: &str,
        graph: &ModuleGraph,
    ) -> FetchResult<ResolvedVersion> {
        self.resolve_version_guarded(name, requester, requester, graph, Visited::default())
            .await
    }

    /// [`resolve_version`](Self::resolve_version) on an existing fetch chain.
    ///
    /// `origin` is where `<name>/package.json` is resolved from; edges are
    /// recorded from `requester`.
    pub(crate) fn resolve_version_guarded<'a>(
        &'a self,
        name: &'a str,
        origin: &'a str,
        requester: &'a str,
        graph: &'a ModuleGraph,
        visited: Visited,
    ) -> BoxFuture<'a, FetchResult<ResolvedVersion>> {
        async move {
            let fs = RemoteFs::new(self, graph, requester, visited);
            match self.version_from_package_json(name, origin, &fs).await {
                Ok(Some(resolved)) => return Ok(resolved),
                Ok(None) => debug!(name, "package.json is a stub"),
                Err(e) => debug!(name, error = %e, "package.json lookup failed"),
            }

            self.version_from_manifest(name)
                .map(|version| ResolvedVersion {
                    version,
                    package_json_path: None,
                })
                .ok_or_else(|| FetchError::DependencyNotFound {
                    name: name.to_string(),
                    path: origin.to_string(),
                })
        }
        .boxed()
    }

    async fn version_from_package_json(
        &self,
        name: &str,
        origin: &str,
        fs: &RemoteFs<'_>,
    ) -> FetchResult<Option<ResolvedVersion>> {
        let specifier = format!("{name}/package.json");
        let manifest_path = self.resolver().resolve(&specifier, origin, fs).await?;
        if manifest_path == EMPTY_SHIM_PATH {
            return Ok(None);
        }

        let root_manifest = paths::join(
            &paths::package_root(&self.config().module_directory, name),
            "package.json",
        );
        if manifest_path == root_manifest {
            if let Some(declared) = self.manifest().root_version(name) {
                debug!(name, version = declared, "using root declaration");
                return Ok(Some(ResolvedVersion {
                    version: declared.to_string(),
                    package_json_path: Some(manifest_path),
                }));
            }
        }

        let source = fs.read_file(&manifest_path).await?;
        if source == EMPTY_MODULE_CODE {
            return Ok(None);
        }

        let package = PackageJson::parse(&source).map_err(|e| FetchError::ManifestParse {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;
        let Some(mut version) = package.version else {
            return Err(FetchError::ManifestParse {
                path: manifest_path,
                reason: "missing \"version\" field".to_string(),
            });
        };

        if let Some(record) = self.manifest().lock_record(name) {
            if record.resolved == version {
                if let Some(url) = record.url_semver() {
                    version = url.to_string();
                }
            }
        }

        Ok(Some(ResolvedVersion {
            version,
            package_json_path: Some(manifest_path),
        }))
    }

    fn version_from_manifest(&self, name: &str) -> Option<String> {
        let manifest = self.manifest();
        manifest
            .lock_record(name)
            .map(|record| record.preferred_version().to_string())
            .or_else(|| manifest.root_version(name).map(str::to_string))
    }
}
