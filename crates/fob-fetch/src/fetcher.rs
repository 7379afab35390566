//! Entry point tying version lookup, listings, resolution and downloads
//! together for one import.

use std::sync::Arc;

use fob_graph::{Manifest, ModuleGraph, Replacement};
use regex::Regex;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::fetch::ResilientFetch;
use crate::paths::{self, EMPTY_SHIM_PATH};
use crate::remote_fs::{RemoteFs, Visited};
use crate::resolver::PathResolver;
use crate::result::FileResult;
use crate::transport::{HttpTransport, Transport};

/// Resolves imports to remote package files.
///
/// Cloning is cheap; clones share configuration and caches.
///
/// ```rust,no_run
/// use fob_fetch::ModuleFetcher;
/// use fob_graph::{Manifest, ModuleGraph, TranspiledModule};
///
/// # async fn run() -> fob_fetch::FetchResult<()> {
/// let manifest = Manifest::new().with_dependency("react", "18.2.0");
/// let fetcher = ModuleFetcher::builder().manifest(manifest).build()?;
///
/// let graph = ModuleGraph::new();
/// graph.add_module(TranspiledModule::new("/src/index.js", "require('react')"));
///
/// let file = fetcher.fetch_module("react", "/src/index.js", &graph).await?;
/// println!("{}: {} bytes", file.path, file.code.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ModuleFetcher {
    inner: Arc<FetcherInner>,
}

#[derive(Debug)]
struct FetcherInner {
    config: FetchConfig,
    http: ResilientFetch,
    cache: Arc<CacheStore>,
    manifest: Arc<Manifest>,
    draft_pattern: Regex,
    resolver: PathResolver,
}

/// Builder for [`ModuleFetcher`].
#[derive(Debug, Default)]
pub struct ModuleFetcherBuilder {
    config: Option<FetchConfig>,
    transport: Option<Arc<dyn Transport>>,
    manifest: Option<Arc<Manifest>>,
    cache: Option<Arc<CacheStore>>,
}

impl ModuleFetcherBuilder {
    pub fn config(mut self, config: FetchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Outbound transport. Defaults to [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn manifest(mut self, manifest: impl Into<Arc<Manifest>>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    /// Share caches with other fetchers. Defaults to a fresh store.
    pub fn cache(mut self, cache: Arc<CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> FetchResult<ModuleFetcher> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let draft_pattern = config.draft_regex()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&config)?),
        };

        Ok(ModuleFetcher {
            inner: Arc::new(FetcherInner {
                http: ResilientFetch::new(transport, config.retry_policy()),
                resolver: PathResolver::from_config(&config),
                cache: self.cache.unwrap_or_default(),
                manifest: self.manifest.unwrap_or_default(),
                draft_pattern,
                config,
            }),
        })
    }
}

impl ModuleFetcher {
    pub fn builder() -> ModuleFetcherBuilder {
        ModuleFetcherBuilder::default()
    }

    /// Resolve and download the file `path` imported by `requester`.
    ///
    /// `path` is a bare specifier (`react`, `lodash/fp`) or an absolute
    /// virtual path inside a module directory. Files read while resolving are
    /// added to `graph` with edges from `requester`. Disabled modules come
    /// back as stubs without any network traffic.
    pub async fn fetch_module(
        &self,
        path: &str,
        requester: &str,
        graph: &ModuleGraph,
    ) -> FetchResult<Arc<FileResult>> {
        let module_dir = self.config().module_directory.as_str();

        if !paths::is_path_specifier(path) {
            let fs = RemoteFs::new(self, graph, requester, Visited::default());
            if let Some((_, Replacement::Disabled)) =
                self.resolver()
                    .bare_replacement(path, &paths::dirname(requester), &fs)
            {
                debug!(path, requester, "disabled by browser field");
                return Ok(Arc::new(FileResult::stub(self.stub_path(path))));
            }
        }

        let dependency = paths::dependency_name(path, module_dir);
        let resolved = self
            .resolve_version(dependency, requester, graph)
            .await
            .map_err(|e| match e {
                FetchError::DependencyNotFound { name, .. } => FetchError::DependencyNotFound {
                    name,
                    path: path.to_string(),
                },
                other => other,
            })?;

        let (name, version) = paths::resolve_npm_alias(dependency, &resolved.version);
        let root = resolved
            .package_json_path
            .as_deref()
            .map(paths::dirname)
            .or_else(|| paths::install_root(path, module_dir, dependency))
            .unwrap_or_else(|| paths::package_root(module_dir, dependency));
        let package_id = resolved
            .package_json_path
            .clone()
            .unwrap_or_else(|| name.clone());
        info!(dependency, %name, %version, %root, "fetching module");

        self.package_paths(dependency, &package_id, &name, &version, &root)
            .await?;

        let fs = RemoteFs::new(self, graph, requester, Visited::default());
        let resolved_path = self.resolver().resolve(path, requester, &fs).await?;
        if resolved_path == EMPTY_SHIM_PATH {
            debug!(path, "resolved to empty module");
            return Ok(Arc::new(FileResult::stub(self.stub_path(path))));
        }

        let owner = paths::dependency_name(&resolved_path, module_dir);
        if owner == dependency {
            self.download_dependency(dependency, &resolved.version, &resolved_path)
                .await
        } else {
            // Browser replacements and vendored copies can point into another package
            let owner_version = self
                .resolve_version(owner, &resolved_path, graph)
                .await?;
            self.download_dependency(owner, &owner_version.version, &resolved_path)
                .await
        }
    }

    /// Path reported for a stub of `path`.
    fn stub_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}/{path}", self.config().module_directory)
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.inner.cache
    }

    pub fn manifest(&self) -> &Manifest {
        &self.inner.manifest
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.inner.resolver
    }

    pub(crate) fn http(&self) -> &ResilientFetch {
        &self.inner.http
    }

    pub(crate) fn draft_pattern(&self) -> &Regex {
        &self.inner.draft_pattern
    }
}
