//! The virtual filesystem seen by resolution: the module graph plus every
//! path known from a remote listing.

use async_trait::async_trait;
use fob_graph::ModuleGraph;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::error::{FetchError, FetchResult};
use crate::fetcher::ModuleFetcher;
use crate::paths;
use crate::resolver::VirtualFs;

/// Paths whose content is being fetched on the current call chain.
///
/// A read that re-enters one of these paths is a miss, which bounds the
/// read → version lookup → resolve → read recursion.
#[derive(Debug, Clone, Default)]
pub(crate) struct Visited {
    paths: FxHashSet<String>,
}

impl Visited {
    pub(crate) fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// A copy of this chain extended with `path`.
    pub(crate) fn with(&self, path: &str) -> Self {
        let mut next = self.clone();
        next.paths.insert(path.to_string());
        next
    }
}

/// Filesystem view for one requesting module.
///
/// Every successful read records an edge from the requester to the file.
pub(crate) struct RemoteFs<'a> {
    fetcher: &'a ModuleFetcher,
    graph: &'a ModuleGraph,
    requester: &'a str,
    visited: Visited,
}

impl<'a> RemoteFs<'a> {
    pub(crate) fn new(
        fetcher: &'a ModuleFetcher,
        graph: &'a ModuleGraph,
        requester: &'a str,
        visited: Visited,
    ) -> Self {
        Self {
            fetcher,
            graph,
            requester,
            visited,
        }
    }
}

#[async_trait]
impl VirtualFs for RemoteFs<'_> {
    fn is_file(&self, path: &str) -> bool {
        self.graph.contains(path) || self.fetcher.cache().is_known(path)
    }

    async fn read_file(&self, path: &str) -> FetchResult<String> {
        if let Some(module) = self.graph.module(path) {
            self.graph.add_dependency(self.requester, path);
            return Ok(module.code.clone());
        }

        if self.visited.contains(path) || !self.fetcher.cache().is_known(path) {
            trace!(path, "not available");
            return Err(FetchError::miss(path, self.requester));
        }

        let name = paths::dependency_name(path, &self.fetcher.config().module_directory);
        let resolved = self
            .fetcher
            .resolve_version_guarded(name, path, self.requester, self.graph, self.visited.with(path))
            .await?;
        let file = self
            .fetcher
            .download_dependency(name, &resolved.version, path)
            .await?;

        let module = self.graph.get_or_add_module(file.to_module());
        self.graph.add_dependency(self.requester, path);
        Ok(module.code.clone())
    }

    fn cached_content(&self, path: &str) -> Option<String> {
        self.graph.module(path).map(|module| module.code.clone())
    }
}
