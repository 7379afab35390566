//! Package listings: fetch once per identity, normalize once per root.

use std::sync::Arc;

use futures::future::FutureExt;
use tracing::{debug, warn};

use crate::backend::{BackendKind, PathSet};
use crate::cache::MetaKey;
use crate::error::FetchResult;
use crate::fetcher::ModuleFetcher;

impl ModuleFetcher {
    /// Files of package `name@version` installed at `root`.
    ///
    /// `dependency` is the name the package is installed under (it differs
    /// from `name` for npm aliases) and `package_id` its package.json path or
    /// name. The result is merged into the existence index. A failure on the
    /// selected backend is retried once on the fallback backend.
    pub async fn package_paths(
        &self,
        dependency: &str,
        package_id: &str,
        name: &str,
        version: &str,
        root: &str,
    ) -> FetchResult<Arc<PathSet>> {
        let normalized_key = format!("{dependency}{root}");
        if let Some(paths) = self.cache().normalized(&normalized_key) {
            debug!(dependency, root, "listing cache hit");
            return Ok(paths);
        }

        let primary = self.backend_for(name, version);
        let paths = match self.fetch_listing(primary, package_id, name, version, root).await {
            Ok(paths) => paths,
            Err(e) => {
                let fallback = BackendKind::select(version, true, self.draft_pattern());
                if fallback == primary {
                    return Err(e);
                }
                warn!(
                    name,
                    version,
                    %primary,
                    %fallback,
                    error = %e,
                    "listing failed, trying fallback backend"
                );
                self.fetch_listing(fallback, package_id, name, version, root)
                    .await?
            }
        };

        Ok(self.cache().insert_normalized(normalized_key, paths))
    }

    async fn fetch_listing(
        &self,
        backend: BackendKind,
        package_id: &str,
        name: &str,
        version: &str,
        root: &str,
    ) -> FetchResult<PathSet> {
        let key = MetaKey::new(package_id, version, backend);
        let raw = self
            .cache()
            .metas
            .get_or_spawn(key, || {
                let http = self.http().clone();
                let endpoints = self.config().endpoints.clone();
                let (name, version) = (name.to_string(), version.to_string());
                async move {
                    backend
                        .fetch_meta(&http, &endpoints, &name, &version)
                        .await
                        .map(Arc::new)
                }
                .boxed()
            })
            .await?;

        backend.normalize(&raw, root)
    }

    /// Backend for a package: the override table first, then the selection
    /// rule.
    pub(crate) fn backend_for(&self, name: &str, version: &str) -> BackendKind {
        self.config()
            .backend_override(name)
            .unwrap_or_else(|| BackendKind::select(version, false, self.draft_pattern()))
    }
}
