//! File content downloads.

use std::sync::Arc;

use futures::future::FutureExt;
use tracing::warn;

use crate::backend::BackendKind;
use crate::cache::ContentKey;
use crate::error::FetchResult;
use crate::fetcher::ModuleFetcher;
use crate::paths;
use crate::result::FileResult;

impl ModuleFetcher {
    /// Download the file at virtual `path`, owned by `dependency@version`.
    ///
    /// npm aliases are resolved first, so the cache key and URLs use the real
    /// package name. Concurrent and repeated calls for the same
    /// `(name, version, path)` share one request and one result.
    pub async fn download_dependency(
        &self,
        dependency: &str,
        version: &str,
        path: &str,
    ) -> FetchResult<Arc<FileResult>> {
        let (name, version) = paths::resolve_npm_alias(dependency, version);
        let relative =
            paths::package_relative_path(path, &self.config().module_directory, dependency);
        let primary = self.backend_for(&name, &version);
        let fallback = BackendKind::select(&version, true, self.draft_pattern());

        let key = ContentKey {
            name: name.clone(),
            version: version.clone(),
            path: relative.clone(),
        };

        let file = self
            .cache()
            .files
            .get_or_spawn(key, || {
                let http = self.http().clone();
                let endpoints = self.config().endpoints.clone();
                let path = path.to_string();
                async move {
                    let fetch = |backend: BackendKind| {
                        let (http, endpoints) = (&http, &endpoints);
                        let (name, version, relative) = (&name, &version, &relative);
                        async move {
                            let url = backend.file_url(endpoints, name, version, relative)?;
                            http.fetch_text(&url).await
                        }
                    };

                    let code = match fetch(primary).await {
                        Ok(code) => code,
                        Err(e) if fallback != primary => {
                            warn!(
                                %name,
                                %version,
                                path = %relative,
                                %primary,
                                %fallback,
                                error = %e,
                                "download failed, trying fallback backend"
                            );
                            fetch(fallback).await?
                        }
                        Err(e) => return Err(e),
                    };
                    Ok(Arc::new(FileResult::downloaded(path, code)))
                }
                .boxed()
            })
            .await?;

        // Vendored copies of the same file share a cache entry
        if file.path == path {
            Ok(file)
        } else {
            Ok(Arc::new(FileResult {
                path: path.to_string(),
                ..FileResult::clone(&file)
            }))
        }
    }
}
