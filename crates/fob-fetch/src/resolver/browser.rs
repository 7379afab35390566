//! `browser` field replacement maps.

use fob_graph::{PackageJson, Replacement};
use tracing::debug;

use super::{PathResolver, VirtualFs};
use crate::paths::{self, EMPTY_SHIM_PATH};

/// The nearest loaded package around a directory.
pub(super) struct PackageScope {
    pub dir: String,
    pub package: PackageJson,
}

impl PathResolver {
    /// Find the closest `package.json` above `dir` whose content is already
    /// loaded. The search stops at module directory boundaries.
    pub(super) fn package_scope<F>(&self, dir: &str, fs: &F) -> Option<PackageScope>
    where
        F: VirtualFs + ?Sized,
    {
        let mut current = dir.to_string();
        loop {
            if self.is_module_directory(paths::basename(&current)) {
                return None;
            }
            let manifest = paths::join(&current, "package.json");
            if let Some(source) = fs.cached_content(&manifest) {
                return match PackageJson::parse(&source) {
                    Ok(package) => Some(PackageScope {
                        dir: current,
                        package,
                    }),
                    Err(e) => {
                        debug!(%manifest, error = %e, "ignoring unreadable package.json");
                        None
                    }
                };
            }
            if current == "/" {
                return None;
            }
            current = paths::dirname(&current);
        }
    }

    /// Replacement the requesting package declares for a bare specifier.
    pub(crate) fn bare_replacement<F>(
        &self,
        specifier: &str,
        basedir: &str,
        fs: &F,
    ) -> Option<(String, Replacement)>
    where
        F: VirtualFs + ?Sized,
    {
        let scope = self.package_scope(basedir, fs)?;
        let replacement = scope.package.browser_map()?.get(specifier)?.clone();
        Some((scope.dir, replacement))
    }

    /// Pass a resolved file through its package's `browser` map.
    pub(super) fn apply_file_replacement<F>(&self, resolved: String, fs: &F) -> String
    where
        F: VirtualFs + ?Sized,
    {
        let Some(scope) = self.package_scope(&paths::dirname(&resolved), fs) else {
            return resolved;
        };
        let Some(map) = scope.package.browser_map() else {
            return resolved;
        };

        // An exact key beats one that only matches after extension probing
        let best = map
            .iter()
            .filter(|(key, _)| paths::is_path_specifier(key))
            .filter_map(|(key, replacement)| {
                let target = paths::join(&scope.dir, key);
                let rank = if target == resolved {
                    0
                } else {
                    1 + self
                        .extensions
                        .iter()
                        .position(|ext| format!("{target}{ext}") == resolved)?
                };
                Some((rank, key, replacement))
            })
            .min_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        match best {
            None => resolved,
            Some((_, _, Replacement::Disabled)) => EMPTY_SHIM_PATH.to_string(),
            Some((_, _, Replacement::Path(path))) => {
                let target = paths::join(&scope.dir, path);
                self.load_as_file(&target, fs)
                    .or_else(|| self.load_index(&target, fs))
                    .unwrap_or(resolved)
            }
        }
    }
}
