//! Core resolution algorithm.

use fob_graph::{PackageJson, Replacement};
use tracing::{debug, trace};

use super::{PathResolver, VirtualFs};
use crate::error::{FetchError, FetchResult};
use crate::paths::{self, EMPTY_SHIM_PATH};

impl PathResolver {
    /// Resolve `specifier` as required from the file `from`.
    ///
    /// Returns the absolute path of the file, or [`EMPTY_SHIM_PATH`] when a
    /// `browser` map disables the module. Fails with
    /// [`FetchError::ResolutionMiss`] once every candidate is exhausted; any
    /// other error from the filesystem aborts resolution.
    pub async fn resolve<F>(&self, specifier: &str, from: &str, fs: &F) -> FetchResult<String>
    where
        F: VirtualFs + ?Sized,
    {
        let basedir = paths::dirname(from);
        debug!(specifier, from, "resolving");

        let resolved = if paths::is_path_specifier(specifier) {
            let target = paths::join(&basedir, specifier);
            self.load_as_file_or_directory(&target, fs).await?
        } else {
            match self.bare_replacement(specifier, &basedir, fs) {
                Some((_, Replacement::Disabled)) => return Ok(EMPTY_SHIM_PATH.to_string()),
                Some((package_dir, Replacement::Path(replacement))) => {
                    trace!(specifier, %replacement, "browser field replacement");
                    if paths::is_path_specifier(&replacement) {
                        let target = paths::join(&package_dir, &replacement);
                        self.load_as_file_or_directory(&target, fs).await?
                    } else {
                        self.load_node_modules(&replacement, &basedir, fs).await?
                    }
                }
                None => self.load_node_modules(specifier, &basedir, fs).await?,
            }
        };

        match resolved {
            Some(path) if path == EMPTY_SHIM_PATH => Ok(path),
            Some(path) => Ok(self.apply_file_replacement(path, fs)),
            None => Err(FetchError::miss(specifier, from)),
        }
    }

    async fn load_as_file_or_directory<F>(&self, target: &str, fs: &F) -> FetchResult<Option<String>>
    where
        F: VirtualFs + ?Sized,
    {
        if let Some(found) = self.load_as_file(target, fs) {
            return Ok(Some(found));
        }
        self.load_as_directory(target, fs).await
    }

    /// Exact path, then each extension.
    pub(super) fn load_as_file<F>(&self, target: &str, fs: &F) -> Option<String>
    where
        F: VirtualFs + ?Sized,
    {
        if fs.is_file(target) {
            return Some(target.to_string());
        }
        self.extensions
            .iter()
            .map(|ext| format!("{target}{ext}"))
            .find(|candidate| fs.is_file(candidate))
    }

    /// `index` plus each extension inside `dir`.
    pub(super) fn load_index<F>(&self, dir: &str, fs: &F) -> Option<String>
    where
        F: VirtualFs + ?Sized,
    {
        let index = paths::join(dir, "index");
        self.extensions
            .iter()
            .map(|ext| format!("{index}{ext}"))
            .find(|candidate| fs.is_file(candidate))
    }

    async fn load_as_directory<F>(&self, dir: &str, fs: &F) -> FetchResult<Option<String>>
    where
        F: VirtualFs + ?Sized,
    {
        let manifest = paths::join(dir, "package.json");
        if fs.is_file(&manifest) {
            match fs.read_file(&manifest).await {
                Ok(source) => {
                    if let Some(found) = self.load_entry_point(dir, &manifest, &source, fs) {
                        return Ok(Some(found));
                    }
                }
                Err(e) if e.is_resolution_miss() => {
                    trace!(%manifest, "package.json unavailable");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(self.load_index(dir, fs))
    }

    fn load_entry_point<F>(&self, dir: &str, manifest: &str, source: &str, fs: &F) -> Option<String>
    where
        F: VirtualFs + ?Sized,
    {
        if source == paths::EMPTY_MODULE_CODE {
            return None;
        }
        let package = match PackageJson::parse(source) {
            Ok(package) => package,
            Err(e) => {
                debug!(manifest, error = %e, "ignoring unreadable package.json");
                return None;
            }
        };

        let entry = package.entry_point()?;
        let entry = match entry {
            "" | "." | "./" => "index",
            other => other,
        };
        let main = paths::join(dir, entry);
        self.load_as_file(&main, fs)
            .or_else(|| self.load_index(&main, fs))
    }

    async fn load_node_modules<F>(
        &self,
        specifier: &str,
        basedir: &str,
        fs: &F,
    ) -> FetchResult<Option<String>>
    where
        F: VirtualFs + ?Sized,
    {
        for dir in self.node_modules_paths(basedir) {
            let target = paths::join(&dir, specifier);
            if let Some(found) = self.load_as_file_or_directory(&target, fs).await? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Candidate module directories from `start` up to `/`, nearest first.
    ///
    /// Ancestors that are themselves module directories are skipped, so
    /// `/node_modules/a` yields `/node_modules/a/node_modules` and
    /// `/node_modules`, never `/node_modules/node_modules`.
    pub fn node_modules_paths(&self, start: &str) -> Vec<String> {
        let mut dirs = Vec::new();
        let mut current = paths::normalize(start);
        loop {
            if !self.is_module_directory(paths::basename(&current)) {
                dirs.extend(
                    self.module_directories
                        .iter()
                        .map(|module_dir| paths::join(&current, module_dir)),
                );
            }
            if current == "/" {
                break;
            }
            current = paths::dirname(&current);
        }
        dirs
    }

    pub(super) fn is_module_directory(&self, name: &str) -> bool {
        self.module_directories.iter().any(|dir| dir == name)
    }
}
