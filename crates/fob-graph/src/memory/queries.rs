//! Query methods for ModuleGraph.

use std::sync::Arc;

use super::graph::ModuleGraph;
use crate::{Error, Result, TranspiledModule};

impl ModuleGraph {
    /// Whether a module is registered at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.inner.read().modules.contains_key(path)
    }

    /// Retrieve a module by path.
    pub fn module(&self, path: &str) -> Option<Arc<TranspiledModule>> {
        self.inner.read().modules.get(path).cloned()
    }

    /// Source text of the module at `path`.
    pub fn code(&self, path: &str) -> Result<String> {
        self.inner
            .read()
            .modules
            .get(path)
            .map(|module| module.code.clone())
            .ok_or_else(|| Error::ModuleNotFound(path.to_string()))
    }

    /// Modules that `path` requires, sorted.
    pub fn dependencies(&self, path: &str) -> Vec<String> {
        let inner = self.inner.read();
        let mut deps: Vec<String> = inner
            .dependencies
            .get(path)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        deps.sort();
        deps
    }

    /// Modules that required `path`, sorted.
    pub fn initiators(&self, path: &str) -> Vec<String> {
        let inner = self.inner.read();
        let mut initiators: Vec<String> = inner
            .initiators
            .get(path)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        initiators.sort();
        initiators
    }

    /// All registered paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.inner.read().modules.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.inner.read().modules.len()
    }

    /// Whether the graph has no modules.
    pub fn is_empty(&self) -> bool {
        self.inner.read().modules.is_empty()
    }
}
