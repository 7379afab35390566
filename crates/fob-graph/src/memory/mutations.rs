//! Mutation methods for ModuleGraph.

use std::sync::Arc;

use super::graph::ModuleGraph;
use crate::TranspiledModule;

impl ModuleGraph {
    /// Add a module into the graph, replacing any module at the same path.
    ///
    /// Existing edges of a replaced module are kept.
    pub fn add_module(&self, module: TranspiledModule) -> Arc<TranspiledModule> {
        let module = Arc::new(module);
        let mut inner = self.inner.write();
        inner.modules.insert(module.path.clone(), Arc::clone(&module));
        module
    }

    /// Add a module only if its path is not registered yet.
    ///
    /// Returns the module that is in the graph afterwards.
    pub fn get_or_add_module(&self, module: TranspiledModule) -> Arc<TranspiledModule> {
        let mut inner = self.inner.write();
        Arc::clone(
            inner
                .modules
                .entry(module.path.clone())
                .or_insert_with(|| Arc::new(module)),
        )
    }

    /// Add a dependency edge, creating forward and reverse mappings.
    pub fn add_dependency(&self, from: impl Into<String>, to: impl Into<String>) {
        let (from, to) = (from.into(), to.into());
        let mut inner = self.inner.write();

        // HashSet prevents duplicate edges
        inner
            .dependencies
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        inner.initiators.entry(to).or_default().insert(from);
    }
}
