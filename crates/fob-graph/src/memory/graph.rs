//! Graph handle and its lock-protected state.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::TranspiledModule;

/// Shared handle to the bundler's module graph.
///
/// Cloning the handle is cheap; all clones observe the same modules and edges.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    pub(super) inner: Arc<RwLock<GraphInner>>,
}

#[derive(Debug, Default)]
pub(super) struct GraphInner {
    pub(super) modules: FxHashMap<String, Arc<TranspiledModule>>,
    /// Forward edges: module -> modules it required.
    pub(super) dependencies: FxHashMap<String, FxHashSet<String>>,
    /// Reverse edges: module -> modules that required it.
    pub(super) initiators: FxHashMap<String, FxHashSet<String>>,
}

impl ModuleGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a graph from an iterator of modules (without edges).
    pub fn from_modules<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = TranspiledModule>,
    {
        let graph = Self::new();
        for module in modules {
            graph.add_module(module);
        }
        graph
    }
}
