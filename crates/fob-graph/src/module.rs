use serde::{Deserialize, Serialize};

/// A module registered in the graph.
///
/// Edges are not stored on the node itself; they live in the graph so that a
/// single write lock covers both directions of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranspiledModule {
    /// Absolute virtual path, e.g. `/node_modules/react/index.js`.
    pub path: String,
    /// Raw source text.
    pub code: String,
    /// True when the content came from a remote backend.
    #[serde(default)]
    pub downloaded: bool,
    /// True when the module is a synthesized no-op stub.
    #[serde(default)]
    pub stubbed: bool,
}

impl TranspiledModule {
    /// Create a module registered by the bundler itself.
    pub fn new(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            downloaded: false,
            stubbed: false,
        }
    }

    /// Create a module whose content was fetched from a remote backend.
    pub fn downloaded(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            downloaded: true,
            ..Self::new(path, code)
        }
    }

    /// Mark the module as a no-op stub.
    pub fn mark_stubbed(&mut self) {
        self.stubbed = true;
    }
}
