//! # fob-graph
//!
//! Pure data structures shared between the bundler and the remote dependency
//! fetcher.
//!
//! ## Overview
//!
//! - **ModuleGraph**: every module the bundler has registered, keyed by its
//!   absolute virtual path, with `dependencies` (outgoing) and `initiators`
//!   (incoming) edge sets.
//! - **Manifest**: the project's root dependency declarations plus the lock
//!   records of transitive dependencies.
//! - **PackageJson**: the subset of `package.json` that module resolution reads
//!   (`version`, `main`, `module`, `browser`).
//!
//! No I/O happens in this crate. The graph handle is cheap to clone and safe to
//! share across tasks; all mutation goes through a single `RwLock`.
//!
//! ```rust
//! use fob_graph::{ModuleGraph, TranspiledModule};
//!
//! let graph = ModuleGraph::new();
//! graph.add_module(TranspiledModule::new("/src/index.js", "require('react')"));
//! graph.add_module(TranspiledModule::downloaded("/node_modules/react/index.js", "module.exports = {}"));
//! graph.add_dependency("/src/index.js", "/node_modules/react/index.js");
//!
//! assert_eq!(graph.initiators("/node_modules/react/index.js"), vec!["/src/index.js".to_string()]);
//! ```

pub mod manifest;
pub mod module;
pub mod package_json;

// In-memory implementation (WASM-compatible)
mod memory;

pub use manifest::{LockRecord, Manifest, RootDependency, is_url_version};
pub use memory::ModuleGraph;
pub use module::TranspiledModule;
pub use package_json::{BrowserField, PackageJson, Replacement, extract_package_name};

/// Error types for graph and manifest operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The requested module is not registered in the graph.
    #[error("Module not found in graph: {0}")]
    ModuleNotFound(String),

    /// A package.json document could not be parsed.
    #[error("Invalid package.json: {0}")]
    InvalidPackageJson(String),

    /// The project manifest could not be parsed.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;
