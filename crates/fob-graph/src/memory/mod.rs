//! Shared module graph.
//!
//! State lives in one lock; writers (the bundler, the fetcher) and readers
//! share it through cloned [`ModuleGraph`] handles.

mod graph;
mod mutations;
mod queries;

pub use graph::ModuleGraph;
