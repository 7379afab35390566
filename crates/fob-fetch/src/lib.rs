//! # fob-fetch
//!
//! Resolves bare imports to files of remote npm packages and downloads them on
//! demand.
//!
//! ## Overview
//!
//! For one import, [`ModuleFetcher::fetch_module`]:
//!
//! 1. derives the owning dependency from the import path;
//! 2. finds its version from the module graph, the lock records or the root
//!    manifest;
//! 3. selects a [`BackendKind`] and fetches the package's file listing,
//!    falling back to a second backend once on failure;
//! 4. runs node-style resolution against the module graph plus every listing
//!    seen so far, fetching transitive `package.json` files as needed;
//! 5. downloads the resolved file, or returns a stub when the package's
//!    `browser` field disables it.
//!
//! All network work is deduplicated: concurrent requests for the same listing
//! or file attach to one in-flight future held in the [`CacheStore`].
//!
//! ## Logging
//!
//! The crate emits `tracing` events. Enable the `logging` feature for a
//! ready-made subscriber in [`logging`].

pub mod backend;
pub mod cache;
pub mod config;
mod download;
pub mod error;
pub mod fetch;
mod fetcher;
#[cfg(feature = "logging")]
pub mod logging;
mod metadata;
pub mod paths;
mod remote_fs;
pub mod resolver;
mod result;
pub mod transport;
mod version;

pub use backend::{BackendKind, PathSet};
pub use cache::{CacheStats, CacheStore, ContentKey, MetaKey};
pub use config::{Endpoints, FetchConfig};
pub use error::{ConfigError, FetchError, FetchResult};
pub use fetch::{ResilientFetch, RetryPolicy};
pub use fetcher::{ModuleFetcher, ModuleFetcherBuilder};
pub use resolver::{PathResolver, VirtualFs};
pub use result::FileResult;
pub use transport::{HttpResponse, HttpTransport, Transport, TransportError};
pub use version::ResolvedVersion;

// Re-export the graph types callers need to drive the fetcher
pub use fob_graph::{Manifest, ModuleGraph, TranspiledModule};
