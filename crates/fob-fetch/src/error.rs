//! Error types for remote dependency fetching.
//!
//! Errors are `Clone` because a single in-flight request is shared by every
//! caller waiting on the same cache key, and each waiter receives its own copy
//! of the outcome.

use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while resolving or downloading remote modules.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// No version could be determined for a dependency.
    #[error("Could not find dependency '{name}' (requested as '{path}')")]
    DependencyNotFound { name: String, path: String },

    /// Every attempt against a URL failed.
    #[error("Failed to fetch {url} after {attempts} attempt(s): {reason}")]
    Network {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// A path is absent from both the module graph and the known remote files.
    #[error("Cannot find module '{specifier}' from '{from}'")]
    ResolutionMiss { specifier: String, from: String },

    /// A backend returned metadata that does not have the expected shape.
    #[error("Malformed metadata from {origin}: {reason}")]
    MalformedMetadata { origin: String, reason: String },

    /// A package.json file could not be parsed.
    #[error("Invalid package.json at {path}: {reason}")]
    ManifestParse { path: String, reason: String },

    /// A version string or URL could not be interpreted.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be set up.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FetchError {
    /// Whether this error is a per-candidate negative result of path resolution.
    pub fn is_resolution_miss(&self) -> bool {
        matches!(self, FetchError::ResolutionMiss { .. })
    }

    pub(crate) fn miss(specifier: impl Into<String>, from: impl Into<String>) -> Self {
        FetchError::ResolutionMiss {
            specifier: specifier.into(),
            from: from.into(),
        }
    }
}

/// Errors raised while loading or validating [`FetchConfig`](crate::FetchConfig).
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    #[error("failed to load configuration: {0}")]
    Load(String),
}
