//! Fetcher configuration.
//!
//! Sources are layered with figment. Priority: environment variables
//! (`FOB_FETCH_*`, nested keys split on `__`) > config file > defaults.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::error::ConfigError;
use crate::fetch::RetryPolicy;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "fob-fetch.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FOB_FETCH_";

/// Settings for resolution, retries and remote backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Extensions probed during resolution, in order, without the leading dot.
    pub extensions: Vec<String>,
    /// Directory name searched hierarchically for packages.
    pub module_directory: String,
    /// Additional lookup directory names (e.g. the project's `NODE_PATH`).
    pub extra_module_directories: Vec<String>,
    /// Attempts per URL before giving up.
    pub max_attempts: u32,
    /// Minimum time between the starts of two attempts.
    pub retry_spacing_ms: u64,
    /// Per-request timeout of the HTTP transport.
    ///
    /// Operations themselves are bounded only by `max_attempts`; this caps a
    /// single hung connection, which then counts as one failed attempt.
    pub request_timeout_secs: u64,
    /// User agent of the HTTP transport.
    pub user_agent: String,
    /// Base URLs of the remote services.
    pub endpoints: Endpoints,
    /// Versions matching this regex are served by the draft backend.
    pub draft_pattern: String,
    /// Packages that always use a specific backend.
    pub backend_overrides: BTreeMap<String, BackendKind>,
}

/// Base URLs of the remote services, without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub jsdelivr_cdn: String,
    pub jsdelivr_data: String,
    pub unpkg: String,
    pub github_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            jsdelivr_cdn: "https://cdn.jsdelivr.net".to_string(),
            jsdelivr_data: "https://data.jsdelivr.com/v1/package".to_string(),
            unpkg: "https://unpkg.com".to_string(),
            github_api: "https://api.github.com".to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            extensions: ["js", "jsx", "json", "mjs"].map(String::from).to_vec(),
            module_directory: "node_modules".to_string(),
            extra_module_directories: Vec::new(),
            max_attempts: 6,
            retry_spacing_ms: 3000,
            request_timeout_secs: 30,
            user_agent: format!("fob-fetch/{}", env!("CARGO_PKG_VERSION")),
            endpoints: Endpoints::default(),
            draft_pattern: r"^https?://(pkg|pr)\.csb\.dev/".to_string(),
            // jsDelivr refuses to serve packages above its size limit
            backend_overrides: BTreeMap::from([("typescript".to_string(), BackendKind::Unpkg)]),
        }
    }
}

impl FetchConfig {
    /// Load configuration from defaults, a config file and the environment.
    ///
    /// With `path == None`, `fob-fetch.toml` in the working directory is used
    /// when present. Files ending in `.json` are read as JSON, anything else as
    /// TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                figment = if path.extension().is_some_and(|ext| ext == "json") {
                    figment.merge(Json::file(path))
                } else {
                    figment.merge(Toml::file(path))
                };
            }
            None => figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the resolver and retry loop depend on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts".to_string(),
                hint: "at least one attempt is required".to_string(),
            });
        }
        if self.extensions.iter().all(|ext| ext.trim_matches('.').is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "extensions".to_string(),
                hint: "provide at least one extension, e.g. [\"js\"]".to_string(),
            });
        }
        if self.module_directory.is_empty() || self.module_directory.contains('/') {
            return Err(ConfigError::InvalidValue {
                field: "module_directory".to_string(),
                hint: "must be a single directory name".to_string(),
            });
        }
        self.draft_regex()?;
        Ok(())
    }

    /// Compiled [`draft_pattern`](Self::draft_pattern).
    pub fn draft_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.draft_pattern).map_err(|e| ConfigError::InvalidValue {
            field: "draft_pattern".to_string(),
            hint: e.to_string(),
        })
    }

    /// Retry behaviour for every remote request.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            spacing: Duration::from_millis(self.retry_spacing_ms),
        }
    }

    /// Module directory followed by the extra lookup directories.
    pub fn module_directories(&self) -> Vec<String> {
        std::iter::once(self.module_directory.clone())
            .chain(
                self.extra_module_directories
                    .iter()
                    .filter(|dir| !dir.is_empty())
                    .cloned(),
            )
            .collect()
    }

    /// Backend forced for `name` by the override table.
    pub fn backend_override(&self, name: &str) -> Option<BackendKind> {
        self.backend_overrides.get(name).copied()
    }
}
