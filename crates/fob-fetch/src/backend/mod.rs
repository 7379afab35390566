//! Remote distribution backends.
//!
//! Each [`BackendKind`] is a stateless description of one remote convention:
//! how to build metadata and file URLs for a package version, and how that
//! backend's metadata maps onto a flat [`PathSet`].
//!
//! | kind | versions | metadata |
//! |------|----------|----------|
//! | `Draft` | pre-built archive URLs | nested tree |
//! | `JsDelivrNpm` | registry versions | flat list |
//! | `JsDelivrGitHub` | `user/repo` slugs and repository URLs | flat list |
//! | `Unpkg` | registry versions, fallback | nested tree |

mod github;
mod normalize;

pub use github::{CommitInfo, GitHubRepo};
pub use normalize::{FlatEntry, FlatListing, TreeEntry, normalize_flat, normalize_tree};

use std::fmt;

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Endpoints;
use crate::error::{FetchError, FetchResult};
use crate::fetch::ResilientFetch;

/// Flat set of absolute virtual paths known to exist.
pub type PathSet = FxHashSet<String>;

/// The four supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "jsdelivr-npm")]
    JsDelivrNpm,
    #[serde(rename = "jsdelivr-github")]
    JsDelivrGitHub,
    #[serde(rename = "unpkg")]
    Unpkg,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Draft => "draft",
            BackendKind::JsDelivrNpm => "jsdelivr-npm",
            BackendKind::JsDelivrGitHub => "jsdelivr-github",
            BackendKind::Unpkg => "unpkg",
        })
    }
}

impl BackendKind {
    /// Pick the backend for a version string.
    ///
    /// Rules, first match wins: draft pattern → `Draft`; contains `/` →
    /// `JsDelivrGitHub`; otherwise `JsDelivrNpm`, or `Unpkg` when the caller
    /// asks for the fallback.
    ///
    /// ```
    /// # use fob_fetch::backend::BackendKind;
    /// # let draft = regex::Regex::new(r"^https?://(pkg|pr)\.csb\.dev/").unwrap();
    /// assert_eq!(BackendKind::select("user/repo", false, &draft), BackendKind::JsDelivrGitHub);
    /// assert_eq!(BackendKind::select("1.2.3", false, &draft), BackendKind::JsDelivrNpm);
    /// assert_eq!(BackendKind::select("1.2.3", true, &draft), BackendKind::Unpkg);
    /// ```
    pub fn select(version: &str, use_fallback: bool, draft_pattern: &Regex) -> Self {
        if draft_pattern.is_match(version) {
            BackendKind::Draft
        } else if version.contains('/') {
            BackendKind::JsDelivrGitHub
        } else if use_fallback {
            BackendKind::Unpkg
        } else {
            BackendKind::JsDelivrNpm
        }
    }

    /// URL of one file of the package. `path` starts with `/` and is relative
    /// to the package root.
    pub fn file_url(
        self,
        endpoints: &Endpoints,
        name: &str,
        version: &str,
        path: &str,
    ) -> FetchResult<String> {
        Ok(match self {
            BackendKind::Draft => format!("{}{path}", draft_base(version)),
            BackendKind::JsDelivrNpm => {
                format!("{}/npm/{name}@{version}{path}", endpoints.jsdelivr_cdn)
            }
            BackendKind::JsDelivrGitHub => format!(
                "{}/gh/{}{path}",
                endpoints.jsdelivr_cdn,
                GitHubRepo::parse(version)?.cdn_slug()
            ),
            BackendKind::Unpkg => format!("{}/{name}@{version}{path}", endpoints.unpkg),
        })
    }

    /// URL of the package listing.
    ///
    /// The jsDelivr backends need a concrete version (npm) or commit (GitHub)
    /// first, which may cost one extra request.
    pub async fn meta_url(
        self,
        http: &ResilientFetch,
        endpoints: &Endpoints,
        name: &str,
        version: &str,
    ) -> FetchResult<String> {
        match self {
            BackendKind::Draft => Ok(format!("{}/_meta.json", draft_base(version))),
            BackendKind::JsDelivrNpm => {
                let concrete = if version.starts_with(|c: char| c.is_ascii_digit()) {
                    version.to_string()
                } else {
                    concrete_npm_version(http, endpoints, name, version).await?
                };
                Ok(format!(
                    "{}/npm/{name}@{concrete}/flat",
                    endpoints.jsdelivr_data
                ))
            }
            BackendKind::JsDelivrGitHub => {
                let repo = GitHubRepo::parse(version)?;
                let commit: CommitInfo = http.fetch_json(&repo.commit_url(&endpoints.github_api)).await?;
                Ok(format!(
                    "{}/gh/{}/{}@{}/flat",
                    endpoints.jsdelivr_data, repo.owner, repo.repo, commit.sha
                ))
            }
            BackendKind::Unpkg => Ok(format!("{}/{name}@{version}/?meta", endpoints.unpkg)),
        }
    }

    /// Fetch the raw listing document.
    pub async fn fetch_meta(
        self,
        http: &ResilientFetch,
        endpoints: &Endpoints,
        name: &str,
        version: &str,
    ) -> FetchResult<Value> {
        let url = self.meta_url(http, endpoints, name, version).await?;
        http.fetch_json(&url).await
    }

    /// Turn a raw listing into absolute paths under `root`.
    pub fn normalize(self, raw: &Value, root: &str) -> FetchResult<PathSet> {
        match self {
            BackendKind::Draft | BackendKind::Unpkg => normalize_tree(raw, root),
            BackendKind::JsDelivrNpm | BackendKind::JsDelivrGitHub => normalize_flat(raw, root),
        }
    }
}

fn draft_base(version: &str) -> &str {
    version
        .strip_suffix("/_pkg.tgz")
        .unwrap_or(version)
        .trim_end_matches('/')
}

/// Read the published version behind a tag or range from the package's
/// `package.json` on the CDN.
async fn concrete_npm_version(
    http: &ResilientFetch,
    endpoints: &Endpoints,
    name: &str,
    version: &str,
) -> FetchResult<String> {
    let url = format!("{}/npm/{name}@{version}/package.json", endpoints.jsdelivr_cdn);
    let manifest: Value = http.fetch_json(&url).await?;
    manifest
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FetchError::MalformedMetadata {
            origin: url,
            reason: "package.json has no version".to_string(),
        })
}
