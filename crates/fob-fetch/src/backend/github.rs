//! GitHub-addressed versions.

use serde::Deserialize;

use crate::error::{FetchError, FetchResult};

/// A repository reference parsed from a dependency version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
    /// Branch, tag or commit after `#`.
    pub reference: Option<String>,
}

/// Response of the commits endpoint; only the hash is read.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
}

impl GitHubRepo {
    /// Parse `user/repo`, `github:user/repo`, `git@github.com:user/repo`
    /// and URL forms (`https://`, `git+https://`, `git+ssh://`, `git://`) on
    /// `github.com` or `www.github.com`, each with an optional `#ref`.
    ///
    /// ```
    /// # use fob_fetch::backend::GitHubRepo;
    /// let repo = GitHubRepo::parse("git+https://github.com/facebook/react.git#v18").unwrap();
    /// assert_eq!(repo.owner, "facebook");
    /// assert_eq!(repo.repo, "react");
    /// assert_eq!(repo.reference.as_deref(), Some("v18"));
    /// ```
    pub fn parse(version: &str) -> FetchResult<Self> {
        let invalid = || {
            FetchError::InvalidUrl(format!("'{version}' is not a GitHub repository reference"))
        };

        let (slug, reference) = match version.split_once('#') {
            Some((slug, reference)) if !reference.is_empty() => (slug, Some(reference.to_string())),
            Some((slug, _)) => (slug, None),
            None => (version, None),
        };

        let path = if slug.contains("://") {
            let url = url::Url::parse(slug.strip_prefix("git+").unwrap_or(slug))
                .map_err(|_| invalid())?;
            match url.host_str() {
                Some("github.com" | "www.github.com") => url.path().to_string(),
                _ => return Err(invalid()),
            }
        } else if let Some(rest) = slug.strip_prefix("git@github.com:") {
            rest.to_string()
        } else {
            slug.strip_prefix("github:").unwrap_or(slug).to_string()
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if is_segment(owner) && is_segment(repo) => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
                reference,
            }),
            _ => Err(invalid()),
        }
    }

    /// `owner/repo` with the reference appended as `@ref` when present.
    pub fn cdn_slug(&self) -> String {
        match &self.reference {
            Some(reference) => format!("{}/{}@{}", self.owner, self.repo, reference),
            None => format!("{}/{}", self.owner, self.repo),
        }
    }

    /// API URL returning the commit the reference points at.
    pub fn commit_url(&self, api: &str) -> String {
        format!(
            "{api}/repos/{}/{}/commits/{}",
            self.owner,
            self.repo,
            self.reference.as_deref().unwrap_or("HEAD")
        )
    }
}

fn is_segment(part: &str) -> bool {
    !part.is_empty() && !part.contains([':', '@'])
}
