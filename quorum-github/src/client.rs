//! GitHub API client using octocrab

use crate::{Error, Result};
use octocrab::Octocrab;
use quorum_core::Secrets;
use tracing::{debug, info};

/// GitHub API client for pull request operations
pub struct GitHubClient {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a new GitHub client for the specified repository
    ///
    /// Token is loaded from (in priority order):
    /// 1. GITHUB_TOKEN environment variable
    /// 2. ~/.config/quorum/secrets.toml
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let repo = repo.into();

        let secrets = Secrets::load().map_err(|e| Error::Auth(e.to_string()))?;

        let token = secrets.github_token().ok_or_else(|| {
            Error::Auth(
                "GitHub token not found. Set GITHUB_TOKEN environment variable \
                 or add token to ~/.config/quorum/secrets.toml"
                    .to_string(),
            )
        })?;

        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(owner = %owner, repo = %repo, "Created GitHub client");

        Ok(Self {
            client,
            owner,
            repo,
        })
    }

    /// Create a GitHub client from a repository reference
    ///
    /// Supports formats:
    /// - owner/repo
    /// - https://github.com/owner/repo
    /// - git@github.com:owner/repo.git
    pub fn from_repo_ref(reference: &str) -> Result<Self> {
        let (owner, repo) = parse_repo_ref(reference)?;
        Self::new(owner, repo)
    }

    /// Get the repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// Post a comment on a pull request
    pub async fn post_comment(&self, number: u64, body: &str) -> Result<()> {
        debug!(pr = number, "posting evaluation comment");

        self.client
            .issues(&self.owner, &self.repo)
            .create_comment(number, body)
            .await?;

        info!(pr = number, "posted evaluation comment");
        Ok(())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

/// Parse a repository reference into owner and repo
fn parse_repo_ref(reference: &str) -> Result<(String, String)> {
    let reference = reference.trim();

    // HTTPS URL: https://github.com/owner/repo[.git]
    if reference.starts_with("https://") || reference.starts_with("http://") {
        let parsed = url::Url::parse(reference).map_err(|e| Error::Parse(e.to_string()))?;
        let path = parsed.path().trim_start_matches('/').trim_end_matches(".git");
        return split_slug(path, reference);
    }

    // SSH URL: git@github.com:owner/repo.git
    if let Some(path) = reference.strip_prefix("git@github.com:") {
        return split_slug(path.trim_end_matches(".git"), reference);
    }

    // Shorthand: owner/repo
    split_slug(reference.trim_end_matches(".git"), reference)
}

fn split_slug(path: &str, original: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    match parts.as_slice() {
        [owner, repo, ..] => Ok((owner.to_string(), repo.to_string())),
        _ => Err(Error::Parse(format!(
            "Invalid repository reference: {}. Expected owner/repo",
            original
        ))),
    }
}
