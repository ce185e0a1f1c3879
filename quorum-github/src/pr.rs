//! Pull request context gathering
//!
//! Fetches everything the scorer needs from a PR: title, body, diff, and
//! check runs. Diff and checks degrade to empty values when unavailable; the
//! evaluation proceeds with whatever context could be gathered.

use octocrab::params::repos::Commitish;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, GitHubClient, Result};

/// Result of one CI check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check run name
    pub name: String,
    /// Conclusion, or current status while still running
    pub conclusion: String,
}

impl CheckResult {
    /// Marker used when rendering this check in summaries
    pub fn marker(&self) -> &'static str {
        match self.conclusion.as_str() {
            "success" => "[ok]",
            "failure" | "timed_out" | "cancelled" => "[fail]",
            _ => "[...]",
        }
    }
}

/// Everything the scorer needs to know about a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrContext {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Head branch name
    pub head_branch: String,
    /// Full unified diff, empty when unavailable
    pub diff: String,
    /// Check run results for the head commit
    pub checks: Vec<CheckResult>,
}

impl PrContext {
    /// Task text for the scoring prompt
    ///
    /// The factory writes the task spec into the PR body between a
    /// `### Task` heading and the next `---` rule; when that section is
    /// missing the whole body stands in for it.
    pub fn task_text(&self) -> String {
        extract_task_section(&self.body).unwrap_or_else(|| self.body.clone())
    }

    /// Summary of the diff: files changed plus added/removed line counts
    pub fn diff_stat(&self) -> String {
        diff_stat_of(&self.diff)
    }

    /// One line per check run, with a pass/fail marker
    pub fn check_summary(&self) -> String {
        self.checks
            .iter()
            .map(|check| format!("{} {}: {}", check.marker(), check.name, check.conclusion))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Section of the body between `### Task` and the next `---` rule
fn extract_task_section(body: &str) -> Option<String> {
    let start = body.find("### Task")? + "### Task".len();
    let rest = &body[start..];
    let end = rest.find("\n---").unwrap_or(rest.len());
    let section = rest[..end].trim();
    if section.is_empty() {
        None
    } else {
        Some(section.to_string())
    }
}

/// Compute a summary line from a unified diff
fn diff_stat_of(diff: &str) -> String {
    if diff.is_empty() {
        return String::new();
    }

    let mut files = 0usize;
    let mut insertions = 0usize;
    let mut deletions = 0usize;

    for line in diff.lines() {
        if line.starts_with("diff --git ") {
            files += 1;
        } else if line.starts_with('+') && !line.starts_with("+++") {
            insertions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            deletions += 1;
        }
    }

    format!(
        "{} files changed, {} insertions(+), {} deletions(-)",
        files, insertions, deletions
    )
}

impl GitHubClient {
    /// Fetch the evaluation context for a pull request
    ///
    /// The PR itself must exist; diff and check runs degrade to empty values
    /// when they cannot be fetched.
    pub async fn pr_context(&self, number: u64) -> Result<PrContext> {
        let pr = self
            .client()
            .pulls(self.owner(), self.repo())
            .get(number)
            .await
            .map_err(|e| match e {
                octocrab::Error::GitHub { ref source, .. }
                    if source.message.contains("Not Found") =>
                {
                    Error::PrNotFound(number)
                }
                other => Error::Api(other),
            })?;

        let head_sha = pr.head.sha.clone();
        let head_branch = pr.head.ref_field.clone();

        let diff = match self
            .client()
            .pulls(self.owner(), self.repo())
            .get_diff(number)
            .await
        {
            Ok(diff) => diff,
            Err(e) => {
                warn!(pr = number, error = %e, "could not fetch diff, scoring without it");
                String::new()
            }
        };

        let checks = match self.check_results(&head_sha).await {
            Ok(checks) => checks,
            Err(e) => {
                warn!(pr = number, error = %e, "could not fetch check runs");
                Vec::new()
            }
        };

        debug!(pr = number, checks = checks.len(), "gathered PR context");

        Ok(PrContext {
            number,
            title: pr.title.unwrap_or_default(),
            body: pr.body.unwrap_or_default(),
            head_branch,
            diff,
            checks,
        })
    }

    /// Fetch check run results for a commit
    pub async fn check_results(&self, git_ref: &str) -> Result<Vec<CheckResult>> {
        let runs = self
            .client()
            .checks(self.owner(), self.repo())
            .list_check_runs_for_git_ref(Commitish(git_ref.to_string()))
            .send()
            .await?;

        Ok(runs
            .check_runs
            .into_iter()
            .map(|run| CheckResult {
                name: run.name,
                conclusion: run.conclusion.unwrap_or_else(|| "pending".to_string()),
            })
            .collect())
    }
}
