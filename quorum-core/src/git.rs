//! Diff extraction for evaluation context
//!
//! Wraps a local git repository and produces the diff stat and content for a
//! `base...head` range using merge-base semantics, the same shape the factory
//! loop produces with `git diff origin/master...HEAD`. Failures degrade to
//! empty strings: a missing diff weakens the evaluation but never aborts it.

use std::path::Path;

use git2::{DiffFormat, DiffOptions, DiffStatsFormat, Repository};
use tracing::warn;

use crate::error::{Error, Result};

/// Source-control context provider backed by a local git repository
pub struct DiffSource {
    repo: Repository,
}

impl std::fmt::Debug for DiffSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffSource")
            .field("path", &self.repo.path())
            .finish_non_exhaustive()
    }
}

impl DiffSource {
    /// Open the repository containing the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Git(format!("not a git repository: {}", path.display()))
            } else {
                Error::Git(e.message().to_string())
            }
        })?;

        Ok(Self { repo })
    }

    /// Diff stat and content between the merge base of `base` and `head`,
    /// and `head`
    ///
    /// Any failure to resolve the revisions or compute the diff degrades to
    /// a pair of empty strings.
    pub fn diff_range(&self, base: &str, head: &str) -> (String, String) {
        match self.try_diff_range(base, head) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(base = %base, head = %head, error = %e, "could not gather diff");
                (String::new(), String::new())
            }
        }
    }

    fn try_diff_range(&self, base: &str, head: &str) -> Result<(String, String)> {
        let base_commit = self.repo.revparse_single(base)?.peel_to_commit()?;
        let head_commit = self.repo.revparse_single(head)?.peel_to_commit()?;

        let merge_base = self.repo.merge_base(base_commit.id(), head_commit.id())?;
        let old_tree = self.repo.find_commit(merge_base)?.tree()?;
        let new_tree = head_commit.tree()?;

        let mut options = DiffOptions::new();
        let diff =
            self.repo
                .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut options))?;

        let stats = diff.stats()?;
        let stat_buf = stats.to_buf(DiffStatsFormat::FULL, 80)?;
        let stat = stat_buf.as_str().unwrap_or("").to_string();

        let mut content = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => content.push(line.origin()),
                _ => {}
            }
            content.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok((stat, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn commit_file(repo: &Repository, name: &str, contents: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), contents).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let signature = Signature::now("quorum", "quorum@example.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parent_refs,
        )
        .unwrap()
    }

    #[test]
    fn test_diff_range_between_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "one\n", "first");
        commit_file(&repo, "a.txt", "one\ntwo\n", "second");

        let source = DiffSource::open(dir.path()).unwrap();
        let (stat, content) = source.diff_range("HEAD~1", "HEAD");

        assert!(stat.contains("a.txt"));
        assert!(content.contains("+two"));
        assert!(!content.contains("-one"));
    }

    #[test]
    fn test_unresolvable_range_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "one\n", "first");

        let source = DiffSource::open(dir.path()).unwrap();
        let (stat, content) = source.diff_range("no-such-branch", "HEAD");

        assert_eq!(stat, "");
        assert_eq!(content, "");
    }

    #[test]
    fn test_open_non_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = DiffSource::open(dir.path());
        assert!(matches!(result, Err(Error::Git(_))));
    }
}
