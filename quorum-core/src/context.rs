//! Evaluation context assembly
//!
//! An [`EvaluationContext`] bundles everything a reviewer is shown: the task
//! text, the diff (stat and content), and the most recent check output.
//! Truncation limits are enforced at construction so that prompt size is
//! bounded here regardless of how large the upstream payloads are.
//!
//! Context gathering always degrades: a missing task file, diff, or check log
//! becomes an empty value, never an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum characters of diff stat embedded in a prompt
pub const MAX_DIFF_STAT: usize = 2_000;

/// Maximum characters of diff content embedded in a prompt
pub const MAX_DIFF_CONTENT: usize = 12_000;

/// Trailing characters of check output embedded in a prompt
pub const MAX_CHECK_LOG: usize = 3_000;

/// What kind of change is being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalKind {
    /// Mid-loop evaluation of a factory run iteration
    Iteration(u32),
    /// Post-hoc evaluation of a pull request
    PullRequest(u64),
}

impl EvalKind {
    /// Name used for the parent trace span of this evaluation
    pub fn span_name(&self) -> String {
        match self {
            EvalKind::Iteration(n) => format!("iter-eval-{}", n),
            EvalKind::PullRequest(n) => format!("pr-eval-{}", n),
        }
    }
}

/// Immutable input bundle for one evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// What is being evaluated
    pub kind: EvalKind,
    /// Task specification text, may be empty
    pub task_text: String,
    /// Diff summary, truncated to [`MAX_DIFF_STAT`] characters
    pub diff_stat: String,
    /// Diff body, truncated to [`MAX_DIFF_CONTENT`] characters
    pub diff_content: String,
    /// Last [`MAX_CHECK_LOG`] characters of the most recent check output
    pub check_log: Option<String>,
}

impl EvaluationContext {
    /// Create a context, applying the truncation limits
    pub fn new(
        kind: EvalKind,
        task_text: impl Into<String>,
        diff_stat: impl Into<String>,
        diff_content: impl Into<String>,
        check_log: Option<String>,
    ) -> Self {
        Self {
            kind,
            task_text: task_text.into(),
            diff_stat: head_chars(diff_stat.into(), MAX_DIFF_STAT),
            diff_content: head_chars(diff_content.into(), MAX_DIFF_CONTENT),
            check_log: check_log.map(|log| tail_chars(log, MAX_CHECK_LOG)),
        }
    }
}

/// Keep at most the first `max` characters
fn head_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((index, _)) => text[..index].to_string(),
        None => text,
    }
}

/// Keep at most the last `max` characters
fn tail_chars(text: String, max: usize) -> String {
    let total = text.chars().count();
    if total <= max {
        return text;
    }
    let start = text
        .char_indices()
        .nth(total - max)
        .map(|(index, _)| index)
        .unwrap_or(0);
    text[start..].to_string()
}

/// A factory run directory holding per-iteration artifacts
///
/// By convention the directory contains `task.md`, one `checks-iter-<N>.log`
/// per iteration, and receives one `eval-iter-<N>.json` per evaluation.
#[derive(Debug, Clone)]
pub struct RunDir {
    root: PathBuf,
}

impl RunDir {
    /// Wrap a run directory path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The run directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Task specification text, empty when `task.md` is absent
    pub fn task_text(&self) -> String {
        let path = self.root.join("task.md");
        fs::read_to_string(&path).unwrap_or_else(|_| {
            debug!(path = %path.display(), "no task file, using empty task text");
            String::new()
        })
    }

    /// Check output for an iteration, `None` when the log is absent
    pub fn check_log(&self, iteration: u32) -> Option<String> {
        fs::read_to_string(self.root.join(format!("checks-iter-{}.log", iteration))).ok()
    }

    /// Where the evaluation document for an iteration is persisted
    pub fn eval_path(&self, iteration: u32) -> PathBuf {
        self.root.join(format!("eval-iter-{}.json", iteration))
    }

    /// Where trace spans for this run are appended
    pub fn trace_path(&self) -> PathBuf {
        self.root.join("trace.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_limits_applied() {
        let ctx = EvaluationContext::new(
            EvalKind::Iteration(1),
            "task",
            "s".repeat(5_000),
            "d".repeat(20_000),
            Some("c".repeat(10_000)),
        );

        assert_eq!(ctx.diff_stat.len(), MAX_DIFF_STAT);
        assert_eq!(ctx.diff_content.len(), MAX_DIFF_CONTENT);
        assert_eq!(ctx.check_log.as_ref().unwrap().len(), MAX_CHECK_LOG);
    }

    #[test]
    fn test_short_inputs_unchanged() {
        let ctx = EvaluationContext::new(
            EvalKind::Iteration(2),
            "task",
            "1 file changed",
            "+ line",
            None,
        );

        assert_eq!(ctx.diff_stat, "1 file changed");
        assert_eq!(ctx.diff_content, "+ line");
        assert!(ctx.check_log.is_none());
    }

    #[test]
    fn test_check_log_keeps_tail() {
        let log = format!("{}END", "x".repeat(MAX_CHECK_LOG));
        let ctx =
            EvaluationContext::new(EvalKind::Iteration(0), "", "", "", Some(log));

        let kept = ctx.check_log.unwrap();
        assert_eq!(kept.len(), MAX_CHECK_LOG);
        assert!(kept.ends_with("END"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // Multi-byte characters must not be split mid-codepoint
        let stat = "é".repeat(MAX_DIFF_STAT + 10);
        let ctx = EvaluationContext::new(EvalKind::Iteration(0), "", stat, "", None);
        assert_eq!(ctx.diff_stat.chars().count(), MAX_DIFF_STAT);
    }

    #[test]
    fn test_eval_kind_span_names() {
        assert_eq!(EvalKind::Iteration(3).span_name(), "iter-eval-3");
        assert_eq!(EvalKind::PullRequest(42).span_name(), "pr-eval-42");
    }

    #[test]
    fn test_run_dir_reads_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("task.md"), "Fix the login flow").unwrap();
        std::fs::write(dir.path().join("checks-iter-2.log"), "all checks passed").unwrap();

        let run = RunDir::new(dir.path());
        assert_eq!(run.task_text(), "Fix the login flow");
        assert_eq!(run.check_log(2).as_deref(), Some("all checks passed"));
        assert!(run.check_log(3).is_none());
        assert!(run.eval_path(2).ends_with("eval-iter-2.json"));
    }

    #[test]
    fn test_run_dir_missing_task_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunDir::new(dir.path());
        assert_eq!(run.task_text(), "");
    }
}
