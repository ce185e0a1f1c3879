//! Iter command - mid-loop evaluation of a factory run
//!
//! Gathers context from the run directory and the repository, runs the
//! reviewer panel, writes `eval-iter-<N>.json` into the run directory, and
//! prints a `{"scores": ..., "markdown": ...}` document to stdout for the
//! loop driver. Progress and warnings go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use quorum_core::git::DiffSource;
use quorum_core::{
    report, Config, EvalKind, EvaluationContext, JsonlTraceSink, NoopTraceSink, RunDir, TraceSink,
};
use serde_json::json;

/// Arguments for the iter command
#[derive(Args, Debug)]
pub struct IterArgs {
    /// Run directory holding task.md and per-iteration artifacts
    #[arg(required = true)]
    pub run_dir: PathBuf,

    /// Iteration number being evaluated
    #[arg(required = true)]
    pub iteration: u32,

    /// Path to the repository under evaluation
    #[arg(short = 'r', long, default_value = ".")]
    pub repo: PathBuf,

    /// Base revision the diff is computed against (merge-base semantics)
    #[arg(long, default_value = "origin/master")]
    pub base: String,

    /// Head revision of the change under evaluation
    #[arg(long, default_value = "HEAD")]
    pub head: String,
}

impl IterArgs {
    /// Execute the iter command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let run_dir = RunDir::new(&self.run_dir);

        if verbose {
            tracing::info!(
                run_dir = %run_dir.root().display(),
                iteration = self.iteration,
                repo = %self.repo.display(),
                "Starting iteration evaluation"
            );
        }

        // Gather context; a missing diff weakens the evaluation but never stops it
        let (diff_stat, diff_content) = match DiffSource::open(&self.repo) {
            Ok(source) => source.diff_range(&self.base, &self.head),
            Err(e) => {
                tracing::warn!(repo = %self.repo.display(), error = %e, "could not open repository");
                (String::new(), String::new())
            }
        };

        let ctx = EvaluationContext::new(
            EvalKind::Iteration(self.iteration),
            run_dir.task_text(),
            diff_stat,
            diff_content,
            run_dir.check_log(self.iteration),
        );

        let sink: Arc<dyn TraceSink> = match JsonlTraceSink::create(run_dir.trace_path()) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                tracing::warn!(error = %e, "could not open trace file, tracing disabled");
                Arc::new(NoopTraceSink)
            }
        };

        let evaluator = super::build_evaluator(config, sink)?;
        let evaluation = evaluator.evaluate(&ctx).await?;

        let report_path = report::write_report(&run_dir, self.iteration, &evaluation)?;
        let markdown = report::summary_markdown(&evaluation);

        tracing::info!(
            report = %report_path.display(),
            usable_reviewers = evaluation.per_model.len(),
            failed_reviewers = evaluation.failures.len(),
            "Evaluation complete"
        );

        // Machine-readable result for the loop driver
        println!(
            "{}",
            json!({
                "scores": evaluation.reconciled,
                "markdown": markdown,
            })
        );

        Ok(())
    }
}
