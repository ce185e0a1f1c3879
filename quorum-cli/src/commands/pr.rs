//! Pr command - score a pull request
//!
//! Fetches PR context (task section, diff, check runs) from GitHub, runs the
//! reviewer panel, prints the evaluation to stdout, and optionally posts the
//! rendered comment back on the PR.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use quorum_core::{
    Config, EvalKind, EvaluationContext, JsonlTraceSink, NoopTraceSink, TraceSink,
};
use quorum_github::{render_comment, GitHubClient};
use serde_json::json;

/// Arguments for the pr command
#[derive(Args, Debug)]
pub struct PrArgs {
    /// Pull request number
    #[arg(required = true)]
    pub number: u64,

    /// Repository, as owner/repo or a GitHub URL
    #[arg(short = 'R', long, env = "GITHUB_REPOSITORY")]
    pub repo: String,

    /// Post the evaluation as a PR comment
    #[arg(long)]
    pub comment: bool,

    /// Append trace spans to this file
    #[arg(long)]
    pub trace: Option<PathBuf>,
}

impl PrArgs {
    /// Execute the pr command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let client = GitHubClient::from_repo_ref(&self.repo)?;

        if verbose {
            tracing::info!(
                owner = %client.owner(),
                repo = %client.repo(),
                pr = self.number,
                "Scoring pull request"
            );
        }

        let pr = client.pr_context(self.number).await?;

        let ctx = EvaluationContext::new(
            EvalKind::PullRequest(self.number),
            pr.task_text(),
            pr.diff_stat(),
            pr.diff.clone(),
            Some(pr.check_summary()).filter(|summary| !summary.is_empty()),
        );

        let sink: Arc<dyn TraceSink> = match &self.trace {
            Some(path) => match JsonlTraceSink::create(path) {
                Ok(sink) => Arc::new(sink),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not open trace file, tracing disabled");
                    Arc::new(NoopTraceSink)
                }
            },
            None => Arc::new(NoopTraceSink),
        };

        let evaluator = super::build_evaluator(config, sink)?;
        let evaluation = evaluator.evaluate(&ctx).await?;

        let comment = render_comment(&evaluation, &pr, &config.eval.models);

        if self.comment {
            client.post_comment(self.number, &comment).await?;
        }

        println!(
            "{}",
            json!({
                "pr": self.number,
                "scores": evaluation.reconciled,
                "comment": comment,
            })
        );

        Ok(())
    }
}
