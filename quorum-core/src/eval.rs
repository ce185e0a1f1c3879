//! Evaluation orchestration
//!
//! Fans one scoring prompt out to N reviewer models, parses each response
//! into a score record, and reconciles the records into a single verdict.
//! Reviewer failures are isolated: a timeout, transport error, or malformed
//! response drops that reviewer from reconciliation and never aborts the
//! evaluation. Each reviewer is invoked exactly once; there is no retry.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::context::EvaluationContext;
use crate::error::{Error, Result};
use crate::prompt::scoring_prompt;
use crate::reviewer::{Reviewer, ReviewerFailure};
use crate::score::{parse_score_record, reconcile, ReconciledRecord, ScoreRecord};
use crate::trace::{SpanRecord, TraceSink};

/// Default bound on one reviewer invocation
pub const DEFAULT_REVIEWER_TIMEOUT: Duration = Duration::from_secs(120);

/// A successfully parsed reviewer judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    /// Model that produced the record
    pub model: String,
    /// The parsed score record
    pub record: ScoreRecord,
}

/// Outcome of one full evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Reconciled record across all usable reviewers
    pub reconciled: ReconciledRecord,
    /// Per-reviewer records, in configured model order
    pub per_model: Vec<ModelScore>,
    /// Reviewers dropped from reconciliation
    pub failures: Vec<ReviewerFailure>,
}

impl Evaluation {
    /// Whether at least one reviewer produced a usable record
    pub fn has_signal(&self) -> bool {
        !self.per_model.is_empty()
    }
}

/// Runs scoring rounds against a fixed panel of reviewer models
pub struct Evaluator {
    backend: Arc<dyn Reviewer>,
    sink: Arc<dyn TraceSink>,
    models: Vec<String>,
    system_prompt: Option<String>,
    reviewer_timeout: Duration,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("models", &self.models)
            .field("reviewer_timeout", &self.reviewer_timeout)
            .finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Create an evaluator over a reviewer backend and trace sink
    pub fn new(backend: Arc<dyn Reviewer>, sink: Arc<dyn TraceSink>, models: Vec<String>) -> Self {
        Self {
            backend,
            sink,
            models,
            system_prompt: None,
            reviewer_timeout: DEFAULT_REVIEWER_TIMEOUT,
        }
    }

    /// Set the system-level context text sent to every reviewer
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Set the per-invocation timeout
    pub fn with_timeout(mut self, reviewer_timeout: Duration) -> Self {
        self.reviewer_timeout = reviewer_timeout;
        self
    }

    /// Evaluate a context with the configured reviewer panel
    ///
    /// Returns an [`Evaluation`] even when every reviewer fails; only an
    /// empty model panel is a configuration error. If the returned future is
    /// dropped, in-flight reviewer calls are abandoned with it.
    pub async fn evaluate(&self, ctx: &EvaluationContext) -> Result<Evaluation> {
        if self.models.is_empty() {
            return Err(Error::Config("no reviewer models configured".to_string()));
        }

        let prompt = scoring_prompt(ctx);
        let parent = SpanRecord::root(ctx.kind.span_name()).with_input(json!({
            "task": ctx.task_text,
            "diff_stat": ctx.diff_stat,
        }));

        let outcomes = self.fan_out(&prompt).await;

        let mut per_model = Vec::new();
        let mut failures = Vec::new();

        for (model, outcome) in outcomes {
            match outcome {
                Ok((raw, record)) => {
                    debug!(model = %model, overall = record.overall(), "reviewer scored");
                    self.sink.record(
                        &parent
                            .child(format!("eval-{}", model))
                            .with_input(json!({"model": model}))
                            .with_output(json!({"raw": raw, "scores": record}))
                            .with_scores(record.score_map())
                            .with_metadata(json!({"model": model})),
                    );
                    per_model.push(ModelScore { model, record });
                }
                Err(error) => {
                    warn!(model = %model, error = %error, "reviewer dropped from reconciliation");
                    self.sink.record(
                        &parent
                            .child(format!("eval-{}", model))
                            .with_input(json!({"model": model}))
                            .with_output(json!({"error": error}))
                            .with_score("overall", 0.0),
                    );
                    failures.push(ReviewerFailure { model, error });
                }
            }
        }

        let records: Vec<ScoreRecord> = per_model
            .iter()
            .map(|scored| scored.record.clone())
            .collect();
        let reconciled = reconcile(&records);

        self.sink.record(
            &parent
                .with_output(json!({
                    "reconciled": reconciled,
                    "usable_reviewers": per_model.len(),
                }))
                .with_scores(reconciled.score_map())
                .with_metadata(json!({"models": self.models})),
        );

        Ok(Evaluation {
            reconciled,
            per_model,
            failures,
        })
    }

    /// Invoke every model concurrently, one result slot per model
    ///
    /// Slots are written exactly once and read only after every task has
    /// joined, so results come back in configured model order regardless of
    /// completion order.
    async fn fan_out(&self, prompt: &str) -> Vec<(String, InvocationOutcome)> {
        let mut tasks = JoinSet::new();

        for (slot, model) in self.models.iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            let model = model.clone();
            let system_prompt = self.system_prompt.clone();
            let prompt = prompt.to_string();
            let limit = self.reviewer_timeout;

            tasks.spawn(async move {
                let outcome =
                    match timeout(limit, backend.invoke(&model, system_prompt.as_deref(), &prompt))
                        .await
                    {
                        Ok(Ok(raw)) => match parse_score_record(&raw) {
                            Ok(record) => Ok((raw, record)),
                            Err(e) => Err(e.to_string()),
                        },
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(_) => Err(format!("timed out after {}s", limit.as_secs())),
                    };
                (slot, model, outcome)
            });
        }

        let mut slots: Vec<Option<(String, InvocationOutcome)>> =
            self.models.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, model, outcome)) => slots[slot] = Some((model, outcome)),
                Err(e) => warn!(error = %e, "reviewer task aborted"),
            }
        }

        // A panicked task leaves its slot empty; fill in the failure marker
        slots
            .into_iter()
            .enumerate()
            .map(|(slot, entry)| {
                entry.unwrap_or_else(|| {
                    (
                        self.models[slot].clone(),
                        Err("reviewer task aborted".to_string()),
                    )
                })
            })
            .collect()
    }
}

type InvocationOutcome = std::result::Result<(String, ScoreRecord), String>;
