//! Quorum Core - scoring and reconciliation engine for factory diff evaluation
//!
//! This crate evaluates automated code-change submissions by assembling a
//! structured scoring request from task text, diff, and check output, fanning
//! it out to one or more LLM reviewers, and reconciling their judgments into
//! a single conservative verdict.

pub mod config;
pub mod context;
pub mod error;
pub mod eval;
pub mod git;
pub mod prompt;
pub mod report;
pub mod reviewer;
pub mod score;
pub mod secrets;
pub mod trace;

pub use config::Config;
pub use context::{EvalKind, EvaluationContext, RunDir};
pub use error::{Error, Result};
pub use eval::{Evaluation, Evaluator, ModelScore};
pub use reviewer::{Reviewer, ReviewerFailure};
pub use score::{
    reconcile, Dimension, DimensionScore, ReconciledRecord, ScoreRecord, Verdict,
};
pub use secrets::Secrets;
pub use trace::{JsonlTraceSink, NoopTraceSink, SpanRecord, TraceSink};
