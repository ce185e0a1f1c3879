//! Reviewer capability seam
//!
//! A reviewer is any judgment-producing backend that accepts a prompt and a
//! model identifier and returns free text. The production implementation is
//! the HTTP proxy client in `quorum-llm`; tests use scripted in-memory
//! implementations. Each reviewer is invoked exactly once per evaluation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A judgment-producing backend invoked once per model per evaluation
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// Perform one completion call against the named model
    ///
    /// Failures surface as [`crate::Error::Reviewer`]; the evaluator treats
    /// them as that reviewer being absent, never as a fatal error.
    async fn invoke(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        user_prompt: &str,
    ) -> Result<String>;
}

/// Marker for a reviewer whose invocation or parse failed
///
/// Carried through the evaluation result so callers can see which reviewers
/// were dropped from reconciliation and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerFailure {
    /// Model identifier of the failed reviewer
    pub model: String,
    /// Human-readable error description
    pub error: String,
}

impl std::fmt::Display for ReviewerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.model, self.error)
    }
}
