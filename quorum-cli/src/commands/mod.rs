//! CLI command implementations

mod iter;
mod pr;

pub use iter::IterArgs;
pub use pr::PrArgs;

use std::path::Path;
use std::sync::Arc;

use quorum_core::{Config, Evaluator, Reviewer, Secrets, TraceSink};
use quorum_llm::ProxyClient;

/// Build an evaluator from config, secrets, and a trace sink
///
/// Shared by the iter and pr commands; the only difference between the two
/// paths is where context comes from and where the report goes.
pub(crate) fn build_evaluator(
    config: &Config,
    sink: Arc<dyn TraceSink>,
) -> anyhow::Result<Evaluator> {
    let secrets = Secrets::load()?;
    let api_key = secrets.llm_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "LLM API key not found. Set OPENAI_API_KEY or add it to ~/.config/quorum/secrets.toml"
        )
    })?;

    let backend: Arc<dyn Reviewer> =
        Arc::new(ProxyClient::new(api_key).with_base_url(config.llm.base_url.clone()));

    let mut evaluator = Evaluator::new(backend, sink, config.eval.models.clone())
        .with_timeout(config.eval.reviewer_timeout);

    if let Some(system_prompt) = load_context_file(config) {
        evaluator = evaluator.with_system_prompt(system_prompt);
    }

    Ok(evaluator)
}

/// Read the reviewer context file, degrading to no system prompt
fn load_context_file(config: &Config) -> Option<String> {
    let path: &Path = config.eval.context_file.as_deref()?;
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read context file, scoring without system prompt");
            None
        }
    }
}
