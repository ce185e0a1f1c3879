//! Configuration management for Quorum
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (QUORUM_*)
//! 3. Config file (~/.config/quorum/config.toml)
//! 4. Default values
//!
//! Core components never read the environment themselves; the process
//! boundary loads one `Config` and passes it in.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Evaluation-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Reviewer models invoked per evaluation, in reconciliation order
    pub models: Vec<String>,

    /// Bound on one reviewer invocation
    #[serde(with = "humantime_serde")]
    pub reviewer_timeout: Duration,

    /// File holding system-prompt context for the reviewers
    pub context_file: Option<PathBuf>,

    /// Project name recorded in trace metadata
    pub project: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "claude-sonnet-4-20250514".to_string(),
                "gpt-4o-2024-11-20".to_string(),
            ],
            reviewer_timeout: Duration::from_secs(120),
            context_file: None,
            project: "Factory".to_string(),
        }
    }
}

/// LLM proxy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible proxy
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.braintrust.dev/v1/proxy".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Evaluation configuration
    pub eval: EvalConfig,
    /// LLM proxy configuration
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/quorum/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quorum").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - QUORUM_MODELS: comma-separated reviewer models
    /// - QUORUM_PROJECT: project name for trace metadata
    /// - QUORUM_LLM_BASE_URL: OpenAI-compatible proxy base URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(models) = std::env::var("QUORUM_MODELS") {
            let models = parse_model_list(&models);
            if !models.is_empty() {
                self.eval.models = models;
            }
        }

        if let Ok(project) = std::env::var("QUORUM_PROJECT") {
            self.eval.project = project;
        }

        if let Ok(base_url) = std::env::var("QUORUM_LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        models: Option<Vec<String>>,
        project: Option<String>,
    ) -> Self {
        if let Some(models) = models {
            if !models.is_empty() {
                self.eval.models = models;
            }
        }

        if let Some(project) = project {
            self.eval.project = project;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        models: Option<Vec<String>>,
        project: Option<String>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(models, project))
    }
}

/// Split a comma-separated model list, dropping empty entries
fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .collect()
}
