//! Trace sink for evaluation observability
//!
//! Every evaluation records one parent span, plus one child span per reviewer
//! invocation carrying either the raw output and per-dimension scores or the
//! error that dropped the reviewer. Recording must never fail an evaluation:
//! sink errors are logged and swallowed.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

/// A structured record of one unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Unique span id
    pub id: String,
    /// Parent span id, absent for evaluation roots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Span name, e.g. `iter-eval-3` or `eval-gpt-4o-2024-11-20`
    pub name: String,
    /// What went into the unit of work
    #[serde(default)]
    pub input: Value,
    /// What came out of it
    #[serde(default)]
    pub output: Value,
    /// Per-dimension numeric scores
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<String, f64>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Value,
    /// When the span was recorded
    pub recorded_at: DateTime<Utc>,
}

impl SpanRecord {
    /// Create a root span with a fresh id
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: None,
            name: name.into(),
            input: Value::Null,
            output: Value::Null,
            scores: BTreeMap::new(),
            metadata: Value::Null,
            recorded_at: Utc::now(),
        }
    }

    /// Create a child span of this one
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self {
            parent_id: Some(self.id.clone()),
            ..Self::root(name)
        }
    }

    /// Attach input data
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    /// Attach output data
    pub fn with_output(mut self, output: Value) -> Self {
        self.output = output;
        self
    }

    /// Attach one named score
    pub fn with_score(mut self, key: impl Into<String>, score: f64) -> Self {
        self.scores.insert(key.into(), score);
        self
    }

    /// Attach a full score map
    pub fn with_scores(mut self, scores: BTreeMap<String, f64>) -> Self {
        self.scores = scores;
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Destination for span records
pub trait TraceSink: Send + Sync {
    /// Record one span
    ///
    /// Implementations must swallow their own failures; an unreachable sink
    /// must not take the evaluation down with it.
    fn record(&self, span: &SpanRecord);
}

/// Sink that discards all spans
#[derive(Debug, Default)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn record(&self, _span: &SpanRecord) {}
}

/// Sink that appends one JSON line per span to a file
#[derive(Debug)]
pub struct JsonlTraceSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlTraceSink {
    /// Open the trace file in append mode, creating it if needed
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// The trace file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TraceSink for JsonlTraceSink {
    fn record(&self, span: &SpanRecord) {
        let line = match serde_json::to_string(span) {
            Ok(line) => line,
            Err(e) => {
                warn!(span = %span.name, error = %e, "could not serialize trace span");
                return;
            }
        };

        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(file, "{}", line) {
            warn!(path = %self.path.display(), error = %e, "could not record trace span");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_child_links_to_parent() {
        let parent = SpanRecord::root("iter-eval-1");
        let child = parent.child("eval-gpt-4o");

        assert_eq!(child.parent_id.as_deref(), Some(parent.id.as_str()));
        assert_ne!(child.id, parent.id);
    }

    #[test]
    fn test_builder_attaches_fields() {
        let span = SpanRecord::root("eval")
            .with_input(json!({"model": "gpt-4o"}))
            .with_output(json!({"raw": "..."}))
            .with_score("overall", 0.8)
            .with_metadata(json!({"iteration": 2}));

        assert_eq!(span.input["model"], "gpt-4o");
        assert_eq!(span.scores["overall"], 0.8);
        assert_eq!(span.metadata["iteration"], 2);
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");

        let sink = JsonlTraceSink::create(&path).unwrap();
        let parent = SpanRecord::root("iter-eval-0").with_score("overall", 0.5);
        sink.record(&parent);
        sink.record(&parent.child("eval-claude"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: SpanRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.name, "iter-eval-0");
        assert_eq!(first.scores["overall"], 0.5);

        let second: SpanRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.parent_id, Some(first.id));
    }
}
