//! Persisted evaluation documents and human-readable summaries
//!
//! The persisted document is the full [`Evaluation`]: the reconciled record
//! plus the per-reviewer records it was derived from. The markdown summary is
//! the short form posted downstream: verdict, overall score, one line per
//! dimension. Pure formatting lives here; where the summary ends up is the
//! caller's business.

use std::fs;
use std::path::PathBuf;

use crate::context::RunDir;
use crate::error::Result;
use crate::eval::Evaluation;
use crate::score::Dimension;

/// Write the evaluation document for an iteration into the run directory
pub fn write_report(run_dir: &RunDir, iteration: u32, evaluation: &Evaluation) -> Result<PathBuf> {
    let path = run_dir.eval_path(iteration);
    fs::write(&path, serde_json::to_string_pretty(evaluation)?)?;
    Ok(path)
}

/// Render the short human-readable summary of an evaluation
///
/// A degraded evaluation (no usable reviewers) renders an explicit
/// low-confidence banner listing what failed, never an empty string.
pub fn summary_markdown(evaluation: &Evaluation) -> String {
    if !evaluation.has_signal() {
        let mut summary =
            String::from("**Verdict:** UNKNOWN — no usable reviewer scores\n");
        for failure in &evaluation.failures {
            summary.push_str(&format!("- `{}`: {}\n", failure.model, failure.error));
        }
        return summary;
    }

    let reconciled = &evaluation.reconciled;
    let verdict = reconciled
        .verdict
        .map(|v| v.label())
        .unwrap_or("UNKNOWN");
    let overall = reconciled.dimensions.get(&Dimension::Overall);

    let mut lines = vec![
        format!(
            "**Verdict:** {} ({:.1}/1.0) — {} models",
            verdict,
            overall.map(|entry| entry.score).unwrap_or(0.0),
            evaluation.per_model.len()
        ),
        format!(
            "**Summary:** {}",
            overall
                .map(|entry| entry.reason.as_str())
                .filter(|reason| !reason.is_empty())
                .unwrap_or("N/A")
        ),
        String::new(),
    ];

    for (dimension, _) in Dimension::WEIGHTED {
        let entry = reconciled.dimensions.get(&dimension);
        lines.push(format!(
            "- **{}**: {:.1} — {}",
            dimension,
            entry.map(|e| e.score).unwrap_or(0.0),
            entry
                .map(|e| e.reason.as_str())
                .filter(|reason| !reason.is_empty())
                .unwrap_or("N/A")
        ));
    }

    lines.join("\n")
}
