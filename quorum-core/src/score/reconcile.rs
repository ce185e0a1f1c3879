//! Reconciliation of multiple score records into one verdict
//!
//! Per-dimension scores are averaged across the records that contain the
//! dimension; rationales are joined in input order. The verdict is the most
//! conservative among the inputs: one reviewer saying FAIL outweighs any
//! number of more lenient opinions. The reconciled `overall` is the mean of
//! the reviewers' self-reported overalls, never recomputed from the averaged
//! dimension scores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Dimension, DimensionScore, ScoreRecord, Verdict};

/// Combined judgment across all usable reviewers
///
/// Same shape as a [`ScoreRecord`], except the verdict is absent when no
/// records contributed. Callers must treat an empty record as "the evaluation
/// produced no usable signal", not as a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    /// Per-dimension averages with joined rationales
    #[serde(flatten)]
    pub dimensions: BTreeMap<Dimension, DimensionScore>,
    /// Most conservative verdict among the inputs, absent for empty input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

impl ReconciledRecord {
    /// A record with no dimensions and no verdict
    pub fn empty() -> Self {
        Self {
            dimensions: BTreeMap::new(),
            verdict: None,
        }
    }

    /// Whether any reviewer contributed to this record
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.verdict.is_none()
    }

    /// The reconciled overall score, 0.0 if absent
    pub fn overall(&self) -> f64 {
        self.dimensions
            .get(&Dimension::Overall)
            .map(|entry| entry.score)
            .unwrap_or(0.0)
    }

    /// Flat map of dimension key to score, for trace sinks
    pub fn score_map(&self) -> BTreeMap<String, f64> {
        self.dimensions
            .iter()
            .map(|(dimension, entry)| (dimension.key().to_string(), entry.score))
            .collect()
    }
}

/// Reduce an ordered sequence of score records to one reconciled record
///
/// An empty input yields [`ReconciledRecord::empty`]. Dimensions absent from
/// every record are omitted rather than zero-filled; a record missing a
/// rationale for a dimension contributes the literal `N/A` to the joined
/// reason.
pub fn reconcile(records: &[ScoreRecord]) -> ReconciledRecord {
    if records.is_empty() {
        return ReconciledRecord::empty();
    }

    let mut dimensions = BTreeMap::new();

    for dimension in Dimension::ALL {
        let contributing: Vec<&DimensionScore> = records
            .iter()
            .filter_map(|record| record.dimensions.get(&dimension))
            .collect();

        if contributing.is_empty() {
            continue;
        }

        let mean =
            contributing.iter().map(|entry| entry.score).sum::<f64>() / contributing.len() as f64;
        let reason = contributing
            .iter()
            .map(|entry| {
                if entry.reason.is_empty() {
                    "N/A"
                } else {
                    entry.reason.as_str()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");

        dimensions.insert(
            dimension,
            DimensionScore {
                score: round2(mean),
                reason,
            },
        );
    }

    let verdict = records.iter().map(|record| record.verdict).min();

    ReconciledRecord {
        dimensions,
        verdict,
    }
}

/// Round to two decimal places, matching the persisted record precision
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
