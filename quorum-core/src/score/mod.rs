//! Score records produced by reviewers
//!
//! A score record is one reviewer's structured judgment of a diff: a score
//! and rationale for each rubric dimension, plus a categorical verdict.
//! Records are immutable once parsed; reconciliation combines several of
//! them into a single [`ReconciledRecord`].

pub mod parser;
pub mod reconcile;

pub use parser::parse_score_record;
pub use reconcile::{reconcile, ReconciledRecord};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A dimension in the scoring rubric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// How many task requirements are addressed
    RequirementsMet,
    /// How many acceptance criteria would pass now
    AcceptanceCriteria,
    /// Anti-patterns respected: no deleted tests, suppressed warnings, gaming
    NoRegressions,
    /// Well-structured, idiomatic, maintainable
    CodeQuality,
    /// Complete solution or partial
    Completeness,
    /// Weighted sum of the five input dimensions, reported by the reviewer
    Overall,
}

impl Dimension {
    /// All dimensions, in rubric order
    pub const ALL: [Dimension; 6] = [
        Dimension::RequirementsMet,
        Dimension::AcceptanceCriteria,
        Dimension::NoRegressions,
        Dimension::CodeQuality,
        Dimension::Completeness,
        Dimension::Overall,
    ];

    /// The five weighted input dimensions and their weights in `overall`
    pub const WEIGHTED: [(Dimension, f64); 5] = [
        (Dimension::RequirementsMet, 0.30),
        (Dimension::AcceptanceCriteria, 0.25),
        (Dimension::NoRegressions, 0.20),
        (Dimension::CodeQuality, 0.10),
        (Dimension::Completeness, 0.15),
    ];

    /// The key used for this dimension in reviewer responses and reports
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::RequirementsMet => "requirements_met",
            Dimension::AcceptanceCriteria => "acceptance_criteria",
            Dimension::NoRegressions => "no_regressions",
            Dimension::CodeQuality => "code_quality",
            Dimension::Completeness => "completeness",
            Dimension::Overall => "overall",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Score and rationale for one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Score in [0.0, 1.0]
    pub score: f64,
    /// Brief justification, may be empty
    #[serde(default)]
    pub reason: String,
}

impl DimensionScore {
    /// Create a dimension score
    pub fn new(score: f64, reason: impl Into<String>) -> Self {
        Self {
            score,
            reason: reason.into(),
        }
    }
}

/// Categorical judgment of a diff
///
/// Variants are declared from worst to best so that the derived order gives
/// `FAIL < NEEDS_WORK < PASS`; the minimum of a set of verdicts is the most
/// conservative one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Overall below 0.4
    Fail,
    /// Overall in [0.4, 0.7)
    #[default]
    NeedsWork,
    /// Overall at or above 0.7
    Pass,
}

impl Verdict {
    /// Parse a verdict label, normalizing anything unrecognized to NEEDS_WORK
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "PASS" => Verdict::Pass,
            "FAIL" => Verdict::Fail,
            _ => Verdict::NeedsWork,
        }
    }

    /// The canonical label for this verdict
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::NeedsWork => "NEEDS_WORK",
            Verdict::Fail => "FAIL",
        }
    }

    /// Check if this verdict passes the evaluation
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One reviewer's complete judgment: all six dimensions plus a verdict
///
/// The parser guarantees every record contains all six dimensions,
/// synthesizing `score = 0.0, reason = ""` for anything the reviewer omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Per-dimension scores, keyed by rubric dimension
    #[serde(flatten)]
    pub dimensions: BTreeMap<Dimension, DimensionScore>,
    /// Categorical verdict
    pub verdict: Verdict,
}

impl ScoreRecord {
    /// Score for a dimension, 0.0 if absent
    pub fn score(&self, dimension: Dimension) -> f64 {
        self.dimensions
            .get(&dimension)
            .map(|entry| entry.score)
            .unwrap_or(0.0)
    }

    /// The reviewer's self-reported overall score
    pub fn overall(&self) -> f64 {
        self.score(Dimension::Overall)
    }

    /// Flat map of dimension key to score, for trace sinks
    pub fn score_map(&self) -> BTreeMap<String, f64> {
        self.dimensions
            .iter()
            .map(|(dimension, entry)| (dimension.key().to_string(), entry.score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_conservative_order() {
        assert!(Verdict::Fail < Verdict::NeedsWork);
        assert!(Verdict::NeedsWork < Verdict::Pass);
        assert_eq!(
            [Verdict::Pass, Verdict::Fail, Verdict::NeedsWork]
                .into_iter()
                .min(),
            Some(Verdict::Fail)
        );
    }

    #[test]
    fn test_verdict_from_label() {
        assert_eq!(Verdict::from_label("PASS"), Verdict::Pass);
        assert_eq!(Verdict::from_label("FAIL"), Verdict::Fail);
        assert_eq!(Verdict::from_label("NEEDS_WORK"), Verdict::NeedsWork);
        // Unrecognized labels normalize to the middle verdict
        assert_eq!(Verdict::from_label("MAYBE"), Verdict::NeedsWork);
        assert_eq!(Verdict::from_label(""), Verdict::NeedsWork);
    }

    #[test]
    fn test_verdict_serde_labels() {
        assert_eq!(serde_json::to_string(&Verdict::Pass).unwrap(), "\"PASS\"");
        assert_eq!(
            serde_json::to_string(&Verdict::NeedsWork).unwrap(),
            "\"NEEDS_WORK\""
        );
        let parsed: Verdict = serde_json::from_str("\"FAIL\"").unwrap();
        assert_eq!(parsed, Verdict::Fail);
    }

    #[test]
    fn test_dimension_keys() {
        assert_eq!(Dimension::RequirementsMet.key(), "requirements_met");
        assert_eq!(Dimension::Overall.key(), "overall");
        assert_eq!(Dimension::ALL.len(), 6);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = Dimension::WEIGHTED.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_record_serializes_flat() {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(Dimension::Overall, DimensionScore::new(0.8, "solid"));
        let record = ScoreRecord {
            dimensions,
            verdict: Verdict::Pass,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["overall"]["score"], 0.8);
        assert_eq!(json["verdict"], "PASS");
        // Dimensions are flattened to the top level, not nested
        assert!(json.get("dimensions").is_none());
    }

    #[test]
    fn test_score_map() {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(Dimension::CodeQuality, DimensionScore::new(0.5, ""));
        dimensions.insert(Dimension::Overall, DimensionScore::new(0.7, ""));
        let record = ScoreRecord {
            dimensions,
            verdict: Verdict::NeedsWork,
        };

        let map = record.score_map();
        assert_eq!(map["code_quality"], 0.5);
        assert_eq!(map["overall"], 0.7);
        assert_eq!(record.overall(), 0.7);
        assert_eq!(record.score(Dimension::Completeness), 0.0);
    }
}
