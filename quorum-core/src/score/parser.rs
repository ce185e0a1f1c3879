//! Extraction of score records from free-form reviewer output
//!
//! Reviewers are asked to respond with a fenced JSON object, but models wrap
//! the fence in prose, mislabel it, or skip it entirely. Extraction therefore
//! tries an ordered sequence of strategies (labeled fence, any fence, whole
//! text) and decodes the first candidate that is valid JSON.
//!
//! Decoding failures propagate as [`Error::Parse`]; the invoker layer is
//! responsible for turning them into per-reviewer failure markers. Missing
//! or malformed dimensions never fail: they are synthesized with a zero score
//! so every parsed record is total over the rubric.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{Dimension, DimensionScore, ScoreRecord, Verdict};
use crate::error::{Error, Result};

/// Content of the first ```json fence, if any
fn labeled_fence(raw: &str) -> Option<&str> {
    let start = raw.find("```json")? + "```json".len();
    let rest = &raw[start..];
    let end = rest.find("```")?;
    Some(&rest[..end])
}

/// Content between the first pair of fences, if any
fn any_fence(raw: &str) -> Option<&str> {
    let start = raw.find("```")? + 3;
    let rest = &raw[start..];
    let end = rest.find("```")?;
    Some(&rest[..end])
}

/// Extract a score record from raw reviewer text
///
/// Returns `Error::Parse` when no extraction strategy yields a JSON object;
/// callers must treat that as a failed reviewer, not fabricate a record.
pub fn parse_score_record(raw: &str) -> Result<ScoreRecord> {
    let payload = labeled_fence(raw).or_else(|| any_fence(raw)).unwrap_or(raw);

    let value: Value = serde_json::from_str(payload.trim())
        .map_err(|e| Error::Parse(format!("response is not valid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| Error::Parse("response JSON is not an object".to_string()))?;

    Ok(record_from_object(object))
}

/// Coerce a decoded object into a total score record
///
/// Every rubric dimension is present in the result: a missing key or a
/// non-numeric score becomes `0.0` with an empty reason. Keys outside the
/// rubric are ignored. An absent or unrecognized verdict normalizes to
/// NEEDS_WORK.
fn record_from_object(object: &Map<String, Value>) -> ScoreRecord {
    let mut dimensions = BTreeMap::new();

    for dimension in Dimension::ALL {
        let entry = object.get(dimension.key());
        let score = entry
            .and_then(|v| v.get("score"))
            .and_then(Value::as_f64)
            .map(|s| s.clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let reason = entry
            .and_then(|v| v.get("reason"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        dimensions.insert(dimension, DimensionScore { score, reason });
    }

    let verdict = object
        .get("verdict")
        .and_then(Value::as_str)
        .map(Verdict::from_label)
        .unwrap_or_default();

    ScoreRecord {
        dimensions,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{
        "requirements_met": {"score": 0.8, "reason": "ok"},
        "acceptance_criteria": {"score": 0.7, "reason": "most pass"},
        "no_regressions": {"score": 0.9, "reason": "clean"},
        "code_quality": {"score": 0.6, "reason": "decent"},
        "completeness": {"score": 0.5, "reason": "partial"},
        "overall": {"score": 0.72, "reason": "solid progress"},
        "verdict": "PASS"
    }"#;

    #[test]
    fn test_parse_bare_json() {
        let record = parse_score_record(BARE).unwrap();
        assert_eq!(record.score(Dimension::RequirementsMet), 0.8);
        assert_eq!(record.overall(), 0.72);
        assert_eq!(record.verdict, Verdict::Pass);
    }

    #[test]
    fn test_fenced_in_prose_matches_bare() {
        let wrapped = format!(
            "Here is my assessment of the change:\n\n```json\n{}\n```\n\nLet me know if you need more detail.",
            BARE
        );
        let from_prose = parse_score_record(&wrapped).unwrap();
        let from_bare = parse_score_record(BARE).unwrap();
        assert_eq!(from_prose, from_bare);
    }

    #[test]
    fn test_unlabeled_fence() {
        let wrapped = format!("Scores below.\n```\n{}\n```", BARE);
        let record = parse_score_record(&wrapped).unwrap();
        assert_eq!(record.verdict, Verdict::Pass);
    }

    #[test]
    fn test_labeled_fence_preferred_over_earlier_fence() {
        let wrapped = format!("```\nnot the payload\n```\n\n```json\n{}\n```", BARE);
        // The labeled strategy runs first, so the bare fence is skipped
        let record = parse_score_record(&wrapped).unwrap();
        assert_eq!(record.verdict, Verdict::Pass);
    }

    #[test]
    fn test_missing_dimension_synthesized() {
        let raw = r#"{"requirements_met": {"score": 0.9, "reason": "all done"}, "verdict": "PASS"}"#;
        let record = parse_score_record(raw).unwrap();

        let completeness = &record.dimensions[&Dimension::Completeness];
        assert_eq!(completeness.score, 0.0);
        assert_eq!(completeness.reason, "");
        assert_eq!(record.score(Dimension::RequirementsMet), 0.9);
    }

    #[test]
    fn test_non_numeric_score_defaults_to_zero() {
        let raw = r#"{"code_quality": {"score": "high", "reason": "subjective"}, "verdict": "PASS"}"#;
        let record = parse_score_record(raw).unwrap();
        assert_eq!(record.score(Dimension::CodeQuality), 0.0);
        assert_eq!(record.dimensions[&Dimension::CodeQuality].reason, "subjective");
    }

    #[test]
    fn test_score_clamped_to_unit_interval() {
        let raw = r#"{"overall": {"score": 1.7, "reason": ""}, "completeness": {"score": -0.2, "reason": ""}}"#;
        let record = parse_score_record(raw).unwrap();
        assert_eq!(record.overall(), 1.0);
        assert_eq!(record.score(Dimension::Completeness), 0.0);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let raw = r#"{"overall": {"score": 0.5, "reason": ""}, "confidence": 0.99, "verdict": "NEEDS_WORK"}"#;
        let record = parse_score_record(raw).unwrap();
        assert_eq!(record.dimensions.len(), 6);
        assert_eq!(record.verdict, Verdict::NeedsWork);
    }

    #[test]
    fn test_verdict_defaults_and_normalizes() {
        let absent = parse_score_record(r#"{"overall": {"score": 0.5}}"#).unwrap();
        assert_eq!(absent.verdict, Verdict::NeedsWork);

        let bogus = parse_score_record(r#"{"verdict": "SHIP_IT"}"#).unwrap();
        assert_eq!(bogus.verdict, Verdict::NeedsWork);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = parse_score_record("I cannot score this diff, sorry.");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_non_object_json_is_parse_error() {
        let result = parse_score_record("[1, 2, 3]");
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
