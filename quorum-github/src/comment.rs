//! Evaluation comment rendering
//!
//! Renders an [`Evaluation`] as the markdown comment posted on the PR:
//! verdict banner, score table with bars, CI status. Pure formatting; posting
//! goes through [`crate::GitHubClient::post_comment`].

use quorum_core::{Dimension, Evaluation, Verdict};

use crate::PrContext;

/// Ten-cell bar for a score in [0.0, 1.0], e.g. `███████░░░`
fn score_bar(score: f64) -> String {
    let filled = ((score * 10.0).round() as usize).min(10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn verdict_marker(verdict: Option<Verdict>) -> &'static str {
    match verdict {
        Some(Verdict::Pass) => "✅",
        Some(Verdict::NeedsWork) => "⚠️",
        Some(Verdict::Fail) => "❌",
        None => "❓",
    }
}

/// Render the evaluation comment for a pull request
pub fn render_comment(evaluation: &Evaluation, pr: &PrContext, models: &[String]) -> String {
    let mut comment = String::from("## Factory PR Evaluation\n\n");

    if !evaluation.has_signal() {
        comment.push_str("❓ **Verdict: UNKNOWN** — no usable reviewer scores\n\n");
        for failure in &evaluation.failures {
            comment.push_str(&format!("- `{}`: {}\n", failure.model, failure.error));
        }
        return comment;
    }

    let reconciled = &evaluation.reconciled;
    let verdict = reconciled.verdict;
    let overall = reconciled.dimensions.get(&Dimension::Overall);

    comment.push_str(&format!(
        "{} **Verdict: {}** (overall: {:.1}/1.0)\n\n",
        verdict_marker(verdict),
        verdict.map(|v| v.label()).unwrap_or("UNKNOWN"),
        overall.map(|entry| entry.score).unwrap_or(0.0),
    ));

    if let Some(reason) = overall
        .map(|entry| entry.reason.as_str())
        .filter(|reason| !reason.is_empty())
    {
        comment.push_str(&format!("> {}\n\n", reason));
    }

    comment.push_str("### Scores\n\n");
    comment.push_str("| Criteria | Score | Detail |\n");
    comment.push_str("|----------|-------|--------|\n");
    for (dimension, _) in Dimension::WEIGHTED {
        let entry = reconciled.dimensions.get(&dimension);
        let score = entry.map(|e| e.score).unwrap_or(0.0);
        let reason = entry.map(|e| e.reason.as_str()).unwrap_or("");
        comment.push_str(&format!(
            "| {} | `{}` {:.1} | {} |\n",
            dimension,
            score_bar(score),
            score,
            reason
        ));
    }
    comment.push('\n');

    let check_summary = pr.check_summary();
    if !check_summary.is_empty() {
        comment.push_str("### CI Status\n");
        comment.push_str(&check_summary);
        comment.push_str("\n\n");
    }

    comment.push_str(&format!(
        "---\n<sub>Scored by quorum • Models: {}</sub>\n",
        models.join(", ")
    ));

    comment
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::{reconcile, DimensionScore, ReviewerFailure, ScoreRecord};
    use std::collections::BTreeMap;

    fn pr() -> PrContext {
        PrContext {
            number: 9,
            title: "Add uploader retries".to_string(),
            body: String::new(),
            head_branch: "factory/upload-retry".to_string(),
            diff: String::new(),
            checks: vec![crate::CheckResult {
                name: "build".to_string(),
                conclusion: "success".to_string(),
            }],
        }
    }

    fn evaluation(verdict: Verdict, overall: f64) -> Evaluation {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(
            Dimension::RequirementsMet,
            DimensionScore::new(0.9, "covers the task"),
        );
        dimensions.insert(Dimension::Overall, DimensionScore::new(overall, "good work"));
        let record = ScoreRecord {
            dimensions,
            verdict,
        };
        Evaluation {
            reconciled: reconcile(std::slice::from_ref(&record)),
            per_model: vec![quorum_core::ModelScore {
                model: "claude-sonnet-4-20250514".to_string(),
                record,
            }],
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_score_bar_fills_proportionally() {
        assert_eq!(score_bar(0.0), "░░░░░░░░░░");
        assert_eq!(score_bar(0.7), "███████░░░");
        assert_eq!(score_bar(1.0), "██████████");
    }

    #[test]
    fn test_render_comment_contains_verdict_and_table() {
        let comment = render_comment(
            &evaluation(Verdict::Pass, 0.8),
            &pr(),
            &["claude-sonnet-4-20250514".to_string()],
        );

        assert!(comment.contains("**Verdict: PASS** (overall: 0.8/1.0)"));
        assert!(comment.contains("> good work"));
        assert!(comment.contains("| requirements_met | `█████████░` 0.9 | covers the task |"));
        assert!(comment.contains("[ok] build: success"));
        assert!(comment.contains("Models: claude-sonnet-4-20250514"));
    }

    #[test]
    fn test_render_comment_fail_marker() {
        let comment = render_comment(&evaluation(Verdict::Fail, 0.3), &pr(), &[]);
        assert!(comment.contains("❌ **Verdict: FAIL**"));
    }

    #[test]
    fn test_render_degraded_comment() {
        let evaluation = Evaluation {
            reconciled: quorum_core::ReconciledRecord::empty(),
            per_model: Vec::new(),
            failures: vec![ReviewerFailure {
                model: "gpt-4o-2024-11-20".to_string(),
                error: "rate limited".to_string(),
            }],
        };

        let comment = render_comment(&evaluation, &pr(), &[]);
        assert!(comment.contains("UNKNOWN"));
        assert!(comment.contains("`gpt-4o-2024-11-20`: rate limited"));
    }
}
