//! Scoring prompt construction
//!
//! Builds the single request text every reviewer receives. Section order is
//! fixed: task, diff summary, fenced diff, fenced check output, then the
//! rubric with the required JSON response shape. The weighting formula and
//! verdict thresholds are stated verbatim so each reviewer derives `overall`
//! and `verdict` the same way.
//!
//! Building a prompt is a pure function of the context; truncation has
//! already happened when the [`EvaluationContext`] was constructed.

use crate::context::{EvalKind, EvaluationContext};

/// Weighting formula stated verbatim in every scoring prompt
pub const WEIGHTS_LINE: &str = "Overall = weighted: requirements_met 30%, acceptance_criteria 25%, no_regressions 20%, code_quality 10%, completeness 15%.";

/// Verdict thresholds the reviewer applies to the weighted overall
pub const THRESHOLDS_LINE: &str =
    "PASS if overall >= 0.7, NEEDS_WORK if overall >= 0.4, FAIL otherwise.";

/// Placeholder rendered when no check output is available
const NO_CHECK_OUTPUT: &str = "(no check output)";

/// Build the scoring prompt for an evaluation context
pub fn scoring_prompt(ctx: &EvaluationContext) -> String {
    let mut prompt = String::new();

    match ctx.kind {
        EvalKind::Iteration(n) => {
            prompt.push_str(&format!(
                "Evaluate this in-progress code change (iteration {} of a factory loop).\n\n",
                n
            ));
        }
        EvalKind::PullRequest(n) => {
            prompt.push_str(&format!(
                "Evaluate pull request #{} produced by an automated software factory.\n\n",
                n
            ));
        }
    }

    prompt.push_str("## Original Task\n");
    prompt.push_str(&ctx.task_text);
    prompt.push_str("\n\n");

    prompt.push_str("## Current Diff Summary\n");
    prompt.push_str(&ctx.diff_stat);
    prompt.push_str("\n\n");

    prompt.push_str("## Current Diff (truncated)\n");
    prompt.push_str("```diff\n");
    prompt.push_str(&ctx.diff_content);
    prompt.push_str("\n```\n\n");

    prompt.push_str("## Check Results\n");
    prompt.push_str("```\n");
    match ctx.check_log.as_deref() {
        Some(log) if !log.is_empty() => prompt.push_str(log),
        _ => prompt.push_str(NO_CHECK_OUTPUT),
    }
    prompt.push_str("\n```\n\n");

    prompt.push_str("---\n\n");
    prompt.push_str("Score on these dimensions (0.0-1.0 each with brief justification):\n\n");
    prompt.push_str(
        "1. **requirements_met**: How many task requirements are addressed?\n\
         2. **acceptance_criteria**: How many acceptance criteria would pass now?\n\
         3. **no_regressions**: Are \"DO NOT\" anti-patterns being respected? Look for deleted tests, suppressed warnings, gaming.\n\
         4. **code_quality**: Well-structured, idiomatic, maintainable?\n\
         5. **completeness**: Complete solution or partial?\n\n",
    );

    prompt.push_str("Respond in JSON:\n");
    prompt.push_str("```json\n");
    prompt.push_str(
        r#"{
  "requirements_met": {"score": 0.0, "reason": "..."},
  "acceptance_criteria": {"score": 0.0, "reason": "..."},
  "no_regressions": {"score": 0.0, "reason": "..."},
  "code_quality": {"score": 0.0, "reason": "..."},
  "completeness": {"score": 0.0, "reason": "..."},
  "overall": {"score": 0.0, "reason": "one-line summary"},
  "verdict": "PASS|FAIL|NEEDS_WORK"
}
"#,
    );
    prompt.push_str("```\n\n");

    prompt.push_str(WEIGHTS_LINE);
    prompt.push('\n');
    prompt.push_str(THRESHOLDS_LINE);
    prompt.push('\n');

    prompt
}
