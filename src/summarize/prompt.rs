//! Prompt construction and response parsing for impact summaries

use crate::results::{Reference, RiskLevel, Summary};
use std::fmt::Write;

/// References listed per source, to bound request size
pub const MAX_PROMPT_REFERENCES: usize = 20;

pub const SYSTEM_PROMPT: &str = "You are an expert code analyst. Analyze code dependencies and provide risk assessments.";

/// Build the user prompt for a query and its references
pub fn build_prompt(query: &str, code_refs: &[Reference], afs_refs: &[Reference]) -> String {
    let mut prompt = format!(
        "Analyze the impact of modifying '{}' based on the following references:\n\nCODE REFERENCES:\n",
        query
    );

    for reference in code_refs.iter().take(MAX_PROMPT_REFERENCES) {
        let _ = writeln!(
            prompt,
            "- {} in repo {}",
            reference.path,
            reference.repo.as_deref().unwrap_or_default()
        );
    }

    prompt.push_str("\nAFS FILE REFERENCES:\n");
    for reference in afs_refs.iter().take(MAX_PROMPT_REFERENCES) {
        let _ = writeln!(prompt, "- {}", reference.path);
    }

    prompt.push_str(
        "
Please provide:
1. Risk level (LOW, MEDIUM, HIGH) based on the number and criticality of dependencies
2. A brief impact summary (1-2 sentences)
3. Suggested next steps (2-3 actionable items)

Format your response as:
RISK_LEVEL: <level>
IMPACT: <summary>
STEPS: <step1>; <step2>; <step3>
",
    );
    prompt
}

/// Parse a model response into a [`Summary`]
///
/// Missing lines keep their fallbacks: unknown risk, the raw text as the
/// impact, and no steps.
pub fn parse_summary(text: &str) -> Summary {
    let mut summary = Summary::unknown(text.trim());

    for line in text.lines().map(str::trim) {
        if let Some(level) = line.strip_prefix("RISK_LEVEL:") {
            summary.risk_level = level.parse().unwrap_or_default();
        } else if let Some(impact) = line.strip_prefix("IMPACT:") {
            summary.impact_summary = impact.trim().to_string();
        } else if let Some(steps) = line.strip_prefix("STEPS:") {
            summary.suggested_next_steps = steps
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    summary
}
