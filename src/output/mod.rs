//! Output rendering for trace outcomes

use crate::results::{Reference, RiskLevel, SearchOutcome};
use serde::Serialize;

const UNKNOWN: &str = "unknown";

/// Machine-readable shape of a trace outcome
#[derive(Debug, Serialize)]
pub struct JsonOut<'a> {
    pub input: &'a str,
    pub code_references: &'a [Reference],
    pub afs_references: &'a [Reference],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_next_steps: Option<&'a [String]>,
}

impl<'a> From<&'a SearchOutcome> for JsonOut<'a> {
    fn from(outcome: &'a SearchOutcome) -> Self {
        let summary = outcome.summary.as_ref();
        Self {
            input: &outcome.query,
            code_references: &outcome.code_references,
            afs_references: &outcome.afs_references,
            impact_summary: summary.map(|s| s.impact_summary.as_str()),
            risk: summary.map(|s| s.risk_level),
            suggested_next_steps: summary.map(|s| s.suggested_next_steps.as_slice()),
        }
    }
}

/// Render an outcome as pretty-printed JSON
pub fn format_json(outcome: &SearchOutcome) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&JsonOut::from(outcome))?)
}

/// Render an outcome as human-readable text
pub fn format_human(outcome: &SearchOutcome) -> String {
    let mut lines = vec![format!("References for {}:\n", outcome.query)];

    if !outcome.code_references.is_empty() {
        lines.push("Code references:".to_string());
        for reference in &outcome.code_references {
            lines.push(format!(
                "  - {} (repo: {}, last modified: {}, author: {})",
                reference.path,
                reference.repo.as_deref().unwrap_or(UNKNOWN),
                last_modified(reference),
                reference.author.as_deref().unwrap_or(UNKNOWN),
            ));
        }
        lines.push(String::new());
    }

    if !outcome.afs_references.is_empty() {
        lines.push("AFS references:".to_string());
        for reference in &outcome.afs_references {
            lines.push(format!(
                "  - {} (last modified: {})",
                reference.path,
                last_modified(reference)
            ));
        }
        lines.push(String::new());
    }

    if let Some(summary) = &outcome.summary {
        lines.push("Impact summary:".to_string());
        lines.push(format!("  - {}", summary.impact_summary));
        lines.push(format!("  - Risk level: {}", summary.risk_level));

        if !summary.suggested_next_steps.is_empty() {
            lines.push("  - Suggested next steps:".to_string());
            for step in &summary.suggested_next_steps {
                lines.push(format!("    * {}", step));
            }
        }
    }

    lines.join("\n")
}

fn last_modified(reference: &Reference) -> String {
    reference
        .last_modified
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Summary;
    use chrono::{Local, TimeZone};

    fn outcome() -> SearchOutcome {
        let mut outcome = SearchOutcome::new("job:daily_prices");
        outcome
            .code_references
            .push(Reference::code("pipelines/daily_prices.py", "data/etl"));
        let modified = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        outcome
            .afs_references
            .push(Reference::afs("/afs/project/daily_prices.sql", Some(modified)));
        outcome
    }

    #[test]
    fn test_human_without_summary() {
        let text = format_human(&outcome());
        assert_eq!(
            text,
            "References for job:daily_prices:\n\n\
             Code references:\n\
             \x20 - pipelines/daily_prices.py (repo: data/etl, last modified: unknown, author: unknown)\n\
             \n\
             AFS references:\n\
             \x20 - /afs/project/daily_prices.sql (last modified: 2024-03-01T09:30:00)\n"
        );
    }

    #[test]
    fn test_human_with_summary() {
        let mut outcome = outcome();
        outcome.summary = Some(Summary {
            risk_level: RiskLevel::High,
            impact_summary: "Feeds the PnL report.".to_string(),
            suggested_next_steps: vec!["Notify owners".to_string(), "Add tests".to_string()],
        });

        let text = format_human(&outcome);
        assert!(text.ends_with(
            "Impact summary:\n  - Feeds the PnL report.\n  - Risk level: HIGH\n  - Suggested next steps:\n    * Notify owners\n    * Add tests"
        ));
    }

    #[test]
    fn test_human_empty_outcome() {
        let mut outcome = SearchOutcome::new("missing.py");
        outcome.summary = Some(Summary::fallback(0, 0));
        assert_eq!(
            format_human(&outcome),
            "References for missing.py:\n\nImpact summary:\n  - Found 0 code references and 0 AFS references\n  - Risk level: UNKNOWN"
        );
    }

    #[test]
    fn test_json_shape() {
        let mut outcome = outcome();
        let value: serde_json::Value = serde_json::from_str(&format_json(&outcome).unwrap()).unwrap();
        assert_eq!(value["input"], "job:daily_prices");
        assert_eq!(value["code_references"][0]["type"], "code");
        assert_eq!(value["afs_references"][0]["type"], "afs");
        assert!(value.get("risk").is_none());
        assert!(value.get("impact_summary").is_none());

        outcome.summary = Some(Summary::fallback(1, 1));
        let value: serde_json::Value = serde_json::from_str(&format_json(&outcome).unwrap()).unwrap();
        assert_eq!(value["risk"], "UNKNOWN");
        assert_eq!(
            value["impact_summary"],
            "Found 1 code references and 1 AFS references"
        );
        assert_eq!(value["suggested_next_steps"], serde_json::json!([]));
    }
}
