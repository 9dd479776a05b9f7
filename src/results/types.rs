//! Reference and summary type definitions

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Backend a reference came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Remote code search
    Code,
    /// Shared filesystem
    Afs,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Afs => "afs",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One located occurrence of the queried asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    /// File path (repository-relative for code, absolute for AFS)
    pub path: String,
    /// Backend that produced this reference
    #[serde(rename = "type")]
    pub source: Source,
    /// Last modification time, when the backend knows it
    pub last_modified: Option<DateTime<Local>>,
    /// Repository name (code search only)
    pub repo: Option<String>,
    /// Link to the file in the code-search UI
    pub url: Option<String>,
    /// Last author, when the backend knows it
    pub author: Option<String>,
}

impl Reference {
    /// Create a code-search reference
    ///
    /// Code search cannot tell us modification time or author, so both stay
    /// absent.
    pub fn code(path: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: Source::Code,
            last_modified: None,
            repo: Some(repo.into()),
            url: None,
            author: None,
        }
    }

    /// Create a filesystem reference
    pub fn afs(path: impl Into<String>, last_modified: Option<DateTime<Local>>) -> Self {
        Self {
            path: path.into(),
            source: Source::Afs,
            last_modified,
            repo: None,
            url: None,
            author: None,
        }
    }

    /// Attach a URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Coarse judgment of how consequential a change is
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = std::convert::Infallible;

    /// Anything unrecognized is `Unknown`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => Self::Unknown,
        })
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Impact assessment for a query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub risk_level: RiskLevel,
    pub impact_summary: String,
    #[serde(default)]
    pub suggested_next_steps: Vec<String>,
}

impl Summary {
    /// Summary with unknown risk and no next steps
    pub fn unknown(impact_summary: impl Into<String>) -> Self {
        Self {
            risk_level: RiskLevel::Unknown,
            impact_summary: impact_summary.into(),
            suggested_next_steps: Vec::new(),
        }
    }

    /// Count-based summary used when no language model is available
    pub fn fallback(code_count: usize, afs_count: usize) -> Self {
        Self::unknown(format!(
            "Found {} code references and {} AFS references",
            code_count, afs_count
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_reference_has_no_blame_data() {
        let reference = Reference::code("src/job.py", "data/pipelines");
        assert_eq!(reference.source, Source::Code);
        assert_eq!(reference.repo.as_deref(), Some("data/pipelines"));
        assert!(reference.last_modified.is_none());
        assert!(reference.author.is_none());
    }

    #[test]
    fn test_reference_serialization() {
        let reference = Reference::code("a.py", "repo").with_url("https://sg/a.py");
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["type"], "code");
        assert_eq!(json["repo"], "repo");
        assert!(json["last_modified"].is_null());
        assert!(json["author"].is_null());
    }

    #[test]
    fn test_risk_level_parsing() {
        assert_eq!("high".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!(" Medium ".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert_eq!("severe".parse::<RiskLevel>().unwrap(), RiskLevel::Unknown);
        assert_eq!(serde_json::to_value(RiskLevel::Low).unwrap(), "LOW");
    }

    #[test]
    fn test_fallback_summary_mentions_counts() {
        let summary = Summary::fallback(2, 5);
        assert_eq!(summary.risk_level, RiskLevel::Unknown);
        assert_eq!(
            summary.impact_summary,
            "Found 2 code references and 5 AFS references"
        );
        assert!(summary.suggested_next_steps.is_empty());
    }
}
