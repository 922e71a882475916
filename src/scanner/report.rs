use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk tier assigned per finding type. Ordering follows display priority:
/// critical first, info last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        };
        write!(f, "{name}")
    }
}

/// One reported occurrence of a sensitive-data pattern or search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Path relative to the scan root.
    pub file: String,
    /// 1-based line number of the match's first character.
    pub line: usize,
    #[serde(rename = "type")]
    pub kind: String,
    /// Matched text, truncated to 100 characters.
    pub snippet: String,
    pub severity: Severity,
}
