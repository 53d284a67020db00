//! Troubleshooting knowledge base

use super::{IssueCategory, Severity};
use serde::{Deserialize, Serialize};

/// One symptom-to-remedy guide, matched by keyword containment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    pub title: String,
    pub keywords: Vec<String>,
    pub category: IssueCategory,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    #[serde(default)]
    pub cause: String,
    pub remediation: Vec<String>,
}

fn default_severity() -> Severity {
    Severity::Info
}

impl KnowledgeEntry {
    /// True when any keyword appears in the already-normalised symptom
    pub fn matches(&self, normalized_symptom: &str) -> bool {
        if normalized_symptom.is_empty() {
            return false;
        }
        self.keywords.iter().any(|k| {
            let k = normalize(k);
            !k.is_empty() && normalized_symptom.contains(&k)
        })
    }
}

/// Trim, collapse internal whitespace, lowercase
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  No   SOUND\tfrom  rear "), "no sound from rear");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_keyword_containment() {
        let entry = KnowledgeEntry {
            id: "KB-1".into(),
            title: "No audio".into(),
            keywords: vec!["No Sound".into(), "silent".into(), " ".into()],
            category: IssueCategory::Audio,
            severity: Severity::Warning,
            cause: String::new(),
            remediation: vec!["Check mute".into()],
        };
        assert!(entry.matches("there is no sound at all"));
        assert!(entry.matches("speakers are silent"));
        assert!(!entry.matches("bluetooth keeps dropping"));
        assert!(!entry.matches(""));
    }
}
