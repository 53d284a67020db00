//! Rule-based diagnostics
//!
//! **Purpose:** Scan a runtime snapshot for known problems and answer
//! free-text troubleshooting questions from a keyword knowledge base.
//!
//! **Components:**
//! - `rules` - fixed, ordered auto-scan rules
//! - `knowledge` - knowledge base entries and text normalisation
//!
//! Nothing here fails. A symptom that matches no guide falls back to the
//! most recent scan.

pub mod knowledge;
pub mod rules;

pub use knowledge::{normalize, KnowledgeEntry};

use crate::audio::Preset;
use chrono::{DateTime, Utc};
use ivi_common::events::{FocusMode, HealthStatus, PlayerStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// How many scan issues a fallback plan lists
const FALLBACK_ISSUE_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Connectivity,
    Audio,
    Safety,
    Profile,
    Alerts,
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticIssue {
    pub id: String,
    pub category: IssueCategory,
    pub severity: Severity,
    pub description: String,
    pub cause: String,
    /// Ordered remediation steps
    pub remediation: Vec<String>,
    /// 0..=1
    pub confidence: f64,
}

/// Everything the rules look at, captured by the hub at scan time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    pub bluetooth_connected: bool,
    pub connected_device: Option<String>,
    pub player_status: PlayerStatus,
    pub is_playing: bool,
    pub volume: u8,
    pub muted: bool,
    pub speed_kph: f64,
    pub is_moving: bool,
    pub focus_mode: FocusMode,
    pub active_preset: Preset,
    pub active_alert_count: usize,
}

impl Default for DiagnosticSnapshot {
    /// Parked, idle, disconnected, mid volume
    fn default() -> Self {
        Self {
            bluetooth_connected: false,
            connected_device: None,
            player_status: PlayerStatus::Idle,
            is_playing: false,
            volume: 40,
            muted: false,
            speed_kph: 0.0,
            is_moving: false,
            focus_mode: FocusMode::Standard,
            active_preset: Preset::Reference,
            active_alert_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub health: HealthStatus,
    /// Rule order
    pub issues: Vec<DiagnosticIssue>,
    pub summary: String,
}

impl DiagnosticReport {
    /// Issues ordered by severity, most severe first; ties keep rule order
    pub fn top_issues(&self, limit: usize) -> Vec<DiagnosticIssue> {
        let mut issues = self.issues.clone();
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        issues.truncate(limit);
        issues
    }

    pub fn has_issue(&self, id: &str) -> bool {
        self.issues.iter().any(|i| i.id == id)
    }
}

/// Answer to a troubleshooting question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TroubleshootingPlan {
    /// Normalised symptom text
    pub query: String,
    /// Ids of matched knowledge base entries, in knowledge base order
    pub matched: Vec<String>,
    pub steps: Vec<String>,
    pub follow_ups: Vec<String>,
    /// True when no guide matched and the steps come from a scan
    pub fallback: bool,
    pub message: String,
}

pub fn health_for(issues: &[DiagnosticIssue]) -> HealthStatus {
    if issues.iter().any(|i| i.severity == Severity::Critical) {
        HealthStatus::Critical
    } else if issues.iter().any(|i| i.severity == Severity::Warning) {
        HealthStatus::Attention
    } else {
        HealthStatus::Good
    }
}

pub struct DiagnosticsEngine {
    knowledge_base: Vec<KnowledgeEntry>,
    last_report: Option<DiagnosticReport>,
}

impl DiagnosticsEngine {
    pub fn new(knowledge_base: Vec<KnowledgeEntry>) -> Self {
        Self {
            knowledge_base,
            last_report: None,
        }
    }

    /// Run every rule against the snapshot and cache the report
    pub fn run_auto_scan(&mut self, snapshot: &DiagnosticSnapshot) -> DiagnosticReport {
        let issues: Vec<DiagnosticIssue> = rules::RULES.iter().filter_map(|rule| rule(snapshot)).collect();
        let health = health_for(&issues);
        let summary = match issues.len() {
            0 => "All systems nominal".to_string(),
            1 => format!("1 issue found, health {}", health),
            n => format!("{} issues found, health {}", n, health),
        };

        let report = DiagnosticReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            health,
            issues,
            summary,
        };
        info!(
            "Diagnostics scan {}: health {}, {} issues",
            report.report_id,
            report.health,
            report.issues.len()
        );
        self.last_report = Some(report.clone());
        report
    }

    pub fn last_report(&self) -> Option<DiagnosticReport> {
        self.last_report.clone()
    }

    /// Match a symptom against the knowledge base
    ///
    /// With no match, the cached report (or a fresh scan when none exists)
    /// supplies the steps instead.
    pub fn troubleshoot(&mut self, symptom: &str, snapshot: &DiagnosticSnapshot) -> TroubleshootingPlan {
        let query = normalize(symptom);
        let matches: Vec<&KnowledgeEntry> = self
            .knowledge_base
            .iter()
            .filter(|entry| entry.matches(&query))
            .collect();

        if matches.is_empty() {
            debug!("No knowledge base match for '{}'", query);
            return self.fallback_plan(query, snapshot);
        }

        let matched: Vec<String> = matches.iter().map(|e| e.id.clone()).collect();
        let mut steps: Vec<String> = Vec::new();
        for step in matches.iter().flat_map(|e| e.remediation.iter()) {
            if !steps.contains(step) {
                steps.push(step.clone());
            }
        }
        let titles: Vec<&str> = matches.iter().map(|e| e.title.as_str()).collect();
        info!("Troubleshooting '{}' matched {:?}", query, matched);

        TroubleshootingPlan {
            message: format!("Found {}: {}", plural(matches.len(), "guide"), titles.join(", ")),
            query,
            matched,
            steps,
            follow_ups: follow_ups(snapshot),
            fallback: false,
        }
    }

    fn fallback_plan(&mut self, query: String, snapshot: &DiagnosticSnapshot) -> TroubleshootingPlan {
        let report = match self.last_report.clone() {
            Some(report) => report,
            None => self.run_auto_scan(snapshot),
        };
        let steps: Vec<String> = report
            .top_issues(FALLBACK_ISSUE_LIMIT)
            .into_iter()
            .map(|i| format!("{}: {}", i.id, i.description))
            .collect();

        let message = if steps.is_empty() {
            "No matching guide, and the last scan found no issues".to_string()
        } else {
            format!(
                "No matching guide; showing the top {} from the last scan",
                plural(steps.len(), "issue")
            )
        };

        TroubleshootingPlan {
            query,
            matched: Vec::new(),
            steps,
            follow_ups: follow_ups(snapshot),
            fallback: true,
            message,
        }
    }
}

fn follow_ups(snapshot: &DiagnosticSnapshot) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(device) = &snapshot.connected_device {
        out.push(format!("Connected device: {}", device));
    }
    out.push(format!("Active preset: {}", snapshot.active_preset.spoken_name()));
    if snapshot.player_status == PlayerStatus::Idle {
        out.push("Resume playback to confirm the fix".to_string());
    }
    if snapshot.is_moving {
        out.push("Re-run diagnostics once parked".to_string());
    }
    out
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> Vec<KnowledgeEntry> {
        vec![
            KnowledgeEntry {
                id: "KB-AUDIO-1".into(),
                title: "No sound".into(),
                keywords: vec!["no sound".into(), "silent".into()],
                category: IssueCategory::Audio,
                severity: Severity::Warning,
                cause: "Muted output".into(),
                remediation: vec!["Check mute".into(), "Raise volume".into()],
            },
            KnowledgeEntry {
                id: "KB-BT-1".into(),
                title: "Bluetooth drops".into(),
                keywords: vec!["bluetooth".into(), "sound".into()],
                category: IssueCategory::Connectivity,
                severity: Severity::Warning,
                cause: "Interference".into(),
                remediation: vec!["Re-pair phone".into(), "Raise volume".into()],
            },
        ]
    }

    fn ids(report: &DiagnosticReport) -> Vec<&str> {
        report.issues.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_healthy_snapshot() {
        let mut engine = DiagnosticsEngine::new(kb());
        let report = engine.run_auto_scan(&DiagnosticSnapshot::default());
        assert!(report.issues.is_empty());
        assert_eq!(report.health, HealthStatus::Good);
        assert_eq!(engine.last_report(), Some(report));
    }

    #[test]
    fn test_bt_101_when_playing_disconnected() {
        let mut engine = DiagnosticsEngine::new(vec![]);
        let snapshot = DiagnosticSnapshot {
            bluetooth_connected: false,
            is_playing: true,
            player_status: PlayerStatus::Playing,
            ..Default::default()
        };
        let report = engine.run_auto_scan(&snapshot);
        let bt = report.issues.iter().find(|i| i.id == "BT-101").unwrap();
        assert_eq!(bt.severity, Severity::Warning);
        assert_eq!(report.health, HealthStatus::Attention);
    }

    #[test]
    fn test_rules_run_in_order_and_critical_wins() {
        let mut engine = DiagnosticsEngine::new(vec![]);
        let snapshot = DiagnosticSnapshot {
            is_playing: true,
            player_status: PlayerStatus::Playing,
            volume: 95,
            speed_kph: 90.0,
            is_moving: true,
            focus_mode: FocusMode::Safety,
            active_preset: Preset::Stadium,
            active_alert_count: 2,
            ..Default::default()
        };
        let report = engine.run_auto_scan(&snapshot);
        assert_eq!(ids(&report), vec!["BT-101", "SAF-301", "PRF-401", "ALR-501"]);
        assert_eq!(report.health, HealthStatus::Critical);

        let top: Vec<String> = report.top_issues(3).into_iter().map(|i| i.id).collect();
        assert_eq!(top, vec!["SAF-301", "BT-101", "PRF-401"]);
    }

    #[test]
    fn test_low_volume_and_muted() {
        let mut engine = DiagnosticsEngine::new(vec![]);
        let base = DiagnosticSnapshot {
            bluetooth_connected: true,
            is_playing: true,
            player_status: PlayerStatus::Playing,
            ..Default::default()
        };
        let quiet = DiagnosticSnapshot { volume: 5, ..base.clone() };
        assert!(engine.run_auto_scan(&quiet).has_issue("AUD-201"));

        let muted = DiagnosticSnapshot { muted: true, ..base.clone() };
        assert!(engine.run_auto_scan(&muted).has_issue("AUD-201"));

        let ok = DiagnosticSnapshot { volume: 15, ..base };
        assert!(!engine.run_auto_scan(&ok).has_issue("AUD-201"));
    }

    #[test]
    fn test_troubleshoot_aggregates_in_match_order() {
        let mut engine = DiagnosticsEngine::new(kb());
        let snapshot = DiagnosticSnapshot {
            bluetooth_connected: true,
            connected_device: Some("Pixel".into()),
            is_moving: true,
            speed_kph: 50.0,
            ..Default::default()
        };
        let plan = engine.troubleshoot("  There is   NO SOUND  ", &snapshot);
        assert!(!plan.fallback);
        assert_eq!(plan.query, "there is no sound");
        assert_eq!(plan.matched, vec!["KB-AUDIO-1", "KB-BT-1"]);
        assert_eq!(plan.steps, vec!["Check mute", "Raise volume", "Re-pair phone"]);
        assert_eq!(
            plan.follow_ups,
            vec![
                "Connected device: Pixel",
                "Active preset: reference",
                "Resume playback to confirm the fix",
                "Re-run diagnostics once parked",
            ]
        );
    }

    #[test]
    fn test_troubleshoot_falls_back_to_fresh_scan() {
        let mut engine = DiagnosticsEngine::new(kb());
        let snapshot = DiagnosticSnapshot {
            is_playing: true,
            player_status: PlayerStatus::Playing,
            ..Default::default()
        };
        assert!(engine.last_report().is_none());
        let plan = engine.troubleshoot("navigation is frozen", &snapshot);
        assert!(plan.fallback);
        assert!(plan.matched.is_empty());
        assert_eq!(plan.steps.len(), 1);
        assert!(plan.steps[0].starts_with("BT-101: "));
        assert!(engine.last_report().is_some());
    }

    #[test]
    fn test_troubleshoot_fallback_uses_cached_report() {
        let mut engine = DiagnosticsEngine::new(vec![]);
        let cached = engine.run_auto_scan(&DiagnosticSnapshot::default());
        let busy = DiagnosticSnapshot {
            is_playing: true,
            player_status: PlayerStatus::Playing,
            ..Default::default()
        };
        let plan = engine.troubleshoot("", &busy);
        assert!(plan.fallback);
        assert!(plan.steps.is_empty());
        assert_eq!(engine.last_report().unwrap().report_id, cached.report_id);
    }
}
