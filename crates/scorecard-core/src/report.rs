//! Batch summary types with JSON persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SkipKind;

/// Summary of one `generate` run across all selected students.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique run identifier.
    pub id: Uuid,
    /// When the run finished.
    pub created_at: DateTime<Utc>,
    /// Number of students selected for this run.
    pub students_requested: usize,
    /// One outcome per student, sorted by student id.
    pub outcomes: Vec<StudentOutcome>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// What happened to one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentOutcome {
    pub student_id: String,
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Generated(GeneratedReport),
    Skipped { kind: SkipKind, reason: String },
}

/// Artifacts and headline numbers for a successfully generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReport {
    pub report_path: PathBuf,
    pub charts: Vec<PathBuf>,
    /// Tests whose chart was left out of the report.
    #[serde(default)]
    pub chart_failures: Vec<ChartFailure>,
    pub test_count: usize,
    pub total_attempted: u32,
    pub insight_count: usize,
    /// Records excluded from scoring for missing test or subject.
    #[serde(default)]
    pub excluded_records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartFailure {
    pub test_name: String,
    pub reason: String,
}

impl StudentOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self.status, OutcomeStatus::Generated(_))
    }
}

impl BatchReport {
    pub fn generated_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_generated()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.generated_count()
    }

    /// Returns true if any student was skipped.
    pub fn has_skips(&self) -> bool {
        self.skipped_count() > 0
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize batch report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write batch report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read batch report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse batch report JSON")?;
        Ok(report)
    }

    /// Format the run summary as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} generated, {} skipped, {} requested ({}ms)\n\n",
            self.generated_count(),
            self.skipped_count(),
            self.students_requested,
            self.duration_ms
        ));

        if self.generated_count() > 0 {
            md.push_str("### Generated\n\n");
            md.push_str("| Student | Tests | Attempted | Insights | Report |\n");
            md.push_str("|---------|-------|-----------|----------|--------|\n");
            for o in &self.outcomes {
                if let OutcomeStatus::Generated(g) = &o.status {
                    md.push_str(&format!(
                        "| {} | {} | {} | {} | {} |\n",
                        o.student_id,
                        g.test_count,
                        g.total_attempted,
                        g.insight_count,
                        g.report_path.display()
                    ));
                }
            }
            md.push('\n');
        }

        if self.has_skips() {
            md.push_str("### Skipped\n\n");
            md.push_str("| Student | Cause | Detail |\n");
            md.push_str("|---------|-------|--------|\n");
            for o in &self.outcomes {
                if let OutcomeStatus::Skipped { kind, reason } = &o.status {
                    md.push_str(&format!("| {} | {} | {} |\n", o.student_id, kind, reason));
                }
            }
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(id: &str) -> StudentOutcome {
        StudentOutcome {
            student_id: id.into(),
            status: OutcomeStatus::Generated(GeneratedReport {
                report_path: PathBuf::from(format!("reports/{id}_report.html")),
                charts: vec![PathBuf::from(format!("charts/{id}_class_7.svg"))],
                chart_failures: vec![],
                test_count: 1,
                total_attempted: 12,
                insight_count: 5,
                excluded_records: 0,
            }),
        }
    }

    fn skipped(id: &str) -> StudentOutcome {
        StudentOutcome {
            student_id: id.into(),
            status: OutcomeStatus::Skipped {
                kind: SkipKind::MissingInputData,
                reason: format!("no answer records for student {id}"),
            },
        }
    }

    fn make_report() -> BatchReport {
        BatchReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            students_requested: 2,
            outcomes: vec![generated("s1"), skipped("s2")],
            duration_ms: 10,
        }
    }

    #[test]
    fn counts() {
        let report = make_report();
        assert_eq!(report.generated_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert!(report.has_skips());
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("batch.json");

        report.save_json(&path).unwrap();
        let loaded = BatchReport::load_json(&path).unwrap();

        assert_eq!(loaded.outcomes, report.outcomes);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"status\": \"skipped\""));
        assert!(raw.contains("missing_input_data"));
    }

    #[test]
    fn markdown_output() {
        let md = make_report().to_markdown();
        assert!(md.contains("1 generated, 1 skipped"));
        assert!(md.contains("### Skipped"));
        assert!(md.contains("| s2 | missing input data |"));
        assert!(md.contains("s1_report.html"));
    }
}
