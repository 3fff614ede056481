//! Report document assembly.
//!
//! A [`ReportDocument`] is the layout-free tree handed to a
//! [`DocumentRenderer`](crate::traits::DocumentRenderer). Assembly is pure:
//! no rendering and no I/O happen here.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::aggregate::{SubjectSummary, TestSummary};
use crate::chart::ChartImage;
use crate::insights::select_insights;
use crate::model::InsightRecord;

/// Report header block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub student_id: String,
    /// Correct + incorrect across all tests; unattempted never counts.
    pub total_attempted: u32,
    /// Every scored question, attempted or not.
    pub total_questions: u32,
}

/// One test's chart and subject table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSection {
    pub test_name: String,
    pub display_name: String,
    pub total_score: i64,
    /// `None` when the chart could not be rendered.
    pub chart: Option<ChartImage>,
    pub subject_table: Vec<SubjectSummary>,
}

/// An insight with its priority badge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightEntry {
    pub badge: String,
    pub insight: InsightRecord,
}

/// The complete per-student report tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub header: ReportHeader,
    pub sections: Vec<TestSection>,
    pub insight_section: Vec<InsightEntry>,
}

/// A test summary paired with its rendered chart, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartedTest {
    pub summary: TestSummary,
    pub chart: Option<ChartImage>,
}

/// Assemble a student's report document.
///
/// Section order follows `tests`; insights are ordered by rank and capped.
pub fn assemble(
    student_id: &str,
    tests: Vec<ChartedTest>,
    insights: Vec<InsightRecord>,
) -> ReportDocument {
    let total_attempted = tests.iter().map(|t| t.summary.attempted()).sum();
    let total_questions = tests.iter().map(|t| t.summary.total_questions()).sum();

    let sections = tests
        .into_iter()
        .map(|t| TestSection {
            display_name: display_test_name(&t.summary.test_name),
            test_name: t.summary.test_name,
            total_score: t.summary.total_score,
            chart: t.chart,
            subject_table: t.summary.subjects,
        })
        .collect();

    let insight_section = select_insights(insights)
        .into_iter()
        .map(|insight| InsightEntry {
            badge: format!("Priority #{}", insight.insight_rank),
            insight,
        })
        .collect();

    ReportDocument {
        header: ReportHeader {
            student_id: student_id.to_string(),
            total_attempted,
            total_questions,
        },
        sections,
        insight_section,
    }
}

/// Human-readable test title: `class_7` becomes `Class 7`.
pub fn display_test_name(test_name: &str) -> String {
    let spaced = test_name.trim().replace('_', " ");
    if spaced.trim().is_empty() {
        return "Unnamed Test".to_string();
    }
    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Replace everything outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_stem(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Artifact stem for a chart: `<student_id>_<test_name>`.
pub fn chart_artifact_stem(student_id: &str, test_name: &str) -> String {
    format!("{}_{}", sanitize_stem(student_id), sanitize_stem(test_name))
}

/// Make `stem` distinct from every stem in `used`, then record it.
///
/// Test names that sanitize to the same text ("Mock Test", "Mock_Test") get
/// `_2`, `_3`, ... appended in the order they are claimed.
pub fn unique_stem(stem: String, used: &mut HashSet<String>) -> String {
    if used.insert(stem.clone()) {
        return stem;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{stem}_{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Artifact stem for a report: `<student_id>_report`.
pub fn report_artifact_stem(student_id: &str) -> String {
    format!("{}_report", sanitize_stem(student_id))
}
