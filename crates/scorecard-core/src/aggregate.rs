//! Test → subject score aggregation.
//!
//! Tests are ordered lexicographically by name, and subjects lexicographically
//! within each test, so the output never depends on record order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::{classify, Classification};
use crate::model::QuestionRecord;

/// Score summary for one subject within one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub unattempted_count: u32,
    pub total_questions: u32,
    pub net_score: i64,
}

impl SubjectSummary {
    fn empty(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            correct_count: 0,
            incorrect_count: 0,
            unattempted_count: 0,
            total_questions: 0,
            net_score: 0,
        }
    }

    fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Correct => self.correct_count += 1,
            Classification::Incorrect => self.incorrect_count += 1,
            Classification::Unattempted => self.unattempted_count += 1,
        }
        self.total_questions += 1;
        self.net_score += classification.delta();
    }

    /// Questions the student actually answered (correct + incorrect).
    pub fn attempted(&self) -> u32 {
        self.correct_count + self.incorrect_count
    }
}

/// Score summary for one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub test_name: String,
    pub subjects: Vec<SubjectSummary>,
    pub total_score: i64,
}

impl TestSummary {
    pub fn attempted(&self) -> u32 {
        self.subjects.iter().map(SubjectSummary::attempted).sum()
    }

    pub fn total_questions(&self) -> u32 {
        self.subjects.iter().map(|s| s.total_questions).sum()
    }
}

/// A record that was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordWarning {
    /// Position of the record in the input.
    pub index: usize,
    pub reason: String,
}

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub tests: Vec<TestSummary>,
    pub warnings: Vec<RecordWarning>,
}

impl Aggregation {
    /// Total answered questions across every test.
    pub fn total_attempted(&self) -> u32 {
        self.tests.iter().map(TestSummary::attempted).sum()
    }
}

/// Group records by test, then subject, and fold them into score summaries.
///
/// Records with a missing or blank `test_name` or `subject` are skipped and
/// reported in [`Aggregation::warnings`].
pub fn aggregate(records: &[QuestionRecord]) -> Aggregation {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, SubjectSummary>> = BTreeMap::new();
    let mut warnings = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Some(test_name) = non_blank(record.test_name.as_deref()) else {
            tracing::warn!("record {index} has no test_name, excluding it");
            warnings.push(RecordWarning {
                index,
                reason: "missing test_name".into(),
            });
            continue;
        };
        let Some(subject) = non_blank(record.subject.as_deref()) else {
            tracing::warn!("record {index} in test '{test_name}' has no subject, excluding it");
            warnings.push(RecordWarning {
                index,
                reason: format!("missing subject in test '{test_name}'"),
            });
            continue;
        };

        let classification = classify(&record.correct_option, &record.student_selected_option);
        grouped
            .entry(test_name)
            .or_default()
            .entry(subject)
            .or_insert_with(|| SubjectSummary::empty(subject))
            .record(classification);
    }

    let tests = grouped
        .into_iter()
        .map(|(test_name, subjects)| {
            let subjects: Vec<SubjectSummary> = subjects.into_values().collect();
            let total_score = subjects.iter().map(|s| s.net_score).sum();
            TestSummary {
                test_name: test_name.to_string(),
                subjects,
                total_score,
            }
        })
        .collect();

    Aggregation { tests, warnings }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
