//! Core data model types for scorecard.
//!
//! These are the input shapes produced by the upstream pipeline phases:
//! per-student answer records and ranked weak-topic insights.

use serde::{Deserialize, Deserializer, Serialize};

/// A single answered (or skipped) question from one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Test the question belongs to (e.g. "class_7").
    #[serde(default)]
    pub test_name: Option<String>,
    /// Subject the question belongs to (e.g. "Physics").
    #[serde(default)]
    pub subject: Option<String>,
    /// The correct option (e.g. "A").
    #[serde(default, deserialize_with = "nullable_string")]
    pub correct_option: String,
    /// The option the student picked; empty when the question was skipped.
    #[serde(default, deserialize_with = "nullable_string")]
    pub student_selected_option: String,
    /// Everything else on the record, passed through untouched.
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl QuestionRecord {
    pub fn new(test_name: &str, subject: &str, correct_option: &str, selected: &str) -> Self {
        Self {
            test_name: Some(test_name.to_string()),
            subject: Some(subject.to_string()),
            correct_option: correct_option.to_string(),
            student_selected_option: selected.to_string(),
            metadata: serde_json::Map::new(),
        }
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// All answer records for one student, as written by the aggregation phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecords {
    #[serde(default)]
    pub student_id: String,
    /// Record count as reported by the producer.
    #[serde(default)]
    pub total_records: usize,
    #[serde(default)]
    pub records: Vec<QuestionRecord>,
}

/// A ranked weak-topic diagnostic for a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    /// Priority, 1 = highest.
    pub insight_rank: u32,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub subject: String,
    /// Topic accuracy in percent.
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub citation: String,
}
