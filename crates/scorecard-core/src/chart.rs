//! Bar-chart descriptions for per-test subject scores.
//!
//! A [`ChartSpec`] is plain data; turning it into pixels is the job of a
//! [`ChartRenderer`](crate::traits::ChartRenderer).

use serde::{Deserialize, Serialize};

use crate::aggregate::TestSummary;
use crate::classify::{CORRECT_MARKS, INCORRECT_MARKS};
use crate::document::display_test_name;

/// One subject's bar pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartBar {
    pub subject: String,
    /// Contribution of correct answers (`correct × 4`).
    pub positive_value: i64,
    /// Contribution of incorrect answers (`incorrect × -1`), never positive.
    pub negative_value: i64,
    pub unattempted_count: u32,
}

/// Renderer-agnostic description of a test's subject-wise bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub test_name: String,
    pub title: String,
    pub bars: Vec<ChartBar>,
    /// Net score for the whole test, shown as an annotation.
    pub total_score: i64,
}

/// A rendered chart artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartImage {
    pub path: std::path::PathBuf,
}

/// Build the chart description for one test.
pub fn build_chart(test: &TestSummary) -> ChartSpec {
    let bars = test
        .subjects
        .iter()
        .map(|s| ChartBar {
            subject: s.subject.clone(),
            positive_value: s.correct_count as i64 * CORRECT_MARKS,
            negative_value: s.incorrect_count as i64 * INCORRECT_MARKS,
            unattempted_count: s.unattempted_count,
        })
        .collect();

    ChartSpec {
        test_name: test.test_name.clone(),
        title: format!(
            "Test: {} - Subject-wise Performance",
            display_test_name(&test.test_name)
        ),
        bars,
        total_score: test.total_score,
    }
}

impl ChartSpec {
    /// Largest positive bar, used by renderers to scale the axis.
    pub fn max_positive(&self) -> i64 {
        self.bars.iter().map(|b| b.positive_value).max().unwrap_or(0)
    }

    /// Largest negative bar magnitude.
    pub fn max_negative(&self) -> i64 {
        self.bars
            .iter()
            .map(|b| -b.negative_value)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::QuestionRecord;

    #[test]
    fn bars_follow_subject_order_and_marks() {
        let records = vec![
            QuestionRecord::new("class_7", "Physics", "A", "A"),
            QuestionRecord::new("class_7", "Physics", "A", "A"),
            QuestionRecord::new("class_7", "Physics", "A", "B"),
            QuestionRecord::new("class_7", "Chemistry", "A", "C"),
            QuestionRecord::new("class_7", "Chemistry", "A", ""),
        ];
        let test = &aggregate(&records).tests[0];
        let spec = build_chart(test);

        assert_eq!(spec.title, "Test: Class 7 - Subject-wise Performance");
        assert_eq!(spec.bars.len(), 2);
        assert_eq!(
            spec.bars[0],
            ChartBar {
                subject: "Chemistry".into(),
                positive_value: 0,
                negative_value: -1,
                unattempted_count: 1,
            }
        );
        assert_eq!(spec.bars[1].positive_value, 8);
        assert_eq!(spec.bars[1].negative_value, -1);
        assert_eq!(spec.total_score, 6);
        assert_eq!(spec.max_positive(), 8);
        assert_eq!(spec.max_negative(), 1);
    }

    #[test]
    fn bar_values_sum_to_total_score() {
        let records = vec![
            QuestionRecord::new("T", "A", "A", "A"),
            QuestionRecord::new("T", "B", "A", "B"),
            QuestionRecord::new("T", "B", "A", "C"),
        ];
        let spec = build_chart(&aggregate(&records).tests[0]);
        let sum: i64 = spec
            .bars
            .iter()
            .map(|b| b.positive_value + b.negative_value)
            .sum();
        assert_eq!(sum, spec.total_score);
    }
}
