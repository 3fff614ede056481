//! Answer classification and marking scheme.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marks awarded for a correct answer.
pub const CORRECT_MARKS: i64 = 4;
/// Marks deducted for an incorrect answer.
pub const INCORRECT_MARKS: i64 = -1;

/// Outcome of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Correct,
    Incorrect,
    Unattempted,
}

impl Classification {
    /// Mark delta for this outcome: +4, -1, or 0.
    pub fn delta(self) -> i64 {
        match self {
            Classification::Correct => CORRECT_MARKS,
            Classification::Incorrect => INCORRECT_MARKS,
            Classification::Unattempted => 0,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Correct => write!(f, "correct"),
            Classification::Incorrect => write!(f, "incorrect"),
            Classification::Unattempted => write!(f, "unattempted"),
        }
    }
}

/// Classify a student's selection against the correct option.
///
/// An empty selection is unattempted. Any other selection is correct only
/// on an exact match; malformed options are simply incorrect.
pub fn classify(correct_option: &str, student_selected_option: &str) -> Classification {
    if student_selected_option.is_empty() {
        Classification::Unattempted
    } else if student_selected_option == correct_option {
        Classification::Correct
    } else {
        Classification::Incorrect
    }
}
