//! Report generation error types.
//!
//! Every variant is scoped to a single student; the engine converts them
//! into a skipped [`StudentOutcome`](crate::report::StudentOutcome) or a
//! missing chart, never into a batch failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while producing one student's report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The student has no (scorable) answer records.
    #[error("no answer records for student {student_id}")]
    MissingInputData { student_id: String },

    /// The student's records exist but could not be read or parsed.
    #[error("failed to load records for student {student_id}: {message}")]
    LoadFailed { student_id: String, message: String },

    /// A test chart could not be rendered.
    #[error("chart render failed for test '{test_name}': {message}")]
    ChartRender { test_name: String, message: String },

    /// The report document could not be rendered.
    #[error("document render failed: {0}")]
    DocumentRender(String),

    /// An external render call exceeded its time budget.
    #[error("{stage} render timed out after {timeout_ms}ms")]
    RenderTimeout { stage: RenderStage, timeout_ms: u64 },
}

/// Which external render call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Chart,
    Document,
}

impl std::fmt::Display for RenderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderStage::Chart => write!(f, "chart"),
            RenderStage::Document => write!(f, "document"),
        }
    }
}

/// Why a student was skipped, in serializable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    MissingInputData,
    LoadFailed,
    ChartRenderError,
    DocumentRenderError,
}

impl std::fmt::Display for SkipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipKind::MissingInputData => write!(f, "missing input data"),
            SkipKind::LoadFailed => write!(f, "load failed"),
            SkipKind::ChartRenderError => write!(f, "chart render error"),
            SkipKind::DocumentRenderError => write!(f, "document render error"),
        }
    }
}

impl ReportError {
    /// Classify this error for the batch summary.
    pub fn skip_kind(&self) -> SkipKind {
        match self {
            ReportError::MissingInputData { .. } => SkipKind::MissingInputData,
            ReportError::LoadFailed { .. } => SkipKind::LoadFailed,
            ReportError::ChartRender { .. }
            | ReportError::RenderTimeout {
                stage: RenderStage::Chart,
                ..
            } => SkipKind::ChartRenderError,
            ReportError::DocumentRender(_)
            | ReportError::RenderTimeout {
                stage: RenderStage::Document,
                ..
            } => SkipKind::DocumentRenderError,
        }
    }
}
