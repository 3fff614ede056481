//! Core trait definitions for input sources and renderers.
//!
//! Renderers are implemented by the `scorecard-report` crate; the JSON
//! directory source lives in [`crate::loader`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::chart::{ChartImage, ChartSpec};
use crate::document::ReportDocument;
use crate::model::{InsightRecord, StudentRecords};

// ---------------------------------------------------------------------------
// Input source trait
// ---------------------------------------------------------------------------

/// Read-only access to the upstream answer records and insights.
#[async_trait]
pub trait StudentSource: Send + Sync {
    /// Every student id available, in a stable order.
    async fn student_ids(&self) -> anyhow::Result<Vec<String>>;

    /// Answer records for one student, or `None` if the student is unknown.
    async fn load_records(&self, student_id: &str) -> anyhow::Result<Option<StudentRecords>>;

    /// All insights keyed by student id.
    async fn load_insights(&self) -> anyhow::Result<BTreeMap<String, Vec<InsightRecord>>>;
}

// ---------------------------------------------------------------------------
// Renderer traits
// ---------------------------------------------------------------------------

/// Turns a chart description into an image artifact.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Human-readable renderer name (e.g. "svg").
    fn name(&self) -> &str;

    /// Render `spec` to an artifact named after `artifact_stem`.
    async fn render_chart(&self, spec: &ChartSpec, artifact_stem: &str)
        -> anyhow::Result<ChartImage>;

    /// Remove an image this renderer produced. The default deletes the file.
    async fn discard_chart(&self, image: &ChartImage) -> anyhow::Result<()> {
        tokio::fs::remove_file(&image.path).await?;
        Ok(())
    }
}

/// Lays out a report document as a file.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Human-readable renderer name (e.g. "html").
    fn name(&self) -> &str;

    /// Render `document` to a file named after `artifact_stem`, returning its path.
    async fn render_document(
        &self,
        document: &ReportDocument,
        artifact_stem: &str,
    ) -> anyhow::Result<PathBuf>;
}
