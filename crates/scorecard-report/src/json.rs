//! JSON report renderer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;

use scorecard_core::document::ReportDocument;
use scorecard_core::traits::DocumentRenderer;

use crate::write_artifact;

/// Writes reports as `<reports_dir>/<stem>.json`.
pub struct JsonDocumentRenderer {
    reports_dir: PathBuf,
}

impl JsonDocumentRenderer {
    pub fn new(reports_dir: PathBuf) -> Self {
        Self { reports_dir }
    }
}

#[async_trait]
impl DocumentRenderer for JsonDocumentRenderer {
    fn name(&self) -> &str {
        "json"
    }

    async fn render_document(
        &self,
        document: &ReportDocument,
        artifact_stem: &str,
    ) -> Result<PathBuf> {
        let value = serde_json::json!({
            "generated_at": Utc::now(),
            "report": document,
        });
        let json = serde_json::to_string_pretty(&value).context("failed to serialize report")?;
        let path = self.reports_dir.join(format!("{artifact_stem}.json"));
        write_artifact(&path, json.as_bytes()).await?;
        Ok(path)
    }
}
