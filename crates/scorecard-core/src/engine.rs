//! Per-student report orchestrator.
//!
//! Loads each student's records, scores them, renders one chart per test,
//! assembles the report document, and renders it. Failures are isolated per
//! student: a broken student becomes a skipped outcome and the batch moves on.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::chart::{build_chart, ChartImage, ChartSpec};
use crate::document::{
    assemble, chart_artifact_stem, report_artifact_stem, unique_stem, ChartedTest,
    ReportDocument,
};
use crate::error::{RenderStage, ReportError};
use crate::model::InsightRecord;
use crate::report::{BatchReport, ChartFailure, GeneratedReport, OutcomeStatus, StudentOutcome};
use crate::traits::{ChartRenderer, DocumentRenderer, StudentSource};

/// Configuration for the report engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum students processed concurrently.
    pub parallelism: usize,
    /// Time budget for each external render call.
    pub render_timeout: Duration,
    /// Restrict the batch to a single student.
    pub student_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 1,
            render_timeout: Duration::from_secs(30),
            student_filter: None,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_student_start(&self, student_id: &str);
    fn on_student_complete(&self, outcome: &StudentOutcome);
    fn on_batch_complete(&self, total: usize, generated: usize, skipped: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_student_start(&self, _: &str) {}
    fn on_student_complete(&self, _: &StudentOutcome) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The central report engine.
pub struct ReportEngine {
    source: Arc<dyn StudentSource>,
    charts: Arc<dyn ChartRenderer>,
    documents: Arc<dyn DocumentRenderer>,
    config: EngineConfig,
}

impl ReportEngine {
    pub fn new(
        source: Arc<dyn StudentSource>,
        charts: Arc<dyn ChartRenderer>,
        documents: Arc<dyn DocumentRenderer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            charts,
            documents,
            config,
        }
    }

    /// Generate reports for every selected student.
    ///
    /// Only a failure to enumerate students is returned as an error; every
    /// per-student failure ends up in the returned [`BatchReport`].
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<BatchReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();

        let student_ids = match &self.config.student_filter {
            Some(id) => {
                tracing::info!("generating report for single student: {id}");
                vec![id.clone()]
            }
            None => {
                let ids = self.source.student_ids().await?;
                tracing::info!("generating reports for {} students", ids.len());
                ids
            }
        };

        let mut all_insights = match self.source.load_insights().await {
            Ok(insights) => insights,
            Err(e) => {
                tracing::warn!("insights unavailable, continuing without them: {e:#}");
                BTreeMap::new()
            }
        };

        let semaphore = Semaphore::new(self.config.parallelism.max(1));
        let semaphore = &semaphore;
        let mut futures = FuturesUnordered::new();

        for student_id in &student_ids {
            let insights = all_insights.remove(student_id).unwrap_or_default();
            futures.push(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire().await.ok();
                progress.on_student_start(student_id);

                let status = match self.generate_student(student_id, insights).await {
                    Ok(generated) => OutcomeStatus::Generated(generated),
                    Err(e) => {
                        let kind = e.skip_kind();
                        tracing::warn!("skipping student {student_id} ({kind}): {e}");
                        OutcomeStatus::Skipped {
                            kind,
                            reason: e.to_string(),
                        }
                    }
                };
                StudentOutcome {
                    student_id: student_id.clone(),
                    status,
                }
            });
        }

        let mut outcomes = Vec::with_capacity(student_ids.len());
        while let Some(outcome) = futures.next().await {
            progress.on_student_complete(&outcome);
            outcomes.push(outcome);
        }
        outcomes.sort_by(|a, b| a.student_id.cmp(&b.student_id));

        let elapsed = start.elapsed();
        let report = BatchReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            students_requested: student_ids.len(),
            outcomes,
            duration_ms: elapsed.as_millis() as u64,
        };
        progress.on_batch_complete(
            report.students_requested,
            report.generated_count(),
            report.skipped_count(),
            elapsed,
        );
        tracing::info!(
            "batch complete: {} reports generated, {} skipped",
            report.generated_count(),
            report.skipped_count()
        );

        Ok(report)
    }

    /// Produce one student's charts and report.
    pub async fn generate_student(
        &self,
        student_id: &str,
        insights: Vec<InsightRecord>,
    ) -> std::result::Result<GeneratedReport, ReportError> {
        let records = match self.source.load_records(student_id).await {
            Ok(Some(records)) => records,
            Ok(None) => {
                return Err(ReportError::MissingInputData {
                    student_id: student_id.to_string(),
                })
            }
            Err(e) => {
                return Err(ReportError::LoadFailed {
                    student_id: student_id.to_string(),
                    message: format!("{e:#}"),
                })
            }
        };

        let aggregation = aggregate(&records.records);
        if aggregation.tests.is_empty() {
            return Err(ReportError::MissingInputData {
                student_id: student_id.to_string(),
            });
        }
        if !aggregation.warnings.is_empty() {
            tracing::warn!(
                "student {student_id}: {} records excluded from scoring",
                aggregation.warnings.len()
            );
        }
        if insights.is_empty() {
            tracing::warn!("no insights found for student {student_id}, proceeding without insights");
        }

        let test_count = aggregation.tests.len();
        let mut charted = Vec::with_capacity(test_count);
        let mut charts = Vec::new();
        let mut chart_failures = Vec::new();
        let mut used_stems = HashSet::with_capacity(test_count);

        for summary in aggregation.tests {
            let spec = build_chart(&summary);
            let stem = unique_stem(
                chart_artifact_stem(student_id, &summary.test_name),
                &mut used_stems,
            );
            let chart = match self.render_chart(&spec, &stem).await {
                Ok(image) => {
                    tracing::debug!("created chart: {}", image.path.display());
                    charts.push(image.path.clone());
                    Some(image)
                }
                Err(e) => {
                    tracing::warn!("student {student_id}: leaving out chart: {e}");
                    chart_failures.push(ChartFailure {
                        test_name: summary.test_name.clone(),
                        reason: e.to_string(),
                    });
                    None
                }
            };
            charted.push(ChartedTest { summary, chart });
        }

        let document = assemble(student_id, charted, insights);
        let report_path = match self
            .render_document(&document, &report_artifact_stem(student_id))
            .await
        {
            Ok(path) => path,
            Err(e) => {
                self.discard_charts(student_id, &charts).await;
                return Err(e);
            }
        };
        tracing::info!("report generated: {}", report_path.display());

        Ok(GeneratedReport {
            report_path,
            charts,
            chart_failures,
            test_count,
            total_attempted: document.header.total_attempted,
            insight_count: document.insight_section.len(),
            excluded_records: aggregation.warnings.len(),
        })
    }

    async fn render_chart(
        &self,
        spec: &ChartSpec,
        stem: &str,
    ) -> std::result::Result<ChartImage, ReportError> {
        match tokio::time::timeout(
            self.config.render_timeout,
            self.charts.render_chart(spec, stem),
        )
        .await
        {
            Ok(Ok(image)) => Ok(image),
            Ok(Err(e)) => Err(ReportError::ChartRender {
                test_name: spec.test_name.clone(),
                message: format!("{e:#}"),
            }),
            Err(_) => Err(ReportError::RenderTimeout {
                stage: RenderStage::Chart,
                timeout_ms: self.config.render_timeout.as_millis() as u64,
            }),
        }
    }

    /// Best-effort removal of a skipped student's charts.
    async fn discard_charts(&self, student_id: &str, charts: &[PathBuf]) {
        for path in charts {
            let image = ChartImage { path: path.clone() };
            if let Err(e) = self.charts.discard_chart(&image).await {
                tracing::debug!("student {student_id}: could not remove {}: {e}", path.display());
            }
        }
    }

    async fn render_document(
        &self,
        document: &ReportDocument,
        stem: &str,
    ) -> std::result::Result<PathBuf, ReportError> {
        match tokio::time::timeout(
            self.config.render_timeout,
            self.documents.render_document(document, stem),
        )
        .await
        {
            Ok(Ok(path)) => Ok(path),
            Ok(Err(e)) => Err(ReportError::DocumentRender(format!("{e:#}"))),
            Err(_) => Err(ReportError::RenderTimeout {
                stage: RenderStage::Document,
                timeout_ms: self.config.render_timeout.as_millis() as u64,
            }),
        }
    }
}
