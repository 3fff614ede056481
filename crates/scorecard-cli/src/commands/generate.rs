//! The `scorecard generate` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use scorecard_core::config::{load_config_from, ReportFormat, ScorecardConfig};
use scorecard_core::engine::{ProgressReporter, ReportEngine};
use scorecard_core::loader::JsonDirectorySource;
use scorecard_core::report::{BatchReport, OutcomeStatus, StudentOutcome};
use scorecard_core::traits::DocumentRenderer;
use scorecard_report::{HtmlDocumentRenderer, JsonDocumentRenderer, SvgChartRenderer};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory of <student_id>.json record files
    #[arg(long)]
    records_dir: Option<PathBuf>,

    /// Flat JSON insights file
    #[arg(long)]
    insights: Option<PathBuf>,

    /// Output directory (charts/ and reports/ are created inside)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Only generate this student's report
    #[arg(long)]
    student: Option<String>,

    /// Report format: html, json
    #[arg(long)]
    format: Option<ReportFormat>,

    /// Max students processed concurrently
    #[arg(long)]
    parallelism: Option<usize>,

    /// Time budget in seconds for each chart or report render
    #[arg(long)]
    render_timeout: Option<u64>,

    /// Write the batch summary here (.md for markdown, JSON otherwise)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Exit code 1 if any student was skipped
    #[arg(long)]
    fail_on_skip: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

impl GenerateArgs {
    /// Flags win over the config file and environment.
    fn apply(&self, config: &mut ScorecardConfig) {
        if let Some(dir) = &self.records_dir {
            config.records_dir = dir.clone();
        }
        if let Some(file) = &self.insights {
            config.insights_file = file.clone();
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
        if let Some(student) = &self.student {
            config.student = Some(student.clone());
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(parallelism) = self.parallelism {
            config.parallelism = parallelism;
        }
        if let Some(secs) = self.render_timeout {
            config.render_timeout_secs = secs;
        }
    }
}

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_student_start(&self, student_id: &str) {
        eprintln!("  Starting: {student_id}");
    }

    fn on_student_complete(&self, outcome: &StudentOutcome) {
        match &outcome.status {
            OutcomeStatus::Generated(g) => {
                let missing = if g.chart_failures.is_empty() {
                    String::new()
                } else {
                    format!(", {} chart(s) unavailable", g.chart_failures.len())
                };
                eprintln!(
                    "  Done: {} [{} tests{}] -> {}",
                    outcome.student_id,
                    g.test_count,
                    missing,
                    g.report_path.display()
                );
            }
            OutcomeStatus::Skipped { kind, reason } => {
                eprintln!("  SKIPPED: {} ({kind}): {reason}", outcome.student_id);
            }
        }
    }

    fn on_batch_complete(&self, total: usize, generated: usize, skipped: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {generated}/{total} reports generated, {skipped} skipped ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    if let Some(parallelism) = args.parallelism {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    }
    if let Some(secs) = args.render_timeout {
        anyhow::ensure!(secs >= 1, "render timeout must be at least 1 second");
    }

    let mut config = load_config_from(args.config.as_deref())?;
    args.apply(&mut config);
    tracing::debug!("effective config: {config:?}");

    anyhow::ensure!(
        config.records_dir.is_dir(),
        "records directory not found: {}",
        config.records_dir.display()
    );

    let source = Arc::new(JsonDirectorySource::new(
        config.records_dir.clone(),
        Some(config.insights_file.clone()),
    ));
    let charts = Arc::new(SvgChartRenderer::new(config.charts_dir()));
    let documents: Arc<dyn DocumentRenderer> = match config.format {
        ReportFormat::Html => Arc::new(HtmlDocumentRenderer::new(config.reports_dir())),
        ReportFormat::Json => Arc::new(JsonDocumentRenderer::new(config.reports_dir())),
    };

    eprintln!(
        "scorecard v{}: {} -> {} ({} reports, parallelism {})",
        env!("CARGO_PKG_VERSION"),
        config.records_dir.display(),
        config.output_dir.display(),
        config.format,
        config.parallelism.max(1)
    );
    eprintln!();

    let engine = ReportEngine::new(source, charts, documents, config.engine_config());
    let report = engine.run(&ConsoleReporter).await?;

    print_summary(&report);

    if let Some(path) = &args.summary {
        if path.extension().is_some_and(|ext| ext == "md") {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create summary directory: {}", parent.display())
                })?;
            }
            std::fs::write(path, report.to_markdown())
                .with_context(|| format!("failed to write summary to {}", path.display()))?;
        } else {
            report.save_json(path)?;
        }
        eprintln!("Summary saved to: {}", path.display());
    }

    if args.fail_on_skip && report.has_skips() {
        anyhow::bail!(
            "{} of {} students skipped",
            report.skipped_count(),
            report.students_requested
        );
    }

    Ok(())
}

fn print_summary(report: &BatchReport) {
    use comfy_table::{Cell, Table};

    if report.outcomes.is_empty() {
        eprintln!("\nNo students found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Student", "Status", "Tests", "Attempted", "Insights", "Output",
    ]);

    for outcome in &report.outcomes {
        let row = match &outcome.status {
            OutcomeStatus::Generated(g) => vec![
                Cell::new(&outcome.student_id),
                Cell::new("generated"),
                Cell::new(g.test_count),
                Cell::new(g.total_attempted),
                Cell::new(g.insight_count),
                Cell::new(g.report_path.display()),
            ],
            OutcomeStatus::Skipped { kind, reason } => vec![
                Cell::new(&outcome.student_id),
                Cell::new(format!("skipped: {kind}")),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(reason),
            ],
        };
        table.add_row(row);
    }

    eprintln!("\n{table}");
}
