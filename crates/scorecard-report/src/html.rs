//! HTML report renderer.
//!
//! Produces a self-contained HTML file per student with all CSS and chart
//! SVGs inlined.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use scorecard_core::document::{InsightEntry, ReportDocument, TestSection};
use scorecard_core::traits::DocumentRenderer;

use crate::{html_escape, write_artifact};

/// Writes reports as `<reports_dir>/<stem>.html`.
pub struct HtmlDocumentRenderer {
    reports_dir: PathBuf,
}

impl HtmlDocumentRenderer {
    pub fn new(reports_dir: PathBuf) -> Self {
        Self { reports_dir }
    }
}

#[async_trait]
impl DocumentRenderer for HtmlDocumentRenderer {
    fn name(&self) -> &str {
        "html"
    }

    async fn render_document(
        &self,
        document: &ReportDocument,
        artifact_stem: &str,
    ) -> Result<PathBuf> {
        let mut charts = Vec::with_capacity(document.sections.len());
        for section in &document.sections {
            charts.push(load_chart(section).await);
        }

        let html = generate_html(document, &charts, Utc::now());
        let path = self.reports_dir.join(format!("{artifact_stem}.html"));
        write_artifact(&path, html.as_bytes()).await?;
        Ok(path)
    }
}

/// Read a section's chart for inlining; `None` when there is nothing usable.
async fn load_chart(section: &TestSection) -> Option<String> {
    let image = section.chart.as_ref()?;
    match tokio::fs::read_to_string(&image.path).await {
        Ok(svg) => Some(svg),
        Err(e) => {
            tracing::warn!(
                "chart for test '{}' unreadable at {}: {e}",
                section.test_name,
                image.path.display()
            );
            None
        }
    }
}

/// Generate the HTML for a report document.
///
/// `charts[i]` is the inline SVG for `document.sections[i]`, if any.
pub fn generate_html(
    document: &ReportDocument,
    charts: &[Option<String>],
    generated_at: DateTime<Utc>,
) -> String {
    let header = &document.header;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Student Performance Report: {}</title>\n",
        html_escape(&header.student_id)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Student Performance Report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\"><strong>Student ID:</strong> {} | <strong>Total Questions Attempted:</strong> {} | <strong>Total Questions:</strong> {}</p>\n",
        html_escape(&header.student_id),
        header.total_attempted,
        header.total_questions
    ));
    html.push_str("</header>\n");

    // Per-test sections
    html.push_str("<section class=\"tests\">\n");
    html.push_str("<h2>Test-wise Performance Analysis</h2>\n");
    for (i, section) in document.sections.iter().enumerate() {
        let chart = charts.get(i).and_then(|c| c.as_deref());
        html.push_str(&render_section(section, chart));
    }
    html.push_str("</section>\n");

    // Insights
    html.push_str("<section class=\"insights\">\n");
    html.push_str("<h2>Learning Pattern Insights</h2>\n");
    if document.insight_section.is_empty() {
        html.push_str(
            "<p class=\"empty\">No pattern insights available for this student yet.</p>\n",
        );
    } else {
        for entry in &document.insight_section {
            html.push_str(&render_insight(entry));
        }
    }
    html.push_str("</section>\n");

    html.push_str(&format!(
        "<footer>Report generated on {}</footer>\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</body>\n</html>");
    html
}

fn render_section(section: &TestSection, chart: Option<&str>) -> String {
    let mut html = String::new();
    html.push_str("<article class=\"test\">\n");
    html.push_str(&format!(
        "<h3>{}</h3>\n<p class=\"score\">Total Score: <strong>{}</strong></p>\n",
        html_escape(&section.display_name),
        section.total_score
    ));

    match chart {
        Some(svg) => {
            html.push_str("<div class=\"chart\">\n");
            html.push_str(svg);
            html.push_str("</div>\n");
        }
        None => html.push_str("<p class=\"note\">Chart unavailable for this test.</p>\n"),
    }

    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Subject</th><th>Correct</th><th>Incorrect</th><th>Unattempted</th><th>Total</th><th>Score</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for s in &section.subject_table {
        let class = if s.net_score < 0 { "neg" } else { "pos" };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            html_escape(&s.subject),
            s.correct_count,
            s.incorrect_count,
            s.unattempted_count,
            s.total_questions,
            class,
            s.net_score
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</article>\n");
    html
}

fn render_insight(entry: &InsightEntry) -> String {
    let insight = &entry.insight;
    let or_fallback = |value: &str, fallback: &str| {
        if value.trim().is_empty() {
            fallback.to_string()
        } else {
            html_escape(value)
        }
    };

    let mut html = String::new();
    html.push_str("<div class=\"insight\">\n");
    html.push_str(&format!(
        "<h3>{}: {} (Accuracy: {:.1}%)</h3>\n",
        html_escape(&entry.badge),
        html_escape(&insight.topic),
        insight.accuracy
    ));
    if !insight.subject.is_empty() {
        html.push_str(&format!(
            "<p class=\"subject\"><em>Subject: {}</em></p>\n",
            html_escape(&insight.subject)
        ));
    }
    html.push_str(&format!(
        "<p class=\"label\">Problem Identified:</p>\n<p>{}</p>\n",
        or_fallback(&insight.problem, "Not specified.")
    ));
    html.push_str(&format!(
        "<p class=\"label\">Recommended Action:</p>\n<p>{}</p>\n",
        or_fallback(&insight.action, "No action provided.")
    ));
    html.push_str(&format!(
        "<p class=\"label\">Evidence:</p>\n<p class=\"evidence\"><em>{}</em></p>\n",
        or_fallback(&insight.citation, "No evidence provided.")
    ));
    html.push_str("</div>\n");
    html
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --muted: #6b7280; --pos: #2ecc71; --neg: #e74c3c; }
@media print { .chart svg { max-width: 100%; height: auto; } article, .insight { break-inside: avoid; } }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 60rem; padding: 2rem; background: var(--bg); color: var(--fg); }
h1 { text-align: center; }
h2 { margin-top: 2rem; border-bottom: 2px solid var(--border); padding-bottom: 0.25rem; }
.meta, footer { color: var(--muted); }
footer { margin-top: 3rem; font-size: 0.85rem; text-align: center; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: center; }
th { background: var(--border); }
td:first-child { text-align: left; }
.pos { color: var(--pos); font-weight: bold; }
.neg { color: var(--neg); font-weight: bold; }
.note, .empty { color: var(--muted); font-style: italic; }
.chart { margin: 1rem 0; overflow-x: auto; }
.insight { border-left: 4px solid var(--neg); padding: 0.25rem 1rem; margin: 1.5rem 0; }
.label { font-weight: bold; margin-bottom: 0.25rem; }
.evidence { color: var(--muted); }
"#;
