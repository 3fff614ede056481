//! SVG chart renderer.
//!
//! Draws a test's subject-wise bar chart: a green bar above the zero line for
//! marks gained, a red bar below it for marks lost.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use scorecard_core::chart::{ChartImage, ChartSpec};
use scorecard_core::traits::ChartRenderer;

use crate::{html_escape, write_artifact};

const CORRECT_COLOR: &str = "#2ecc71";
const INCORRECT_COLOR: &str = "#e74c3c";
const UNATTEMPTED_COLOR: &str = "#95a5a6";

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 30.0;
const PLOT_TOP: f64 = 70.0;
const PLOT_HEIGHT: f64 = 280.0;
const GROUP_WIDTH: f64 = 120.0;
const BAR_WIDTH: f64 = 36.0;
const MIN_PLOT_WIDTH: f64 = 420.0;
const LABEL_AREA: f64 = 60.0;
const LEGEND_AREA: f64 = 40.0;

/// Writes charts as `<charts_dir>/<stem>.svg`.
pub struct SvgChartRenderer {
    charts_dir: PathBuf,
}

impl SvgChartRenderer {
    pub fn new(charts_dir: PathBuf) -> Self {
        Self { charts_dir }
    }
}

#[async_trait]
impl ChartRenderer for SvgChartRenderer {
    fn name(&self) -> &str {
        "svg"
    }

    async fn render_chart(&self, spec: &ChartSpec, artifact_stem: &str) -> Result<ChartImage> {
        let path = self.charts_dir.join(format!("{artifact_stem}.svg"));
        let svg = generate_svg(spec);
        write_artifact(&path, svg.as_bytes()).await?;
        tracing::debug!("wrote chart {} ({} bars)", path.display(), spec.bars.len());
        Ok(ChartImage { path })
    }
}

/// Generate a standalone SVG document for a chart.
pub fn generate_svg(spec: &ChartSpec) -> String {
    let plot_width = (spec.bars.len() as f64 * GROUP_WIDTH).max(MIN_PLOT_WIDTH);
    let width = MARGIN_LEFT + plot_width + MARGIN_RIGHT;
    let height = PLOT_TOP + PLOT_HEIGHT + LABEL_AREA + LEGEND_AREA;

    let max_positive = spec.max_positive();
    let max_negative = spec.max_negative();
    let span = (max_positive + max_negative).max(1) as f64;
    let unit = PLOT_HEIGHT / span;
    let zero_y = PLOT_TOP + max_positive as f64 * unit;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"sans-serif\">\n"
    ));
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"28\" font-size=\"16\" font-weight=\"bold\" text-anchor=\"middle\">{}</text>\n",
        width / 2.0,
        html_escape(&spec.title)
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"52\" font-size=\"13\" text-anchor=\"end\" fill=\"#34495e\">Total Score: {}</text>\n",
        width - MARGIN_RIGHT,
        spec.total_score
    ));
    svg.push_str(&format!(
        "  <text x=\"16\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\" transform=\"rotate(-90 16 {:.1})\">Score Contribution</text>\n",
        PLOT_TOP + PLOT_HEIGHT / 2.0,
        PLOT_TOP + PLOT_HEIGHT / 2.0
    ));

    for (i, bar) in spec.bars.iter().enumerate() {
        let group_x = MARGIN_LEFT + i as f64 * GROUP_WIDTH;
        let center = group_x + GROUP_WIDTH / 2.0;
        let pos_x = center - BAR_WIDTH - 2.0;
        let neg_x = center + 2.0;
        let pos_h = bar.positive_value as f64 * unit;
        let neg_h = -bar.negative_value as f64 * unit;

        svg.push_str(&format!(
            "  <rect x=\"{pos_x:.1}\" y=\"{:.1}\" width=\"{BAR_WIDTH:.1}\" height=\"{pos_h:.1}\" fill=\"{CORRECT_COLOR}\"/>\n",
            zero_y - pos_h
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">+{}</text>\n",
            pos_x + BAR_WIDTH / 2.0,
            zero_y - pos_h - 4.0,
            bar.positive_value
        ));
        svg.push_str(&format!(
            "  <rect x=\"{neg_x:.1}\" y=\"{zero_y:.1}\" width=\"{BAR_WIDTH:.1}\" height=\"{neg_h:.1}\" fill=\"{INCORRECT_COLOR}\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{}</text>\n",
            neg_x + BAR_WIDTH / 2.0,
            zero_y + neg_h + 14.0,
            bar.negative_value
        ));

        let label_y = PLOT_TOP + PLOT_HEIGHT + 32.0;
        svg.push_str(&format!(
            "  <text x=\"{center:.1}\" y=\"{label_y:.1}\" font-size=\"12\" text-anchor=\"middle\">{}</text>\n",
            html_escape(&bar.subject)
        ));
        svg.push_str(&format!(
            "  <text x=\"{center:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"middle\" fill=\"{UNATTEMPTED_COLOR}\">Unattempted: {}</text>\n",
            label_y + 16.0,
            bar.unattempted_count
        ));
    }

    svg.push_str(&format!(
        "  <line x1=\"{MARGIN_LEFT:.1}\" y1=\"{zero_y:.1}\" x2=\"{:.1}\" y2=\"{zero_y:.1}\" stroke=\"#2c3e50\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT + plot_width
    ));

    let legend_y = PLOT_TOP + PLOT_HEIGHT + LABEL_AREA + 16.0;
    let legend = [
        (CORRECT_COLOR, "Correct (+4)"),
        (INCORRECT_COLOR, "Incorrect (-1)"),
        (UNATTEMPTED_COLOR, "Unattempted (0)"),
    ];
    for (i, (color, label)) in legend.iter().enumerate() {
        let x = MARGIN_LEFT + i as f64 * 140.0;
        svg.push_str(&format!(
            "  <rect x=\"{x:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{color}\"/>\n",
            legend_y - 10.0
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{legend_y:.1}\" font-size=\"12\">{label}</text>\n",
            x + 18.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}
