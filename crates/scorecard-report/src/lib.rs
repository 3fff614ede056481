//! scorecard-report: Chart and report renderers.
//!
//! Concrete implementations of the `scorecard-core` rendering traits:
//! self-contained SVG bar charts, and HTML or JSON report documents.

pub mod html;
pub mod json;
pub mod svg;

use std::path::Path;

pub use html::HtmlDocumentRenderer;
pub use json::JsonDocumentRenderer;
pub use svg::SvgChartRenderer;

/// Escape a string for safe HTML/SVG insertion.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Write `contents` to `path`, creating parent directories.
pub(crate) async fn write_artifact(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
