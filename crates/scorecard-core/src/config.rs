//! Scorecard configuration.
//!
//! Loaded from `scorecard.toml` and turned into an explicit
//! [`EngineConfig`]; the engine itself never reads process state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

/// Output format for report documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" | "htm" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Top-level scorecard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardConfig {
    /// Directory of `<student_id>.json` record files.
    #[serde(default = "default_records_dir")]
    pub records_dir: PathBuf,
    /// Flat JSON insights file.
    #[serde(default = "default_insights_file")]
    pub insights_file: PathBuf,
    /// Root for `charts/` and `reports/`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub format: ReportFormat,
    /// Time budget for each chart or document render.
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,
    /// Max students processed concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Only generate this student's report.
    #[serde(default)]
    pub student: Option<String>,
}

fn default_records_dir() -> PathBuf {
    PathBuf::from("output/phase4/students")
}
fn default_insights_file() -> PathBuf {
    PathBuf::from("output/phase5/student_pattern_insights.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output/phase6")
}
fn default_render_timeout() -> u64 {
    30
}
fn default_parallelism() -> usize {
    1
}

impl Default for ScorecardConfig {
    fn default() -> Self {
        Self {
            records_dir: default_records_dir(),
            insights_file: default_insights_file(),
            output_dir: default_output_dir(),
            format: ReportFormat::default(),
            render_timeout_secs: default_render_timeout(),
            parallelism: default_parallelism(),
            student: None,
        }
    }
}

impl ScorecardConfig {
    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }

    /// Engine settings derived from this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            parallelism: self.parallelism.max(1),
            render_timeout: Duration::from_secs(self.render_timeout_secs),
            student_filter: self.student.clone(),
        }
    }

    /// Apply `SCORECARD_*` overrides using the given variable lookup.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(student) = lookup("SCORECARD_STUDENT_ID") {
            let student = student.trim();
            if !student.is_empty() {
                self.student = Some(student.to_string());
            }
        }
        if let Some(dir) = lookup("SCORECARD_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir.trim());
            }
        }
    }

    fn resolve_paths(&mut self) {
        for path in [
            &mut self.records_dir,
            &mut self.insights_file,
            &mut self.output_dir,
        ] {
            *path = PathBuf::from(resolve_env_vars(&path.to_string_lossy()));
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `scorecard.toml` in the current directory
/// 2. `~/.config/scorecard/config.toml`
///
/// Environment variable overrides: `SCORECARD_STUDENT_ID`, `SCORECARD_OUTPUT_DIR`.
pub fn load_config() -> Result<ScorecardConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ScorecardConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("scorecard.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content, &path)?
        }
        None => ScorecardConfig::default(),
    };

    config.apply_overrides(|name| std::env::var(name).ok());
    config.resolve_paths();

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config_str(content: &str, source_path: &Path) -> Result<ScorecardConfig> {
    toml::from_str::<ScorecardConfig>(content)
        .with_context(|| format!("failed to parse config: {}", source_path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("scorecard"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let config = ScorecardConfig::default();
        assert_eq!(config.parallelism, 1);
        assert_eq!(config.render_timeout_secs, 30);
        assert_eq!(config.format, ReportFormat::Html);
        assert_eq!(config.charts_dir(), PathBuf::from("output/phase6/charts"));
        assert_eq!(config.reports_dir(), PathBuf::from("output/phase6/reports"));
        assert!(config.student.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
records_dir = "data/students"
insights_file = "data/insights.json"
output_dir = "out"
format = "json"
render_timeout_secs = 5
parallelism = 8
student = "2025300001"
"#;
        let config = parse_config_str(toml_str, Path::new("scorecard.toml")).unwrap();
        assert_eq!(config.records_dir, PathBuf::from("data/students"));
        assert_eq!(config.format, ReportFormat::Json);

        let engine = config.engine_config();
        assert_eq!(engine.parallelism, 8);
        assert_eq!(engine.render_timeout, Duration::from_secs(5));
        assert_eq!(engine.student_filter.as_deref(), Some("2025300001"));
    }

    #[test]
    fn parse_bad_config() {
        assert!(parse_config_str("format = 42", Path::new("x.toml")).is_err());
    }

    #[test]
    fn overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("SCORECARD_STUDENT_ID", " 2025300007 "),
            ("SCORECARD_OUTPUT_DIR", "elsewhere"),
        ]
        .into_iter()
        .collect();
        let mut config = ScorecardConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.student.as_deref(), Some("2025300007"));
        assert_eq!(config.output_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn blank_student_override_is_ignored() {
        let mut config = ScorecardConfig::default();
        config.apply_overrides(|name| (name == "SCORECARD_STUDENT_ID").then(|| "  ".to_string()));
        assert!(config.student.is_none());
    }

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SCORECARD_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SCORECARD_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SCORECARD_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_SCORECARD_TEST_VAR");
    }

    #[test]
    fn format_parse() {
        assert_eq!("HTML".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Json.to_string(), "json");
    }

    #[test]
    fn explicit_missing_path_fails() {
        assert!(load_config_from(Some(Path::new("no/such/scorecard.toml"))).is_err());
    }
}
