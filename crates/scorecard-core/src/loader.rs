//! JSON input loader.
//!
//! Reads the per-student record files and the flat insights file written by
//! the upstream phases, and validates them.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::aggregate::aggregate;
use crate::insights::{group_by_student, MAX_INSIGHTS};
use crate::model::{InsightRecord, StudentRecords};
use crate::traits::StudentSource;

/// Index file written next to the student files; never a student.
const INDEX_STEM: &str = "_index";

/// One row of the flat insights file.
#[derive(Debug, Deserialize)]
struct InsightFileEntry {
    #[serde(default)]
    student_id: serde_json::Value,
    #[serde(flatten)]
    insight: InsightRecord,
}

/// Reads `<records_dir>/<student_id>.json` files and an optional insights file.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    records_dir: PathBuf,
    insights_file: Option<PathBuf>,
}

impl JsonDirectorySource {
    pub fn new(records_dir: PathBuf, insights_file: Option<PathBuf>) -> Self {
        Self {
            records_dir,
            insights_file,
        }
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    fn student_path(&self, student_id: &str) -> PathBuf {
        self.records_dir.join(format!("{student_id}.json"))
    }
}

#[async_trait]
impl StudentSource for JsonDirectorySource {
    async fn student_ids(&self) -> Result<Vec<String>> {
        list_student_ids(&self.records_dir)
    }

    async fn load_records(&self, student_id: &str) -> Result<Option<StudentRecords>> {
        let path = self.student_path(student_id);
        if !path.exists() {
            tracing::warn!("student file not found: {}", path.display());
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read student file: {}", path.display()))?;
        let mut records = parse_student_records(&content, &path)?;
        if records.student_id.is_empty() {
            records.student_id = student_id.to_string();
        }
        tracing::debug!(
            "loaded {} records for student {student_id}",
            records.records.len()
        );
        Ok(Some(records))
    }

    async fn load_insights(&self) -> Result<BTreeMap<String, Vec<InsightRecord>>> {
        match &self.insights_file {
            Some(path) if path.exists() => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read insights: {}", path.display()))?;
                parse_insights(&content, path)
            }
            Some(path) => {
                tracing::warn!("insights file not found: {}", path.display());
                Ok(BTreeMap::new())
            }
            None => Ok(BTreeMap::new()),
        }
    }
}

/// List student ids (file stems) in a records directory, sorted.
pub fn list_student_ids(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut ids = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if stem != INDEX_STEM {
                ids.push(stem.to_string());
            }
        }
    }
    ids.sort();
    Ok(ids)
}

/// Parse a student record file.
pub fn parse_student_records(content: &str, source_path: &Path) -> Result<StudentRecords> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse student file: {}", source_path.display()))
}

/// Parse the flat insights file into per-student lists.
///
/// The file must be a JSON array. Rows that do not deserialize, or that lack
/// a usable `student_id`, are dropped with a warning; the rest are kept.
pub fn parse_insights(
    content: &str,
    source_path: &Path,
) -> Result<BTreeMap<String, Vec<InsightRecord>>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)
        .with_context(|| format!("failed to parse insights: {}", source_path.display()))?;

    let mut invalid = 0usize;
    let mut unowned = 0usize;
    let mut rows = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let entry = match serde_json::from_value::<InsightFileEntry>(value) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("insight row {index} in {} unreadable: {e}", source_path.display());
                invalid += 1;
                continue;
            }
        };
        let id = match entry.student_id {
            serde_json::Value::String(s) if !s.trim().is_empty() => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => {
                unowned += 1;
                continue;
            }
        };
        rows.push((id, entry.insight));
    }

    if invalid > 0 {
        tracing::warn!("{invalid} malformed insights skipped in {}", source_path.display());
    }
    if unowned > 0 {
        tracing::warn!("{unowned} insights without student_id in {}", source_path.display());
    }
    Ok(group_by_student(rows))
}

/// A warning from input validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub student_id: String,
    pub message: String,
}

/// Validate one student's inputs for common issues.
pub fn validate_student(records: &StudentRecords, insights: &[InsightRecord]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |message: String| {
        warnings.push(ValidationWarning {
            student_id: records.student_id.clone(),
            message,
        })
    };

    if records.records.is_empty() {
        warn("no answer records".into());
    }

    if records.total_records != 0 && records.total_records != records.records.len() {
        warn(format!(
            "total_records is {} but file holds {} records",
            records.total_records,
            records.records.len()
        ));
    }

    for excluded in aggregate(&records.records).warnings {
        warn(format!("record {} excluded: {}", excluded.index, excluded.reason));
    }

    let mut seen_ranks = HashSet::new();
    for insight in insights {
        if !(1..=MAX_INSIGHTS as u32).contains(&insight.insight_rank) {
            warn(format!(
                "insight rank {} outside 1..={MAX_INSIGHTS}",
                insight.insight_rank
            ));
        }
        if !seen_ranks.insert(insight.insight_rank) {
            warn(format!("duplicate insight rank: {}", insight.insight_rank));
        }
    }

    if insights.len() > MAX_INSIGHTS {
        warn(format!(
            "{} insights, only the first {MAX_INSIGHTS} by rank are used",
            insights.len()
        ));
    }

    warnings
}
