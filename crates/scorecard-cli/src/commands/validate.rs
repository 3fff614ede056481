//! The `scorecard validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use scorecard_core::loader::{
    list_student_ids, parse_insights, parse_student_records, validate_student,
};

pub fn execute(records_dir: PathBuf, insights: Option<PathBuf>) -> Result<()> {
    let student_ids = list_student_ids(&records_dir)?;

    let mut insights_by_student = match &insights {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read insights: {}", path.display()))?;
            parse_insights(&content, path)?
        }
        None => Default::default(),
    };

    println!(
        "Records: {} ({} students)",
        records_dir.display(),
        student_ids.len()
    );

    let mut total_warnings = 0;
    let mut unreadable = 0;

    for student_id in &student_ids {
        let path = records_dir.join(format!("{student_id}.json"));
        let records = match std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read student file: {}", path.display()))
            .and_then(|content| parse_student_records(&content, &path))
        {
            Ok(mut records) => {
                if records.student_id.is_empty() {
                    records.student_id = student_id.clone();
                }
                records
            }
            Err(e) => {
                println!("  [{student_id}] ERROR: {e:#}");
                unreadable += 1;
                continue;
            }
        };

        let student_insights = insights_by_student.remove(student_id).unwrap_or_default();
        println!(
            "  {student_id}: {} records, {} insights",
            records.records.len(),
            student_insights.len()
        );

        let warnings = validate_student(&records, &student_insights);
        for w in &warnings {
            println!("  [{}] WARNING: {}", w.student_id, w.message);
        }
        total_warnings += warnings.len();
    }

    for orphan in insights_by_student.keys() {
        println!("  [{orphan}] WARNING: insights for a student with no records file");
        total_warnings += 1;
    }

    if unreadable > 0 {
        anyhow::bail!("{unreadable} student file(s) could not be read");
    }

    if total_warnings == 0 {
        println!("All student files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
