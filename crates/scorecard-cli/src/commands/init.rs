//! The `scorecard init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("scorecard.toml").exists() {
        println!("scorecard.toml already exists, skipping.");
    } else {
        std::fs::write("scorecard.toml", SAMPLE_CONFIG)?;
        println!("Created scorecard.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point records_dir and insights_file at your pipeline output");
    println!("  2. Run: scorecard validate --records-dir output/phase4/students");
    println!("  3. Run: scorecard generate");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# scorecard configuration

# One <student_id>.json file per student.
records_dir = "output/phase4/students"

# Flat array of ranked insights, each carrying a student_id.
insights_file = "output/phase5/student_pattern_insights.json"

# Charts go to <output_dir>/charts, reports to <output_dir>/reports.
output_dir = "output/phase6"

# "html" or "json"
format = "html"

render_timeout_secs = 30
parallelism = 1

# Uncomment to generate a single student's report.
# student = "2025300001"
"#;
