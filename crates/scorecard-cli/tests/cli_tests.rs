//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scorecard(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("scorecard").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("SCORECARD_STUDENT_ID")
        .env_remove("SCORECARD_OUTPUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

const STUDENT_A: &str = r#"{
  "student_id": "2025300001",
  "total_records": 4,
  "records": [
    {"test_name": "class_7", "subject": "Maths", "correct_option": "A", "student_selected_option": "A"},
    {"test_name": "class_7", "subject": "Maths", "correct_option": "B", "student_selected_option": ""},
    {"test_name": "class_7", "subject": "Physics", "correct_option": "C", "student_selected_option": "D"},
    {"test_name": "class_8", "subject": "Chemistry", "correct_option": "A", "student_selected_option": "A"}
  ]
}"#;

const STUDENT_B: &str = r#"{
  "student_id": "2025300002",
  "total_records": 1,
  "records": [
    {"test_name": "class_7", "subject": "Maths", "correct_option": "A", "student_selected_option": "C"}
  ]
}"#;

const EMPTY_STUDENT: &str = r#"{"student_id": "2025300003", "total_records": 0, "records": []}"#;

const INSIGHTS: &str = r#"[
  {"student_id": "2025300001", "insight_rank": 1, "topic": "Refraction", "subject": "Physics", "accuracy": 25.0, "problem": "Mixes up angles", "action": "Redo ray diagrams", "citation": "Q3"}
]"#;

/// Lay out `students/` and `insights.json` in `root`.
fn write_inputs(root: &Path, students: &[(&str, &str)]) {
    let dir = root.join("students");
    std::fs::create_dir_all(&dir).unwrap();
    for (id, json) in students {
        std::fs::write(dir.join(format!("{id}.json")), json).unwrap();
    }
    std::fs::write(dir.join("_index.json"), r#"{"students": []}"#).unwrap();
    std::fs::write(root.join("insights.json"), INSIGHTS).unwrap();
}

fn generate(root: &Path) -> Command {
    let mut cmd = scorecard(root);
    cmd.arg("generate")
        .arg("--records-dir")
        .arg(root.join("students"))
        .arg("--insights")
        .arg(root.join("insights.json"))
        .arg("--output")
        .arg(root.join("out"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    scorecard(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    scorecard(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scorecard"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    scorecard(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created scorecard.toml"));

    let content = std::fs::read_to_string(dir.path().join("scorecard.toml")).unwrap();
    assert!(content.contains("records_dir"));
    assert!(content.contains("render_timeout_secs = 30"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("scorecard.toml"), "# mine\n").unwrap();

    scorecard(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("scorecard.toml")).unwrap(),
        "# mine\n"
    );
}

#[test]
fn validate_clean_inputs() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path(), &[("2025300001", STUDENT_A)]);

    scorecard(dir.path())
        .arg("validate")
        .arg("--records-dir")
        .arg(dir.path().join("students"))
        .arg("--insights")
        .arg(dir.path().join("insights.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 students"))
        .stdout(predicate::str::contains("2025300001: 4 records, 1 insights"))
        .stdout(predicate::str::contains("All student files valid."));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path(), &[("2025300003", EMPTY_STUDENT)]);

    scorecard(dir.path())
        .arg("validate")
        .arg("--records-dir")
        .arg(dir.path().join("students"))
        .arg("--insights")
        .arg(dir.path().join("insights.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[2025300003] WARNING: no answer records"))
        .stdout(predicate::str::contains(
            "[2025300001] WARNING: insights for a student with no records file",
        ));
}

#[test]
fn validate_malformed_file_fails() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path(), &[("broken", "{not json")]);

    scorecard(dir.path())
        .arg("validate")
        .arg("--records-dir")
        .arg(dir.path().join("students"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("[broken] ERROR"))
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_nonexistent_dir() {
    let dir = TempDir::new().unwrap();
    scorecard(dir.path())
        .arg("validate")
        .arg("--records-dir")
        .arg("does-not-exist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn generate_html_reports() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        dir.path(),
        &[("2025300001", STUDENT_A), ("2025300002", STUDENT_B)],
    );

    generate(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Complete: 2/2 reports generated"));

    let out = dir.path().join("out");
    assert!(out.join("charts/2025300001_class_7.svg").exists());
    assert!(out.join("charts/2025300001_class_8.svg").exists());
    assert!(out.join("charts/2025300002_class_7.svg").exists());

    let html = std::fs::read_to_string(out.join("reports/2025300001_report.html")).unwrap();
    assert!(html.contains("Student Performance Report"));
    assert!(html.contains("Class 7"));
    assert!(html.contains("Priority #1: Refraction (Accuracy: 25.0%)"));
    assert!(html.contains("<svg"));

    let html = std::fs::read_to_string(out.join("reports/2025300002_report.html")).unwrap();
    assert!(html.contains("No pattern insights available for this student yet."));
}

#[test]
fn generate_single_student() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        dir.path(),
        &[("2025300001", STUDENT_A), ("2025300002", STUDENT_B)],
    );

    generate(dir.path())
        .arg("--student")
        .arg("2025300002")
        .assert()
        .success();

    let reports = dir.path().join("out/reports");
    assert!(reports.join("2025300002_report.html").exists());
    assert!(!reports.join("2025300001_report.html").exists());
}

#[test]
fn generate_student_from_env() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        dir.path(),
        &[("2025300001", STUDENT_A), ("2025300002", STUDENT_B)],
    );

    generate(dir.path())
        .env("SCORECARD_STUDENT_ID", "2025300001")
        .assert()
        .success();

    let reports = dir.path().join("out/reports");
    assert!(reports.join("2025300001_report.html").exists());
    assert!(!reports.join("2025300002_report.html").exists());
}

#[test]
fn generate_json_with_summary() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path(), &[("2025300001", STUDENT_A)]);
    let summary = dir.path().join("summary.json");

    generate(dir.path())
        .arg("--format")
        .arg("json")
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success()
        .stderr(predicate::str::contains("Summary saved to"));

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/reports/2025300001_report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["report"]["header"]["total_attempted"], 3);
    assert_eq!(report["report"]["sections"].as_array().unwrap().len(), 2);

    let batch: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(batch["students_requested"], 1);
    assert_eq!(batch["outcomes"][0]["status"]["status"], "generated");
}

#[test]
fn generate_markdown_summary() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        dir.path(),
        &[("2025300001", STUDENT_A), ("2025300003", EMPTY_STUDENT)],
    );
    let summary = dir.path().join("summary.md");

    generate(dir.path())
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success();

    let md = std::fs::read_to_string(&summary).unwrap();
    assert!(md.contains("1 generated, 1 skipped"));
    assert!(md.contains("| 2025300003 | missing input data |"));
}

#[test]
fn unwritable_markdown_summary_names_the_path() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path(), &[("2025300001", STUDENT_A)]);
    // The summary's parent directory is a plain file.
    std::fs::write(dir.path().join("blocked"), "").unwrap();

    generate(dir.path())
        .arg("--summary")
        .arg("blocked/summary.md")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to create summary directory: blocked"));
}

#[test]
fn skipped_student_does_not_fail_batch() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        dir.path(),
        &[("2025300001", STUDENT_A), ("2025300003", EMPTY_STUDENT)],
    );

    generate(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("SKIPPED: 2025300003 (missing input data)"));

    let out = dir.path().join("out");
    assert!(out.join("reports/2025300001_report.html").exists());
    assert!(!out.join("reports/2025300003_report.html").exists());
}

#[test]
fn fail_on_skip_sets_exit_code() {
    let dir = TempDir::new().unwrap();
    write_inputs(
        dir.path(),
        &[("2025300001", STUDENT_A), ("2025300003", EMPTY_STUDENT)],
    );

    generate(dir.path())
        .arg("--fail-on-skip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 students skipped"));
}

#[test]
fn generate_reads_config_file() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path(), &[("2025300001", STUDENT_A)]);
    std::fs::write(
        dir.path().join("scorecard.toml"),
        "records_dir = \"students\"\ninsights_file = \"insights.json\"\noutput_dir = \"from-config\"\nformat = \"json\"\n",
    )
    .unwrap();

    scorecard(dir.path()).arg("generate").assert().success();

    assert!(dir
        .path()
        .join("from-config/reports/2025300001_report.json")
        .exists());
}

#[test]
fn generate_rejects_zero_parallelism() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path(), &[("2025300001", STUDENT_A)]);

    generate(dir.path())
        .arg("--parallelism")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parallelism must be at least 1"));
}

#[test]
fn generate_missing_records_dir() {
    let dir = TempDir::new().unwrap();
    scorecard(dir.path())
        .arg("generate")
        .arg("--records-dir")
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("records directory not found"));
}
