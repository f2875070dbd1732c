use ctk_api::docx::{Document, Paragraph};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ctk_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ctk"))
}

fn manifest_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_content = format!(
        r#"[app]
environment = "testing"
diagnoses_file = "{}"

[db]
path = "{}/data/ctk.sqlite"

[logging]
level = "warn"
"#,
        manifest_file("data/diagnoses.json").display(),
        root.display()
    );

    let config_path = root.join("ctk.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ctk(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ctk_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env_remove("CTK_API_ENVIRONMENT")
        .env_remove("SQLITE_FILE")
        .env_remove("DIAGNOSES_FILE")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ctk binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_database() {
    let (tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_ctk(&config, &["init"]);
    assert!(success, "init failed: {}", stderr);
    assert!(stdout.contains("Database initialized successfully."));
    assert!(tmp.path().join("data/ctk.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config) = setup_test_env();
    let (_, _, first) = run_ctk(&config, &["init"]);
    let (_, stderr, second) = run_ctk(&config, &["init"]);
    assert!(first);
    assert!(second, "second init failed: {}", stderr);
}

#[test]
fn test_seed_only_fills_empty_table() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_ctk(&config, &["seed"]);
    assert!(success, "seed failed: {}", stderr);
    assert!(stdout.contains("Seeded 8 diagnosis trees."), "{}", stdout);

    let (stdout, _, success) = run_ctk(&config, &["seed"]);
    assert!(success);
    assert!(stdout.contains("Seeded 0 diagnosis trees."), "{}", stdout);
}

#[test]
fn test_intake_writes_report() {
    let (tmp, config) = setup_test_env();
    let output = tmp.path().join("report.docx");
    let csv = manifest_file("tests/data/test_redcap_data.csv");

    let (_, stderr, success) = run_ctk(
        &config,
        &[
            "intake",
            "--csv",
            csv.to_str().unwrap(),
            "--id",
            "2",
            "--output",
            output.to_str().unwrap(),
        ],
    );
    assert!(success, "intake failed: {}", stderr);

    let doc = Document::from_bytes(&fs::read(&output).unwrap()).unwrap();
    assert!(doc
        .paragraphs()
        .any(|p| p.text() == "Name: Alex \"Al\" Smith"));
}

#[test]
fn test_intake_unknown_patient() {
    let (tmp, config) = setup_test_env();
    let output = tmp.path().join("report.docx");
    let csv = manifest_file("tests/data/test_redcap_data.csv");

    let (_, stderr, success) = run_ctk(
        &config,
        &[
            "intake",
            "--csv",
            csv.to_str().unwrap(),
            "--id",
            "42",
            "--output",
            output.to_str().unwrap(),
        ],
    );
    assert!(!success);
    assert!(stderr.contains("Patient not found."));
    assert!(!output.exists());
}

#[test]
fn test_anonymize_prints_diagnostic_section() {
    let (tmp, config) = setup_test_env();
    let mut doc = Document::new();
    for text in [
        "Name: Lea Avatar",
        "Clinical Summary and Impressions",
        "Lea is a cheerful girl.",
        "Recommendations",
    ] {
        doc.push_paragraph(Paragraph::with_text(text));
    }
    let report = tmp.path().join("report.docx");
    fs::write(&report, doc.to_bytes().unwrap()).unwrap();

    let (stdout, stderr, success) = run_ctk(&config, &["anonymize", report.to_str().unwrap()]);
    assert!(success, "anonymize failed: {}", stderr);
    assert!(stdout.contains("[FIRST_NAME] is a cheerful boy/girl."), "{}", stdout);
}

#[test]
fn test_missing_config_file_errors() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_ctk(&tmp.path().join("missing.toml"), &["init"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
