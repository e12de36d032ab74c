//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("scanwise")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn json_output(args: &[&str]) -> serde_json::Value {
    let output = cmd().args(args).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_file_input() {
    cmd()
        .arg(get_fixture_path("well_structured.html"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Scannability: "))
        .stdout(predicate::str::contains("Preset: base"));
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("well_structured.html")).unwrap();
    cmd()
        .arg("-")
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Scannability: "));
}

#[test]
fn test_cli_text_format() {
    cmd()
        .args(["-f", "text", &get_fixture_path("unformatted_code.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unformatted content"))
        .stdout(predicate::str::contains("[command]"))
        .stdout(predicate::str::contains("[header]"));
}

#[test]
fn test_cli_json_format() {
    let json = json_output(&["-f", "json", &get_fixture_path("unformatted_code.html")]);

    assert_eq!(json["presetId"], "base");
    assert_eq!(json["totalTextBlocks"], 6);
    assert_eq!(json["breakdown"]["unformattedCount"], 4);
    assert!(json["score"].as_u64().is_some_and(|s| s <= 100));
}

#[test]
fn test_cli_json_compact_is_one_line() {
    cmd()
        .args(["-f", "json-compact", &get_fixture_path("headings_only.html")])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| out.trim_end().lines().count() == 1));
}

#[test]
fn test_cli_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("report.json");

    cmd()
        .args([
            "-f",
            "json",
            "-o",
            output_path.to_str().unwrap(),
            &get_fixture_path("headings_only.html"),
        ])
        .assert()
        .success();

    let content = std::fs::read_to_string(&output_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["score"], 100);
}

#[test]
fn test_cli_builtin_preset() {
    let json = json_output(&["-p", "github", "-f", "json", &get_fixture_path("github_readme.html")]);

    assert_eq!(json["presetId"], "github");
    assert_eq!(json["breakdown"]["anchors"]["platform"]["alerts"]["count"], 1);
    assert_eq!(json["breakdown"]["unformattedMatches"][0]["type"], "command");
}

#[test]
fn test_cli_preset_dir() {
    let json = json_output(&[
        "--preset",
        "docs",
        "--preset-dir",
        &get_fixture_path("presets"),
        "-f",
        "json",
        &get_fixture_path("well_structured.html"),
    ]);

    assert_eq!(json["presetId"], "docs");
    assert_eq!(json["breakdown"]["anchors"]["headings"]["weight"], 6.0);
}

#[test]
fn test_cli_unknown_preset() {
    cmd()
        .args(["-p", "nope", &get_fixture_path("well_structured.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_cli_list_presets() {
    cmd()
        .arg("--list-presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("base"))
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("confluence"))
        .stdout(predicate::str::contains("chat"));
}

#[test]
fn test_cli_list_presets_with_dir() {
    cmd()
        .args(["--list-presets", "--preset-dir", &get_fixture_path("presets")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tidewater docs"));
}

#[test]
fn test_cli_missing_file() {
    cmd()
        .arg("../../tests/fixtures/nonexistent.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_requires_input() {
    cmd().assert().failure();
}

#[test]
fn test_cli_no_suggestions() {
    let with = json_output(&["-f", "json", &get_fixture_path("wall_of_text.html")]);
    let without = json_output(&["--no-suggestions", "-f", "json", &get_fixture_path("wall_of_text.html")]);

    assert!(!with["suggestions"].as_array().unwrap().is_empty());
    assert!(without["suggestions"].as_array().unwrap().is_empty());
    assert_eq!(with["score"], without["score"]);
}

#[test]
fn test_cli_line_threshold() {
    let strict = json_output(&["-f", "json", &get_fixture_path("wall_of_text.html")]);
    let lenient = json_output(&["--line-threshold", "50", "-f", "json", &get_fixture_path("wall_of_text.html")]);

    assert_eq!(strict["breakdown"]["problemBlocks"], 10);
    assert_eq!(lenient["breakdown"]["problemBlocks"], 0);
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "yaml", &get_fixture_path("well_structured.html")])
        .assert()
        .failure();
}
