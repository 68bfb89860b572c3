use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "rogeo-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_rogeo-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("perfect-run"));
}

#[test]
fn cli_runs_smoke_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_rogeo-tester");
    let output_path = temp_path("smoke.json");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "smoke,wrong-answers",
            "--iterations",
            "2",
            "--seeds",
            "1..3,prontera",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Rogeo Automated Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let results: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = results.as_array().expect("array");
    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_actor_driver_plays_skip_drain() {
    let exe = env!("CARGO_BIN_EXE_rogeo-tester");
    let output_path = temp_path("actor.md");
    let output = Command::new(exe)
        .args([
            "--driver",
            "actor",
            "--report",
            "markdown",
            "--scenarios",
            "skip-drain",
            "--iterations",
            "1",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("# Rogeo Logic Test Results"));
    assert!(content.contains("| Skip Drain | actor | 1337 |"));
}

#[test]
fn cli_rejects_a_missing_catalog() {
    let exe = env!("CARGO_BIN_EXE_rogeo-tester");
    let output = Command::new(exe)
        .args(["--catalog"])
        .arg(temp_path("no-such-catalog.json"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read catalog"));
}
