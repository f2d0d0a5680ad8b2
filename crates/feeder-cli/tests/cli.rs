use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn ieee13() -> String {
    repo_path("test_data/feeders/ieee13_lite.json")
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn feeder_graph_stats_runs() {
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["graph", "stats", &ieee13()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes         : 12"))
        .stdout(predicate::str::contains("Source bus    : sourcebus"))
        .stdout(predicate::str::contains("Radial        : yes"));
}

#[test]
fn feeder_graph_islands_emits_assignments() {
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["graph", "islands", &ieee13(), "--emit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Island 0: 12 node(s) (energized)"))
        .stdout(predicate::str::contains("-> island 0"));
}

#[test]
fn feeder_graph_export_writes_dot() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("feeder.dot");
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args([
        "graph",
        "export",
        &ieee13(),
        "-o",
        out.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Output written to"));

    let dot = fs::read_to_string(&out).unwrap();
    assert!(dot.starts_with("graph feeder {"));
    assert!(dot.contains("Line.650632"));
    assert!(dot.contains("shape=box"));
}

#[test]
fn feeder_buses_json_lists_phase_b_buses() {
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    let output = cmd
        .args(["buses", &ieee13(), "--phase", "2", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let voltage = value["voltage"].as_object().unwrap();
    let distance = value["distance"].as_object().unwrap();
    assert_eq!(voltage.len(), 9);
    assert_eq!(distance.len(), 9);
    assert!(!voltage.contains_key("684"));
    assert_eq!(value["phase"], "B");
}

#[test]
fn feeder_buses_plain_table() {
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["buses", &ieee13(), "--phase", "c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BUS"))
        .stdout(predicate::str::contains("611"))
        .stdout(predicate::str::contains("Phase c: 11 bus(es)"))
        .stdout(predicate::str::contains("652").not());
}

#[test]
fn feeder_profile_lists_line_segments() {
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["profile", &ieee13(), "--phase", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FROM"))
        .stdout(predicate::str::contains("Line.684652"))
        .stdout(predicate::str::contains("Line.684611").not());
}

#[test]
fn feeder_elements_lists_loads() {
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["elements", &ieee13(), "--class", "Load"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Load.634a"))
        .stdout(predicate::str::contains("385.000"))
        .stdout(predicate::str::contains("6 Load element(s)"));
}

#[test]
fn feeder_missing_snapshot_fails() {
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["graph", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no snapshot given"));
}

#[test]
fn feeder_unreadable_snapshot_is_solver_unavailable() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["graph", "stats", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("solver unavailable"));
}

#[test]
fn feeder_config_supplies_snapshot_phase_and_output_dir() {
    let tmp = tempdir().unwrap();
    let out_dir = tmp.path().join("output");
    let config = tmp.path().join("feeder.toml");
    fs::write(
        &config,
        format!(
            "[model]\nsnapshot = {:?}\n\n[output]\ndir = {:?}\n\n[analysis]\nphase = \"3\"\n",
            ieee13(),
            out_dir.to_str().unwrap()
        ),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["buses", "--config", config.to_str().unwrap()])
        .assert()
        .success();

    let written = fs::read_to_string(out_dir.join("buses_phase_c.txt")).unwrap();
    assert!(written.contains("611"));
}

#[test]
fn feeder_missing_config_fails() {
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args(["graph", "stats", &ieee13(), "--config", "/no/such/feeder.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading config"));
}

#[test]
fn feeder_log_file_receives_output() {
    let tmp = tempdir().unwrap();
    let log = tmp.path().join("logs").join("log.txt");
    let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
    cmd.args([
        "graph",
        "stats",
        &ieee13(),
        "--log-file",
        log.to_str().unwrap(),
    ])
    .assert()
    .success();

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("loading circuit snapshot"));
}

#[test]
fn feeder_buses_skip_failed_records_bad_bus() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("short.json");
    fs::write(
        &path,
        r#"{"buses": [
            {"name": "good", "nodes": [1], "pu_voltage": [1.0, 0.0], "kv_base": 2.4},
            {"name": "short", "nodes": [1], "pu_voltage": [1.0], "kv_base": 2.4}
        ]}"#,
    )
    .unwrap();

    let mut strict = Command::cargo_bin("feeder-cli").unwrap();
    strict
        .args(["buses", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed terminal data on 'short'"));

    let mut lenient = Command::cargo_bin("feeder-cli").unwrap();
    lenient
        .args(["buses", path.to_str().unwrap(), "--skip-failed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Phase a: 1 bus(es)"))
        .stdout(predicate::str::contains("1 error"))
        .stdout(predicate::str::contains("(short)"));
}

#[test]
fn feeder_profile_skip_failed_records_bad_bus() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("short.json");
    fs::write(
        &path,
        r#"{"buses": [
            {"name": "good", "nodes": [1], "pu_voltage": [1.0, 0.0], "kv_base": 2.4},
            {"name": "short", "nodes": [1], "pu_voltage": [1.0], "kv_base": 2.4}
        ],
        "elements": [{"name": "Line.gs", "bus_names": ["good.1", "short.1"]}]}"#,
    )
    .unwrap();

    let mut strict = Command::cargo_bin("feeder-cli").unwrap();
    strict
        .args(["profile", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed terminal data on 'short'"));

    let mut lenient = Command::cargo_bin("feeder-cli").unwrap();
    lenient
        .args(["profile", path.to_str().unwrap(), "--skip-failed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 line segment(s), 1 bus(es) placed"))
        .stdout(predicate::str::contains("1 error"))
        .stdout(predicate::str::contains("(short)"));
}

#[test]
fn feeder_log_file_appends_across_runs() {
    let tmp = tempdir().unwrap();
    let log = tmp.path().join("nested").join("runs").join("feeder.log");
    for command in ["stats", "islands"] {
        let mut cmd = Command::cargo_bin("feeder-cli").unwrap();
        cmd.args([
            "graph",
            command,
            &ieee13(),
            "--log-file",
            log.to_str().unwrap(),
        ])
        .assert()
        .success();
    }

    let contents = fs::read_to_string(&log).unwrap();
    assert_eq!(contents.matches("loading circuit snapshot").count(), 2);
    assert!(!contents.contains("\u{1b}["));
}
