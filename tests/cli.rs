use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("npsmap"));
}

#[test]
fn format_subcommand() {
    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.args(["format", "4500000", "--abbrev"]);
    cmd.assert().success().stdout("4.5M\n");

    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.args(["format", "987654"]);
    cmd.assert().success().stdout("987,654\n");
}

#[test]
fn project_subcommand() {
    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.args(["project", "--lon", "-96.6", "--lat", "38.7"]);
    cmd.assert().success().stdout(predicate::function(|out: &str| {
        let xy: Vec<f64> = out.trim().split(',').map(|s| s.parse().unwrap()).collect();
        (xy[0] - 487.5).abs() < 1e-6 && (xy[1] - 305.0).abs() < 1e-6
    }));

    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.args(["project", "--lon", "0", "--lat", "0"]);
    cmd.assert().success().stdout("null\n");
}

#[test]
fn scale_subcommand() {
    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.args(["scale", "--width", "500"]);
    cmd.assert().success().stdout("0.5\n");

    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.arg("scale");
    cmd.assert().success().stdout("1\n");
}

#[test]
fn fetch_from_local_files() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("parks.csv");
    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.arg("fetch")
        .arg("--topology")
        .arg(dir.join("states.json"))
        .arg("--parks")
        .arg(dir.join("parks.csv"))
        .arg("--out")
        .arg(&out)
        .args(["--domain-column", "Visitors", "--stats"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("parks=5 projected=4 unprojected=1"))
        .stdout(predicate::str::contains("Visitors: min=8,495 max=12.9 million"));
    assert!(out.exists());
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn fetch_online_topology() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut cmd = Command::cargo_bin("npsmap").unwrap();
    cmd.arg("fetch").arg("--parks").arg(dir.join("parks.csv")).arg("--stats");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("states="));
}
