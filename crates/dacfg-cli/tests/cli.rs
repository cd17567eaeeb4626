//! CLI command integration tests.
//! Each test writes its experiment file into a temp directory and points
//! SIM_STORAGE there for isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TWO_METHODS: &str = r#"
[[config]]
driver = "EnKF"
ensemble-size = 10
inflation = 1.02

[[config]]
driver = "PartFilt"
ensemble-size = 100
NER = 0.4
"#;

const WITH_SETUP: &str = r#"
[setup]
name = "Lorenz84/pajonk2012.py"
dt = 0.05
t_end = 10.0
f = { m = 3 }
h = { m = 3, noise = { variance = 0.01 } }

[[config]]
driver = "EnKF"
secondary = "Sqrt"
ensemble-size = 10

[[config]]
driver = "EnKF"
secondary = "PertObs"
ensemble-size = 10
"#;

fn dacfg_cmd(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("dacfg").unwrap();
    cmd.env("SIM_STORAGE", dir.path());
    cmd
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn names_without_padding() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "bench.toml", TWO_METHODS);

    let output = dacfg_cmd(&dir)
        .arg("names")
        .arg(&file)
        .arg("--no-pad")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines, vec!["EnKF ene:10 inn:1.02", "PartFilt ene:100 NER:0.4"]);
}

#[test]
fn padded_names_share_a_width() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "bench.toml", TWO_METHODS);

    let output = dacfg_cmd(&dir).arg("names").arg(&file).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let widths: Vec<_> = stdout.lines().map(|l| l.chars().count()).collect();
    assert_eq!(widths.len(), 2);
    assert_eq!(widths[0], widths[1]);
    assert!(stdout.starts_with("EnKF     ene:10 "));
}

#[test]
fn table_lists_distinct_and_shared() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "bench.toml", WITH_SETUP);

    dacfg_cmd(&dir)
        .arg("table")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("update-algorithm\n"))
        .stdout(predicate::str::contains("PertObs"))
        .stdout(predicate::str::contains(
            "All: {driver: EnKF, ensemble-size: 10}",
        ));
}

#[test]
fn show_prints_each_record() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "bench.toml", TWO_METHODS);

    dacfg_cmd(&dir)
        .arg("show")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("ConfigRecord(EnKF"))
        .stdout(predicate::str::contains("ConfigRecord(PartFilt"));
}

#[test]
fn export_writes_readable_report() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "bench.toml", TWO_METHODS);
    let out = dir.path().join("report.json");

    dacfg_cmd(&dir)
        .arg("export")
        .arg(&file)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 2 configs"));

    let json = std::fs::read_to_string(&out).unwrap();
    let partition = dacfg_core::import_json(&json).unwrap();
    let keys: Vec<_> = partition.distinct.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["driver", "ensemble-size", "inflation", "NER"]);
    assert!(partition.common.is_empty());
}

#[test]
fn sim_path_uses_storage_root() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "bench.toml", WITH_SETUP);

    let output = dacfg_cmd(&dir)
        .arg("sim-path")
        .arg(&file)
        .args(["--seed", "3", "--host", "node1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);

    let sims = dir.path().join("bench").join("sims");
    let expected = sims.join("HMM=pajonk2012 dt=0.05 T=10 dkObs=1 Sqrt h=node1 sd=3.json");
    assert_eq!(lines[0], expected.display().to_string());
    assert!(lines[1].ends_with("PertObs h=node1 sd=3.json"));
}

#[test]
fn sim_path_requires_setup() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "bench.toml", TWO_METHODS);

    dacfg_cmd(&dir)
        .arg("sim-path")
        .arg(&file)
        .args(["--seed", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no [setup] section"));
}

#[test]
fn missing_file_fails_with_context() {
    let dir = TempDir::new().unwrap();

    dacfg_cmd(&dir)
        .arg("show")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn invalid_config_reports_error() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "bad.toml", "[[config]]\nensemble-size = 3\n");

    dacfg_cmd(&dir)
        .arg("names")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing driver"));
}
