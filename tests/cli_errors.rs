use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_disapproval-report"))
}

#[test]
fn malformed_config_is_reported_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[report\nsubject_prefix = ").unwrap();

    let out = cmd()
        .arg("--config")
        .arg(&path)
        .args(["run", "--preview"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("parsing config TOML"))
        .stderr(contains("bad.toml"))
        .get_output()
        .clone();
    assert!(!out.stderr.is_empty());
}

#[test]
fn missing_config_file_is_reported_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("doctor")
        .assert()
        .failure()
        .stderr(contains("reading config"));
}

#[test]
fn doctor_lists_groups_for_the_example_config() {
    cmd()
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["--config", "disapproval-report.example.toml", "doctor"])
        .assert()
        .success()
        .stdout(contains("123-456-7890"))
        .stdout(contains("LabelNames CONTAINS 'Agency O\\\\'Neill'"));
}
