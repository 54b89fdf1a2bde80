use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fieldlog(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fieldlog").unwrap();
    cmd.env("FIELDLOG_DATA_DIR", data_dir.path())
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY")
        .env_remove("FIELDLOG_ACCESS_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn init_creates_settings() {
    let dir = TempDir::new().unwrap();

    fieldlog(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized fieldlog"));

    assert!(dir.path().join("config.json").exists());

    fieldlog(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn config_masks_secrets() {
    let dir = TempDir::new().unwrap();

    fieldlog(&dir)
        .env("SUPABASE_ANON_KEY", "anon-key-abcd1234")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("****1234"))
        .stdout(predicate::str::contains("anon-key-abcd1234").not());
}

#[test]
fn set_field_records_audit_entry() {
    let dir = TempDir::new().unwrap();

    fieldlog(&dir)
        .args(["draft", "set", "ditching", "rpt-1", "specified_depth", "1.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Recorded change to Specified Depth: (empty) -> 1.2",
        ));

    fieldlog(&dir)
        .args(["draft", "set", "ditching", "rpt-1", "specified_depth", "1.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No change recorded."));

    fieldlog(&dir)
        .args(["audit", "list", "--entity-id", "rpt-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Specified Depth"))
        .stdout(predicate::str::contains("(empty)"));

    fieldlog(&dir)
        .args(["audit", "list", "--long"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EDIT DitchLog rpt-1"))
        .stdout(predicate::str::contains("Specified Depth: (empty) -> 1.2"));

    fieldlog(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Audit entries:  1"));

    fieldlog(&dir)
        .args(["draft", "show", "ditching", "rpt-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DitchLog"));
}

#[test]
fn entries_and_export() {
    let dir = TempDir::new().unwrap();

    fieldlog(&dir)
        .args(["draft", "add-entry", "tie-in", "rpt-5", "welds", "--label", "Weld W-12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Weld W-12 (Weld)"));

    let output = dir.path().join("audit.csv");
    fieldlog(&dir)
        .args(["audit", "export"])
        .arg(&output)
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 audit entries"));

    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("ID,Timestamp,Entity Type"));
    assert!(csv.contains("TieInLog"));
    assert!(csv.contains("Weld W-12"));
    assert!(csv.contains("create"));
}

#[test]
fn rejects_bad_input() {
    let dir = TempDir::new().unwrap();

    fieldlog(&dir)
        .args(["draft", "set", "pigging", "rpt-1", "x", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log kind"));

    fieldlog(&dir)
        .args(["draft", "set", "ditching", "rpt-1", "depth_variance", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("computed"));

    fieldlog(&dir)
        .args(["draft", "set", "ditching", "rpt-1", "soft_spots", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("list of entries"));

    fieldlog(&dir)
        .args(["draft", "remove-entry", "ditching", "rpt-1", "soft_spots", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entry not found"));
}

#[test]
fn supabase_backend_without_url_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "backend": "supabase" }"#,
    )
    .unwrap();

    fieldlog(&dir)
        .args(["draft", "submit", "grading", "rpt-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no URL configured"));
}
