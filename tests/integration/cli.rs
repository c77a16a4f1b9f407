use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::{APP, GUAVA_JAR, JUNIT_JAR, sample_records, write_records};

fn bzljvm(workspace: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("bzljvm")?;
    cmd.arg("--quiet").arg("--workspace").arg(workspace.path()).env_remove("BZLJVM_STRICT");
    Ok(cmd)
}

fn json_stdout(cmd: &mut Command) -> Result<serde_json::Value> {
    let output = cmd.assert().success().get_output().stdout.clone();
    Ok(serde_json::from_slice(&output)?)
}

#[test]
fn test_roots_and_leaves_as_json() -> Result<()> {
    let temp = TempDir::new()?;
    let records = write_records(temp.path(), &sample_records())?;

    let roots =
        json_stdout(bzljvm(&temp)?.arg("roots").arg("--records").arg(&records).args(["--format", "json"]))?;
    assert_eq!(roots, serde_json::json!(["//projects/app"]));

    let leaves = json_stdout(
        bzljvm(&temp)?
            .arg("leaves")
            .arg("--records")
            .arg(&records)
            .args(["--format", "json", "--ignore-externals"]),
    )?;
    assert_eq!(leaves, serde_json::json!(["//projects/libs/banana"]));
    Ok(())
}

#[test]
fn test_order_selection() -> Result<()> {
    let temp = TempDir::new()?;
    let records = write_records(temp.path(), &sample_records())?;

    let ordered = json_stdout(bzljvm(&temp)?.arg("order").arg("--records").arg(&records).args([
        "--format",
        "json",
        "//projects/app:app",
        "//projects/libs/banana",
        "//projects/libs/apple:apple-api",
    ]))?;

    assert_eq!(
        ordered,
        serde_json::json!(["//projects/libs/banana", "//projects/libs/apple", "//projects/app"])
    );
    Ok(())
}

#[test]
fn test_order_uses_strategy_from_config_file() -> Result<()> {
    let temp = TempDir::new()?;
    let records = write_records(temp.path(), &sample_records())?;
    std::fs::write(temp.path().join("bzljvm.toml"), "ordering = \"insertion\"\n")?;

    bzljvm(&temp)?
        .arg("order")
        .arg("--records")
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("Insertion"))
        .stdout(predicate::str::contains("//projects/libs/banana"));
    Ok(())
}

#[test]
fn test_cycles_reported() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("cyclic.json");
    std::fs::write(
        &path,
        r#"[
            {"label": "//a:one", "kind": "java_library", "deps": ["//b:two"]},
            {"label": "//b:one", "kind": "java_library", "deps": ["//a:two"]}
        ]"#,
    )?;

    let cycles =
        json_stdout(bzljvm(&temp)?.arg("cycles").arg("--records").arg(&path).args(["--format", "json"]))?;
    assert_eq!(cycles, serde_json::json!([["//a", "//b"]]));

    bzljvm(&temp)?
        .arg("cycles")
        .arg("--records")
        .arg(&path)
        .args(["--target-granularity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependency cycles found"));
    Ok(())
}

#[test]
fn test_classpath_as_json() -> Result<()> {
    let temp = TempDir::new()?;
    let records = write_records(temp.path(), &sample_records())?;

    let classpath = json_stdout(
        bzljvm(&temp)?
            .arg("classpath")
            .arg("--records")
            .arg(&records)
            .args(["--project", "app", "--target", APP, "--target", "//projects/app:app-tests"])
            .args(["--source-dir", "projects/app", "--sibling", "libs=projects/libs"])
            .args(["--format", "json"]),
    )?;

    assert_eq!(classpath["is_complete"], true);
    assert!(classpath["main_entries"].get(GUAVA_JAR).is_some());
    assert!(classpath["main_entries"].get("libs").is_some());
    assert!(classpath["test_entries"].get(JUNIT_JAR).is_some());
    assert_eq!(classpath["project_references"], serde_json::json!(["libs"]));
    // no bazel-bin in the temp workspace, so no runner jar
    assert_eq!(classpath["implicit_deps"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_missing_records_file_fails() -> Result<()> {
    let temp = TempDir::new()?;

    bzljvm(&temp)?
        .arg("roots")
        .arg("--records")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read aspect records"));
    Ok(())
}

#[test]
fn test_invalid_label_fails() -> Result<()> {
    let temp = TempDir::new()?;
    let records = write_records(temp.path(), &sample_records())?;

    bzljvm(&temp)?
        .arg("order")
        .arg("--records")
        .arg(&records)
        .arg("//projects/app:")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid label"));
    Ok(())
}

#[test]
fn test_classpath_rejects_wildcard_target() -> Result<()> {
    let temp = TempDir::new()?;
    let records = write_records(temp.path(), &sample_records())?;

    bzljvm(&temp)?
        .arg("classpath")
        .arg("--records")
        .arg(&records)
        .args(["--project", "app", "--target", "//projects/app:all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wildcard patterns"));
    Ok(())
}

#[test]
fn test_strict_env_rejects_bad_value() -> Result<()> {
    let temp = TempDir::new()?;
    let records = write_records(temp.path(), &sample_records())?;

    bzljvm(&temp)?
        .env("BZLJVM_STRICT", "sometimes")
        .arg("roots")
        .arg("--records")
        .arg(&records)
        .assert()
        .failure()
        .stderr(predicate::str::contains("BZLJVM_STRICT"));
    Ok(())
}
