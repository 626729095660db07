use fs2::FileExt;
use predicates::prelude::*;
use std::fs::{self, OpenOptions};
use tempfile::tempdir;

use test_helpers::base_devjournal_command;

#[test]
fn test_append_fails_fast_while_journal_is_locked() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let lock_path = temp_dir.path().join(".devjournal.lock");
    let holder = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)?;
    holder.try_lock_exclusive()?;

    let output = base_devjournal_command(temp_dir.path())
        .args(["new", "--worked-on", "blocked"])
        .output()?;

    assert!(
        !output.status.success(),
        "new should fail while another process holds the lock"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("another process"),
        "stderr should explain the lock conflict, got: {}",
        stderr
    );
    // The error is reported once, not once per layer.
    assert_eq!(stderr.matches("Error: ").count(), 1);

    let period_files = fs::read_dir(temp_dir.path())?
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().map_or(false, |ext| ext == "md"))
        .count();
    assert_eq!(period_files, 0);

    holder.unlock()?;
    base_devjournal_command(temp_dir.path())
        .args(["new", "--worked-on", "unblocked"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_reads_ignore_the_lock() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    base_devjournal_command(temp_dir.path())
        .args(["new", "--worked-on", "readable"])
        .assert()
        .success();

    let holder = OpenOptions::new()
        .create(true)
        .write(true)
        .open(temp_dir.path().join(".devjournal.lock"))?;
    holder.try_lock_exclusive()?;

    base_devjournal_command(temp_dir.path())
        .args(["search", "readable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 matches."));
    base_devjournal_command(temp_dir.path())
        .arg("stats")
        .assert()
        .success();

    holder.unlock()?;
    Ok(())
}

#[test]
fn test_sequential_appends_all_land() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    for i in 0..5 {
        base_devjournal_command(temp_dir.path())
            .args(["new", "--worked-on", format!("task {}", i).as_str()])
            .assert()
            .success();
    }

    let output = base_devjournal_command(temp_dir.path())
        .args(["stats", "--json"])
        .output()?;
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["total_entries"], 5);
    Ok(())
}
