//! Command-line behavior of the `clipmerge` binary

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_inputs(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, b"not really audio").unwrap();
            path
        })
        .collect()
}

fn clipmerge(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("clipmerge").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .arg("--log-level")
        .arg("error");
    cmd
}

fn plan_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn test_plan_prints_fast_path_plan() {
    let dir = TempDir::new().unwrap();
    let inputs = write_inputs(dir.path(), &["one.mp3", "two.wav"]);

    let output = clipmerge(&dir)
        .arg("plan")
        .arg("-i")
        .arg(&inputs[0])
        .arg("-i")
        .arg(&inputs[1])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan = plan_json(&output.stdout);
    assert_eq!(plan["kind"], "audio");
    assert_eq!(plan["needs_per_clip_processing"], false);
    assert_eq!(plan["manifest"], "file 'input_00.mp3'\nfile 'input_01.wav'");
    assert_eq!(plan["clip_ops"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_plan_with_edit_processes_every_clip() {
    let dir = TempDir::new().unwrap();
    let inputs = write_inputs(dir.path(), &["a.mp4", "b.mov"]);

    let output = clipmerge(&dir)
        .args(["plan", "--kind", "video", "--edit", "2=0:05,0:15,1,1"])
        .arg("-i")
        .arg(&inputs[0])
        .arg("-i")
        .arg(&inputs[1])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan = plan_json(&output.stdout);
    assert_eq!(plan["needs_per_clip_processing"], true);
    assert_eq!(plan["clip_ops"].as_array().map(Vec::len), Some(2));
    assert_eq!(plan["manifest"], "file 'clip_00.mp4'\nfile 'clip_01.mp4'");
}

#[test]
fn test_merge_rejects_single_file() {
    let dir = TempDir::new().unwrap();
    let inputs = write_inputs(dir.path(), &["only.mp3"]);

    clipmerge(&dir)
        .arg("merge")
        .arg("-i")
        .arg(&inputs[0])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select at least two files."));
}

#[test]
fn test_invalid_clip_setting_is_reported() {
    let dir = TempDir::new().unwrap();
    let inputs = write_inputs(dir.path(), &["a.mp3", "b.mp3"]);

    clipmerge(&dir)
        .args(["plan", "--edit", "1=10,5"])
        .arg("-i")
        .arg(&inputs[0])
        .arg("-i")
        .arg(&inputs[1])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Clip 1: End time must be greater than start time.",
        ));
}

#[test]
fn test_edit_out_of_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    let inputs = write_inputs(dir.path(), &["a.mp3", "b.mp3"]);

    clipmerge(&dir)
        .args(["plan", "--edit", "3=1"])
        .arg("-i")
        .arg(&inputs[0])
        .arg("-i")
        .arg(&inputs[1])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Edit refers to clip 3"));
}

#[test]
fn test_missing_input_is_reported() {
    let dir = TempDir::new().unwrap();

    clipmerge(&dir)
        .args(["plan", "-i", "does-not-exist.mp3", "-i", "nor-this.mp3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file does not exist"));
}

#[test]
fn test_wrong_kind_selection_is_rejected() {
    let dir = TempDir::new().unwrap();
    let inputs = write_inputs(dir.path(), &["a.txt", "b.txt"]);

    clipmerge(&dir)
        .arg("plan")
        .arg("-i")
        .arg(&inputs[0])
        .arg("-i")
        .arg(&inputs[1])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select audio files only."));
}

#[test]
fn test_edit_follows_input_order_with_skipped_files() {
    let dir = TempDir::new().unwrap();
    let inputs = write_inputs(dir.path(), &["a.mp3", "notes.txt", "b.mp3"]);

    let output = clipmerge(&dir)
        .args(["plan", "--edit", "3=5"])
        .arg("-i")
        .arg(&inputs[0])
        .arg("-i")
        .arg(&inputs[1])
        .arg("-i")
        .arg(&inputs[2])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan = plan_json(&output.stdout);
    assert_eq!(plan["clip_ops"][0]["args"][0], "-i");
    assert_eq!(plan["clip_ops"][1]["args"][0], "-ss");
    assert_eq!(plan["clip_ops"][1]["args"][1], "5");
    assert_eq!(plan["clip_ops"][1]["args"][3], "input_01.mp3");
}

#[test]
fn test_edit_on_skipped_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let inputs = write_inputs(dir.path(), &["a.mp3", "notes.txt", "b.mp3"]);

    clipmerge(&dir)
        .args(["plan", "--edit", "2=5"])
        .arg("-i")
        .arg(&inputs[0])
        .arg("-i")
        .arg(&inputs[1])
        .arg("-i")
        .arg(&inputs[2])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Edit refers to clip 2 (notes.txt), which is not an accepted audio file",
        ));
}
