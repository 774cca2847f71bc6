mod fixtures;

use fixtures::*;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs::{self, File};
use std::process::Command;
use tempfile::tempdir;

fn sum_dump() -> Command {
    Command::new(assert_cmd::cargo_bin!("sum_dump"))
}

#[test]
fn it_reencodes_records() {
    let sample = messages_sample();
    let expected = fs::read_to_string(&sample).unwrap();

    let mut cmd = sum_dump();
    cmd.args(["-o", "record", sample.to_str().unwrap()]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
}

#[test]
fn it_prints_one_json_event_per_line() {
    let sample = messages_sample();

    let mut cmd = sum_dump();
    cmd.args(["-o", "jsonl", sample.to_str().unwrap()]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["filename"], "/etc/hosts");
    assert_eq!(lines[0]["fields"]["perm"], "100644");
    assert!(lines[0]["fields"].get("mtime").is_none());
    assert_eq!(lines[1]["fields"]["uname"], "alice");
    assert_eq!(lines[2]["fields"]["sha256"], SHA256);
    assert_eq!(lines[3]["deleted"], true);
}

#[test]
fn it_reads_stdin_with_dash() {
    let sample = messages_sample();

    let mut cmd_file = sum_dump();
    cmd_file.args(["-o", "jsonl", sample.to_str().unwrap()]);
    let out_file = cmd_file.output().unwrap();
    assert!(out_file.status.success());

    let mut cmd_stdin = sum_dump();
    cmd_stdin.args(["-o", "jsonl", "-"]);
    cmd_stdin.stdin(File::open(&sample).unwrap());
    let out_stdin = cmd_stdin.output().unwrap();
    assert!(out_stdin.status.success());

    assert_eq!(
        out_stdin.stdout, out_file.stdout,
        "stdin and file input should produce identical output"
    );
}

#[test]
fn it_fails_on_malformed_lines() {
    let sample = malformed_sample();

    let mut cmd = sum_dump();
    cmd.args(["-o", "record", sample.to_str().unwrap()]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn it_skips_malformed_lines_when_asked() {
    let sample = malformed_sample();

    let mut cmd = sum_dump();
    cmd.args([
        "-o",
        "record",
        "--skip-malformed",
        sample.to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("/etc/hosts"))
        .stdout(predicate::str::contains("/etc/broken").not())
        .stdout(predicate::str::contains("-1 /tmp/removed.txt"));
}

#[test]
fn it_respects_labels_file() {
    let d = tempdir().unwrap();
    let labels = d.path().join("labels.json");
    fs::write(&labels, r#"{"perm": "mode"}"#).unwrap();
    let input = d.path().join("input.log");
    fs::write(&input, format!("{} /etc/hosts\n", short_record())).unwrap();

    let mut cmd = sum_dump();
    cmd.args([
        "-o",
        "jsonl",
        "--labels",
        labels.to_str().unwrap(),
        input.to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""mode":"100644""#));
}

#[test]
fn it_respects_output_file() {
    let d = tempdir().unwrap();
    let f = d.path().join("nested").join("out.log");

    let mut cmd = sum_dump();
    cmd.args([
        "-o",
        "record",
        "-f",
        f.to_str().unwrap(),
        messages_sample().to_str().unwrap(),
    ]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    assert!(
        output.stdout.is_empty(),
        "Expected output to be printed to file, but was printed to stdout"
    );
    assert_eq!(
        fs::read_to_string(&f).unwrap(),
        fs::read_to_string(messages_sample()).unwrap()
    );
}

#[test]
fn test_it_refuses_to_overwrite_directory() {
    let d = tempdir().unwrap();

    let mut cmd = sum_dump();
    cmd.args([
        "-f",
        d.path().to_str().unwrap(),
        messages_sample().to_str().unwrap(),
    ]);

    cmd.assert().failure().code(1);
}
