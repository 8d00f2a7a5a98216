use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

/// Run the CLI binary with arguments.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pollcache"));
    cmd.args(args);
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str]) -> String {
    let output = run_cli(args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_failure(args: &[&str]) -> String {
    let output = run_cli(args);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Write `contents` to `name` inside `dir`.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}

/// A fixture of `count` votes for optA, one vote for optB, and one answer.
///
/// Option votes are one minute apart; v1 is the oldest.
pub fn sample_fixture(count: usize) -> String {
    let mut votes: Vec<Value> = (1..=count)
        .map(|i| {
            serde_json::json!({
                "id": format!("v{}", i),
                "option_id": "optA",
                "user_id": format!("user{}", i),
                "created_at": format!("2024-05-01T10:{:02}:00Z", i),
            })
        })
        .collect();
    votes.push(serde_json::json!({
        "id": "b1",
        "option_id": "optB",
        "created_at": "2024-05-01T09:00:00Z",
    }));
    votes.push(serde_json::json!({
        "id": "a1",
        "answer_text": "tacos",
        "is_answer": true,
        "created_at": "2024-05-01T08:00:00Z",
    }));
    serde_json::json!({ "votes": votes }).to_string()
}

/// Parse the JSON snapshots printed on stdout, one per line.
pub fn snapshots(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

/// Ids of the items in a JSON snapshot.
pub fn item_ids(snapshot: &Value) -> Vec<String> {
    snapshot["items"]
        .as_array()
        .expect("snapshot has no items")
        .iter()
        .map(|item| item["id"].as_str().unwrap_or_default().to_string())
        .collect()
}
