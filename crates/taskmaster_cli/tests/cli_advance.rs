use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskmaster-{nanos}-{file_name}"))
}

fn write_store(path: &PathBuf, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": tasks
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn read_store(path: &PathBuf) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn taskmaster(store_path: &PathBuf) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_taskmaster"));
    command
        .env("TASKMASTER_STORE_PATH", store_path)
        .env("TZ", "UTC")
        .env("TASKMASTER_CONFIG_PATH", temp_path("no-config.json"));
    command
}

fn pending_task() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "task-1",
            "title": "write report",
            "completed": false,
            "status": "pending",
            "created_at": "2024-05-01T10:00:00"
        }
    ])
}

#[test]
fn advance_walks_the_full_cycle() {
    let store_path = temp_path("cli-advance-cycle.json");
    write_store(&store_path, pending_task());

    let mut seen = Vec::new();
    for _ in 0..3 {
        let output = taskmaster(&store_path)
            .args(["advance", "task-1"])
            .output()
            .expect("failed to run advance command");
        assert!(output.status.success());
        let stored = read_store(&store_path);
        seen.push((
            stored["tasks"][0]["status"].as_str().unwrap().to_string(),
            stored["tasks"][0]["completed"].as_bool().unwrap(),
        ));
    }
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(
        seen,
        [
            ("in-progress".to_string(), false),
            ("completed".to_string(), true),
            ("pending".to_string(), false),
        ]
    );
    assert_eq!(stored["tasks"][0]["created_at"], "2024-05-01T10:00:00");
}

#[test]
fn advance_with_toggle_strategy_completes_directly() {
    let store_path = temp_path("cli-advance-toggle.json");
    write_store(&store_path, pending_task());

    let output = taskmaster(&store_path)
        .args(["--json", "advance", "task-1", "--strategy", "toggle"])
        .output()
        .expect("failed to run advance command");

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["status"], "completed");
    assert_eq!(parsed["completed"], true);
}

#[test]
fn advance_uses_configured_strategy() {
    let store_path = temp_path("cli-advance-config.json");
    write_store(&store_path, pending_task());

    let output = taskmaster(&store_path)
        .args(["--config-override", "transition=toggle", "advance", "task-1"])
        .output()
        .expect("failed to run advance command");

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    assert_eq!(stored["tasks"][0]["status"], "completed");
}

#[test]
fn advance_rejects_unknown_strategy() {
    let store_path = temp_path("cli-advance-bad-strategy.json");
    write_store(&store_path, pending_task());

    let output = taskmaster(&store_path)
        .args(["advance", "task-1", "--strategy", "flip"])
        .output()
        .expect("failed to run advance command");

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    assert_eq!(stored["tasks"][0]["status"], "pending");
}

#[test]
fn advance_reports_missing_task() {
    let store_path = temp_path("cli-advance-missing.json");
    write_store(&store_path, pending_task());

    let output = taskmaster(&store_path)
        .args(["advance", "task-9"])
        .output()
        .expect("failed to run advance command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task not found"));
}

#[test]
fn corrupt_status_in_store_is_surfaced() {
    let store_path = temp_path("cli-advance-corrupt.json");
    write_store(
        &store_path,
        serde_json::json!([
            { "id": "task-1", "title": "weird", "status": "archived" }
        ]),
    );

    let output = taskmaster(&store_path)
        .args(["advance", "task-1"])
        .output()
        .expect("failed to run advance command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: unknown_status"));
}
