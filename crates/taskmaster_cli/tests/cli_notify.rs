use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

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

#[test]
fn notify_command_json_outputs_overdue_tasks() {
    let exe = env!("CARGO_BIN_EXE_taskmaster");
    let store_path = temp_path("cli-notify.json");
    let past = (OffsetDateTime::now_utc() - Duration::days(1))
        .format(&Rfc3339)
        .unwrap();

    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": "task-1",
                "title": "overdue",
                "status": "pending",
                "created_at": "2024-05-01T10:00:00",
                "due_date": past
            },
            {
                "id": "task-2",
                "title": "no deadline",
                "status": "in-progress",
                "created_at": "2024-05-01T10:00:00"
            },
            {
                "id": "task-3",
                "title": "completed",
                "status": "completed",
                "created_at": "2024-05-01T10:00:00",
                "due_date": past
            }
        ]),
    );

    let output = Command::new(exe)
        .args(["--json", "notify"])
        .env("TASKMASTER_STORE_PATH", &store_path)
        .env("TZ", "UTC")
        .env("TASKMASTER_CONFIG_PATH", temp_path("no-config.json"))
        .env("TASKMASTER_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run notify command");

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    let tasks = parsed.as_array().expect("array");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], "task-1");
}

#[test]
fn notify_command_without_overdue_tasks() {
    let exe = env!("CARGO_BIN_EXE_taskmaster");
    let store_path = temp_path("cli-notify-none.json");
    write_store(&store_path, serde_json::json!([]));

    let output = Command::new(exe)
        .args(["notify"])
        .env("TASKMASTER_STORE_PATH", &store_path)
        .env("TASKMASTER_CONFIG_PATH", temp_path("no-config.json"))
        .env("TASKMASTER_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run notify command");

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No overdue tasks."));
}
