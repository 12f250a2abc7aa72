//! Plain-text and JSON views of tasks and reports.

use serde_json::{Value, json};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskmaster_core::config::Palette;
use taskmaster_core::error::AppError;
use taskmaster_core::model::{Task, TaskRecord, TaskStatus};
use taskmaster_core::report::Report;
use taskmaster_core::timestamp::format_timestamp;
use time::OffsetDateTime;

pub fn status_label(status: TaskStatus, palette: &Palette) -> String {
    match status {
        TaskStatus::Pending => status.as_str().to_string(),
        TaskStatus::InProgress => palette.accentize(status.as_str()),
        TaskStatus::Completed => palette.mutedize(status.as_str()),
    }
}

fn display_time(value: Option<OffsetDateTime>) -> Result<String, AppError> {
    match value {
        Some(value) => format_timestamp(value),
        None => Ok("-".to_string()),
    }
}

pub fn task_line(task: &Task, now: OffsetDateTime, palette: &Palette) -> Result<String, AppError> {
    let status = if task.is_overdue(now) {
        format!("{} (overdue)", status_label(task.status, palette))
    } else {
        status_label(task.status, palette)
    };
    Ok(format!(
        "{} | {} | {} | {} | {} | {}",
        task.id.as_deref().unwrap_or("-"),
        task.title,
        status,
        display_time(task.created_at)?,
        display_time(task.start_date)?,
        display_time(task.due_date)?,
    ))
}

pub fn task_json(task: &Task, now: OffsetDateTime) -> Result<Value, AppError> {
    let record = task.to_record()?;
    Ok(json!({
        "id": record.id,
        "title": record.title,
        "status": record.status,
        "completed": record.completed,
        "overdue": task.is_overdue(now),
        "created_at": record.created_at,
        "start_date": record.start_date,
        "due_date": record.due_date,
    }))
}

/// Stored form of a task, for records that may not convert to a [`Task`].
pub fn record_json(record: &TaskRecord) -> Result<Value, AppError> {
    serde_json::to_value(record).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn tasks_json(tasks: &[Task], now: OffsetDateTime) -> Result<Value, AppError> {
    let payload = tasks
        .iter()
        .map(|task| task_json(task, now))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(payload))
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Tasks")]
    count: usize,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    label: String,
    #[tabled(rename = "Opened")]
    opened: usize,
    #[tabled(rename = "Closed")]
    closed: usize,
}

pub fn report_plain(report: &Report) -> String {
    let status_rows = TaskStatus::ALL.iter().map(|status| StatusRow {
        status: status.as_str(),
        count: report.distribution.count(*status),
    });
    let month_rows = report.months.iter().map(|bucket| MonthRow {
        label: bucket.label.clone(),
        opened: bucket.opened,
        closed: bucket.closed,
    });

    let mut statuses = Table::new(status_rows);
    statuses.with(Style::rounded());
    let mut months = Table::new(month_rows);
    months.with(Style::rounded());

    format!(
        "Status distribution ({} tasks)\n{}\n\nOpened vs closed\n{}",
        report.distribution.total(),
        statuses,
        months
    )
}

pub fn report_json(report: &Report) -> Result<Value, AppError> {
    let months: Vec<Value> = report
        .months
        .iter()
        .map(|bucket| {
            json!({
                "label": bucket.label,
                "year": bucket.year,
                "month": u8::from(bucket.month),
                "opened": bucket.opened,
                "closed": bucket.closed,
            })
        })
        .collect();

    Ok(json!({
        "generated_at": format_timestamp(report.generated_at)?,
        "distribution": {
            "pending": report.distribution.pending,
            "in-progress": report.distribution.in_progress,
            "completed": report.distribution.completed,
        },
        "months": months,
    }))
}
