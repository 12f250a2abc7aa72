//! Aggregate views over a task collection.
//!
//! Everything here is a pure function of its arguments. The reference instant
//! is always passed in; nothing reads the clock.

use crate::error::AppError;
use crate::model::{Task, TaskRecord, TaskStatus};
use crate::timestamp::parse_optional;
use time::{Month, OffsetDateTime, UtcOffset};

pub const DEFAULT_WINDOW_SIZE: usize = 6;
/// Upper bound on `window_size`; a century of months.
pub const MAX_WINDOW_SIZE: usize = 1200;

/// Something the aggregator can count.
pub trait ReportItem {
    fn report_status(&self) -> Result<TaskStatus, AppError>;

    /// Creation time, with offset-less values read in `naive_offset`.
    fn report_created_at(
        &self,
        naive_offset: UtcOffset,
    ) -> Result<Option<OffsetDateTime>, AppError>;
}

impl ReportItem for Task {
    fn report_status(&self) -> Result<TaskStatus, AppError> {
        Ok(self.status)
    }

    fn report_created_at(
        &self,
        _naive_offset: UtcOffset,
    ) -> Result<Option<OffsetDateTime>, AppError> {
        Ok(self.created_at)
    }
}

impl ReportItem for TaskRecord {
    fn report_status(&self) -> Result<TaskStatus, AppError> {
        self.parsed_status()
    }

    fn report_created_at(
        &self,
        naive_offset: UtcOffset,
    ) -> Result<Option<OffsetDateTime>, AppError> {
        parse_optional(self.created_at.as_deref(), naive_offset)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusDistribution {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusDistribution {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: Month,
    pub label: String,
    pub opened: usize,
    pub closed: usize,
}

impl MonthlyBucket {
    fn empty(year: i32, month: Month) -> Self {
        let name = month.to_string();
        Self {
            year,
            month,
            label: format!("{} {}", &name[..3], year),
            opened: 0,
            closed: 0,
        }
    }

    fn matches(&self, year: i32, month: Month) -> bool {
        self.year == year && self.month == month
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub generated_at: OffsetDateTime,
    pub distribution: StatusDistribution,
    pub months: Vec<MonthlyBucket>,
}

pub fn distribute<T: ReportItem>(tasks: &[T]) -> Result<StatusDistribution, AppError> {
    let mut distribution = StatusDistribution::default();
    for task in tasks {
        match task.report_status()? {
            TaskStatus::Pending => distribution.pending += 1,
            TaskStatus::InProgress => distribution.in_progress += 1,
            TaskStatus::Completed => distribution.completed += 1,
        }
    }
    Ok(distribution)
}

/// Opened/closed counts for the `window_size` calendar months ending at the
/// month of `reference`, oldest first.
///
/// Creation times are bucketed in `reference`'s UTC offset, and offset-less
/// creation times are read in that offset. Tasks without a creation time, or
/// created outside the window, are not counted.
pub fn monthly_series<T: ReportItem>(
    tasks: &[T],
    reference: OffsetDateTime,
    window_size: usize,
) -> Result<Vec<MonthlyBucket>, AppError> {
    if window_size == 0 || window_size > MAX_WINDOW_SIZE {
        return Err(AppError::invalid_argument(format!(
            "window size must be between 1 and {MAX_WINDOW_SIZE}"
        )));
    }

    let offset = reference.offset();
    let mut buckets = month_window(reference, window_size);

    for task in tasks {
        // Instants that cannot be shown in `offset` sit at the edge of the
        // representable range, far outside any window.
        let created_at = match task.report_created_at(offset)? {
            Some(value) => match value.checked_to_offset(offset) {
                Some(local) => local,
                None => continue,
            },
            None => continue,
        };

        let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| bucket.matches(created_at.year(), created_at.month()))
        else {
            continue;
        };

        bucket.opened += 1;
        if task.report_status()? == TaskStatus::Completed {
            bucket.closed += 1;
        }
    }

    Ok(buckets)
}

pub fn summarize<T: ReportItem>(
    tasks: &[T],
    reference: OffsetDateTime,
    window_size: usize,
) -> Result<Report, AppError> {
    Ok(Report {
        generated_at: reference,
        distribution: distribute(tasks)?,
        months: monthly_series(tasks, reference, window_size)?,
    })
}

fn month_window(reference: OffsetDateTime, window_size: usize) -> Vec<MonthlyBucket> {
    let mut year = reference.year();
    let mut month = reference.month();
    let mut buckets = Vec::new();

    for _ in 0..window_size {
        buckets.push(MonthlyBucket::empty(year, month));
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    buckets.reverse();
    buckets
}
