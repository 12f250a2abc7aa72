//! Timestamp parsing for the shapes the task backend and the CLI produce.
//!
//! The backend serializes naive ISO date-times (no offset), browsers send
//! `datetime-local` values without seconds, and stored records use RFC 3339.
//! Naive values are wall-clock time of whoever wrote them, so callers pass the
//! offset to read them in.

use crate::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// The machine's current UTC offset, or UTC when it cannot be determined.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn parse_timestamp(raw: &str, naive_offset: UtcOffset) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("timestamp is required"));
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed);
    }

    let normalized = trimmed.replacen(' ', "T", 1);
    if let Ok(parsed) = PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
    ) {
        return Ok(parsed.assume_offset(naive_offset));
    }

    if let Ok(parsed) = PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ) {
        return Ok(parsed.assume_offset(naive_offset));
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_offset(naive_offset))
        .map_err(|_| AppError::invalid_data(format!("unrecognized timestamp '{trimmed}'")))
}

pub fn parse_optional(
    raw: Option<&str>,
    naive_offset: UtcOffset,
) -> Result<Option<OffsetDateTime>, AppError> {
    match raw {
        Some(value) if !value.trim().is_empty() => parse_timestamp(value, naive_offset).map(Some),
        _ => Ok(None),
    }
}

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
