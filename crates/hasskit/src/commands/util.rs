//! Shared helpers for command handlers.

use std::io::Read;

use chrono::{DateTime, FixedOffset, Local};

use hasskit_api::models::Attributes;

use crate::cli::PeriodArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse an optional `--data` / `--attributes` argument as a JSON object.
pub fn parse_json_object(field: &str, raw: Option<&str>) -> Result<Option<Attributes>, CliError> {
    raw.map(|raw| {
        serde_json::from_str::<Attributes>(raw).map_err(|e| CliError::Validation {
            field: field.into(),
            reason: format!("expected a JSON object: {e}"),
        })
    })
    .transpose()
}

/// Parse an RFC 3339 timestamp argument.
pub fn parse_time(field: &str, raw: &str) -> Result<DateTime<FixedOffset>, CliError> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("expected an RFC 3339 timestamp: {e}"),
    })
}

/// Parse a human duration such as `30m` or `2days`.
pub fn parse_duration(field: &str, raw: &str) -> Result<chrono::Duration, CliError> {
    let invalid = |reason: String| CliError::Validation {
        field: field.into(),
        reason,
    };
    let std = humantime::parse_duration(raw).map_err(|e| invalid(e.to_string()))?;
    chrono::Duration::from_std(std).map_err(|_| invalid("duration out of range".into()))
}

pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Resolve `--start` / `--since` / `--end` into absolute bounds.
pub fn resolve_period(
    period: &PeriodArgs,
) -> Result<(Option<DateTime<FixedOffset>>, Option<DateTime<FixedOffset>>), CliError> {
    let start = match (&period.start, &period.since) {
        (Some(start), _) => Some(parse_time("start", start)?),
        (None, Some(since)) => Some(now() - parse_duration("since", since)?),
        (None, None) => None,
    };
    let end = period
        .end
        .as_deref()
        .map(|end| parse_time("end", end))
        .transpose()?;
    Ok((start, end))
}

/// Return `raw`, or all of stdin when `raw` is `-`.
pub fn read_arg_or_stdin(raw: String) -> Result<String, CliError> {
    if raw != "-" {
        return Ok(raw);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Split `domain.name` into its two halves.
pub fn split_dotted<'a>(field: &str, raw: &'a str) -> Result<(&'a str, &'a str), CliError> {
    raw.split_once('.')
        .filter(|(left, right)| !left.is_empty() && !right.is_empty())
        .ok_or_else(|| CliError::Validation {
            field: field.into(),
            reason: format!("expected domain.name, got '{raw}'"),
        })
}

/// Render a JSON value for a table cell: strings unquoted, the rest as JSON.
pub fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
