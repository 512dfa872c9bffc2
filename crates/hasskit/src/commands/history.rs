//! History and logbook command handlers.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use hasskit_api::models::{Attributes, HistoryEntry, LogbookEntry};
use hasskit_api::{HistoryQuery, LogbookQuery};

use crate::cli::{GlobalOpts, HistoryArgs, LogbookArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── History ─────────────────────────────────────────────────────────

/// One state change with its entity id filled in.
///
/// Minimal responses only name the entity on its first entry.
#[derive(Debug, Serialize)]
struct HistoryRecord {
    entity_id: String,
    state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<Attributes>,
    last_changed: DateTime<FixedOffset>,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Changed")]
    changed: String,
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(r: &HistoryRecord) -> Self {
        Self {
            changed: r.last_changed.format(TIME_FORMAT).to_string(),
            entity_id: r.entity_id.clone(),
            state: r.state.clone(),
        }
    }
}

fn flatten(series: Vec<Vec<HistoryEntry>>) -> Vec<HistoryRecord> {
    let mut records = Vec::new();
    for entries in series {
        let mut entity_id = String::new();
        for entry in entries {
            if let Some(id) = entry.entity_id {
                entity_id = id;
            }
            records.push(HistoryRecord {
                entity_id: entity_id.clone(),
                state: entry.state,
                attributes: entry.attributes,
                last_changed: entry.last_changed,
            });
        }
    }
    records
}

pub async fn history(
    session: &Session,
    args: HistoryArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;
    let (start, end) = util::resolve_period(&args.period)?;

    let query = HistoryQuery {
        start,
        end,
        entity_ids: args.entities,
        minimal_response: args.minimal,
        no_attributes: args.no_attributes,
        significant_changes_only: args.significant_only.then_some(true),
    };

    let records = flatten(client.history(&query, cancel).await?);
    let out = output::render_list(
        &global.output,
        &records,
        |r| HistoryRow::from(r),
        |r| format!("{}\t{}\t{}", r.last_changed.to_rfc3339(), r.entity_id, r.state),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Logbook ─────────────────────────────────────────────────────────

#[derive(Tabled)]
struct LogbookRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&LogbookEntry> for LogbookRow {
    fn from(e: &LogbookEntry) -> Self {
        let message = e
            .message
            .clone()
            .or_else(|| e.state.as_ref().map(|s| format!("changed to {s}")))
            .unwrap_or_default();
        Self {
            when: e.when.format(TIME_FORMAT).to_string(),
            name: e.name.clone(),
            message,
        }
    }
}

pub async fn logbook(
    session: &Session,
    args: LogbookArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;
    let (start, end) = util::resolve_period(&args.period)?;

    let query = LogbookQuery {
        start,
        end,
        entity: args.entity,
    };

    let entries = client.logbook(&query, cancel).await?;
    let out = output::render_list(
        &global.output,
        &entries,
        |e| LogbookRow::from(e),
        |e| format!("{}\t{}", e.when.to_rfc3339(), e.name),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_flatten_carries_entity_id_forward() {
        let series: Vec<Vec<HistoryEntry>> = serde_json::from_value(json!([
            [
                {
                    "entity_id": "sensor.temp",
                    "state": "20.5",
                    "attributes": { "unit_of_measurement": "°C" },
                    "last_changed": "2025-11-20T08:00:00+00:00"
                },
                { "state": "21.0", "last_changed": "2025-11-20T09:00:00+00:00" }
            ],
            [
                {
                    "entity_id": "light.kitchen",
                    "state": "on",
                    "last_changed": "2025-11-20T08:30:00+00:00"
                }
            ]
        ]))
        .unwrap();

        let records = flatten(series);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].entity_id, "sensor.temp");
        assert_eq!(records[1].state, "21.0");
        assert!(records[1].attributes.is_none());
        assert_eq!(records[2].entity_id, "light.kitchen");
    }
}
