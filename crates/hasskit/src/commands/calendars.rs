//! Calendar command handlers.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use hasskit_api::models::{CalendarEvent, CalendarEventTime, CalendarInfo};

use crate::cli::{CalendarsArgs, CalendarsCommand, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CalendarRow {
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&CalendarInfo> for CalendarRow {
    fn from(c: &CalendarInfo) -> Self {
        Self {
            entity_id: c.entity_id.clone(),
            name: c.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl From<&CalendarEvent> for EventRow {
    fn from(e: &CalendarEvent) -> Self {
        Self {
            start: boundary(&e.start),
            end: boundary(&e.end),
            summary: e.summary.clone(),
            location: e.location.clone().unwrap_or_default(),
        }
    }
}

/// Timed boundaries print with their time, all-day ones as a bare date.
fn boundary(time: &CalendarEventTime) -> String {
    match (time.date_time, time.date) {
        (Some(at), _) => at.format("%Y-%m-%d %H:%M").to_string(),
        (None, Some(date)) => date.to_string(),
        (None, None) => String::new(),
    }
}

pub async fn handle(
    session: &Session,
    args: CalendarsArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;

    match args.command {
        CalendarsCommand::List => {
            let calendars = client.calendars(cancel).await?;
            let out = output::render_list(
                &global.output,
                &calendars,
                |c| CalendarRow::from(c),
                |c| c.entity_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CalendarsCommand::Events {
            entity_id,
            start,
            window,
        } => {
            let start = match start {
                Some(ref raw) => util::parse_time("start", raw)?,
                None => util::now(),
            };
            let end = start + util::parse_duration("window", &window)?;
            let events = client
                .calendar_events(&entity_id, &start, &end, cancel)
                .await?;
            let out = output::render_list(
                &global.output,
                &events,
                |e| EventRow::from(e),
                |e| e.summary.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
