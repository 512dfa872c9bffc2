//! Event bus command handlers.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use hasskit_api::models::EventInfo;

use crate::cli::{EventsArgs, EventsCommand, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Listeners")]
    listeners: u32,
}

impl From<&EventInfo> for EventRow {
    fn from(e: &EventInfo) -> Self {
        Self {
            event: e.event.clone(),
            listeners: e.listener_count,
        }
    }
}

pub async fn handle(
    session: &Session,
    args: EventsArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;

    match args.command {
        EventsCommand::List => {
            let mut events = client.events(cancel).await?;
            events.sort_by(|a, b| a.event.cmp(&b.event));
            let out = output::render_list(
                &global.output,
                &events,
                |e| EventRow::from(e),
                |e| e.event.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EventsCommand::Fire { event_type, data } => {
            let data = util::parse_json_object("data", data.as_deref())?;
            let fired = client.fire_event(&event_type, data.as_ref(), cancel).await?;
            if !global.quiet {
                match fired {
                    Some(fired) => eprintln!("{}", fired.message),
                    None => eprintln!("Event {event_type} fired."),
                }
            }
            Ok(())
        }
    }
}
