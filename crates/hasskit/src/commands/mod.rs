//! Command dispatch: bridges CLI args -> API clients -> output formatting.

pub mod auth;
pub mod calendars;
pub mod events;
pub mod history;
pub mod profile;
pub mod services;
pub mod states;
pub mod system;
pub mod util;
pub mod webhook;

use tokio_util::sync::CancellationToken;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => system::status(session, global, cancel).await,
        Command::Config => system::config(session, global, cancel).await,
        Command::CheckConfig => system::check_config(session, global, cancel).await,
        Command::Template(args) => system::template(session, args, global, cancel).await,
        Command::States(args) => states::handle(session, args, global, cancel).await,
        Command::Services(args) => services::handle(session, args, global, cancel).await,
        Command::Events(args) => events::handle(session, args, global, cancel).await,
        Command::History(args) => history::history(session, args, global, cancel).await,
        Command::Logbook(args) => history::logbook(session, args, global, cancel).await,
        Command::Calendars(args) => calendars::handle(session, args, global, cancel).await,
        Command::Auth(args) => auth::handle(session, args, global, cancel).await,
        Command::Webhook(args) => webhook::handle(session, args, global, cancel).await,
        // Handled in main before a session exists
        Command::Profile(_) | Command::Completions(_) => Ok(()),
    }
}
