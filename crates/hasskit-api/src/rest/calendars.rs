use chrono::{DateTime, FixedOffset, SecondsFormat};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::{HassClient, require_entity_id, segment, with_query};
use super::models::{CalendarEvent, CalendarInfo};
use crate::error::Error;
use crate::transport::Transport;

impl<T: Transport> HassClient<T> {
    /// List calendar entities.
    ///
    /// `GET /api/calendars`
    pub async fn calendars(&self, cancel: &CancellationToken) -> Result<Vec<CalendarInfo>, Error> {
        debug!("listing calendars");
        let calendars = self.transport().get_json("api/calendars", cancel).await?;
        Ok(calendars.unwrap_or_default())
    }

    /// Events of one calendar between `start` and `end`.
    ///
    /// `GET /api/calendars/{entity_id}?start=..&end=..`
    pub async fn calendar_events(
        &self,
        entity_id: &str,
        start: &DateTime<FixedOffset>,
        end: &DateTime<FixedOffset>,
        cancel: &CancellationToken,
    ) -> Result<Vec<CalendarEvent>, Error> {
        require_entity_id(entity_id)?;
        if end < start {
            return Err(Error::invalid("end", "must not be before start"));
        }
        debug!(entity_id, "listing calendar events");
        let path = with_query(
            format!("api/calendars/{}", segment(entity_id)),
            &[
                ("start", start.to_rfc3339_opts(SecondsFormat::Secs, false)),
                ("end", end.to_rfc3339_opts(SecondsFormat::Secs, false)),
            ],
        );
        let events = self.transport().get_json(&path, cancel).await?;
        Ok(events.unwrap_or_default())
    }
}
