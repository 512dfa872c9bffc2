// History and logbook
//
// Both endpoints take the period start as an optional path segment and the
// rest as query parameters.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::{HassClient, require_entity_id, segment, with_query};
use super::models::{HistoryEntry, LogbookEntry};
use crate::error::Error;
use crate::transport::Transport;

/// Filters for `GET /api/history/period`.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Period start. The server defaults to one day ago.
    pub start: Option<DateTime<FixedOffset>>,
    /// Period end. The server defaults to one day after `start`.
    pub end: Option<DateTime<FixedOffset>>,
    /// Limit the result to these entities.
    pub entity_ids: Vec<String>,
    pub minimal_response: bool,
    pub no_attributes: bool,
    pub significant_changes_only: Option<bool>,
}

impl HistoryQuery {
    pub fn entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_ids.push(entity_id.into());
        self
    }

    pub(crate) fn path(&self) -> Result<String, Error> {
        for entity_id in &self.entity_ids {
            require_entity_id(entity_id)?;
        }

        let mut path = "api/history/period".to_owned();
        if let Some(start) = &self.start {
            path = format!("{path}/{}", segment(&timestamp(start)));
        }

        let mut params = Vec::new();
        if !self.entity_ids.is_empty() {
            params.push(("filter_entity_id", self.entity_ids.join(",")));
        }
        if let Some(end) = &self.end {
            params.push(("end_time", timestamp(end)));
        }
        if self.minimal_response {
            params.push(("minimal_response", String::new()));
        }
        if self.no_attributes {
            params.push(("no_attributes", String::new()));
        }
        if let Some(significant) = self.significant_changes_only {
            params.push(("significant_changes_only", flag(significant)));
        }
        Ok(with_query(path, &params))
    }
}

/// Filters for `GET /api/logbook`.
#[derive(Debug, Clone, Default)]
pub struct LogbookQuery {
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub entity: Option<String>,
}

impl LogbookQuery {
    pub(crate) fn path(&self) -> Result<String, Error> {
        if let Some(entity) = &self.entity {
            require_entity_id(entity)?;
        }

        let mut path = "api/logbook".to_owned();
        if let Some(start) = &self.start {
            path = format!("{path}/{}", segment(&timestamp(start)));
        }

        let mut params = Vec::new();
        if let Some(entity) = &self.entity {
            params.push(("entity", entity.clone()));
        }
        if let Some(end) = &self.end {
            params.push(("end_time", timestamp(end)));
        }
        Ok(with_query(path, &params))
    }
}

fn timestamp(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_owned()
}

impl<T: Transport> HassClient<T> {
    /// State history, one inner list per entity.
    ///
    /// `GET /api/history/period/{start}`
    pub async fn history(
        &self,
        query: &HistoryQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<HistoryEntry>>, Error> {
        let path = query.path()?;
        debug!(entities = query.entity_ids.len(), "fetching history");
        let history = self.transport().get_json(&path, cancel).await?;
        Ok(history.unwrap_or_default())
    }

    /// Logbook entries, oldest first.
    ///
    /// `GET /api/logbook/{start}`
    pub async fn logbook(
        &self,
        query: &LogbookQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<LogbookEntry>, Error> {
        let path = query.path()?;
        debug!(entity = ?query.entity, "fetching logbook");
        let entries = self.transport().get_json(&path, cancel).await?;
        Ok(entries.unwrap_or_default())
    }
}
