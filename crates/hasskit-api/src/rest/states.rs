// States, services and events
//
// `api/states`, `api/services` and `api/events` endpoint groups.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::{HassClient, require_entity_id, require_segment, segment};
use super::models::{Attributes, EntityState, EventFired, EventInfo, ServiceDomain, StateUpdate};
use crate::error::Error;
use crate::transport::Transport;

impl<T: Transport> HassClient<T> {
    /// List every entity's current state.
    ///
    /// `GET /api/states`
    pub async fn states(&self, cancel: &CancellationToken) -> Result<Vec<EntityState>, Error> {
        debug!("listing states");
        let states = self.transport().get_json("api/states", cancel).await?;
        Ok(states.unwrap_or_default())
    }

    /// Fetch one entity's state. `Ok(None)` when the entity does not exist.
    ///
    /// `GET /api/states/{entity_id}`
    pub async fn state(
        &self,
        entity_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<EntityState>, Error> {
        require_entity_id(entity_id)?;
        debug!(entity_id, "fetching state");
        self.transport()
            .get_json(&format!("api/states/{}", segment(entity_id)), cancel)
            .await
    }

    /// Create or overwrite an entity's state representation.
    ///
    /// `POST /api/states/{entity_id}`. This only changes what Home Assistant
    /// reports; it does not talk to the device.
    pub async fn set_state(
        &self,
        entity_id: &str,
        update: &StateUpdate,
        cancel: &CancellationToken,
    ) -> Result<EntityState, Error> {
        require_entity_id(entity_id)?;
        debug!(entity_id, state = %update.state, "setting state");
        let path = format!("api/states/{}", segment(entity_id));
        self.transport()
            .post_json(&path, Some(update), cancel)
            .await?
            .ok_or_else(|| Error::Deserialization {
                message: format!("empty response from POST {path}"),
                body: String::new(),
            })
    }

    /// List service domains and the services each exposes.
    ///
    /// `GET /api/services`
    pub async fn services(&self, cancel: &CancellationToken) -> Result<Vec<ServiceDomain>, Error> {
        debug!("listing services");
        let domains = self.transport().get_json("api/services", cancel).await?;
        Ok(domains.unwrap_or_default())
    }

    /// Call a service. Returns the states that changed while it ran.
    ///
    /// `POST /api/services/{domain}/{service}` with `data` (or `{}`).
    pub async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: Option<&Attributes>,
        cancel: &CancellationToken,
    ) -> Result<Vec<EntityState>, Error> {
        require_segment("domain", domain)?;
        require_segment("service", service)?;
        debug!(domain, service, "calling service");
        let path = format!("api/services/{}/{}", segment(domain), segment(service));
        let changed = self.transport().post_json(&path, data, cancel).await?;
        Ok(changed.unwrap_or_default())
    }

    /// List event types and their listener counts.
    ///
    /// `GET /api/events`
    pub async fn events(&self, cancel: &CancellationToken) -> Result<Vec<EventInfo>, Error> {
        debug!("listing events");
        let events = self.transport().get_json("api/events", cancel).await?;
        Ok(events.unwrap_or_default())
    }

    /// Fire an event on the server's bus.
    ///
    /// `POST /api/events/{event_type}` with `data` (or `{}`).
    pub async fn fire_event(
        &self,
        event_type: &str,
        data: Option<&Attributes>,
        cancel: &CancellationToken,
    ) -> Result<Option<EventFired>, Error> {
        require_segment("event_type", event_type)?;
        debug!(event_type, "firing event");
        self.transport()
            .post_json(&format!("api/events/{}", segment(event_type)), data, cancel)
            .await
    }
}
