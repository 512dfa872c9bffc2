// Mobile app webhook channel
//
// Every message is a `WebhookRequest` posted to `api/webhook/{webhook_id}`.
// The webhook id is the only secret; no bearer header is ever sent.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::models::{
    CallService, FireEvent, LocationUpdate, RegistrationUpdate, SensorRegistration, SensorUpdate,
    SensorUpdateResult,
};
use super::request::{EncryptedEnvelope, WebhookRequest};
use crate::error::Error;
use crate::rest::client::{require_non_empty, require_segment, segment};
use crate::rest::models::{Attributes, EntityState, TemplateRequest};
use crate::transport::{HttpTransport, Transport, TransportConfig};

/// Client for one registered device's webhook.
pub struct MobileApp<T = HttpTransport> {
    transport: T,
    webhook_id: String,
    path: String,
}

impl MobileApp<HttpTransport> {
    /// Open the channel for `webhook_id` on the server at `base_url`.
    pub fn new(base_url: &str, webhook_id: &str, config: &TransportConfig) -> Result<Self, Error> {
        require_segment("webhook_id", webhook_id)?;
        let transport = HttpTransport::new(base_url, None, config)?;
        Self::with_transport(transport, webhook_id)
    }
}

impl<T: Transport> MobileApp<T> {
    /// Wrap an existing transport. Any credential it carries is cleared.
    pub fn with_transport(transport: T, webhook_id: &str) -> Result<Self, Error> {
        require_segment("webhook_id", webhook_id)?;
        transport.set_credential(None);
        Ok(Self {
            transport,
            webhook_id: webhook_id.to_owned(),
            path: format!("api/webhook/{}", segment(webhook_id)),
        })
    }

    pub fn webhook_id(&self) -> &str {
        &self.webhook_id
    }

    // ── Send-only ────────────────────────────────────────────────────

    pub async fn update_location(
        &self,
        update: LocationUpdate,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.send(&WebhookRequest::UpdateLocation(update), cancel)
            .await
    }

    /// Call a service through the webhook (no bearer token needed).
    pub async fn call_service(
        &self,
        call: CallService,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        require_non_empty("domain", &call.domain)?;
        require_non_empty("service", &call.service)?;
        self.send(&WebhookRequest::CallService(call), cancel).await
    }

    pub async fn fire_event(&self, event: FireEvent, cancel: &CancellationToken) -> Result<(), Error> {
        require_non_empty("event_type", &event.event_type)?;
        self.send(&WebhookRequest::FireEvent(event), cancel).await
    }

    /// Update app version, device name or push settings.
    pub async fn update_registration(
        &self,
        update: RegistrationUpdate,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.send(&WebhookRequest::UpdateRegistration(update), cancel)
            .await
    }

    pub async fn register_sensor(
        &self,
        sensor: SensorRegistration,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        require_non_empty("unique_id", &sensor.unique_id)?;
        debug!(unique_id = %sensor.unique_id, "registering sensor");
        self.send(&WebhookRequest::RegisterSensor(sensor), cancel)
            .await
    }

    /// Post a message the caller already encrypted with the registration secret.
    pub async fn send_encrypted(
        &self,
        encrypted_data: &str,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        require_non_empty("encrypted_data", encrypted_data)?;
        let envelope = EncryptedEnvelope::new(encrypted_data);
        self.send(&WebhookRequest::Encrypted(envelope), cancel)
            .await
    }

    // ── Request/response ─────────────────────────────────────────────

    /// Render templates; the result maps each name to its rendered text.
    pub async fn render_template(
        &self,
        templates: IndexMap<String, TemplateRequest>,
        cancel: &CancellationToken,
    ) -> Result<IndexMap<String, String>, Error> {
        if templates.is_empty() {
            return Err(Error::invalid("templates", "at least one template is required"));
        }
        let rendered: Option<IndexMap<String, Value>> = self
            .exchange(&WebhookRequest::RenderTemplate(templates), cancel)
            .await?;
        Ok(rendered
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| match value {
                Value::String(text) => (name, text),
                other => (name, other.to_string()),
            })
            .collect())
    }

    /// The enabled `zone` entities.
    pub async fn get_zones(&self, cancel: &CancellationToken) -> Result<Vec<EntityState>, Error> {
        let zones = self.exchange(&WebhookRequest::GetZones, cancel).await?;
        Ok(zones.unwrap_or_default())
    }

    /// Server configuration as seen by the app (a subset of `GET /api/config`).
    pub async fn get_config(&self, cancel: &CancellationToken) -> Result<Attributes, Error> {
        let config = self.exchange(&WebhookRequest::GetConfig, cancel).await?;
        Ok(config.unwrap_or_default())
    }

    /// Push new sensor states; the result is keyed by `unique_id`.
    pub async fn update_sensor_states(
        &self,
        updates: Vec<SensorUpdate>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, SensorUpdateResult>, Error> {
        if updates.is_empty() {
            return Err(Error::invalid("updates", "at least one sensor update is required"));
        }
        for update in &updates {
            require_non_empty("unique_id", &update.unique_id)?;
        }
        let results = self
            .exchange(&WebhookRequest::UpdateSensorStates(updates), cancel)
            .await?;
        Ok(results.unwrap_or_default())
    }

    /// Post without expecting a reply: only the status is checked.
    async fn send(&self, request: &WebhookRequest, cancel: &CancellationToken) -> Result<(), Error> {
        debug!(kind = request.kind(), "posting webhook message");
        self.transport
            .post_raw(&self.path, Some(request), cancel)
            .await?;
        Ok(())
    }

    async fn exchange<R>(
        &self,
        request: &WebhookRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<R>, Error>
    where
        R: DeserializeOwned + Send,
    {
        debug!(kind = request.kind(), "posting webhook message");
        self.transport
            .post_json(&self.path, Some(request), cancel)
            .await
    }
}
