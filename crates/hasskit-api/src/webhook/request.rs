use indexmap::IndexMap;
use serde::Serialize;

use super::models::{
    CallService, FireEvent, LocationUpdate, RegistrationUpdate, SensorRegistration, SensorUpdate,
};
use crate::rest::models::TemplateRequest;

/// A `mobile_app` webhook message.
///
/// Serializes as `{"type": <tag>, "data": <payload>}`; the payload-less
/// variants omit `data`. The variant fixes the payload type, so a tag can
/// never travel with the wrong shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WebhookRequest {
    UpdateLocation(LocationUpdate),
    CallService(CallService),
    FireEvent(FireEvent),
    UpdateRegistration(RegistrationUpdate),
    RegisterSensor(SensorRegistration),
    UpdateSensorStates(Vec<SensorUpdate>),
    /// Templates keyed by the name their rendering is returned under.
    RenderTemplate(IndexMap<String, TemplateRequest>),
    GetZones,
    GetConfig,
    #[serde(untagged)]
    Encrypted(EncryptedEnvelope),
}

impl WebhookRequest {
    /// The wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpdateLocation(_) => "update_location",
            Self::CallService(_) => "call_service",
            Self::FireEvent(_) => "fire_event",
            Self::UpdateRegistration(_) => "update_registration",
            Self::RegisterSensor(_) => "register_sensor",
            Self::UpdateSensorStates(_) => "update_sensor_states",
            Self::RenderTemplate(_) => "render_template",
            Self::GetZones => "get_zones",
            Self::GetConfig => "get_config",
            Self::Encrypted(_) => "encrypted",
        }
    }
}

/// An already-encrypted message.
///
/// Wire form `{"type":"encrypted","encrypted":true,"encrypted_data":...}`.
/// Producing `encrypted_data` (libsodium secretbox over the registration
/// secret) is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncryptedEnvelope {
    #[serde(rename = "type")]
    kind: &'static str,
    encrypted: bool,
    encrypted_data: String,
}

impl EncryptedEnvelope {
    pub fn new(encrypted_data: impl Into<String>) -> Self {
        Self {
            kind: "encrypted",
            encrypted: true,
            encrypted_data: encrypted_data.into(),
        }
    }

    pub fn encrypted_data(&self) -> &str {
        &self.encrypted_data
    }
}
