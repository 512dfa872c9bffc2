// Webhook payload shapes
//
// The `data` members of `mobile_app` webhook envelopes, plus the bodies the
// server sends back for the request/response message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rest::models::{AppData, Attributes};

/// `update_location` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    /// `[latitude, longitude]`.
    pub gps: [f64; 2],
    /// Accuracy of `gps`, in meters.
    pub gps_accuracy: u32,
    #[serde(default)]
    pub battery: Option<u8>,
    /// Zone name, overriding the server's own zone detection.
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub speed: Option<u32>,
    #[serde(default)]
    pub altitude: Option<i32>,
    #[serde(default)]
    pub course: Option<u32>,
    #[serde(default)]
    pub vertical_accuracy: Option<u32>,
}

impl LocationUpdate {
    pub fn new(latitude: f64, longitude: f64, gps_accuracy: u32) -> Self {
        Self {
            gps: [latitude, longitude],
            gps_accuracy,
            battery: None,
            location_name: None,
            speed: None,
            altitude: None,
            course: None,
            vertical_accuracy: None,
        }
    }
}

/// `call_service` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallService {
    pub domain: String,
    pub service: String,
    #[serde(default)]
    pub service_data: Option<Attributes>,
}

/// `fire_event` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireEvent {
    pub event_type: String,
    #[serde(default)]
    pub event_data: Option<Attributes>,
}

/// `update_registration` payload. Only the members that are set change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationUpdate {
    #[serde(default)]
    pub app_data: Option<AppData>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Sensor,
    BinarySensor,
}

/// `register_sensor` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRegistration {
    /// Unique within this app installation.
    pub unique_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub state: Value,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    #[serde(default)]
    pub device_class: Option<String>,
    /// Material Design icon, `mdi:` prefixed.
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub unit_of_measurement: Option<String>,
    #[serde(default)]
    pub state_class: Option<String>,
    #[serde(default)]
    pub entity_category: Option<String>,
    #[serde(default)]
    pub disabled: Option<bool>,
}

impl SensorRegistration {
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        sensor_type: SensorType,
        state: impl Into<Value>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            sensor_type,
            state: state.into(),
            attributes: None,
            device_class: None,
            icon: None,
            unit_of_measurement: None,
            state_class: None,
            entity_category: None,
            disabled: None,
        }
    }
}

/// One element of an `update_sensor_states` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdate {
    pub unique_id: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub state: Value,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl SensorUpdate {
    pub fn new(unique_id: impl Into<String>, sensor_type: SensorType, state: impl Into<Value>) -> Self {
        Self {
            unique_id: unique_id.into(),
            sensor_type,
            state: state.into(),
            attributes: None,
            icon: None,
        }
    }
}

/// Per-sensor outcome of `update_sensor_states`, keyed by `unique_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdateResult {
    pub success: bool,
    /// Set when the update landed on an entity the user disabled.
    #[serde(default)]
    pub is_disabled: Option<bool>,
    #[serde(default)]
    pub error: Option<SensorUpdateError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdateError {
    /// e.g. `not_registered`.
    pub code: String,
    pub message: String,
}

// ── Push notifications ───────────────────────────────────────────────

/// Body the `mobile_app` notify platform posts to a registration's `push_url`.
///
/// Received by push relays, never sent by this crate; decode it with
/// [`codec::decode`](crate::codec::decode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub message: String,
    #[serde(default)]
    pub title: Option<String>,
    pub push_token: String,
    pub registration_info: RegistrationInfo,
    #[serde(default)]
    pub data: Option<Attributes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationInfo {
    pub app_id: String,
    pub app_version: String,
    pub os_version: String,
    pub webhook_id: String,
}
