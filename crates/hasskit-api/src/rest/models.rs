// REST API transfer shapes
//
// Request and response bodies for the bearer-authenticated `/api/` surface.
// Optional members use `#[serde(default)]` because field presence varies
// across Home Assistant releases; anything not modeled is skipped on decode.

use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open-ended attribute / service-data map. Shape is owned by the server's
/// integrations, so values stay loosely typed.
pub type Attributes = IndexMap<String, Value>;

fn unknown_state() -> String {
    "unknown".into()
}

// ── States ───────────────────────────────────────────────────────────

/// An entity's state object, as returned by `GET /api/states/{entity_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Domain-qualified id, e.g. `light.kitchen`.
    pub entity_id: String,
    #[serde(default = "unknown_state")]
    pub state: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub last_changed: DateTime<FixedOffset>,
    #[serde(default)]
    pub last_updated: Option<DateTime<FixedOffset>>,
}

impl EntityState {
    /// The domain part of the entity id (`light` for `light.kitchen`).
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map_or(self.entity_id.as_str(), |(domain, _)| domain)
    }

    /// The `friendly_name` attribute, if set.
    pub fn friendly_name(&self) -> Option<&str> {
        self.attributes.get("friendly_name").and_then(Value::as_str)
    }
}

/// Body for `POST /api/states/{entity_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub state: String,
    #[serde(default)]
    pub attributes: Option<Attributes>,
}

/// One row of `GET /api/history/period`.
///
/// With `minimal_response`, only the first row of each entity carries
/// `entity_id` and `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default = "unknown_state")]
    pub state: String,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    pub last_changed: DateTime<FixedOffset>,
    #[serde(default)]
    pub last_updated: Option<DateTime<FixedOffset>>,
}

/// Entry from `GET /api/logbook`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogbookEntry {
    pub name: String,
    pub when: DateTime<FixedOffset>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub context_user_id: Option<String>,
}

// ── API / config ─────────────────────────────────────────────────────

/// `GET /api/` response (`{"message": "API running."}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiStatus {
    pub message: String,
}

/// `GET /api/config` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HassConfig {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: i32,
    pub time_zone: String,
    pub unit_system: UnitSystem,
    pub version: String,
    #[serde(default)]
    pub config_dir: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub allowlist_external_dirs: Vec<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Units the server renders values in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSystem {
    pub length: String,
    pub mass: String,
    pub temperature: String,
    pub volume: String,
    #[serde(default)]
    pub pressure: Option<String>,
    #[serde(default)]
    pub wind_speed: Option<String>,
}

/// `POST /api/config/core/check_config` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigCheck {
    /// `"valid"` or `"invalid"`.
    pub result: String,
    #[serde(default)]
    pub errors: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
}

impl ConfigCheck {
    pub fn is_valid(&self) -> bool {
        self.result == "valid"
    }
}

// ── Events & services ────────────────────────────────────────────────

/// Entry from `GET /api/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub event: String,
    pub listener_count: u32,
}

/// `POST /api/events/{event_type}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFired {
    pub message: String,
}

/// Entry from `GET /api/services`.
///
/// `services` maps each service name to its description object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDomain {
    pub domain: String,
    #[serde(default)]
    pub services: IndexMap<String, Value>,
}

impl ServiceDomain {
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

// ── Calendars ────────────────────────────────────────────────────────

/// Entry from `GET /api/calendars`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub entity_id: String,
    pub name: String,
}

/// Entry from `GET /api/calendars/{entity_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: CalendarEventTime,
    pub end: CalendarEventTime,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

/// Either a timed (`dateTime`) or an all-day (`date`) boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventTime {
    #[serde(default, rename = "dateTime", alias = "date_time")]
    pub date_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

// ── Templates ────────────────────────────────────────────────────────

/// A Jinja2 template plus optional variables.
///
/// Body of `POST /api/template` and one entry of a webhook `render_template`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub template: String,
    #[serde(default)]
    pub variables: Option<Attributes>,
}

impl TemplateRequest {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            variables: None,
        }
    }
}

// ── Mobile app registration ──────────────────────────────────────────

/// Body for `POST /api/mobile_app/registrations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileAppRegistration {
    pub device_id: String,
    pub app_id: String,
    pub app_name: String,
    pub app_version: String,
    pub device_name: String,
    pub manufacturer: String,
    pub model: String,
    pub os_name: String,
    pub os_version: String,
    #[serde(default)]
    pub supports_encryption: bool,
    #[serde(default)]
    pub app_data: Option<AppData>,
}

/// Push notification settings attached to a registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub push_token: Option<String>,
    #[serde(default)]
    pub push_url: Option<String>,
}

/// `POST /api/mobile_app/registrations` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub webhook_id: String,
    #[serde(default)]
    pub cloudhook_url: Option<String>,
    #[serde(default)]
    pub remote_ui_url: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}
