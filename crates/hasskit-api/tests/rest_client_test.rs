#![allow(clippy::unwrap_used)]
// Integration tests for `HassClient` using wiremock.

use chrono::DateTime;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hasskit_api::models::{
    Attributes, MobileAppRegistration, StateUpdate, TemplateRequest,
};
use hasskit_api::{Error, HassClient, HistoryQuery, LogbookQuery, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HassClient) {
    let server = MockServer::start().await;
    let client = HassClient::new(
        &server.uri(),
        SecretString::from("long-lived-token"),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

fn kitchen() -> serde_json::Value {
    json!({
        "entity_id": "light.kitchen",
        "state": "on",
        "last_changed": "2025-11-20T10:00:00+00:00",
        "attributes": { "friendly_name": "Kitchen Light", "brightness": 255 }
    })
}

// ── Status & config ─────────────────────────────────────────────────

#[tokio::test]
async fn test_api_status_sends_bearer() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(header("authorization", "Bearer long-lived-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "API running." })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client
        .api_status(&CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.message, "API running.");
}

#[tokio::test]
async fn test_api_status_not_found_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.api_status(&CancellationToken::new()).await.unwrap();
    assert!(status.is_none());
}

#[tokio::test]
async fn test_config() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location_name": "Home",
            "latitude": 52.37,
            "longitude": 4.89,
            "elevation": 0,
            "time_zone": "Europe/Amsterdam",
            "unit_system": {
                "length": "km", "mass": "g", "temperature": "°C", "volume": "L",
                "pressure": "Pa", "wind_speed": "m/s", "accumulated_precipitation": "mm"
            },
            "version": "2025.11.2",
            "components": ["light", "mobile_app"],
            "state": "RUNNING",
            "safe_mode": false
        })))
        .mount(&server)
        .await;

    let config = client
        .config(&CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(config.location_name, "Home");
    assert_eq!(config.unit_system.temperature, "°C");
    assert_eq!(config.components, vec!["light", "mobile_app"]);
    assert_eq!(config.state.as_deref(), Some("RUNNING"));
}

#[tokio::test]
async fn test_check_config_invalid() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/config/core/check_config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "invalid",
            "errors": "Integration error: bogus",
            "warnings": null
        })))
        .mount(&server)
        .await;

    let check = client.check_config(&CancellationToken::new()).await.unwrap();
    assert!(!check.is_valid());
    assert_eq!(check.errors.as_deref(), Some("Integration error: bogus"));
    assert_eq!(check.warnings, None);
}

// ── States ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_state_decodes_entity() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states/light.kitchen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kitchen()))
        .mount(&server)
        .await;

    let state = client
        .state("light.kitchen", &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.state, "on");
    assert_eq!(state.attributes["friendly_name"], "Kitchen Light");
    assert_eq!(state.attributes["brightness"], 255);
    assert_eq!(state.domain(), "light");
    assert_eq!(
        state.last_changed,
        DateTime::parse_from_rfc3339("2025-11-20T10:00:00+00:00").unwrap()
    );
    assert_eq!(state.last_updated, None);
}

#[tokio::test]
async fn test_state_missing_entity_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states/light.garage"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Entity not found." })))
        .mount(&server)
        .await;

    let state = client
        .state("light.garage", &CancellationToken::new())
        .await
        .unwrap();
    assert!(state.is_none());
}

#[tokio::test]
async fn test_state_rejects_malformed_entity_id() {
    let (server, client) = setup().await;

    let result = client.state("kitchen", &CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(Error::InvalidArgument {
            name: "entity_id",
            ..
        })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_states_defaults_missing_state() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kitchen(),
            { "entity_id": "sun.sun", "last_changed": "2025-11-20T06:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let states = client.states(&CancellationToken::new()).await.unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[1].state, "unknown");
    assert!(states[1].attributes.is_empty());
}

#[tokio::test]
async fn test_states_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(401).set_body_string("401: Unauthorized"))
        .mount(&server)
        .await;

    let err = client.states(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_set_state() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/states/sensor.outside"))
        .and(body_json(json!({ "state": "21.5" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "entity_id": "sensor.outside",
            "state": "21.5",
            "attributes": {},
            "last_changed": "2025-11-20T10:00:00+00:00",
            "last_updated": "2025-11-20T10:00:00+00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = StateUpdate {
        state: "21.5".into(),
        attributes: None,
    };
    let state = client
        .set_state("sensor.outside", &update, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(state.state, "21.5");
    assert!(state.last_updated.is_some());
}

// ── Services & events ───────────────────────────────────────────────

#[tokio::test]
async fn test_services() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "domain": "light",
                "services": {
                    "turn_on": { "name": "Turn on", "fields": {} },
                    "turn_off": { "name": "Turn off", "fields": {} }
                }
            }
        ])))
        .mount(&server)
        .await;

    let domains = client.services(&CancellationToken::new()).await.unwrap();
    assert_eq!(domains[0].domain, "light");
    assert_eq!(
        domains[0].service_names().collect::<Vec<_>>(),
        vec!["turn_on", "turn_off"]
    );
}

#[tokio::test]
async fn test_call_service_returns_changed_states() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/light/turn_on"))
        .and(body_json(json!({ "entity_id": "light.kitchen", "brightness": 128 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([kitchen()])))
        .expect(1)
        .mount(&server)
        .await;

    let data: Attributes = [
        ("entity_id".to_owned(), json!("light.kitchen")),
        ("brightness".to_owned(), json!(128)),
    ]
    .into_iter()
    .collect();
    let changed = client
        .call_service("light", "turn_on", Some(&data), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].entity_id, "light.kitchen");
}

#[tokio::test]
async fn test_call_service_empty_body_is_empty_list() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/script/reload"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let changed = client
        .call_service("script", "reload", None, &CancellationToken::new())
        .await
        .unwrap();
    assert!(changed.is_empty());
}

#[tokio::test]
async fn test_call_service_requires_domain() {
    let (_server, client) = setup().await;

    let result = client
        .call_service("", "turn_on", None, &CancellationToken::new())
        .await;
    assert!(matches!(
        result,
        Err(Error::InvalidArgument { name: "domain", .. })
    ));
}

#[tokio::test]
async fn test_path_segments_are_percent_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/events/my%20event"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .fire_event("my event", None, &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_dot_segments_rejected_without_io() {
    let (server, client) = setup().await;
    let cancel = CancellationToken::new();

    let result = client.call_service("..", "x", None, &cancel).await;
    assert!(matches!(
        result,
        Err(Error::InvalidArgument { name: "domain", .. })
    ));
    let result = client.fire_event(".", None, &cancel).await;
    assert!(matches!(
        result,
        Err(Error::InvalidArgument {
            name: "event_type",
            ..
        })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_events_and_fire_event() {
    let (server, client) = setup().await;
    let cancel = CancellationToken::new();

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "event": "state_changed", "listener_count": 5 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/events/doorbell_pressed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Event doorbell_pressed fired." })),
        )
        .mount(&server)
        .await;

    let events = client.events(&cancel).await.unwrap();
    assert_eq!(events[0].event, "state_changed");
    assert_eq!(events[0].listener_count, 5);

    let fired = client
        .fire_event("doorbell_pressed", None, &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fired.message, "Event doorbell_pressed fired.");
}

// ── History & logbook ───────────────────────────────────────────────

#[tokio::test]
async fn test_history_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/api/history/period/2025-11-20T10"))
        .and(query_param("filter_entity_id", "light.kitchen"))
        .and(query_param("minimal_response", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {
                "entity_id": "light.kitchen",
                "state": "on",
                "attributes": { "friendly_name": "Kitchen Light" },
                "last_changed": "2025-11-20T10:00:00+00:00"
            },
            { "state": "off", "last_changed": "2025-11-20T11:00:00+00:00" }
        ]])))
        .expect(1)
        .mount(&server)
        .await;

    let query = HistoryQuery {
        start: Some(DateTime::parse_from_rfc3339("2025-11-20T10:00:00+00:00").unwrap()),
        minimal_response: true,
        ..HistoryQuery::default()
    }
    .entity("light.kitchen");
    let history = client
        .history(&query, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0][0].entity_id.as_deref(), Some("light.kitchen"));
    assert_eq!(history[0][1].entity_id, None);
    assert_eq!(history[0][1].state, "off");
}

#[tokio::test]
async fn test_logbook_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logbook"))
        .and(query_param("entity", "light.kitchen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "Kitchen Light",
                "when": "2025-11-20T10:00:00.123456+00:00",
                "state": "on",
                "entity_id": "light.kitchen",
                "context_user_id": null
            }
        ])))
        .mount(&server)
        .await;

    let query = LogbookQuery {
        entity: Some("light.kitchen".into()),
        ..LogbookQuery::default()
    };
    let entries = client
        .logbook(&query, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(entries[0].name, "Kitchen Light");
    assert_eq!(entries[0].state.as_deref(), Some("on"));
    assert_eq!(entries[0].context_user_id, None);
}

// ── Calendars ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_calendar_events() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/calendars/calendar.family"))
        .and(query_param("start", "2025-11-20T00:00:00+00:00"))
        .and(query_param("end", "2025-11-27T00:00:00+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "summary": "Dentist",
                "start": { "dateTime": "2025-11-21T09:00:00+01:00" },
                "end": { "dateTime": "2025-11-21T10:00:00+01:00" },
                "location": "Main St"
            },
            {
                "summary": "Holiday",
                "start": { "date": "2025-11-24" },
                "end": { "date": "2025-11-25" }
            }
        ])))
        .mount(&server)
        .await;

    let start = DateTime::parse_from_rfc3339("2025-11-20T00:00:00Z").unwrap();
    let end = DateTime::parse_from_rfc3339("2025-11-27T00:00:00Z").unwrap();
    let events = client
        .calendar_events("calendar.family", &start, &end, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].start.date_time.is_some());
    assert_eq!(events[0].location.as_deref(), Some("Main St"));
    assert_eq!(
        events[1].start.date.map(|d| d.to_string()).as_deref(),
        Some("2025-11-24")
    );
}

#[tokio::test]
async fn test_calendars_not_found_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/calendars"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let calendars = client.calendars(&CancellationToken::new()).await.unwrap();
    assert!(calendars.is_empty());
}

// ── Templates & registration ────────────────────────────────────────

#[tokio::test]
async fn test_render_template_returns_text() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/template"))
        .and(body_json(json!({ "template": "{{ states('light.kitchen') }}" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("on"))
        .mount(&server)
        .await;

    let rendered = client
        .render_template(
            &TemplateRequest::new("{{ states('light.kitchen') }}"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(rendered, "on");
}

#[tokio::test]
async fn test_register_mobile_app() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile_app/registrations"))
        .and(body_json(json!({
            "device_id": "dev-1",
            "app_id": "io.hasskit",
            "app_name": "hasskit",
            "app_version": "0.1.0",
            "device_name": "laptop",
            "manufacturer": "Framework",
            "model": "13",
            "os_name": "Linux",
            "os_version": "6.8",
            "supports_encryption": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "webhook_id": "abcdef",
            "cloudhook_url": null,
            "remote_ui_url": null,
            "secret": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registration = MobileAppRegistration {
        device_id: "dev-1".into(),
        app_id: "io.hasskit".into(),
        app_name: "hasskit".into(),
        app_version: "0.1.0".into(),
        device_name: "laptop".into(),
        manufacturer: "Framework".into(),
        model: "13".into(),
        os_name: "Linux".into(),
        os_version: "6.8".into(),
        supports_encryption: false,
        app_data: None,
    };
    let response = client
        .register_mobile_app(&registration, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.webhook_id, "abcdef");
    assert_eq!(response.secret, None);
}
