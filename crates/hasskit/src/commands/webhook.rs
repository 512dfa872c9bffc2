//! Mobile app webhook command handlers.

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use hasskit_api::models::{Attributes, MobileAppRegistration, RegistrationResponse, TemplateRequest};
use hasskit_api::webhook::models::{FireEvent, LocationUpdate};

use crate::cli::{GlobalOpts, WebhookArgs, WebhookCommand};
use crate::config::{self, Profile, Session};
use crate::error::CliError;
use crate::output;

use super::{states, util};

const APP_ID: &str = "io.hasskit.cli";

fn registration(device_name: String, device_id: Option<String>) -> MobileAppRegistration {
    MobileAppRegistration {
        device_id: device_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        app_id: APP_ID.into(),
        app_name: "hasskit".into(),
        app_version: env!("CARGO_PKG_VERSION").into(),
        device_name,
        manufacturer: "hasskit".into(),
        model: std::env::consts::ARCH.into(),
        os_name: std::env::consts::OS.into(),
        os_version: "unknown".into(),
        supports_encryption: false,
        app_data: None,
    }
}

/// Parse `name=template` pairs, keeping their order.
fn parse_templates(pairs: &[String]) -> Result<IndexMap<String, TemplateRequest>, CliError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, template)| (name.to_owned(), TemplateRequest::new(template)))
                .ok_or_else(|| CliError::Validation {
                    field: "templates".into(),
                    reason: format!("expected name=template, got '{pair}'"),
                })
        })
        .collect()
}

fn map_detail(map: &Attributes) -> String {
    let lines: Vec<(&str, String)> = map
        .iter()
        .map(|(k, v)| (k.as_str(), util::cell(v)))
        .collect();
    output::detail_lines(&lines)
}

fn registration_detail(r: &RegistrationResponse) -> String {
    output::detail_lines(&[
        ("Webhook ID", r.webhook_id.clone()),
        ("Cloudhook URL", r.cloudhook_url.clone().unwrap_or_default()),
        ("Remote UI URL", r.remote_ui_url.clone().unwrap_or_default()),
        (
            "Secret",
            r.secret.as_ref().map(|_| "****".to_owned()).unwrap_or_default(),
        ),
    ])
}

/// Record `webhook_id` on the active profile in the config file.
fn save_webhook_id(session: &Session, webhook_id: &str) -> Result<(), CliError> {
    let mut cfg = config::load_config()?;
    let profile = cfg
        .profiles
        .entry(session.profile_name.clone())
        .or_insert_with(|| Profile {
            server: session.server.clone(),
            ..Profile::default()
        });
    profile.webhook_id = Some(webhook_id.to_owned());
    config::save_config(&cfg)?;
    Ok(())
}

pub async fn handle(
    session: &Session,
    args: WebhookArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    // Registration goes through the authenticated REST API, so it is the
    // one webhook command that does not need a webhook id.
    if let WebhookCommand::Register {
        device_name,
        device_id,
        save,
    } = args.command
    {
        let client = session.client(global)?;
        let response = client
            .register_mobile_app(&registration(device_name, device_id), cancel)
            .await?;
        if save {
            save_webhook_id(session, &response.webhook_id)?;
            if !global.quiet {
                eprintln!("Webhook ID saved to profile '{}'", session.profile_name);
            }
        }
        let out = output::render_single(&global.output, &response, registration_detail, |r| {
            r.webhook_id.clone()
        })?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let app = session.mobile_app(args.webhook_id.as_deref())?;

    match args.command {
        WebhookCommand::Location {
            latitude,
            longitude,
            accuracy,
            battery,
            location_name,
        } => {
            let mut update = LocationUpdate::new(latitude, longitude, accuracy);
            update.battery = battery;
            update.location_name = location_name;
            app.update_location(update, cancel).await?;
            if !global.quiet {
                eprintln!("Location sent");
            }
            Ok(())
        }

        WebhookCommand::Zones => {
            let zones = app.get_zones(cancel).await?;
            let out = states::render_states(&zones, global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WebhookCommand::Config => {
            let config = app.get_config(cancel).await?;
            let out = output::render_single(&global.output, &config, map_detail, |c| {
                c.keys().cloned().collect::<Vec<_>>().join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WebhookCommand::Render { templates } => {
            let rendered = app
                .render_template(parse_templates(&templates)?, cancel)
                .await?;
            let out = output::render_single(
                &global.output,
                &rendered,
                |r| {
                    let lines: Vec<(&str, String)> =
                        r.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
                    output::detail_lines(&lines)
                },
                |r| r.values().cloned().collect::<Vec<_>>().join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WebhookCommand::Fire { event_type, data } => {
            let event = FireEvent {
                event_data: util::parse_json_object("data", data.as_deref())?,
                event_type,
            };
            app.fire_event(event, cancel).await?;
            if !global.quiet {
                eprintln!("Event fired");
            }
            Ok(())
        }

        WebhookCommand::Register { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_templates_keeps_order() {
        let templates = parse_templates(&[
            "kitchen={{ states('light.kitchen') }}".into(),
            "sum={{ 1 + 1 }}".into(),
        ])
        .unwrap();
        let names: Vec<_> = templates.keys().map(String::as_str).collect();
        assert_eq!(names, ["kitchen", "sum"]);
        assert_eq!(templates["sum"].template, "{{ 1 + 1 }}");
    }

    #[test]
    fn test_parse_templates_rejects_missing_name() {
        assert!(parse_templates(&["={{ 1 }}".into()]).is_err());
        assert!(parse_templates(&["no-separator".into()]).is_err());
    }

    #[test]
    fn test_registration_defaults() {
        let reg = registration("laptop".into(), None);
        assert_eq!(reg.app_id, APP_ID);
        assert_eq!(reg.device_name, "laptop");
        assert!(uuid::Uuid::parse_str(&reg.device_id).is_ok());

        let fixed = registration("laptop".into(), Some("dev-1".into()));
        assert_eq!(fixed.device_id, "dev-1");
    }
}
