//! Service command handlers.

use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use hasskit_api::models::{Attributes, ServiceDomain};

use crate::cli::{GlobalOpts, ServicesArgs, ServicesCommand};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::{states, util};

// ── Table row ───────────────────────────────────────────────────────

/// One `domain.service` pair, flattened out of its domain.
#[derive(Serialize)]
struct ServiceEntry<'a> {
    domain: &'a str,
    service: &'a str,
    description: Option<&'a str>,
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&ServiceEntry<'_>> for ServiceRow {
    fn from(s: &ServiceEntry<'_>) -> Self {
        Self {
            service: format!("{}.{}", s.domain, s.service),
            description: s.description.unwrap_or_default().to_owned(),
        }
    }
}

fn flatten<'a>(domains: &'a [ServiceDomain], only: Option<&str>) -> Vec<ServiceEntry<'a>> {
    domains
        .iter()
        .filter(|d| only.is_none_or(|only| d.domain == only))
        .flat_map(|d| {
            d.services.iter().map(|(name, info)| ServiceEntry {
                domain: &d.domain,
                service: name,
                description: info.get("description").and_then(serde_json::Value::as_str),
            })
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: ServicesArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;

    match args.command {
        ServicesCommand::List { domain } => {
            let domains = client.services(cancel).await?;
            let entries = flatten(&domains, domain.as_deref());
            let out = output::render_list(
                &global.output,
                &entries,
                |s| ServiceRow::from(s),
                |s| format!("{}.{}", s.domain, s.service),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ServicesCommand::Call {
            service,
            entity,
            data,
        } => {
            let (domain, name) = util::split_dotted("service", &service)?;
            let mut data = util::parse_json_object("data", data.as_deref())?;
            if let Some(entity) = entity {
                data.get_or_insert_with(Attributes::new)
                    .insert("entity_id".into(), entity.into());
            }
            let changed = client
                .call_service(domain, name, data.as_ref(), cancel)
                .await?;
            if !global.quiet {
                eprintln!("Called {service} ({} state(s) changed)", changed.len());
            }
            if !changed.is_empty() {
                let out = states::render_states(&changed, global)?;
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_flatten_filters_by_domain() {
        let domains: Vec<ServiceDomain> = serde_json::from_value(json!([
            {
                "domain": "light",
                "services": {
                    "turn_on": { "description": "Turn on one or more lights." },
                    "turn_off": {}
                }
            },
            { "domain": "switch", "services": { "toggle": {} } }
        ]))
        .unwrap();

        let all = flatten(&domains, None);
        assert_eq!(all.len(), 3);

        let lights = flatten(&domains, Some("light"));
        assert_eq!(lights.len(), 2);
        assert_eq!(lights[0].service, "turn_on");
        assert_eq!(lights[0].description, Some("Turn on one or more lights."));
        assert_eq!(lights[1].description, None);
    }
}
