//! Entity state command handlers.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use hasskit_api::models::{EntityState, StateUpdate};

use crate::cli::{GlobalOpts, StatesArgs, StatesCommand};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Last Changed")]
    last_changed: String,
}

impl StateRow {
    fn new(s: &EntityState, color: bool) -> Self {
        let unit = s
            .attributes
            .get("unit_of_measurement")
            .and_then(serde_json::Value::as_str);
        let state = match unit {
            Some(unit) => format!("{} {unit}", s.state),
            None => output::paint_state(&s.state, color),
        };
        Self {
            entity_id: s.entity_id.clone(),
            state,
            name: s.friendly_name().unwrap_or_default().to_owned(),
            last_changed: s.last_changed.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub(crate) fn detail(s: &EntityState) -> String {
    let mut lines = vec![
        ("Entity", s.entity_id.clone()),
        ("State", s.state.clone()),
        ("Last Changed", s.last_changed.to_rfc3339()),
        (
            "Last Updated",
            s.last_updated.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
    ];
    let attributes: Vec<(&str, String)> = s
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), util::cell(v)))
        .collect();
    lines.extend(attributes);
    output::detail_lines(&lines)
}

pub(crate) fn render_states(
    states: &[EntityState],
    global: &GlobalOpts,
) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    output::render_list(
        &global.output,
        states,
        |s| StateRow::new(s, color),
        |s| s.entity_id.clone(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: StatesArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;

    match args.command {
        StatesCommand::List { domain } => {
            let mut states = client.states(cancel).await?;
            if let Some(ref domain) = domain {
                states.retain(|s| s.domain() == domain.as_str());
            }
            states.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
            let out = render_states(&states, global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StatesCommand::Get { entity_id } => {
            let state = client
                .state(&entity_id, cancel)
                .await?
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "entity".into(),
                    identifier: entity_id.clone(),
                    list_command: "states list".into(),
                })?;
            let out = output::render_single(&global.output, &state, detail, |s| s.state.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StatesCommand::Set {
            entity_id,
            state,
            attributes,
        } => {
            let update = StateUpdate {
                state,
                attributes: util::parse_json_object("attributes", attributes.as_deref())?,
            };
            let updated = client.set_state(&entity_id, &update, cancel).await?;
            let out =
                output::render_single(&global.output, &updated, detail, |s| s.state.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
