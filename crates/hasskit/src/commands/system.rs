//! Server-level command handlers: status, config, check-config, template.

use tokio_util::sync::CancellationToken;

use hasskit_api::models::{ConfigCheck, HassConfig, TemplateRequest};

use crate::cli::{GlobalOpts, TemplateArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

fn config_detail(c: &HassConfig) -> String {
    output::detail_lines(&[
        ("Location", c.location_name.clone()),
        ("Version", c.version.clone()),
        ("Time Zone", c.time_zone.clone()),
        ("Coordinates", format!("{}, {}", c.latitude, c.longitude)),
        ("Elevation", format!("{} {}", c.elevation, c.unit_system.length)),
        ("Temperature", c.unit_system.temperature.clone()),
        ("State", c.state.clone().unwrap_or_default()),
        ("Config Dir", c.config_dir.clone().unwrap_or_default()),
        ("Components", c.components.len().to_string()),
    ])
}

/// A GET that came back 404: the server answered but has no such endpoint.
fn missing_endpoint(path: &str) -> CliError {
    CliError::ApiError {
        method: "GET".into(),
        path: path.into(),
        status: 404,
        message: "endpoint not available on this server".into(),
    }
}

fn check_detail(c: &ConfigCheck) -> String {
    output::detail_lines(&[
        ("Result", c.result.clone()),
        ("Errors", c.errors.clone().unwrap_or_default()),
        ("Warnings", c.warnings.clone().unwrap_or_default()),
    ])
}

pub async fn status(
    session: &Session,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;
    let status = client
        .api_status(cancel)
        .await?
        .ok_or_else(|| missing_endpoint("api/"))?;
    let out = output::render_single(
        &global.output,
        &status,
        |s| format!("{} ({})", s.message, session.server),
        |s| s.message.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn config(
    session: &Session,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;
    let config = client
        .config(cancel)
        .await?
        .ok_or_else(|| missing_endpoint("api/config"))?;
    let out = output::render_single(&global.output, &config, config_detail, |c| {
        c.version.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn check_config(
    session: &Session,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;
    let check = client.check_config(cancel).await?;
    let out = output::render_single(&global.output, &check, check_detail, |c| {
        c.result.clone()
    })?;
    output::print_output(&out, global.quiet);

    if check.is_valid() {
        Ok(())
    } else {
        Err(CliError::Validation {
            field: "configuration.yaml".into(),
            reason: check
                .errors
                .unwrap_or_else(|| format!("check returned '{}'", check.result)),
        })
    }
}

pub async fn template(
    session: &Session,
    args: TemplateArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = session.client(global)?;
    let source = util::read_arg_or_stdin(args.template)?;
    let rendered = client
        .render_template(&TemplateRequest::new(source), cancel)
        .await?;
    let out = output::render_single(
        &global.output,
        rendered.as_str(),
        |s| s.to_owned(),
        |s| s.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
