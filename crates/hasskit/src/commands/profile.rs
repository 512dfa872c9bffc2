//! Profile subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Replace plaintext secrets so the config can be printed.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
    }
}

/// Format config as TOML-like text. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        let strings = [
            ("token", &p.token),
            ("token_env", &p.token_env),
            ("client_id", &p.client_id),
            ("webhook_id", &p.webhook_id),
            ("refresh_token_env", &p.refresh_token_env),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = \"{value}\"");
            }
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_token() -> Result<String, CliError> {
    let token = rpassword::prompt_password("Long-lived access token: ").map_err(prompt_err)?;
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token)
}

/// Offer keyring or plaintext storage for the token.
///
/// Returns `Some(token)` for plaintext config, `None` once stored in the keyring.
fn prompt_token_storage(profile_name: &str, token: String) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_token(profile_name, &token)?;
        eprintln!("   ✓ Token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProfileCommand::Init => {
            let config_path = config::config_path();
            eprintln!("hasskit profile setup");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config()?;

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            if cfg.profiles.contains_key(&profile_name)
                && !util::confirm(
                    &format!("Profile '{profile_name}' exists. Replace it?"),
                    global.yes,
                )?
            {
                return Ok(());
            }

            let server: String = Input::new()
                .with_prompt("Home Assistant URL")
                .default("http://homeassistant.local:8123".into())
                .interact_text()
                .map_err(prompt_err)?;
            let server = config::profile_server(&Profile {
                server,
                ..Profile::default()
            })?;

            let token = prompt_token()?;
            let token = prompt_token_storage(&profile_name, token)?;

            let client_id: String = Input::new()
                .with_prompt("OAuth client ID (optional)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let profile = Profile {
                server,
                token,
                client_id: (!client_id.trim().is_empty()).then_some(client_id),
                ..Profile::default()
            };

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: hasskit status");
            Ok(())
        }

        ProfileCommand::Show => {
            let mut cfg = config::load_config()?;
            redact(&mut cfg);
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                let mut names: Vec<_> = c.profiles.keys().cloned().collect();
                names.sort();
                names.join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::SetToken { name } => {
            let cfg = config::load_config()?;
            let profile_name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let token = prompt_token()?;
            config::store_token(&profile_name, &token)?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_masks_plaintext_token() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                server: "http://ha.local:8123".into(),
                token: Some("secret-token".into()),
                webhook_id: Some("hook-123".into()),
                ..Profile::default()
            },
        );
        redact(&mut cfg);

        insta::assert_snapshot!(format_config(&cfg), @r#"
        default_profile = "default"

        [defaults]
        output = "table"
        insecure = false
        timeout = 30

        [profiles.home]
        server = "http://ha.local:8123"
        token = "****"
        webhook_id = "hook-123"
        "#);
    }
}
