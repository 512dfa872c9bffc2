//! OAuth command handlers.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use hasskit_api::Credential;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config::{self, Session};
use crate::error::CliError;
use crate::output;

use super::util;

/// Printable view of a [`Credential`]. Tokens are left out once they
/// have been stored in the keyring.
#[derive(Serialize)]
struct TokenOutput {
    token_type: String,
    expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    stored: bool,
}

impl TokenOutput {
    fn new(credential: &Credential, stored: bool) -> Self {
        let reveal = |secret: &SecretString| (!stored).then(|| secret.expose_secret().to_owned());
        Self {
            token_type: credential.token_type.clone(),
            expires_in: credential.expires_in,
            access_token: reveal(&credential.access_token),
            refresh_token: credential.refresh_token.as_ref().and_then(reveal),
            stored,
        }
    }
}

fn token_detail(t: &TokenOutput) -> String {
    output::detail_lines(&[
        ("Token Type", t.token_type.clone()),
        ("Expires In", format!("{}s", t.expires_in)),
        ("Access Token", t.access_token.clone().unwrap_or_default()),
        ("Refresh Token", t.refresh_token.clone().unwrap_or_default()),
        ("Stored", if t.stored { "keyring".into() } else { String::new() }),
    ])
}

fn store(session: &Session, credential: &Credential) -> Result<(), CliError> {
    config::store_token(
        &session.profile_name,
        credential.access_token.expose_secret(),
    )?;
    if let Some(ref refresh) = credential.refresh_token {
        config::store_refresh_token(&session.profile_name, refresh.expose_secret())?;
    }
    Ok(())
}

fn refresh_token(session: &Session, flag: Option<String>) -> Result<SecretString, CliError> {
    match flag {
        Some(token) => Ok(SecretString::from(token)),
        None => Ok(config::resolve_refresh_token(
            &session.profile,
            &session.profile_name,
        )?),
    }
}

fn print_credential(
    credential: &Credential,
    stored: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let view = TokenOutput::new(credential, stored);
    let out = output::render_single(&global.output, &view, token_detail, |t| {
        t.access_token.clone().unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    session: &Session,
    args: AuthArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let mut oauth = session.oauth(args.client_id.as_deref())?;

    match args.command {
        AuthCommand::Url {
            state,
            redirect_uri,
        } => {
            if let Some(redirect_uri) = redirect_uri {
                oauth = oauth.with_redirect_uri(redirect_uri);
            }
            println!("{}", oauth.authorize_url(state.as_deref()));
            Ok(())
        }

        AuthCommand::Exchange { code, store: save } => {
            let credential = oauth.exchange_code(&code, cancel).await?;
            if save {
                store(session, &credential)?;
            }
            print_credential(&credential, save, global)
        }

        AuthCommand::Refresh {
            refresh_token: flag,
            store: save,
        } => {
            let token = refresh_token(session, flag)?;
            let credential = oauth.refresh(token.expose_secret(), cancel).await?;
            if save {
                store(session, &credential)?;
            }
            print_credential(&credential, save, global)
        }

        AuthCommand::Revoke {
            refresh_token: flag,
        } => {
            if !util::confirm(
                "Revoke this refresh token and every access token issued from it?",
                global.yes,
            )? {
                return Ok(());
            }
            let token = refresh_token(session, flag)?;
            oauth.revoke(token.expose_secret(), cancel).await?;
            if !global.quiet {
                eprintln!("Refresh token revoked");
            }
            Ok(())
        }
    }
}
