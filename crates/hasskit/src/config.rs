//! CLI-side profile resolution.
//!
//! The TOML layer lives in `hasskit-config`; this module merges the active
//! profile with global flag overrides into a [`Session`] and builds the
//! API clients from it.

use secrecy::SecretString;

use hasskit_api::{HassClient, MobileApp, OAuthClient, TransportConfig};
pub use hasskit_config::{
    Config, Profile, config_path, load_config, profile_server, resolve_refresh_token,
    save_config, store_refresh_token, store_token,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Everything a server-bound command needs: the merged profile, its
/// validated server URL and transport settings.
pub struct Session {
    pub server: String,
    pub profile_name: String,
    pub profile: Profile,
    pub transport: TransportConfig,
}

impl Session {
    /// Merge the active profile with `--server`, `--insecure` and `--timeout`.
    ///
    /// A missing profile is fine as long as `--server` is given.
    pub fn resolve(global: &GlobalOpts) -> Result<Self, CliError> {
        let mut cfg = load_config()?;
        let profile_name = active_profile_name(global, &cfg);

        let mut profile = match cfg.profiles.remove(&profile_name) {
            Some(profile) => profile,
            None if global.server.is_some() => Profile::default(),
            None if global.profile.is_some() => {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            None => {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            }
        };

        if let Some(ref server) = global.server {
            profile.server.clone_from(server);
        }
        if global.insecure {
            profile.insecure = Some(true);
        }
        if let Some(timeout) = global.timeout {
            profile.timeout = Some(timeout);
        }

        let server = profile_server(&profile)?;
        let transport = hasskit_config::profile_transport_config(&profile, &cfg.defaults);

        Ok(Self {
            server,
            profile_name,
            profile,
            transport,
        })
    }

    /// Access token: `--token`, then the profile's credential chain.
    pub fn token(&self, global: &GlobalOpts) -> Result<SecretString, CliError> {
        if let Some(ref token) = global.token {
            return Ok(SecretString::from(token.clone()));
        }
        Ok(hasskit_config::resolve_token(
            &self.profile,
            &self.profile_name,
        )?)
    }

    /// REST client authenticated with the resolved access token.
    pub fn client(&self, global: &GlobalOpts) -> Result<HassClient, CliError> {
        let token = self.token(global)?;
        Ok(HassClient::new(&self.server, token, &self.transport)?)
    }

    /// OAuth client for `client_id`, falling back to the profile's.
    pub fn oauth(&self, client_id: Option<&str>) -> Result<OAuthClient, CliError> {
        let client_id = client_id
            .or(self.profile.client_id.as_deref())
            .ok_or_else(|| CliError::Validation {
                field: "client_id".into(),
                reason: "pass --client-id or set client_id in the profile".into(),
            })?;
        Ok(OAuthClient::new(&self.server, client_id, &self.transport)?)
    }

    /// Webhook channel for `webhook_id`, falling back to the profile's.
    pub fn mobile_app(&self, webhook_id: Option<&str>) -> Result<MobileApp, CliError> {
        let webhook_id = webhook_id
            .or(self.profile.webhook_id.as_deref())
            .ok_or_else(|| CliError::Validation {
                field: "webhook_id".into(),
                reason: "pass --webhook-id, set webhook_id in the profile, \
                         or run: hasskit webhook register --save"
                    .into(),
            })?;
        Ok(MobileApp::new(&self.server, webhook_id, &self.transport)?)
    }
}
