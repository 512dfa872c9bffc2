//! Configuration for the hasskit CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `hasskit_api::TransportConfig`. The CLI layers its own
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hasskit_api::{TlsMode, TransportConfig};

const KEYRING_SERVICE: &str = "hasskit";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(name, profile)| (name.as_str(), profile))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Home Assistant server profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "http://homeassistant.local:8123").
    pub server: String,

    /// Long-lived or OAuth access token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the access token.
    pub token_env: Option<String>,

    /// OAuth client id (the application's URL).
    pub client_id: Option<String>,

    /// Webhook id from a `mobile_app` registration.
    pub webhook_id: Option<String>,

    /// Environment variable name containing the OAuth refresh token.
    pub refresh_token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "hasskit", "hasskit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hasskit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
///
/// A missing file yields the defaults; a file that fails to parse is an error.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, with `HASSKIT_`-prefixed environment variables on top.
///
/// Nested keys use a double underscore (`HASSKIT_DEFAULTS__TIMEOUT=5`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HASSKIT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}


// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str, key: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{key}"),
    )?)
}

/// Resolve the access token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name, "token") {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the OAuth refresh token: `refresh_token_env`, then keyring.
pub fn resolve_refresh_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.refresh_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring_entry(profile_name, "refresh-token") {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store the access token in the system keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "token")?.set_password(token)?;
    Ok(())
}

/// Store the OAuth refresh token in the system keyring.
pub fn store_refresh_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "refresh-token")?.set_password(token)?;
    Ok(())
}

// ── Transport translation ───────────────────────────────────────────

/// Validate the profile's server URL and return it with any trailing `/` removed.
pub fn profile_server(profile: &Profile) -> Result<String, ConfigError> {
    let url: url::Url = profile
        .server
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", profile.server),
        })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("expected an http(s) URL, got '{}'", profile.server),
        });
    }
    Ok(profile.server.trim_end_matches('/').to_owned())
}

/// Build a `TransportConfig` from a profile and the global defaults.
pub fn profile_transport_config(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        ..TransportConfig::default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(server: &str) -> Profile {
        Profile {
            server: server.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
output = "json"
timeout = 10

[profiles.home]
server = "http://homeassistant.local:8123"
token_env = "HOME_TOKEN"
webhook_id = "abc"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.timeout, 10);
        assert!(!config.defaults.insecure);

        let (name, home) = config.profile(None).unwrap();
        assert_eq!(name, "home");
        assert_eq!(home.server, "http://homeassistant.local:8123");
        assert_eq!(home.webhook_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let contents = "[defaults]\ntimeout = \"abc\"\n\n[profiles.home]\nserver = \"http://ha.local\"\n";
        std::fs::write(&path, contents).unwrap();

        assert!(matches!(load_config_from(&path), Err(ConfigError::Figment(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_unknown_profile() {
        let config = Config::default();
        assert!(matches!(
            config.profile(Some("cabin")),
            Err(ConfigError::UnknownProfile { name }) if name == "cabin"
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                token: Some("plain".into()),
                timeout: Some(5),
                ..profile("https://hass.example.com")
            },
        );
        save_config_to(&config, &path).unwrap();

        let reloaded = load_config_from(&path).unwrap();
        let (_, default) = reloaded.profile(None).unwrap();
        assert_eq!(default.server, "https://hass.example.com");
        assert_eq!(default.token.as_deref(), Some("plain"));
        assert_eq!(default.timeout, Some(5));
    }

    #[test]
    fn test_profile_server_validation() {
        assert_eq!(
            profile_server(&profile("http://hass.local:8123/")).unwrap(),
            "http://hass.local:8123"
        );
        assert!(matches!(
            profile_server(&profile("not a url")),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            profile_server(&profile("ftp://hass.local")),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_transport_config_tls_precedence() {
        let defaults = Defaults::default();

        let plain = profile_transport_config(&profile("http://a"), &defaults);
        assert!(matches!(plain.tls, TlsMode::System));
        assert_eq!(plain.timeout, Duration::from_secs(30));

        let ca = Profile {
            ca_cert: Some("/etc/hass-ca.pem".into()),
            timeout: Some(3),
            ..profile("https://a")
        };
        let with_ca = profile_transport_config(&ca, &defaults);
        assert!(matches!(with_ca.tls, TlsMode::CustomCa(ref p) if p == Path::new("/etc/hass-ca.pem")));
        assert_eq!(with_ca.timeout, Duration::from_secs(3));

        let insecure = Profile {
            insecure: Some(true),
            ..ca
        };
        assert!(matches!(
            profile_transport_config(&insecure, &defaults).tls,
            TlsMode::DangerAcceptInvalid
        ));
    }

    #[test]
    fn test_plaintext_token_is_last_resort() {
        let with_token = Profile {
            token: Some("plain".into()),
            token_env: Some("HASSKIT_TEST_UNSET_TOKEN_VAR".into()),
            ..profile("http://a")
        };
        // No keyring entry exists under this profile name.
        let token = resolve_token(&with_token, "hasskit-test-no-such-profile").unwrap();
        assert_eq!(secrecy::ExposeSecret::expose_secret(&token), "plain");

        assert!(matches!(
            resolve_token(&profile("http://a"), "hasskit-test-no-such-profile"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }
}
