//! CLI error types with miette diagnostics.
//!
//! Maps `hasskit_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use hasskit_api::Error as HassError;
use hasskit_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(hasskit::connection_failed),
        help(
            "Check that Home Assistant is running and reachable.\n\
             URL: {url}\n\
             Try: hasskit status --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(hasskit::tls_error),
        help(
            "For a self-signed certificate use --insecure (-k),\n\
             or point ca_cert in your profile at the issuing CA."
        )
    )]
    TlsError { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed (HTTP {status})")]
    #[diagnostic(
        code(hasskit::auth_failed),
        help(
            "Create a long-lived access token under your Home Assistant user profile,\n\
             then run: hasskit profile set-token"
        )
    )]
    AuthFailed { status: u16 },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(hasskit::no_credentials),
        help(
            "Configure a token with: hasskit profile set-token\n\
             Or set the HASSKIT_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(hasskit::not_found),
        help("Run: hasskit {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{method} {path} failed (HTTP {status}): {message}")]
    #[diagnostic(code(hasskit::api_error))]
    ApiError {
        method: String,
        path: String,
        status: u16,
        message: String,
    },

    #[error("Unexpected response: {message}")]
    #[diagnostic(
        code(hasskit::bad_response),
        help("Run with -vvv to log the raw response body.")
    )]
    BadResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hasskit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hasskit::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hasskit profile init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(hasskit::no_config),
        help(
            "Create a profile with: hasskit profile init\n\
             Or pass --server. Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(hasskit::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(hasskit::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout / cancellation ───────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(hasskit::timeout),
        help("Increase the timeout with --timeout or check the server's responsiveness.")
    )]
    Timeout,

    #[error("Cancelled")]
    #[diagnostic(code(hasskit::cancelled))]
    Cancelled,

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(hasskit::json), help("Check the JSON argument and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Output rendering failed: {0}")]
    #[diagnostic(code(hasskit::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NoCredentials { .. }
            | Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Cancelled => exit_code::CANCELLED,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config(ConfigError::Validation { .. } | ConfigError::UnknownProfile { .. }) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error mapping ────────────────────────────────────────────

impl From<HassError> for CliError {
    fn from(err: HassError) -> Self {
        match err {
            HassError::Cancelled => Self::Cancelled,

            HassError::InvalidArgument { name, reason } => Self::Validation {
                field: name.into(),
                reason,
            },

            HassError::Transport(e) if e.is_timeout() => Self::Timeout,

            HassError::Transport(e) => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(e),
            },

            HassError::InvalidUrl(e) => Self::Validation {
                field: "server".into(),
                reason: e.to_string(),
            },

            HassError::Tls(reason) => Self::TlsError { reason },

            HassError::RequestFailed { status, .. } if matches!(status, 401 | 403) => {
                Self::AuthFailed { status }
            }

            HassError::RequestFailed {
                method,
                path,
                status,
                body,
            } => Self::ApiError {
                method: method.into(),
                path,
                status,
                message: body,
            },

            HassError::Serialization(e) => Self::Json(e),

            HassError::Deserialization { message, .. } => Self::BadResponse { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            other => Self::Config(other),
        }
    }
}
