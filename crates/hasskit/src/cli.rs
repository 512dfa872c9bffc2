//! Clap derive structures for the `hasskit` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap + clap_complete so `build.rs` can include it.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hasskit -- Home Assistant from the command line
#[derive(Debug, Parser)]
#[command(
    name = "hasskit",
    version,
    about = "Query and control Home Assistant from the command line",
    long_about = "A CLI for the Home Assistant REST API, OAuth token flow and\n\
        mobile_app webhook channel.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "HASSKIT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "HASSKIT_SERVER", global = true)]
    pub server: Option<String>,

    /// Access token (overrides profile)
    #[arg(long, env = "HASSKIT_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HASSKIT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "HASSKIT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HASSKIT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the API is reachable and the token is accepted
    Status,

    /// Show the server configuration
    Config,

    /// Validate the server's configuration.yaml
    CheckConfig,

    /// Query and set entity states
    #[command(alias = "st")]
    States(StatesArgs),

    /// List and call services
    #[command(alias = "svc")]
    Services(ServicesArgs),

    /// List and fire events
    Events(EventsArgs),

    /// Show state history
    History(HistoryArgs),

    /// Show logbook entries
    Logbook(LogbookArgs),

    /// List calendars and their events
    #[command(alias = "cal")]
    Calendars(CalendarsArgs),

    /// Render a template on the server
    #[command(alias = "tpl")]
    Template(TemplateArgs),

    /// OAuth authorization-code flow
    Auth(AuthArgs),

    /// Mobile app webhook channel
    #[command(alias = "wh")]
    Webhook(WebhookArgs),

    /// Manage CLI profiles
    Profile(ProfileArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Time Arguments ────────────────────────────────────────────

/// Period selection shared by history and logbook.
#[derive(Debug, Args)]
pub struct PeriodArgs {
    /// Period start (RFC 3339, e.g. 2025-11-20T08:00:00+01:00)
    #[arg(long, conflicts_with = "since")]
    pub start: Option<String>,

    /// Period start relative to now (e.g. 30m, 6h, 2days)
    #[arg(long)]
    pub since: Option<String>,

    /// Period end (RFC 3339)
    #[arg(long)]
    pub end: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatesArgs {
    #[command(subcommand)]
    pub command: StatesCommand,
}

#[derive(Debug, Subcommand)]
pub enum StatesCommand {
    /// List entity states
    #[command(alias = "ls")]
    List {
        /// Only show entities of this domain (e.g. light)
        #[arg(long, short = 'd')]
        domain: Option<String>,
    },

    /// Show one entity's state and attributes
    Get {
        /// Entity ID (e.g. light.kitchen)
        entity_id: String,
    },

    /// Set an entity's state representation (does not control the device)
    Set {
        /// Entity ID (e.g. sensor.outside_temperature)
        entity_id: String,

        /// New state value
        state: String,

        /// Attributes as a JSON object
        #[arg(long, short = 'a')]
        attributes: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List services by domain
    #[command(alias = "ls")]
    List {
        /// Only show this domain
        #[arg(long, short = 'd')]
        domain: Option<String>,
    },

    /// Call a service
    Call {
        /// Service as domain.service (e.g. light.turn_on)
        service: String,

        /// Target entity (added as entity_id to the service data)
        #[arg(long, short = 'e')]
        entity: Option<String>,

        /// Service data as a JSON object
        #[arg(long, short = 'd')]
        data: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List event types and listener counts
    #[command(alias = "ls")]
    List,

    /// Fire an event
    Fire {
        /// Event type
        event_type: String,

        /// Event data as a JSON object
        #[arg(long, short = 'd')]
        data: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HISTORY & LOGBOOK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Entities to include (all when omitted)
    pub entities: Vec<String>,

    #[command(flatten)]
    pub period: PeriodArgs,

    /// Only return the state after the first entry of each entity
    #[arg(long)]
    pub minimal: bool,

    /// Omit attributes from every entry
    #[arg(long)]
    pub no_attributes: bool,

    /// Only return significant state changes
    #[arg(long)]
    pub significant_only: bool,
}

#[derive(Debug, Args)]
pub struct LogbookArgs {
    /// Only show entries for this entity
    #[arg(long, short = 'e')]
    pub entity: Option<String>,

    #[command(flatten)]
    pub period: PeriodArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CALENDARS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CalendarsArgs {
    #[command(subcommand)]
    pub command: CalendarsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CalendarsCommand {
    /// List calendar entities
    #[command(alias = "ls")]
    List,

    /// List events of one calendar
    Events {
        /// Calendar entity ID (e.g. calendar.family)
        entity_id: String,

        /// Window start (RFC 3339, default: now)
        #[arg(long)]
        start: Option<String>,

        /// Window length (e.g. 7days, 12h)
        #[arg(long, default_value = "7days")]
        window: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TEMPLATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Template source, or `-` to read from stdin
    pub template: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    /// OAuth client ID (overrides profile client_id)
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Print the URL to open in a browser to authorize this client
    Url {
        /// Opaque value echoed back to the redirect URI
        #[arg(long)]
        state: Option<String>,

        /// Redirect URI (default: <server>/?external_auth=1)
        #[arg(long)]
        redirect_uri: Option<String>,
    },

    /// Exchange an authorization code for tokens
    Exchange {
        /// Authorization code from the redirect
        code: String,

        /// Store the resulting tokens in the system keyring
        #[arg(long)]
        store: bool,
    },

    /// Obtain a fresh access token
    Refresh {
        /// Refresh token (default: profile refresh_token_env, then keyring)
        #[arg(long, env = "HASSKIT_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: Option<String>,

        /// Store the new access token in the system keyring
        #[arg(long)]
        store: bool,
    },

    /// Revoke a refresh token
    Revoke {
        /// Refresh token (default: profile refresh_token_env, then keyring)
        #[arg(long, env = "HASSKIT_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WEBHOOK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WebhookArgs {
    /// Webhook ID (overrides profile webhook_id)
    #[arg(long, env = "HASSKIT_WEBHOOK_ID", global = true, hide_env_values = true)]
    pub webhook_id: Option<String>,

    #[command(subcommand)]
    pub command: WebhookCommand,
}

#[derive(Debug, Subcommand)]
pub enum WebhookCommand {
    /// Register this machine as a mobile_app device (needs a token)
    Register {
        /// Device name shown in Home Assistant
        #[arg(long)]
        device_name: String,

        /// Stable device ID (default: a new random UUID)
        #[arg(long)]
        device_id: Option<String>,

        /// Save the returned webhook ID into the active profile
        #[arg(long)]
        save: bool,
    },

    /// Send a location update
    Location {
        /// Latitude in degrees
        #[arg(allow_hyphen_values = true)]
        latitude: f64,

        /// Longitude in degrees
        #[arg(allow_hyphen_values = true)]
        longitude: f64,

        /// GPS accuracy in meters
        #[arg(long, default_value = "10")]
        accuracy: u32,

        /// Battery level in percent
        #[arg(long)]
        battery: Option<u8>,

        /// Zone name, overriding the server's zone detection
        #[arg(long)]
        location_name: Option<String>,
    },

    /// List the enabled zones
    Zones,

    /// Show the configuration the server exposes to apps
    Config,

    /// Render named templates (name=template)
    Render {
        /// One or more `name=template` pairs
        #[arg(required = true)]
        templates: Vec<String>,
    },

    /// Fire an event through the webhook
    Fire {
        /// Event type
        event_type: String,

        /// Event data as a JSON object
        #[arg(long, short = 'd')]
        data: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROFILE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Create or replace a profile with guided setup
    Init,

    /// Display the configuration with secrets masked
    Show,

    /// Store an access token in the system keyring
    SetToken {
        /// Profile name (default: active profile)
        #[arg(long)]
        name: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
