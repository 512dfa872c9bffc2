// hasskit-api: Async Rust client for the Home Assistant HTTP APIs
//
// `transport` owns the HTTP pipeline and the bearer credential, `codec`
// the single JSON configuration. The feature clients (`auth`, `rest`,
// `webhook`) only build requests on top of a `Transport`.

pub mod auth;
pub mod codec;
pub mod error;
pub mod rest;
pub mod transport;
pub mod webhook;

pub use auth::{Credential, OAuthClient};
pub use error::Error;
pub use rest::models;
pub use rest::{HassClient, HistoryQuery, LogbookQuery};
pub use transport::{HttpTransport, NO_PAYLOAD, TlsMode, Transport, TransportConfig};
pub use webhook::{EncryptedEnvelope, MobileApp, WebhookRequest};
