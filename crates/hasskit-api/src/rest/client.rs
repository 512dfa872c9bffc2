// REST API client
//
// Owns a `Transport` carrying the bearer credential. Endpoint groups
// (states, history, calendars, system) are inherent methods in sibling
// files; this module keeps construction, credential rotation and the
// path/query helpers they share.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use secrecy::SecretString;
use url::form_urlencoded;

use crate::auth::Credential;
use crate::error::Error;
use crate::transport::{HttpTransport, Transport, TransportConfig};
use crate::webhook::MobileApp;

/// Client for the bearer-authenticated Home Assistant REST API.
///
/// Generic over the [`Transport`] so tests can substitute their own.
pub struct HassClient<T = HttpTransport> {
    transport: T,
}

impl HassClient<HttpTransport> {
    /// Connect to `base_url` with a long-lived or OAuth access token.
    pub fn new(
        base_url: &str,
        access_token: SecretString,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let transport = HttpTransport::new(base_url, Some(access_token), config)?;
        Ok(Self { transport })
    }

    /// Open the mobile webhook channel for a registered device.
    ///
    /// The channel gets its own unauthenticated transport with the same
    /// base URL and transport settings as this client.
    pub fn mobile_app(&self, webhook_id: &str) -> Result<MobileApp, Error> {
        MobileApp::new(
            self.transport.base_url(),
            webhook_id,
            self.transport.config(),
        )
    }
}

impl<T: Transport> HassClient<T> {
    /// Wrap an existing transport (caller manages its credential).
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Replace or clear the bearer token used by subsequent requests.
    pub fn set_access_token(&self, token: Option<SecretString>) {
        self.transport.set_credential(token);
    }

    /// Install the access token of a freshly exchanged or refreshed credential.
    pub fn apply_credential(&self, credential: &Credential) {
        self.transport
            .set_credential(Some(credential.access_token.clone()));
    }
}

// ── Path helpers ─────────────────────────────────────────────────────

/// Bytes escaped inside one path segment: the URL path-segment set plus
/// `+` and `:`.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'+')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Append a form-encoded query string (nothing when `params` is empty).
pub(crate) fn with_query(path: String, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path;
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{path}?{query}")
}

pub(crate) fn require_non_empty(name: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid(name, "must not be empty"));
    }
    Ok(())
}

/// A value spliced into the path as one segment: non-empty and not a dot
/// segment, which URL joining would resolve into a different endpoint.
pub(crate) fn require_segment(name: &'static str, value: &str) -> Result<(), Error> {
    require_non_empty(name, value)?;
    if matches!(value.trim(), "." | "..") {
        return Err(Error::invalid(name, "must not be `.` or `..`"));
    }
    Ok(())
}

/// Entity ids are `<domain>.<object_id>`, both parts non-empty.
pub(crate) fn require_entity_id(value: &str) -> Result<(), Error> {
    match value.split_once('.') {
        Some((domain, object_id)) if !domain.is_empty() && !object_id.is_empty() => Ok(()),
        _ => Err(Error::invalid(
            "entity_id",
            format!("expected `<domain>.<object_id>`, got {value:?}"),
        )),
    }
}
