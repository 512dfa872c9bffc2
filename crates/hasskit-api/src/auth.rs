// OAuth2 authorization-code flow against `/auth/token`.
//
// The token endpoint takes form-encoded bodies and never a bearer header,
// so `OAuthClient` owns a transport with no credential installed.

use std::fmt;

use secrecy::SecretString;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::form_urlencoded;

use crate::error::Error;
use crate::transport::{HttpTransport, Transport, TransportConfig};

const TOKEN_PATH: &str = "auth/token";

/// Tokens issued by the token endpoint.
///
/// There is no wall-clock expiry tracking; `expires_in` is passed through
/// for callers that schedule their own refresh.
#[derive(Clone)]
pub struct Credential {
    pub access_token: SecretString,
    /// Present after a code exchange, usually absent after a refresh.
    pub refresh_token: Option<SecretString>,
    /// Lifetime of the access token, in seconds.
    pub expires_in: u64,
    pub token_type: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Token endpoint response body.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    #[serde(default = "bearer")]
    token_type: String,
}

fn bearer() -> String {
    "Bearer".into()
}

impl From<TokenResponse> for Credential {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: SecretString::from(token.access_token),
            refresh_token: token.refresh_token.map(SecretString::from),
            expires_in: token.expires_in,
            token_type: token.token_type,
        }
    }
}

/// Client for the OAuth2 authorization-code flow.
///
/// `client_id` is the URL of the application, as Home Assistant uses
/// IndieAuth-style client identifiers.
pub struct OAuthClient<T = HttpTransport> {
    transport: T,
    client_id: String,
    redirect_uri: String,
}

impl OAuthClient<HttpTransport> {
    pub fn new(base_url: &str, client_id: &str, config: &TransportConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(base_url, None, config)?;
        Self::with_transport(transport, client_id)
    }
}

impl<T: Transport> OAuthClient<T> {
    /// Wrap an existing transport. Any credential it carries is cleared.
    pub fn with_transport(transport: T, client_id: &str) -> Result<Self, Error> {
        if client_id.trim().is_empty() {
            return Err(Error::invalid("client_id", "must not be empty"));
        }
        transport.set_credential(None);
        let redirect_uri = format!("{}/?external_auth=1", transport.base_url());
        Ok(Self {
            transport,
            client_id: client_id.to_owned(),
            redirect_uri,
        })
    }

    /// Override the default `{base}/?external_auth=1` redirect target.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// URL the user opens in a browser to authorize this client.
    pub fn authorize_url(&self, state: Option<&str>) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri);
        if let Some(state) = state {
            query.append_pair("state", state);
        }
        format!("{}/auth/authorize?{}", self.transport.base_url(), query.finish())
    }

    /// Trade an authorization code for an access and refresh token.
    pub async fn exchange_code(
        &self,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Credential, Error> {
        if code.trim().is_empty() {
            return Err(Error::invalid("code", "must not be empty"));
        }
        debug!("exchanging authorization code");
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
        ];
        let credential = self.token_request(&form, cancel).await?;
        info!(expires_in = credential.expires_in, "authorization code exchanged");
        Ok(credential)
    }

    /// Obtain a fresh access token from a refresh token.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Credential, Error> {
        if refresh_token.trim().is_empty() {
            return Err(Error::invalid("refresh_token", "must not be empty"));
        }
        debug!("refreshing access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ];
        let credential = self.token_request(&form, cancel).await?;
        info!(expires_in = credential.expires_in, "access token refreshed");
        Ok(credential)
    }

    /// Revoke a refresh token and every access token issued from it.
    pub async fn revoke(&self, refresh_token: &str, cancel: &CancellationToken) -> Result<(), Error> {
        if refresh_token.trim().is_empty() {
            return Err(Error::invalid("refresh_token", "must not be empty"));
        }
        debug!("revoking refresh token");
        let form = [("token", refresh_token), ("action", "revoke")];
        // Only the status matters; the server may answer with any body.
        self.transport
            .post_form_raw(TOKEN_PATH, &form, cancel)
            .await?;
        info!("refresh token revoked");
        Ok(())
    }

    async fn token_request(
        &self,
        form: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<Credential, Error> {
        let token: TokenResponse = self
            .transport
            .post_form(TOKEN_PATH, form, cancel)
            .await?
            .ok_or_else(|| Error::Deserialization {
                message: format!("empty response from POST {TOKEN_PATH}"),
                body: String::new(),
            })?;
        Ok(token.into())
    }
}
