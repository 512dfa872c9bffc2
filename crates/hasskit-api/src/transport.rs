// Request/response pipeline shared by every feature client.
//
// `TransportConfig` builds the `reqwest::Client`; `HttpTransport` owns it
// together with the base URL and the rotating bearer credential, and
// implements the `Transport` primitives on top of the shared codec.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use crate::codec;
use crate::error::Error;

/// Payload placeholder for primitives called without a body (sends `{}`).
pub const NO_PAYLOAD: Option<&Value> = None;

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the bundled web PKI roots.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed local installs).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            user_agent: concat!("hasskit/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` that sends `Accept: application/json` by default.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Capability set ───────────────────────────────────────────────────

/// The request primitives every feature client is built from.
///
/// Paths are relative to [`base_url`](Self::base_url) (e.g. `"api/states"`).
/// A fired cancellation token surfaces as [`Error::Cancelled`].
pub trait Transport: Send + Sync {
    /// Normalized base address, without a trailing `/`.
    fn base_url(&self) -> &str;

    /// Install, rotate, or (with `None`) remove the bearer credential.
    fn set_credential(&self, credential: Option<SecretString>);

    /// `GET` and decode. A 404 yields `Ok(None)`.
    fn get_json<T>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Option<T>, Error>> + Send
    where
        T: DeserializeOwned + Send;

    /// `POST` a JSON payload (`{}` when absent) and decode. An empty body yields `Ok(None)`.
    fn post_json<T, B>(
        &self,
        path: &str,
        payload: Option<&B>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Option<T>, Error>> + Send
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync + ?Sized;

    /// `POST` a JSON payload and return the response body undecoded.
    fn post_raw<B>(
        &self,
        path: &str,
        payload: Option<&B>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<String, Error>> + Send
    where
        B: Serialize + Sync + ?Sized;

    /// `POST` an `application/x-www-form-urlencoded` body and decode.
    fn post_form<T>(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Option<T>, Error>> + Send
    where
        T: DeserializeOwned + Send;
    /// `POST` a form body and return the response body undecoded.
    fn post_form_raw(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<String, Error>> + Send;
}

// ── reqwest implementation ───────────────────────────────────────────

/// HTTP transport bound to one Home Assistant base URL.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    base: String,
    config: TransportConfig,
    credential: RwLock<Option<SecretString>>,
}

impl HttpTransport {
    /// Build a transport for `base_url` (e.g. `http://192.168.1.5:8123`).
    pub fn new(
        base_url: &str,
        credential: Option<SecretString>,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = config.build_client()?;
        Self::with_client(base_url, credential, http, config.clone())
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(
        base_url: &str,
        credential: Option<SecretString>,
        http: reqwest::Client,
        config: TransportConfig,
    ) -> Result<Self, Error> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(Error::invalid("base_url", "must not be empty"));
        }
        let base_url = Url::parse(&format!("{base}/"))?;
        Ok(Self {
            http,
            base_url,
            base: base.to_owned(),
            config,
            credential: RwLock::new(credential),
        })
    }

    /// The configuration this transport was built from.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Returns `true` if a bearer credential is installed.
    pub fn has_credential(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Build the `Authorization` header from the current credential.
    fn authorization(&self) -> Result<Option<HeaderValue>, Error> {
        let guard = self
            .credential
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(token) = guard.as_ref() else {
            return Ok(None);
        };
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::invalid("credential", format!("invalid header value: {e}")))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");
        let builder = self.http.request(method, url);
        Ok(match self.authorization()? {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        })
    }

    fn json_body<B: Serialize + ?Sized>(payload: Option<&B>) -> Result<String, Error> {
        payload.map_or_else(|| Ok("{}".to_owned()), codec::encode)
    }

    /// Send and read the whole body, racing the exchange against `cancel`.
    async fn exchange(
        &self,
        builder: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<(StatusCode, String), Error> {
        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            Ok::<_, Error>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            result = exchange => result?,
        };

        debug!(status = status.as_u16(), "response received");
        trace!(body = %body, "response body");
        Ok((status, body))
    }

    /// Classify a write response: non-2xx fails, empty body is absent.
    fn classify_write<T: DeserializeOwned>(
        path: &str,
        status: StatusCode,
        body: String,
    ) -> Result<Option<T>, Error> {
        if !status.is_success() {
            return Err(request_failed("POST", path, status, body));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        codec::decode(&body).map(Some)
    }
}

fn request_failed(method: &'static str, path: &str, status: StatusCode, body: String) -> Error {
    Error::RequestFailed {
        method,
        path: path.to_owned(),
        status: status.as_u16(),
        body,
    }
}

impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base
    }

    fn set_credential(&self, credential: Option<SecretString>) {
        if credential.is_some() {
            debug!("installing bearer credential");
        } else {
            debug!("clearing bearer credential");
        }
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    async fn get_json<T>(&self, path: &str, cancel: &CancellationToken) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        let builder = self.request(Method::GET, path)?;
        let (status, body) = self.exchange(builder, cancel).await?;

        if status == StatusCode::NOT_FOUND {
            debug!(path, "not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(request_failed("GET", path, status, body));
        }
        codec::decode(&body).map(Some)
    }

    async fn post_json<T, B>(
        &self,
        path: &str,
        payload: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync + ?Sized,
    {
        let body = Self::json_body(payload)?;
        let builder = self
            .request(Method::POST, path)?
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let (status, body) = self.exchange(builder, cancel).await?;
        Self::classify_write(path, status, body)
    }

    async fn post_raw<B>(
        &self,
        path: &str,
        payload: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<String, Error>
    where
        B: Serialize + Sync + ?Sized,
    {
        let body = Self::json_body(payload)?;
        let builder = self
            .request(Method::POST, path)?
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let (status, body) = self.exchange(builder, cancel).await?;
        if !status.is_success() {
            return Err(request_failed("POST", path, status, body));
        }
        Ok(body)
    }

    async fn post_form<T>(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        let builder = self.request(Method::POST, path)?.form(form);
        let (status, body) = self.exchange(builder, cancel).await?;
        Self::classify_write(path, status, body)
    }

    async fn post_form_raw(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let builder = self.request(Method::POST, path)?.form(form);
        let (status, body) = self.exchange(builder, cancel).await?;
        if !status.is_success() {
            return Err(request_failed("POST", path, status, body));
        }
        Ok(body)
    }
}
