// Server status, configuration, templates and device registration.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::client::{HassClient, require_non_empty};
use super::models::{
    ApiStatus, ConfigCheck, HassConfig, MobileAppRegistration, RegistrationResponse,
    TemplateRequest,
};
use crate::error::Error;
use crate::transport::{NO_PAYLOAD, Transport};

fn empty_response(method: &str, path: &str) -> Error {
    Error::Deserialization {
        message: format!("empty response from {method} {path}"),
        body: String::new(),
    }
}

impl<T: Transport> HassClient<T> {
    /// Check that the API is up and the token is accepted.
    ///
    /// `GET /api/`. A 404 (the `api` integration is not loaded) is `Ok(None)`.
    pub async fn api_status(&self, cancel: &CancellationToken) -> Result<Option<ApiStatus>, Error> {
        debug!("checking API status");
        self.transport().get_json("api/", cancel).await
    }

    /// `GET /api/config`. A 404 is `Ok(None)`.
    pub async fn config(&self, cancel: &CancellationToken) -> Result<Option<HassConfig>, Error> {
        debug!("fetching server config");
        self.transport().get_json("api/config", cancel).await
    }

    /// Validate `configuration.yaml` on the server.
    ///
    /// `POST /api/config/core/check_config`
    pub async fn check_config(&self, cancel: &CancellationToken) -> Result<ConfigCheck, Error> {
        const PATH: &str = "api/config/core/check_config";
        debug!("checking server configuration");
        self.transport()
            .post_json(PATH, NO_PAYLOAD, cancel)
            .await?
            .ok_or_else(|| empty_response("POST", PATH))
    }

    /// Render a template. The result is plain text, not JSON.
    ///
    /// `POST /api/template`
    pub async fn render_template(
        &self,
        request: &TemplateRequest,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        require_non_empty("template", &request.template)?;
        debug!("rendering template");
        self.transport()
            .post_raw("api/template", Some(request), cancel)
            .await
    }

    /// Register this device with the `mobile_app` integration.
    ///
    /// `POST /api/mobile_app/registrations`. The returned `webhook_id`
    /// opens the channel via [`mobile_app`](HassClient::mobile_app).
    pub async fn register_mobile_app(
        &self,
        registration: &MobileAppRegistration,
        cancel: &CancellationToken,
    ) -> Result<RegistrationResponse, Error> {
        const PATH: &str = "api/mobile_app/registrations";
        require_non_empty("device_id", &registration.device_id)?;
        require_non_empty("app_id", &registration.app_id)?;
        let response: RegistrationResponse = self
            .transport()
            .post_json(PATH, Some(registration), cancel)
            .await?
            .ok_or_else(|| empty_response("POST", PATH))?;
        info!(device = %registration.device_name, "registered mobile app");
        Ok(response)
    }
}
