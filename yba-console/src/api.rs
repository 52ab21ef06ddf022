//! REST client for the YugabyteDB Anywhere platform API
//!
//! The traits at the bottom are the seams the submission and preview flows
//! are written against; `YbaClient` implements them over HTTP.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use yba_common::{
    AlertConfiguration, AlertTemplatePreviewRequest, NotificationPreview, Universe,
    UniverseDetails, UniverseResource,
};

/// Header carrying the platform API token
pub const AUTH_TOKEN_HEADER: &str = "X-AUTH-YW-API-TOKEN";

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Authentication failed")]
    AuthFailed,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Platform API client scoped to one customer
#[derive(Clone)]
pub struct YbaClient {
    client: reqwest::Client,
    base_url: String,
    customer_uuid: String,
    token: Option<String>,
}

impl YbaClient {
    /// Create a new client
    pub fn new(base_url: &str, customer_uuid: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            customer_uuid: customer_uuid.to_string(),
            token: None,
        })
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build headers for requests
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(token) {
                headers.insert(AUTH_TOKEN_HEADER, value);
            }
        }

        headers
    }

    fn customer_path(&self, path: &str) -> String {
        format!(
            "{}/api/v1/customers/{}{}",
            self.base_url, self.customer_uuid, path
        )
    }

    /// GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.customer_path(path);
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.customer_path(path);
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.customer_path(path);
        tracing::debug!("PUT {}", url);
        let response = self
            .client
            .put(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(ClientError::AuthFailed)
        } else if status.as_u16() == 404 {
            let message = response.text().await.unwrap_or_default();
            Err(ClientError::NotFound(message))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

// ============================================================================
// API seams
// ============================================================================

/// Universe provisioning endpoints
#[async_trait]
pub trait UniverseApi: Send + Sync {
    /// Validate and normalize a desired universe state
    async fn universe_configure(&self, payload: &UniverseDetails) -> Result<UniverseDetails>;

    /// Provision a configured universe
    async fn create_universe(&self, payload: &UniverseDetails) -> Result<UniverseResource>;

    /// Add a read replica cluster to an existing universe
    async fn create_read_replica(
        &self,
        payload: &UniverseDetails,
        universe_uuid: &str,
    ) -> Result<UniverseResource>;

    /// Apply an edited configuration to an existing universe
    async fn edit_universe(
        &self,
        payload: &UniverseDetails,
        universe_uuid: &str,
    ) -> Result<UniverseResource>;

    async fn get_universe(&self, universe_uuid: &str) -> Result<Universe>;
}

/// Alert configuration and template preview endpoints
#[async_trait]
pub trait AlertApi: Send + Sync {
    /// List alert configurations; an empty uuid list means all of them
    async fn fetch_alert_config_list(&self, uuids: &[String]) -> Result<Vec<AlertConfiguration>>;

    /// Render a channel template against a concrete alert configuration
    async fn preview_alert_notification(
        &self,
        request: &AlertTemplatePreviewRequest,
        alert_config_uuid: &str,
    ) -> Result<NotificationPreview>;
}

#[async_trait]
impl UniverseApi for YbaClient {
    async fn universe_configure(&self, payload: &UniverseDetails) -> Result<UniverseDetails> {
        self.post("/universe_configure", payload).await
    }

    async fn create_universe(&self, payload: &UniverseDetails) -> Result<UniverseResource> {
        self.post("/universes", payload).await
    }

    async fn create_read_replica(
        &self,
        payload: &UniverseDetails,
        universe_uuid: &str,
    ) -> Result<UniverseResource> {
        self.post(&format!("/universes/{}/cluster", universe_uuid), payload)
            .await
    }

    async fn edit_universe(
        &self,
        payload: &UniverseDetails,
        universe_uuid: &str,
    ) -> Result<UniverseResource> {
        self.put(&format!("/universes/{}", universe_uuid), payload).await
    }

    async fn get_universe(&self, universe_uuid: &str) -> Result<Universe> {
        self.get(&format!("/universes/{}", universe_uuid)).await
    }
}

#[async_trait]
impl AlertApi for YbaClient {
    async fn fetch_alert_config_list(&self, uuids: &[String]) -> Result<Vec<AlertConfiguration>> {
        let body = serde_json::json!({ "uuids": uuids });
        self.post("/alert_configurations/list", &body).await
    }

    async fn preview_alert_notification(
        &self,
        request: &AlertTemplatePreviewRequest,
        alert_config_uuid: &str,
    ) -> Result<NotificationPreview> {
        let body = serde_json::json!({
            "alertConfigUuid": alert_config_uuid,
            "alertChannelTemplates": request,
        });
        self.post("/alert_notification_preview", &body).await
    }
}
