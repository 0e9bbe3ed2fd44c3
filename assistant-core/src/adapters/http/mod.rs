//! REST client for the assistant service
//!
//! Reports every failure as an `ApiError`; masking failures is left to
//! `gateway::ResilientApi`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::credentials::TokenStore;
use crate::error::{ApiError, AppError};
use crate::gateway::AssistantApi;
use crate::types::responses::{Ack, HealthStatus, SettingsUpdateResponse};
use crate::types::{
    DashboardStats, Email, EmailPage, Notification, ProcessingResult, SettingsPatch, UserSettings,
};

/// Failures below the `ApiError` abstraction
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network request failed: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Malformed response body: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Status { status, message } => ApiError::with_status(message, status),
            other => ApiError::with_status(other.to_string(), 0),
        }
    }
}

/// Remote endpoints, one per row of the service's REST surface
#[derive(Debug, Clone, Copy)]
pub enum Endpoint<'a> {
    DashboardStats,
    TriggerProcessing,
    Emails { page: u32, size: u32 },
    Email(&'a str),
    Notifications,
    MarkNotificationRead(&'a str),
    UserSettings,
    UpdateUserSettings,
    Health,
}

impl<'a> Endpoint<'a> {
    pub fn method(&self) -> Method {
        match self {
            Self::TriggerProcessing => Method::POST,
            Self::MarkNotificationRead(_) | Self::UpdateUserSettings => Method::PUT,
            _ => Method::GET,
        }
    }

    fn segments(&self) -> Vec<&'a str> {
        match *self {
            Self::DashboardStats => vec!["api", "dashboard", "stats"],
            Self::TriggerProcessing => vec!["api", "emails", "process"],
            Self::Emails { .. } => vec!["api", "emails"],
            Self::Email(id) => vec!["api", "emails", id],
            Self::Notifications => vec!["api", "notifications"],
            Self::MarkNotificationRead(id) => vec!["api", "notifications", id, "read"],
            Self::UserSettings | Self::UpdateUserSettings => vec!["api", "user", "settings"],
            Self::Health => vec!["actuator", "health"],
        }
    }

    /// Resolve against the configured base URL. Ids are percent-encoded.
    pub fn url(&self, base: &Url) -> Result<Url, TransportError> {
        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| TransportError::InvalidUrl(base.to_string()))?;
            path.pop_if_empty();
            path.extend(self.segments());
        }

        if let Self::Emails { page, size } = *self {
            url.query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("size", &size.to_string());
        }

        Ok(url)
    }
}

/// HTTP implementation of `AssistantApi`
pub struct HttpApi {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl HttpApi {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("Invalid base URL {}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint<'_>,
        body: Option<serde_json::Value>,
    ) -> Result<T, TransportError> {
        let url = endpoint.url(&self.base_url)?;
        debug!("{} {}", endpoint.method(), url);

        let mut req = self
            .client
            .request(endpoint.method(), url.clone())
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.tokens.get() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let result = Self::read(req.send().await).await;
        if let Err(e) = &result {
            warn!("API request failed for {}: {}", url.path(), e);
        }
        result
    }

    async fn read<T: DeserializeOwned>(
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, TransportError> {
        let resp = sent?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&bytes)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        // Write endpoints may answer 2xx with an empty body
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };

        serde_json::from_slice(bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AssistantApi for HttpApi {
    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        Ok(self.request(Endpoint::DashboardStats, None).await?)
    }

    async fn trigger_processing(&self) -> Result<ProcessingResult, ApiError> {
        Ok(self.request(Endpoint::TriggerProcessing, None).await?)
    }

    async fn get_emails(&self, page: u32, size: u32) -> Result<EmailPage, ApiError> {
        Ok(self.request(Endpoint::Emails { page, size }, None).await?)
    }

    async fn get_email_by_id(&self, id: &str) -> Result<Email, ApiError> {
        Ok(self.request(Endpoint::Email(id), None).await?)
    }

    async fn get_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        Ok(self.request(Endpoint::Notifications, None).await?)
    }

    async fn mark_notification_read(&self, id: &str) -> Result<Ack, ApiError> {
        Ok(self.request(Endpoint::MarkNotificationRead(id), None).await?)
    }

    async fn get_user_settings(&self) -> Result<UserSettings, ApiError> {
        Ok(self.request(Endpoint::UserSettings, None).await?)
    }

    async fn update_user_settings(&self, patch: &SettingsPatch) -> Result<SettingsPatch, ApiError> {
        let body = serde_json::to_value(patch).map_err(|e| TransportError::Decode(e.to_string()))?;
        let resp: SettingsUpdateResponse =
            self.request(Endpoint::UpdateUserSettings, Some(body)).await?;
        Ok(resp.into_patch(patch))
    }

    async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        Ok(self.request(Endpoint::Health, None).await?)
    }
}
