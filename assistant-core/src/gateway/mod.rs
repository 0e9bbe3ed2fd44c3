//! Transport gateway
//!
//! `AssistantApi` is the seam between the entity stores and the remote
//! service. `HttpApi` (in `adapters::http`) talks to the network and reports
//! every failure; `ResilientApi` wraps any implementation and, in lenient
//! mode, substitutes a well-formed fallback payload for each failure.

pub mod fallback;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::ApiError;
use crate::types::responses::{Ack, HealthStatus};
use crate::types::{
    DashboardStats, Email, EmailPage, Notification, ProcessingResult, SettingsPatch, UserSettings,
};

pub use fallback::ResilientApi;

/// Remote operations consumed by the entity stores
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    async fn trigger_processing(&self) -> Result<ProcessingResult, ApiError>;

    async fn get_emails(&self, page: u32, size: u32) -> Result<EmailPage, ApiError>;

    async fn get_email_by_id(&self, id: &str) -> Result<Email, ApiError>;

    async fn get_notifications(&self) -> Result<Vec<Notification>, ApiError>;

    async fn mark_notification_read(&self, id: &str) -> Result<Ack, ApiError>;

    async fn get_user_settings(&self) -> Result<UserSettings, ApiError>;

    /// Returns the fields the service acknowledged; absent fields are unchanged.
    async fn update_user_settings(&self, patch: &SettingsPatch) -> Result<SettingsPatch, ApiError>;

    async fn check_health(&self) -> Result<HealthStatus, ApiError>;
}

/// How transport failures reach the stores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Failures are logged and replaced by fallback payloads
    #[default]
    Lenient,
    /// Failures are propagated as `ApiError`
    Strict,
}

impl FallbackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }

    /// Resolve a gateway result according to this mode
    pub(crate) fn recover<T>(
        self,
        operation: &str,
        result: Result<T, ApiError>,
        fallback: impl FnOnce(&ApiError) -> T,
    ) -> Result<T, ApiError> {
        match (result, self) {
            (Ok(value), _) => Ok(value),
            (Err(e), Self::Strict) => {
                warn!("API request failed for {}: {}", operation, e);
                Err(e)
            }
            (Err(e), Self::Lenient) => {
                warn!("Using fallback {} due to API error: {}", operation, e);
                Ok(fallback(&e))
            }
        }
    }
}

impl fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown fallback mode: {}", other)),
        }
    }
}
