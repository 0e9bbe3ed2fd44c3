//! Root store
//!
//! Composes the four entity stores behind one handle. This is the only
//! mutation entry point the host application needs: synchronous actions go
//! through `dispatch`, async operations through the delegating methods.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::dashboard::{DashboardAction, DashboardState, DashboardStore};
use super::emails::{EmailStore, EmailsAction, EmailsState, PageRequest};
use super::notifications::{NotificationStore, NotificationsAction, NotificationsState};
use super::notify::{Notifier, StateChanged};
use super::settings::{SettingsAction, SettingsState, SettingsStore};
use crate::adapters::http::HttpApi;
use crate::config::AppConfig;
use crate::credentials::{KeyringTokenStore, TokenStore};
use crate::error::{ApiError, AppError};
use crate::gateway::{AssistantApi, ResilientApi};
use crate::types::responses::{Ack, HealthStatus};
use crate::types::{
    DashboardStats, Email, EmailPage, Notification, ProcessingResult, SettingUpdate,
    SettingsPatch, UserSettings,
};

/// Snapshot of the whole state tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootState {
    pub dashboard: DashboardState,
    pub emails: EmailsState,
    pub notifications: NotificationsState,
    pub settings: SettingsState,
}

/// Synchronous actions addressable from the root
#[derive(Debug, Clone)]
pub enum AppAction {
    ClearDashboardError,
    ClearProcessingResult,
    ClearEmailsError,
    ClearSelectedEmail,
    ResetPagination,
    ClearNotificationsError,
    MarkAllNotificationsRead,
    RemoveNotification(String),
    AddNotification(Notification),
    ClearSettingsError,
    UpdateLocalSetting(SettingUpdate),
    ResetSettings,
}

pub struct AppStore {
    dashboard: DashboardStore,
    emails: EmailStore,
    notifications: NotificationStore,
    settings: SettingsStore,
    api: Arc<dyn AssistantApi>,
    notifier: Notifier,
}

impl AppStore {
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        let notifier = Notifier::default();
        Self {
            dashboard: DashboardStore::new(api.clone(), notifier.clone()),
            emails: EmailStore::new(api.clone(), notifier.clone()),
            notifications: NotificationStore::new(api.clone(), notifier.clone()),
            settings: SettingsStore::new(api.clone(), notifier.clone()),
            api,
            notifier,
        }
    }

    /// Build the HTTP-backed store, reading the bearer token from the
    /// platform keychain.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let tokens = Arc::new(KeyringTokenStore::new(&config.credentials.service));
        Self::with_token_store(config, tokens)
    }

    pub fn with_token_store(
        config: &AppConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, AppError> {
        let http = HttpApi::new(&config.api, tokens)?;
        info!(
            "Using API at {} ({} mode)",
            http.base_url(),
            config.api.mode
        );
        let api = ResilientApi::new(http, config.api.mode);
        Ok(Self::new(Arc::new(api)))
    }

    pub fn subscribe(&self) -> flume::Receiver<StateChanged> {
        self.notifier.subscribe()
    }

    pub async fn state(&self) -> RootState {
        RootState {
            dashboard: self.dashboard.snapshot().await,
            emails: self.emails.snapshot().await,
            notifications: self.notifications.snapshot().await,
            settings: self.settings.snapshot().await,
        }
    }

    pub async fn dispatch(&self, action: AppAction) {
        match action {
            AppAction::ClearDashboardError => {
                self.dashboard.dispatch(DashboardAction::ClearError).await
            }
            AppAction::ClearProcessingResult => {
                self.dashboard
                    .dispatch(DashboardAction::ClearProcessingResult)
                    .await
            }
            AppAction::ClearEmailsError => self.emails.dispatch(EmailsAction::ClearError).await,
            AppAction::ClearSelectedEmail => {
                self.emails.dispatch(EmailsAction::ClearSelectedEmail).await
            }
            AppAction::ResetPagination => {
                self.emails.dispatch(EmailsAction::ResetPagination).await
            }
            AppAction::ClearNotificationsError => {
                self.notifications
                    .dispatch(NotificationsAction::ClearError)
                    .await
            }
            AppAction::MarkAllNotificationsRead => {
                self.notifications
                    .dispatch(NotificationsAction::MarkAllAsRead)
                    .await
            }
            AppAction::RemoveNotification(id) => {
                self.notifications
                    .dispatch(NotificationsAction::Remove(id))
                    .await
            }
            AppAction::AddNotification(n) => {
                self.notifications.dispatch(NotificationsAction::Add(n)).await
            }
            AppAction::ClearSettingsError => {
                self.settings.dispatch(SettingsAction::ClearError).await
            }
            AppAction::UpdateLocalSetting(update) => {
                self.settings
                    .dispatch(SettingsAction::UpdateLocal(update))
                    .await
            }
            AppAction::ResetSettings => self.settings.dispatch(SettingsAction::Reset).await,
        }
    }

    pub async fn fetch_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.dashboard.fetch_stats().await
    }

    pub async fn trigger_processing(&self) -> Result<ProcessingResult, ApiError> {
        self.dashboard.trigger_processing().await
    }

    pub async fn fetch_emails(&self, req: PageRequest) -> Result<EmailPage, ApiError> {
        self.emails.fetch_emails(req).await
    }

    pub async fn fetch_next_page(&self) -> Option<Result<EmailPage, ApiError>> {
        self.emails.fetch_next_page().await
    }

    pub async fn fetch_email_by_id(&self, email_id: &str) -> Result<Email, ApiError> {
        self.emails.fetch_email_by_id(email_id).await
    }

    pub async fn refresh_emails(&self) -> Result<EmailPage, ApiError> {
        self.emails.refresh_emails().await
    }

    pub async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.notifications.fetch_notifications().await
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<Ack, ApiError> {
        self.notifications.mark_as_read(notification_id).await
    }

    pub async fn fetch_user_settings(&self) -> Result<UserSettings, ApiError> {
        self.settings.fetch_user_settings().await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<SettingsPatch, ApiError> {
        self.settings.update_settings(patch).await
    }

    /// Not part of the state tree
    pub async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        self.api.check_health().await
    }
}
