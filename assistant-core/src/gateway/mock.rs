//! Scripted gateway for tests
//!
//! Each operation pops the next queued result. An empty queue rejects, so a
//! test that forgets to script a call fails loudly instead of hanging.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::AssistantApi;
use crate::error::ApiError;
use crate::types::responses::{Ack, HealthStatus};
use crate::types::{
    DashboardStats, Email, EmailPage, Notification, ProcessingResult, SettingsPatch, UserSettings,
};

type Queue<T> = Mutex<VecDeque<Result<T, ApiError>>>;

#[derive(Default)]
pub struct ScriptedApi {
    stats: Queue<DashboardStats>,
    processing: Queue<ProcessingResult>,
    emails: Queue<EmailPage>,
    email: Queue<Email>,
    notifications: Queue<Vec<Notification>>,
    mark_read: Queue<Ack>,
    settings: Queue<UserSettings>,
    update_settings: Queue<SettingsPatch>,
    health: Queue<HealthStatus>,
    calls: Mutex<Vec<String>>,
}

fn push<T>(queue: &Queue<T>, result: Result<T, ApiError>) {
    queue.lock().unwrap().push_back(result);
}

fn pop<T>(queue: &Queue<T>, name: &str) -> Result<T, ApiError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ApiError::new(format!("no scripted response for {}", name))))
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_stats(&self, r: Result<DashboardStats, ApiError>) {
        push(&self.stats, r);
    }

    pub fn push_processing(&self, r: Result<ProcessingResult, ApiError>) {
        push(&self.processing, r);
    }

    pub fn push_emails(&self, r: Result<EmailPage, ApiError>) {
        push(&self.emails, r);
    }

    pub fn push_email(&self, r: Result<Email, ApiError>) {
        push(&self.email, r);
    }

    pub fn push_notifications(&self, r: Result<Vec<Notification>, ApiError>) {
        push(&self.notifications, r);
    }

    pub fn push_mark_read(&self, r: Result<Ack, ApiError>) {
        push(&self.mark_read, r);
    }

    pub fn push_settings(&self, r: Result<UserSettings, ApiError>) {
        push(&self.settings, r);
    }

    pub fn push_update_settings(&self, r: Result<SettingsPatch, ApiError>) {
        push(&self.update_settings, r);
    }

    pub fn push_health(&self, r: Result<HealthStatus, ApiError>) {
        push(&self.health, r);
    }

    /// Operations invoked so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AssistantApi for ScriptedApi {
    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.record("get_dashboard_stats".to_string());
        pop(&self.stats, "get_dashboard_stats")
    }

    async fn trigger_processing(&self) -> Result<ProcessingResult, ApiError> {
        self.record("trigger_processing".to_string());
        pop(&self.processing, "trigger_processing")
    }

    async fn get_emails(&self, page: u32, size: u32) -> Result<EmailPage, ApiError> {
        self.record(format!("get_emails({}, {})", page, size));
        pop(&self.emails, "get_emails")
    }

    async fn get_email_by_id(&self, id: &str) -> Result<Email, ApiError> {
        self.record(format!("get_email_by_id({})", id));
        pop(&self.email, "get_email_by_id")
    }

    async fn get_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.record("get_notifications".to_string());
        pop(&self.notifications, "get_notifications")
    }

    async fn mark_notification_read(&self, id: &str) -> Result<Ack, ApiError> {
        self.record(format!("mark_notification_read({})", id));
        pop(&self.mark_read, "mark_notification_read")
    }

    async fn get_user_settings(&self) -> Result<UserSettings, ApiError> {
        self.record("get_user_settings".to_string());
        pop(&self.settings, "get_user_settings")
    }

    async fn update_user_settings(&self, _patch: &SettingsPatch) -> Result<SettingsPatch, ApiError> {
        self.record("update_user_settings".to_string());
        pop(&self.update_settings, "update_user_settings")
    }

    async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        self.record("check_health".to_string());
        pop(&self.health, "check_health")
    }
}
