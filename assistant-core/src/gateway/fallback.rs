//! Fallback payloads
//!
//! Substituted for live data when the service cannot be reached, so every
//! screen keeps rendering in demo and offline situations.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;

use super::{AssistantApi, FallbackMode};
use crate::error::ApiError;
use crate::types::responses::{Ack, HealthStatus};
use crate::types::{
    Category, DashboardStats, Email, EmailPage, Notification, NotificationKind, Priority,
    ProcessingResult, SettingsPatch, UserSettings, DEFAULT_AI_PROVIDER,
    DEFAULT_PROCESSING_SCHEDULE,
};

pub fn dashboard_stats() -> DashboardStats {
    DashboardStats {
        total_emails: 156,
        urgent_emails: 3,
        auto_responses: 42,
        processed_today: 23,
    }
}

pub fn processing_result() -> ProcessingResult {
    ProcessingResult {
        success: true,
        message: "Email processing started (mock)".to_string(),
        processed_count: rand::thread_rng().gen_range(1..=10),
    }
}

pub fn email_page() -> EmailPage {
    let now = Utc::now();
    let content = vec![
        Email {
            id: "1".to_string(),
            subject: "Quarterly Report Review".to_string(),
            sender: "john.doe@company.com".to_string(),
            received_at: now,
            priority: Priority::High,
            processed: true,
            requires_attention: true,
            category: Category::Work,
            summary: "Quarterly financial report needs immediate review and approval.".to_string(),
            content: None,
        },
        Email {
            id: "2".to_string(),
            subject: "Meeting Confirmation".to_string(),
            sender: "scheduler@meetings.com".to_string(),
            received_at: now - Duration::hours(1),
            priority: Priority::Medium,
            processed: true,
            requires_attention: false,
            category: Category::Meeting,
            summary: "Automated confirmation for tomorrow's team meeting.".to_string(),
            content: None,
        },
        Email {
            id: "3".to_string(),
            subject: "Welcome to our Newsletter".to_string(),
            sender: "newsletter@company.com".to_string(),
            received_at: now - Duration::hours(2),
            priority: Priority::Low,
            processed: true,
            requires_attention: false,
            category: Category::Newsletter,
            summary: "Welcome email from company newsletter subscription.".to_string(),
            content: None,
        },
    ];

    EmailPage {
        total_elements: content.len() as u64,
        total_pages: 1,
        first: true,
        last: true,
        content,
    }
}

pub fn email(id: &str) -> Email {
    Email {
        id: id.to_string(),
        subject: "Mock Email Subject".to_string(),
        sender: "mock@example.com".to_string(),
        received_at: Utc::now(),
        priority: Priority::Medium,
        processed: true,
        requires_attention: false,
        category: Category::Other,
        summary: "This is a mock email summary.".to_string(),
        content: Some("This is the full content of a mock email for testing purposes.".to_string()),
    }
}

pub fn notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: "1".to_string(),
            kind: NotificationKind::Urgent,
            title: "Urgent Email from CEO".to_string(),
            message: "Important meeting scheduled for tomorrow at 9 AM".to_string(),
            time: "2 mins ago".to_string(),
            read: false,
            icon: None,
            color: None,
        },
        Notification {
            id: "2".to_string(),
            kind: NotificationKind::AutoResponse,
            title: "Auto-response sent".to_string(),
            message: "Replied to customer support inquiry automatically".to_string(),
            time: "15 mins ago".to_string(),
            read: false,
            icon: None,
            color: None,
        },
    ]
}

/// Unlike the store's initial settings, the service default has WhatsApp on.
pub fn user_settings() -> UserSettings {
    UserSettings {
        push_notifications: true,
        whatsapp_notifications: true,
        auto_responses: true,
        processing_schedule: DEFAULT_PROCESSING_SCHEDULE.to_string(),
        ai_provider: DEFAULT_AI_PROVIDER.to_string(),
    }
}

pub fn health(err: &ApiError) -> HealthStatus {
    HealthStatus {
        status: "DOWN".to_string(),
        error: Some(err.message.clone()),
    }
}

/// Gateway decorator applying a `FallbackMode` to every operation
pub struct ResilientApi<A> {
    inner: A,
    mode: FallbackMode,
}

impl<A: AssistantApi> ResilientApi<A> {
    pub fn new(inner: A, mode: FallbackMode) -> Self {
        Self { inner, mode }
    }

    pub fn mode(&self) -> FallbackMode {
        self.mode
    }
}

#[async_trait]
impl<A: AssistantApi> AssistantApi for ResilientApi<A> {
    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let result = self.inner.get_dashboard_stats().await;
        self.mode.recover("dashboard stats", result, |_| dashboard_stats())
    }

    async fn trigger_processing(&self) -> Result<ProcessingResult, ApiError> {
        let result = self.inner.trigger_processing().await;
        self.mode.recover("processing result", result, |_| processing_result())
    }

    async fn get_emails(&self, page: u32, size: u32) -> Result<EmailPage, ApiError> {
        let result = self.inner.get_emails(page, size).await;
        self.mode.recover("emails", result, |_| email_page())
    }

    async fn get_email_by_id(&self, id: &str) -> Result<Email, ApiError> {
        let result = self.inner.get_email_by_id(id).await;
        self.mode.recover(&format!("email data for ID {}", id), result, |_| email(id))
    }

    async fn get_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let result = self.inner.get_notifications().await;
        self.mode.recover("notifications", result, |_| notifications())
    }

    async fn mark_notification_read(&self, id: &str) -> Result<Ack, ApiError> {
        let result = self.inner.mark_notification_read(id).await;
        self.mode.recover("read acknowledgement", result, |_| Ack::ok())
    }

    async fn get_user_settings(&self) -> Result<UserSettings, ApiError> {
        let result = self.inner.get_user_settings().await;
        self.mode.recover("user settings", result, |_| user_settings())
    }

    async fn update_user_settings(&self, patch: &SettingsPatch) -> Result<SettingsPatch, ApiError> {
        let result = self.inner.update_user_settings(patch).await;
        self.mode.recover("settings update", result, |_| patch.clone())
    }

    async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        let result = self.inner.check_health().await;
        self.mode.recover("health status", result, health)
    }
}
