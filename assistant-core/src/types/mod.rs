//! Data model shared by the gateway and the entity stores
//!
//! Field names follow the remote service's camelCase JSON.

pub mod responses;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Dashboard
// ============================================================================

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_emails: u64,
    pub urgent_emails: u64,
    pub auto_responses: u64,
    pub processed_today: u64,
}

/// Outcome of a manual processing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub processed_count: u64,
}

// ============================================================================
// Emails
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
    /// A level this client does not know yet
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Work,
    Meeting,
    Newsletter,
    #[serde(other)]
    Other,
}

/// An analyzed email as presented by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: String,
    pub subject: String,
    pub sender: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub received_at: DateTime<Utc>,
    pub priority: Priority,
    pub processed: bool,
    pub requires_attention: bool,
    pub category: Category,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One page of the email listing, as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPage {
    pub content: Vec<Email>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
}

/// Accepts RFC 3339 as well as zone-less timestamps, which are taken as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Urgent,
    AutoResponse,
    Processing,
    Whatsapp,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub time: String,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ============================================================================
// Settings
// ============================================================================

pub const DEFAULT_PROCESSING_SCHEDULE: &str = "EVERY_5_MINUTES";
pub const DEFAULT_AI_PROVIDER: &str = "DEEPSEEK_WITH_OPENAI_FALLBACK";

/// User preferences, a single aggregate record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub push_notifications: bool,
    pub whatsapp_notifications: bool,
    pub auto_responses: bool,
    pub processing_schedule: String,
    pub ai_provider: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            push_notifications: true,
            whatsapp_notifications: false,
            auto_responses: true,
            processing_schedule: DEFAULT_PROCESSING_SCHEDULE.to_string(),
            ai_provider: DEFAULT_AI_PROVIDER.to_string(),
        }
    }
}

impl UserSettings {
    /// Shallow merge: every field present in `patch` overwrites ours.
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.push_notifications {
            self.push_notifications = v;
        }
        if let Some(v) = patch.whatsapp_notifications {
            self.whatsapp_notifications = v;
        }
        if let Some(v) = patch.auto_responses {
            self.auto_responses = v;
        }
        if let Some(v) = &patch.processing_schedule {
            self.processing_schedule = v.clone();
        }
        if let Some(v) = &patch.ai_provider {
            self.ai_provider = v.clone();
        }
    }

    pub fn apply(&mut self, update: SettingUpdate) {
        self.merge(&SettingsPatch::from(update));
    }
}

/// Partial settings: absent fields mean "leave unchanged"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_responses: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<UserSettings> for SettingsPatch {
    fn from(s: UserSettings) -> Self {
        Self {
            push_notifications: Some(s.push_notifications),
            whatsapp_notifications: Some(s.whatsapp_notifications),
            auto_responses: Some(s.auto_responses),
            processing_schedule: Some(s.processing_schedule),
            ai_provider: Some(s.ai_provider),
        }
    }
}

/// A single settings field with its new value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum SettingUpdate {
    PushNotifications(bool),
    WhatsappNotifications(bool),
    AutoResponses(bool),
    ProcessingSchedule(String),
    AiProvider(String),
}

impl From<SettingUpdate> for SettingsPatch {
    fn from(update: SettingUpdate) -> Self {
        let mut patch = SettingsPatch::default();
        match update {
            SettingUpdate::PushNotifications(v) => patch.push_notifications = Some(v),
            SettingUpdate::WhatsappNotifications(v) => patch.whatsapp_notifications = Some(v),
            SettingUpdate::AutoResponses(v) => patch.auto_responses = Some(v),
            SettingUpdate::ProcessingSchedule(v) => patch.processing_schedule = Some(v),
            SettingUpdate::AiProvider(v) => patch.ai_provider = Some(v),
        }
        patch
    }
}
