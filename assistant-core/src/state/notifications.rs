//! Notifications store
//!
//! The unread count is derived from the notification list on every read, so
//! no mutation path can let it drift or go negative.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::notify::{Notifier, Slice};
use super::request::{RequestId, RequestSequence, Track};
use super::rejection_message;
use crate::error::ApiError;
use crate::gateway::AssistantApi;
use crate::types::responses::Ack;
use crate::types::Notification;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationsState {
    /// Newest first
    pub notifications: Vec<Notification>,
    pub loading: bool,
    pub error: Option<String>,
    fetch_track: Track,
}

impl Serialize for NotificationsState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("NotificationsState", 4)?;
        s.serialize_field("notifications", &self.notifications)?;
        s.serialize_field("loading", &self.loading)?;
        s.serialize_field("error", &self.error)?;
        s.serialize_field("unreadCount", &self.unread_count())?;
        s.end()
    }
}

#[derive(Debug, Clone)]
pub enum NotificationsAction {
    FetchPending(RequestId),
    FetchFulfilled(RequestId, Vec<Notification>),
    FetchRejected(RequestId, ApiError),
    MarkAsReadPending(String),
    MarkAsReadFulfilled(String),
    MarkAsReadRejected(String, ApiError),
    MarkAllAsRead,
    Remove(String),
    /// A live push arriving
    Add(Notification),
    ClearError,
}

impl NotificationsState {
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn reduce(&mut self, action: NotificationsAction) {
        match action {
            NotificationsAction::FetchPending(id) => {
                self.fetch_track.begin(id);
                self.loading = true;
                self.error = None;
            }
            NotificationsAction::FetchFulfilled(id, notifications) => {
                if !self.fetch_track.is_current(id) {
                    debug!("Dropping stale notifications {:?}", id);
                    return;
                }
                self.loading = false;
                self.notifications = notifications;
            }
            NotificationsAction::FetchRejected(id, err) => {
                if !self.fetch_track.is_current(id) {
                    return;
                }
                self.loading = false;
                self.error = Some(rejection_message(&err, "Failed to fetch notifications"));
            }
            NotificationsAction::MarkAsReadPending(_) => self.error = None,
            NotificationsAction::MarkAsReadFulfilled(notification_id) => {
                if let Some(n) = self.notifications.iter_mut().find(|n| n.id == notification_id) {
                    n.read = true;
                }
            }
            NotificationsAction::MarkAsReadRejected(_, err) => {
                self.error = Some(rejection_message(&err, "Failed to mark notification as read"));
            }
            NotificationsAction::MarkAllAsRead => {
                for n in &mut self.notifications {
                    n.read = true;
                }
            }
            NotificationsAction::Remove(notification_id) => {
                self.notifications.retain(|n| n.id != notification_id);
            }
            NotificationsAction::Add(notification) => {
                self.notifications.insert(0, notification);
            }
            NotificationsAction::ClearError => self.error = None,
        }
    }
}

pub struct NotificationStore {
    state: RwLock<NotificationsState>,
    api: Arc<dyn AssistantApi>,
    requests: RequestSequence,
    notifier: Notifier,
}

impl NotificationStore {
    pub fn new(api: Arc<dyn AssistantApi>, notifier: Notifier) -> Self {
        Self {
            state: RwLock::new(NotificationsState::default()),
            api,
            requests: RequestSequence::default(),
            notifier,
        }
    }

    pub async fn snapshot(&self) -> NotificationsState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: NotificationsAction) {
        self.state.write().await.reduce(action);
        self.notifier.notify(Slice::Notifications);
    }

    pub async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let id = self.requests.next();
        self.dispatch(NotificationsAction::FetchPending(id)).await;

        let result = self.api.get_notifications().await;
        match &result {
            Ok(list) => self.dispatch(NotificationsAction::FetchFulfilled(id, list.clone())).await,
            Err(e) => self.dispatch(NotificationsAction::FetchRejected(id, e.clone())).await,
        }
        result
    }

    /// Server first, then local: nothing changes until the service answers.
    pub async fn mark_as_read(&self, notification_id: &str) -> Result<Ack, ApiError> {
        self.dispatch(NotificationsAction::MarkAsReadPending(notification_id.to_string()))
            .await;

        let result = self.api.mark_notification_read(notification_id).await;
        let action = match &result {
            Ok(_) => NotificationsAction::MarkAsReadFulfilled(notification_id.to_string()),
            Err(e) => NotificationsAction::MarkAsReadRejected(notification_id.to_string(), e.clone()),
        };
        self.dispatch(action).await;
        result
    }
}
