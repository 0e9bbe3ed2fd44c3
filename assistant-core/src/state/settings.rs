//! Settings store
//!
//! Saves are not applied optimistically: the settings only change once the
//! service acknowledges the update. `update_local_setting` exists for instant
//! UI feedback ahead of an explicit save.
//!
//! Overlapping saves are fenced per field. An acknowledged patch is always
//! merged, minus the fields a newer save has also written.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::notify::{Notifier, Slice};
use super::request::{RequestId, RequestSequence, Track};
use super::rejection_message;
use crate::error::ApiError;
use crate::gateway::AssistantApi;
use crate::types::{SettingUpdate, SettingsPatch, UserSettings};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsState {
    pub settings: UserSettings,
    pub loading: bool,
    pub saving: bool,
    /// Shared by fetch and save; the later completion wins
    pub error: Option<String>,
    #[serde(skip)]
    fetch_track: Track,
    #[serde(skip)]
    save_track: Track,
    #[serde(skip)]
    field_tracks: FieldTracks,
}

/// Latest save per settings field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FieldTracks {
    push_notifications: Track,
    whatsapp_notifications: Track,
    auto_responses: Track,
    processing_schedule: Track,
    ai_provider: Track,
}

impl FieldTracks {
    fn begin(&mut self, id: RequestId, patch: &SettingsPatch) {
        if patch.push_notifications.is_some() {
            self.push_notifications.begin(id);
        }
        if patch.whatsapp_notifications.is_some() {
            self.whatsapp_notifications.begin(id);
        }
        if patch.auto_responses.is_some() {
            self.auto_responses.begin(id);
        }
        if patch.processing_schedule.is_some() {
            self.processing_schedule.begin(id);
        }
        if patch.ai_provider.is_some() {
            self.ai_provider.begin(id);
        }
    }

    /// Strip the fields a newer save owns
    fn unclaimed(&self, id: RequestId, mut patch: SettingsPatch) -> SettingsPatch {
        if self.push_notifications.is_superseded(id) {
            patch.push_notifications = None;
        }
        if self.whatsapp_notifications.is_superseded(id) {
            patch.whatsapp_notifications = None;
        }
        if self.auto_responses.is_superseded(id) {
            patch.auto_responses = None;
        }
        if self.processing_schedule.is_superseded(id) {
            patch.processing_schedule = None;
        }
        if self.ai_provider.is_superseded(id) {
            patch.ai_provider = None;
        }
        patch
    }
}

#[derive(Debug, Clone)]
pub enum SettingsAction {
    FetchPending(RequestId),
    FetchFulfilled(RequestId, UserSettings),
    FetchRejected(RequestId, ApiError),
    UpdatePending(RequestId, SettingsPatch),
    UpdateFulfilled(RequestId, SettingsPatch),
    UpdateRejected(RequestId, ApiError),
    UpdateLocal(SettingUpdate),
    Reset,
    ClearError,
}

impl SettingsState {
    pub fn reduce(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::FetchPending(id) => {
                self.fetch_track.begin(id);
                self.loading = true;
                self.error = None;
            }
            SettingsAction::FetchFulfilled(id, settings) => {
                if !self.fetch_track.is_current(id) {
                    debug!("Dropping stale settings {:?}", id);
                    return;
                }
                self.loading = false;
                self.settings = settings;
            }
            SettingsAction::FetchRejected(id, err) => {
                if !self.fetch_track.is_current(id) {
                    return;
                }
                self.loading = false;
                self.error = Some(rejection_message(&err, "Failed to fetch user settings"));
            }
            SettingsAction::UpdatePending(id, patch) => {
                self.save_track.begin(id);
                self.field_tracks.begin(id, &patch);
                self.saving = true;
                self.error = None;
            }
            SettingsAction::UpdateFulfilled(id, patch) => {
                let patch = self.field_tracks.unclaimed(id, patch);
                self.settings.merge(&patch);
                if self.save_track.is_current(id) {
                    self.saving = false;
                } else {
                    debug!("Settings update {:?} finished after a newer save", id);
                }
            }
            SettingsAction::UpdateRejected(id, err) => {
                if !self.save_track.is_current(id) {
                    return;
                }
                self.saving = false;
                self.error = Some(rejection_message(&err, "Failed to update settings"));
            }
            SettingsAction::UpdateLocal(update) => self.settings.apply(update),
            SettingsAction::Reset => self.settings = UserSettings::default(),
            SettingsAction::ClearError => self.error = None,
        }
    }
}

pub struct SettingsStore {
    state: RwLock<SettingsState>,
    api: Arc<dyn AssistantApi>,
    requests: RequestSequence,
    notifier: Notifier,
}

impl SettingsStore {
    pub fn new(api: Arc<dyn AssistantApi>, notifier: Notifier) -> Self {
        Self {
            state: RwLock::new(SettingsState::default()),
            api,
            requests: RequestSequence::default(),
            notifier,
        }
    }

    pub async fn snapshot(&self) -> SettingsState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: SettingsAction) {
        self.state.write().await.reduce(action);
        self.notifier.notify(Slice::Settings);
    }

    pub async fn fetch_user_settings(&self) -> Result<UserSettings, ApiError> {
        let id = self.requests.next();
        self.dispatch(SettingsAction::FetchPending(id)).await;

        let result = self.api.get_user_settings().await;
        match &result {
            Ok(s) => self.dispatch(SettingsAction::FetchFulfilled(id, s.clone())).await,
            Err(e) => self.dispatch(SettingsAction::FetchRejected(id, e.clone())).await,
        }
        result
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<SettingsPatch, ApiError> {
        let id = self.requests.next();
        self.dispatch(SettingsAction::UpdatePending(id, patch.clone()))
            .await;

        let result = self.api.update_user_settings(&patch).await;
        match &result {
            Ok(ack) => self.dispatch(SettingsAction::UpdateFulfilled(id, ack.clone())).await,
            Err(e) => self.dispatch(SettingsAction::UpdateRejected(id, e.clone())).await,
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::ScriptedApi;
    use crate::gateway::{FallbackMode, ResilientApi};
    use crate::types::{DEFAULT_AI_PROVIDER, DEFAULT_PROCESSING_SCHEDULE};

    fn id(n: u64) -> RequestId {
        RequestId::new(n)
    }

    fn custom() -> UserSettings {
        UserSettings {
            push_notifications: false,
            whatsapp_notifications: true,
            auto_responses: false,
            processing_schedule: "HOURLY".to_string(),
            ai_provider: "OPENAI".to_string(),
        }
    }

    #[test]
    fn test_initial_settings() {
        let state = SettingsState::default();
        assert!(state.settings.push_notifications);
        assert!(!state.settings.whatsapp_notifications);
        assert!(state.settings.auto_responses);
        assert_eq!(state.settings.processing_schedule, DEFAULT_PROCESSING_SCHEDULE);
        assert_eq!(state.settings.ai_provider, DEFAULT_AI_PROVIDER);
    }

    #[test]
    fn test_fetch_replaces_wholesale() {
        let mut state = SettingsState::default();
        state.reduce(SettingsAction::FetchPending(id(1)));
        assert!(state.loading);
        state.reduce(SettingsAction::FetchFulfilled(id(1), custom()));
        assert!(!state.loading);
        assert_eq!(state.settings, custom());
    }

    #[test]
    fn test_update_merges_over_current() {
        let mut state = SettingsState::default();
        state.reduce(SettingsAction::FetchPending(id(1)));
        state.reduce(SettingsAction::FetchFulfilled(id(1), custom()));

        state.reduce(SettingsAction::UpdatePending(
            id(2),
            SettingsPatch::from(SettingUpdate::WhatsappNotifications(false)),
        ));
        assert!(state.saving);
        state.reduce(SettingsAction::UpdateFulfilled(
            id(2),
            SettingsPatch {
                whatsapp_notifications: Some(false),
                ..SettingsPatch::default()
            },
        ));

        assert!(!state.saving);
        assert!(!state.settings.whatsapp_notifications);
        assert_eq!(state.settings.ai_provider, "OPENAI");
        assert_eq!(state.settings.processing_schedule, "HOURLY");
    }

    #[test]
    fn test_update_rejected_leaves_settings() {
        let mut state = SettingsState::default();
        state.reduce(SettingsAction::UpdatePending(
            id(1),
            SettingsPatch::from(SettingUpdate::AutoResponses(false)),
        ));
        state.reduce(SettingsAction::UpdateRejected(id(1), ApiError::new("")));

        assert!(!state.saving);
        assert_eq!(state.settings, UserSettings::default());
        assert_eq!(state.error.as_deref(), Some("Failed to update settings"));
    }

    #[test]
    fn test_older_save_cannot_overwrite_newer() {
        let mut state = SettingsState::default();
        state.reduce(SettingsAction::UpdatePending(
            id(1),
            SettingsPatch::from(SettingUpdate::AiProvider("OLD".to_string())),
        ));
        state.reduce(SettingsAction::UpdatePending(
            id(2),
            SettingsPatch::from(SettingUpdate::AiProvider("NEW".to_string())),
        ));
        state.reduce(SettingsAction::UpdateFulfilled(
            id(2),
            SettingsPatch::from(SettingUpdate::AiProvider("NEW".to_string())),
        ));
        state.reduce(SettingsAction::UpdateFulfilled(
            id(1),
            SettingsPatch::from(SettingUpdate::AiProvider("OLD".to_string())),
        ));

        assert_eq!(state.settings.ai_provider, "NEW");
        assert!(!state.saving);
    }

    #[test]
    fn test_overlapping_saves_on_different_fields_both_apply() {
        let mut state = SettingsState::default();
        let push_off = SettingsPatch::from(SettingUpdate::PushNotifications(false));
        let openai = SettingsPatch::from(SettingUpdate::AiProvider("OPENAI".to_string()));

        state.reduce(SettingsAction::UpdatePending(id(1), push_off.clone()));
        state.reduce(SettingsAction::UpdatePending(id(2), openai.clone()));
        state.reduce(SettingsAction::UpdateFulfilled(id(2), openai));
        assert!(state.saving);

        state.reduce(SettingsAction::UpdateFulfilled(id(1), push_off));

        assert!(!state.settings.push_notifications);
        assert_eq!(state.settings.ai_provider, "OPENAI");
        assert!(!state.saving);
    }

    #[test]
    fn test_older_save_keeps_only_unclaimed_fields() {
        let mut state = SettingsState::default();
        let older = SettingsPatch {
            auto_responses: Some(false),
            processing_schedule: Some("HOURLY".to_string()),
            ..SettingsPatch::default()
        };
        let newer = SettingsPatch::from(SettingUpdate::ProcessingSchedule("DAILY".to_string()));

        state.reduce(SettingsAction::UpdatePending(id(1), older.clone()));
        state.reduce(SettingsAction::UpdatePending(id(2), newer.clone()));
        state.reduce(SettingsAction::UpdateFulfilled(id(2), newer));
        state.reduce(SettingsAction::UpdateFulfilled(id(1), older));

        assert!(!state.settings.auto_responses);
        assert_eq!(state.settings.processing_schedule, "DAILY");
    }

    #[test]
    fn test_fetch_and_save_tracks_are_independent() {
        let mut state = SettingsState::default();
        state.reduce(SettingsAction::UpdatePending(
            id(1),
            SettingsPatch::from(SettingUpdate::AutoResponses(false)),
        ));
        state.reduce(SettingsAction::FetchPending(id(2)));
        assert!(state.saving && state.loading);

        state.reduce(SettingsAction::FetchFulfilled(id(2), custom()));
        assert!(state.saving);
        assert!(!state.loading);

        state.reduce(SettingsAction::UpdateRejected(id(1), ApiError::new("save failed")));
        assert!(!state.saving);
        assert_eq!(state.error.as_deref(), Some("save failed"));
        assert_eq!(state.settings, custom());
    }

    #[test]
    fn test_local_update_and_reset() {
        let mut state = SettingsState::default();
        state.reduce(SettingsAction::UpdateLocal(SettingUpdate::ProcessingSchedule(
            "EVERY_HOUR".to_string(),
        )));
        assert_eq!(state.settings.processing_schedule, "EVERY_HOUR");
        assert!(state.settings.push_notifications);

        state.reduce(SettingsAction::Reset);
        assert_eq!(state.settings, UserSettings::default());
    }

    #[test]
    fn test_clear_error() {
        let mut state = SettingsState {
            error: Some("x".to_string()),
            ..SettingsState::default()
        };
        state.reduce(SettingsAction::ClearError);
        state.reduce(SettingsAction::ClearError);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_lenient_save_keeps_unrelated_fields() {
        let mock = ScriptedApi::new();
        mock.push_settings(Ok(custom()));
        mock.push_update_settings(Err(ApiError::with_status("Network request failed", 0)));
        let api = Arc::new(ResilientApi::new(mock, FallbackMode::Lenient));
        let store = SettingsStore::new(api, Notifier::default());

        store.fetch_user_settings().await.unwrap();
        store
            .update_settings(SettingsPatch {
                whatsapp_notifications: Some(false),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();

        let state = store.snapshot().await;
        assert!(!state.settings.whatsapp_notifications);
        assert_eq!(state.settings.ai_provider, "OPENAI");
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_strict_save_rejects() {
        let mock = ScriptedApi::new();
        mock.push_update_settings(Err(ApiError::with_status("Bad Request", 400)));
        let store = SettingsStore::new(Arc::new(mock), Notifier::default());

        let err = store
            .update_settings(SettingsPatch::from(SettingUpdate::AutoResponses(false)))
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(400));
        let state = store.snapshot().await;
        assert!(state.settings.auto_responses);
        assert_eq!(state.error.as_deref(), Some("Bad Request"));
    }
}
