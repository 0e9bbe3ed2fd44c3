//! Response envelopes returned by the remote service
//!
//! These only exist at the transport boundary; stores never hold them.

use serde::{Deserialize, Serialize};

use crate::types::SettingsPatch;

/// `{ success }` acknowledgement for write endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default = "default_true")]
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Backend liveness as reported by the actuator endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}

/// Settings update response.
///
/// The service has answered with `{ data }`, `{ settings }` and a bare
/// settings object over time; all three are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SettingsUpdateResponse {
    Data { data: SettingsPatch },
    Legacy { settings: SettingsPatch },
    Bare(SettingsPatch),
}

impl SettingsUpdateResponse {
    /// Resolve into the patch the store should merge. Falls back to what was
    /// submitted when the service echoes nothing.
    pub fn into_patch(self, submitted: &SettingsPatch) -> SettingsPatch {
        match self {
            Self::Data { data: p } | Self::Legacy { settings: p } | Self::Bare(p) => {
                if p.is_empty() {
                    submitted.clone()
                } else {
                    p
                }
            }
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> SettingsPatch {
        SettingsPatch {
            auto_responses: Some(false),
            ..SettingsPatch::default()
        }
    }

    #[test]
    fn test_data_envelope() {
        let resp: SettingsUpdateResponse =
            serde_json::from_str(r#"{"success":true,"data":{"aiProvider":"OPENAI"}}"#).unwrap();
        let patch = resp.into_patch(&submitted());
        assert_eq!(patch.ai_provider.as_deref(), Some("OPENAI"));
        assert_eq!(patch.auto_responses, None);
    }

    #[test]
    fn test_legacy_settings_envelope() {
        let resp: SettingsUpdateResponse =
            serde_json::from_str(r#"{"settings":{"pushNotifications":false}}"#).unwrap();
        assert_eq!(resp.into_patch(&submitted()).push_notifications, Some(false));
    }

    #[test]
    fn test_bare_object() {
        let resp: SettingsUpdateResponse =
            serde_json::from_str(r#"{"whatsappNotifications":true}"#).unwrap();
        assert_eq!(resp.into_patch(&submitted()).whatsapp_notifications, Some(true));
    }

    #[test]
    fn test_empty_envelope_echoes_submitted() {
        let resp: SettingsUpdateResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(resp.into_patch(&submitted()), submitted());
    }

    #[test]
    fn test_ack_defaults_to_success() {
        let ack: Ack = serde_json::from_str("{}").unwrap();
        assert!(ack.success);
    }
}
