//! Alert configuration and notification preview types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert configuration as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfiguration {
    pub uuid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl AlertConfiguration {
    pub fn new(uuid: &str, name: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            name: name.to_string(),
            description: None,
            target_type: None,
            active: true,
            create_time: None,
        }
    }
}

/// Channel template submitted for rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlertTemplatePreviewRequest {
    #[serde(rename = "type")]
    pub channel_type: String,
    pub text_template: String,
}

impl AlertTemplatePreviewRequest {
    pub fn webhook(text_template: impl Into<String>) -> Self {
        Self {
            channel_type: "WebHook".to_string(),
            text_template: text_template.into(),
        }
    }
}

/// Rendered notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
}
