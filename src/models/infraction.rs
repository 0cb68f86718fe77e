use super::{ChatMessage, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InfractionType {
    #[serde(alias = "warning")]
    Warning,
    #[serde(alias = "mute")]
    Mute,
    #[serde(alias = "kick")]
    Kick,
    #[serde(alias = "ban")]
    Ban,
}

impl InfractionType {
    /// Path segment used by the create endpoints
    pub fn path(&self) -> &'static str {
        match self {
            InfractionType::Warning => "warning",
            InfractionType::Mute => "mute",
            InfractionType::Kick => "kick",
            InfractionType::Ban => "ban",
        }
    }

    /// Whether the infraction carries a duration
    pub fn is_timed(&self) -> bool {
        matches!(self, InfractionType::Mute | InfractionType::Ban)
    }
}

impl fmt::Display for InfractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InfractionType::Warning => "Warning",
            InfractionType::Mute => "Mute",
            InfractionType::Kick => "Kick",
            InfractionType::Ban => "Ban",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Infraction {
    pub id: Id,
    pub player_id: String,
    pub platform: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub server_id: Id,
    #[serde(rename = "type")]
    pub kind: InfractionType,
    #[serde(default)]
    pub reason: Option<String>,
    /// Minutes; zero or absent means permanent
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub system_action: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repealed: bool,
    #[serde(default)]
    pub issuer_name: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub linked_chat_messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infraction_id: Option<Id>,
    pub url: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAttachmentParams {
    pub url: String,
    pub note: String,
}

/// Body for creating any infraction type
///
/// `duration` is only sent for mutes and bans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateInfractionParams {
    pub player_id: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<CreateAttachmentParams>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_chat_messages: Vec<Id>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateInfractionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repealed: Option<bool>,
}
