use super::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Id,
    pub player_id: String,
    pub platform: String,
    #[serde(default)]
    pub server_id: Id,
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub sent_by_user: bool,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedWord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub word: String,
}
