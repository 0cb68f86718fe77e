use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub platform: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub previous_names: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

/// A player currently connected to a server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlinePlayer {
    pub id: String,
    pub platform: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub infraction_count: u32,
    #[serde(default)]
    pub infraction_count_since_timespan: u32,
}
