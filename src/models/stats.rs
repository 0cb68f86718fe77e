use serde::{Deserialize, Serialize};

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_players: u64,
    pub new_players_last_day: u64,
    pub unique_players_last_day: u64,
    pub total_infractions: u64,
    pub new_infractions_last_day: u64,
    pub total_chat_messages: u64,
    pub new_chat_messages_last_day: u64,
}
