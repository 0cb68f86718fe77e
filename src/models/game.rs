use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub name: String,
    pub platform: String,
    #[serde(default)]
    pub chat_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCommand {
    pub command: String,
    #[serde(default)]
    pub run_on_all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfractionCommands {
    #[serde(default)]
    pub warn: Vec<GameCommand>,
    #[serde(default)]
    pub mute: Vec<GameCommand>,
    #[serde(default)]
    pub kick: Vec<GameCommand>,
    #[serde(default)]
    pub ban: Vec<GameCommand>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncCommands {
    #[serde(default)]
    pub mute: Vec<GameCommand>,
    #[serde(default)]
    pub ban: Vec<GameCommand>,
}

/// Commands the backend runs on game servers per infraction lifecycle event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameCommandSettings {
    #[serde(default)]
    pub create: InfractionCommands,
    #[serde(default)]
    pub update: InfractionCommands,
    #[serde(default)]
    pub delete: InfractionCommands,
    #[serde(default)]
    pub repeal: InfractionCommands,
    #[serde(default)]
    pub sync: SyncCommands,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameGeneralSettings {
    #[serde(default)]
    pub enable_ban_sync: bool,
    #[serde(default)]
    pub enable_mute_sync: bool,
    #[serde(default)]
    pub player_infraction_threshold: u32,
    #[serde(default)]
    pub player_infraction_timespan: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default)]
    pub commands: GameCommandSettings,
    #[serde(default)]
    pub general: GameGeneralSettings,
}
