use super::{Id, OnlinePlayer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: Id,
    pub game: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    /// Sub-instance grouped under a parent server
    #[serde(default)]
    pub is_fragment: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub online_players: Vec<OnlinePlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateServerParams {
    pub game: String,
    pub name: String,
    pub address: String,
    pub rcon_port: String,
    pub rcon_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateServerParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rcon_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rcon_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_minimal_deserialization() {
        let json = r#"{"id":1,"game":"Mordhau","name":"EU #1","address":"10.0.0.1"}"#;
        let server: Server = serde_json::from_str(json).unwrap();

        assert_eq!(server.id, 1);
        assert!(!server.is_fragment);
        assert!(server.status.is_none());
        assert!(server.online_players.is_empty());
    }

    #[test]
    fn test_update_params_skip_unset() {
        let params = UpdateServerParams {
            name: Some("EU #2".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"name":"EU #2"}"#);
    }
}
