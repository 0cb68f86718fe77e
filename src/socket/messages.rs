//! Socket message shapes
//!
//! Every frame is a JSON object `{"type": ..., "body": ...}`. The body shape
//! depends on the type; inbound bodies are decoded into [`LiveEvent`]s.

use crate::models::{ChatMessage, Id, OnlinePlayer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PLAYER_JOIN: &str = "player-join";
pub const PLAYER_QUIT: &str = "player-quit";
pub const SERVER_STATUS: &str = "server-status";
pub const CHAT: &str = "chat";
pub const PLAYER_LIST_REFRESH: &str = "player-list-refresh";

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "body", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Keepalive; the body is always null
    Ping(()),
}

impl ClientMessage {
    pub fn ping() -> Self {
        ClientMessage::Ping(())
    }
}

/// Raw inbound frame before the body is interpreted
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct PlayerJoinBody {
    #[serde(rename = "serverId")]
    server_id: Id,
    #[serde(flatten)]
    player: OnlinePlayer,
}

#[derive(Debug, Clone, Deserialize)]
struct PlayerQuitBody {
    #[serde(rename = "serverId")]
    server_id: Id,
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerStatusBody {
    server_id: Id,
    status: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PlayerListBody {
    server_id: Id,
    #[serde(default)]
    online_players: Vec<OnlinePlayer>,
}

/// A decoded server push
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    PlayerJoin { server_id: Id, player: OnlinePlayer },
    PlayerQuit { server_id: Id, player_id: String },
    ServerStatus { server_id: Id, status: String },
    Chat { server_id: Id, message: ChatMessage },
    PlayerListRefresh { server_id: Id, players: Vec<OnlinePlayer> },
}

impl LiveEvent {
    /// Decode one text frame
    ///
    /// `Ok(None)` for message types this client does not handle.
    pub fn parse(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: Envelope) -> Result<Option<Self>, serde_json::Error> {
        let event = match envelope.kind.as_str() {
            PLAYER_JOIN => {
                let body: PlayerJoinBody = serde_json::from_value(envelope.body)?;
                LiveEvent::PlayerJoin {
                    server_id: body.server_id,
                    player: body.player,
                }
            }
            PLAYER_QUIT => {
                let body: PlayerQuitBody = serde_json::from_value(envelope.body)?;
                LiveEvent::PlayerQuit {
                    server_id: body.server_id,
                    player_id: body.id,
                }
            }
            SERVER_STATUS => {
                let body: ServerStatusBody = serde_json::from_value(envelope.body)?;
                LiveEvent::ServerStatus {
                    server_id: body.server_id,
                    status: body.status,
                }
            }
            CHAT => {
                let message: ChatMessage = serde_json::from_value(envelope.body)?;
                LiveEvent::Chat {
                    server_id: message.server_id,
                    message,
                }
            }
            PLAYER_LIST_REFRESH => {
                let body: PlayerListBody = serde_json::from_value(envelope.body)?;
                LiveEvent::PlayerListRefresh {
                    server_id: body.server_id,
                    players: body.online_players,
                }
            }
            _ => return Ok(None),
        };

        Ok(Some(event))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LiveEvent::PlayerJoin { .. } => PLAYER_JOIN,
            LiveEvent::PlayerQuit { .. } => PLAYER_QUIT,
            LiveEvent::ServerStatus { .. } => SERVER_STATUS,
            LiveEvent::Chat { .. } => CHAT,
            LiveEvent::PlayerListRefresh { .. } => PLAYER_LIST_REFRESH,
        }
    }

    pub fn server_id(&self) -> Id {
        match self {
            LiveEvent::PlayerJoin { server_id, .. }
            | LiveEvent::PlayerQuit { server_id, .. }
            | LiveEvent::ServerStatus { server_id, .. }
            | LiveEvent::Chat { server_id, .. }
            | LiveEvent::PlayerListRefresh { server_id, .. } => *server_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_serialization() {
        let json = serde_json::to_string(&ClientMessage::ping()).unwrap();
        assert_eq!(json, r#"{"type":"ping","body":null}"#);
    }

    #[test]
    fn test_parse_player_join() {
        let text = r#"{"type":"player-join","body":{"serverId":3,"id":"abc","platform":"playfab","name":"Bob","watched":true,"infraction_count":2,"infraction_count_since_timespan":1}}"#;

        match LiveEvent::parse(text).unwrap() {
            Some(LiveEvent::PlayerJoin { server_id, player }) => {
                assert_eq!(server_id, 3);
                assert_eq!(player.id, "abc");
                assert_eq!(player.name, "Bob");
                assert!(player.watched);
                assert_eq!(player.infraction_count, 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_player_quit() {
        let text = r#"{"type":"player-quit","body":{"serverId":3,"id":"abc","platform":"playfab"}}"#;
        assert_eq!(
            LiveEvent::parse(text).unwrap(),
            Some(LiveEvent::PlayerQuit {
                server_id: 3,
                player_id: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_parse_server_status() {
        let text = r#"{"type":"server-status","body":{"server_id":1,"status":"Offline"}}"#;
        let event = LiveEvent::parse(text).unwrap().unwrap();
        assert_eq!(event.kind(), SERVER_STATUS);
        assert_eq!(event.server_id(), 1);
    }

    #[test]
    fn test_parse_chat() {
        let text = r#"{"type":"chat","body":{"id":10,"player_id":"abc","platform":"playfab","server_id":2,"name":"Bob","message":"hi","flagged":false}}"#;
        match LiveEvent::parse(text).unwrap() {
            Some(LiveEvent::Chat { server_id, message }) => {
                assert_eq!(server_id, 2);
                assert_eq!(message.message, "hi");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_player_list_refresh() {
        let text = r#"{"type":"player-list-refresh","body":{"server_id":5,"online_players":[{"id":"a","platform":"playfab","name":"A"}]}}"#;
        match LiveEvent::parse(text).unwrap() {
            Some(LiveEvent::PlayerListRefresh { server_id, players }) => {
                assert_eq!(server_id, 5);
                assert_eq!(players.len(), 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let text = r#"{"type":"pong","body":null}"#;
        assert_eq!(LiveEvent::parse(text).unwrap(), None);
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(LiveEvent::parse("not json").is_err());
        assert!(LiveEvent::parse(r#"{"body":{}}"#).is_err());
        assert!(LiveEvent::parse(r#"{"type":"player-join","body":{"id":"abc"}}"#).is_err());
    }
}
