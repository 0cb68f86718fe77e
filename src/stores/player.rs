use super::{fetched, LoadingStore};
use crate::api::ApiClient;
use crate::models::{Id, OnlinePlayer, Player};
use crate::notify::Notifier;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::watch;

/// Online players per server, keyed by player id
pub type ServerPlayers = HashMap<Id, BTreeMap<String, OnlinePlayer>>;

#[derive(Clone)]
pub struct PlayerStore {
    api: ApiClient,
    notifier: Notifier,
    loading: LoadingStore,
    online: watch::Sender<ServerPlayers>,
}

impl PlayerStore {
    pub fn new(api: ApiClient, notifier: Notifier, loading: LoadingStore) -> Self {
        let (online, _) = watch::channel(HashMap::new());
        Self {
            api,
            notifier,
            loading,
            online,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerPlayers> {
        self.online.subscribe()
    }

    pub async fn get_player(&self, platform: &str, id: &str) -> Option<Player> {
        let _busy = self.loading.begin("player");
        let result = self
            .api
            .latest(&format!("player:{}:{}", platform, id), self.api.get_player(platform, id))
            .await;

        fetched(&self.notifier, result, "Could not get player")
    }

    /// Online players on one server, ordered by id
    pub fn online_players(&self, server_id: Id) -> Vec<OnlinePlayer> {
        self.online
            .borrow()
            .get(&server_id)
            .map(|players| players.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn online_count(&self, server_id: Id) -> usize {
        self.online.borrow().get(&server_id).map_or(0, BTreeMap::len)
    }

    /// Insert or refresh a player; a repeated join never duplicates the entry
    pub fn add_player_to_server(&self, server_id: Id, player: OnlinePlayer) {
        self.online.send_modify(|servers| {
            servers
                .entry(server_id)
                .or_default()
                .insert(player.id.clone(), player);
        });
    }

    pub fn remove_player_from_server(&self, server_id: Id, player_id: &str) {
        self.online.send_if_modified(|servers| {
            servers
                .get_mut(&server_id)
                .map_or(false, |players| players.remove(player_id).is_some())
        });
    }

    /// Replace a server's whole online set
    pub fn set_server_players(&self, server_id: Id, players: Vec<OnlinePlayer>) {
        let players = players.into_iter().map(|p| (p.id.clone(), p)).collect();
        self.online.send_modify(|servers| {
            servers.insert(server_id, players);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, name: &str) -> OnlinePlayer {
        OnlinePlayer {
            id: id.to_string(),
            platform: "playfab".to_string(),
            name: name.to_string(),
            watched: false,
            infraction_count: 0,
            infraction_count_since_timespan: 0,
        }
    }

    fn store() -> PlayerStore {
        let api = ApiClient::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        PlayerStore::new(api, Notifier::new(), LoadingStore::new())
    }

    #[test]
    fn test_join_twice_keeps_one_entry() {
        let store = store();
        store.add_player_to_server(1, player("abc", "old name"));
        store.add_player_to_server(1, player("abc", "new name"));

        let online = store.online_players(1);
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].name, "new name");
        assert!(store.online_players(2).is_empty());
    }

    #[test]
    fn test_quit_removes_only_that_player() {
        let store = store();
        store.add_player_to_server(1, player("a", "A"));
        store.add_player_to_server(1, player("b", "B"));
        store.add_player_to_server(2, player("a", "A"));

        store.remove_player_from_server(1, "a");

        assert_eq!(store.online_players(1), vec![player("b", "B")]);
        assert_eq!(store.online_count(2), 1);
    }

    #[test]
    fn test_quit_unknown_server_is_noop() {
        let store = store();
        let mut rx = store.subscribe();
        store.remove_player_from_server(7, "nobody");
        assert!(!rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_set_server_players_replaces() {
        let store = store();
        store.add_player_to_server(1, player("stale", "Stale"));
        store.set_server_players(1, vec![player("x", "X"), player("y", "Y"), player("x", "X")]);

        let ids: Vec<String> = store.online_players(1).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }
}
