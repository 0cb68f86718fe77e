use super::{completed, fetched, remove_by_key, submitted, upsert, LoadingStore, Submission};
use crate::api::ApiClient;
use crate::models::{CreateServerParams, Id, Server, UpdateServerParams};
use crate::notify::Notifier;
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone)]
pub struct ServerStore {
    api: ApiClient,
    notifier: Notifier,
    loading: LoadingStore,
    servers: watch::Sender<Vec<Server>>,
}

impl ServerStore {
    pub fn new(api: ApiClient, notifier: Notifier, loading: LoadingStore) -> Self {
        let (servers, _) = watch::channel(Vec::new());
        Self {
            api,
            notifier,
            loading,
            servers,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Server>> {
        self.servers.subscribe()
    }

    pub fn servers(&self) -> Vec<Server> {
        self.servers.borrow().clone()
    }

    pub fn server(&self, id: Id) -> Option<Server> {
        self.servers.borrow().iter().find(|s| s.id == id).cloned()
    }

    /// Servers shown in listings; fragments are grouped under their parent
    pub fn primary_servers(&self) -> Vec<Server> {
        self.servers
            .borrow()
            .iter()
            .filter(|s| !s.is_fragment)
            .cloned()
            .collect()
    }

    pub async fn get_all_servers(&self) -> bool {
        let _busy = self.loading.begin("servers");
        let result = self.api.latest("servers", self.api.get_servers()).await;

        match fetched(&self.notifier, result, "Could not get servers") {
            Some(servers) => {
                self.servers.send_replace(servers);
                true
            }
            None => false,
        }
    }

    pub async fn create_server(&self, params: &CreateServerParams) -> Submission<Server> {
        let result = self.api.create_server(params).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Server created"),
            "Could not create server",
        );

        if let Submission::Done(server) = &outcome {
            let server = server.clone();
            self.servers.send_modify(|servers| upsert(servers, server));
        }
        outcome
    }

    pub async fn update_server(&self, id: Id, params: &UpdateServerParams) -> Submission<Server> {
        let result = self.api.update_server(id, params).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Server updated"),
            "Could not update server",
        );

        if let Submission::Done(server) = &outcome {
            let server = server.clone();
            self.servers.send_modify(|servers| upsert(servers, server));
        }
        outcome
    }

    pub async fn deactivate_server(&self, id: Id) -> bool {
        let result = self.api.deactivate_server(id).await;
        let ok = completed(
            &self.notifier,
            result,
            "Server deactivated",
            "Could not deactivate server",
        );

        if ok {
            self.servers.send_modify(|servers| {
                remove_by_key(servers, &id);
            });
        }
        ok
    }

    /// Live status update; unknown servers are ignored
    pub fn set_server_status(&self, server_id: Id, status: &str) {
        self.servers.send_if_modified(|servers| {
            match servers.iter_mut().find(|s| s.id == server_id) {
                Some(server) => {
                    server.status = Some(status.to_string());
                    true
                }
                None => {
                    debug!(server_id, status, "status for unknown server");
                    false
                }
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn seed(&self, servers: Vec<Server>) {
        self.servers.send_replace(servers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(id: Id, fragment: bool) -> Server {
        Server {
            id,
            game: "minecraft".to_string(),
            name: format!("server-{}", id),
            address: "127.0.0.1".to_string(),
            created_at: None,
            modified_at: None,
            is_fragment: fragment,
            status: None,
            online_players: Vec::new(),
        }
    }

    fn store() -> ServerStore {
        let api = ApiClient::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        ServerStore::new(api, Notifier::new(), LoadingStore::new())
    }

    #[test]
    fn test_primary_servers_exclude_fragments() {
        let store = store();
        store.seed(vec![server(1, false), server(2, true), server(3, false)]);

        let ids: Vec<Id> = store.primary_servers().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_set_server_status() {
        let store = store();
        store.seed(vec![server(1, false)]);
        let mut rx = store.subscribe();

        store.set_server_status(1, "Online");
        assert!(rx.has_changed().unwrap());
        assert_eq!(store.server(1).and_then(|s| s.status), Some("Online".to_string()));

        rx.borrow_and_update();
        store.set_server_status(42, "Offline");
        assert!(!rx.has_changed().unwrap());
    }
}
