//! Application context
//!
//! Owns everything that would otherwise be global: the REST client, the toast
//! bus, the permission registry, every store and the live socket. Build one
//! with [`AppContext::new`], call [`init`](AppContext::init) once the user is
//! expected to be signed in, and [`shutdown`](AppContext::shutdown) before
//! dropping it so background tasks stop.

use crate::api::ApiClient;
use crate::config::{EnvConfig, SocketConfig};
use crate::error::Result;
use crate::notify::Notifier;
use crate::permissions::{PermissionRegistry, SharedRegistry};
use crate::socket::{LiveEvent, LiveEventSink, SocketClient};
use crate::stores::{
    AuthStore, ChatStore, GameStore, GroupStore, InfractionStore, LoadingStore, PlayerStore,
    SearchStore, ServerStore, StatsStore, UserStore,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Routes socket events into the stores that own the affected state
struct StoreSink {
    servers: ServerStore,
    players: PlayerStore,
    chat: ChatStore,
}

impl LiveEventSink for StoreSink {
    fn handle(&self, event: &LiveEvent) {
        match event {
            LiveEvent::PlayerJoin { server_id, player } => {
                self.players.add_player_to_server(*server_id, player.clone());
            }
            LiveEvent::PlayerQuit {
                server_id,
                player_id,
            } => {
                self.players.remove_player_from_server(*server_id, player_id);
            }
            LiveEvent::ServerStatus { server_id, status } => {
                self.servers.set_server_status(*server_id, status);
            }
            LiveEvent::Chat { server_id, message } => {
                self.chat.add_chat_message(*server_id, message.clone());
            }
            LiveEvent::PlayerListRefresh { server_id, players } => {
                self.players.set_server_players(*server_id, players.clone());
            }
        }
    }
}

pub struct AppContext {
    config: EnvConfig,
    api: ApiClient,
    notifier: Notifier,
    registry: SharedRegistry,
    loading: LoadingStore,
    auth: AuthStore,
    servers: ServerStore,
    players: PlayerStore,
    groups: GroupStore,
    users: UserStore,
    infractions: InfractionStore,
    chat: ChatStore,
    search: SearchStore,
    stats: StatsStore,
    games: GameStore,
    socket: SocketClient,
}

impl AppContext {
    pub fn new(config: EnvConfig) -> Result<Self> {
        Self::with_socket_config(config, SocketConfig::default())
    }

    pub fn with_socket_config(config: EnvConfig, socket_config: SocketConfig) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self::from_parts(config, api, socket_config))
    }

    /// Assemble around an existing REST client
    pub fn from_parts(config: EnvConfig, api: ApiClient, mut socket_config: SocketConfig) -> Self {
        if socket_config.session_cookie.is_none() {
            socket_config.session_cookie = config.session_cookie.clone();
        }

        let notifier = Notifier::new();
        let registry: SharedRegistry = Arc::new(RwLock::new(PermissionRegistry::builtin()));
        let loading = LoadingStore::new();

        let auth = AuthStore::new(api.clone(), notifier.clone(), registry.clone());
        let servers = ServerStore::new(api.clone(), notifier.clone(), loading.clone());
        let players = PlayerStore::new(api.clone(), notifier.clone(), loading.clone());
        let groups = GroupStore::new(api.clone(), notifier.clone(), registry.clone());
        let users = UserStore::new(api.clone(), notifier.clone());
        let infractions = InfractionStore::new(api.clone(), notifier.clone(), loading.clone());
        let chat = ChatStore::new(api.clone(), notifier.clone());
        let search = SearchStore::new(api.clone(), notifier.clone(), loading.clone());
        let stats = StatsStore::new(api.clone(), notifier.clone(), loading.clone());
        let games = GameStore::new(api.clone(), notifier.clone());

        let sink = Arc::new(StoreSink {
            servers: servers.clone(),
            players: players.clone(),
            chat: chat.clone(),
        });
        let socket = SocketClient::new(
            config.ws_root.clone(),
            socket_config,
            notifier.clone(),
            sink,
        );

        Self {
            config,
            api,
            notifier,
            registry,
            loading,
            auth,
            servers,
            players,
            groups,
            users,
            infractions,
            chat,
            search,
            stats,
            games,
            socket,
        }
    }

    /// Load the signed-in user's view and open the live socket
    ///
    /// Returns false, without connecting, if there is no activated session.
    pub async fn init(&self) -> bool {
        if !self.auth.check_auth().await {
            debug!("no activated session, skipping init");
            return false;
        }

        // Permissions first: the admin flags on the self info depend on them.
        self.groups.get_all_permissions().await;
        self.auth.get_self_info().await;
        self.servers.get_all_servers().await;

        self.socket.connect();
        info!("console initialised");
        true
    }

    /// Stop every background task and abandon in-flight requests
    pub async fn shutdown(&self) {
        self.socket.disconnect().await;
        self.auth.shutdown();
        self.api.inflight().cancel_all();
        info!("console shut down");
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn loading(&self) -> &LoadingStore {
        &self.loading
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn servers(&self) -> &ServerStore {
        &self.servers
    }

    pub fn players(&self) -> &PlayerStore {
        &self.players
    }

    pub fn groups(&self) -> &GroupStore {
        &self.groups
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn infractions(&self) -> &InfractionStore {
        &self.infractions
    }

    pub fn chat(&self) -> &ChatStore {
        &self.chat
    }

    pub fn search(&self) -> &SearchStore {
        &self.search
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }

    pub fn games(&self) -> &GameStore {
        &self.games
    }

    pub fn socket(&self) -> &SocketClient {
        &self.socket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OnlinePlayer;

    fn context() -> AppContext {
        let config = EnvConfig::new("http://127.0.0.1:9", "http://127.0.0.1:9", "ws://127.0.0.1:9")
            .unwrap()
            .session_cookie("ory_kratos_session=abc");
        AppContext::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_sink_routes_player_events() {
        let ctx = context();
        let sink = StoreSink {
            servers: ctx.servers().clone(),
            players: ctx.players().clone(),
            chat: ctx.chat().clone(),
        };
        let player = OnlinePlayer {
            id: "abc".to_string(),
            platform: "playfab".to_string(),
            name: "Bob".to_string(),
            watched: false,
            infraction_count: 0,
            infraction_count_since_timespan: 0,
        };

        sink.handle(&LiveEvent::PlayerJoin {
            server_id: 1,
            player: player.clone(),
        });
        sink.handle(&LiveEvent::PlayerJoin {
            server_id: 1,
            player: player.clone(),
        });
        assert_eq!(ctx.players().online_players(1), vec![player]);

        sink.handle(&LiveEvent::PlayerQuit {
            server_id: 1,
            player_id: "abc".to_string(),
        });
        assert!(ctx.players().online_players(1).is_empty());
    }

    #[tokio::test]
    async fn test_registry_starts_with_builtin_flags() {
        let ctx = context();
        assert!(!ctx.registry().read().is_empty());
        assert_eq!(ctx.config().session_cookie.as_deref(), Some("ory_kratos_session=abc"));
    }

    #[tokio::test]
    async fn test_shutdown_without_init() {
        let ctx = context();
        ctx.shutdown().await;
        assert_eq!(ctx.api().inflight().in_flight(), 0);
    }
}
