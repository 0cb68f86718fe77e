use super::{fetched, LoadingStore};
use crate::api::ApiClient;
use crate::models::{
    ChatMessage, ChatSearchBody, InfractionSearchBody, InfractionSearchResult, PlayerSearchBody,
    PlayerSearchResult, SearchResults,
};
use crate::notify::Notifier;
use tokio::sync::watch;

/// Most recent results for each kind of search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub players: SearchResults<PlayerSearchResult>,
    pub infractions: SearchResults<InfractionSearchResult>,
    pub chat: SearchResults<ChatMessage>,
}

/// Searches are superseded per kind: typing a new term abandons the old query
#[derive(Clone)]
pub struct SearchStore {
    api: ApiClient,
    notifier: Notifier,
    loading: LoadingStore,
    state: watch::Sender<SearchState>,
}

impl SearchStore {
    pub fn new(api: ApiClient, notifier: Notifier, loading: LoadingStore) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            api,
            notifier,
            loading,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub async fn search_players(
        &self,
        body: &PlayerSearchBody,
    ) -> Option<SearchResults<PlayerSearchResult>> {
        let _busy = self.loading.begin("search");
        let result = self
            .api
            .latest("search:players", self.api.search_players(body))
            .await;

        let results = fetched(&self.notifier, result, "Could not search players")?;
        self.state
            .send_modify(|state| state.players = results.clone());
        Some(results)
    }

    pub async fn search_infractions(
        &self,
        body: &InfractionSearchBody,
    ) -> Option<SearchResults<InfractionSearchResult>> {
        let _busy = self.loading.begin("search");
        let result = self
            .api
            .latest("search:infractions", self.api.search_infractions(body))
            .await;

        let results = fetched(&self.notifier, result, "Could not search infractions")?;
        self.state
            .send_modify(|state| state.infractions = results.clone());
        Some(results)
    }

    pub async fn search_chat_messages(
        &self,
        body: &ChatSearchBody,
    ) -> Option<SearchResults<ChatMessage>> {
        let _busy = self.loading.begin("search");
        let result = self
            .api
            .latest("search:chat", self.api.search_chat_messages(body))
            .await;

        let results = fetched(&self.notifier, result, "Could not search chat messages")?;
        self.state.send_modify(|state| state.chat = results.clone());
        Some(results)
    }
}
