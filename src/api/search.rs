use super::ApiClient;
use crate::error::ApiResult;
use crate::models::{
    ChatMessage, ChatSearchBody, InfractionSearchBody, InfractionSearchResult, PlayerSearchBody,
    PlayerSearchResult, SearchResults,
};

impl ApiClient {
    pub async fn search_players(
        &self,
        body: &PlayerSearchBody,
    ) -> ApiResult<SearchResults<PlayerSearchResult>> {
        self.post("/search/players", body).await
    }

    pub async fn search_infractions(
        &self,
        body: &InfractionSearchBody,
    ) -> ApiResult<SearchResults<InfractionSearchResult>> {
        self.post("/search/infractions", body).await
    }

    pub async fn search_chat_messages(
        &self,
        body: &ChatSearchBody,
    ) -> ApiResult<SearchResults<ChatMessage>> {
        self.post("/search/chat", body).await
    }
}
