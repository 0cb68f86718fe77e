use super::ApiClient;
use crate::error::ApiResult;
use crate::models::{ChatMessage, FlaggedWord, Id};

impl ApiClient {
    pub async fn get_recent_chat_messages(
        &self,
        server_id: Id,
        count: usize,
    ) -> ApiResult<Vec<ChatMessage>> {
        self.get(&format!("/chat/recent/{}?count={}", server_id, count))
            .await
    }

    pub async fn get_flagged_words(&self) -> ApiResult<Vec<FlaggedWord>> {
        self.get("/chat/flagged-words").await
    }

    pub async fn create_flagged_word(&self, word: &FlaggedWord) -> ApiResult<FlaggedWord> {
        self.post("/chat/flagged-words", word).await
    }

    pub async fn update_flagged_word(&self, id: Id, word: &FlaggedWord) -> ApiResult<FlaggedWord> {
        self.patch(&format!("/chat/flagged-words/{}", id), word).await
    }

    pub async fn delete_flagged_word(&self, id: Id) -> ApiResult<()> {
        self.delete(&format!("/chat/flagged-words/{}", id)).await
    }
}
