use super::ApiClient;
use crate::error::ApiResult;
use crate::models::Player;

impl ApiClient {
    pub async fn get_player(&self, platform: &str, id: &str) -> ApiResult<Player> {
        self.get(&format!("/players/{}/{}", platform, id)).await
    }
}
