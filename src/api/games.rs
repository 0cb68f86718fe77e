use super::ApiClient;
use crate::error::ApiResult;
use crate::models::{Game, GameCommandSettings, GameSettings};

impl ApiClient {
    pub async fn get_games(&self) -> ApiResult<Vec<Game>> {
        self.get("/games/").await
    }

    pub async fn get_game_settings(&self, game: &str) -> ApiResult<GameSettings> {
        self.get(&format!("/games/settings/{}", game)).await
    }

    pub async fn get_default_game_settings(&self, game: &str) -> ApiResult<GameSettings> {
        self.get(&format!("/games/settings/{}/default", game)).await
    }

    pub async fn set_game_command_settings(
        &self,
        game: &str,
        commands: &GameCommandSettings,
    ) -> ApiResult<GameCommandSettings> {
        self.patch(&format!("/games/settings/{}/commands", game), commands)
            .await
    }
}
