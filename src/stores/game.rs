use super::{fetched, submitted, Submission};
use crate::api::ApiClient;
use crate::models::{Game, GameCommandSettings, GameSettings};
use crate::notify::Notifier;
use std::collections::HashMap;
use tokio::sync::watch;

#[derive(Clone)]
pub struct GameStore {
    api: ApiClient,
    notifier: Notifier,
    games: watch::Sender<Vec<Game>>,
    settings: watch::Sender<HashMap<String, GameSettings>>,
}

impl GameStore {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        let (games, _) = watch::channel(Vec::new());
        let (settings, _) = watch::channel(HashMap::new());
        Self {
            api,
            notifier,
            games,
            settings,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Game>> {
        self.games.subscribe()
    }

    pub fn games(&self) -> Vec<Game> {
        self.games.borrow().clone()
    }

    /// Cached settings for `game`, if loaded
    pub fn settings(&self, game: &str) -> Option<GameSettings> {
        self.settings.borrow().get(game).cloned()
    }

    pub async fn get_all_games(&self) -> bool {
        let result = self.api.latest("games", self.api.get_games()).await;
        match fetched(&self.notifier, result, "Could not get games") {
            Some(games) => {
                self.games.send_replace(games);
                true
            }
            None => false,
        }
    }

    pub async fn get_game_settings(&self, game: &str) -> Option<GameSettings> {
        let result = self
            .api
            .latest(
                &format!("game-settings:{}", game),
                self.api.get_game_settings(game),
            )
            .await;

        let settings = fetched(&self.notifier, result, "Could not get game settings")?;
        self.settings.send_modify(|all| {
            all.insert(game.to_string(), settings.clone());
        });
        Some(settings)
    }

    /// Factory settings; not cached, the caller decides whether to apply them
    pub async fn get_default_game_settings(&self, game: &str) -> Option<GameSettings> {
        let result = self.api.get_default_game_settings(game).await;
        fetched(&self.notifier, result, "Could not get default game settings")
    }

    pub async fn set_game_command_settings(
        &self,
        game: &str,
        commands: &GameCommandSettings,
    ) -> Submission<GameCommandSettings> {
        let result = self.api.set_game_command_settings(game, commands).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Game commands saved"),
            "Could not save game commands",
        );

        if let Submission::Done(saved) = &outcome {
            let saved = saved.clone();
            self.settings.send_modify(|all| {
                all.entry(game.to_string()).or_default().commands = saved;
            });
        }
        outcome
    }
}
