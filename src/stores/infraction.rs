use super::{completed, fetched, remove_by_key, submitted, upsert, LoadingStore, Submission};
use crate::api::ApiClient;
use crate::models::{
    Attachment, CreateAttachmentParams, CreateInfractionParams, Id, Infraction, InfractionType,
    UpdateInfractionParams,
};
use crate::notify::Notifier;
use std::collections::HashMap;
use tokio::sync::watch;

/// Identifies a player across platforms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerKey {
    pub platform: String,
    pub id: String,
}

impl PlayerKey {
    pub fn new(platform: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            id: id.into(),
        }
    }
}

/// Infraction lists per player, as loaded for player pages
pub type PlayerInfractions = HashMap<PlayerKey, Vec<Infraction>>;

#[derive(Clone)]
pub struct InfractionStore {
    api: ApiClient,
    notifier: Notifier,
    loading: LoadingStore,
    by_player: watch::Sender<PlayerInfractions>,
}

impl InfractionStore {
    pub fn new(api: ApiClient, notifier: Notifier, loading: LoadingStore) -> Self {
        let (by_player, _) = watch::channel(HashMap::new());
        Self {
            api,
            notifier,
            loading,
            by_player,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerInfractions> {
        self.by_player.subscribe()
    }

    pub fn player_infractions(&self, platform: &str, player_id: &str) -> Vec<Infraction> {
        self.by_player
            .borrow()
            .get(&PlayerKey::new(platform, player_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Apply `f` to every cached copy of infraction `id`
    fn modify_infraction(&self, id: Id, mut f: impl FnMut(&mut Infraction)) {
        self.by_player.send_if_modified(|all| {
            let mut changed = false;
            for infraction in all.values_mut().flatten().filter(|i| i.id == id) {
                f(infraction);
                changed = true;
            }
            changed
        });
    }

    fn store_infraction(&self, infraction: Infraction) {
        let key = PlayerKey::new(&infraction.platform, &infraction.player_id);
        self.by_player
            .send_modify(|all| upsert(all.entry(key).or_default(), infraction));
    }

    async fn create(
        &self,
        kind: InfractionType,
        server_id: Id,
        params: &CreateInfractionParams,
    ) -> Submission<Infraction> {
        let result = self.api.create_infraction(kind, server_id, params).await;
        let (success, failure) = match kind {
            InfractionType::Warning => ("Warning created", "Could not create warning"),
            InfractionType::Mute => ("Mute created", "Could not create mute"),
            InfractionType::Kick => ("Kick created", "Could not create kick"),
            InfractionType::Ban => ("Ban created", "Could not create ban"),
        };

        let outcome = submitted(&self.notifier, result, Some(success), failure);
        if let Submission::Done(infraction) = &outcome {
            self.store_infraction(infraction.clone());
        }
        outcome
    }

    pub async fn create_warning(
        &self,
        server_id: Id,
        params: &CreateInfractionParams,
    ) -> Submission<Infraction> {
        self.create(InfractionType::Warning, server_id, params).await
    }

    pub async fn create_mute(
        &self,
        server_id: Id,
        params: &CreateInfractionParams,
    ) -> Submission<Infraction> {
        self.create(InfractionType::Mute, server_id, params).await
    }

    pub async fn create_kick(
        &self,
        server_id: Id,
        params: &CreateInfractionParams,
    ) -> Submission<Infraction> {
        self.create(InfractionType::Kick, server_id, params).await
    }

    pub async fn create_ban(
        &self,
        server_id: Id,
        params: &CreateInfractionParams,
    ) -> Submission<Infraction> {
        self.create(InfractionType::Ban, server_id, params).await
    }

    pub async fn update_infraction(
        &self,
        id: Id,
        params: &UpdateInfractionParams,
    ) -> Submission<Infraction> {
        let result = self.api.update_infraction(id, params).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Infraction updated"),
            "Could not update infraction",
        );

        if let Submission::Done(infraction) = &outcome {
            self.store_infraction(infraction.clone());
        }
        outcome
    }

    pub async fn set_infraction_repealed(&self, id: Id, repealed: bool) -> Submission<Infraction> {
        let result = self.api.set_infraction_repealed(id, repealed).await;
        let success = if repealed {
            "Infraction repealed"
        } else {
            "Infraction reinstated"
        };
        let outcome = submitted(
            &self.notifier,
            result,
            Some(success),
            "Could not update repeal status",
        );

        if let Submission::Done(infraction) = &outcome {
            self.store_infraction(infraction.clone());
        }
        outcome
    }

    pub async fn get_player_infractions(
        &self,
        platform: &str,
        player_id: &str,
    ) -> Option<Vec<Infraction>> {
        let _busy = self.loading.begin("infractions");
        let result = self
            .api
            .latest(
                &format!("infractions:{}:{}", platform, player_id),
                self.api.get_player_infractions(platform, player_id),
            )
            .await;

        let infractions = fetched(&self.notifier, result, "Could not get player infractions")?;
        let key = PlayerKey::new(platform, player_id);
        self.by_player.send_modify(|all| {
            all.insert(key, infractions.clone());
        });
        Some(infractions)
    }

    pub async fn get_infraction_by_id(&self, id: Id) -> Option<Infraction> {
        let result = self
            .api
            .latest(&format!("infraction:{}", id), self.api.get_infraction(id))
            .await;
        fetched(&self.notifier, result, "Could not get infraction")
    }

    pub async fn delete_infraction(&self, id: Id) -> bool {
        let result = self.api.delete_infraction(id).await;
        let ok = completed(
            &self.notifier,
            result,
            "Infraction deleted",
            "Could not delete infraction",
        );

        if ok {
            self.by_player.send_modify(|all| {
                for infractions in all.values_mut() {
                    remove_by_key(infractions, &id);
                }
            });
        }
        ok
    }

    pub async fn create_attachment(
        &self,
        infraction_id: Id,
        params: &CreateAttachmentParams,
    ) -> Submission<Attachment> {
        let result = self.api.add_attachment(infraction_id, params).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Attachment added"),
            "Could not add attachment",
        );

        if let Submission::Done(attachment) = &outcome {
            self.modify_infraction(infraction_id, |infraction| {
                infraction.attachments.push(attachment.clone());
            });
        }
        outcome
    }

    pub async fn delete_attachment(&self, attachment_id: Id) -> bool {
        let result = self.api.remove_attachment(attachment_id).await;
        let ok = completed(
            &self.notifier,
            result,
            "Attachment deleted",
            "Could not delete attachment",
        );

        if ok {
            self.by_player.send_modify(|all| {
                for infraction in all.values_mut().flatten() {
                    infraction
                        .attachments
                        .retain(|a| a.id != Some(attachment_id));
                }
            });
        }
        ok
    }
}
