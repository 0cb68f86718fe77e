use super::ApiClient;
use crate::error::ApiResult;
use crate::models::{
    Attachment, CreateAttachmentParams, CreateInfractionParams, Id, Infraction, InfractionType,
    UpdateInfractionParams,
};
use serde_json::json;

impl ApiClient {
    pub async fn create_infraction(
        &self,
        kind: InfractionType,
        server_id: Id,
        params: &CreateInfractionParams,
    ) -> ApiResult<Infraction> {
        let mut params = params.clone();
        if !kind.is_timed() {
            params.duration = None;
        }
        self.post(&format!("/infractions/{}/{}", kind.path(), server_id), &params)
            .await
    }

    pub async fn update_infraction(
        &self,
        id: Id,
        params: &UpdateInfractionParams,
    ) -> ApiResult<Infraction> {
        self.patch(&format!("/infractions/{}", id), params).await
    }

    pub async fn set_infraction_repealed(&self, id: Id, repealed: bool) -> ApiResult<Infraction> {
        self.post(
            &format!("/infractions/{}/repealed", id),
            &json!({ "repealed": repealed }),
        )
        .await
    }

    pub async fn get_player_infractions(
        &self,
        platform: &str,
        player_id: &str,
    ) -> ApiResult<Vec<Infraction>> {
        self.get(&format!("/infractions/player/{}/{}", platform, player_id))
            .await
    }

    pub async fn get_infraction(&self, id: Id) -> ApiResult<Infraction> {
        self.get(&format!("/infractions/{}", id)).await
    }

    pub async fn delete_infraction(&self, id: Id) -> ApiResult<()> {
        self.delete(&format!("/infractions/{}", id)).await
    }

    pub async fn add_attachment(
        &self,
        infraction_id: Id,
        params: &CreateAttachmentParams,
    ) -> ApiResult<Attachment> {
        self.post(&format!("/infractions/{}/attachment", infraction_id), params)
            .await
    }

    pub async fn remove_attachment(&self, attachment_id: Id) -> ApiResult<()> {
        self.delete(&format!("/infractions/attachment/{}", attachment_id))
            .await
    }
}
