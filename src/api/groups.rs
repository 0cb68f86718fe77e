use super::ApiClient;
use crate::error::ApiResult;
use crate::models::{Group, GroupReorderInfo, Id, NewGroupParams, Permission, ServerOverrides};

impl ApiClient {
    pub async fn get_groups(&self) -> ApiResult<Vec<Group>> {
        self.get("/groups/").await
    }

    pub async fn get_permissions(&self) -> ApiResult<Vec<Permission>> {
        self.get("/groups/permissions").await
    }

    pub async fn create_group(&self, params: &NewGroupParams) -> ApiResult<Group> {
        self.post("/groups/", params).await
    }

    pub async fn update_group(&self, id: Id, params: &NewGroupParams) -> ApiResult<Group> {
        self.patch(&format!("/groups/{}", id), params).await
    }

    pub async fn delete_group(&self, id: Id) -> ApiResult<()> {
        self.delete(&format!("/groups/{}", id)).await
    }

    pub async fn reorder_groups(&self, order: &[GroupReorderInfo]) -> ApiResult<Vec<Group>> {
        self.patch("/groups/order", order).await
    }

    pub async fn get_server_overrides(&self, server_id: Id) -> ApiResult<Vec<ServerOverrides>> {
        self.get(&format!("/groups/servers/{}/overrides", server_id))
            .await
    }

    pub async fn set_server_overrides(
        &self,
        server_id: Id,
        overrides: &ServerOverrides,
    ) -> ApiResult<ServerOverrides> {
        self.patch(&format!("/groups/servers/{}/overrides", server_id), overrides)
            .await
    }
}
