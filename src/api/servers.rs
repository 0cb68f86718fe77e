use super::ApiClient;
use crate::error::ApiResult;
use crate::models::{CreateServerParams, Id, Server, UpdateServerParams};

impl ApiClient {
    pub async fn get_servers(&self) -> ApiResult<Vec<Server>> {
        self.get("/servers/").await
    }

    pub async fn create_server(&self, params: &CreateServerParams) -> ApiResult<Server> {
        self.post("/servers/", params).await
    }

    pub async fn update_server(&self, id: Id, params: &UpdateServerParams) -> ApiResult<Server> {
        self.patch(&format!("/servers/{}", id), params).await
    }

    pub async fn deactivate_server(&self, id: Id) -> ApiResult<()> {
        self.patch_unit(&format!("/servers/deactivate/{}", id)).await
    }
}
