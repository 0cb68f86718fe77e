use super::ApiClient;
use crate::error::ApiResult;
use crate::models::{Player, User, UserGroupParams, UserLinkParams, UserTraits};

impl ApiClient {
    pub async fn get_users(&self) -> ApiResult<Vec<User>> {
        self.get("/users/").await
    }

    pub async fn get_self_info(&self) -> ApiResult<User> {
        self.get("/users/me").await
    }

    pub async fn create_user(&self, traits: &UserTraits) -> ApiResult<User> {
        self.post("/users/", traits).await
    }

    pub async fn deactivate_user(&self, id: &str) -> ApiResult<()> {
        self.patch_unit(&format!("/users/deactivate/{}", id)).await
    }

    pub async fn reactivate_user(&self, id: &str) -> ApiResult<()> {
        self.patch_unit(&format!("/users/reactivate/{}", id)).await
    }

    pub async fn add_user_group(&self, params: &UserGroupParams) -> ApiResult<()> {
        self.put_unit("/groups/users/add", params).await
    }

    pub async fn remove_user_group(&self, params: &UserGroupParams) -> ApiResult<()> {
        self.put_unit("/groups/users/remove", params).await
    }

    pub async fn link_player(&self, params: &UserLinkParams) -> ApiResult<()> {
        self.post_unit("/users/link/player", params).await
    }

    pub async fn unlink_player(&self, params: &UserLinkParams) -> ApiResult<()> {
        self.post_unit("/users/unlink/player", params).await
    }

    pub async fn get_linked_players(&self, user_id: &str) -> ApiResult<Vec<Player>> {
        self.get(&format!("/users/link/player/{}", user_id)).await
    }
}
