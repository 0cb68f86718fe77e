use super::ApiClient;
use crate::error::ApiResult;
use crate::models::Session;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LogoutFlow {
    logout_url: String,
}

impl ApiClient {
    pub async fn get_session(&self) -> ApiResult<Session> {
        self.kratos_get("/sessions/whoami").await
    }

    /// Ask the identity provider for a logout URL, then follow it
    pub async fn logout(&self) -> ApiResult<()> {
        let flow: LogoutFlow = self.kratos_get("/self-service/logout/browser").await?;
        self.get_absolute(&flow.logout_url).await
    }
}
