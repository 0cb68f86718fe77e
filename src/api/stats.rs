use super::ApiClient;
use crate::error::ApiResult;
use crate::models::Stats;

impl ApiClient {
    pub async fn get_stats(&self) -> ApiResult<Stats> {
        self.get("/stats/").await
    }
}
