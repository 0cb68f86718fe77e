use super::{fetched, LoadingStore};
use crate::api::ApiClient;
use crate::models::Stats;
use crate::notify::Notifier;
use tokio::sync::watch;

#[derive(Clone)]
pub struct StatsStore {
    api: ApiClient,
    notifier: Notifier,
    loading: LoadingStore,
    stats: watch::Sender<Option<Stats>>,
}

impl StatsStore {
    pub fn new(api: ApiClient, notifier: Notifier, loading: LoadingStore) -> Self {
        let (stats, _) = watch::channel(None);
        Self {
            api,
            notifier,
            loading,
            stats,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Stats>> {
        self.stats.subscribe()
    }

    pub fn stats(&self) -> Option<Stats> {
        self.stats.borrow().clone()
    }

    pub async fn get_stats(&self) -> Option<Stats> {
        let _busy = self.loading.begin("stats");
        let result = self.api.latest("stats", self.api.get_stats()).await;

        let stats = fetched(&self.notifier, result, "Could not get stats")?;
        self.stats.send_replace(Some(stats.clone()));
        Some(stats)
    }
}
