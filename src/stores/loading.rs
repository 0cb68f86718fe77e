use std::collections::HashMap;
use tokio::sync::watch;

/// Busy flags keyed by scope ("servers", "player", ...)
#[derive(Debug, Clone)]
pub struct LoadingStore {
    state: watch::Sender<HashMap<String, bool>>,
}

impl Default for LoadingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(HashMap::new());
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<HashMap<String, bool>> {
        self.state.subscribe()
    }

    pub fn set_loading(&self, scope: &str, loading: bool) {
        self.state.send_modify(|flags| {
            flags.insert(scope.to_string(), loading);
        });
    }

    pub fn is_loading(&self, scope: &str) -> bool {
        self.state.borrow().get(scope).copied().unwrap_or(false)
    }

    /// Mark `scope` busy until the guard is dropped
    pub fn begin(&self, scope: &str) -> LoadingGuard {
        self.set_loading(scope, true);
        LoadingGuard {
            store: self.clone(),
            scope: scope.to_string(),
        }
    }
}

pub struct LoadingGuard {
    store: LoadingStore,
    scope: String,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.store.set_loading(&self.scope, false);
    }
}
