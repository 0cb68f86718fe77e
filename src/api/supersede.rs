//! Cancellation of superseded requests
//!
//! Every fetch is tagged with a resource key. Starting a fetch for a key that
//! already has one in flight cancels the older one, so a slow stale response
//! can never overwrite the state written by a newer one.

use crate::error::{ApiError, ApiResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    next_ticket: AtomicU64,
    active: Mutex<HashMap<String, (u64, CancellationToken)>>,
}

/// Tracks the newest request per resource key
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    inner: Arc<Inner>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` as the newest request for `key`
    ///
    /// Resolves to `ApiError::Cancelled` if another request for the same key
    /// starts before this one finishes.
    pub async fn run<T, F>(&self, key: &str, fut: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();

        if let Some((_, previous)) = self
            .inner
            .active
            .lock()
            .insert(key.to_string(), (ticket, token.clone()))
        {
            debug!(key, "superseding in-flight request");
            previous.cancel();
        }

        // Releases the slot even when the caller drops this future early
        let entry = Entry {
            inner: self.inner.clone(),
            key: key.to_string(),
            ticket,
        };

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        };

        if entry.release() {
            result
        } else {
            Err(ApiError::Cancelled)
        }
    }

    /// Cancel whatever is in flight for `key`
    pub fn cancel(&self, key: &str) {
        if let Some((_, token)) = self.inner.active.lock().remove(key) {
            token.cancel();
        }
    }

    /// Cancel everything, used on teardown
    pub fn cancel_all(&self) {
        for (_, (_, token)) in self.inner.active.lock().drain() {
            token.cancel();
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.active.lock().len()
    }
}

/// One request's claim on its key
struct Entry {
    inner: Arc<Inner>,
    key: String,
    ticket: u64,
}

impl Entry {
    /// Drop the slot if it still belongs to this ticket; false once superseded
    fn release(&self) -> bool {
        let mut active = self.inner.active.lock();
        match active.get(&self.key) {
            Some((ticket, _)) if *ticket == self.ticket => {
                active.remove(&self.key);
                true
            }
            _ => false,
        }
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_single_request_completes() {
        let inflight = InFlight::new();
        let result = inflight.run("player:1", async { Ok::<_, ApiError>(42) }).await;

        assert_eq!(result, Ok(42));
        assert_eq!(inflight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_newer_request_cancels_older() {
        let inflight = InFlight::new();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let slow = {
            let inflight = inflight.clone();
            tokio::spawn(async move {
                inflight
                    .run("player:1", async move {
                        let _ = release_rx.await;
                        Ok::<_, ApiError>("stale")
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        let fresh = inflight.run("player:1", async { Ok::<_, ApiError>("fresh") }).await;
        let _ = release_tx.send(());

        assert_eq!(fresh, Ok("fresh"));
        assert_eq!(slow.await.unwrap(), Err(ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_different_keys_do_not_interfere() {
        let inflight = InFlight::new();
        let a = inflight.run("a", async { Ok::<_, ApiError>(1) });
        let b = inflight.run("b", async { Ok::<_, ApiError>(2) });

        let (a, b) = tokio::join!(a, b);
        assert_eq!(a, Ok(1));
        assert_eq!(b, Ok(2));
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let inflight = InFlight::new();
        let pending = {
            let inflight = inflight.clone();
            tokio::spawn(async move {
                inflight
                    .run("stats", std::future::pending::<ApiResult<()>>())
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        inflight.cancel_all();

        assert_eq!(pending.await.unwrap(), Err(ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_dropped_request_frees_its_key() {
        let inflight = InFlight::new();
        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            inflight.run("player:1", std::future::pending::<ApiResult<()>>()),
        )
        .await;

        assert!(abandoned.is_err());
        assert_eq!(inflight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_dropped_stale_request_keeps_newer_entry() {
        let inflight = InFlight::new();
        let mut stale = Box::pin(inflight.run("player:1", std::future::pending::<ApiResult<()>>()));
        let mut fresh = Box::pin(inflight.run("player:1", std::future::pending::<ApiResult<()>>()));

        // Poll both once so each registers its ticket
        assert!(futures_util::poll!(&mut stale).is_pending());
        assert!(futures_util::poll!(&mut fresh).is_pending());
        assert_eq!(inflight.in_flight(), 1);

        drop(stale);
        assert_eq!(inflight.in_flight(), 1);

        drop(fresh);
        assert_eq!(inflight.in_flight(), 0);
    }
}
