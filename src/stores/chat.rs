use super::{completed, fetched, remove_by_key, submitted, upsert, Submission};
use crate::api::ApiClient;
use crate::models::{ChatMessage, FlaggedWord, Id};
use crate::notify::Notifier;
use crate::ringbuf::RingBuffer;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Messages retained per server
pub const CHAT_BUFFER_CAPACITY: usize = 100;

const LIVE_CHANNEL_CAPACITY: usize = 256;

struct Inner {
    buffers: RwLock<HashMap<Id, Arc<RingBuffer<ChatMessage>>>>,
    live: broadcast::Sender<ChatMessage>,
    flagged_words: watch::Sender<Vec<FlaggedWord>>,
}

#[derive(Clone)]
pub struct ChatStore {
    api: ApiClient,
    notifier: Notifier,
    inner: Arc<Inner>,
}

impl ChatStore {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        let (live, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        let (flagged_words, _) = watch::channel(Vec::new());
        Self {
            api,
            notifier,
            inner: Arc::new(Inner {
                buffers: RwLock::new(HashMap::new()),
                live,
                flagged_words,
            }),
        }
    }

    fn buffer(&self, server_id: Id) -> Arc<RingBuffer<ChatMessage>> {
        if let Some(buffer) = self.inner.buffers.read().get(&server_id) {
            return buffer.clone();
        }
        self.inner
            .buffers
            .write()
            .entry(server_id)
            .or_insert_with(|| Arc::new(RingBuffer::new(CHAT_BUFFER_CAPACITY)))
            .clone()
    }

    /// Messages as they arrive, across all servers
    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.inner.live.subscribe()
    }

    /// Retained messages for one server, oldest first
    pub fn messages(&self, server_id: Id) -> Vec<ChatMessage> {
        self.inner
            .buffers
            .read()
            .get(&server_id)
            .map(|buffer| buffer.items())
            .unwrap_or_default()
    }

    /// Record a live message; the oldest is evicted once the buffer is full
    pub fn add_chat_message(&self, server_id: Id, message: ChatMessage) {
        self.buffer(server_id).push(message.clone());
        let _ = self.inner.live.send(message);
    }

    pub async fn get_recent_chat_messages(&self, server_id: Id, count: usize) -> bool {
        let result = self
            .api
            .latest(
                &format!("chat:{}", server_id),
                self.api.get_recent_chat_messages(server_id, count),
            )
            .await;

        match fetched(&self.notifier, result, "Could not get recent chat messages") {
            Some(messages) => {
                self.buffer(server_id)
                    .rebuild(|live| merge_recent(messages, live));
                true
            }
            None => false,
        }
    }

    pub fn subscribe_flagged_words(&self) -> watch::Receiver<Vec<FlaggedWord>> {
        self.inner.flagged_words.subscribe()
    }

    pub fn flagged_words(&self) -> Vec<FlaggedWord> {
        self.inner.flagged_words.borrow().clone()
    }

    pub async fn get_flagged_words(&self) -> bool {
        let result = self
            .api
            .latest("flagged-words", self.api.get_flagged_words())
            .await;

        match fetched(&self.notifier, result, "Could not get flagged words") {
            Some(words) => {
                self.inner.flagged_words.send_replace(words);
                true
            }
            None => false,
        }
    }

    pub async fn create_flagged_word(&self, word: &str) -> Submission<FlaggedWord> {
        let body = FlaggedWord {
            id: None,
            word: word.to_string(),
        };
        let result = self.api.create_flagged_word(&body).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Flagged word added"),
            "Could not add flagged word",
        );

        if let Submission::Done(word) = &outcome {
            let word = word.clone();
            self.inner
                .flagged_words
                .send_modify(|words| upsert(words, word));
        }
        outcome
    }

    pub async fn update_flagged_word(&self, id: Id, word: &str) -> Submission<FlaggedWord> {
        let body = FlaggedWord {
            id: Some(id),
            word: word.to_string(),
        };
        let result = self.api.update_flagged_word(id, &body).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Flagged word updated"),
            "Could not update flagged word",
        );

        if let Submission::Done(word) = &outcome {
            let word = word.clone();
            self.inner
                .flagged_words
                .send_modify(|words| upsert(words, word));
        }
        outcome
    }

    pub async fn delete_flagged_word(&self, id: Id) -> bool {
        let result = self.api.delete_flagged_word(id).await;
        let ok = completed(
            &self.notifier,
            result,
            "Flagged word deleted",
            "Could not delete flagged word",
        );

        if ok {
            self.inner.flagged_words.send_modify(|words| {
                remove_by_key(words, &Some(id));
            });
        }
        ok
    }
}

/// Fetched history followed by buffered messages it does not contain
///
/// Live messages can land while the fetch is in flight; they are kept.
fn merge_recent(fetched: Vec<ChatMessage>, live: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let seen: HashSet<Id> = fetched.iter().map(|m| m.id).collect();
    let mut merged = fetched;
    merged.extend(live.into_iter().filter(|m| !seen.contains(&m.id)));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: Id, server_id: Id) -> ChatMessage {
        ChatMessage {
            id,
            player_id: "p1".to_string(),
            platform: "playfab".to_string(),
            server_id,
            name: "Player".to_string(),
            message: format!("message {}", id),
            sent_by_user: false,
            flagged: false,
            created_at: None,
            modified_at: None,
        }
    }

    fn store() -> ChatStore {
        let api = ApiClient::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        ChatStore::new(api, Notifier::new())
    }

    #[test]
    fn test_messages_are_kept_per_server() {
        let store = store();
        store.add_chat_message(1, message(1, 1));
        store.add_chat_message(2, message(2, 2));
        store.add_chat_message(1, message(3, 1));

        let ids: Vec<Id> = store.messages(1).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.messages(2).len(), 1);
        assert!(store.messages(3).is_empty());
    }

    #[test]
    fn test_buffer_evicts_oldest() {
        let store = store();
        for id in 0..(CHAT_BUFFER_CAPACITY as Id + 5) {
            store.add_chat_message(1, message(id, 1));
        }

        let messages = store.messages(1);
        assert_eq!(messages.len(), CHAT_BUFFER_CAPACITY);
        assert_eq!(messages[0].id, 5);
    }

    #[tokio::test]
    async fn test_live_subscribers_receive_messages() {
        let store = store();
        let mut rx = store.subscribe();

        store.add_chat_message(4, message(9, 4));
        assert_eq!(rx.recv().await.unwrap().id, 9);
    }

    #[test]
    fn test_merge_recent_keeps_live_messages() {
        let fetched = vec![message(1, 1), message(2, 1)];
        let live = vec![message(2, 1), message(3, 1)];

        let ids: Vec<Id> = merge_recent(fetched, live).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_recent_fetch_keeps_messages_received_meanwhile() {
        let store = store();
        store.add_chat_message(1, message(7, 1));

        store
            .buffer(1)
            .rebuild(|live| merge_recent(vec![message(5, 1), message(6, 1)], live));

        let ids: Vec<Id> = store.messages(1).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![5, 6, 7]);
    }
}
