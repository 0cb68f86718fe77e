//! Observable domain state
//!
//! Each store owns one slice of state behind a `watch` channel, issues REST
//! calls through the shared [`ApiClient`](crate::api::ApiClient) and reports
//! outcomes through the [`Notifier`]. Failures stop here:
//! - validation errors travel back to the caller as [`Submission::Invalid`]
//! - superseded requests are dropped silently
//! - everything else becomes an error toast plus a `None`/`false` sentinel

mod auth;
mod chat;
mod game;
mod group;
mod infraction;
mod loading;
mod player;
mod search;
mod server;
mod stats;
mod user;

pub use auth::{AuthState, AuthStore};
pub use chat::{ChatStore, CHAT_BUFFER_CAPACITY};
pub use game::GameStore;
pub use group::GroupStore;
pub use infraction::{InfractionStore, PlayerInfractions, PlayerKey};
pub use loading::{LoadingGuard, LoadingStore};
pub use player::{PlayerStore, ServerPlayers};
pub use search::{SearchState, SearchStore};
pub use server::ServerStore;
pub use stats::StatsStore;
pub use user::UserStore;

use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::models::{FlaggedWord, Group, Id, Infraction, Server, User};
use crate::notify::Notifier;
use tracing::{debug, warn};

/// Outcome of a form-style mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
    Done(T),
    /// Backend rejected the input; nothing was changed
    Invalid { message: String, errors: FieldErrors },
    /// Failure already reported through a toast
    Failed,
}

impl<T> Submission<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Submission::Done(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Submission::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Submission::Invalid { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Toast on failure, return the value on success
pub(crate) fn fetched<T>(notifier: &Notifier, result: ApiResult<T>, failure: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(ApiError::Cancelled) => {
            debug!(failure, "superseded request dropped");
            None
        }
        Err(e) => {
            warn!(error = %e, "{}", failure);
            notifier.error(e.backend_message().unwrap_or(failure));
            None
        }
    }
}

/// Like [`fetched`], but hands validation errors back to the caller untoasted
pub(crate) fn submitted<T>(
    notifier: &Notifier,
    result: ApiResult<T>,
    success: Option<&str>,
    failure: &str,
) -> Submission<T> {
    match result {
        Ok(value) => {
            if let Some(success) = success {
                notifier.success(success);
            }
            Submission::Done(value)
        }
        Err(ApiError::Validation { message, errors }) => {
            debug!(?errors, "validation failed");
            Submission::Invalid { message, errors }
        }
        Err(ApiError::Cancelled) => Submission::Failed,
        Err(e) => {
            warn!(error = %e, "{}", failure);
            notifier.error(failure);
            Submission::Failed
        }
    }
}

/// Unit mutations: toast either way, report success as a bool
pub(crate) fn completed(
    notifier: &Notifier,
    result: ApiResult<()>,
    success: &str,
    failure: &str,
) -> bool {
    submitted(notifier, result, Some(success), failure).is_done()
}

/// Entities that are replaced in place by id
pub(crate) trait Keyed {
    type Key: PartialEq;

    fn key(&self) -> Self::Key;
}

impl Keyed for Server {
    type Key = Id;

    fn key(&self) -> Id {
        self.id
    }
}

impl Keyed for Group {
    type Key = Option<Id>;

    fn key(&self) -> Option<Id> {
        self.id
    }
}

impl Keyed for User {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Keyed for Infraction {
    type Key = Id;

    fn key(&self) -> Id {
        self.id
    }
}

impl Keyed for FlaggedWord {
    type Key = Option<Id>;

    fn key(&self) -> Option<Id> {
        self.id
    }
}

/// Replace the entry with the same key, or append; last write wins
pub(crate) fn upsert<T: Keyed>(items: &mut Vec<T>, item: T) {
    let key = item.key();
    match items.iter_mut().find(|existing| existing.key() == key) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

/// Remove every entry with `key`; true if anything was removed
pub(crate) fn remove_by_key<T: Keyed>(items: &mut Vec<T>, key: &T::Key) -> bool {
    let before = items.len();
    items.retain(|item| item.key() != *key);
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: Id, word: &str) -> FlaggedWord {
        FlaggedWord {
            id: Some(id),
            word: word.to_string(),
        }
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut words = vec![word(1, "foo"), word(2, "bar")];
        upsert(&mut words, word(2, "baz"));
        upsert(&mut words, word(3, "qux"));

        assert_eq!(words, vec![word(1, "foo"), word(2, "baz"), word(3, "qux")]);
    }

    #[test]
    fn test_remove_by_key() {
        let mut words = vec![word(1, "foo"), word(2, "bar")];
        assert!(remove_by_key(&mut words, &Some(1)));
        assert!(!remove_by_key(&mut words, &Some(1)));
        assert_eq!(words, vec![word(2, "bar")]);
    }

    #[test]
    fn test_fetched_uses_backend_message() {
        let notifier = Notifier::new();
        let result: ApiResult<()> = Err(ApiError::NotFound("Player not found".to_string()));

        assert_eq!(fetched(&notifier, result, "Could not get player"), None);
        assert!(notifier.was_shown("Player not found"));
    }

    #[test]
    fn test_fetched_cancelled_is_silent() {
        let notifier = Notifier::new();
        let result: ApiResult<()> = Err(ApiError::Cancelled);

        assert_eq!(fetched(&notifier, result, "Could not get stats"), None);
        assert!(notifier.history().is_empty());
    }

    #[test]
    fn test_submitted_validation_is_not_toasted() {
        let notifier = Notifier::new();
        let mut errors = FieldErrors::new();
        errors.insert("reason".to_string(), "required".to_string());
        let result: ApiResult<()> = Err(ApiError::Validation {
            message: "invalid".to_string(),
            errors,
        });

        let outcome = submitted(&notifier, result, Some("Created"), "Could not create");
        assert_eq!(
            outcome.field_errors().and_then(|e| e.get("reason")).map(String::as_str),
            Some("required")
        );
        assert!(notifier.history().is_empty());
    }

    #[test]
    fn test_completed_toasts_both_ways() {
        let notifier = Notifier::new();
        assert!(completed(&notifier, Ok(()), "Deleted", "Could not delete"));
        assert!(!completed(
            &notifier,
            Err(ApiError::Transport("refused".to_string())),
            "Deleted",
            "Could not delete"
        ));

        assert!(notifier.was_shown("Deleted"));
        assert!(notifier.was_shown("Could not delete"));
    }
}
