use super::fetched;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{Session, User};
use crate::notify::Notifier;
use crate::permissions::SharedRegistry;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub authenticated: bool,
    /// Signed in, but no address has been verified yet
    pub needs_activation: bool,
    pub session: Option<Session>,
    pub user: Option<User>,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

/// Session and current-user state
#[derive(Clone)]
pub struct AuthStore {
    api: ApiClient,
    notifier: Notifier,
    registry: SharedRegistry,
    state: watch::Sender<AuthState>,
    expiry_timer: Arc<Mutex<Option<CancellationToken>>>,
}

impl AuthStore {
    pub fn new(api: ApiClient, notifier: Notifier, registry: SharedRegistry) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            api,
            notifier,
            registry,
            state,
            expiry_timer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().authenticated
    }

    /// Ask the identity provider for the current session
    ///
    /// Returns true only for an activated session. The session is kept even
    /// when activation is pending so the view can show the address.
    pub async fn check_auth(&self) -> bool {
        let result = self.api.latest("session", self.api.get_session()).await;

        let session = match result {
            Ok(session) => session,
            Err(ApiError::Cancelled) => return false,
            Err(e) => {
                debug!(error = %e, "no session");
                self.cancel_expiry_timer();
                self.state.send_modify(|state| {
                    state.authenticated = false;
                    state.session = None;
                });
                return false;
            }
        };

        let activated = session.is_activated();
        self.schedule_expiry(&session);
        self.state.send_modify(|state| {
            state.session = Some(session);
            state.needs_activation = !activated;
            state.authenticated = activated;
        });

        activated
    }

    /// Load `/users/me` and derive the admin flags from its mask
    pub async fn get_self_info(&self) -> Option<User> {
        let result = self.api.latest("self", self.api.get_self_info()).await;
        let user = fetched(&self.notifier, result, "Could not get user info")?;

        let (is_admin, is_super_admin) = {
            let registry = self.registry.read();
            (
                registry.is_admin(user.permissions),
                registry.is_super_admin(user.permissions),
            )
        };

        self.state.send_modify(|state| {
            state.user = Some(user.clone());
            state.is_admin = is_admin;
            state.is_super_admin = is_super_admin;
        });
        Some(user)
    }

    pub async fn logout(&self) -> bool {
        let result = self.api.logout().await;
        if fetched(&self.notifier, result, "Could not log out").is_none() {
            return false;
        }

        self.clear();
        info!("logged out");
        true
    }

    /// True if the current user holds every named flag
    ///
    /// Unknown flag names never pass, even for super admins.
    pub fn has_permission(&self, flags: &[&str], admin_bypass: bool) -> bool {
        let Some(mask) = self.state.borrow().user.as_ref().map(|u| u.permissions) else {
            return false;
        };

        let registry = self.registry.read();
        let bits = match flags
            .iter()
            .map(|name| registry.get_flag(name))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(bits) => bits,
            Err(e) => {
                warn!(error = %e, "permission check against unregistered flag");
                return false;
            }
        };

        registry.has_all_of(mask, &bits, admin_bypass)
    }

    /// True if the current user holds at least one named flag
    pub fn has_any_permission(&self, flags: &[&str], admin_bypass: bool) -> bool {
        let Some(mask) = self.state.borrow().user.as_ref().map(|u| u.permissions) else {
            return false;
        };

        let registry = self.registry.read();
        let bits: Vec<_> = flags
            .iter()
            .filter_map(|name| registry.get_flag(name).ok())
            .collect();

        registry.has_one_of(mask, &bits, admin_bypass)
    }

    fn clear(&self) {
        self.cancel_expiry_timer();
        self.state.send_replace(AuthState::default());
    }

    fn cancel_expiry_timer(&self) {
        if let Some(token) = self.expiry_timer.lock().take() {
            token.cancel();
        }
    }

    /// Drop all auth state once the session expires
    fn schedule_expiry(&self, session: &Session) {
        let token = CancellationToken::new();
        if let Some(previous) = self.expiry_timer.lock().replace(token.clone()) {
            previous.cancel();
        }

        let remaining = (session.expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        debug!(?remaining, "session expiry scheduled");

        let store = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(remaining) => {
                    info!("session expired");
                    store.expiry_timer.lock().take();
                    store.state.send_replace(AuthState::default());
                    store.notifier.info("Your session has expired. Please log in again.");
                }
            }
        });
    }

    /// Stop the expiry timer
    pub fn shutdown(&self) {
        self.cancel_expiry_timer();
    }
}
