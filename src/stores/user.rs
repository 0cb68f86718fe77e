use super::{completed, fetched, submitted, upsert, Submission};
use crate::api::ApiClient;
use crate::models::{Group, Player, User, UserGroupParams, UserLinkParams, UserTraits};
use crate::notify::Notifier;
use tokio::sync::watch;
use tracing::warn;

#[derive(Clone)]
pub struct UserStore {
    api: ApiClient,
    notifier: Notifier,
    users: watch::Sender<Vec<User>>,
}

impl UserStore {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        let (users, _) = watch::channel(Vec::new());
        Self {
            api,
            notifier,
            users,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<User>> {
        self.users.subscribe()
    }

    pub fn users(&self) -> Vec<User> {
        self.users.borrow().clone()
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.users.borrow().iter().find(|u| u.id == id).cloned()
    }

    fn modify_user(&self, id: &str, f: impl FnOnce(&mut User)) {
        self.users.send_if_modified(|users| match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                f(user);
                true
            }
            None => false,
        });
    }

    pub async fn get_all_users(&self) -> bool {
        let result = self.api.latest("users", self.api.get_users()).await;
        match fetched(&self.notifier, result, "Could not get users") {
            Some(users) => {
                self.users.send_replace(users);
                true
            }
            None => false,
        }
    }

    pub async fn create_user(&self, traits: &UserTraits) -> Submission<User> {
        let result = self.api.create_user(traits).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("User created"),
            "Could not create user",
        );

        if let Submission::Done(user) = &outcome {
            let user = user.clone();
            self.users.send_modify(|users| upsert(users, user));
        }
        outcome
    }

    pub async fn deactivate_user(&self, id: &str) -> bool {
        let result = self.api.deactivate_user(id).await;
        let ok = completed(
            &self.notifier,
            result,
            "User deactivated",
            "Could not deactivate user",
        );
        if ok {
            self.modify_user(id, |user| user.meta.deactivated = true);
        }
        ok
    }

    pub async fn reactivate_user(&self, id: &str) -> bool {
        let result = self.api.reactivate_user(id).await;
        let ok = completed(
            &self.notifier,
            result,
            "User reactivated",
            "Could not reactivate user",
        );
        if ok {
            self.modify_user(id, |user| user.meta.deactivated = false);
        }
        ok
    }

    pub async fn add_user_group(&self, user_id: &str, group: &Group) -> bool {
        let Some(group_id) = group.id else {
            warn!(group = %group.name, "cannot assign a group without an id");
            self.notifier.error("Could not add group");
            return false;
        };

        let params = UserGroupParams {
            user_id: user_id.to_string(),
            group_id,
        };
        let result = self.api.add_user_group(&params).await;
        let ok = completed(&self.notifier, result, "Group added", "Could not add group");

        if ok {
            let group = group.clone();
            self.modify_user(user_id, |user| upsert(&mut user.groups, group));
        }
        ok
    }

    pub async fn remove_user_group(&self, user_id: &str, group: &Group) -> bool {
        let Some(group_id) = group.id else {
            warn!(group = %group.name, "cannot remove a group without an id");
            self.notifier.error("Could not remove group");
            return false;
        };

        let params = UserGroupParams {
            user_id: user_id.to_string(),
            group_id,
        };
        let result = self.api.remove_user_group(&params).await;
        let ok = completed(
            &self.notifier,
            result,
            "Group removed",
            "Could not remove group",
        );

        if ok {
            self.modify_user(user_id, |user| user.groups.retain(|g| g.id != Some(group_id)));
        }
        ok
    }

    pub async fn link_player(&self, params: &UserLinkParams) -> Submission<()> {
        let result = self.api.link_player(params).await;
        submitted(
            &self.notifier,
            result,
            Some("Player linked"),
            "Could not link player",
        )
    }

    pub async fn unlink_player(&self, params: &UserLinkParams) -> bool {
        let result = self.api.unlink_player(params).await;
        completed(
            &self.notifier,
            result,
            "Player unlinked",
            "Could not unlink player",
        )
    }

    pub async fn get_linked_players(&self, user_id: &str) -> Option<Vec<Player>> {
        let result = self
            .api
            .latest(
                &format!("linked-players:{}", user_id),
                self.api.get_linked_players(user_id),
            )
            .await;
        fetched(&self.notifier, result, "Could not get linked players")
    }
}
