use super::{completed, fetched, remove_by_key, submitted, upsert, Submission};
use crate::api::ApiClient;
use crate::models::{Group, GroupReorderInfo, Id, NewGroupParams, Permission, ServerOverrides};
use crate::notify::Notifier;
use crate::permissions::{PermissionDef, PermissionRegistry, SharedRegistry};
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Clone)]
pub struct GroupStore {
    api: ApiClient,
    notifier: Notifier,
    registry: SharedRegistry,
    groups: watch::Sender<Vec<Group>>,
    permissions: watch::Sender<Vec<Permission>>,
    overrides: watch::Sender<HashMap<Id, Vec<ServerOverrides>>>,
}

impl GroupStore {
    pub fn new(api: ApiClient, notifier: Notifier, registry: SharedRegistry) -> Self {
        let (groups, _) = watch::channel(Vec::new());
        let (permissions, _) = watch::channel(Vec::new());
        let (overrides, _) = watch::channel(HashMap::new());
        Self {
            api,
            notifier,
            registry,
            groups,
            permissions,
            overrides,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Group>> {
        self.groups.subscribe()
    }

    /// Groups ordered by position
    pub fn groups(&self) -> Vec<Group> {
        self.groups.borrow().clone()
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.permissions.borrow().clone()
    }

    pub fn server_overrides(&self, server_id: Id) -> Vec<ServerOverrides> {
        self.overrides
            .borrow()
            .get(&server_id)
            .cloned()
            .unwrap_or_default()
    }

    fn set_groups(&self, mut groups: Vec<Group>) {
        groups.sort_by_key(|g| g.position);
        self.groups.send_replace(groups);
    }

    pub async fn get_all_groups(&self) -> bool {
        let result = self.api.latest("groups", self.api.get_groups()).await;
        match fetched(&self.notifier, result, "Could not get groups") {
            Some(groups) => {
                self.set_groups(groups);
                true
            }
            None => false,
        }
    }

    /// Fetch the backend's permission list and register it
    ///
    /// The registry is left untouched if the list cannot be registered.
    pub async fn get_all_permissions(&self) -> bool {
        let result = self
            .api
            .latest("permissions", self.api.get_permissions())
            .await;
        let Some(permissions) = fetched(&self.notifier, result, "Could not get permissions") else {
            return false;
        };

        // Backend ids order the bits only when every entry carries one
        let by_id = permissions.iter().all(|p| p.id.is_some());
        let defs = permissions.iter().enumerate().map(|(i, p)| {
            let id = match (by_id, p.id) {
                (true, Some(id)) => id,
                _ => i as u32,
            };
            PermissionDef::new(
                id,
                p.name.clone(),
                p.description.clone().unwrap_or_default(),
            )
        });

        let registry = match PermissionRegistry::register(defs) {
            Ok(registry) => registry,
            Err(e) => {
                warn!(error = %e, "rejected permission list");
                self.notifier.error("Could not load permissions");
                return false;
            }
        };

        for permission in &permissions {
            if permission.flag.is_empty() {
                continue;
            }
            if let Some(flag) = registry.lookup(&permission.name) {
                if flag.bit != permission.flag {
                    warn!(
                        name = %permission.name,
                        backend = %permission.flag,
                        local = %flag.bit,
                        "permission bit mismatch"
                    );
                }
            }
        }

        info!(count = registry.len(), "permissions registered");
        *self.registry.write() = registry;
        self.permissions.send_replace(permissions);
        true
    }

    pub async fn create_group(&self, params: &NewGroupParams) -> Submission<Group> {
        let result = self.api.create_group(params).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Group created"),
            "Could not create group",
        );

        if let Submission::Done(group) = &outcome {
            let mut groups = self.groups();
            upsert(&mut groups, group.clone());
            self.set_groups(groups);
        }
        outcome
    }

    pub async fn update_group(&self, id: Id, params: &NewGroupParams) -> Submission<Group> {
        let result = self.api.update_group(id, params).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Group updated"),
            "Could not update group",
        );

        if let Submission::Done(group) = &outcome {
            let mut groups = self.groups();
            upsert(&mut groups, group.clone());
            self.set_groups(groups);
        }
        outcome
    }

    pub async fn delete_group(&self, id: Id) -> bool {
        let result = self.api.delete_group(id).await;
        let ok = completed(&self.notifier, result, "Group deleted", "Could not delete group");

        if ok {
            self.groups.send_modify(|groups| {
                remove_by_key(groups, &Some(id));
            });
        }
        ok
    }

    /// Persist a new ordering; the backend returns the reordered list
    pub async fn reorder_groups(&self, order: &[GroupReorderInfo]) -> bool {
        let result = self.api.reorder_groups(order).await;
        match fetched(&self.notifier, result, "Could not reorder groups") {
            Some(groups) => {
                self.set_groups(groups);
                true
            }
            None => false,
        }
    }

    pub async fn get_server_overrides(&self, server_id: Id) -> Option<Vec<ServerOverrides>> {
        let result = self
            .api
            .latest(
                &format!("overrides:{}", server_id),
                self.api.get_server_overrides(server_id),
            )
            .await;

        let overrides = fetched(&self.notifier, result, "Could not get server overrides")?;
        self.overrides.send_modify(|all| {
            all.insert(server_id, overrides.clone());
        });
        Some(overrides)
    }

    pub async fn set_server_overrides(
        &self,
        server_id: Id,
        overrides: &ServerOverrides,
    ) -> Submission<ServerOverrides> {
        let result = self.api.set_server_overrides(server_id, overrides).await;
        let outcome = submitted(
            &self.notifier,
            result,
            Some("Overrides saved"),
            "Could not save overrides",
        );

        if let Submission::Done(saved) = &outcome {
            let saved = saved.clone();
            self.overrides.send_modify(|all| {
                let entries = all.entry(server_id).or_default();
                match entries.iter_mut().find(|o| o.group_id == saved.group_id) {
                    Some(existing) => *existing = saved,
                    None => entries.push(saved),
                }
            });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{PermissionMask, PermissionRegistry};
    use parking_lot::RwLock;
    use std::sync::Arc;

    fn group(id: Id, position: i32) -> Group {
        Group {
            id: Some(id),
            name: format!("group-{}", id),
            color: 0xffffff,
            position,
            permissions: PermissionMask::EMPTY,
            created_at: None,
            modified_at: None,
        }
    }

    fn store() -> GroupStore {
        let api = ApiClient::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        let registry = Arc::new(RwLock::new(PermissionRegistry::builtin()));
        GroupStore::new(api, Notifier::new(), registry)
    }

    #[test]
    fn test_groups_are_ordered_by_position() {
        let store = store();
        store.set_groups(vec![group(1, 3), group(2, 1), group(3, 2)]);

        let ids: Vec<Option<Id>> = store.groups().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![Some(2), Some(3), Some(1)]);
    }

    #[test]
    fn test_unknown_server_has_no_overrides() {
        let store = store();
        assert!(store.server_overrides(5).is_empty());
    }
}
