use super::{Group, Id};
use crate::permissions::PermissionMask;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMeta {
    #[serde(default)]
    pub deactivated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub permissions: PermissionMask,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub meta: UserMeta,
}

impl User {
    /// Highest ranked group (lowest position)
    pub fn top_group(&self) -> Option<&Group> {
        self.groups.iter().min_by_key(|g| g.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTraits {
    pub email: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLinkParams {
    pub player_id: String,
    pub platform: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGroupParams {
    pub user_id: String,
    pub group_id: Id,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, position: i32) -> Group {
        Group {
            id: Some(position as Id),
            name: name.to_string(),
            color: 0,
            position,
            permissions: PermissionMask::EMPTY,
            created_at: None,
            modified_at: None,
        }
    }

    #[test]
    fn test_top_group_is_lowest_position() {
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            permissions: PermissionMask::EMPTY,
            groups: vec![group("Everyone", 10), group("Admin", 1), group("Mod", 4)],
            meta: UserMeta::default(),
        };

        assert_eq!(user.top_group().map(|g| g.name.as_str()), Some("Admin"));
    }

    #[test]
    fn test_user_numeric_permissions() {
        let json = r#"{"id":"u1","username":"bob","permissions":3,"groups":[]}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.permissions, PermissionMask::new(3));
        assert!(!user.meta.deactivated);
    }
}
