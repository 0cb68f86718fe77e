use super::Id;
use crate::permissions::PermissionMask;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
    /// 0xRRGGBB
    pub color: u32,
    /// Lower positions rank higher
    pub position: i32,
    pub permissions: PermissionMask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Group {
    /// Color as a CSS-style hex string
    pub fn hex_color(&self) -> String {
        format!("#{:06x}", self.color & 0x00ff_ffff)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGroupParams {
    pub name: String,
    pub color: u32,
    pub position: i32,
    pub permissions: PermissionMask,
}

/// A permission as described by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    /// Ordinal; absent on older backends, in which case list order applies
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// The bit the backend assigned to this permission
    #[serde(default)]
    pub flag: PermissionMask,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReorderInfo {
    pub id: Id,
    pub pos: i32,
}

/// Per-server allow/deny adjustments for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerOverrides {
    pub group_id: Id,
    pub deny_overrides: PermissionMask,
    pub allow_overrides: PermissionMask,
}

impl ServerOverrides {
    /// Apply the overrides to a base mask: allow first, then deny
    pub fn apply(&self, base: PermissionMask) -> PermissionMask {
        let mut mask = base | self.allow_overrides;
        mask.remove(self.deny_overrides);
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_permissions_from_string() {
        let json = r#"{"id":3,"name":"Moderator","color":16711680,"position":2,"permissions":"12"}"#;
        let group: Group = serde_json::from_str(json).unwrap();

        assert_eq!(group.permissions, PermissionMask::new(12));
        assert_eq!(group.hex_color(), "#ff0000");
    }

    #[test]
    fn test_server_overrides_apply() {
        let overrides = ServerOverrides {
            group_id: 1,
            allow_overrides: PermissionMask::bit(4),
            deny_overrides: PermissionMask::bit(2) | PermissionMask::bit(4),
        };

        let base = PermissionMask::bit(2) | PermissionMask::bit(3);
        assert_eq!(overrides.apply(base), PermissionMask::bit(3));
    }
}
