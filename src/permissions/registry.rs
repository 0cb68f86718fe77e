//! Flag registration and bit tests

use super::flags::{BUILTIN_FLAGS, FLAG_ADMINISTRATOR, FLAG_SUPER_ADMIN};
use super::mask::{PermissionMask, MAX_FLAGS};
use super::PermissionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A permission as declared before registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDef {
    /// Ordinal; registration sorts ascending on this
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl PermissionDef {
    pub fn new(id: u32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A registered flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub name: String,
    pub description: String,
    pub position: u32,
    pub bit: PermissionMask,
}

/// Name -> bit mapping for every known permission
#[derive(Debug, Clone, Default)]
pub struct PermissionRegistry {
    flags: Vec<Flag>,
    by_name: HashMap<String, usize>,
}

impl PermissionRegistry {
    /// Register permissions, assigning bit positions by ascending id
    pub fn register(
        defs: impl IntoIterator<Item = PermissionDef>,
    ) -> Result<Self, PermissionError> {
        let mut defs: Vec<PermissionDef> = defs.into_iter().collect();
        if defs.len() > MAX_FLAGS {
            return Err(PermissionError::TooManyFlags(defs.len()));
        }

        defs.sort_by_key(|d| d.id);

        let mut registry = PermissionRegistry::default();
        let mut last_id = None;

        for (position, def) in defs.into_iter().enumerate() {
            if last_id == Some(def.id) {
                return Err(PermissionError::DuplicateId(def.id));
            }
            last_id = Some(def.id);

            if registry.by_name.contains_key(&def.name) {
                return Err(PermissionError::DuplicateName(def.name));
            }

            let position = position as u32;
            registry.by_name.insert(def.name.clone(), registry.flags.len());
            registry.flags.push(Flag {
                name: def.name,
                description: def.description,
                position,
                bit: PermissionMask::bit(position),
            });
        }

        Ok(registry)
    }

    /// The flag list shipped with Refractor
    pub fn builtin() -> Self {
        let defs = BUILTIN_FLAGS
            .iter()
            .enumerate()
            .map(|(i, (name, description))| PermissionDef::new(i as u32, *name, *description));

        // The builtin table is static and well under MAX_FLAGS with unique names.
        Self::register(defs).unwrap_or_default()
    }

    /// Bit value of a registered flag
    pub fn get_flag(&self, name: &str) -> Result<PermissionMask, PermissionError> {
        self.lookup(name)
            .map(|f| f.bit)
            .ok_or_else(|| PermissionError::UnknownFlag(name.to_string()))
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|f| f.description.as_str())
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.by_name.get(name).map(|&idx| &self.flags[idx])
    }

    /// All flags in bit order
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Combine named flags into one mask
    pub fn encode<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<PermissionMask, PermissionError> {
        names
            .into_iter()
            .map(|name| self.get_flag(name))
            .collect::<Result<Vec<_>, _>>()
            .map(|bits| bits.into_iter().collect())
    }

    /// Names of registered flags set in `mask`, in bit order
    pub fn set_flags(&self, mask: PermissionMask) -> Vec<&str> {
        self.flags
            .iter()
            .filter(|f| mask.contains(f.bit))
            .map(|f| f.name.as_str())
            .collect()
    }

    fn super_admin_bit(&self) -> Option<PermissionMask> {
        self.lookup(FLAG_SUPER_ADMIN).map(|f| f.bit)
    }

    fn admin_bit(&self) -> Option<PermissionMask> {
        self.lookup(FLAG_ADMINISTRATOR).map(|f| f.bit)
    }

    pub fn is_super_admin(&self, mask: PermissionMask) -> bool {
        !mask.is_empty() && self.super_admin_bit().is_some_and(|bit| mask.contains(bit))
    }

    pub fn is_admin(&self, mask: PermissionMask) -> bool {
        !mask.is_empty() && self.admin_bit().is_some_and(|bit| mask.contains(bit))
    }

    /// True iff `flag` is set in `mask` or `mask` carries super admin
    pub fn check_flag(&self, mask: PermissionMask, flag: PermissionMask) -> bool {
        if mask.is_empty() {
            return false;
        }

        mask.contains(flag) || self.is_super_admin(mask)
    }

    /// True iff every flag is set
    ///
    /// Super admin always passes; administrator passes when `admin_bypass` is
    /// set. An empty flag list passes for any non-zero mask.
    pub fn has_all_of(
        &self,
        mask: PermissionMask,
        flags: &[PermissionMask],
        admin_bypass: bool,
    ) -> bool {
        if mask.is_empty() {
            return false;
        }

        if self.bypasses(mask, admin_bypass) {
            return true;
        }

        flags.iter().all(|&flag| mask.contains(flag))
    }

    /// True iff at least one flag is set
    ///
    /// Same bypass rules as [`has_all_of`](Self::has_all_of). An empty flag
    /// list fails unless a bypass applies.
    pub fn has_one_of(
        &self,
        mask: PermissionMask,
        flags: &[PermissionMask],
        admin_bypass: bool,
    ) -> bool {
        if mask.is_empty() {
            return false;
        }

        if self.bypasses(mask, admin_bypass) {
            return true;
        }

        flags.iter().any(|&flag| mask.contains(flag))
    }

    fn bypasses(&self, mask: PermissionMask, admin_bypass: bool) -> bool {
        self.is_super_admin(mask) || (admin_bypass && self.is_admin(mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::flags::*;

    fn registry() -> PermissionRegistry {
        PermissionRegistry::builtin()
    }

    #[test]
    fn test_register_sorts_by_id() {
        let reg = PermissionRegistry::register(vec![
            PermissionDef::new(10, "C", ""),
            PermissionDef::new(2, "A", ""),
            PermissionDef::new(5, "B", ""),
        ])
        .unwrap();

        assert_eq!(reg.get_flag("A").unwrap(), PermissionMask::bit(0));
        assert_eq!(reg.get_flag("B").unwrap(), PermissionMask::bit(1));
        assert_eq!(reg.get_flag("C").unwrap(), PermissionMask::bit(2));
    }

    #[test]
    fn test_register_flags_are_distinct_powers_of_two() {
        let reg = registry();
        let bits: Vec<u128> = reg.flags().iter().map(|f| f.bit.bits()).collect();

        for (i, bit) in bits.iter().enumerate() {
            assert!(bit.is_power_of_two());
            assert_eq!(*bit, 1u128 << i);
        }
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let dup_name = PermissionRegistry::register(vec![
            PermissionDef::new(0, "A", ""),
            PermissionDef::new(1, "A", ""),
        ]);
        assert_eq!(dup_name.unwrap_err(), PermissionError::DuplicateName("A".into()));

        let dup_id = PermissionRegistry::register(vec![
            PermissionDef::new(3, "A", ""),
            PermissionDef::new(3, "B", ""),
        ]);
        assert_eq!(dup_id.unwrap_err(), PermissionError::DuplicateId(3));
    }

    #[test]
    fn test_register_rejects_too_many() {
        let defs = (0..129).map(|i| PermissionDef::new(i, format!("F{}", i), ""));
        assert_eq!(
            PermissionRegistry::register(defs).unwrap_err(),
            PermissionError::TooManyFlags(129)
        );
    }

    #[test]
    fn test_get_flag_unknown() {
        let err = registry().get_flag("FLAG_NOPE").unwrap_err();
        assert_eq!(err, PermissionError::UnknownFlag("FLAG_NOPE".into()));
    }

    #[test]
    fn test_builtin_order_is_stable() {
        let reg = registry();
        assert_eq!(reg.get_flag(FLAG_SUPER_ADMIN).unwrap(), PermissionMask::bit(0));
        assert_eq!(reg.get_flag(FLAG_ADMINISTRATOR).unwrap(), PermissionMask::bit(1));
        assert_eq!(reg.get_flag(FLAG_VIEW_SERVERS).unwrap(), PermissionMask::bit(2));
        assert!(reg.description(FLAG_VIEW_SERVERS).unwrap().contains("online players"));
    }

    #[test]
    fn test_check_flag() {
        let reg = registry();
        let view = reg.get_flag(FLAG_VIEW_SERVERS).unwrap();
        let ban = reg.get_flag(FLAG_CREATE_BAN).unwrap();
        let mask = view;

        assert!(reg.check_flag(mask, view));
        assert!(!reg.check_flag(mask, ban));
        assert!(!reg.check_flag(PermissionMask::EMPTY, view));
    }

    #[test]
    fn test_check_flag_super_admin_bypass() {
        let reg = registry();
        let mask = reg.get_flag(FLAG_SUPER_ADMIN).unwrap();

        for flag in reg.flags() {
            assert!(reg.check_flag(mask, flag.bit), "{}", flag.name);
        }
    }

    #[test]
    fn test_check_flag_admin_is_not_a_bypass() {
        let reg = registry();
        let mask = reg.get_flag(FLAG_ADMINISTRATOR).unwrap();

        assert!(!reg.check_flag(mask, reg.get_flag(FLAG_CREATE_BAN).unwrap()));
    }

    #[test]
    fn test_has_all_of() {
        let reg = registry();
        let warn = reg.get_flag(FLAG_CREATE_WARNING).unwrap();
        let mute = reg.get_flag(FLAG_CREATE_MUTE).unwrap();
        let ban = reg.get_flag(FLAG_CREATE_BAN).unwrap();

        assert!(reg.has_all_of(warn | mute, &[warn, mute], false));
        assert!(!reg.has_all_of(warn | mute, &[warn, ban], false));
        assert!(reg.has_all_of(warn, &[], false));
        assert!(!reg.has_all_of(PermissionMask::EMPTY, &[], false));
    }

    #[test]
    fn test_has_one_of() {
        let reg = registry();
        let warn = reg.get_flag(FLAG_CREATE_WARNING).unwrap();
        let kick = reg.get_flag(FLAG_CREATE_KICK).unwrap();
        let ban = reg.get_flag(FLAG_CREATE_BAN).unwrap();

        assert!(reg.has_one_of(warn, &[warn, ban], false));
        assert!(!reg.has_one_of(kick, &[warn, ban], false));
        assert!(!reg.has_one_of(kick, &[], false));
    }

    #[test]
    fn test_admin_bypass_is_optional() {
        let reg = registry();
        let admin = reg.get_flag(FLAG_ADMINISTRATOR).unwrap();
        let ban = reg.get_flag(FLAG_CREATE_BAN).unwrap();

        assert!(reg.has_all_of(admin, &[ban], true));
        assert!(!reg.has_all_of(admin, &[ban], false));
        assert!(reg.has_one_of(admin, &[ban], true));
        assert!(!reg.has_one_of(admin, &[ban], false));
    }

    #[test]
    fn test_super_admin_bypass_is_unconditional() {
        let reg = registry();
        let sa = reg.get_flag(FLAG_SUPER_ADMIN).unwrap();
        let ban = reg.get_flag(FLAG_CREATE_BAN).unwrap();

        assert!(reg.has_all_of(sa, &[ban], false));
        assert!(reg.has_one_of(sa, &[ban], false));
    }

    #[test]
    fn test_no_bypass_without_super_admin_registered() {
        let reg = PermissionRegistry::register(vec![
            PermissionDef::new(0, "A", ""),
            PermissionDef::new(1, "B", ""),
        ])
        .unwrap();
        let a = reg.get_flag("A").unwrap();
        let b = reg.get_flag("B").unwrap();

        assert!(!reg.check_flag(a, b));
    }

    #[test]
    fn test_encode_and_set_flags() {
        let reg = registry();
        let mask = reg.encode([FLAG_CREATE_BAN, FLAG_VIEW_SERVERS]).unwrap();

        assert_eq!(reg.set_flags(mask), vec![FLAG_VIEW_SERVERS, FLAG_CREATE_BAN]);
        assert!(reg.encode(["FLAG_NOPE"]).is_err());
        assert!(reg.set_flags(PermissionMask::EMPTY).is_empty());
    }
}
