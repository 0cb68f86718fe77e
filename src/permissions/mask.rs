//! Permission mask value type

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

/// Maximum number of distinct flags a mask can carry
pub const MAX_FLAGS: usize = 128;

/// A set of permission bits
///
/// The backend transports masks as decimal strings because they exceed the
/// range of a JSON number; plain numbers are accepted on input as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionMask(u128);

impl PermissionMask {
    pub const EMPTY: PermissionMask = PermissionMask(0);

    pub const fn new(bits: u128) -> Self {
        Self(bits)
    }

    /// Mask with only the bit at `position` set
    pub const fn bit(position: u32) -> Self {
        Self(1u128 << position)
    }

    pub const fn bits(self) -> u128 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True iff every bit of `other` is also set in `self`
    pub const fn contains(self, other: PermissionMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// True iff at least one bit of `other` is set in `self`
    pub const fn intersects(self, other: PermissionMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: PermissionMask) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: PermissionMask) {
        self.0 &= !other.0;
    }

    /// Positions of the set bits, lowest first
    pub fn positions(self) -> impl Iterator<Item = u32> {
        (0..MAX_FLAGS as u32).filter(move |pos| self.0 & (1u128 << pos) != 0)
    }
}

impl BitOr for PermissionMask {
    type Output = PermissionMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        PermissionMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for PermissionMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PermissionMask {
    type Output = PermissionMask;

    fn bitand(self, rhs: Self) -> Self::Output {
        PermissionMask(self.0 & rhs.0)
    }
}

impl FromIterator<PermissionMask> for PermissionMask {
    fn from_iter<T: IntoIterator<Item = PermissionMask>>(iter: T) -> Self {
        iter.into_iter().fold(PermissionMask::EMPTY, |acc, m| acc | m)
    }
}

impl fmt::Display for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PermissionMask {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(PermissionMask::EMPTY);
        }
        s.parse::<u128>().map(PermissionMask)
    }
}

impl From<u128> for PermissionMask {
    fn from(bits: u128) -> Self {
        PermissionMask(bits)
    }
}

impl Serialize for PermissionMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct MaskVisitor;

impl<'de> Visitor<'de> for MaskVisitor {
    type Value = PermissionMask;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(PermissionMask(v as u128))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u128::try_from(v)
            .map(PermissionMask)
            .map_err(|_| E::custom(format!("negative permission mask: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(PermissionMask::EMPTY)
    }
}

impl<'de> Deserialize<'de> for PermissionMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MaskVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_contains_and_intersects() {
        let mask = PermissionMask::bit(0) | PermissionMask::bit(3);

        assert!(mask.contains(PermissionMask::bit(3)));
        assert!(!mask.contains(PermissionMask::bit(1)));
        assert!(!mask.contains(PermissionMask::bit(0) | PermissionMask::bit(1)));
        assert!(mask.intersects(PermissionMask::bit(0) | PermissionMask::bit(1)));
    }

    #[test]
    fn test_mask_insert_remove() {
        let mut mask = PermissionMask::EMPTY;
        mask.insert(PermissionMask::bit(5));
        mask.insert(PermissionMask::bit(7));
        mask.remove(PermissionMask::bit(5));

        assert_eq!(mask, PermissionMask::bit(7));
        assert_eq!(mask.positions().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_mask_high_bits() {
        let mask = PermissionMask::bit(100);
        assert_eq!(mask.to_string(), (1u128 << 100).to_string());
        assert_eq!(mask.to_string().parse::<PermissionMask>().unwrap(), mask);
    }

    #[test]
    fn test_mask_deserialize_string_and_number() {
        let from_str: PermissionMask = serde_json::from_str(r#""6""#).unwrap();
        let from_num: PermissionMask = serde_json::from_str("6").unwrap();
        let from_null: PermissionMask = serde_json::from_str("null").unwrap();

        assert_eq!(from_str, PermissionMask::new(6));
        assert_eq!(from_num, PermissionMask::new(6));
        assert!(from_null.is_empty());
        assert!(serde_json::from_str::<PermissionMask>("-1").is_err());
    }

    #[test]
    fn test_mask_serializes_as_string() {
        let json = serde_json::to_string(&PermissionMask::new(12)).unwrap();
        assert_eq!(json, r#""12""#);
    }

    #[test]
    fn test_mask_from_iter() {
        let mask: PermissionMask = [PermissionMask::bit(1), PermissionMask::bit(2)]
            .into_iter()
            .collect();
        assert_eq!(mask.bits(), 0b110);
    }
}
