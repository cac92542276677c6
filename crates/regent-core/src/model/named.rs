// ── Name index ──
//
// Ordered, name-addressable collections. Registry levels keep their
// children in a `NamedList`; lookups are linear scans and the first
// match wins when names repeat.

use std::collections::HashSet;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::crypto::{CryptoError, MasterKey};
use crate::error::RegistryError;
use crate::model::pair::Transform;

/// An entity addressable by name within its parent collection.
pub trait Named {
    /// Human-readable kind used in not-found errors.
    const ITEM_TYPE: &'static str;

    fn name(&self) -> &str;
}

/// Implement `Named` for a plaintext entity and its secure twin.
macro_rules! named {
    ($item_type:literal => $($ty:ty),+ ; $field:ident) => {
        $(
            impl $crate::model::named::Named for $ty {
                const ITEM_TYPE: &'static str = $item_type;

                fn name(&self) -> &str {
                    &self.$field
                }
            }
        )+
    };
}

pub(crate) use named;

/// Ordered collection of named entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedList<T>(Vec<T>);

impl<T> Default for NamedList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> NamedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T: Named> NamedList<T> {
    /// First item whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Result<&T, RegistryError> {
        self.0
            .iter()
            .find(|item| item.name() == name)
            .ok_or_else(|| RegistryError::ItemNotFound {
                item_type: T::ITEM_TYPE,
                name: name.to_owned(),
            })
    }

    /// Names in collection order, duplicates included.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(Named::name).collect()
    }

    /// Names that occur more than once, each reported once.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        self.0
            .iter()
            .map(Named::name)
            .filter(|name| !seen.insert(*name) && reported.insert(*name))
            .collect()
    }
}

impl<T> Deref for NamedList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for NamedList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for NamedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a NamedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> IntoIterator for NamedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T: Transform> Transform for NamedList<T> {
    type Secure = NamedList<T::Secure>;

    fn encrypt(&self, key: &MasterKey) -> Result<Self::Secure, CryptoError> {
        self.0.encrypt(key).map(NamedList)
    }

    fn decrypt(secure: &Self::Secure, key: &MasterKey) -> Result<Self, CryptoError> {
        Vec::<T>::decrypt(&secure.0, key).map(NamedList)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: String,
        rank: u32,
    }

    named!("item" => Item; name);

    fn item(name: &str, rank: u32) -> Item {
        Item {
            name: name.into(),
            rank,
        }
    }

    #[test]
    fn find_by_name_returns_first_match() {
        let list: NamedList<_> = vec![item("a", 1), item("b", 2), item("a", 3)].into();
        assert_eq!(list.find_by_name("a").unwrap().rank, 1);
        assert_eq!(list.find_by_name("b").unwrap().rank, 2);
    }

    #[test]
    fn find_by_name_is_exact() {
        let list: NamedList<_> = vec![item("Prod", 1)].into();
        let err = list.find_by_name("prod").unwrap_err();
        assert_eq!(err.to_string(), "could not find item prod");
        assert!(list.find_by_name("Prod ").is_err());
    }

    #[test]
    fn empty_collection_never_matches() {
        let list: NamedList<Item> = NamedList::new();
        assert!(list.find_by_name("").unwrap_err().is_not_found());
        assert!(list.names().is_empty());
    }

    #[test]
    fn empty_name_is_a_valid_key() {
        let list: NamedList<_> = vec![item("", 7)].into();
        assert_eq!(list.find_by_name("").unwrap().rank, 7);
    }

    #[test]
    fn names_keep_order_and_duplicates() {
        let list: NamedList<_> = vec![item("x", 0), item("y", 0), item("x", 0)].into();
        assert_eq!(list.names(), ["x", "y", "x"]);
        assert_eq!(list.duplicate_names(), ["x"]);
    }

    #[test]
    fn serializes_as_plain_sequence() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Wrapper {
            items: NamedList<String>,
        }
        let w = Wrapper {
            items: vec!["a".to_owned()].into(),
        };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"items":["a"]}"#);
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), w);
    }
}
