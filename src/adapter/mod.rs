//! Key-value view over a live object.
//!
//! [`PropertyMap`] presents the discovered properties of one object as a map from property
//! names to [`Value`]s. The key set is the type's property table: it never grows or shrinks,
//! `remove` and `clear` are always rejected, and writing to an unknown or read-only key is a
//! silent no-op.
//!
//! # Reads and Writes
//!
//! | Key | `get` | `put` |
//! |-----|-------|-------|
//! | unknown | `None` | no-op, `None` |
//! | read-only | reader value | no-op, `None` |
//! | write-only | `None` | writes, `None` |
//! | read-write | reader value | writes, previous value |
//!
//! A property whose reader returns nothing yields `Some(Value::Null)`, which keeps it apart from
//! unknown and write-only keys. [`PropertyMap::property`] tells those two cases apart.
//!
//! # Equality
//!
//! Property maps compare and hash like ordinary maps: two maps are equal when they hold the same
//! keys mapped to equal values, regardless of order. Unreadable properties take part with
//! [`Value::Null`]; a reader failing during comparison makes the maps unequal.
//!
//! # Examples
//!
//! ```rust
//! use propmap::{typesystem::{Introspect, TypeBuilder, Value}, PropertyMaps};
//!
//! struct Person {
//!     name: String,
//! }
//!
//! impl Introspect for Person {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.reader("getName", |p: &Person| p.name.clone())
//!             .writer("setName", |p: &mut Person, v: String| p.name = v);
//!     }
//! }
//!
//! let mut person = Person { name: "Ada".into() };
//! let mut map = PropertyMaps::global().adapt(&mut person)?;
//!
//! assert_eq!(map.get("name")?, Some(Value::from("Ada")));
//! assert_eq!(map.put("name", "Grace")?, Some(Value::from("Ada")));
//! assert_eq!(map.put("unknown", "x")?, None);
//! drop(map);
//! assert_eq!(person.name, "Grace");
//! # Ok::<(), propmap::Error>(())
//! ```

mod entry;
mod factory;

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    hash::{BuildHasher, Hash, Hasher},
};

use crate::{
    property::{AccessTier, PropertyHandle, PropertyTable},
    typesystem::{TypeKey, Value},
    Error, Result,
};

pub use entry::{PropertyEntry, PropertyEntryMut, PropertyEntrySet};
pub use factory::{adapt, adapt_with, PropertyMaps};

/// A live key-value view over the properties of one object.
///
/// Created by [`PropertyMaps::adapt`]. The map borrows the object mutably for its whole
/// lifetime and caches nothing about it; every read goes to the object's reader.
pub struct PropertyMap<'a> {
    target: &'a mut dyn Any,
    table: PropertyTable,
}

impl<'a> PropertyMap<'a> {
    pub(crate) fn new(target: &'a mut dyn Any, table: PropertyTable) -> Self {
        PropertyMap { target, table }
    }

    /// Number of properties, readable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the type has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if `key` is a property, whatever accessors back it.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.table.get(key).is_some()
    }

    /// The handle behind `key`, for telling unknown keys from unreadable ones.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&dyn PropertyHandle> {
        self.table.get(key)
    }

    /// Read `key`.
    ///
    /// Returns `None` for unknown and write-only keys.
    ///
    /// # Errors
    /// Returns the error raised by the reader.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.table.get(key) {
            Some(handle) => handle.read(&*self.target),
            None => Ok(None),
        }
    }

    /// Write `key`, returning the previous value.
    ///
    /// Unknown and read-only keys are left alone and yield `None`. Write-only keys are written
    /// and yield `None`.
    ///
    /// # Errors
    /// Returns the error raised by the reader or the writer.
    pub fn put(&mut self, key: &str, value: impl Into<Value>) -> Result<Option<Value>> {
        match self.table.get(key) {
            Some(handle) => handle.write(&mut *self.target, value.into()),
            None => Ok(None),
        }
    }

    /// Write every property of this map that `values` has an entry for.
    ///
    /// Keys of `values` that are not properties are ignored.
    ///
    /// # Errors
    /// Stops at and returns the first error raised by a reader or writer.
    pub fn put_all<S: BuildHasher>(&mut self, values: &HashMap<String, Value, S>) -> Result<()> {
        for handle in self.table.iter() {
            if let Some(value) = values.get(handle.name()) {
                handle.write(&mut *self.target, value.clone())?;
            }
        }
        Ok(())
    }

    /// Returns `true` if any readable property currently equals `value`.
    ///
    /// # Errors
    /// Returns the first error raised by a reader.
    pub fn contains_value(&self, value: &Value) -> Result<bool> {
        for handle in self.table.iter() {
            if handle.matches(&*self.target, value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Always fails: properties cannot be removed from a type.
    ///
    /// # Errors
    /// Always returns [`Error::Unsupported`].
    pub fn remove(&mut self, _key: &str) -> Result<Option<Value>> {
        Err(Error::Unsupported("remove"))
    }

    /// Always fails: properties cannot be removed from a type.
    ///
    /// # Errors
    /// Always returns [`Error::Unsupported`].
    pub fn clear(&mut self) -> Result<()> {
        Err(Error::Unsupported("clear"))
    }

    /// Property names in discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.iter().map(|handle| handle.name())
    }

    /// Snapshot of the current values in discovery order, with [`Value::Null`] for unreadable
    /// properties.
    ///
    /// # Errors
    /// Returns the first error raised by a reader.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.table
            .iter()
            .map(|handle| Ok(handle.read(&*self.target)?.unwrap_or_default()))
            .collect()
    }

    /// Snapshot of all properties as an ordinary map, with [`Value::Null`] for unreadable
    /// properties.
    ///
    /// # Errors
    /// Returns the first error raised by a reader.
    pub fn snapshot(&self) -> Result<HashMap<String, Value>> {
        self.table
            .iter()
            .map(|handle| {
                let value = handle.read(&*self.target)?.unwrap_or_default();
                Ok((handle.name().to_string(), value))
            })
            .collect()
    }

    /// The entry view of this map.
    pub fn entries(&mut self) -> PropertyEntrySet<'_, 'a> {
        PropertyEntrySet::new(self)
    }

    /// The adapted object.
    #[must_use]
    pub fn adaptee(&self) -> &dyn Any {
        &*self.target
    }

    /// The adapted object, mutably.
    pub fn adaptee_mut(&mut self) -> &mut dyn Any {
        &mut *self.target
    }

    /// The type of the adapted object.
    #[must_use]
    pub fn target_type(&self) -> TypeKey {
        self.table.owner_key()
    }

    /// The tier of the handles used by this map.
    #[must_use]
    pub fn tier(&self) -> AccessTier {
        self.table.tier()
    }

    fn equals<F>(&self, len: usize, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<Value>,
    {
        if self.len() != len {
            return false;
        }

        self.table.iter().all(|handle| {
            let Ok(value) = handle.read(&*self.target) else {
                return false;
            };
            lookup(handle.name()) == Some(value.unwrap_or_default())
        })
    }
}

impl<S: BuildHasher> PartialEq<HashMap<String, Value, S>> for PropertyMap<'_> {
    fn eq(&self, other: &HashMap<String, Value, S>) -> bool {
        self.equals(other.len(), |key| other.get(key).cloned())
    }
}

impl<S: BuildHasher> PartialEq<PropertyMap<'_>> for HashMap<String, Value, S> {
    fn eq(&self, other: &PropertyMap<'_>) -> bool {
        other == self
    }
}

impl PartialEq for PropertyMap<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other.len(), |key| match other.table.get(key) {
            Some(handle) => handle
                .read(&*other.target)
                .ok()
                .map(Option::unwrap_or_default),
            None => None,
        })
    }
}

/// Hashes like an ordinary map: the sum of the hashes of all `(key, value)` entries.
///
/// Properties that cannot be read, or whose reader fails, contribute their key with
/// [`Value::Null`].
impl Hash for PropertyMap<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut sum: u64 = 0;
        for handle in self.table.iter() {
            let value = handle
                .read(&*self.target)
                .ok()
                .flatten()
                .unwrap_or_default();

            let mut entry = std::collections::hash_map::DefaultHasher::new();
            handle.name().hash(&mut entry);
            value.hash(&mut entry);
            sum = sum.wrapping_add(entry.finish());
        }
        state.write_u64(sum);
    }
}

impl fmt::Debug for PropertyMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for handle in self.table.iter() {
            match handle.read(&*self.target) {
                Ok(Some(value)) => map.entry(&handle.name(), &value),
                Ok(None) => map.entry(&handle.name(), &format_args!("<write-only>")),
                Err(_) => map.entry(&handle.name(), &format_args!("<error>")),
            };
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::test::{Conflicted, Faulty, Hidden, ReadOnly, Resident, Sealed, WriteOnly};

    fn hash_of(value: &impl Hash) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_size_counts_properties() {
        let maps = PropertyMaps::new();
        let mut write_only = WriteOnly::default();
        let map = maps.adapt(&mut write_only).unwrap();

        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());
        assert!(map.contains_key("secret"));
        assert!(!map.contains_key("nothing"));
    }

    #[test]
    fn test_unknown_and_write_only_are_distinguishable() {
        let maps = PropertyMaps::new();
        let mut write_only = WriteOnly::default();
        let map = maps.adapt(&mut write_only).unwrap();

        assert_eq!(map.get("secret").unwrap(), None);
        assert_eq!(map.get("nothing").unwrap(), None);

        let secret = map.property("secret").unwrap();
        assert!(!secret.is_readable());
        assert!(secret.is_writable());
        assert!(map.property("nothing").is_none());
    }

    #[test]
    fn test_null_reads_are_values() {
        let maps = PropertyMaps::new();
        let mut read_only = ReadOnly::new(None);
        let map = maps.adapt(&mut read_only).unwrap();

        assert_eq!(map.get("token").unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_put_all_uses_own_keys() {
        let maps = PropertyMaps::new();
        let mut resident = Resident::new("Kim", 41);
        let mut map = maps.adapt(&mut resident).unwrap();

        let mut values = HashMap::new();
        values.insert("name".to_string(), Value::from("Lee"));
        values.insert("age".to_string(), Value::I32(42));
        values.insert("address".to_string(), Value::from("ignored"));
        values.insert("unknown".to_string(), Value::from("ignored"));
        map.put_all(&values).unwrap();

        drop(map);
        assert_eq!(resident.name, "Lee");
        assert_eq!(resident.age, 42);
        assert_eq!(resident.street, "1 Main St");
    }

    #[test]
    fn test_contains_value_skips_unreadable() {
        let maps = PropertyMaps::new();
        let mut write_only = WriteOnly::default();
        let mut map = maps.adapt(&mut write_only).unwrap();

        assert_eq!(map.put("secret", "v").unwrap(), None);
        assert!(!map.contains_value(&Value::from("v")).unwrap());
        drop(map);
        assert_eq!(write_only.secret, "v");
    }

    #[test]
    fn test_remove_and_clear_are_unsupported() {
        let maps = PropertyMaps::new();
        let mut resident = Resident::new("Kim", 41);
        let mut map = maps.adapt(&mut resident).unwrap();

        assert!(matches!(map.remove("name"), Err(Error::Unsupported("remove"))));
        assert!(matches!(map.remove("nothing"), Err(Error::Unsupported("remove"))));
        assert!(matches!(map.clear(), Err(Error::Unsupported("clear"))));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_keys_and_values() {
        let maps = PropertyMaps::new();
        let mut resident = Resident::new("Kim", 41);
        let map = maps.adapt(&mut resident).unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name", "age", "address"]);
        assert_eq!(
            map.values().unwrap(),
            vec![
                Value::from("Kim"),
                Value::I32(41),
                Value::from("Kim, 1 Main St")
            ]
        );
    }

    #[test]
    fn test_equality_with_ordinary_maps() {
        let maps = PropertyMaps::new();
        let mut resident = Resident::new("Kim", 41);
        let map = maps.adapt(&mut resident).unwrap();

        let mut expected = HashMap::new();
        expected.insert("address".to_string(), Value::from("Kim, 1 Main St"));
        expected.insert("age".to_string(), Value::I32(41));
        expected.insert("name".to_string(), Value::from("Kim"));
        assert!(map == expected);
        assert!(expected == map);
        assert_eq!(map.snapshot().unwrap(), expected);

        expected.insert("age".to_string(), Value::I32(40));
        assert!(map != expected);
        assert!(expected != map);
    }

    #[test]
    fn test_equality_and_hash_between_maps() {
        let maps = PropertyMaps::new();
        let mut a = Resident::new("Kim", 41);
        let mut b = Resident::new("Kim", 41);
        let mut c = Resident::new("Lee", 41);

        let map_a = maps.adapt_with(&mut a, AccessTier::Reflective).unwrap();
        let map_b = maps.adapt_with(&mut b, AccessTier::Compiled).unwrap();
        let map_c = maps.adapt(&mut c).unwrap();

        assert!(map_a == map_b);
        assert_eq!(hash_of(&map_a), hash_of(&map_b));
        assert!(map_a != map_c);
    }

    #[test]
    fn test_failing_reader_breaks_equality() {
        let maps = PropertyMaps::new();
        let mut faulty = Faulty::default();
        let map = maps.adapt(&mut faulty).unwrap();

        let mut expected = HashMap::new();
        expected.insert("level".to_string(), Value::Null);
        assert!(map != expected);
        assert!(matches!(map.get("level"), Err(Error::Invocation { .. })));
    }

    #[test]
    fn test_adaptee_and_target_type() {
        let maps = PropertyMaps::new();
        let mut conflicted = Conflicted::new("fluent", "bean");
        let mut map = maps.adapt(&mut conflicted).unwrap();

        assert_eq!(map.target_type(), TypeKey::of::<Conflicted>());
        assert_eq!(map.tier(), AccessTier::Compiled);
        assert!(map.adaptee().is::<Conflicted>());

        let adaptee = map.adaptee_mut().downcast_mut::<Conflicted>().unwrap();
        adaptee.name = "changed".to_string();
        assert_eq!(map.get("name").unwrap(), Some(Value::from("changed")));
    }

    #[test]
    fn test_privileged_access() {
        let maps = PropertyMaps::new();

        for tier in AccessTier::iter() {
            let mut hidden = Hidden { code: 7 };
            let map = maps.adapt_with(&mut hidden, tier).unwrap();
            assert_eq!(map.get("code").unwrap(), Some(Value::I64(7)));

            let mut sealed = Sealed { code: 7 };
            assert!(matches!(
                maps.adapt_with(&mut sealed, tier),
                Err(Error::AccessDenied { .. })
            ));
        }
    }

    #[test]
    fn test_debug_output() {
        let maps = PropertyMaps::new();
        let mut write_only = WriteOnly::default();
        let map = maps.adapt(&mut write_only).unwrap();
        assert_eq!(format!("{map:?}"), r#"{"secret": <write-only>}"#);
    }
}
