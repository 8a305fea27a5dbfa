//! Entry view of a [`PropertyMap`].

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    hash::{BuildHasher, Hash, Hasher},
};

use crate::{
    adapter::PropertyMap,
    property::PropertyHandle,
    typesystem::Value,
    Error, Result,
};

/// The `(key, value)` entries of a [`PropertyMap`].
///
/// Entries read and write through the same handles as the map itself. Bulk insertion only ever
/// touches properties the map already has; removal is always rejected.
pub struct PropertyEntrySet<'m, 'a> {
    map: &'m mut PropertyMap<'a>,
}

impl<'m, 'a> PropertyEntrySet<'m, 'a> {
    pub(crate) fn new(map: &'m mut PropertyMap<'a>) -> Self {
        PropertyEntrySet { map }
    }

    /// Number of entries, equal to the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate the entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = PropertyEntry<'_>> {
        let target = &*self.map.target;
        self.map
            .table
            .iter()
            .map(move |handle| PropertyEntry { handle, target })
    }

    /// The writable entry for `key`, if it is a property.
    pub fn entry_mut(&mut self, key: &str) -> Option<PropertyEntryMut<'_>> {
        let handle = self.map.table.get(key)?;
        Some(PropertyEntryMut {
            handle,
            target: &mut *self.map.target,
        })
    }

    /// Returns `true` if `key` is a readable property currently equal to `value`.
    ///
    /// # Errors
    /// Returns the error raised by the reader.
    pub fn contains(&self, key: &str, value: &Value) -> Result<bool> {
        match self.map.table.get(key) {
            Some(handle) => handle.matches(&*self.map.target, value),
            None => Ok(false),
        }
    }

    /// Returns `true` if every `(key, value)` pair is contained.
    ///
    /// # Errors
    /// Returns the first error raised by a reader.
    pub fn contains_all<'e, I>(&self, entries: I) -> Result<bool>
    where
        I: IntoIterator<Item = (&'e str, &'e Value)>,
    {
        for (key, value) in entries {
            if !self.contains(key, value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Write `value` to `key` if it is a writable property and the value differs.
    ///
    /// Returns `true` if the property was written. Unknown and read-only keys yield `false`.
    ///
    /// # Errors
    /// Returns the error raised by the reader or the writer.
    pub fn add(&mut self, key: &str, value: impl Into<Value>) -> Result<bool> {
        let Some(handle) = self.map.table.get(key) else {
            return Ok(false);
        };
        if !handle.is_writable() {
            return Ok(false);
        }

        let value = value.into();
        if handle.matches(&*self.map.target, &value)? {
            return Ok(false);
        }
        handle.store(&mut *self.map.target, value)
    }

    /// [`add`](Self::add) every entry; returns `true` if any property was written.
    ///
    /// # Errors
    /// Stops at and returns the first error raised by a reader or writer.
    pub fn add_all<K, I>(&mut self, entries: I) -> Result<bool>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut changed = false;
        for (key, value) in entries {
            changed |= self.add(key.as_ref(), value)?;
        }
        Ok(changed)
    }

    /// Always fails: properties cannot be removed from a type.
    ///
    /// # Errors
    /// Always returns [`Error::Unsupported`].
    pub fn remove(&mut self, _key: &str) -> Result<bool> {
        Err(Error::Unsupported("remove"))
    }

    /// Always fails: properties cannot be removed from a type.
    ///
    /// # Errors
    /// Always returns [`Error::Unsupported`].
    pub fn remove_all<'e, I>(&mut self, _keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'e str>,
    {
        Err(Error::Unsupported("remove_all"))
    }

    /// Always fails: properties cannot be removed from a type.
    ///
    /// # Errors
    /// Always returns [`Error::Unsupported`].
    pub fn retain_all<'e, I>(&mut self, _keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'e str>,
    {
        Err(Error::Unsupported("retain_all"))
    }

    /// Always fails: properties cannot be removed from a type.
    ///
    /// # Errors
    /// Always returns [`Error::Unsupported`].
    pub fn clear(&mut self) -> Result<()> {
        Err(Error::Unsupported("clear"))
    }
}

/// Entry sets compare like the maps they belong to.
impl PartialEq for PropertyEntrySet<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        *self.map == *other.map
    }
}

impl<S: BuildHasher> PartialEq<HashMap<String, Value, S>> for PropertyEntrySet<'_, '_> {
    fn eq(&self, other: &HashMap<String, Value, S>) -> bool {
        *self.map == *other
    }
}

/// Hashes like the map the entries belong to.
impl Hash for PropertyEntrySet<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

/// One entry of a [`PropertyEntrySet`], reading through to the object.
#[derive(Clone, Copy)]
pub struct PropertyEntry<'e> {
    handle: &'e dyn PropertyHandle,
    target: &'e dyn Any,
}

impl PropertyEntry<'_> {
    /// The property name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.handle.name()
    }

    /// The current value, as [`PropertyMap::get`] would return it.
    ///
    /// # Errors
    /// Returns the error raised by the reader.
    pub fn value(&self) -> Result<Option<Value>> {
        self.handle.read(self.target)
    }
}

impl fmt::Debug for PropertyEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyEntry")
            .field("key", &self.key())
            .field("value", &self.value().ok().flatten())
            .finish()
    }
}

/// A writable entry of a [`PropertyEntrySet`].
pub struct PropertyEntryMut<'e> {
    handle: &'e dyn PropertyHandle,
    target: &'e mut dyn Any,
}

impl PropertyEntryMut<'_> {
    /// The property name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.handle.name()
    }

    /// The current value, as [`PropertyMap::get`] would return it.
    ///
    /// # Errors
    /// Returns the error raised by the reader.
    pub fn value(&self) -> Result<Option<Value>> {
        self.handle.read(&*self.target)
    }

    /// Write the entry, as [`PropertyMap::put`] would.
    ///
    /// # Errors
    /// Returns the error raised by the reader or the writer.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<Option<Value>> {
        self.handle.write(&mut *self.target, value.into())
    }
}
