//! Callable property handles.
//!
//! A handle realizes the reader and writer of one [`ResolvedProperty`](crate::property::ResolvedProperty)
//! as functions that can be invoked against a live object. Three interchangeable tiers exist:
//!
//! | Tier | Handle | Construction | Per call |
//! |------|--------|--------------|----------|
//! | [`AccessTier::Reflective`] | [`ReflectiveProperty`] | cheapest | access check + generic invocation |
//! | [`AccessTier::Bound`] | [`BoundProperty`] | access checked once | pre-bound body |
//! | [`AccessTier::Compiled`] | [`CompiledProperty`] | fixed-shape closures | direct closure call |
//!
//! Each tier is built from the one above it, and all of them share the same conversion path, so
//! reads, writes and errors are identical whichever tier is selected.

mod bound;
mod compiled;
mod reflective;

use std::{any::Any, fmt, sync::Arc};

use indexmap::IndexMap;
use strum::{Display, EnumIter, EnumString};

use crate::{
    typesystem::{TypeDescriptorRc, TypeKey, Value},
    Result,
};

pub use bound::BoundProperty;
pub use compiled::CompiledProperty;
pub use reflective::ReflectiveProperty;

/// Selects how discovered accessors are turned into callable handles.
///
/// The tier is purely a performance setting; it never changes what a property map does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AccessTier {
    /// Generic dynamic invocation with an access check on every call
    Reflective,
    /// Access-checked once, then invoked through the pre-bound body
    Bound,
    /// Fixed-shape reader and writer closures
    #[default]
    Compiled,
}

/// The uniform contract of a property handle.
///
/// Targets are passed as [`Any`] so that handles can be stored in type-erased tables; invoking a
/// handle on an object of another type fails with [`Error::TargetMismatch`](crate::Error::TargetMismatch).
pub trait PropertyHandle: Send + Sync + fmt::Debug {
    /// The property name.
    fn name(&self) -> &str;

    /// Returns `true` if the property has a reader.
    fn is_readable(&self) -> bool;

    /// Returns `true` if the property has a writer.
    fn is_writable(&self) -> bool;

    /// Read the property, or `None` if it has no reader.
    ///
    /// # Errors
    /// Returns the error raised by the reader.
    fn read(&self, target: &dyn Any) -> Result<Option<Value>>;

    /// Store `value` without reading the previous value. Returns `false` if there is no writer.
    ///
    /// # Errors
    /// Returns the error raised by the writer.
    fn store(&self, target: &mut dyn Any, value: Value) -> Result<bool>;

    /// Write the property, returning the previous value.
    ///
    /// Without a writer nothing happens and `None` is returned. Without a reader the value is
    /// written and `None` is returned, since the previous value cannot be observed.
    ///
    /// # Errors
    /// Returns the error raised by the reader or the writer.
    fn write(&self, target: &mut dyn Any, value: Value) -> Result<Option<Value>> {
        if !self.is_writable() {
            return Ok(None);
        }

        let previous = self.read(&*target)?;
        self.store(target, value)?;
        Ok(previous)
    }

    /// Returns `true` if the property is readable and currently equals `value`.
    ///
    /// # Errors
    /// Returns the error raised by the reader.
    fn matches(&self, target: &dyn Any, value: &Value) -> Result<bool> {
        Ok(self.read(target)?.as_ref() == Some(value))
    }
}

/// The handles of one type at one tier, in discovery order.
#[derive(Debug)]
pub struct HandleTable<H> {
    owner: TypeDescriptorRc,
    handles: IndexMap<String, H>,
}

impl<H: PropertyHandle> HandleTable<H> {
    pub(crate) fn new(owner: TypeDescriptorRc, handles: IndexMap<String, H>) -> Self {
        HandleTable { owner, handles }
    }

    /// The type the handles belong to.
    #[must_use]
    pub fn owner(&self) -> &TypeDescriptorRc {
        &self.owner
    }

    /// Look up a handle by property name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&H> {
        self.handles.get(name)
    }

    /// All handles in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &H> {
        self.handles.values()
    }

    /// Property names paired with their handles, in discovery order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &H)> {
        self.handles.iter().map(|(name, handle)| (name.as_str(), handle))
    }

    /// Number of handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// A shared handle table of any tier.
#[derive(Debug, Clone)]
pub enum PropertyTable {
    /// Table of [`ReflectiveProperty`] handles
    Reflective(Arc<HandleTable<ReflectiveProperty>>),
    /// Table of [`BoundProperty`] handles
    Bound(Arc<HandleTable<BoundProperty>>),
    /// Table of [`CompiledProperty`] handles
    Compiled(Arc<HandleTable<CompiledProperty>>),
}

impl PropertyTable {
    /// The tier of the handles in this table.
    #[must_use]
    pub fn tier(&self) -> AccessTier {
        match self {
            PropertyTable::Reflective(_) => AccessTier::Reflective,
            PropertyTable::Bound(_) => AccessTier::Bound,
            PropertyTable::Compiled(_) => AccessTier::Compiled,
        }
    }

    /// The type the table belongs to.
    #[must_use]
    pub fn owner(&self) -> &TypeDescriptorRc {
        match self {
            PropertyTable::Reflective(table) => table.owner(),
            PropertyTable::Bound(table) => table.owner(),
            PropertyTable::Compiled(table) => table.owner(),
        }
    }

    /// The key of the owning type.
    #[must_use]
    pub fn owner_key(&self) -> TypeKey {
        self.owner().key()
    }

    /// Look up a handle by property name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn PropertyHandle> {
        match self {
            PropertyTable::Reflective(table) => table.get(name).map(|h| h as &dyn PropertyHandle),
            PropertyTable::Bound(table) => table.get(name).map(|h| h as &dyn PropertyHandle),
            PropertyTable::Compiled(table) => table.get(name).map(|h| h as &dyn PropertyHandle),
        }
    }

    /// All handles in discovery order.
    #[must_use]
    pub fn iter(&self) -> Box<dyn Iterator<Item = &dyn PropertyHandle> + '_> {
        match self {
            PropertyTable::Reflective(table) => {
                Box::new(table.iter().map(|h| h as &dyn PropertyHandle))
            }
            PropertyTable::Bound(table) => Box::new(table.iter().map(|h| h as &dyn PropertyHandle)),
            PropertyTable::Compiled(table) => {
                Box::new(table.iter().map(|h| h as &dyn PropertyHandle))
            }
        }
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PropertyTable::Reflective(table) => table.len(),
            PropertyTable::Bound(table) => table.len(),
            PropertyTable::Compiled(table) => table.len(),
        }
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
