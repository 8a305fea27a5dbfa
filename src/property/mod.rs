//! Property discovery, caching and handles.
//!
//! Discovery turns the description of a type into a table of named properties, each backed by an
//! optional reader and an optional writer method. It runs in two steps:
//!
//! 1. The [`classifier`] inspects every method on its own and produces accessor candidates with
//!    a property name, a direction and the evidence behind the decision.
//! 2. The [`resolver`] groups candidates by name and picks the winning reader and writer for
//!    each property.
//!
//! The resolved table is then realized as callable [`handle`]s at one of three [`AccessTier`]s.
//! Both the resolved tables and the handle tables are memoized per type by the
//! [`PropertyCache`].
//!
//! # Key Components
//!
//! - [`ResolvedProperty`] / [`ResolvedProperties`]: Discovery output for one type
//! - [`PropertyHandle`]: Uniform read/write contract implemented by every tier
//! - [`HandleTable`] / [`PropertyTable`]: Per-type handle tables, typed and tier-erased
//! - [`PropertyCache`]: Concurrent compute-once cache of all of the above

pub mod classifier;
pub mod handle;
pub mod resolver;

mod cache;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::typesystem::{MethodDescriptor, TypeDescriptorRc};

pub use cache::PropertyCache;
pub use handle::{
    AccessTier, BoundProperty, CompiledProperty, HandleTable, PropertyHandle, PropertyTable,
    ReflectiveProperty,
};

/// One discovered property: a name with an optional reader and an optional writer.
///
/// Read-only and write-only properties are both valid.
#[derive(Debug, Clone)]
pub struct ResolvedProperty {
    pub(crate) name: String,
    pub(crate) reader: Option<Arc<MethodDescriptor>>,
    pub(crate) writer: Option<Arc<MethodDescriptor>>,
}

impl ResolvedProperty {
    /// The property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The winning reader, if any.
    #[must_use]
    pub fn reader(&self) -> Option<&Arc<MethodDescriptor>> {
        self.reader.as_ref()
    }

    /// The winning writer, if any.
    #[must_use]
    pub fn writer(&self) -> Option<&Arc<MethodDescriptor>> {
        self.writer.as_ref()
    }
}

fn same_method(a: Option<&Arc<MethodDescriptor>>, b: Option<&Arc<MethodDescriptor>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Two resolved properties are equal when they are backed by the very same methods.
impl PartialEq for ResolvedProperty {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && same_method(self.reader(), other.reader())
            && same_method(self.writer(), other.writer())
    }
}

impl Eq for ResolvedProperty {}

/// The resolved properties of one type, in discovery order.
#[derive(Debug, Clone)]
pub struct ResolvedProperties {
    pub(crate) owner: TypeDescriptorRc,
    pub(crate) properties: IndexMap<String, ResolvedProperty>,
}

impl ResolvedProperties {
    /// The type the properties belong to.
    #[must_use]
    pub fn owner(&self) -> &TypeDescriptorRc {
        &self.owner
    }

    /// Look up a property by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedProperty> {
        self.properties.get(name)
    }

    /// Property names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// All properties in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedProperty> {
        self.properties.values()
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the type has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PartialEq for ResolvedProperties {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.owner, &other.owner)
            && self.properties.len() == other.properties.len()
            && self
                .properties
                .iter()
                .zip(other.properties.iter())
                .all(|((a_name, a), (b_name, b))| a_name == b_name && a == b)
    }
}

impl Eq for ResolvedProperties {}
