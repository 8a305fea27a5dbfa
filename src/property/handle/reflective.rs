//! Tier A: generic dynamic invocation.

use std::{any::Any, fmt, sync::Arc};

use crate::{
    property::{PropertyHandle, ResolvedProperty},
    typesystem::{MethodDescriptor, TypeDescriptorRc, TypeRegistry, Value},
    Result,
};

/// A property handle that goes through [`MethodDescriptor::invoke`] on every call.
///
/// The privileged access check is performed when the handle is built and repeated before each
/// invocation, and every call pays for argument packing and the arity check.
#[derive(Clone)]
pub struct ReflectiveProperty {
    name: String,
    registry: Arc<TypeRegistry>,
    owner: TypeDescriptorRc,
    reader: Option<Arc<MethodDescriptor>>,
    writer: Option<Arc<MethodDescriptor>>,
}

impl ReflectiveProperty {
    /// Build the handle for `property` of `owner`.
    ///
    /// # Errors
    /// Returns [`Error::AccessDenied`](crate::Error::AccessDenied) if either accessor cannot be
    /// reached.
    pub fn new(
        registry: Arc<TypeRegistry>,
        owner: TypeDescriptorRc,
        property: &ResolvedProperty,
    ) -> Result<Self> {
        for method in property.reader().into_iter().chain(property.writer()) {
            registry.grant_access(&owner, method)?;
        }

        Ok(ReflectiveProperty {
            name: property.name().to_string(),
            registry,
            owner,
            reader: property.reader().cloned(),
            writer: property.writer().cloned(),
        })
    }

    /// The owning type.
    #[must_use]
    pub fn owner(&self) -> &TypeDescriptorRc {
        &self.owner
    }

    /// The reader method, if any.
    #[must_use]
    pub fn reader(&self) -> Option<&Arc<MethodDescriptor>> {
        self.reader.as_ref()
    }

    /// The writer method, if any.
    #[must_use]
    pub fn writer(&self) -> Option<&Arc<MethodDescriptor>> {
        self.writer.as_ref()
    }
}

impl PropertyHandle for ReflectiveProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_readable(&self) -> bool {
        self.reader.is_some()
    }

    fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    fn read(&self, target: &dyn Any) -> Result<Option<Value>> {
        let Some(reader) = &self.reader else {
            return Ok(None);
        };

        self.registry.grant_access(&self.owner, reader)?;
        reader.invoke_shared(target, Vec::new()).map(Some)
    }

    fn store(&self, target: &mut dyn Any, value: Value) -> Result<bool> {
        let Some(writer) = &self.writer else {
            return Ok(false);
        };

        self.registry.grant_access(&self.owner, writer)?;
        writer.invoke(target, vec![value])?;
        Ok(true)
    }
}

impl fmt::Debug for ReflectiveProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectiveProperty")
            .field("name", &self.name)
            .field("owner", &self.owner.key())
            .field("reader", &self.reader.as_ref().map(|m| m.name()))
            .field("writer", &self.writer.as_ref().map(|m| m.name()))
            .finish()
    }
}
