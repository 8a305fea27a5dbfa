//! Tier B: access-checked once, pre-bound bodies.

use std::{any::Any, fmt, sync::Arc};

use crate::{
    property::{PropertyHandle, ReflectiveProperty},
    typesystem::{Invoker, MethodDescriptor, TypeRegistry, Value},
    Result,
};

/// A property handle whose accessor bodies were resolved and access-checked at construction.
///
/// Invocation calls straight into the stored [`Invoker`]; there is no per-call access check and
/// no arity check, since both were settled when the handle was built.
#[derive(Clone)]
pub struct BoundProperty {
    name: String,
    reader: Option<Bound>,
    writer: Option<Bound>,
}

#[derive(Clone)]
struct Bound {
    method: Arc<MethodDescriptor>,
    invoker: Invoker,
}

impl Bound {
    fn new(
        registry: &TypeRegistry,
        reflective: &ReflectiveProperty,
        method: &Arc<MethodDescriptor>,
    ) -> Result<Self> {
        registry.grant_access(reflective.owner(), method)?;
        Ok(Bound {
            method: method.clone(),
            invoker: method.body()?.clone(),
        })
    }
}

impl BoundProperty {
    /// Bind the accessors of a reflective handle.
    ///
    /// # Errors
    /// Returns [`Error::AccessDenied`](crate::Error::AccessDenied) if an accessor cannot be
    /// reached, or [`Error::AbstractMethod`](crate::Error::AbstractMethod) if it has no body.
    pub fn new(registry: &TypeRegistry, reflective: &ReflectiveProperty) -> Result<Self> {
        let reader = reflective
            .reader()
            .map(|method| Bound::new(registry, reflective, method))
            .transpose()?;
        let writer = reflective
            .writer()
            .map(|method| Bound::new(registry, reflective, method))
            .transpose()?;

        Ok(BoundProperty {
            name: reflective.name().to_string(),
            reader,
            writer,
        })
    }

    /// The bound reader invoker, if any.
    #[must_use]
    pub fn reader(&self) -> Option<&Invoker> {
        self.reader.as_ref().map(|bound| &bound.invoker)
    }

    /// The bound writer invoker, if any.
    #[must_use]
    pub fn writer(&self) -> Option<&Invoker> {
        self.writer.as_ref().map(|bound| &bound.invoker)
    }

    pub(crate) fn reader_method(&self) -> Option<&Arc<MethodDescriptor>> {
        self.reader.as_ref().map(|bound| &bound.method)
    }

    pub(crate) fn writer_method(&self) -> Option<&Arc<MethodDescriptor>> {
        self.writer.as_ref().map(|bound| &bound.method)
    }
}

impl PropertyHandle for BoundProperty {
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
        match &self.reader {
            Some(bound) => bound.invoker.call_shared(target, Vec::new()).map(Some),
            None => Ok(None),
        }
    }

    fn store(&self, target: &mut dyn Any, value: Value) -> Result<bool> {
        match &self.writer {
            Some(bound) => {
                bound.invoker.call(target, vec![value])?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl fmt::Debug for BoundProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundProperty")
            .field("name", &self.name)
            .field("reader", &self.reader_method().map(|m| m.name()))
            .field("writer", &self.writer_method().map(|m| m.name()))
            .finish()
    }
}
