//! Concurrent store of type descriptors.
//!
//! The [`TypeRegistry`] produces each [`TypeDescriptor`] once, on first request, by running the
//! type's [`Introspect::describe`] implementation. Descriptors are immutable afterwards and are
//! shared between all callers through [`TypeDescriptorRc`].
//!
//! # Thread Safety
//!
//! Storage is a [`DashMap`]. A missing descriptor is built outside of any shard lock and then
//! published with an insert-if-absent step, so threads describing the same type at the same time
//! all end up with the instance that was published first. The losing threads' descriptors are
//! dropped.
//!
//! # Hierarchy Queries
//!
//! Supertypes are resolved lazily through the registry, which lets the registry answer subtype
//! and assignability questions and compute the full ancestor/interface closure of a type.

use std::{collections::HashSet, sync::Arc};

use dashmap::DashMap;

use crate::{
    typesystem::{
        Introspect, MethodDescriptor, TypeBuilder, TypeDescriptor, TypeDescriptorRc, TypeFlags,
        TypeKey, ValueType,
    },
    Error, Result,
};

/// Compute-once store of [`TypeDescriptor`]s, keyed by [`TypeKey`].
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<TypeKey, TypeDescriptorRc>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        TypeRegistry {
            types: DashMap::new(),
        }
    }

    /// Get the descriptor of `T`, describing the type on first use.
    ///
    /// ## Arguments
    /// * `T` - The type or interface (`dyn Trait`) to describe
    pub fn descriptor<T: Introspect + ?Sized>(&self) -> TypeDescriptorRc {
        let key = TypeKey::of::<T>();
        if let Some(existing) = self.types.get(&key) {
            return existing.clone();
        }

        let mut builder = TypeBuilder::<T>::new();
        T::describe(&mut builder);
        let built = Arc::new(builder.build());

        self.types.entry(key).or_insert(built).clone()
    }

    /// Look up an already described type.
    #[must_use]
    pub fn get(&self, key: &TypeKey) -> Option<TypeDescriptorRc> {
        self.types.get(key).map(|entry| entry.clone())
    }

    /// Returns `true` if `key` has been described by this registry.
    #[must_use]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    /// Number of described types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type has been described yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All ancestors and implemented interfaces of `descriptor`.
    ///
    /// The closure is walked depth-first, visiting a type's interfaces before its base type.
    /// Each ancestor appears once; the type itself and the universal base are excluded.
    #[must_use]
    pub fn ancestor_closure(&self, descriptor: &TypeDescriptor) -> Vec<TypeDescriptorRc> {
        let mut visited = HashSet::new();
        visited.insert(descriptor.key());
        visited.insert(TypeKey::universal());

        let mut closure = Vec::new();
        self.collect_ancestors(descriptor, &mut visited, &mut closure);
        closure
    }

    fn collect_ancestors(
        &self,
        descriptor: &TypeDescriptor,
        visited: &mut HashSet<TypeKey>,
        closure: &mut Vec<TypeDescriptorRc>,
    ) {
        for supertype in descriptor.supertypes() {
            if !visited.insert(supertype.key()) {
                continue;
            }

            let resolved = supertype.resolve(self);
            closure.push(resolved.clone());
            self.collect_ancestors(&resolved, visited, closure);
        }
    }

    /// Returns `true` if `sub` is `sup` or has `sup` in its ancestor closure.
    ///
    /// Only types already known to the registry can be subtypes of anything but themselves.
    #[must_use]
    pub fn is_subtype(&self, sub: TypeKey, sup: TypeKey) -> bool {
        if sub == sup || sup == TypeKey::universal() {
            return true;
        }

        match self.get(&sub) {
            Some(descriptor) => self
                .ancestor_closure(&descriptor)
                .iter()
                .any(|ancestor| ancestor.key() == sup),
            None => false,
        }
    }

    /// Returns `true` if a value declared as `source` can be stored where `target` is declared.
    ///
    /// No boxing or widening is applied here; callers compare boxed forms where required. A
    /// non-null string fits a nullable string slot, never the other way around.
    #[must_use]
    pub fn is_assignable(&self, target: &ValueType, source: &ValueType) -> bool {
        match (target, source) {
            (ValueType::Any, _) => true,
            (ValueType::NullableString, ValueType::String) => true,
            (ValueType::Object(sup), ValueType::Object(sub)) => self.is_subtype(*sub, *sup),
            _ => target == source,
        }
    }

    /// Perform the privileged access check for calling `method` on instances of `owner`.
    ///
    /// Public members of public types need no privileges. Members declared by a non-public type
    /// are granted unless the declaring type is [`TypeFlags::RESTRICTED`].
    ///
    /// # Errors
    /// Returns [`Error::AccessDenied`] if privileged access is refused.
    pub fn grant_access(&self, owner: &TypeDescriptor, method: &MethodDescriptor) -> Result<()> {
        let declaring = if method.declaring_type() == owner.key() {
            None
        } else {
            self.get(&method.declaring_type())
        };
        let flags = declaring.as_deref().unwrap_or(owner).flags();

        if flags.contains(TypeFlags::PUBLIC) || !flags.contains(TypeFlags::RESTRICTED) {
            Ok(())
        } else {
            Err(Error::AccessDenied {
                type_name: owner.name(),
                member: method.name().to_string(),
            })
        }
    }
}
