use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    property::{
        resolver, AccessTier, BoundProperty, CompiledProperty, HandleTable, PropertyTable,
        ReflectiveProperty, ResolvedProperties,
    },
    typesystem::{TypeDescriptorRc, TypeKey, TypeRegistry},
    Result,
};

/// Per-type memoization of resolved properties and handle tables.
///
/// Every map is filled with a compute-once discipline: a missing entry is computed without
/// holding any lock, then published with an insert-if-absent step. When several threads race on
/// the first use of a type, all of them return the entry that was published first and the other
/// results are dropped. Failed computations are never cached.
///
/// Handle tables are layered: a compiled table is built from the bound table of the same type,
/// which in turn is built from the reflective table, so requesting a higher tier fills the lower
/// ones as well.
#[derive(Debug, Default)]
pub struct PropertyCache {
    resolved: DashMap<TypeKey, Arc<ResolvedProperties>>,
    reflective: DashMap<TypeKey, Arc<HandleTable<ReflectiveProperty>>>,
    bound: DashMap<TypeKey, Arc<HandleTable<BoundProperty>>>,
    compiled: DashMap<TypeKey, Arc<HandleTable<CompiledProperty>>>,
}

fn compute_once<V: Clone>(
    map: &DashMap<TypeKey, V>,
    key: TypeKey,
    compute: impl FnOnce() -> Result<V>,
) -> Result<V> {
    if let Some(existing) = map.get(&key) {
        return Ok(existing.clone());
    }

    let computed = compute()?;
    Ok(map.entry(key).or_insert(computed).clone())
}

impl PropertyCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved properties of `descriptor`.
    #[must_use]
    pub fn resolved(
        &self,
        registry: &TypeRegistry,
        descriptor: &TypeDescriptorRc,
    ) -> Arc<ResolvedProperties> {
        let key = descriptor.key();
        if let Some(existing) = self.resolved.get(&key) {
            return existing.clone();
        }

        let computed = Arc::new(resolver::resolve(registry, descriptor));
        self.resolved.entry(key).or_insert(computed).clone()
    }

    /// The handle table of `descriptor` at `tier`.
    ///
    /// # Errors
    /// Returns [`Error::AccessDenied`](crate::Error::AccessDenied) if any accessor of the type
    /// cannot be reached; nothing is cached in that case.
    pub fn table(
        &self,
        registry: &Arc<TypeRegistry>,
        descriptor: &TypeDescriptorRc,
        tier: AccessTier,
    ) -> Result<PropertyTable> {
        Ok(match tier {
            AccessTier::Reflective => {
                PropertyTable::Reflective(self.reflective(registry, descriptor)?)
            }
            AccessTier::Bound => PropertyTable::Bound(self.bound(registry, descriptor)?),
            AccessTier::Compiled => PropertyTable::Compiled(self.compiled(registry, descriptor)?),
        })
    }

    fn reflective(
        &self,
        registry: &Arc<TypeRegistry>,
        descriptor: &TypeDescriptorRc,
    ) -> Result<Arc<HandleTable<ReflectiveProperty>>> {
        compute_once(&self.reflective, descriptor.key(), || {
            debug!(
                type_name = descriptor.name(),
                tier = %AccessTier::Reflective,
                "building handles"
            );

            let resolved = self.resolved(registry, descriptor);
            let mut handles = IndexMap::with_capacity(resolved.len());
            for property in resolved.iter() {
                let handle =
                    ReflectiveProperty::new(registry.clone(), descriptor.clone(), property)?;
                handles.insert(property.name().to_string(), handle);
            }

            Ok(Arc::new(HandleTable::new(descriptor.clone(), handles)))
        })
    }

    fn bound(
        &self,
        registry: &Arc<TypeRegistry>,
        descriptor: &TypeDescriptorRc,
    ) -> Result<Arc<HandleTable<BoundProperty>>> {
        compute_once(&self.bound, descriptor.key(), || {
            debug!(
                type_name = descriptor.name(),
                tier = %AccessTier::Bound,
                "building handles"
            );

            let reflective = self.reflective(registry, descriptor)?;
            let mut handles = IndexMap::with_capacity(reflective.len());
            for (name, handle) in reflective.entries() {
                handles.insert(name.to_string(), BoundProperty::new(registry, handle)?);
            }

            Ok(Arc::new(HandleTable::new(descriptor.clone(), handles)))
        })
    }

    fn compiled(
        &self,
        registry: &Arc<TypeRegistry>,
        descriptor: &TypeDescriptorRc,
    ) -> Result<Arc<HandleTable<CompiledProperty>>> {
        compute_once(&self.compiled, descriptor.key(), || {
            debug!(
                type_name = descriptor.name(),
                tier = %AccessTier::Compiled,
                "building handles"
            );

            let bound = self.bound(registry, descriptor)?;
            let handles = bound
                .entries()
                .map(|(name, handle)| (name.to_string(), CompiledProperty::new(handle)))
                .collect();

            Ok(Arc::new(HandleTable::new(descriptor.clone(), handles)))
        })
    }

    /// Returns `true` if a handle table for `key` at `tier` is cached.
    #[must_use]
    pub fn contains(&self, key: &TypeKey, tier: AccessTier) -> bool {
        match tier {
            AccessTier::Reflective => self.reflective.contains_key(key),
            AccessTier::Bound => self.bound.contains_key(key),
            AccessTier::Compiled => self.compiled.contains_key(key),
        }
    }

    /// Returns `true` if the resolved properties of `key` are cached.
    #[must_use]
    pub fn contains_resolved(&self, key: &TypeKey) -> bool {
        self.resolved.contains_key(key)
    }

    /// Drop everything cached for `key`. Tables are rebuilt on next use.
    pub fn remove(&self, key: &TypeKey) {
        self.resolved.remove(key);
        self.reflective.remove(key);
        self.bound.remove(key);
        self.compiled.remove(key);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.resolved.clear();
        self.reflective.clear();
        self.bound.clear();
        self.compiled.clear();
    }
}
