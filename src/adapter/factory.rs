use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::{
    adapter::PropertyMap,
    property::{AccessTier, PropertyCache, PropertyTable},
    typesystem::{Introspect, TypeKey, TypeRegistry},
    Result,
};

static GLOBAL: OnceLock<PropertyMaps> = OnceLock::new();

/// Creates [`PropertyMap`]s and owns the caches behind them.
///
/// A `PropertyMaps` instance holds a [`TypeRegistry`] and a [`PropertyCache`]; every type is
/// described and resolved once per instance, then shared by all maps adapted through it. Most
/// callers use the process-wide [`PropertyMaps::global`] instance through [`adapt`]; isolated
/// instances are useful where caches must not be shared, for example in tests.
///
/// # Examples
///
/// ```rust
/// use propmap::{property::AccessTier, typesystem::{Introspect, TypeBuilder}, PropertyMaps};
///
/// struct Gauge {
///     level: f64,
/// }
///
/// impl Introspect for Gauge {
///     fn describe(ty: &mut TypeBuilder<Self>) {
///         ty.field::<f64>("level")
///             .reader("level", |g: &Gauge| g.level)
///             .writer("level", |g: &mut Gauge, v: f64| g.level = v);
///     }
/// }
///
/// let maps = PropertyMaps::with_tier(AccessTier::Bound);
/// let mut gauge = Gauge { level: 0.5 };
/// let mut map = maps.adapt(&mut gauge)?;
/// map.put("level", 0.75)?;
/// assert_eq!(map.tier(), AccessTier::Bound);
/// # Ok::<(), propmap::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct PropertyMaps {
    registry: Arc<TypeRegistry>,
    cache: PropertyCache,
    tier: AccessTier,
}

impl PropertyMaps {
    /// Create an isolated instance using the default tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an isolated instance using `tier` unless told otherwise.
    #[must_use]
    pub fn with_tier(tier: AccessTier) -> Self {
        PropertyMaps {
            tier,
            ..Self::default()
        }
    }

    /// The process-wide instance.
    pub fn global() -> &'static PropertyMaps {
        GLOBAL.get_or_init(PropertyMaps::new)
    }

    /// The tier used by [`PropertyMaps::adapt`].
    #[must_use]
    pub fn default_tier(&self) -> AccessTier {
        self.tier
    }

    /// View `target` as a property map using the default tier.
    ///
    /// # Errors
    /// Returns [`Error::AccessDenied`](crate::Error::AccessDenied) if the type has accessors
    /// that cannot be reached.
    pub fn adapt<'a, T: Introspect>(&self, target: &'a mut T) -> Result<PropertyMap<'a>> {
        self.adapt_with(target, self.tier)
    }

    /// View `target` as a property map using `tier`.
    ///
    /// # Errors
    /// Returns [`Error::AccessDenied`](crate::Error::AccessDenied) if the type has accessors
    /// that cannot be reached.
    pub fn adapt_with<'a, T: Introspect>(
        &self,
        target: &'a mut T,
        tier: AccessTier,
    ) -> Result<PropertyMap<'a>> {
        let table = self.table::<T>(tier)?;
        Ok(PropertyMap::new(target, table))
    }

    /// The shared handle table of `T` at `tier`.
    ///
    /// # Errors
    /// Returns [`Error::AccessDenied`](crate::Error::AccessDenied) if the type has accessors
    /// that cannot be reached.
    pub fn table<T: Introspect>(&self, tier: AccessTier) -> Result<PropertyTable> {
        let descriptor = self.registry.descriptor::<T>();
        self.cache.table(&self.registry, &descriptor, tier)
    }

    /// The type registry of this instance.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The property cache of this instance.
    #[must_use]
    pub fn cache(&self) -> &PropertyCache {
        &self.cache
    }

    /// Drop all cached properties and handle tables.
    pub fn clear_caches(&self) {
        debug!("clearing all property caches");
        self.cache.clear();
    }

    /// Drop the cached properties and handle tables of `T`.
    pub fn clear_caches_for<T: Introspect + ?Sized>(&self) {
        let key = TypeKey::of::<T>();
        debug!(type_name = key.name(), "clearing property caches");
        self.cache.remove(&key);
    }
}

/// View `target` as a property map through [`PropertyMaps::global`], using the default tier.
///
/// # Errors
/// Returns [`Error::AccessDenied`](crate::Error::AccessDenied) if the type has accessors that
/// cannot be reached.
pub fn adapt<T: Introspect>(target: &mut T) -> Result<PropertyMap<'_>> {
    PropertyMaps::global().adapt(target)
}

/// View `target` as a property map through [`PropertyMaps::global`], using `tier`.
///
/// # Errors
/// Returns [`Error::AccessDenied`](crate::Error::AccessDenied) if the type has accessors that
/// cannot be reached.
pub fn adapt_with<T: Introspect>(target: &mut T, tier: AccessTier) -> Result<PropertyMap<'_>> {
    PropertyMaps::global().adapt_with(target, tier)
}
