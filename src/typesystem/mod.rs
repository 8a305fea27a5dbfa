//! Type description facility for property discovery.
//!
//! Rust has no runtime reflection, so types that want to be viewed as property maps describe
//! themselves once through the [`Introspect`] trait. The resulting [`TypeDescriptor`] lists the
//! type's fields and callable methods, its supertypes and the out-of-band property markers on
//! individual methods. Discovery never looks at anything beyond this description.
//!
//! # Key Components
//!
//! - [`TypeKey`]: Identity of a described type or interface
//! - [`TypeDescriptor`]: Fields, methods and supertypes of one type
//! - [`MethodDescriptor`]: Signature, flags and erased body of one method
//! - [`TypeBuilder`]: Typed builder used inside [`Introspect::describe`]
//! - [`TypeRegistry`]: Concurrent, compute-once store of descriptors
//! - [`Value`] / [`ValueType`]: Dynamic values and declared types
//!
//! # Interfaces
//!
//! Trait objects play the role of interfaces. A trait can be described by implementing
//! [`Introspect`] for `dyn Trait` and declaring its methods with
//! [`TypeBuilder::abstract_method`]; classes then list it with [`TypeBuilder::implements`].
//! Property markers placed on interface methods are found by discovery even when the
//! implementing class does not repeat them.
//!
//! # Examples
//!
//! ```rust
//! use propmap::typesystem::{Introspect, TypeBuilder, TypeRegistry};
//!
//! struct Account {
//!     owner: String,
//!     active: bool,
//! }
//!
//! impl Introspect for Account {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.field::<String>("owner")
//!             .field::<bool>("active")
//!             .reader("owner", |a: &Account| a.owner.clone())
//!             .fluent_writer("owner", |a: &mut Account, v: String| {
//!                 a.owner = v;
//!                 a
//!             })
//!             .reader("isActive", |a: &Account| a.active);
//!     }
//! }
//!
//! let registry = TypeRegistry::new();
//! let descriptor = registry.descriptor::<Account>();
//! assert_eq!(descriptor.fields().len(), 2);
//! assert!(descriptor.method("owner", &[]).is_some());
//! ```

mod builder;
mod method;
mod registry;
mod value;

use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

use bitflags::bitflags;

pub use builder::TypeBuilder;
pub use method::{
    DirectAccess, ExclusiveFn, FieldDescriptor, FieldFlags, Invoker, MethodDescriptor,
    MethodFlags, PropertyMarker, ReadFn, Receiver, SharedFn, WriteFn,
};
pub use registry::TypeRegistry;
pub use value::{ObjectRef, PrimitiveKind, PropertyValue, Value, ValueType};

/// Reference to a `TypeDescriptor`
pub type TypeDescriptorRc = Arc<TypeDescriptor>;

/// Implemented by types that can be viewed as property maps.
///
/// The description is produced once per [`TypeRegistry`] and cached for the registry's
/// lifetime, so `describe` should be a pure function of the type.
pub trait Introspect: 'static {
    /// Declare the fields, methods and supertypes of `Self`.
    fn describe(ty: &mut TypeBuilder<Self>);
}

/// The root every described class implicitly extends.
///
/// Methods declared by the universal base (such as `type_name`) are available on every class
/// but are never property accessors.
#[derive(Debug)]
pub enum UniversalBase {}

/// Identity of a described type.
///
/// Works for sized types as well as trait objects, which stand in for interfaces.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key of `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The key of the universal base type.
    #[must_use]
    pub fn universal() -> Self {
        Self::of::<UniversalBase>()
    }

    /// The underlying [`TypeId`].
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified Rust type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if `target` is an instance of this type.
    #[must_use]
    pub fn is_type_of(&self, target: &dyn Any) -> bool {
        target.type_id() == self.id
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Whether a descriptor describes a concrete class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A concrete type whose methods have bodies
    Class,
    /// A trait object whose methods are declarations only
    Interface,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Type visibility and access flags
    pub struct TypeFlags: u32 {
        /// The type is publicly visible; its public members need no privileged access
        const PUBLIC = 0x0001;
        /// The environment refuses privileged access to this type's members
        const RESTRICTED = 0x0002;
    }
}

/// A lazily resolved supertype reference.
#[derive(Clone, Copy)]
pub struct SuperType {
    key: TypeKey,
    resolve: fn(&TypeRegistry) -> TypeDescriptorRc,
}

impl SuperType {
    pub(crate) fn of<T: Introspect + ?Sized>() -> Self {
        SuperType {
            key: TypeKey::of::<T>(),
            resolve: TypeRegistry::descriptor::<T>,
        }
    }

    /// The supertype's key.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub(crate) fn resolve(&self, registry: &TypeRegistry) -> TypeDescriptorRc {
        (self.resolve)(registry)
    }
}

impl fmt::Debug for SuperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}

/// The description of one type: its fields, methods and supertypes.
///
/// Descriptors are immutable once built and shared through [`TypeDescriptorRc`].
#[derive(Debug)]
pub struct TypeDescriptor {
    key: TypeKey,
    kind: TypeKind,
    flags: TypeFlags,
    fields: Vec<FieldDescriptor>,
    methods: Vec<Arc<MethodDescriptor>>,
    supertypes: Vec<SuperType>,
}

impl TypeDescriptor {
    /// The type's key.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The type's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    /// Class or interface.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Visibility and access flags.
    #[must_use]
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Returns `true` if the type is publicly visible.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags.contains(TypeFlags::PUBLIC)
    }

    /// All declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// All methods callable on the type, in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.methods
    }

    /// Direct supertypes: implemented interfaces first, then the base type.
    #[must_use]
    pub fn supertypes(&self) -> &[SuperType] {
        &self.supertypes
    }

    /// Find a method by name and exact parameter types.
    #[must_use]
    pub fn method(&self, name: &str, params: &[ValueType]) -> Option<&Arc<MethodDescriptor>> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.params() == params)
    }
}
