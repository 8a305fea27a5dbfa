//! Method and field descriptors.
//!
//! A [`MethodDescriptor`] captures everything discovery needs to know about a method: its name,
//! the type that declares it, its parameter and return types, the receiver it borrows, its
//! visibility flags and an optional [`PropertyMarker`]. The body is stored in erased form as an
//! [`Invoker`]; accessors registered through the typed builder helpers additionally carry a
//! fixed-shape [`DirectAccess`] closure that the compiled handle tier uses as its fast path.

use std::{any::Any, fmt, sync::Arc};

use bitflags::bitflags;

use crate::{
    typesystem::{TypeKey, Value, ValueType},
    Error, Result,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method visibility and modifier flags
    pub struct MethodFlags: u32 {
        /// Method is publicly callable
        const PUBLIC = 0x0001;
        /// Method is associated with the type, not with an instance
        const STATIC = 0x0002;
        /// Method was generated rather than written by hand
        const SYNTHETIC = 0x0004;
        /// Method has no body (interface declaration)
        const ABSTRACT = 0x0008;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Field modifier flags
    pub struct FieldFlags: u32 {
        /// Field is associated with the type, not with an instance
        const STATIC = 0x0001;
        /// Field was generated rather than written by hand
        const SYNTHETIC = 0x0002;
    }
}

/// How a method borrows its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// `&self`
    Shared,
    /// `&mut self`
    Exclusive,
}

/// An explicit marker declaring a method as a named property accessor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyMarker {
    /// Property name override; the method's own name is used when absent or empty
    pub name: Option<String>,
}

impl PropertyMarker {
    /// The property name this marker assigns to `method_name`.
    #[must_use]
    pub fn property_name<'a>(&'a self, method_name: &'a str) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => method_name,
        }
    }
}

/// Erased body of a shared-receiver method
pub type SharedFn = Arc<dyn Fn(&dyn Any, Vec<Value>) -> Result<Value> + Send + Sync>;
/// Erased body of an exclusive-receiver method
pub type ExclusiveFn = Arc<dyn Fn(&mut dyn Any, Vec<Value>) -> Result<Value> + Send + Sync>;
/// Fixed-shape reader: `(target) -> value`
pub type ReadFn = Arc<dyn Fn(&dyn Any) -> Result<Value> + Send + Sync>;
/// Fixed-shape writer: `(target, value) -> ()`
pub type WriteFn = Arc<dyn Fn(&mut dyn Any, Value) -> Result<()> + Send + Sync>;

/// The erased, generically callable body of a method.
#[derive(Clone)]
pub enum Invoker {
    /// Body borrowing the receiver immutably
    Shared(SharedFn),
    /// Body borrowing the receiver mutably
    Exclusive(ExclusiveFn),
}

impl Invoker {
    /// Call the body with an immutable receiver.
    ///
    /// # Errors
    /// Returns [`Error::TargetMismatch`] if the body needs `&mut self`, otherwise whatever the
    /// body returns.
    pub fn call_shared(&self, target: &dyn Any, args: Vec<Value>) -> Result<Value> {
        match self {
            Invoker::Shared(body) => body(target, args),
            Invoker::Exclusive(_) => Err(Error::TargetMismatch {
                expected: "&mut self",
                found: "&self".to_string(),
            }),
        }
    }

    /// Call the body with a mutable receiver.
    ///
    /// # Errors
    /// Returns whatever the body returns.
    pub fn call(&self, target: &mut dyn Any, args: Vec<Value>) -> Result<Value> {
        match self {
            Invoker::Shared(body) => body(&*target, args),
            Invoker::Exclusive(body) => body(target, args),
        }
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invoker::Shared(_) => f.write_str("Invoker::Shared"),
            Invoker::Exclusive(_) => f.write_str("Invoker::Exclusive"),
        }
    }
}

/// A fixed-shape accessor closure, produced by the typed builder helpers.
#[derive(Clone)]
pub enum DirectAccess {
    /// Reader shape
    Read(ReadFn),
    /// Writer shape
    Write(WriteFn),
}

impl fmt::Debug for DirectAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectAccess::Read(_) => f.write_str("DirectAccess::Read"),
            DirectAccess::Write(_) => f.write_str("DirectAccess::Write"),
        }
    }
}

/// Describes one method of a type.
#[derive(Debug)]
pub struct MethodDescriptor {
    pub(crate) name: String,
    pub(crate) declaring_type: TypeKey,
    pub(crate) params: Vec<ValueType>,
    pub(crate) returns: ValueType,
    pub(crate) receiver: Receiver,
    pub(crate) flags: MethodFlags,
    pub(crate) marker: Option<PropertyMarker>,
    pub(crate) invoker: Option<Invoker>,
    pub(crate) direct: Option<DirectAccess>,
}

impl MethodDescriptor {
    /// The method's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type that declares the method.
    #[must_use]
    pub fn declaring_type(&self) -> TypeKey {
        self.declaring_type
    }

    /// Declared parameter types, excluding the receiver.
    #[must_use]
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Declared return type.
    #[must_use]
    pub fn returns(&self) -> ValueType {
        self.returns
    }

    /// How the method borrows its receiver.
    #[must_use]
    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    /// Visibility and modifier flags.
    #[must_use]
    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    /// The property marker placed directly on this method, if any.
    #[must_use]
    pub fn marker(&self) -> Option<&PropertyMarker> {
        self.marker.as_ref()
    }

    /// Returns `true` if `other` has the same name and parameter types.
    #[must_use]
    pub fn same_signature(&self, other: &MethodDescriptor) -> bool {
        self.name == other.name && self.params == other.params
    }

    /// The erased body, if the method has one.
    #[must_use]
    pub fn invoker(&self) -> Option<&Invoker> {
        self.invoker.as_ref()
    }

    /// The fixed-shape accessor closure, if the method was registered through a typed helper.
    #[must_use]
    pub fn direct(&self) -> Option<&DirectAccess> {
        self.direct.as_ref()
    }

    /// Generic dynamic invocation: check the argument count, then call the body.
    ///
    /// # Errors
    /// Returns [`Error::AbstractMethod`] for declarations without a body, [`Error::Arity`] for
    /// a wrong argument count, and otherwise whatever the body returns.
    pub fn invoke(&self, target: &mut dyn Any, args: Vec<Value>) -> Result<Value> {
        self.check_arity(&args)?;
        self.body()?.call(target, args)
    }

    /// Generic dynamic invocation with an immutable receiver.
    ///
    /// # Errors
    /// See [`MethodDescriptor::invoke`]; additionally fails for `&mut self` methods.
    pub fn invoke_shared(&self, target: &dyn Any, args: Vec<Value>) -> Result<Value> {
        self.check_arity(&args)?;
        self.body()?.call_shared(target, args)
    }

    pub(crate) fn body(&self) -> Result<&Invoker> {
        self.invoker.as_ref().ok_or_else(|| Error::AbstractMethod {
            member: self.name.clone(),
        })
    }

    fn check_arity(&self, args: &[Value]) -> Result<()> {
        if args.len() == self.params.len() {
            Ok(())
        } else {
            Err(Error::Arity {
                member: self.name.clone(),
                expected: self.params.len(),
                found: args.len(),
            })
        }
    }
}

/// Describes one field of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Declared field type
    pub ty: ValueType,
    /// Modifier flags
    pub flags: FieldFlags,
}

impl FieldDescriptor {
    /// Returns `true` for non-static, non-synthetic fields.
    #[must_use]
    pub fn is_instance_field(&self) -> bool {
        !self
            .flags
            .intersects(FieldFlags::STATIC | FieldFlags::SYNTHETIC)
    }
}
