use thiserror::Error;

use crate::typesystem::{Value, ValueType};

/// Builds an [`Error::Invocation`] from a member name and any error value.
///
/// ```rust, ignore
/// let err = invocation_error!("name", io_error);
/// ```
macro_rules! invocation_error {
    ($member:expr, $source:expr) => {
        crate::Error::Invocation {
            member: $member.to_string(),
            source: Box::new($source),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into three groups. Discovery errors are raised while a property table for a type
/// is being built and fail the whole adapter construction. Invocation errors are raised while an
/// accessor runs against a live object and carry the original cause. Contract errors signal
/// operations a property map can never perform, such as removing a key.
///
/// Looking up or writing an unknown key is not an error: those are silent no-ops that yield
/// `None`, just like reading a key that is absent from an ordinary map.
///
/// # Error Categories
///
/// ## Discovery Errors
/// - [`Error::AccessDenied`] - Privileged access to an accessor was refused
///
/// ## Invocation Errors
/// - [`Error::Invocation`] - The accessor body itself failed
/// - [`Error::TargetMismatch`] - A handle was invoked on an object of another type
/// - [`Error::ArgumentMismatch`] - A written value does not fit the writer's parameter
/// - [`Error::Arity`] - A generic call supplied the wrong number of arguments
/// - [`Error::AbstractMethod`] - The method has no body (interface declaration)
///
/// ## Contract Errors
/// - [`Error::Unsupported`] - Removal of properties from a type's structural shape
///
/// # Examples
///
/// ```rust
/// use propmap::{Error, PropertyMaps};
/// # use propmap::typesystem::{Introspect, TypeBuilder};
/// # struct Counter { hits: i64 }
/// # impl Introspect for Counter {
/// #     fn describe(ty: &mut TypeBuilder<Self>) {
/// #         ty.field::<i64>("hits").reader("hits", |c: &Counter| c.hits);
/// #     }
/// # }
///
/// let mut counter = Counter { hits: 3 };
/// let mut map = PropertyMaps::global().adapt(&mut counter)?;
///
/// match map.remove("hits") {
///     Err(Error::Unsupported(op)) => println!("cannot {op} a property"),
///     other => panic!("unexpected: {other:?}"),
/// }
/// # Ok::<(), propmap::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The operation can never be performed on a property map.
    ///
    /// Properties are part of a type's structural shape, so they cannot be removed at runtime.
    /// This is distinct from a silent no-op: it tells the caller that the request itself is
    /// meaningless, not that there was nothing to do.
    #[error("{0} operation is not supported")]
    Unsupported(&'static str),

    /// Privileged access to an accessor was refused while building its handle.
    ///
    /// Raised during discovery when a member of a non-public type must be reached through a
    /// privileged call and the type is marked as restricted. The whole type's adapter
    /// construction fails, since a partially accessible type indicates an environment problem.
    #[error("Cannot access property accessor {type_name}::{member}")]
    AccessDenied {
        /// The type owning the inaccessible member
        type_name: &'static str,
        /// The name of the inaccessible member
        member: String,
    },

    /// The underlying accessor failed.
    ///
    /// The original error is kept as the [`std::error::Error::source`] of this variant.
    #[error("Accessor {member} failed: {source}")]
    Invocation {
        /// The name of the method that failed
        member: String,
        /// The error raised by the accessor body
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A handle was invoked on an object of a different type than the one it was built for.
    #[error("Target type mismatch - expected {expected}, found {found}")]
    TargetMismatch {
        /// The type the handle was built for
        expected: &'static str,
        /// The type of the object that was actually supplied
        found: String,
    },

    /// A value could not be converted to the parameter type of a writer.
    #[error("Argument mismatch for {member} - expected {expected}, found {found:?}")]
    ArgumentMismatch {
        /// The name of the method receiving the value
        member: String,
        /// The declared parameter type
        expected: ValueType,
        /// The rejected value
        found: Value,
    },

    /// A generic method call supplied the wrong number of arguments.
    #[error("Method {member} takes {expected} argument(s), {found} supplied")]
    Arity {
        /// The name of the invoked method
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },

    /// The method is a declaration without a body, such as an interface method.
    #[error("Method {member} has no body")]
    AbstractMethod {
        /// The name of the invoked method
        member: String,
    },
}
