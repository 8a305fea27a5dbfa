//! Dynamic values and declared value types.
//!
//! Property maps move data between a described object and its callers as [`Value`]s, while the
//! discovery pass reasons about accessor signatures in terms of [`ValueType`]s. The
//! [`PropertyValue`] trait connects both worlds to ordinary Rust types.
//!
//! # Boxing
//!
//! Every primitive kind exists in two declared forms: the plain primitive (`i32`) and its
//! nullable, boxed counterpart (`Option<i32>`). Compatibility checks between a reader and a
//! writer compare the boxed forms, so an `i32` reader pairs with an `Option<i32>` writer.
//!
//! Strings are not boxed. `String` and `Option<String>` are distinct declared types, and only
//! the nullable form can take every value a nullable reader produces.
//!
//! # Equality
//!
//! [`Value`] equality is total so values can be used like ordinary map contents: floating point
//! values compare by bit pattern (`NaN == NaN`, `0.0 != -0.0`) and object references compare by
//! identity.

use std::{
    any::Any,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use strum::{Display, EnumIter};

use crate::typesystem::TypeKey;

/// The primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

/// The declared type of a parameter, return value or field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value (`()`), the return type of plain writers
    Unit,
    /// A primitive that can never be null
    Primitive(PrimitiveKind),
    /// The boxed form of a primitive, which may be null
    Nullable(PrimitiveKind),
    /// A string that is never null
    String,
    /// A string that may be null (`Option<String>`)
    NullableString,
    /// A reference to a described object
    Object(TypeKey),
    /// Any value at all
    Any,
}

impl ValueType {
    /// The boxed form of this type: primitives become nullable, everything else is unchanged.
    #[must_use]
    pub fn boxed(self) -> ValueType {
        match self {
            ValueType::Primitive(kind) => ValueType::Nullable(kind),
            other => other,
        }
    }

    /// Returns `true` for [`ValueType::Unit`].
    #[must_use]
    pub fn is_unit(&self) -> bool {
        matches!(self, ValueType::Unit)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Unit => write!(f, "()"),
            ValueType::Primitive(kind) => write!(f, "{kind}"),
            ValueType::Nullable(kind) => write!(f, "Option<{kind}>"),
            ValueType::String => write!(f, "String"),
            ValueType::NullableString => write!(f, "Option<String>"),
            ValueType::Object(key) => write!(f, "{}", key.name()),
            ValueType::Any => write!(f, "Any"),
        }
    }
}

/// A shared reference to a described object, held inside a [`Value`].
///
/// Two references are equal only when they point at the same allocation.
#[derive(Clone)]
pub struct ObjectRef {
    key: TypeKey,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    /// Wrap a shared object.
    pub fn new<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        ObjectRef {
            key: TypeKey::of::<T>(),
            inner: object,
        }
    }

    /// The type of the referenced object.
    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    /// Recover the typed reference, if the object is a `T`.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.inner).cast::<()>()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:p}", self.key.name(), self.address())
    }
}

/// A dynamically typed property value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absence of a value
    #[default]
    Null,
    /// A boolean
    Bool(bool),
    /// A character
    Char(char),
    /// An 8-bit signed integer
    I8(i8),
    /// A 16-bit signed integer
    I16(i16),
    /// A 32-bit signed integer
    I32(i32),
    /// A 64-bit signed integer
    I64(i64),
    /// A 32-bit float
    F32(f32),
    /// A 64-bit float
    F64(f64),
    /// An owned string
    String(String),
    /// A shared object reference
    Object(ObjectRef),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string content, if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The primitive kind of this value, if it is a primitive.
    #[must_use]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Bool(_) => Some(PrimitiveKind::Bool),
            Value::Char(_) => Some(PrimitiveKind::Char),
            Value::I8(_) => Some(PrimitiveKind::I8),
            Value::I16(_) => Some(PrimitiveKind::I16),
            Value::I32(_) => Some(PrimitiveKind::I32),
            Value::I64(_) => Some(PrimitiveKind::I64),
            Value::F32(_) => Some(PrimitiveKind::F32),
            Value::F64(_) => Some(PrimitiveKind::F64),
            Value::Null | Value::String(_) | Value::Object(_) => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::I8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Object(v) => v.hash(state),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

/// Conversion between a Rust type and [`Value`], together with its declared [`ValueType`].
///
/// Accessors registered through the typed [`TypeBuilder`](crate::typesystem::TypeBuilder)
/// helpers use this trait to box their return values and unbox written values.
pub trait PropertyValue: Sized + 'static {
    /// The declared type of this Rust type.
    fn value_type() -> ValueType;

    /// Box `self` into a [`Value`].
    fn into_value(self) -> Value;

    /// Unbox a [`Value`], handing it back unchanged if it does not fit.
    ///
    /// # Errors
    /// Returns the original value if it cannot represent `Self`.
    fn from_value(value: Value) -> std::result::Result<Self, Value>;
}

macro_rules! primitive_value {
    ($ty:ty, $variant:ident, $kind:ident) => {
        impl PropertyValue for $ty {
            fn value_type() -> ValueType {
                ValueType::Primitive(PrimitiveKind::$kind)
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> std::result::Result<Self, Value> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }

        impl PropertyValue for Option<$ty> {
            fn value_type() -> ValueType {
                ValueType::Nullable(PrimitiveKind::$kind)
            }

            fn into_value(self) -> Value {
                self.map_or(Value::Null, Value::$variant)
            }

            fn from_value(value: Value) -> std::result::Result<Self, Value> {
                match value {
                    Value::Null => Ok(None),
                    Value::$variant(v) => Ok(Some(v)),
                    other => Err(other),
                }
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
    };
}

primitive_value!(bool, Bool, Bool);
primitive_value!(char, Char, Char);
primitive_value!(i8, I8, I8);
primitive_value!(i16, I16, I16);
primitive_value!(i32, I32, I32);
primitive_value!(i64, I64, I64);
primitive_value!(f32, F32, F32);
primitive_value!(f64, F64, F64);

impl PropertyValue for String {
    fn value_type() -> ValueType {
        ValueType::String
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl PropertyValue for Option<String> {
    fn value_type() -> ValueType {
        ValueType::NullableString
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, Value::String)
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(other),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Any + Send + Sync> PropertyValue for Arc<T> {
    fn value_type() -> ValueType {
        ValueType::Object(TypeKey::of::<T>())
    }

    fn into_value(self) -> Value {
        Value::Object(ObjectRef::new(self))
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Object(object) => match object.downcast::<T>() {
                Some(typed) => Ok(typed),
                None => Err(Value::Object(object)),
            },
            other => Err(other),
        }
    }
}

impl PropertyValue for Value {
    fn value_type() -> ValueType {
        ValueType::Any
    }

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_boxed_only_touches_primitives() {
        assert_eq!(
            ValueType::Primitive(PrimitiveKind::I32).boxed(),
            ValueType::Nullable(PrimitiveKind::I32)
        );
        assert_eq!(
            ValueType::Nullable(PrimitiveKind::I32).boxed(),
            ValueType::Nullable(PrimitiveKind::I32)
        );
        assert_eq!(ValueType::String.boxed(), ValueType::String);
        assert_eq!(ValueType::NullableString.boxed(), ValueType::NullableString);
        assert_eq!(ValueType::Unit.boxed(), ValueType::Unit);
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
        assert_eq!(hash_of(&Value::F32(1.5)), hash_of(&Value::F32(1.5)));
    }

    #[test]
    fn test_variants_never_compare_across_kinds() {
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_ne!(Value::Null, Value::String(String::new()));
    }

    #[test]
    fn test_object_identity() {
        let shared = Arc::new(String::from("a"));
        let a = Value::Object(ObjectRef::new(shared.clone()));
        let b = Value::Object(ObjectRef::new(shared));
        let c = Value::Object(ObjectRef::new(Arc::new(String::from("a"))));

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn test_optional_primitives() {
        assert_eq!(<Option<i32>>::from_value(Value::Null), Ok(None));
        assert_eq!(<Option<i32>>::from_value(Value::I32(4)), Ok(Some(4)));
        assert_eq!(<Option<i32>>::from_value(Value::I64(4)), Err(Value::I64(4)));
        assert_eq!(Some(4i32).into_value(), Value::I32(4));
        assert_eq!(<Option<i32>>::None.into_value(), Value::Null);
    }

    #[test]
    fn test_plain_string_rejects_null() {
        assert_eq!(String::from_value(Value::Null), Err(Value::Null));
        assert_eq!(<Option<String>>::from_value(Value::Null), Ok(None));
        assert_eq!(String::value_type(), ValueType::String);
        assert_eq!(<Option<String>>::value_type(), ValueType::NullableString);
    }

    #[test]
    fn test_object_round_trip() {
        let shared = Arc::new(7u8);
        let value = shared.clone().into_value();
        let back = <Arc<u8>>::from_value(value).unwrap();
        assert!(Arc::ptr_eq(&shared, &back));
        assert!(<Arc<u16>>::from_value(Arc::new(1u8).into_value()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueType::Nullable(PrimitiveKind::I64).to_string(), "Option<i64>");
        assert_eq!(ValueType::Primitive(PrimitiveKind::Bool).to_string(), "bool");
        assert_eq!(ValueType::NullableString.to_string(), "Option<String>");
    }
}
