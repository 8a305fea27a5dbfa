//! Accessor classification.
//!
//! The classifier looks at one method at a time and decides whether it is a plausible property
//! reader or writer, which property name it maps to and which evidence justifies that decision.
//! Evidence ranks competing accessors later on; see [`Evidence`] for the order.
//!
//! # Shapes
//!
//! - **Reader**: no parameters, a non-unit return type and a shared (`&self`) receiver
//! - **Writer**: exactly one parameter, returning either nothing or the declaring type itself
//!
//! Only public instance methods take part. Static, synthetic and abstract methods, methods of
//! the universal base and the diagnostic `hashCode`/`toString` family are ignored.
//!
//! # Names
//!
//! Conventional prefixes are recognised in camelCase (`getName`, `isActive`, `setName`), where
//! the suffix is decapitalized unless it starts with two uppercase characters (`getURL` maps to
//! `URL`), and in snake_case (`get_name`), where the suffix is used as is. A method named just
//! `get`, `is` or `set` names no property unless a field with that name and type backs it.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::typesystem::{
    FieldDescriptor, MethodDescriptor, MethodFlags, Receiver, TypeDescriptor, TypeDescriptorRc,
    TypeKey, TypeRegistry, ValueType,
};

/// Method names that are never property accessors, whatever their shape.
pub const EXCLUDED_NAMES: [&str; 4] = ["hashCode", "toString", "hash_code", "to_string"];

/// Which side of a property a method implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The method reads the property
    Reader,
    /// The method writes the property
    Writer,
}

/// Conventional accessor prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    /// `get` / `get_`
    Get,
    /// `is` / `is_`
    Is,
    /// `set` / `set_`
    Set,
}

impl Prefix {
    fn camel(self) -> &'static str {
        match self {
            Prefix::Get => "get",
            Prefix::Is => "is",
            Prefix::Set => "set",
        }
    }

    fn snake(self) -> &'static str {
        match self {
            Prefix::Get => "get_",
            Prefix::Is => "is_",
            Prefix::Set => "set_",
        }
    }

    fn for_direction(direction: Direction) -> &'static [Prefix] {
        match direction {
            Direction::Reader => &[Prefix::Get, Prefix::Is],
            Direction::Writer => &[Prefix::Set],
        }
    }
}

/// The signal that justified classifying a method as an accessor, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Evidence {
    /// The method, or a method with the same signature on an ancestor, carries a property marker
    Explicit,
    /// A field with the method's name and exactly the accessed type exists
    NameMatchesField,
    /// The method name starts with a conventional prefix
    ConventionalPrefix(Prefix),
    /// The shape fits but nothing in the name supports it
    Unranked,
}

impl Evidence {
    /// The ranking priority; lower values win.
    #[must_use]
    pub fn priority(self) -> u32 {
        match self {
            Evidence::Explicit => 1,
            Evidence::NameMatchesField => 2,
            Evidence::ConventionalPrefix(Prefix::Is | Prefix::Set) => 3,
            Evidence::ConventionalPrefix(Prefix::Get) => 4,
            Evidence::Unranked => u32::MAX,
        }
    }

    /// Returns `true` for every evidence except [`Evidence::Unranked`].
    #[must_use]
    pub fn is_ranked(self) -> bool {
        self != Evidence::Unranked
    }
}

/// The raw shape of a method signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Plausible reader
    Reader,
    /// Plausible writer
    Writer,
    /// Neither
    Neither,
}

impl Shape {
    /// Classify the signature of `method`.
    #[must_use]
    pub fn of(method: &MethodDescriptor) -> Shape {
        match method.params() {
            [] if !method.returns().is_unit() && method.receiver() == Receiver::Shared => {
                Shape::Reader
            }
            [_] if method.returns().is_unit()
                || method.returns() == ValueType::Object(method.declaring_type()) =>
            {
                Shape::Writer
            }
            _ => Shape::Neither,
        }
    }

    fn direction(self) -> Option<Direction> {
        match self {
            Shape::Reader => Some(Direction::Reader),
            Shape::Writer => Some(Direction::Writer),
            Shape::Neither => None,
        }
    }
}

/// One method that may back a property.
#[derive(Clone)]
pub struct AccessorCandidate {
    /// Inferred property name
    pub name: String,
    /// The candidate method
    pub method: Arc<MethodDescriptor>,
    /// Reader or writer
    pub direction: Direction,
    /// Why the method was accepted
    pub evidence: Evidence,
}

impl AccessorCandidate {
    /// Shortcut for the evidence priority.
    #[must_use]
    pub fn priority(&self) -> u32 {
        self.evidence.priority()
    }

    /// The type the accessor reads or writes.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self.direction {
            Direction::Reader => self.method.returns(),
            Direction::Writer => self.method.params()[0],
        }
    }
}

impl fmt::Debug for AccessorCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorCandidate")
            .field("name", &self.name)
            .field("method", &self.method.name())
            .field("direction", &self.direction)
            .field("evidence", &self.evidence)
            .finish()
    }
}

/// Transient state of one discovery pass: the type's instance fields and its ancestor closure.
///
/// Built when discovery of a type starts and dropped when it ends, so nothing of it outlives
/// the pass or leaks into the discovery of another type.
pub struct DiscoveryScratch<'d> {
    fields: HashMap<&'d str, &'d FieldDescriptor>,
    ancestors: Vec<TypeDescriptorRc>,
}

impl<'d> DiscoveryScratch<'d> {
    /// Collect the scratch data for `descriptor`.
    pub fn new(registry: &TypeRegistry, descriptor: &'d TypeDescriptor) -> Self {
        let fields = descriptor
            .fields()
            .iter()
            .filter(|field| field.is_instance_field())
            .map(|field| (field.name.as_str(), field))
            .collect();

        DiscoveryScratch {
            fields,
            ancestors: registry.ancestor_closure(descriptor),
        }
    }

    /// The ancestor closure of the type under discovery.
    #[must_use]
    pub fn ancestors(&self) -> &[TypeDescriptorRc] {
        &self.ancestors
    }
}

/// Classifies the methods of one type.
pub struct Classifier<'s, 'd> {
    scratch: &'s DiscoveryScratch<'d>,
}

impl<'s, 'd> Classifier<'s, 'd> {
    /// Create a classifier over the scratch data of one discovery pass.
    #[must_use]
    pub fn new(scratch: &'s DiscoveryScratch<'d>) -> Self {
        Classifier { scratch }
    }

    /// Classify `method`, producing at most one candidate.
    #[must_use]
    pub fn classify(&self, method: &Arc<MethodDescriptor>) -> Option<AccessorCandidate> {
        if !is_eligible(method) {
            return None;
        }
        let direction = Shape::of(method).direction()?;

        let candidate = |name: String, evidence: Evidence| AccessorCandidate {
            name,
            method: method.clone(),
            direction,
            evidence,
        };

        if let Some(name) = self.explicit_name(method) {
            return Some(candidate(name, Evidence::Explicit));
        }

        if self.matches_field(method, direction) {
            return Some(candidate(method.name().to_string(), Evidence::NameMatchesField));
        }

        if is_bare_prefix(method.name()) {
            return None;
        }

        if let Some((prefix, name)) = prefixed_name(method.name(), direction) {
            return Some(candidate(name, Evidence::ConventionalPrefix(prefix)));
        }

        Some(candidate(method.name().to_string(), Evidence::Unranked))
    }

    fn explicit_name(&self, method: &MethodDescriptor) -> Option<String> {
        if let Some(marker) = method.marker() {
            return Some(marker.property_name(method.name()).to_string());
        }

        self.scratch
            .ancestors()
            .iter()
            .flat_map(|ancestor| ancestor.methods())
            .filter(|inherited| inherited.same_signature(method))
            .find_map(|inherited| inherited.marker())
            .map(|marker| marker.property_name(method.name()).to_string())
    }

    fn matches_field(&self, method: &MethodDescriptor, direction: Direction) -> bool {
        let accessed = match direction {
            Direction::Reader => method.returns(),
            Direction::Writer => method.params()[0],
        };

        self.scratch
            .fields
            .get(method.name())
            .is_some_and(|field| field.ty == accessed)
    }
}

fn is_eligible(method: &MethodDescriptor) -> bool {
    method.flags().contains(MethodFlags::PUBLIC)
        && !method
            .flags()
            .intersects(MethodFlags::STATIC | MethodFlags::SYNTHETIC | MethodFlags::ABSTRACT)
        && method.declaring_type() != TypeKey::universal()
        && !EXCLUDED_NAMES.contains(&method.name())
}

fn is_bare_prefix(name: &str) -> bool {
    [Prefix::Get, Prefix::Is, Prefix::Set]
        .iter()
        .any(|prefix| name == prefix.camel() || name == prefix.snake())
}

/// Derive a property name from a conventionally prefixed method name.
///
/// Returns `None` if `name` does not start with a prefix valid for `direction`, or if nothing
/// follows the prefix.
#[must_use]
pub fn prefixed_name(name: &str, direction: Direction) -> Option<(Prefix, String)> {
    for &prefix in Prefix::for_direction(direction) {
        if let Some(suffix) = name.strip_prefix(prefix.snake()) {
            if suffix.is_empty() {
                return None;
            }
            return Some((prefix, suffix.to_string()));
        }

        if let Some(suffix) = name.strip_prefix(prefix.camel()) {
            if suffix.is_empty() {
                return None;
            }
            return Some((prefix, decapitalize(suffix)));
        }
    }

    None
}

/// Lower the first character of `name`, unless the first two characters are both uppercase.
#[must_use]
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    if first.is_uppercase() && chars.next().is_some_and(char::is_uppercase) {
        return name.to_string();
    }

    let mut decapitalized: String = first.to_lowercase().collect();
    decapitalized.push_str(&name[first.len_utf8()..]);
    decapitalized
}
