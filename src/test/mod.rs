//! Shared fixture types for unit tests.
//!
//! Each fixture exercises one discovery rule: fluent accessors, conventional prefixes, markers
//! inherited from interfaces, read-only and write-only properties, incompatible writers,
//! competing readers, privileged access and failing accessors.

use std::fmt;

use thiserror::Error;

use crate::typesystem::{Introspect, PrimitiveKind, TypeBuilder, Value, ValueType};

/// Error returned by the accessors of [`Faulty`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Fault(pub &'static str);

/// Fluent accessors, an exported helper, and methods that must not become properties.
#[derive(Debug, Clone)]
pub struct Resident {
    pub name: String,
    pub age: i32,
    pub street: String,
    pub notes: Vec<String>,
    secret: i64,
}

impl Resident {
    pub fn new(name: &str, age: i32) -> Self {
        Resident {
            name: name.to_string(),
            age,
            street: "1 Main St".to_string(),
            notes: Vec::new(),
            secret: 1234,
        }
    }
}

impl fmt::Display for Resident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.age)
    }
}

impl Introspect for Resident {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<String>("name")
            .field::<i32>("age")
            .field::<String>("street")
            .static_field::<i64>("census")
            .reader("name", |r: &Resident| r.name.clone())
            .fluent_writer("name", |r: &mut Resident, v: String| {
                r.name = v;
                r
            })
            .reader("age", |r: &Resident| r.age)
            .fluent_writer("age", |r: &mut Resident, v: i32| {
                r.age = v;
                r
            })
            .method_ref("fullAddress", &[], ValueType::String, |r: &Resident, _| {
                Ok(Value::String(format!("{}, {}", r.name, r.street)))
            })
            .exported_as("address")
            .reader("secretCode", |r: &Resident| r.secret)
            .non_public()
            .method_mut(
                "bump",
                &[],
                ValueType::Primitive(PrimitiveKind::I32),
                |r: &mut Resident, _| {
                    r.age += 1;
                    Ok(Value::I32(r.age))
                },
            )
            .reader("census", |_: &Resident| 0i64)
            .static_method()
            .writer("remember", |r: &mut Resident, note: String| r.notes.push(note))
            .display();
    }
}

/// Interface whose `tag` method is an exported property.
pub trait Tagged {
    fn tag(&self) -> String;
}

impl Introspect for dyn Tagged {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.interface()
            .abstract_method("tag", &[], ValueType::String)
            .exported();
    }
}

/// Interface renaming its `label` method to the `displayName` property.
pub trait Named {
    fn label(&self) -> String;
}

impl Introspect for dyn Named {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.interface()
            .abstract_method("label", &[], ValueType::String)
            .exported_as("displayName");
    }
}

/// Base type of [`JavaBean`].
#[derive(Debug, Default)]
pub struct Entity {
    pub id: i64,
}

impl Tagged for Entity {
    fn tag(&self) -> String {
        format!("entity-{}", self.id)
    }
}

impl Introspect for Entity {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.implements::<dyn Tagged>()
            .field::<i64>("id")
            .reader("id", |e: &Entity| e.id)
            .reader("tag", |e: &Entity| e.tag());
    }
}

/// Conventional getters and setters in camelCase and snake_case.
#[derive(Debug, Default)]
pub struct JavaBean {
    pub name: String,
    pub active: bool,
    pub url: String,
    pub score: i64,
}

impl Named for JavaBean {
    fn label(&self) -> String {
        self.name.to_uppercase()
    }
}

impl Tagged for JavaBean {
    fn tag(&self) -> String {
        format!("bean-{}", self.name)
    }
}

impl Introspect for JavaBean {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.implements::<dyn Named>()
            .implements::<dyn Tagged>()
            .extends::<Entity>()
            .reader("getName", |b: &JavaBean| b.name.clone())
            .writer("setName", |b: &mut JavaBean, v: String| b.name = v)
            .reader("isActive", |b: &JavaBean| b.active)
            .writer("setActive", |b: &mut JavaBean, v: bool| b.active = v)
            .reader("getURL", |b: &JavaBean| b.url.clone())
            .reader("get_score", |b: &JavaBean| b.score)
            .writer("set_score", |b: &mut JavaBean, v: i64| b.score = v)
            .reader("label", |b: &JavaBean| b.label())
            .reader("tag", |b: &JavaBean| b.tag())
            .reader("hashCode", |_: &JavaBean| 17i32)
            .reader("get", |b: &JavaBean| b.name.clone());
    }
}

/// A fluent reader and a prefixed reader competing for `name`.
#[derive(Debug)]
pub struct Conflicted {
    pub name: String,
    pub alias: String,
}

impl Conflicted {
    pub fn new(name: &str, alias: &str) -> Self {
        Conflicted {
            name: name.to_string(),
            alias: alias.to_string(),
        }
    }
}

impl Introspect for Conflicted {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<String>("name")
            .reader("name", |c: &Conflicted| c.name.clone())
            .reader("getName", |c: &Conflicted| c.alias.clone())
            .writer("setName", |c: &mut Conflicted, v: String| c.name = v);
    }
}

/// A single read-only property.
#[derive(Debug)]
pub struct ReadOnly {
    pub token: Option<String>,
}

impl ReadOnly {
    pub fn new(token: Option<String>) -> Self {
        ReadOnly { token }
    }
}

impl Introspect for ReadOnly {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<Option<String>>("token")
            .reader("token", |r: &ReadOnly| r.token.clone());
    }
}

/// A single write-only property.
#[derive(Debug, Default)]
pub struct WriteOnly {
    pub secret: String,
}

impl Introspect for WriteOnly {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.writer("setSecret", |w: &mut WriteOnly, v: String| w.secret = v);
    }
}

/// An `i32` getter paired with a `String` setter.
#[derive(Debug, Default)]
pub struct Mismatched {
    pub count: i32,
}

impl Introspect for Mismatched {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.reader("getCount", |m: &Mismatched| m.count)
            .writer("setCount", |m: &mut Mismatched, v: String| {
                m.count = v.len() as i32;
            });
    }
}

/// An `i32` getter paired with an `Option<i32>` setter.
#[derive(Debug, Default)]
pub struct Boxing {
    pub hits: i32,
}

impl Introspect for Boxing {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.reader("getHits", |b: &Boxing| b.hits)
            .writer("setHits", |b: &mut Boxing, v: Option<i32>| {
                b.hits = v.unwrap_or_default();
            });
    }
}

/// A non-public type reachable through privileged access.
#[derive(Debug)]
pub struct Hidden {
    pub code: i64,
}

impl Introspect for Hidden {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.non_public_type()
            .field::<i64>("code")
            .reader("code", |h: &Hidden| h.code);
    }
}

/// A non-public type whose members refuse privileged access.
#[derive(Debug)]
pub struct Sealed {
    pub code: i64,
}

impl Introspect for Sealed {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.non_public_type()
            .restricted()
            .field::<i64>("code")
            .reader("code", |s: &Sealed| s.code);
    }
}

/// Accessors that always fail.
#[derive(Debug, Default)]
pub struct Faulty {
    pub level: i32,
}

impl Introspect for Faulty {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.try_reader("getLevel", |_: &Faulty| Err::<i32, _>(Fault("sensor offline")))
            .try_writer("setLevel", |_: &mut Faulty, _: i32| {
                Err(Fault("sensor read-only"))
            });
    }
}

/// A nullable string reader paired with a non-null string writer.
#[derive(Debug, Default)]
pub struct Ticket {
    pub token: Option<String>,
}

impl Introspect for Ticket {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.reader("token", |t: &Ticket| t.token.clone())
            .writer("setToken", |t: &mut Ticket, v: String| t.token = Some(v));
    }
}

/// A non-null string reader paired with a nullable string writer.
#[derive(Debug, Default)]
pub struct Badge {
    pub label: String,
}

impl Introspect for Badge {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.reader("getLabel", |b: &Badge| b.label.clone())
            .writer("setLabel", |b: &mut Badge, v: Option<String>| {
                b.label = v.unwrap_or_default();
            });
    }
}

/// A prefixed reader joined by an unprefixed writer without a matching field.
#[derive(Debug, Default)]
pub struct Knob {
    pub n: i32,
}

impl Introspect for Knob {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.reader("getN", |k: &Knob| k.n)
            .writer("n", |k: &mut Knob, v: i32| k.n = v);
    }
}

/// Two equally ranked readers for `name`.
#[derive(Debug)]
pub struct Twins {
    pub first: String,
    pub second: String,
}

impl Introspect for Twins {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.reader("getName", |t: &Twins| t.first.clone())
            .reader("get_name", |t: &Twins| t.second.clone());
    }
}

/// A fluent accessor pair whose name is a bare prefix.
#[derive(Debug, Default)]
pub struct Slot {
    pub get: i32,
}

impl Introspect for Slot {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<i32>("get")
            .reader("get", |s: &Slot| s.get)
            .fluent_writer("get", |s: &mut Slot, v: i32| {
                s.get = v;
                s
            });
    }
}
