//! Integration tests for the map contract over the common accessor conventions.
//!
//! Each fixture type follows one convention (fluent, getter/setter, read-only, write-only,
//! incompatible setter, competing getters) and each test checks what a caller of the map
//! observes.

use std::collections::HashMap;

use propmap::prelude::*;
use strum::IntoEnumIterator;

/// Fluent accessors sharing the field name.
struct FluentPerson {
    name: String,
}

impl Introspect for FluentPerson {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<String>("name")
            .reader("name", |p: &FluentPerson| p.name.clone())
            .fluent_writer("name", |p: &mut FluentPerson, v: String| {
                p.name = v;
                p
            });
    }
}

/// Classic getter and setter.
struct BeanPerson {
    name: String,
}

impl Introspect for BeanPerson {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<String>("name")
            .reader("getName", |p: &BeanPerson| p.name.clone())
            .writer("setName", |p: &mut BeanPerson, v: String| p.name = v);
    }
}

/// Getter without a setter.
struct Credentials {
    token: String,
}

impl Introspect for Credentials {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<String>("token")
            .reader("token", |c: &Credentials| c.token.clone());
    }
}

/// Setter without a getter.
#[derive(Default)]
struct Vault {
    secret: String,
}

impl Introspect for Vault {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.writer("setSecret", |v: &mut Vault, s: String| v.secret = s);
    }
}

/// `i32` getter with a `String` setter of the same name.
struct Tally {
    count: i32,
}

impl Introspect for Tally {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.reader("getCount", |t: &Tally| t.count)
            .writer("setCount", |t: &mut Tally, v: String| {
                t.count = v.parse().unwrap_or(-1);
            });
    }
}

/// A fluent getter and a prefixed getter returning different values.
struct TwoFaced {
    name: String,
    display: String,
}

impl Introspect for TwoFaced {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<String>("name")
            .reader("getName", |t: &TwoFaced| t.display.clone())
            .reader("name", |t: &TwoFaced| t.name.clone());
    }
}

/// Nullable string getter whose setter only takes a present string.
struct Ticket {
    token: Option<String>,
}

impl Introspect for Ticket {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<Option<String>>("token")
            .reader("token", |t: &Ticket| t.token.clone())
            .writer("setToken", |t: &mut Ticket, v: String| t.token = Some(v));
    }
}

/// Prefixed getter paired with a bare setter and no backing field.
struct Knob {
    n: i32,
}

impl Introspect for Knob {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.reader("getN", |k: &Knob| k.n)
            .writer("n", |k: &mut Knob, v: i32| k.n = v);
    }
}

/// A mix of read-write, read-only and write-only properties of several types.
#[derive(Default)]
struct Sensor {
    label: String,
    reading: f64,
    offset: Option<i32>,
    calibrated: bool,
    pin: i16,
}

impl Introspect for Sensor {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.field::<String>("label")
            .reader("label", |s: &Sensor| s.label.clone())
            .fluent_writer("label", |s: &mut Sensor, v: String| {
                s.label = v;
                s
            })
            .reader("get_reading", |s: &Sensor| s.reading)
            .writer("set_reading", |s: &mut Sensor, v: f64| s.reading = v)
            .reader("getOffset", |s: &Sensor| s.offset)
            .writer("setOffset", |s: &mut Sensor, v: Option<i32>| s.offset = v)
            .reader("isCalibrated", |s: &Sensor| s.calibrated)
            .writer("setPin", |s: &mut Sensor, v: i16| s.pin = v);
    }
}

#[test]
fn fluent_accessors() -> Result<()> {
    let mut person = FluentPerson {
        name: "Ada".to_string(),
    };
    let mut map = propmap::adapt(&mut person)?;

    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(map.get("name")?, Some(Value::from("Ada")));
    assert_eq!(map.put("name", "X")?, Some(Value::from("Ada")));
    drop(map);

    assert_eq!(person.name, "X");
    Ok(())
}

#[test]
fn getter_setter_accessors() -> Result<()> {
    let mut person = BeanPerson {
        name: "Ada".to_string(),
    };
    let mut map = propmap::adapt(&mut person)?;

    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(map.get("name")?, Some(Value::from("Ada")));
    assert_eq!(map.put("name", "X")?, Some(Value::from("Ada")));
    drop(map);

    assert_eq!(person.name, "X");
    Ok(())
}

#[test]
fn fluent_and_bean_maps_are_equal() -> Result<()> {
    let mut fluent = FluentPerson {
        name: "Ada".to_string(),
    };
    let mut bean = BeanPerson {
        name: "Ada".to_string(),
    };

    let fluent_map = propmap::adapt(&mut fluent)?;
    let bean_map = propmap::adapt(&mut bean)?;
    assert!(fluent_map == bean_map);
    Ok(())
}

#[test]
fn read_only_property() -> Result<()> {
    let mut credentials = Credentials {
        token: "t0k3n".to_string(),
    };
    let mut map = propmap::adapt(&mut credentials)?;

    assert!(map.contains_key("token"));
    assert_eq!(map.put("token", "x")?, None);
    assert_eq!(map.get("token")?, Some(Value::from("t0k3n")));
    drop(map);

    assert_eq!(credentials.token, "t0k3n");
    Ok(())
}

#[test]
fn write_only_property() -> Result<()> {
    let mut vault = Vault::default();
    let mut map = propmap::adapt(&mut vault)?;

    assert!(map.contains_key("secret"));
    assert_eq!(map.get("secret")?, None);
    assert_eq!(map.put("secret", "v")?, None);
    assert!(!map.contains_value(&Value::from("v"))?);
    drop(map);

    assert_eq!(vault.secret, "v");
    Ok(())
}

#[test]
fn incompatible_setter_is_dropped() -> Result<()> {
    let mut tally = Tally { count: 3 };
    let mut map = propmap::adapt(&mut tally)?;

    assert!(map.contains_key("count"));
    assert!(!map.property("count").unwrap().is_writable());
    assert_eq!(map.put("count", "7")?, None);
    assert_eq!(map.get("count")?, Some(Value::I32(3)));
    drop(map);

    assert_eq!(tally.count, 3);
    Ok(())
}

#[test]
fn fluent_getter_wins() -> Result<()> {
    let mut two_faced = TwoFaced {
        name: "fluent".to_string(),
        display: "bean".to_string(),
    };

    for tier in AccessTier::iter() {
        let map = propmap::adapt_with(&mut two_faced, tier)?;
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("name")?, Some(Value::from("fluent")));
    }

    two_faced.name = "changed".to_string();
    let map = propmap::adapt(&mut two_faced)?;
    assert_eq!(map.get("name")?, Some(Value::from("changed")));
    Ok(())
}

#[test]
fn round_trip_law() -> Result<()> {
    let mut sensor = Sensor {
        label: "north".to_string(),
        reading: 21.5,
        offset: None,
        calibrated: true,
        pin: 4,
    };
    let mut map = propmap::adapt(&mut sensor)?;
    let keys: Vec<String> = map.keys().map(str::to_string).collect();
    assert_eq!(keys, vec!["label", "reading", "offset", "calibrated", "pin"]);

    let unknown = "unknown".to_string();
    for key in keys.iter().chain(std::iter::once(&unknown)) {
        let before = map.snapshot()?;
        let current = map.get(key)?;
        if let Some(value) = current.clone() {
            map.put(key, value)?;
        }
        assert_eq!(map.get(key)?, current);
        assert_eq!(map.snapshot()?, before);
    }
    Ok(())
}

#[test]
fn nullable_values() -> Result<()> {
    let mut sensor = Sensor::default();
    let mut map = propmap::adapt(&mut sensor)?;

    assert_eq!(map.get("offset")?, Some(Value::Null));
    assert_eq!(map.put("offset", 5)?, Some(Value::Null));
    assert_eq!(map.put("offset", Value::Null)?, Some(Value::I32(5)));

    assert!(matches!(
        map.put("offset", "five"),
        Err(Error::ArgumentMismatch { .. })
    ));
    assert!(matches!(
        map.put("reading", Value::Null),
        Err(Error::ArgumentMismatch { .. })
    ));
    Ok(())
}

#[test]
fn put_all_and_equality() -> Result<()> {
    let mut sensor = Sensor::default();
    let mut map = propmap::adapt(&mut sensor)?;

    let mut update = HashMap::new();
    update.insert("label".to_string(), Value::from("south"));
    update.insert("reading".to_string(), Value::F64(-3.25));
    update.insert("calibrated".to_string(), Value::Bool(true));
    update.insert("pin".to_string(), Value::I16(9));
    update.insert("elsewhere".to_string(), Value::I32(1));
    map.put_all(&update)?;

    let mut expected = HashMap::new();
    expected.insert("label".to_string(), Value::from("south"));
    expected.insert("reading".to_string(), Value::F64(-3.25));
    expected.insert("offset".to_string(), Value::Null);
    expected.insert("calibrated".to_string(), Value::Bool(false));
    expected.insert("pin".to_string(), Value::Null);
    assert!(map == expected);
    drop(map);

    assert_eq!(sensor.pin, 9);
    assert!(!sensor.calibrated);
    Ok(())
}

#[test]
fn removal_is_unsupported() -> Result<()> {
    let mut person = BeanPerson {
        name: "Ada".to_string(),
    };
    let mut map = propmap::adapt(&mut person)?;

    for key in ["name", "unknown", ""] {
        assert!(matches!(map.remove(key), Err(Error::Unsupported(_))));
    }
    assert!(matches!(map.clear(), Err(Error::Unsupported(_))));
    assert!(matches!(map.entries().clear(), Err(Error::Unsupported(_))));
    assert_eq!(map.len(), 1);
    Ok(())
}

#[test]
fn nullable_string_round_trip() -> Result<()> {
    let mut ticket = Ticket { token: None };
    let mut map = propmap::adapt(&mut ticket)?;

    assert!(!map.property("token").unwrap().is_writable());
    let before = map.snapshot()?;
    let current = map.get("token")?;
    assert_eq!(current, Some(Value::Null));
    assert_eq!(map.put("token", Value::Null)?, None);
    assert_eq!(map.get("token")?, current);
    assert_eq!(map.snapshot()?, before);
    drop(map);

    assert_eq!(ticket.token, None);
    Ok(())
}

#[test]
fn bare_setter_joins_prefixed_getter() -> Result<()> {
    let mut knob = Knob { n: 1 };
    let mut map = propmap::adapt(&mut knob)?;

    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["n"]);
    assert_eq!(map.put("n", 2)?, Some(Value::I32(1)));
    assert_eq!(map.get("n")?, Some(Value::I32(2)));
    drop(map);

    assert_eq!(knob.n, 2);
    Ok(())
}
