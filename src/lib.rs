// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # propmap
//!
//! View any described object as a live key-value map of its properties.
//!
//! Code written against one accessor convention (fluent `name()` / `name(value)` pairs, classic
//! `getName()` / `setName()` pairs, snake_case `get_name()` / `set_name()`) can be read and
//! written through one generic map interface, without each type providing a bespoke wrapper.
//! `propmap` discovers the accessors of a type once, decides which method backs which property,
//! caches the result and hands out [`PropertyMap`] views over individual objects.
//!
//! ## Features
//!
//! - **Accessor discovery** - Readers and writers are inferred from method shapes, field names,
//!   conventional prefixes and explicit markers, including markers declared on interfaces
//! - **Deterministic conflict resolution** - Competing accessors are ranked by evidence
//! - **Three handle tiers** - Reflective, bound and compiled handles trade setup cost for
//!   per-call cost while behaving identically
//! - **Concurrent caching** - Per-type tables are computed once, even under concurrent first use
//! - **Map semantics** - Size, lookup, insertion, containment, entry views, equality and hashing
//!   follow ordinary map contracts
//!
//! ## Quick Start
//!
//! ```rust
//! use propmap::prelude::*;
//!
//! struct Address {
//!     street: String,
//!     verified: bool,
//! }
//!
//! impl Introspect for Address {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.field::<String>("street")
//!             .reader("street", |a: &Address| a.street.clone())
//!             .fluent_writer("street", |a: &mut Address, v: String| {
//!                 a.street = v;
//!                 a
//!             })
//!             .reader("isVerified", |a: &Address| a.verified);
//!     }
//! }
//!
//! let mut address = Address { street: "Elm Row".into(), verified: false };
//! let mut map = propmap::adapt(&mut address)?;
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("verified")?, Some(Value::Bool(false)));
//! assert_eq!(map.put("street", "Oak Lane")?, Some(Value::from("Elm Row")));
//! assert_eq!(map.put("verified", true)?, None); // read-only
//! # Ok::<(), propmap::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`typesystem`] - Type descriptions: [`typesystem::Introspect`], descriptors, values and the
//!   type registry
//! - [`property`] - Accessor classification, property resolution, handle tiers and caching
//! - [`PropertyMap`] / [`PropertyMaps`] - The map view and the factory that creates it
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! Discovery reports through [`tracing`]: `debug` events per discovered type and tier, `trace`
//! events per accessor candidate, and a `warn` event whenever a writer is dropped because it
//! cannot accept the reader's type. No subscriber is installed by the library.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench --bench tiers
//!
//! # Fuzz the accessor name classifier
//! cargo +nightly fuzz run classifier --release
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use propmap::prelude::*;
///
/// let maps = PropertyMaps::with_tier(AccessTier::Reflective);
/// assert_eq!(maps.default_tier(), AccessTier::Reflective);
/// ```
pub mod prelude;

/// Describing types so their properties can be discovered.
pub mod typesystem;

/// Discovering, resolving and invoking properties.
pub mod property;

mod adapter;

/// `propmap` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `propmap` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the error categories.
pub use error::Error;

pub use adapter::{
    adapt, adapt_with, PropertyEntry, PropertyEntryMut, PropertyEntrySet, PropertyMap,
    PropertyMaps,
};
