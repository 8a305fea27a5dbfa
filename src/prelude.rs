//! # propmap Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the propmap library. Import this module to describe types and adapt them as maps.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all propmap operations
pub use crate::Error;

/// The result type used throughout propmap
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Adapt an object through the process-wide factory
pub use crate::{adapt, adapt_with};

/// The map view and its factory
pub use crate::{PropertyMap, PropertyMaps};

/// Entry view types
pub use crate::{PropertyEntry, PropertyEntryMut, PropertyEntrySet};

// ================================================================================================
// Describing Types
// ================================================================================================

/// Implemented by every type that can be adapted
pub use crate::typesystem::Introspect;

/// Builder handed to [`Introspect::describe`]
pub use crate::typesystem::TypeBuilder;

/// Dynamic values and declared types
pub use crate::typesystem::{PrimitiveKind, PropertyValue, Value, ValueType};

// ================================================================================================
// Properties and Handles
// ================================================================================================

/// Handle tier selection
pub use crate::property::AccessTier;

/// Uniform handle contract
pub use crate::property::PropertyHandle;
