//! Go builtin type vocabulary.
//!
//! This registry covers the predeclared Go types that simple shapes map onto, together with the zero value each one
//! takes when a field is left unset.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - This module is vocabulary only (spellings + metadata). Whether a member is emitted by pointer is decided by the
//!   symbol resolver, not here.
//!
//! ## Examples
//! ```rust
//! use shapegen_core::lang::types::{self, GoTypeId};
//!
//! assert_eq!(types::from_str("float64"), Some(GoTypeId::Float64));
//! assert_eq!(types::zero_value(GoTypeId::Bool), "false");
//! ```

/// Stable identifier for predeclared Go types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoTypeId {
    Bool,
    Byte,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Error,
    Any,
}

/// Metadata for a predeclared Go type.
#[derive(Debug, Clone, Copy)]
pub struct GoTypeInfo {
    pub id: GoTypeId,
    pub canonical: &'static str,
    pub zero_value: &'static str,
    pub description: &'static str,
}

/// Registry of predeclared Go types, in [`GoTypeId`] declaration order.
pub const GO_TYPES: &[GoTypeInfo] = &[
    info(GoTypeId::Bool, "bool", "false", "Boolean."),
    info(GoTypeId::Byte, "byte", "0", "Alias for uint8; element type of blobs."),
    info(GoTypeId::Int8, "int8", "0", "8-bit signed integer."),
    info(GoTypeId::Int16, "int16", "0", "16-bit signed integer."),
    info(GoTypeId::Int32, "int32", "0", "32-bit signed integer."),
    info(GoTypeId::Int64, "int64", "0", "64-bit signed integer."),
    info(GoTypeId::Float32, "float32", "0", "IEEE-754 32-bit float."),
    info(GoTypeId::Float64, "float64", "0", "IEEE-754 64-bit float."),
    info(GoTypeId::String, "string", "\"\"", "Immutable UTF-8 string."),
    info(GoTypeId::Error, "error", "nil", "Builtin error interface."),
    info(GoTypeId::Any, "any", "nil", "Empty interface alias."),
];

/// Return the canonical spelling for a Go type.
pub fn as_str(id: GoTypeId) -> &'static str {
    info_for(id).canonical
}

/// Return the zero-value literal for a Go type.
pub fn zero_value(id: GoTypeId) -> &'static str {
    info_for(id).zero_value
}

/// Return the full metadata entry for a Go type.
pub fn info_for(id: GoTypeId) -> &'static GoTypeInfo {
    &GO_TYPES[id as usize]
}

/// Resolve a spelling to a [`GoTypeId`].
pub fn from_str(name: &str) -> Option<GoTypeId> {
    GO_TYPES.iter().find(|t| t.canonical == name).map(|t| t.id)
}

const fn info(id: GoTypeId, canonical: &'static str, zero_value: &'static str, description: &'static str) -> GoTypeInfo {
    GoTypeInfo {
        id,
        canonical,
        zero_value,
        description,
    }
}
