//! Provide pure semantic helpers and canonical Go vocabulary for the shapegen code generator.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that the generator uses
//! for naming and dependency decisions:
//! - [`version`]: semantic version parsing and precedence (used by dependency resolution),
//! - [`lang`]: Go keywords, builtin type spellings, and naming conventions (used by symbol resolution and escaping).
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, and no model or writer types.
//! - Everything here is a pure function of its inputs, so two generation runs over the same model agree byte-for-byte.

pub mod lang;
pub mod version;

pub use version::{SemanticVersion, VersionError};
