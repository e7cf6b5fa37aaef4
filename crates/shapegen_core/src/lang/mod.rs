//! Go language vocabulary registries.
//!
//! This module is the “front door” for target-language vocabulary: reserved keywords, predeclared identifiers,
//! builtin type spellings, and the naming conventions generated code follows.
//!
//! The design goal is to avoid stringly-typed checks scattered across the generator. Callers work with **stable
//! IDs** (e.g. [`types::GoTypeId`]) and look up spellings via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no model types, no IO, no side effects.
//!
//! ## Examples
//! ```rust
//! use shapegen_core::lang::{go_keywords, types::{self, GoTypeId}};
//!
//! assert!(go_keywords::is_keyword("func"));
//! assert_eq!(types::as_str(GoTypeId::Int32), "int32");
//! ```

pub mod conventions;
pub mod go_keywords;
pub mod types;
