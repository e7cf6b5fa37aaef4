#![forbid(unsafe_code)]
//! Shapegen: Go client code generation from shape models
//!
//! This crate provides the generator core: symbol resolution, reserved-word escaping, per-file writers with import
//! tracking, dependency version resolution, and the `shapegen` CLI. The shape model lives in `shapegen_model`;
//! dependency-free helpers (semantic versions, Go naming rules) live in `shapegen_core`.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a generator bug (logic error), use `.expect("INVARIANT: reason")` with
//!   a clear explanation.

pub mod backend;
pub mod cli;
pub mod version;

pub use backend::{Codegen, CodegenError, CodegenSettings, GenerationOutput};
pub use shapegen_core::SemanticVersion;
pub use shapegen_model::{Model, ShapeId};
