//! Shapegen code generation backend
//!
//! This module turns a validated shape model into the files of a Go client module.
//!
//! The pipeline is:
//! 1. Synthesize per-operation input/output shapes and compute the service closure
//! 2. Reserve every name the generator will synthesize, producing an immutable escaper
//! 3. Walk the closure in sorted order; resolve each shape to a `Symbol` and write its declaration
//! 4. Merge every writer's dependencies, then flush files, `go.mod` and `generated.json`
//!
//! ## Module Organization
//!
//! - `dependency.rs` - Dependency descriptors, version merge, transitive closure
//! - `symbol.rs` - Resolved names and pointability
//! - `reserved.rs` - Reserved-word tables, per-scope name assignment and the escaper
//! - `resolver.rs` - Shape → symbol mapping and file routing
//! - `writer.rs` - Per-file Go source buffer with import tracking
//! - `delegator.rs` - Per-run writer registry and file sinks
//! - `manifest.rs` - Resolved dependencies, `go.mod`, manifest
//! - `shapes.rs` - Declarations for each shape kind
//! - `codegen.rs` - Generation director

// Errors propagate to the CLI; generation never panics on bad input
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod codegen;
pub mod delegator;
pub mod dependency;
pub mod errors;
pub mod manifest;
pub mod reserved;
pub mod resolver;
pub mod settings;
pub mod shapes;
pub mod symbol;
pub mod writer;

pub use codegen::{Codegen, GenerationOutput, GenerationRun};
pub use delegator::{DirectorySink, FileSink, MemorySink, WriterDelegator};
pub use dependency::{Dependency, DependencyKind, merge, resolve_transitive_closure};
pub use errors::{CodegenError, CodegenResult};
pub use manifest::{GeneratedManifest, ResolvedDependencies};
pub use reserved::{Escaper, NameScope, ReservedWords, ReservedWordsBuilder};
pub use resolver::SymbolResolver;
pub use settings::CodegenSettings;
pub use symbol::{ContainerKind, PointerKind, Symbol};
pub use writer::{GoWriter, WriterConfig};
