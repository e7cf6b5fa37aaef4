//! Define error types for the code generation core.
//!
//! Every failure here aborts the generation run: a half-generated source tree is not a valid artifact, and inputs
//! are deterministic, so nothing is retried.
//!
//! ## Notes
//!
//! - Each variant names the offending input (import path, alias, file key, shape id) so the CLI can point at it.

use std::path::PathBuf;

use miette::Diagnostic;
use shapegen_core::VersionError;
use shapegen_model::{ModelError, ShapeId};
use thiserror::Error;

/// Error during symbol resolution, writing, or dependency resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum CodegenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(code(shapegen::invalid_version))]
    InvalidVersion(#[from] VersionError),

    #[error("conflicting major versions required for `{import_path}`: {left} and {right}")]
    #[diagnostic(
        code(shapegen::conflicting_major_version),
        help("two requirements on the same package disagree on a non-zero major version; align the dependency floors")
    )]
    ConflictingMajorVersion {
        import_path: String,
        left: String,
        right: String,
    },

    #[error("cannot merge dependency `{left}` with `{right}`: import paths differ")]
    #[diagnostic(code(shapegen::mismatched_import_path))]
    MismatchedImportPath { left: String, right: String },

    #[error("import alias `{alias}` in `{file_key}` is bound to `{existing}`; cannot also bind it to `{requested}`")]
    #[diagnostic(code(shapegen::alias_conflict), help("give one of the packages an explicit alias"))]
    AliasConflict {
        file_key: String,
        alias: String,
        existing: String,
        requested: String,
    },

    #[error("wildcard import of `{namespace}` in `{file_key}` is not allowed")]
    #[diagnostic(code(shapegen::wildcard_import))]
    WildcardImportForbidden { file_key: String, namespace: String },

    #[error("formatting state of `{file_key}` popped without a matching push")]
    #[diagnostic(code(shapegen::unbalanced_format_state))]
    UnbalancedFormatState { file_key: String },

    #[error("file `{file_key}` belongs to `{existing}` but was requested for `{requested}`")]
    #[diagnostic(code(shapegen::namespace_mismatch))]
    NamespaceMismatch {
        file_key: String,
        existing: String,
        requested: String,
    },

    #[error("symbol `{symbol}` has no definition file")]
    #[diagnostic(code(shapegen::no_definition_file))]
    NoDefinitionFile { symbol: String },

    #[error("shape `{shape}` cannot be generated: {reason}")]
    #[diagnostic(code(shapegen::unsupported_shape))]
    UnsupportedShape { shape: ShapeId, reason: String },

    #[error("failed to write `{}`: {source}", path.display())]
    #[diagnostic(code(shapegen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read settings `{}`: {reason}", path.display())]
    #[diagnostic(code(shapegen::settings))]
    Settings { path: PathBuf, reason: String },

    #[error("failed to serialize manifest: {0}")]
    #[diagnostic(code(shapegen::manifest))]
    Manifest(#[from] serde_json::Error),
}

/// Result type for the code generation core.
pub type CodegenResult<T> = Result<T, CodegenError>;
