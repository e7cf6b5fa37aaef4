//! Error types for model loading and lookup.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::ShapeId;

/// Error raised while loading, validating or querying a [`crate::Model`].
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error("invalid shape id `{0}`")]
    #[diagnostic(
        code(shapegen::model::invalid_shape_id),
        help("shape ids are written `namespace#Name` or `namespace#Name$member`")
    )]
    InvalidShapeId(String),

    #[error("unknown shape `{id}` referenced from {context}")]
    #[diagnostic(code(shapegen::model::unknown_shape))]
    UnknownShapeReference { id: ShapeId, context: String },

    #[error("shape `{container}` has no member `{member}`")]
    #[diagnostic(code(shapegen::model::missing_member))]
    MissingMember { container: ShapeId, member: String },

    #[error("invalid shape `{shape}`: {reason}")]
    #[diagnostic(code(shapegen::model::invalid_shape))]
    InvalidModel { shape: String, reason: String },

    #[error("malformed model JSON: {0}")]
    #[diagnostic(code(shapegen::model::json))]
    Json(#[from] serde_json::Error),

    #[error("failed to read model `{}`: {source}", path.display())]
    #[diagnostic(code(shapegen::model::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ModelError {
    pub(crate) fn unknown(id: &ShapeId, context: impl Into<String>) -> Self {
        ModelError::UnknownShapeReference {
            id: id.clone(),
            context: context.into(),
        }
    }

    pub(crate) fn invalid(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::InvalidModel {
            shape: shape.into(),
            reason: reason.into(),
        }
    }
}
